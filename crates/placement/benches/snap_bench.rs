//! Criterion benchmarks for the per-tick placement math.
//!
//! Benchmarks:
//!   - grid snap / cell lookup for a batch of scattered points
//!   - scale snapping on handle release
//!   - ray vs box collider, axis-aligned and rotated
//!
//! Run with: cargo bench -p placement --bench snap_bench

use bevy::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use placement::grid::GridDefinition;
use placement::physics::Collider;
use placement::raycast::ray_collider_distance;

fn scattered_points(n: usize) -> Vec<Vec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(0xB10C);
    (0..n)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-500.0..500.0),
                rng.gen_range(0.0..50.0),
                rng.gen_range(-500.0..500.0),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmark: snapping
// ---------------------------------------------------------------------------

fn bench_snap(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_snap");
    let Ok(grid) = GridDefinition::new(0.5, Vec3::new(0.25, 0.0, -0.25)) else {
        return;
    };
    let points = scattered_points(1024);

    group.bench_function("snap_1024", |b| {
        b.iter(|| {
            for p in &points {
                black_box(grid.snap(black_box(*p)));
            }
        });
    });

    group.bench_function("cell_of_1024", |b| {
        b.iter(|| {
            for p in &points {
                black_box(grid.cell_of(black_box(*p)));
            }
        });
    });

    group.bench_function("snap_scale", |b| {
        b.iter(|| black_box(grid.snap_scale(black_box(Vec3::new(1.37, 2.9, 0.2)))));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: ray vs collider
// ---------------------------------------------------------------------------

fn bench_raycast(c: &mut Criterion) {
    let mut group = c.benchmark_group("ray_collider");
    group.sample_size(1000);

    let collider = Collider::cuboid(Vec3::new(1.0, 2.0, 0.5));
    let ray = Ray3d::new(Vec3::new(0.2, 10.0, 0.1), Dir3::NEG_Y);

    let aligned = GlobalTransform::from(Transform::from_xyz(0.0, 1.0, 0.0));
    group.bench_function("aligned_hit", |b| {
        b.iter(|| black_box(ray_collider_distance(black_box(ray), 100.0, &collider, &aligned)));
    });

    let rotated = GlobalTransform::from(
        Transform::from_xyz(0.0, 1.0, 0.0)
            .with_rotation(Quat::from_euler(EulerRot::YXZ, 0.7, 0.3, -0.2))
            .with_scale(Vec3::new(2.0, 1.0, 3.0)),
    );
    group.bench_function("rotated_scaled_hit", |b| {
        b.iter(|| black_box(ray_collider_distance(black_box(ray), 100.0, &collider, &rotated)));
    });

    let away = Ray3d::new(Vec3::new(0.2, 10.0, 0.1), Dir3::Y);
    group.bench_function("miss", |b| {
        b.iter(|| black_box(ray_collider_distance(black_box(away), 100.0, &collider, &aligned)));
    });

    group.finish();
}

criterion_group!(benches, bench_snap, bench_raycast);
criterion_main!(benches);
