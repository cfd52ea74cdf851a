//! Axis scale handles driven through hover and grab events.

use bevy::prelude::*;

use crate::grid::GridConfig;
use crate::interaction::{GrabInteraction, Inert};
use crate::physics::Collider;
use crate::scale_handle::{AxisScaleHandle, ScaleLock, TargetInteractionChanged};
use crate::session::PlacementSettings;
use crate::test_harness::TestScene;

const EPS: f32 = 1e-4;

fn assert_near(actual: Vec3, expected: Vec3) {
    assert!(
        actual.abs_diff_eq(expected, EPS),
        "expected {expected:?}, got {actual:?}"
    );
}

fn half_cell_scene() -> TestScene {
    TestScene::with_config(
        GridConfig {
            cell_size: 0.5,
            origin: [0.0; 3],
        },
        PlacementSettings::default(),
    )
}

fn target_enabled(scene: &TestScene, block: Entity) -> bool {
    let grab = scene.get::<GrabInteraction>(block).unwrap().enabled;
    let collider = scene.get::<Collider>(block).unwrap().enabled;
    assert_eq!(grab, collider, "grab and collider toggle together");
    grab
}

fn toggles_for(scene: &TestScene, block: Entity) -> Vec<bool> {
    scene
        .sent::<TargetInteractionChanged>()
        .into_iter()
        .filter(|ev| ev.target == block)
        .map(|ev| ev.enabled)
        .collect()
}

// ====================================================================
// Dragging
// ====================================================================

#[test]
fn test_drag_up_keeps_bottom_face_in_place() {
    let mut scene = TestScene::new();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    let up = scene.handle_on_axis(block, Vec3::Y);
    let hand = scene.spawn_pointer(Vec3::new(0.0, 1.2, 0.0), Vec3::new(0.0, 1.2, -1.0));

    scene.grab(up, hand);
    scene.tick();
    assert_near(scene.transform(block).scale, Vec3::ONE);

    scene.move_to(hand, Vec3::new(0.0, 1.95, 0.0));
    scene.tick();
    let t = scene.transform(block);
    assert_near(t.scale, Vec3::new(1.0, 1.75, 1.0));
    assert!((t.translation.y - 0.875).abs() < EPS);
    assert!((t.translation.y - t.scale.y * 0.5).abs() < EPS, "bottom face moved");

    // Release rounds 1.75 cells to 2.
    scene.release(up, hand);
    scene.tick();
    let t = scene.transform(block);
    assert_near(t.scale, Vec3::new(1.0, 2.0, 1.0));
    assert!((t.translation.y - 1.0).abs() < EPS);
}

#[test]
fn test_release_then_regrab_in_same_tick_keeps_dragging() {
    let mut scene = TestScene::new();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    let up = scene.handle_on_axis(block, Vec3::Y);
    let hand = scene.spawn_pointer(Vec3::new(0.0, 1.2, 0.0), Vec3::new(0.0, 1.2, -1.0));

    scene.grab(up, hand);
    scene.tick();
    scene.release(up, hand);
    scene.grab(up, hand);
    scene.tick();
    assert!(scene.get::<AxisScaleHandle>(up).unwrap().is_grabbed());

    scene.move_to(hand, Vec3::new(0.0, 1.7, 0.0));
    scene.tick();
    assert_near(scene.transform(block).scale, Vec3::new(1.0, 1.5, 1.0));
}

#[test]
fn test_release_snaps_scale_to_half_cells() {
    let mut scene = half_cell_scene();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    let right = scene.handle_on_axis(block, Vec3::X);
    let hand = scene.spawn_pointer(Vec3::new(1.0, 0.5, 0.0), Vec3::new(1.0, 0.5, -1.0));

    scene.grab(right, hand);
    scene.tick();
    scene.move_to(hand, Vec3::new(1.37, 0.5, 0.0));
    scene.tick();
    assert!((scene.transform(block).scale.x - 1.37).abs() < EPS);

    scene.release(right, hand);
    scene.tick();
    let t = scene.transform(block);
    assert_near(t.scale, Vec3::new(1.5, 1.0, 1.0));
    // Left face stays at x = -0.5.
    assert!((t.translation.x - t.scale.x * 0.5 + 0.5).abs() < EPS);
}

#[test]
fn test_drag_never_goes_below_minimum_scale() {
    let mut scene = TestScene::new();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    let front = scene.handle_on_axis(block, Vec3::Z);
    let hand = scene.spawn_pointer(Vec3::new(0.0, 0.5, 1.0), Vec3::ZERO);

    scene.grab(front, hand);
    scene.tick();
    scene.move_to(hand, Vec3::new(0.0, 0.5, -5.0));
    scene.tick();
    assert!((scene.transform(block).scale.z - 0.1).abs() < EPS);

    // Release still leaves at least one cell.
    scene.release(front, hand);
    scene.tick();
    assert!((scene.transform(block).scale.z - 1.0).abs() < EPS);
}

#[test]
fn test_release_floor_is_one_cell_on_finer_grid() {
    let mut scene = half_cell_scene();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    let right = scene.handle_on_axis(block, Vec3::X);
    let hand = scene.spawn_pointer(Vec3::new(1.0, 0.5, 0.0), Vec3::new(1.0, 0.5, -1.0));

    scene.grab(right, hand);
    scene.tick();
    scene.move_to(hand, Vec3::new(-5.0, 0.5, 0.0));
    scene.tick();
    assert!((scene.transform(block).scale.x - 0.1).abs() < EPS);

    // 0.1 is 0.2 cells; the floor is one 0.5 cell, not one unit.
    scene.release(right, hand);
    scene.tick();
    let t = scene.transform(block);
    assert_near(t.scale, Vec3::new(0.5, 1.0, 1.0));
    // Left face stays at x = -0.5.
    assert!((t.translation.x - t.scale.x * 0.5 + 0.5).abs() < EPS);
}

#[test]
fn test_drag_follows_target_rotation() {
    let mut scene = TestScene::new();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    scene.set_transform(
        block,
        Transform::from_xyz(0.0, 0.5, 0.0)
            .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
    );
    let right = scene.handle_on_axis(block, Vec3::X);
    let hand = scene.spawn_pointer(Vec3::new(0.0, 0.5, -1.0), Vec3::ZERO);

    scene.grab(right, hand);
    scene.tick();
    // Local +X faces world -Z after a quarter turn.
    scene.move_to(hand, Vec3::new(0.0, 0.5, -1.5));
    scene.tick();
    assert!((scene.transform(block).scale.x - 1.5).abs() < 1e-3);
}

#[test]
fn test_drag_ignores_other_pointer_release() {
    let mut scene = TestScene::new();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    let up = scene.handle_on_axis(block, Vec3::Y);
    let hand = scene.spawn_pointer(Vec3::new(0.0, 1.2, 0.0), Vec3::ZERO);
    let other = scene.spawn_pointer(Vec3::new(3.0, 1.2, 0.0), Vec3::ZERO);

    scene.grab(up, hand);
    scene.tick();
    scene.release(up, other);
    scene.move_to(hand, Vec3::new(0.0, 1.7, 0.0));
    scene.tick();
    assert!(scene.get::<AxisScaleHandle>(up).unwrap().is_grabbed());
    assert!((scene.transform(block).scale.y - 1.5).abs() < EPS);
}

// ====================================================================
// Handle layout
// ====================================================================

#[test]
fn test_handles_keep_world_size_and_sit_outside_face() {
    let mut scene = TestScene::new();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    let up = scene.handle_on_axis(block, Vec3::Y);
    let hand = scene.spawn_pointer(Vec3::new(0.0, 1.2, 0.0), Vec3::ZERO);

    scene.grab(up, hand);
    scene.tick();
    scene.move_to(hand, Vec3::new(0.0, 1.95, 0.0));
    scene.tick();

    let handle = scene.transform(up);
    assert_near(handle.scale, Vec3::new(0.2, 0.2 / 1.75, 0.2));
    assert!((handle.translation.y - (0.5 + 0.05 / 1.75)).abs() < EPS);

    let world = scene.get::<GlobalTransform>(up).unwrap().compute_transform();
    assert_near(world.scale, Vec3::splat(0.2));
}

// ====================================================================
// Target lock
// ====================================================================

#[test]
fn test_target_disabled_until_every_handle_is_idle() {
    let mut scene = TestScene::new();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    let up = scene.handle_on_axis(block, Vec3::Y);
    let right = scene.handle_on_axis(block, Vec3::X);
    let hand = scene.spawn_pointer(Vec3::new(0.0, 1.2, 0.0), Vec3::ZERO);
    assert!(target_enabled(&scene, block));

    scene.hover(up, hand);
    scene.hover(right, hand);
    scene.tick();
    assert!(!target_enabled(&scene, block));
    assert_eq!(scene.get::<ScaleLock>(block).unwrap().holders().len(), 2);

    scene.unhover(up, hand);
    scene.tick();
    assert!(!target_enabled(&scene, block), "one handle still hovered");

    scene.grab(right, hand);
    scene.unhover(right, hand);
    scene.tick();
    assert!(!target_enabled(&scene, block), "handle still grabbed");

    scene.release(right, hand);
    scene.tick();
    assert!(target_enabled(&scene, block));
    assert_eq!(toggles_for(&scene, block), vec![false, true]);
}

#[test]
fn test_hover_without_grab_leaves_scale_alone() {
    let mut scene = TestScene::new();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    let up = scene.handle_on_axis(block, Vec3::Y);
    let hand = scene.spawn_pointer(Vec3::new(0.0, 1.2, 0.0), Vec3::ZERO);

    scene.hover(up, hand);
    scene.tick();
    scene.move_to(hand, Vec3::new(0.0, 3.0, 0.0));
    scene.ticks(3);
    assert_near(scene.transform(block).scale, Vec3::ONE);

    scene.unhover(up, hand);
    scene.tick();
    assert_eq!(toggles_for(&scene, block), vec![false, true]);
}

#[test]
fn test_despawned_handle_releases_its_hold() {
    let mut scene = TestScene::new();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    let up = scene.handle_on_axis(block, Vec3::Y);
    let hand = scene.spawn_pointer(Vec3::new(0.0, 1.2, 0.0), Vec3::ZERO);

    scene.hover(up, hand);
    scene.tick();
    assert!(!target_enabled(&scene, block));

    scene.world_mut().entity_mut(up).despawn_recursive();
    scene.tick();
    assert!(target_enabled(&scene, block));
    assert!(!scene.get::<ScaleLock>(block).unwrap().is_locked());
    assert_eq!(toggles_for(&scene, block), vec![false, true]);
}

#[test]
fn test_disabled_collider_stays_disabled_after_unlock() {
    let mut scene = TestScene::new();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    let inner = scene
        .world_mut()
        .spawn((
            Transform::default(),
            Collider {
                enabled: false,
                ..Collider::cuboid(Vec3::splat(0.1))
            },
        ))
        .set_parent(block)
        .id();
    let up = scene.handle_on_axis(block, Vec3::Y);
    let hand = scene.spawn_pointer(Vec3::new(0.0, 1.2, 0.0), Vec3::ZERO);

    scene.hover(up, hand);
    scene.tick();
    scene.unhover(up, hand);
    scene.tick();

    assert!(target_enabled(&scene, block));
    assert!(!scene.get::<Collider>(inner).unwrap().enabled);
    // Handle triggers are never touched by the lock.
    assert!(scene.get::<Collider>(up).unwrap().enabled);
}

#[test]
fn test_inert_handles_ignore_events() {
    let mut scene = TestScene::new();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    let up = scene.handle_on_axis(block, Vec3::Y);
    scene.world_mut().entity_mut(up).insert(Inert);
    let hand = scene.spawn_pointer(Vec3::new(0.0, 1.2, 0.0), Vec3::ZERO);

    scene.hover(up, hand);
    scene.grab(up, hand);
    scene.tick();
    scene.move_to(hand, Vec3::new(0.0, 2.2, 0.0));
    scene.tick();

    assert!(target_enabled(&scene, block));
    assert_near(scene.transform(block).scale, Vec3::ONE);
    assert!(toggles_for(&scene, block).is_empty());
}
