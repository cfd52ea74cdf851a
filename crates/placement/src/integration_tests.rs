//! Integration tests for placement using the `TestScene` harness.
//!
//! These tests spin up a headless Bevy App with `PlacementPlugin` and drive it
//! with the same events an interaction layer would send.

mod scale_handle_tests;

use bevy::prelude::*;

use crate::grid::GridConfig;
use crate::session::PlacementSettings;
use crate::test_harness::{TestScene, BLOCK};

// ===========================================================================
// Harness bootstrap
// ===========================================================================

#[test]
fn default_scene_installs_unit_grid() {
    let scene = TestScene::new();
    let grid = scene.grid().expect("grid installed at startup");
    assert_eq!(grid.cell_size(), 1.0);
    assert_eq!(grid.origin(), Vec3::ZERO);
    assert!(!scene.session().inert);
}

#[test]
fn rejected_grid_config_leaves_scene_without_grid() {
    let scene = TestScene::with_config(
        GridConfig {
            cell_size: 0.0,
            origin: [0.0; 3],
        },
        PlacementSettings::default(),
    );
    assert!(scene.grid().is_none());
}

#[test]
fn placed_block_gets_scale_lock_and_three_handles() {
    let mut scene = TestScene::new();
    let block = scene.place_block(Vec3::new(0.0, 0.5, 0.0));
    assert_eq!(scene.handles_of(block).len(), 3);
    let lock = scene
        .get::<crate::scale_handle::ScaleLock>(block)
        .expect("handles install a lock on their target");
    assert!(!lock.is_locked());
}

#[test]
fn grid_anchor_moves_origin() {
    let mut scene = TestScene::new();
    let anchor = scene
        .world_mut()
        .spawn((
            Transform::from_xyz(0.5, 0.0, 0.5),
            crate::grid::GridAnchor,
        ))
        .id();
    scene.frame();
    assert_eq!(scene.grid().map(|g| g.origin()), Some(Vec3::new(0.5, 0.0, 0.5)));

    scene.move_to(anchor, Vec3::new(2.0, 1.0, 0.0));
    scene.tick();
    assert_eq!(scene.grid().map(|g| g.origin()), Some(Vec3::new(2.0, 1.0, 0.0)));
}

#[test]
fn block_prefab_is_known_to_catalog() {
    let scene = TestScene::new();
    let catalog = scene.resource::<crate::catalog::BuildingCatalog>();
    assert_eq!(catalog.slot_of(BLOCK), Some(0));
}
