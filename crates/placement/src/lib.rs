use bevy::prelude::*;
use bevy::transform::TransformSystem;

pub mod catalog;
pub mod config;
pub mod error;
pub mod grid;
pub mod hierarchy;
pub mod interaction;
pub mod manipulable;
pub mod motion_constraint;
pub mod physics;
pub mod planar_constraint;
pub mod prefab;
pub mod raycast;
pub mod registry;
pub mod scale_handle;
pub mod session;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

use motion_constraint::{apply_motion_grab_events, constrain_grid_motion, GridCellChanged};
use planar_constraint::{apply_planar_grab_events, constrain_planar_orientation};
use registry::{prune_placed_registry, PlacedRegistry};
use scale_handle::{
    drag_scale_handles, handle_scale_handle_events, init_scale_handles, keep_handle_world_scale,
    layout_scale_handles, release_removed_handles, TargetInteractionChanged,
};

/// Ordering of placement work.
///
/// In `FixedUpdate`: grab/hover events are applied (`Interaction`), then
/// grabbed bodies are constrained (`Constrain`), then bodies are integrated
/// (`Integrate`). In `Update`: the session runs (`Session`) before anything
/// that draws its result (`Visual`).
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementSet {
    Interaction,
    Constrain,
    Integrate,
    Session,
    Visual,
}

pub struct PlacementPlugin;

impl Plugin for PlacementPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                PlacementSet::Interaction,
                PlacementSet::Constrain,
                PlacementSet::Integrate,
            )
                .chain(),
        )
        .configure_sets(Update, (PlacementSet::Session, PlacementSet::Visual).chain());

        app.init_resource::<PlacedRegistry>()
            .add_event::<GridCellChanged>()
            .add_event::<TargetInteractionChanged>();

        app.add_plugins((
            grid::GridPlugin,
            interaction::InteractionPlugin,
            session::PlacementSessionPlugin,
        ));

        app.add_systems(
            FixedUpdate,
            (
                init_scale_handles,
                handle_scale_handle_events,
                apply_motion_grab_events,
                apply_planar_grab_events,
            )
                .chain()
                .in_set(PlacementSet::Interaction),
        )
        .add_systems(
            FixedUpdate,
            (
                constrain_grid_motion,
                constrain_planar_orientation,
                drag_scale_handles,
            )
                .chain()
                .in_set(PlacementSet::Constrain),
        )
        .add_systems(
            PostUpdate,
            (
                init_scale_handles,
                release_removed_handles,
                keep_handle_world_scale,
                layout_scale_handles,
            )
                .chain()
                .before(TransformSystem::TransformPropagate),
        )
        .add_systems(PostUpdate, prune_placed_registry);
    }
}
