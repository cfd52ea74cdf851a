//! The placement session: selection, live preview ghost, and confirm/cancel.
//!
//! ```text
//!            PrefabSelected                 Confirm (valid cell)
//!   Idle ────────────────────▶ PreviewActive ─────────────────────▶ Idle (+ spawned)
//!    ▲                           │   ▲  │
//!    │         Cancel            │   │  │ PrefabSelected: replace ghost
//!    └───────────────────────────┘   └──┘
//! ```
//!
//! Inputs arrive as [`PrefabSelected`] and [`PlacementRequest`] events, from
//! the building panel, the debug keyboard, or a controller. All of them are
//! applied in [`PlacementSet::Session`](crate::PlacementSet::Session) in
//! arrival order.

mod input;
mod preview;
mod settings;
mod spawn;

use bevy::prelude::*;

use crate::prefab::PrefabId;
use crate::registry::PlacementId;

pub use input::{read_controller_input, read_debug_input};
pub use preview::{
    compute_half_height, prepare_preview_ghosts, track_preview_lifetime, update_preview_transform,
    PlacementRay, PreviewGhost, PreviewPrepared,
};
pub use settings::{KeyBinding, PlacementKeys, PlacementSettings};
pub use spawn::{apply_placement_requests, auto_assign_follow_origin, handle_prefab_selected};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A building type was picked, usually from the building panel.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefabSelected {
    pub slot: Option<usize>,
    pub prefab: PrefabId,
}

/// The session's selected prefab changed (`None` when cleared).
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedPrefabChanged {
    pub prefab: Option<PrefabId>,
}

/// A real building was instantiated.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefabSpawned {
    pub entity: Entity,
    pub prefab: PrefabId,
    pub id: PlacementId,
}

/// Operations on the session.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum PlacementRequest {
    /// Select the prefab in catalog slot `n`.
    SelectSlot(usize),
    Confirm,
    Cancel,
    /// Rotate the preview by this many degrees (positive is counter-clockwise
    /// seen from above).
    RotateBy(f32),
    SpawnSelectedAtDefault,
    SpawnSelectedAt(Transform),
}

// ---------------------------------------------------------------------------
// Scene markers
// ---------------------------------------------------------------------------

/// The entity that owns placement: its pose is the last-resort ray origin and
/// spawn point.
#[derive(Component, Debug, Default)]
pub struct PlacementController;

/// Where "spawn at default point" puts buildings.
#[derive(Component, Debug, Default)]
pub struct DefaultSpawnPoint;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementState {
    Idle,
    PreviewActive,
}

/// Edge detection for polled controller buttons and the rotate stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerEdgeState {
    pub last_confirm: bool,
    pub last_cancel: bool,
    pub stick_ready: bool,
}

impl Default for ControllerEdgeState {
    fn default() -> Self {
        Self {
            last_confirm: false,
            last_cancel: false,
            stick_ready: true,
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct PlacementSession {
    pub selected_slot: Option<usize>,
    pub selected_prefab: Option<PrefabId>,
    pub preview: Option<Entity>,
    pub preview_has_valid_cell: bool,
    pub preview_half_height: f32,
    /// Degrees about +Y.
    pub current_yaw: f32,
    pub last_valid_position: Vec3,
    pub last_valid_rotation: Quat,
    pub edges: ControllerEdgeState,
    /// Pointer whose forward ray drives the preview. Overrides the camera.
    pub follow_origin: Option<Entity>,
    /// Set when the settings failed validation; the session ignores all input.
    pub inert: bool,
}

impl Default for PlacementSession {
    fn default() -> Self {
        Self {
            selected_slot: None,
            selected_prefab: None,
            preview: None,
            preview_has_valid_cell: false,
            preview_half_height: 0.0,
            current_yaw: 0.0,
            last_valid_position: Vec3::ZERO,
            last_valid_rotation: Quat::IDENTITY,
            edges: ControllerEdgeState::default(),
            follow_origin: None,
            inert: false,
        }
    }
}

impl PlacementSession {
    pub fn state(&self) -> PlacementState {
        if self.preview.is_some() {
            PlacementState::PreviewActive
        } else {
            PlacementState::Idle
        }
    }

    pub fn is_preview_active(&self) -> bool {
        self.preview.is_some()
    }

    pub fn bind_follow_origin(&mut self, origin: Option<Entity>) {
        self.follow_origin = origin;
    }

    /// Forget the preview and everything measured from it.
    pub fn reset_preview_state(&mut self) {
        self.preview = None;
        self.preview_has_valid_cell = false;
        self.preview_half_height = 0.0;
        self.edges = ControllerEdgeState::default();
    }
}

/// Validate settings once; invalid settings leave the session inert.
pub fn validate_placement_settings(
    settings: Res<PlacementSettings>,
    mut session: ResMut<PlacementSession>,
) {
    match settings.validate() {
        Ok(()) => session.inert = false,
        Err(e) => {
            error!("Placement disabled: {e}");
            session.inert = true;
        }
    }
}

pub struct PlacementSessionPlugin;

impl Plugin for PlacementSessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlacementSession>()
            .init_resource::<PlacementSettings>()
            .init_resource::<PlacementKeys>()
            .add_event::<PrefabSelected>()
            .add_event::<SelectedPrefabChanged>()
            .add_event::<PrefabSpawned>()
            .add_event::<PlacementRequest>()
            .add_systems(Startup, validate_placement_settings)
            .add_systems(
                Update,
                (
                    track_preview_lifetime,
                    auto_assign_follow_origin,
                    handle_prefab_selected,
                    prepare_preview_ghosts,
                    update_preview_transform,
                    read_debug_input,
                    read_controller_input,
                    apply_placement_requests,
                )
                    .chain()
                    .in_set(crate::PlacementSet::Session),
            );
    }
}
