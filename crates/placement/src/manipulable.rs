//! Turning a freshly instantiated prefab into a manipulable building.

use bevy::prelude::*;

use crate::interaction::GrabInteraction;
use crate::motion_constraint::GridMotionConstraint;
use crate::physics::{BodyLocks, RigidBodyProxy};
use crate::planar_constraint::PlanarOrientationConstraint;
use crate::session::PlacementSettings;

/// What a [`ManipulableBuilder`] attached to a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManipulableInstance {
    pub root: Entity,
    pub body: bool,
    pub grab: bool,
    pub motion_constraint: bool,
    pub planar_constraint: bool,
}

/// Adds the body, grab interaction and both constraints to a building root.
/// Components the prefab already carries are left as authored.
#[derive(Debug, Clone)]
pub struct ManipulableBuilder {
    body: Option<RigidBodyProxy>,
    grab: bool,
    motion_constraint: bool,
    planar_constraint: Option<Quat>,
}

impl ManipulableBuilder {
    pub fn new() -> Self {
        Self {
            body: None,
            grab: false,
            motion_constraint: false,
            planar_constraint: None,
        }
    }

    pub fn from_settings(settings: &PlacementSettings, rotation: Quat) -> Self {
        let mut builder = Self::new();
        if settings.add_body_if_missing {
            let locks = if settings.freeze_vertical_and_tilt {
                BodyLocks::VERTICAL_AND_TILT
            } else {
                BodyLocks::NONE
            };
            builder = builder.with_body(RigidBodyProxy::spawned(
                settings.spawned_body_mass,
                settings.enable_gravity_on_spawn,
                locks,
            ));
        }
        if settings.add_grab_interaction_if_missing {
            builder = builder.with_grab();
        }
        if settings.add_grid_motion_constraint_if_missing {
            builder = builder.with_motion_constraint();
        }
        if settings.add_planar_constraint_if_missing {
            builder = builder.with_planar_constraint(rotation);
        }
        builder
    }

    pub fn with_body(mut self, body: RigidBodyProxy) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_grab(mut self) -> Self {
        self.grab = true;
        self
    }

    pub fn with_motion_constraint(mut self) -> Self {
        self.motion_constraint = true;
        self
    }

    pub fn with_planar_constraint(mut self, rotation: Quat) -> Self {
        self.planar_constraint = Some(rotation);
        self
    }

    pub fn build(self, commands: &mut Commands, root: Entity) -> Option<ManipulableInstance> {
        let mut entity = commands.get_entity(root)?;
        if let Some(body) = self.body {
            entity.insert_if_new(body);
        }
        if self.grab {
            entity.insert_if_new(GrabInteraction::default());
        }
        if self.motion_constraint {
            entity.insert_if_new(GridMotionConstraint::default());
        }
        if let Some(rotation) = self.planar_constraint {
            entity.insert_if_new(PlanarOrientationConstraint::from_rotation(rotation));
        }
        Some(ManipulableInstance {
            root,
            body: self.body.is_some(),
            grab: self.grab,
            motion_constraint: self.motion_constraint,
            planar_constraint: self.planar_constraint.is_some(),
        })
    }
}

impl Default for ManipulableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
