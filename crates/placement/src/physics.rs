//! Rigid-body proxy.
//!
//! Placement never talks to a physics engine directly. Bodies are described by
//! a [`RigidBodyProxy`] next to their `Transform`, and constraints are written
//! against the [`PhysicsBody`] trait. [`ProxyPhysicsPlugin`] is a small
//! integrator for scenes without an external engine.

use bevy::prelude::*;

use crate::config::{GRAVITY, MIN_SPAWNED_BODY_MASS};
use crate::grid::GridDefinition;

/// Degrees of freedom a body is not allowed to move in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyLocks {
    pub translation_y: bool,
    pub rotation_x: bool,
    pub rotation_z: bool,
}

impl BodyLocks {
    pub const NONE: Self = Self {
        translation_y: false,
        rotation_x: false,
        rotation_z: false,
    };

    /// Keep the body on its current height and upright.
    pub const VERTICAL_AND_TILT: Self = Self {
        translation_y: true,
        rotation_x: true,
        rotation_z: true,
    };

    pub fn apply_linear(&self, mut v: Vec3) -> Vec3 {
        if self.translation_y {
            v.y = 0.0;
        }
        v
    }

    pub fn apply_angular(&self, mut w: Vec3) -> Vec3 {
        if self.rotation_x {
            w.x = 0.0;
        }
        if self.rotation_z {
            w.z = 0.0;
        }
        w
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct RigidBodyProxy {
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub gravity_enabled: bool,
    pub kinematic: bool,
    pub collisions_enabled: bool,
    pub locks: BodyLocks,
}

impl Default for RigidBodyProxy {
    fn default() -> Self {
        Self {
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
            gravity_enabled: true,
            kinematic: false,
            collisions_enabled: true,
            locks: BodyLocks::NONE,
        }
    }
}

impl RigidBodyProxy {
    /// A dynamic body as created for a freshly spawned building.
    pub fn spawned(mass: f32, gravity: bool, locks: BodyLocks) -> Self {
        Self {
            mass: mass.max(MIN_SPAWNED_BODY_MASS),
            gravity_enabled: gravity,
            locks,
            ..default()
        }
    }
}

/// Box collider in the entity's local space.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub half_extents: Vec3,
    pub offset: Vec3,
    pub enabled: bool,
    pub is_trigger: bool,
}

impl Collider {
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self {
            half_extents,
            offset: Vec3::ZERO,
            enabled: true,
            is_trigger: false,
        }
    }

    pub fn trigger(half_extents: Vec3) -> Self {
        Self {
            is_trigger: true,
            ..Self::cuboid(half_extents)
        }
    }

    /// Lowest local-space point of the box, before the entity's scale.
    pub fn bottom(&self) -> f32 {
        self.offset.y - self.half_extents.y
    }
}

/// Explicit render/physics bounds of a prefab, in the root's local space.
/// Takes precedence over colliders when measuring a preview's half height.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PlacementBounds {
    pub half_extents: Vec3,
}

/// The body interface constraints are written against.
pub trait PhysicsBody {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);
    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn angular_velocity(&self) -> Vec3;
    fn set_angular_velocity(&mut self, velocity: Vec3);
    fn gravity_enabled(&self) -> bool;
    fn set_gravity(&mut self, enabled: bool);

    fn zero_velocities(&mut self) {
        self.set_linear_velocity(Vec3::ZERO);
        self.set_angular_velocity(Vec3::ZERO);
    }
}

/// Mutable view of a root-level body: its transform is its world pose.
pub struct BodyMut<'a> {
    pub transform: &'a mut Transform,
    pub body: &'a mut RigidBodyProxy,
}

impl<'a> BodyMut<'a> {
    pub fn new(transform: &'a mut Transform, body: &'a mut RigidBodyProxy) -> Self {
        Self { transform, body }
    }
}

impl PhysicsBody for BodyMut<'_> {
    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn set_position(&mut self, position: Vec3) {
        self.transform.translation = position;
    }

    fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }

    fn linear_velocity(&self) -> Vec3 {
        self.body.linear_velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.body.linear_velocity = velocity;
    }

    fn angular_velocity(&self) -> Vec3 {
        self.body.angular_velocity
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.body.angular_velocity = velocity;
    }

    fn gravity_enabled(&self) -> bool {
        self.body.gravity_enabled
    }

    fn set_gravity(&mut self, enabled: bool) {
        self.body.gravity_enabled = enabled;
    }
}

// ---------------------------------------------------------------------------
// Integrator
// ---------------------------------------------------------------------------

/// Advance one dynamic body by `dt` seconds. With `ground` set, the body's
/// collider bottom is kept on or above that height.
pub fn step_body(
    transform: &mut Transform,
    body: &mut RigidBodyProxy,
    collider: Option<&Collider>,
    dt: f32,
    ground: Option<f32>,
) {
    if body.kinematic || dt <= 0.0 {
        return;
    }

    if body.gravity_enabled {
        body.linear_velocity.y += GRAVITY * dt;
    }
    body.linear_velocity = body.locks.apply_linear(body.linear_velocity);
    body.angular_velocity = body.locks.apply_angular(body.angular_velocity);

    transform.translation += body.linear_velocity * dt;
    if body.angular_velocity != Vec3::ZERO {
        transform.rotation =
            (Quat::from_scaled_axis(body.angular_velocity * dt) * transform.rotation).normalize();
    }

    let (Some(ground), Some(collider)) = (ground, collider) else {
        return;
    };
    if !body.collisions_enabled || !collider.enabled || collider.is_trigger {
        return;
    }
    let bottom = transform.translation.y + collider.bottom() * transform.scale.y;
    if bottom < ground {
        transform.translation.y += ground - bottom;
        if body.linear_velocity.y < 0.0 {
            body.linear_velocity.y = 0.0;
        }
    }
}

pub fn integrate_bodies(
    time: Res<Time>,
    grid: Option<Res<GridDefinition>>,
    mut bodies: Query<(&mut Transform, &mut RigidBodyProxy, Option<&Collider>), Without<Parent>>,
) {
    let dt = time.delta_secs();
    let ground = grid.map(|g| g.origin().y);
    for (mut transform, mut body, collider) in &mut bodies {
        step_body(&mut transform, &mut body, collider, dt, ground);
    }
}

/// Adds the proxy integrator. Only needed when no external physics engine
/// drives the bodies.
pub struct ProxyPhysicsPlugin;

impl Plugin for ProxyPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            integrate_bodies.in_set(crate::PlacementSet::Integrate),
        );
    }
}
