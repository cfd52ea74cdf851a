use bevy::prelude::*;

use crate::interaction::{GrabEvent, Inert};
use crate::physics::{BodyMut, PhysicsBody, RigidBodyProxy};

/// Yaw of `rotation` in radians, measured about +Y.
pub fn yaw_of(rotation: Quat) -> f32 {
    rotation.to_euler(EulerRot::YXZ).0
}

/// Keeps a grabbed body upright: rotation is reduced to its yaw and vertical
/// velocity is stripped every tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlanarOrientationConstraint {
    pub is_grabbed: bool,
    /// Yaw in radians at construction; used when the live rotation is degenerate.
    pub fixed_yaw: f32,
}

impl PlanarOrientationConstraint {
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            is_grabbed: false,
            fixed_yaw: yaw_of(rotation),
        }
    }

    pub fn begin_grab(&mut self, body: &mut impl PhysicsBody) {
        body.set_gravity(false);
        body.zero_velocities();
        self.is_grabbed = true;
    }

    pub fn constrain(&self, body: &mut impl PhysicsBody) {
        if !self.is_grabbed {
            return;
        }
        let yaw = yaw_of(body.rotation());
        let yaw = if yaw.is_finite() { yaw } else { self.fixed_yaw };
        body.set_rotation(Quat::from_rotation_y(yaw));
        body.set_angular_velocity(Vec3::ZERO);
        let mut v = body.linear_velocity();
        v.y = 0.0;
        body.set_linear_velocity(v);
    }

    pub fn end_grab(&mut self, body: &mut impl PhysicsBody) {
        self.is_grabbed = false;
        body.zero_velocities();
        body.set_gravity(true);
    }
}

pub fn apply_planar_grab_events(
    mut grabs: EventReader<GrabEvent>,
    mut bodies: Query<
        (
            &mut PlanarOrientationConstraint,
            &mut Transform,
            &mut RigidBodyProxy,
        ),
        Without<Inert>,
    >,
) {
    for ev in grabs.read() {
        let Ok((mut constraint, mut transform, mut body)) = bodies.get_mut(ev.target()) else {
            continue;
        };
        let mut view = BodyMut::new(&mut transform, &mut body);
        match ev {
            GrabEvent::Started { .. } => constraint.begin_grab(&mut view),
            GrabEvent::Ended { .. } => constraint.end_grab(&mut view),
        }
    }
}

pub fn constrain_planar_orientation(
    mut bodies: Query<
        (
            &PlanarOrientationConstraint,
            &mut Transform,
            &mut RigidBodyProxy,
        ),
        Without<Inert>,
    >,
) {
    for (constraint, mut transform, mut body) in &mut bodies {
        if constraint.is_grabbed {
            constraint.constrain(&mut BodyMut::new(&mut transform, &mut body));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constrain_strips_pitch_and_roll() {
        let mut t = Transform::from_rotation(Quat::from_euler(EulerRot::YXZ, 0.7, 0.3, -0.4));
        let mut b = RigidBodyProxy {
            linear_velocity: Vec3::new(1.0, 2.0, 3.0),
            angular_velocity: Vec3::ONE,
            ..default()
        };
        let mut c = PlanarOrientationConstraint::from_rotation(Quat::IDENTITY);
        c.begin_grab(&mut BodyMut::new(&mut t, &mut b));
        b.linear_velocity = Vec3::new(1.0, 2.0, 3.0);
        c.constrain(&mut BodyMut::new(&mut t, &mut b));

        let (yaw, pitch, roll) = t.rotation.to_euler(EulerRot::YXZ);
        assert!((yaw - 0.7).abs() < 1e-4);
        assert!(pitch.abs() < 1e-5 && roll.abs() < 1e-5);
        assert_eq!(b.linear_velocity, Vec3::new(1.0, 0.0, 3.0));
        assert_eq!(b.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_idle_constraint_leaves_body_alone() {
        let rotation = Quat::from_rotation_x(0.5);
        let mut t = Transform::from_rotation(rotation);
        let mut b = RigidBodyProxy::default();
        let c = PlanarOrientationConstraint::from_rotation(Quat::IDENTITY);
        c.constrain(&mut BodyMut::new(&mut t, &mut b));
        assert_eq!(t.rotation, rotation);
    }

    #[test]
    fn test_end_grab_restores_gravity() {
        let mut t = Transform::default();
        let mut b = RigidBodyProxy::default();
        let mut c = PlanarOrientationConstraint::default();
        c.begin_grab(&mut BodyMut::new(&mut t, &mut b));
        assert!(!b.gravity_enabled);
        c.end_grab(&mut BodyMut::new(&mut t, &mut b));
        assert!(b.gravity_enabled && !c.is_grabbed);
    }
}
