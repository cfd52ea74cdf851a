//! Grid motion constraint: while grabbed a building slides on a fixed height
//! and jumps cell to cell; on release it lands on the nearest cell centre.

use bevy::prelude::*;

use crate::grid::{GridCell, GridDefinition};
use crate::interaction::{GrabEvent, Inert};
use crate::physics::{BodyMut, PhysicsBody, RigidBodyProxy};

/// Raised whenever a grabbed body crosses into a new cell and is resnapped.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCellChanged {
    pub entity: Entity,
    pub from: GridCell,
    pub to: GridCell,
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct GridMotionConstraint {
    pub is_grabbed: bool,
    pub fixed_y: f32,
    pub current_cell: GridCell,
}

impl GridMotionConstraint {
    pub fn begin_grab(&mut self, body: &mut impl PhysicsBody, grid: Option<&GridDefinition>) {
        self.fixed_y = body.position().y;
        if let Some(grid) = grid {
            self.current_cell = grid.cell_of(body.position());
        }
        body.set_gravity(false);
        body.zero_velocities();
        self.is_grabbed = true;
    }

    /// One simulation tick. Returns the `(from, to)` cells when the body was
    /// resnapped into a new cell.
    pub fn constrain(
        &mut self,
        body: &mut impl PhysicsBody,
        grid: Option<&GridDefinition>,
    ) -> Option<(GridCell, GridCell)> {
        if !self.is_grabbed {
            return None;
        }
        let mut position = body.position();
        position.y = self.fixed_y;
        body.set_position(position);
        body.set_angular_velocity(Vec3::ZERO);

        let grid = grid?;
        let cell = grid.cell_of(position);
        if cell == self.current_cell {
            return None;
        }
        let from = self.current_cell;
        self.current_cell = cell;
        let snapped = grid.snap(position);
        body.set_position(Vec3::new(snapped.x, self.fixed_y, snapped.z));
        Some((from, cell))
    }

    /// Without a preceding grab the current height is kept.
    pub fn end_grab(&mut self, body: &mut impl PhysicsBody, grid: Option<&GridDefinition>) {
        let y = if self.is_grabbed {
            self.fixed_y
        } else {
            body.position().y
        };
        self.is_grabbed = false;
        if let Some(grid) = grid {
            let snapped = grid.snap(body.position());
            body.set_position(Vec3::new(snapped.x, y, snapped.z));
            self.current_cell = grid.cell_of(snapped);
        }
        body.zero_velocities();
        body.set_gravity(true);
    }
}

/// Route grab events to motion constraints, in arrival order.
pub fn apply_motion_grab_events(
    grid: Option<Res<GridDefinition>>,
    mut grabs: EventReader<GrabEvent>,
    mut bodies: Query<
        (&mut GridMotionConstraint, &mut Transform, &mut RigidBodyProxy),
        Without<Inert>,
    >,
) {
    let grid = grid.as_deref();
    for ev in grabs.read() {
        let Ok((mut constraint, mut transform, mut body)) = bodies.get_mut(ev.target()) else {
            continue;
        };
        let mut view = BodyMut::new(&mut transform, &mut body);
        match ev {
            GrabEvent::Started { .. } => constraint.begin_grab(&mut view, grid),
            GrabEvent::Ended { .. } => constraint.end_grab(&mut view, grid),
        }
    }
}

pub fn constrain_grid_motion(
    grid: Option<Res<GridDefinition>>,
    mut bodies: Query<
        (
            Entity,
            &mut GridMotionConstraint,
            &mut Transform,
            &mut RigidBodyProxy,
        ),
        Without<Inert>,
    >,
    mut cell_changed: EventWriter<GridCellChanged>,
) {
    let grid = grid.as_deref();
    for (entity, mut constraint, mut transform, mut body) in &mut bodies {
        if !constraint.is_grabbed {
            continue;
        }
        let mut view = BodyMut::new(&mut transform, &mut body);
        if let Some((from, to)) = constraint.constrain(&mut view, grid) {
            cell_changed.send(GridCellChanged { entity, from, to });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridDefinition {
        GridDefinition::new(1.0, Vec3::ZERO).unwrap()
    }

    #[test]
    fn test_begin_captures_height_and_disables_gravity() {
        let mut t = Transform::from_xyz(0.2, 2.0, 0.1);
        let mut b = RigidBodyProxy {
            linear_velocity: Vec3::ONE,
            ..default()
        };
        let mut c = GridMotionConstraint::default();
        c.begin_grab(&mut BodyMut::new(&mut t, &mut b), Some(&grid()));
        assert!(c.is_grabbed);
        assert_eq!(c.fixed_y, 2.0);
        assert!(!b.gravity_enabled);
        assert_eq!(b.linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_constrain_pins_height_without_resnap_inside_cell() {
        let g = grid();
        let mut t = Transform::from_xyz(0.0, 2.0, 0.0);
        let mut b = RigidBodyProxy::default();
        let mut c = GridMotionConstraint::default();
        c.begin_grab(&mut BodyMut::new(&mut t, &mut b), Some(&g));

        t.translation = Vec3::new(0.3, 5.0, -0.2);
        b.angular_velocity = Vec3::Y;
        let changed = c.constrain(&mut BodyMut::new(&mut t, &mut b), Some(&g));
        assert!(changed.is_none());
        assert_eq!(t.translation, Vec3::new(0.3, 2.0, -0.2));
        assert_eq!(b.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_end_without_begin_keeps_current_height() {
        let g = grid();
        let mut t = Transform::from_xyz(1.4, 7.0, 0.6);
        let mut b = RigidBodyProxy::default();
        let mut c = GridMotionConstraint::default();
        c.end_grab(&mut BodyMut::new(&mut t, &mut b), Some(&g));
        assert_eq!(t.translation, Vec3::new(1.0, 7.0, 1.0));
        assert!(b.gravity_enabled);
    }

    #[test]
    fn test_without_grid_only_height_is_pinned() {
        let mut t = Transform::from_xyz(0.0, 1.0, 0.0);
        let mut b = RigidBodyProxy::default();
        let mut c = GridMotionConstraint::default();
        c.begin_grab(&mut BodyMut::new(&mut t, &mut b), None);
        t.translation = Vec3::new(3.7, 4.0, 0.0);
        assert!(c.constrain(&mut BodyMut::new(&mut t, &mut b), None).is_none());
        assert_eq!(t.translation, Vec3::new(3.7, 1.0, 0.0));
        c.end_grab(&mut BodyMut::new(&mut t, &mut b), None);
        assert_eq!(t.translation, Vec3::new(3.7, 1.0, 0.0));
        assert!(b.gravity_enabled);
    }
}
