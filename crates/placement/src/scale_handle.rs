//! Axis scale handles.
//!
//! A handle is a child control that stretches one local axis of its target.
//! The face opposite the handle stays where it is; on release every scale
//! component is rounded to whole cells, never fewer than one. While any handle of a target is
//! hovered or grabbed the target's own grab interaction and colliders are
//! switched off, so the two never compete for the same pointer.

use bevy::prelude::*;

use crate::config::{MIN_HANDLE_SCALE, SCALE_EPSILON};
use crate::error::PlacementError;
use crate::grid::GridDefinition;
use crate::hierarchy::{live_world_transform, parent_world_scale, subtree_where};
use crate::interaction::{GrabEvent, GrabInteraction, HoverEnded, HoverStarted, Inert};
use crate::physics::Collider;

/// Raised when a target's grab interaction is switched by its handles.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInteractionChanged {
    pub target: Entity,
    pub enabled: bool,
}

/// Stretches one axis of its target while grabbed. Dragging stops at
/// `MIN_HANDLE_SCALE`; releasing with a grid rounds every axis of the
/// target's scale to whole cells with a floor of one cell, so a handle
/// dragged down to the minimum comes back one cell thick.
#[derive(Component, Debug, Clone)]
pub struct AxisScaleHandle {
    /// Entity to scale. `None` means the handle's parent.
    pub target: Option<Entity>,
    axis: Vec3,
    pub keep_world_scale: bool,
    /// World distance kept between the handle and the face it controls.
    pub offset: f32,
    resolved_target: Option<Entity>,
    initialized: bool,
    hover_count: u32,
    grabbing_pointer: Option<Entity>,
    initial_grab_pointer_position: Vec3,
    initial_target_scale: Vec3,
    initial_local_scale: Vec3,
    initial_parent_world_scale: Vec3,
}

impl AxisScaleHandle {
    /// `axis` must be one of the six principal unit directions.
    pub fn new(axis: Vec3) -> Result<Self, PlacementError> {
        if !is_principal_axis(axis) {
            return Err(PlacementError::InvalidHandleAxis(axis.to_array()));
        }
        Ok(Self {
            target: None,
            axis,
            keep_world_scale: true,
            offset: 0.05,
            resolved_target: None,
            initialized: false,
            hover_count: 0,
            grabbing_pointer: None,
            initial_grab_pointer_position: Vec3::ZERO,
            initial_target_scale: Vec3::ONE,
            initial_local_scale: Vec3::ONE,
            initial_parent_world_scale: Vec3::ONE,
        })
    }

    pub fn with_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_keep_world_scale(mut self, keep: bool) -> Self {
        self.keep_world_scale = keep;
        self
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// The target this handle acts on, once resolved.
    pub fn resolved_target(&self) -> Option<Entity> {
        self.resolved_target
    }

    pub fn hover_count(&self) -> u32 {
        self.hover_count
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbing_pointer.is_some()
    }

    /// Hovered or grabbed.
    pub fn is_active(&self) -> bool {
        self.hover_count > 0 || self.is_grabbed()
    }
}

pub fn is_principal_axis(axis: Vec3) -> bool {
    let a = axis.abs();
    let ones = [a.x, a.y, a.z].iter().filter(|&&c| c == 1.0).count();
    let zeros = [a.x, a.y, a.z].iter().filter(|&&c| c == 0.0).count();
    ones == 1 && zeros == 2
}

/// `n / d`, or 1 when `d` is (nearly) zero.
pub fn safe_div(n: f32, d: f32) -> f32 {
    if d.abs() <= SCALE_EPSILON {
        1.0
    } else {
        n / d
    }
}

/// Set the target's scale and move it along `world_axis` by half the change,
/// so the face opposite the handle does not move.
pub fn apply_anchored_scale(target: &mut Transform, new_scale: Vec3, axis: Vec3) {
    let delta = new_scale - target.scale;
    target.scale = new_scale;
    target.translation += target.rotation * (delta * 0.5 * axis);
}

/// Scale the target would have with the pointer `pointer_delta` away from
/// where the grab started.
pub fn dragged_scale(initial_scale: Vec3, axis: Vec3, world_axis: Vec3, pointer_delta: Vec3) -> Vec3 {
    let amount = pointer_delta.dot(world_axis);
    (initial_scale + axis.abs() * amount).max(Vec3::splat(MIN_HANDLE_SCALE))
}

/// Which handles currently hold a target's interaction disabled, and which of
/// its colliders were switched off for them.
#[derive(Component, Debug, Clone, Default)]
pub struct ScaleLock {
    holders: Vec<Entity>,
    disabled_colliders: Vec<Entity>,
}

impl ScaleLock {
    pub fn holders(&self) -> &[Entity] {
        &self.holders
    }

    pub fn is_locked(&self) -> bool {
        !self.holders.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Resolve targets and cache the construction-time scales of new handles.
pub fn init_scale_handles(
    mut commands: Commands,
    mut handles: Query<(Entity, &mut AxisScaleHandle), Added<AxisScaleHandle>>,
    parents: Query<&Parent>,
    transforms: Query<&Transform>,
) {
    for (entity, mut handle) in &mut handles {
        if handle.initialized {
            continue;
        }
        let parent_of = |e: Entity| parents.get(e).ok().map(Parent::get);
        let local_of = |e: Entity| transforms.get(e).ok().copied();

        handle.resolved_target = handle.target.or_else(|| parent_of(entity));
        let Some(target) = handle.resolved_target else {
            warn!("Scale handle {entity:?} has no target and no parent; it stays inert");
            continue;
        };
        if let Some(mut target_commands) = commands.get_entity(target) {
            target_commands.insert_if_new(ScaleLock::default());
        }
        handle.initial_local_scale = local_of(entity).map(|t| t.scale).unwrap_or(Vec3::ONE);
        handle.initial_parent_world_scale = parent_world_scale(entity, parent_of, local_of);
        handle.initialized = true;
    }
}

/// Switch the target's grab interaction and its own colliders on or off.
#[allow(clippy::too_many_arguments)]
fn set_target_interaction(
    target: Entity,
    enable: bool,
    lock: &mut ScaleLock,
    grab: &mut Query<&mut GrabInteraction>,
    colliders: &mut Query<&mut Collider>,
    children: &Query<&Children>,
    handles: &Query<(), With<AxisScaleHandle>>,
    changed: &mut EventWriter<TargetInteractionChanged>,
) {
    if let Ok(mut interaction) = grab.get_mut(target) {
        interaction.enabled = enable;
    }
    if enable {
        for entity in lock.disabled_colliders.drain(..) {
            if let Ok(mut collider) = colliders.get_mut(entity) {
                collider.enabled = true;
            }
        }
    } else {
        let subtree = subtree_where(target, children, |e| !handles.contains(e));
        for entity in subtree {
            if let Ok(mut collider) = colliders.get_mut(entity) {
                if collider.enabled {
                    collider.enabled = false;
                    lock.disabled_colliders.push(entity);
                }
            }
        }
    }
    changed.send(TargetInteractionChanged {
        target,
        enabled: enable,
    });
}

/// Add or remove `handle` from the target's holders, toggling the target on
/// the empty/non-empty edges only.
#[allow(clippy::too_many_arguments)]
fn update_lock(
    handle: Entity,
    active: bool,
    target: Entity,
    locks: &mut Query<&mut ScaleLock>,
    grab: &mut Query<&mut GrabInteraction>,
    colliders: &mut Query<&mut Collider>,
    children: &Query<&Children>,
    handles: &Query<(), With<AxisScaleHandle>>,
    changed: &mut EventWriter<TargetInteractionChanged>,
) {
    let Ok(mut lock) = locks.get_mut(target) else {
        return;
    };
    let held = lock.holders.contains(&handle);
    if active && !held {
        lock.holders.push(handle);
        if lock.holders.len() == 1 {
            set_target_interaction(
                target, false, &mut lock, grab, colliders, children, handles, changed,
            );
        }
    } else if !active && held {
        lock.holders.retain(|&h| h != handle);
        if lock.holders.is_empty() {
            set_target_interaction(
                target, true, &mut lock, grab, colliders, children, handles, changed,
            );
        }
    }
}

/// Process hover and grab events addressed to scale handles: hover starts,
/// then grabs in arrival order, then hover ends.
#[allow(clippy::too_many_arguments)]
pub fn handle_scale_handle_events(
    grid: Option<Res<GridDefinition>>,
    mut hover_started: EventReader<HoverStarted>,
    mut hover_ended: EventReader<HoverEnded>,
    mut grabs: EventReader<GrabEvent>,
    mut handle_query: Query<&mut AxisScaleHandle, Without<Inert>>,
    mut transforms: Query<&mut Transform>,
    parents: Query<&Parent>,
    mut locks: Query<&mut ScaleLock>,
    mut grab: Query<&mut GrabInteraction>,
    mut colliders: Query<&mut Collider>,
    children: Query<&Children>,
    handles: Query<(), With<AxisScaleHandle>>,
    mut changed: EventWriter<TargetInteractionChanged>,
    mut warned_no_grid: Local<bool>,
) {
    for ev in hover_started.read() {
        let Ok(mut handle) = handle_query.get_mut(ev.target) else {
            continue;
        };
        let Some(target) = handle.resolved_target.filter(|_| handle.initialized) else {
            continue;
        };
        handle.hover_count += 1;
        update_lock(
            ev.target, true, target, &mut locks, &mut grab, &mut colliders, &children,
            &handles, &mut changed,
        );
    }

    for ev in grabs.read() {
        let Ok(mut handle) = handle_query.get_mut(ev.target()) else {
            continue;
        };
        match *ev {
            GrabEvent::Started { target: entity, pointer } => {
                let Some(target) = handle.resolved_target.filter(|_| handle.initialized) else {
                    continue;
                };
                let pointer_pose = {
                    let transforms = transforms.to_readonly();
                    live_world_transform(
                        pointer,
                        |e| parents.get(e).ok().map(Parent::get),
                        |e| transforms.get(e).ok().copied(),
                    )
                };
                let Some(pointer_pose) = pointer_pose else {
                    warn!("Grab on scale handle {entity:?} from pointer without a pose");
                    continue;
                };
                let Ok(target_transform) = transforms.get(target) else {
                    continue;
                };
                handle.grabbing_pointer = Some(pointer);
                handle.initial_grab_pointer_position = pointer_pose.translation;
                handle.initial_target_scale = target_transform.scale;
                update_lock(
                    entity, true, target, &mut locks, &mut grab, &mut colliders, &children,
                    &handles, &mut changed,
                );
            }
            GrabEvent::Ended { target: entity, pointer } => {
                if handle.grabbing_pointer != Some(pointer) {
                    continue;
                }
                handle.grabbing_pointer = None;
                let Some(target) = handle.resolved_target else {
                    continue;
                };
                // Whole cells per axis, never fewer than one.
                match grid.as_deref() {
                    Some(grid) => {
                        if let Ok(mut target_transform) = transforms.get_mut(target) {
                            let snapped = grid.snap_scale(target_transform.scale);
                            apply_anchored_scale(&mut target_transform, snapped, handle.axis);
                        }
                        *warned_no_grid = false;
                    }
                    None => {
                        if !*warned_no_grid {
                            warn!("No grid installed; scale handle release is not snapped");
                            *warned_no_grid = true;
                        }
                    }
                }
                let active = handle.is_active();
                update_lock(
                    entity, active, target, &mut locks, &mut grab, &mut colliders, &children,
                    &handles, &mut changed,
                );
            }
        }
    }

    for ev in hover_ended.read() {
        let Ok(mut handle) = handle_query.get_mut(ev.target) else {
            continue;
        };
        let Some(target) = handle.resolved_target else {
            continue;
        };
        handle.hover_count = handle.hover_count.saturating_sub(1);
        let active = handle.is_active();
        update_lock(
            ev.target, active, target, &mut locks, &mut grab, &mut colliders, &children,
            &handles, &mut changed,
        );
    }
}

/// Stretch targets of grabbed handles towards the grabbing pointer.
pub fn drag_scale_handles(
    handles: Query<&AxisScaleHandle, Without<Inert>>,
    parents: Query<&Parent>,
    mut transforms: Query<&mut Transform>,
) {
    for handle in &handles {
        let (Some(pointer), Some(target)) = (handle.grabbing_pointer, handle.resolved_target)
        else {
            continue;
        };
        let pointer_position = {
            let transforms = transforms.to_readonly();
            live_world_transform(
                pointer,
                |e| parents.get(e).ok().map(Parent::get),
                |e| transforms.get(e).ok().copied(),
            )
            .map(|t| t.translation)
        };
        let Some(pointer_position) = pointer_position else {
            continue;
        };
        let Ok(mut target_transform) = transforms.get_mut(target) else {
            continue;
        };
        let world_axis = target_transform.rotation * handle.axis;
        let new_scale = dragged_scale(
            handle.initial_target_scale,
            handle.axis,
            world_axis,
            pointer_position - handle.initial_grab_pointer_position,
        );
        apply_anchored_scale(&mut target_transform, new_scale, handle.axis);
    }
}

/// Counter the parent's scale so handles keep their construction-time world size.
pub fn keep_handle_world_scale(
    handles: Query<(Entity, &AxisScaleHandle)>,
    parents: Query<&Parent>,
    mut transforms: Query<&mut Transform>,
) {
    for (entity, handle) in &handles {
        if !handle.keep_world_scale || !handle.initialized {
            continue;
        }
        let current = {
            let transforms = transforms.to_readonly();
            parent_world_scale(
                entity,
                |e| parents.get(e).ok().map(Parent::get),
                |e| transforms.get(e).ok().copied(),
            )
        };
        let initial = handle.initial_parent_world_scale;
        let ratio = Vec3::new(
            safe_div(initial.x, current.x),
            safe_div(initial.y, current.y),
            safe_div(initial.z, current.z),
        );
        if let Ok(mut transform) = transforms.get_mut(entity) {
            let scale = handle.initial_local_scale * ratio;
            if transform.scale != scale {
                transform.scale = scale;
            }
        }
    }
}

/// Keep each handle just outside the face it controls.
pub fn layout_scale_handles(
    handles: Query<(Entity, &AxisScaleHandle, &Parent)>,
    mut transforms: Query<&mut Transform>,
) {
    for (entity, handle, parent) in &handles {
        if handle.resolved_target != Some(parent.get()) {
            continue;
        }
        let Ok(target_scale) = transforms.get(parent.get()).map(|t| t.scale) else {
            continue;
        };
        let along = handle.axis.abs().dot(target_scale);
        let local = handle.axis * (0.5 + safe_div(handle.offset, along));
        if let Ok(mut transform) = transforms.get_mut(entity) {
            if transform.translation != local {
                transform.translation = local;
            }
        }
    }
}

/// Handles that disappear give their hold on the target back.
pub fn release_removed_handles(
    mut removed: RemovedComponents<AxisScaleHandle>,
    mut locks: Query<(Entity, &mut ScaleLock)>,
    mut grab: Query<&mut GrabInteraction>,
    mut colliders: Query<&mut Collider>,
    children: Query<&Children>,
    handles: Query<(), With<AxisScaleHandle>>,
    mut changed: EventWriter<TargetInteractionChanged>,
) {
    for handle in removed.read() {
        for (target, mut lock) in &mut locks {
            if !lock.holders.contains(&handle) {
                continue;
            }
            lock.holders.retain(|&h| h != handle);
            if lock.holders.is_empty() {
                set_target_interaction(
                    target, true, &mut lock, &mut grab, &mut colliders, &children, &handles,
                    &mut changed,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_axes_only() {
        for axis in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
            assert!(AxisScaleHandle::new(axis).is_ok(), "{axis:?}");
        }
        assert_eq!(
            AxisScaleHandle::new(Vec3::new(1.0, 1.0, 0.0)).unwrap_err(),
            PlacementError::InvalidHandleAxis([1.0, 1.0, 0.0])
        );
        assert!(AxisScaleHandle::new(Vec3::ZERO).is_err());
        assert!(AxisScaleHandle::new(Vec3::new(0.5, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_anchored_up_scale_keeps_bottom_face() {
        let mut t = Transform::from_xyz(0.0, 0.5, 0.0);
        let bottom = t.translation.y - 0.5 * t.scale.y;
        let top = t.translation.y + 0.5 * t.scale.y;

        let d = 0.75;
        let new_scale = dragged_scale(t.scale, Vec3::Y, Vec3::Y, Vec3::new(0.0, d, 0.0));
        apply_anchored_scale(&mut t, new_scale, Vec3::Y);

        assert!((t.translation.y - 0.5 * t.scale.y - bottom).abs() < 1e-6);
        assert!((t.translation.y + 0.5 * t.scale.y - (top + d)).abs() < 1e-6);
    }

    #[test]
    fn test_negative_axis_grows_away_from_opposite_face() {
        let mut t = Transform::from_xyz(0.0, 0.5, 0.0);
        let top = t.translation.y + 0.5 * t.scale.y;
        let new_scale = dragged_scale(t.scale, Vec3::NEG_Y, Vec3::NEG_Y, Vec3::new(0.0, -1.0, 0.0));
        apply_anchored_scale(&mut t, new_scale, Vec3::NEG_Y);
        assert_eq!(t.scale.y, 2.0);
        assert!((t.translation.y + 0.5 * t.scale.y - top).abs() < 1e-6);
    }

    #[test]
    fn test_drag_never_below_minimum() {
        let s = dragged_scale(Vec3::ONE, Vec3::X, Vec3::X, Vec3::new(-10.0, 0.0, 0.0));
        assert_eq!(s, Vec3::new(MIN_HANDLE_SCALE, 1.0, 1.0));
    }

    #[test]
    fn test_safe_div_guards_zero() {
        assert_eq!(safe_div(2.0, 0.0), 1.0);
        assert_eq!(safe_div(2.0, 4.0), 0.5);
    }
}
