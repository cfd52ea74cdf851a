//! Mouse pointer as an interactor.
//!
//! The pointer entity sits on the cursor ray: at the camera while idle (so the
//! preview follows the cursor) and on a drag plane while something is held.
//! Hover and grab events go to the nearest scale handle or grabbable building
//! under the cursor.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use placement::interaction::{
    GrabEvent, GrabInteraction, Hand, HoverEnded, HoverStarted, Inert, Interactor,
    PointerOverUi,
};
use placement::physics::RigidBodyProxy;
use placement::raycast::{LayerMask, RayQuery, SceneRaycast};
use placement::scale_handle::AxisScaleHandle;
use placement::session::PlacementSession;
use placement::PlacementSet;
use rendering::camera::MainCamera;

const PICK_DISTANCE: f32 = 500.0;

#[derive(Component, Debug, Default)]
pub struct DesktopPointer;

/// What the cursor is over, or holding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerTarget {
    Handle(Entity),
    Body(Entity),
}

impl PointerTarget {
    pub fn entity(self) -> Entity {
        match self {
            PointerTarget::Handle(e) | PointerTarget::Body(e) => e,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Held {
    target: PointerTarget,
    /// Point on the plane the pointer is dragged across.
    plane_point: Vec3,
    plane_normal: Dir3,
    /// Body position minus the grab point, for whole-object drags.
    offset: Vec3,
}

#[derive(Resource, Debug, Default)]
pub struct DesktopPointerState {
    hovered: Option<PointerTarget>,
    held: Option<Held>,
}

/// Nearest handle or grabbable root from `hit` up to the scene root. `None`
/// when the chain is inert or the grab is currently disabled.
pub fn resolve_target(
    hit: Entity,
    parent_of: impl Fn(Entity) -> Option<Entity>,
    is_handle: impl Fn(Entity) -> bool,
    grab_enabled: impl Fn(Entity) -> Option<bool>,
    is_inert: impl Fn(Entity) -> bool,
) -> Option<PointerTarget> {
    let mut current = Some(hit);
    while let Some(entity) = current {
        if is_inert(entity) {
            return None;
        }
        if is_handle(entity) {
            return Some(PointerTarget::Handle(entity));
        }
        if let Some(enabled) = grab_enabled(entity) {
            return enabled.then_some(PointerTarget::Body(entity));
        }
        current = parent_of(entity);
    }
    None
}

fn spawn_desktop_pointer(mut commands: Commands) {
    commands.spawn((
        Name::new("Desktop pointer"),
        DesktopPointer,
        Interactor {
            hand: Some(Hand::Right),
        },
        Transform::default(),
    ));
}

fn cursor_ray(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) -> Option<Ray3d> {
    let cursor = windows.get_single().ok()?.cursor_position()?;
    let (camera, transform) = cameras.get_single().ok()?;
    camera.viewport_to_world(transform, cursor).ok()
}

#[allow(clippy::too_many_arguments)]
fn drive_desktop_pointer(
    mut state: ResMut<DesktopPointerState>,
    session: Res<PlacementSession>,
    over_ui: Res<PointerOverUi>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    raycast: SceneRaycast,
    parents: Query<&Parent>,
    handles: Query<(), With<AxisScaleHandle>>,
    grabbable: Query<&GrabInteraction>,
    inert: Query<(), With<Inert>>,
    mut pointers: Query<(Entity, &mut Transform), With<DesktopPointer>>,
    mut bodies: Query<&mut Transform, (With<RigidBodyProxy>, Without<DesktopPointer>)>,
    mut grabs: EventWriter<GrabEvent>,
    mut hover_started: EventWriter<HoverStarted>,
    mut hover_ended: EventWriter<HoverEnded>,
) {
    let Ok((pointer, mut pointer_transform)) = pointers.get_single_mut() else {
        return;
    };
    let Some(ray) = cursor_ray(&windows, &cameras) else {
        return;
    };

    if let Some(held) = state.held {
        if !mouse.pressed(MouseButton::Left) {
            grabs.send(GrabEvent::Ended {
                target: held.target.entity(),
                pointer,
            });
            state.held = None;
        } else {
            let plane = InfinitePlane3d {
                normal: held.plane_normal,
            };
            if let Some(distance) = ray.intersect_plane(held.plane_point, plane) {
                let point = ray.get_point(distance);
                pointer_transform.translation = point;
                if let PointerTarget::Body(body) = held.target {
                    if let Ok(mut transform) = bodies.get_mut(body) {
                        let target = point + held.offset;
                        transform.translation.x = target.x;
                        transform.translation.z = target.z;
                    }
                }
            }
            return;
        }
    }

    // Idle: the pointer looks along the cursor ray from the camera.
    *pointer_transform = Transform::from_translation(ray.origin)
        .looking_to(*ray.direction, Vec3::Y);

    let hit = (!over_ui.0)
        .then(|| {
            raycast.cast(
                ray,
                RayQuery::new(PICK_DISTANCE, LayerMask::DEFAULT_RAYCAST).with_triggers(),
                |_| false,
            )
        })
        .flatten();
    let target = hit.and_then(|hit| {
        resolve_target(
            hit.entity,
            |e| parents.get(e).ok().map(Parent::get),
            |e| handles.contains(e),
            |e| grabbable.get(e).ok().map(|g| g.enabled),
            |e| inert.contains(e),
        )
    });

    if target != state.hovered {
        if let Some(old) = state.hovered {
            hover_ended.send(HoverEnded {
                target: old.entity(),
                pointer,
            });
        }
        if let Some(new) = target {
            hover_started.send(HoverStarted {
                target: new.entity(),
                pointer,
            });
        }
        state.hovered = target;
    }

    // A click while previewing confirms the placement instead.
    if session.is_preview_active() || !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let (Some(target), Some(hit)) = (target, hit) else {
        return;
    };
    let (plane_normal, offset) = match target {
        PointerTarget::Handle(_) => (-ray.direction, Vec3::ZERO),
        PointerTarget::Body(body) => {
            let position = bodies.get(body).map(|t| t.translation).unwrap_or(hit.point);
            (Dir3::Y, position - hit.point)
        }
    };
    pointer_transform.translation = hit.point;
    state.held = Some(Held {
        target,
        plane_point: hit.point,
        plane_normal,
        offset,
    });
    grabs.send(GrabEvent::Started {
        target: target.entity(),
        pointer,
    });
    debug!("Desktop pointer grabbed {target:?}");
}

pub struct DesktopInteractorPlugin;

impl Plugin for DesktopInteractorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DesktopPointerState>()
            .add_systems(Startup, spawn_desktop_pointer)
            .add_systems(Update, drive_desktop_pointer.before(PlacementSet::Session));
    }
}
