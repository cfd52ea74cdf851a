use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::render::primitives::Aabb;

use super::{DefaultSpawnPoint, PlacementController, PlacementSession, PlacementSettings};
use crate::grid::GridDefinition;
use crate::hierarchy::{live_world_transform, subtree_where};
use crate::interaction::{GrabInteraction, Inert};
use crate::physics::{Collider, PlacementBounds, RigidBodyProxy};
use crate::raycast::{RayQuery, RaycastLayers, SceneRaycast};
use crate::scale_handle::AxisScaleHandle;

/// Root of the session's preview ghost.
#[derive(Component, Debug, Default)]
pub struct PreviewGhost;

/// Added once a ghost has been made inert, non-colliding and measured.
/// Renderers react to it to tint the ghost.
#[derive(Component, Debug, Default)]
pub struct PreviewPrepared;

/// Everything needed to build the placement ray and resolve spawn poses.
#[derive(SystemParam)]
pub struct PlacementRay<'w, 's> {
    cameras: Query<'w, 's, (&'static Camera, &'static GlobalTransform)>,
    spawn_points: Query<'w, 's, Entity, With<DefaultSpawnPoint>>,
    controllers: Query<'w, 's, Entity, With<PlacementController>>,
    parents: Query<'w, 's, &'static Parent>,
    transforms: Query<'w, 's, &'static Transform, Without<PreviewGhost>>,
}

impl PlacementRay<'_, '_> {
    /// Live world pose of `entity`.
    pub fn world_pose(&self, entity: Entity) -> Option<Transform> {
        live_world_transform(
            entity,
            |e| self.parents.get(e).ok().map(Parent::get),
            |e| self.transforms.get(e).ok().copied(),
        )
    }

    fn forward_ray(&self, entity: Entity) -> Option<Ray3d> {
        let pose = self.world_pose(entity)?;
        Some(Ray3d::new(pose.translation, pose.forward()))
    }

    fn screen_centre_ray(&self) -> Option<Ray3d> {
        self.cameras
            .iter()
            .filter(|(camera, _)| camera.is_active)
            .find_map(|(camera, transform)| {
                let size = camera.logical_viewport_size()?;
                camera.viewport_to_world(transform, size * 0.5).ok()
            })
    }

    /// Bound pointer, then screen-centre camera ray, then the default spawn
    /// point's forward, then the controller's forward.
    pub fn build(&self, session: &PlacementSession) -> Option<Ray3d> {
        session
            .follow_origin
            .and_then(|e| self.forward_ray(e))
            .or_else(|| self.screen_centre_ray())
            .or_else(|| self.spawn_points.iter().next().and_then(|e| self.forward_ray(e)))
            .or_else(|| self.controllers.iter().next().and_then(|e| self.forward_ray(e)))
    }

    /// Pose of the default spawn point, falling back to the controller.
    pub fn default_spawn_pose(&self) -> Option<Transform> {
        self.spawn_points
            .iter()
            .next()
            .and_then(|e| self.world_pose(e))
            .or_else(|| self.controllers.iter().next().and_then(|e| self.world_pose(e)))
    }

    /// Whether a dedicated spawn point exists (its scale may be copied).
    pub fn spawn_point_pose(&self) -> Option<Transform> {
        self.spawn_points.iter().next().and_then(|e| self.world_pose(e))
    }
}

/// World hit under `ray`, falling back to the grid plane.
pub fn placement_point(
    ray: Ray3d,
    settings: &PlacementSettings,
    grid: Option<&GridDefinition>,
    raycast: &SceneRaycast,
) -> Option<Vec3> {
    let query = RayQuery::new(settings.preview_ray_distance, settings.preview_raycast_mask);
    if let Some(hit) = raycast.cast(ray, query, |_| false) {
        return Some(hit.point);
    }
    let distance = grid?.intersect_plane(ray)?;
    Some(ray.get_point(distance))
}

/// Move the ghost to the snapped point under the placement ray. Returns
/// whether a valid cell was found.
pub(crate) fn reposition_preview(
    session: &mut PlacementSession,
    settings: &PlacementSettings,
    grid: Option<&GridDefinition>,
    ray: Option<Ray3d>,
    raycast: &SceneRaycast,
    transform: &mut Transform,
    visibility: &mut Visibility,
) -> bool {
    let Some(mut point) = ray.and_then(|ray| placement_point(ray, settings, grid, raycast)) else {
        session.preview_has_valid_cell = false;
        if settings.hide_preview_when_no_hit {
            *visibility = Visibility::Hidden;
        }
        return false;
    };

    if let Some(grid) = grid {
        point = grid.snap(point);
    }
    point.y += session.preview_half_height + settings.preview_lift;

    let rotation = if settings.force_identity_rotation {
        Quat::IDENTITY
    } else {
        Quat::from_rotation_y(session.current_yaw.to_radians())
    };

    transform.translation = point;
    transform.rotation = rotation;
    *visibility = Visibility::Inherited;

    session.last_valid_position = point;
    session.last_valid_rotation = rotation;
    session.preview_has_valid_cell = true;
    true
}

/// Forget a preview that was despawned behind the session's back.
pub fn track_preview_lifetime(
    mut session: ResMut<PlacementSession>,
    ghosts: Query<(), With<PreviewGhost>>,
) {
    let Some(preview) = session.preview else {
        return;
    };
    if !ghosts.contains(preview) {
        debug!("Preview {preview:?} disappeared; clearing session state");
        session.reset_preview_state();
    }
}

/// Vertical half extent of the entity tree under `root` in world space,
/// ignoring scale handles. Explicit [`PlacementBounds`] win, then mesh bounds,
/// then colliders.
#[allow(clippy::too_many_arguments)]
pub fn compute_half_height(
    root: Entity,
    children: &Query<&Children>,
    handles: &Query<(), With<AxisScaleHandle>>,
    placement_bounds: &Query<&PlacementBounds>,
    mesh_bounds: &Query<&Aabb>,
    colliders: &Query<&mut Collider>,
    parents: &Query<&Parent>,
    transforms: &Query<&Transform>,
) -> f32 {
    let world_of = |e: Entity| {
        live_world_transform(
            e,
            |e| parents.get(e).ok().map(Parent::get),
            |e| transforms.get(e).ok().copied(),
        )
    };

    if let (Ok(bounds), Some(world)) = (placement_bounds.get(root), world_of(root)) {
        let (lo, hi) = vertical_span(&world, Vec3::ZERO, bounds.half_extents);
        return ((hi - lo) * 0.5).max(0.0);
    }

    let tree = subtree_where(root, children, |e| !handles.contains(e));
    let span = |boxes: Vec<(Entity, Vec3, Vec3)>| {
        boxes
            .into_iter()
            .filter_map(|(e, center, half)| world_of(e).map(|w| vertical_span(&w, center, half)))
            .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)))
    };

    let meshes: Vec<_> = tree
        .iter()
        .filter_map(|&e| {
            mesh_bounds
                .get(e)
                .ok()
                .map(|aabb| (e, Vec3::from(aabb.center), Vec3::from(aabb.half_extents)))
        })
        .collect();
    let from_colliders = || {
        let boxes: Vec<_> = tree
            .iter()
            .filter_map(|&e| colliders.get(e).ok().map(|c| (e, c.offset, c.half_extents)))
            .collect();
        span(boxes)
    };

    span(meshes)
        .or_else(from_colliders)
        .map(|(lo, hi)| ((hi - lo) * 0.5).max(0.0))
        .unwrap_or(0.0)
}

/// World-space min/max Y of a local box under `world`.
fn vertical_span(world: &Transform, center: Vec3, half: Vec3) -> (f32, f32) {
    let m = Mat3::from_quat(world.rotation) * Mat3::from_diagonal(world.scale);
    let extent = m.x_axis.y.abs() * half.x + m.y_axis.y.abs() * half.y + m.z_axis.y.abs() * half.z;
    let y = world.transform_point(center).y;
    (y - extent, y + extent)
}

/// Make new ghosts inert and non-colliding, hide them from raycasts, and
/// measure their half height once.
#[allow(clippy::too_many_arguments)]
pub fn prepare_preview_ghosts(
    mut commands: Commands,
    settings: Res<PlacementSettings>,
    mut session: ResMut<PlacementSession>,
    ghosts: Query<Entity, (With<PreviewGhost>, Without<PreviewPrepared>)>,
    children: Query<&Children>,
    handles: Query<(), With<AxisScaleHandle>>,
    placement_bounds: Query<&PlacementBounds>,
    mesh_bounds: Query<&Aabb>,
    mut colliders: Query<&mut Collider>,
    mut bodies: Query<&mut RigidBodyProxy>,
    mut grab: Query<&mut GrabInteraction>,
    parents: Query<&Parent>,
    transforms: Query<&Transform>,
) {
    for root in &ghosts {
        let half_height = compute_half_height(
            root,
            &children,
            &handles,
            &placement_bounds,
            &mesh_bounds,
            &colliders,
            &parents,
            &transforms,
        );
        if session.preview == Some(root) {
            session.preview_half_height = half_height;
        }

        for entity in subtree_where(root, &children, |_| true) {
            if let Ok(mut body) = bodies.get_mut(entity) {
                body.gravity_enabled = false;
                body.kinematic = true;
                body.collisions_enabled = false;
                body.linear_velocity = Vec3::ZERO;
                body.angular_velocity = Vec3::ZERO;
            }
            if let Ok(mut collider) = colliders.get_mut(entity) {
                collider.enabled = false;
            }
            if let Ok(mut interaction) = grab.get_mut(entity) {
                interaction.enabled = false;
            }
            let mut entity_commands = commands.entity(entity);
            entity_commands.insert(RaycastLayers::IGNORE_RAYCAST);
            if settings.disable_behaviours_on_preview {
                entity_commands.insert(Inert);
            }
        }
        commands.entity(root).insert((PreviewPrepared, Inert));
        debug!("Preview {root:?} prepared, half height {half_height}");
    }
}

/// Follow the placement ray with the active ghost.
#[allow(clippy::too_many_arguments)]
pub fn update_preview_transform(
    mut session: ResMut<PlacementSession>,
    settings: Res<PlacementSettings>,
    grid: Option<Res<GridDefinition>>,
    rays: PlacementRay,
    raycast: SceneRaycast,
    mut ghosts: Query<(&mut Transform, &mut Visibility), (With<PreviewGhost>, With<PreviewPrepared>)>,
    mut warned_no_origin: Local<bool>,
    mut warned_no_grid: Local<bool>,
) {
    if session.inert || !settings.use_preview_placement {
        return;
    }
    let Some(preview) = session.preview else {
        return;
    };
    let Ok((mut transform, mut visibility)) = ghosts.get_mut(preview) else {
        return;
    };

    let ray = rays.build(&session);
    match (ray.is_some(), *warned_no_origin) {
        (false, false) => {
            warn!("No follow origin, camera, spawn point or controller to aim the preview with");
            *warned_no_origin = true;
        }
        (true, true) => *warned_no_origin = false,
        _ => {}
    }
    match (grid.is_some(), *warned_no_grid) {
        (false, false) => {
            warn!("No grid installed; the preview will not snap");
            *warned_no_grid = true;
        }
        (true, true) => *warned_no_grid = false,
        _ => {}
    }

    reposition_preview(
        &mut session,
        &settings,
        grid.as_deref(),
        ray,
        &raycast,
        &mut transform,
        &mut visibility,
    );
}
