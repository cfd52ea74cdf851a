//! Ray queries against placement colliders.

use bevy::ecs::system::SystemParam;
use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::prelude::*;

use crate::physics::Collider;

/// Layers an entity's colliders belong to. Entities without the component are
/// on [`RaycastLayers::DEFAULT`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaycastLayers(pub u32);

impl RaycastLayers {
    pub const DEFAULT: Self = Self(1);
    pub const IGNORE_RAYCAST: Self = Self(1 << 2);
}

impl Default for RaycastLayers {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Which layers a query hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const DEFAULT_RAYCAST: Self = Self(!RaycastLayers::IGNORE_RAYCAST.0);

    pub fn contains(&self, layers: RaycastLayers) -> bool {
        self.0 & layers.0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::DEFAULT_RAYCAST
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub point: Vec3,
    pub distance: f32,
}

/// Options for a single cast.
#[derive(Debug, Clone, Copy)]
pub struct RayQuery {
    pub max_distance: f32,
    pub mask: LayerMask,
    pub include_triggers: bool,
}

impl RayQuery {
    pub fn new(max_distance: f32, mask: LayerMask) -> Self {
        Self {
            max_distance,
            mask,
            include_triggers: false,
        }
    }

    pub fn with_triggers(mut self) -> Self {
        self.include_triggers = true;
        self
    }
}

/// Distance along `ray` to a box collider posed by `world`, within `max_distance`.
pub fn ray_collider_distance(
    ray: Ray3d,
    max_distance: f32,
    collider: &Collider,
    world: &GlobalTransform,
) -> Option<f32> {
    let inverse = world.affine().inverse();
    let local_origin = inverse.transform_point3(ray.origin);
    let local_dir = inverse.transform_vector3(*ray.direction);
    let stretch = local_dir.length();
    let local_dir = Dir3::new(local_dir).ok()?;

    let cast = RayCast3d::new(local_origin, local_dir, max_distance * stretch);
    let aabb = Aabb3d::new(collider.offset, collider.half_extents);
    cast.aabb_intersection_at(&aabb).map(|t| t / stretch)
}

/// Casts rays against every enabled [`Collider`] in the scene.
///
/// Uses `GlobalTransform`, so poses are as of the last transform propagation.
#[derive(SystemParam)]
pub struct SceneRaycast<'w, 's> {
    colliders: Query<
        'w,
        's,
        (
            Entity,
            &'static Collider,
            &'static GlobalTransform,
            Option<&'static RaycastLayers>,
        ),
    >,
}

impl SceneRaycast<'_, '_> {
    /// Nearest hit, skipping entities for which `skip` returns true.
    pub fn cast(
        &self,
        ray: Ray3d,
        query: RayQuery,
        skip: impl Fn(Entity) -> bool,
    ) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for (entity, collider, world, layers) in &self.colliders {
            if !collider.enabled || (collider.is_trigger && !query.include_triggers) {
                continue;
            }
            if !query.mask.contains(layers.copied().unwrap_or_default()) || skip(entity) {
                continue;
            }
            let Some(distance) = ray_collider_distance(ray, query.max_distance, collider, world)
            else {
                continue;
            };
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(RayHit {
                    entity,
                    point: ray.get_point(distance),
                    distance,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_excludes_ignore_layer() {
        assert!(LayerMask::DEFAULT_RAYCAST.contains(RaycastLayers::DEFAULT));
        assert!(!LayerMask::DEFAULT_RAYCAST.contains(RaycastLayers::IGNORE_RAYCAST));
        assert!(LayerMask::ALL.contains(RaycastLayers::IGNORE_RAYCAST));
    }

    #[test]
    fn test_ray_hits_scaled_box_top() {
        let collider = Collider::cuboid(Vec3::splat(0.5));
        let world = GlobalTransform::from(
            Transform::from_xyz(0.0, 1.0, 0.0).with_scale(Vec3::new(1.0, 2.0, 1.0)),
        );
        let ray = Ray3d::new(Vec3::new(0.0, 10.0, 0.0), Dir3::NEG_Y);
        let distance = ray_collider_distance(ray, 100.0, &collider, &world).unwrap();
        // Box spans y in [0, 2].
        assert!((distance - 8.0).abs() < 1e-4, "distance {distance}");
    }

    #[test]
    fn test_ray_respects_max_distance() {
        let collider = Collider::cuboid(Vec3::splat(0.5));
        let world = GlobalTransform::from(Transform::from_xyz(0.0, 0.0, -20.0));
        let ray = Ray3d::new(Vec3::ZERO, Dir3::NEG_Z);
        assert!(ray_collider_distance(ray, 10.0, &collider, &world).is_none());
        assert!(ray_collider_distance(ray, 30.0, &collider, &world).is_some());
    }

    #[test]
    fn test_ray_hits_rotated_box() {
        let collider = Collider::cuboid(Vec3::new(2.0, 0.5, 0.5));
        let world = GlobalTransform::from(
            Transform::from_xyz(0.0, 0.0, -5.0)
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
        );
        // Rotated 90 degrees the long side faces the ray.
        let ray = Ray3d::new(Vec3::ZERO, Dir3::NEG_Z);
        let distance = ray_collider_distance(ray, 100.0, &collider, &world).unwrap();
        assert!((distance - 3.0).abs() < 1e-4, "distance {distance}");
    }
}
