//! Live hierarchy helpers.
//!
//! `GlobalTransform` is only refreshed in `PostUpdate`, but grid origins,
//! pointer poses and parent scales must be read *live* inside the tick that
//! changes them. These helpers compose the local `Transform`s up the parent
//! chain on demand.

use bevy::prelude::*;

/// Hierarchies deeper than this are treated as malformed.
const MAX_DEPTH: usize = 64;

/// World transform of `entity` composed from the current local transforms of
/// the entity and all of its ancestors. `None` if the entity has no transform.
pub fn live_world_transform(
    entity: Entity,
    parent_of: impl Fn(Entity) -> Option<Entity>,
    local_of: impl Fn(Entity) -> Option<Transform>,
) -> Option<Transform> {
    let mut world = local_of(entity)?;
    let mut current = entity;
    for _ in 0..MAX_DEPTH {
        let Some(parent) = parent_of(current) else {
            return Some(world);
        };
        let Some(parent_local) = local_of(parent) else {
            return Some(world);
        };
        world = parent_local.mul_transform(world);
        current = parent;
    }
    warn!("Hierarchy above {:?} exceeds {} levels", entity, MAX_DEPTH);
    Some(world)
}

/// Product of the local scales of every ancestor of `entity` (its parent's
/// lossy world scale). `Vec3::ONE` for root entities.
pub fn parent_world_scale(
    entity: Entity,
    parent_of: impl Fn(Entity) -> Option<Entity>,
    local_of: impl Fn(Entity) -> Option<Transform>,
) -> Vec3 {
    let Some(parent) = parent_of(entity) else {
        return Vec3::ONE;
    };
    live_world_transform(parent, parent_of, local_of)
        .map(|t| t.scale)
        .unwrap_or(Vec3::ONE)
}

/// `root` followed by its descendants in depth-first order. Entities for which
/// `include` returns false are skipped together with their whole subtree.
pub fn subtree_where(
    root: Entity,
    children: &Query<&Children>,
    mut include: impl FnMut(Entity) -> bool,
) -> Vec<Entity> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if !include(entity) {
            continue;
        }
        out.push(entity);
        if let Ok(kids) = children.get(entity) {
            stack.extend(kids.iter().rev().copied());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(
        parents: &'a HashMap<u32, u32>,
        locals: &'a HashMap<u32, Transform>,
    ) -> (
        impl Fn(Entity) -> Option<Entity> + 'a,
        impl Fn(Entity) -> Option<Transform> + 'a,
    ) {
        (
            move |e: Entity| parents.get(&e.index()).map(|p| Entity::from_raw(*p)),
            move |e: Entity| locals.get(&e.index()).copied(),
        )
    }

    #[test]
    fn test_root_world_transform_is_its_local() {
        let parents = HashMap::new();
        let mut locals = HashMap::new();
        locals.insert(1, Transform::from_xyz(1.0, 2.0, 3.0));
        let (parent_of, local_of) = lookup(&parents, &locals);

        let world = live_world_transform(Entity::from_raw(1), parent_of, local_of).unwrap();
        assert_eq!(world.translation, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_child_composes_parent_scale_and_translation() {
        let mut parents = HashMap::new();
        parents.insert(2, 1);
        let mut locals = HashMap::new();
        locals.insert(
            1,
            Transform::from_xyz(10.0, 0.0, 0.0).with_scale(Vec3::new(2.0, 3.0, 1.0)),
        );
        locals.insert(2, Transform::from_xyz(0.0, 0.5, 0.0));
        let (parent_of, local_of) = lookup(&parents, &locals);

        let world = live_world_transform(Entity::from_raw(2), &parent_of, &local_of).unwrap();
        assert!((world.translation - Vec3::new(10.0, 1.5, 0.0)).length() < 1e-5);

        let scale = parent_world_scale(Entity::from_raw(2), parent_of, local_of);
        assert_eq!(scale, Vec3::new(2.0, 3.0, 1.0));
    }

    #[test]
    fn test_missing_entity_has_no_transform() {
        let parents = HashMap::new();
        let locals = HashMap::new();
        let (parent_of, local_of) = lookup(&parents, &locals);
        assert!(live_world_transform(Entity::from_raw(9), parent_of, local_of).is_none());
    }
}
