use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::prefab::PrefabId;

/// Stable id handed out to every confirmed placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlacementId(pub u64);

/// Marks the root of a placed building.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placed {
    pub id: PlacementId,
    pub prefab: PrefabId,
}

/// Every building placed in this app, by placement id.
#[derive(Resource, Debug, Default)]
pub struct PlacedRegistry {
    next_id: u64,
    entries: BTreeMap<PlacementId, (Entity, PrefabId)>,
}

impl PlacedRegistry {
    pub fn insert(&mut self, entity: Entity, prefab: PrefabId) -> PlacementId {
        let id = PlacementId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, (entity, prefab));
        id
    }

    pub fn remove(&mut self, id: PlacementId) -> Option<Entity> {
        self.entries.remove(&id).map(|(entity, _)| entity)
    }

    pub fn get(&self, id: PlacementId) -> Option<Entity> {
        self.entries.get(&id).map(|&(entity, _)| entity)
    }

    pub fn prefab_of(&self, id: PlacementId) -> Option<PrefabId> {
        self.entries.get(&id).map(|&(_, prefab)| prefab)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlacementId, Entity)> + '_ {
        self.entries.iter().map(|(&id, &(entity, _))| (id, entity))
    }
}

/// Drop registry entries whose building was despawned.
pub fn prune_placed_registry(
    mut registry: ResMut<PlacedRegistry>,
    mut removed: RemovedComponents<Placed>,
) {
    let gone: Vec<Entity> = removed.read().collect();
    if gone.is_empty() {
        return;
    }
    registry.entries.retain(|_, (entity, _)| !gone.contains(entity));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_removable() {
        let mut registry = PlacedRegistry::default();
        let a = registry.insert(Entity::from_raw(1), PrefabId(7));
        let b = registry.insert(Entity::from_raw(2), PrefabId(7));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.remove(a), Some(Entity::from_raw(1)));
        assert_eq!(registry.get(a), None);
        assert_eq!(registry.prefab_of(b), Some(PrefabId(7)));
    }
}
