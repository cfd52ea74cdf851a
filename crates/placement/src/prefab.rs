use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Opaque handle to something the scene knows how to instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrefabId(pub u32);

/// Scene composition seam: turns a [`PrefabId`] into a spawned entity tree.
pub trait PrefabFactory: Send + Sync + 'static {
    /// Spawn `prefab` at `transform`, returning its root. `None` when the
    /// prefab is unknown.
    fn instantiate(
        &self,
        commands: &mut Commands,
        prefab: PrefabId,
        transform: Transform,
    ) -> Option<Entity>;

    fn label(&self, prefab: PrefabId) -> String {
        format!("prefab #{}", prefab.0)
    }
}

/// The active prefab factory.
#[derive(Resource)]
pub struct Prefabs(pub Box<dyn PrefabFactory>);

impl Prefabs {
    pub fn new(factory: impl PrefabFactory) -> Self {
        Self(Box::new(factory))
    }
}

impl std::ops::Deref for Prefabs {
    type Target = dyn PrefabFactory;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
