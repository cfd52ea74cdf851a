// ---------------------------------------------------------------------------
// Building catalog: the slots shown by the building panel
// ---------------------------------------------------------------------------

use bevy::prelude::*;

use crate::error::PlacementError;
use crate::prefab::PrefabId;

#[derive(Debug, Clone, Default)]
pub struct BuildingSlot {
    pub name: String,
    pub prefab: Option<PrefabId>,
    /// Thumbnail shown in the panel, if one was provided.
    pub icon: Option<Handle<Image>>,
}

impl BuildingSlot {
    pub fn new(name: impl Into<String>, prefab: PrefabId) -> Self {
        Self {
            name: name.into(),
            prefab: Some(prefab),
            icon: None,
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..default()
        }
    }

    pub fn with_icon(mut self, icon: Handle<Image>) -> Self {
        self.icon = Some(icon);
        self
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct BuildingCatalog {
    pub slots: Vec<BuildingSlot>,
}

impl BuildingCatalog {
    pub fn new(slots: Vec<BuildingSlot>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Prefab assigned to slot `index`.
    pub fn select_slot(&self, index: usize) -> Result<PrefabId, PlacementError> {
        let slot = self.slots.get(index).ok_or(PlacementError::SlotOutOfRange {
            index,
            len: self.slots.len(),
        })?;
        slot.prefab.ok_or(PlacementError::EmptySlot(index))
    }

    /// Slot index holding `prefab`, if any.
    pub fn slot_of(&self, prefab: PrefabId) -> Option<usize> {
        self.slots.iter().position(|s| s.prefab == Some(prefab))
    }
}
