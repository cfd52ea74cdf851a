use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::preview::{reposition_preview, PlacementRay, PreviewGhost, PreviewPrepared};
use super::{
    PlacementRequest, PlacementSession, PlacementSettings, PrefabSelected, PrefabSpawned,
    SelectedPrefabChanged,
};
use crate::catalog::BuildingCatalog;
use crate::error::PlacementError;
use crate::grid::GridDefinition;
use crate::interaction::Interactor;
use crate::manipulable::ManipulableBuilder;
use crate::planar_constraint::yaw_of;
use crate::prefab::{PrefabId, Prefabs};
use crate::raycast::SceneRaycast;
use crate::registry::{PlacedRegistry, Placed};

/// Rotation for a building spawned at `pose`.
pub(crate) fn resolve_rotation(settings: &PlacementSettings, pose: Option<&Transform>) -> Quat {
    if settings.force_identity_rotation || !settings.use_spawn_point_rotation {
        return Quat::IDENTITY;
    }
    pose.map_or(Quat::IDENTITY, |p| p.rotation)
}

/// Instantiation, setup and bookkeeping of real buildings and ghosts.
#[derive(SystemParam)]
pub struct Spawner<'w, 's> {
    commands: Commands<'w, 's>,
    prefabs: Option<Res<'w, Prefabs>>,
    registry: ResMut<'w, PlacedRegistry>,
    grid: Option<Res<'w, GridDefinition>>,
    spawned: EventWriter<'w, PrefabSpawned>,
}

impl Spawner<'_, '_> {
    fn instantiate(&mut self, prefab: PrefabId, transform: Transform) -> Option<Entity> {
        let Some(prefabs) = self.prefabs.as_deref() else {
            warn!("No prefab factory installed; cannot instantiate prefab {}", prefab.0);
            return None;
        };
        let entity = prefabs.instantiate(&mut self.commands, prefab, transform);
        if entity.is_none() {
            warn!("{}", PlacementError::UnknownPrefab(prefab.0));
        }
        entity
    }

    fn label(&self, prefab: PrefabId) -> String {
        self.prefabs
            .as_deref()
            .map_or_else(|| format!("prefab #{}", prefab.0), |p| p.label(prefab))
    }

    /// Despawn the session's ghost, if any, and reset everything measured from it.
    fn clear_preview(&mut self, session: &mut PlacementSession) {
        if let Some(preview) = session.preview {
            if let Some(entity) = self.commands.get_entity(preview) {
                entity.despawn_recursive();
            }
        }
        session.reset_preview_state();
    }

    /// Spawn the real building and make it manipulable.
    fn spawn_building(
        &mut self,
        settings: &PlacementSettings,
        rays: &PlacementRay,
        prefab: PrefabId,
        position: Vec3,
        rotation: Quat,
    ) -> Option<Entity> {
        let mut transform = Transform::from_translation(position).with_rotation(rotation);
        if settings.use_spawn_point_scale {
            if let Some(point) = rays.spawn_point_pose() {
                transform.scale = point.scale;
            }
        }
        let entity = self.instantiate(prefab, transform)?;

        if settings.setup_grid_placement_on_spawn {
            if self.grid.is_some() {
                ManipulableBuilder::from_settings(settings, rotation)
                    .build(&mut self.commands, entity);
            } else {
                warn!("No grid installed; {} spawned without grid placement", self.label(prefab));
            }
        }

        let id = self.registry.insert(entity, prefab);
        self.commands.entity(entity).insert(Placed { id, prefab });
        self.spawned.send(PrefabSpawned { entity, prefab, id });
        info!(
            "Placed {} at {:?} (placement {})",
            self.label(prefab),
            position,
            id.0
        );
        Some(entity)
    }

    fn spawn_selected_at(
        &mut self,
        session: &PlacementSession,
        settings: &PlacementSettings,
        rays: &PlacementRay,
        pose: Option<Transform>,
    ) -> Option<Entity> {
        let Some(prefab) = session.selected_prefab else {
            warn!("{}", PlacementError::NothingSelected);
            return None;
        };
        let position = pose.map_or(Vec3::ZERO, |p| p.translation);
        let rotation = resolve_rotation(settings, pose.as_ref());
        self.spawn_building(settings, rays, prefab, position, rotation)
    }

    /// Replace any ghost with a fresh one for the selected prefab.
    fn begin_preview(
        &mut self,
        session: &mut PlacementSession,
        settings: &PlacementSettings,
        rays: &PlacementRay,
    ) {
        self.clear_preview(session);
        let Some(prefab) = session.selected_prefab else {
            return;
        };
        let start = resolve_rotation(settings, rays.default_spawn_pose().as_ref());
        session.current_yaw = yaw_of(start).to_degrees();
        let transform = Transform::from_rotation(Quat::from_rotation_y(session.current_yaw.to_radians()));
        let Some(ghost) = self.instantiate(prefab, transform) else {
            return;
        };
        self.commands
            .entity(ghost)
            .insert((PreviewGhost, Visibility::Hidden));
        session.preview = Some(ghost);
        debug!("Preview started for {}", self.label(prefab));
    }
}

/// Pick the follow origin once: the first interactor on the configured hand,
/// else the first interactor at all.
pub fn auto_assign_follow_origin(
    mut session: ResMut<PlacementSession>,
    settings: Res<PlacementSettings>,
    interactors: Query<(Entity, &Interactor)>,
) {
    if !settings.use_preview_placement || session.follow_origin.is_some() {
        return;
    }
    let preferred = interactors
        .iter()
        .find(|(_, i)| i.hand == Some(settings.controller_hand))
        .or_else(|| interactors.iter().next());
    if let Some((entity, _)) = preferred {
        debug!("Preview follows interactor {entity:?}");
        session.follow_origin = Some(entity);
    }
}

/// Apply selections from the panel (by prefab or by catalog slot).
#[allow(clippy::too_many_arguments)]
pub fn handle_prefab_selected(
    mut spawner: Spawner,
    mut session: ResMut<PlacementSession>,
    settings: Res<PlacementSettings>,
    catalog: Option<Res<BuildingCatalog>>,
    rays: PlacementRay,
    mut selected: EventReader<PrefabSelected>,
    mut requests: EventReader<PlacementRequest>,
    mut changed: EventWriter<SelectedPrefabChanged>,
) {
    let mut picks: Vec<(Option<usize>, PrefabId)> =
        selected.read().map(|ev| (ev.slot, ev.prefab)).collect();
    for request in requests.read() {
        let PlacementRequest::SelectSlot(index) = *request else {
            continue;
        };
        let result = catalog
            .as_deref()
            .map_or(Err(PlacementError::SlotOutOfRange { index, len: 0 }), |c| {
                c.select_slot(index)
            });
        match result {
            Ok(prefab) => picks.push((Some(index), prefab)),
            Err(e) => warn!("Slot selection ignored: {e}"),
        }
    }
    if session.inert {
        return;
    }

    for (slot, prefab) in picks {
        session.selected_slot = slot;
        session.selected_prefab = Some(prefab);
        changed.send(SelectedPrefabChanged {
            prefab: Some(prefab),
        });

        if settings.use_preview_placement {
            spawner.begin_preview(&mut session, &settings, &rays);
        } else if settings.spawn_on_selection {
            let pose = rays.default_spawn_pose();
            spawner.spawn_selected_at(&session, &settings, &rays, pose);
        }
    }
}

/// Confirm, cancel, rotate and direct spawn requests.
#[allow(clippy::too_many_arguments)]
pub fn apply_placement_requests(
    mut spawner: Spawner,
    mut session: ResMut<PlacementSession>,
    settings: Res<PlacementSettings>,
    rays: PlacementRay,
    raycast: SceneRaycast,
    mut ghosts: Query<(&mut Transform, &mut Visibility), (With<PreviewGhost>, With<PreviewPrepared>)>,
    mut requests: EventReader<PlacementRequest>,
) {
    if session.inert {
        requests.clear();
        return;
    }

    for request in requests.read() {
        match *request {
            PlacementRequest::SelectSlot(_) => {}
            PlacementRequest::Confirm => {
                if !settings.use_preview_placement {
                    if settings.spawn_on_selection {
                        let pose = rays.default_spawn_pose();
                        spawner.spawn_selected_at(&session, &settings, &rays, pose);
                    }
                    continue;
                }
                let Some(prefab) = session.selected_prefab else {
                    warn!("Confirm ignored: {}", PlacementError::NothingSelected);
                    continue;
                };
                if session.preview.is_none() || !session.preview_has_valid_cell {
                    warn!("Confirm ignored: {}", PlacementError::NoValidCell);
                    continue;
                }
                let position = session.last_valid_position;
                let rotation = session.last_valid_rotation;
                spawner.clear_preview(&mut session);
                spawner.spawn_building(&settings, &rays, prefab, position, rotation);
            }
            PlacementRequest::Cancel => {
                if session.preview.is_some() {
                    debug!("Placement cancelled");
                }
                spawner.clear_preview(&mut session);
            }
            PlacementRequest::RotateBy(delta) => {
                if settings.force_identity_rotation {
                    continue;
                }
                let Some(preview) = session.preview else {
                    continue;
                };
                session.current_yaw += delta;
                if let Ok((mut transform, mut visibility)) = ghosts.get_mut(preview) {
                    let ray = rays.build(&session);
                    let grid = spawner.grid.as_deref();
                    reposition_preview(
                        &mut session,
                        &settings,
                        grid,
                        ray,
                        &raycast,
                        &mut transform,
                        &mut visibility,
                    );
                }
            }
            PlacementRequest::SpawnSelectedAtDefault => {
                let pose = rays.default_spawn_pose();
                spawner.spawn_selected_at(&session, &settings, &rays, pose);
            }
            PlacementRequest::SpawnSelectedAt(pose) => {
                spawner.spawn_selected_at(&session, &settings, &rays, Some(pose));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_resolution() {
        let pose = Transform::from_rotation(Quat::from_rotation_y(1.0));
        let forced = PlacementSettings::default();
        assert_eq!(resolve_rotation(&forced, Some(&pose)), Quat::IDENTITY);

        let free = PlacementSettings {
            force_identity_rotation: false,
            ..default()
        };
        assert_eq!(resolve_rotation(&free, Some(&pose)), pose.rotation);
        assert_eq!(resolve_rotation(&free, None), Quat::IDENTITY);

        let ignore_point = PlacementSettings {
            force_identity_rotation: false,
            use_spawn_point_rotation: false,
            ..default()
        };
        assert_eq!(resolve_rotation(&ignore_point, Some(&pose)), Quat::IDENTITY);
    }
}
