//! The demo world: ground, grid anchor, spawn point and a small catalog of
//! box buildings.

use bevy::prelude::*;

use placement::catalog::{BuildingCatalog, BuildingSlot};
use placement::grid::{GridAnchor, GridConfig};
use placement::physics::{Collider, PlacementBounds};
use placement::prefab::{PrefabFactory, PrefabId, Prefabs};
use placement::scale_handle::AxisScaleHandle;
use placement::session::{DefaultSpawnPoint, PlacementController};
use rendering::handle_visuals::HandleColor;

pub const HOUSE: PrefabId = PrefabId(1);
pub const TOWER: PrefabId = PrefabId(2);
pub const SLAB: PrefabId = PrefabId(3);

const GROUND_SIZE: f32 = 40.0;
const HANDLE_SIZE: f32 = 0.2;
const HANDLE_AXES: [Vec3; 5] = [Vec3::Y, Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z];

struct BlockKind {
    id: PrefabId,
    name: &'static str,
    size: Vec3,
    color: Color,
    handles: bool,
}

const BLOCKS: [BlockKind; 3] = [
    BlockKind {
        id: HOUSE,
        name: "House",
        size: Vec3::ONE,
        color: Color::srgb(0.85, 0.55, 0.4),
        handles: true,
    },
    BlockKind {
        id: TOWER,
        name: "Tower",
        size: Vec3::new(1.0, 3.0, 1.0),
        color: Color::srgb(0.55, 0.6, 0.75),
        handles: true,
    },
    BlockKind {
        id: SLAB,
        name: "Slab",
        size: Vec3::new(2.0, 0.5, 2.0),
        color: Color::srgb(0.7, 0.7, 0.65),
        handles: false,
    },
];

/// Unit-cube buildings; each kind's size lives in the root's scale so scale
/// handles can stretch it.
pub struct BlockFactory {
    cube: Handle<Mesh>,
    handle_mesh: Handle<Mesh>,
    materials: Vec<(PrefabId, Handle<StandardMaterial>)>,
}

impl BlockFactory {
    fn kind(prefab: PrefabId) -> Option<&'static BlockKind> {
        BLOCKS.iter().find(|k| k.id == prefab)
    }

    fn spawn_handle(&self, commands: &mut Commands, root: Entity, axis: Vec3, size: Vec3) {
        let Ok(handle) = AxisScaleHandle::new(axis) else {
            return;
        };
        // Undo the root's scale so every handle starts the same world size.
        let local_scale = Vec3::splat(HANDLE_SIZE) / size;
        commands
            .spawn((
                handle,
                HandleColor::for_axis(axis),
                Mesh3d(self.handle_mesh.clone()),
                Transform::from_translation(axis * 0.55).with_scale(local_scale),
                Collider::trigger(Vec3::splat(0.5)),
            ))
            .set_parent(root);
    }
}

impl PrefabFactory for BlockFactory {
    fn instantiate(
        &self,
        commands: &mut Commands,
        prefab: PrefabId,
        transform: Transform,
    ) -> Option<Entity> {
        let kind = Self::kind(prefab)?;
        let material = self
            .materials
            .iter()
            .find(|(id, _)| *id == prefab)
            .map(|(_, m)| m.clone())?;
        let root = commands
            .spawn((
                Name::new(kind.name),
                Mesh3d(self.cube.clone()),
                MeshMaterial3d(material),
                transform.with_scale(transform.scale * kind.size),
                Collider::cuboid(Vec3::splat(0.5)),
                PlacementBounds {
                    half_extents: Vec3::splat(0.5),
                },
            ))
            .id();
        if kind.handles {
            for axis in HANDLE_AXES {
                self.spawn_handle(commands, root, axis, kind.size);
            }
        }
        Some(root)
    }

    fn label(&self, prefab: PrefabId) -> String {
        Self::kind(prefab)
            .map(|k| k.name.to_string())
            .unwrap_or_else(|| format!("prefab #{}", prefab.0))
    }
}

fn setup_demo_scene(
    mut commands: Commands,
    grid: Res<GridConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let factory = BlockFactory {
        cube: meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
        handle_mesh: meshes.add(Sphere::new(0.5)),
        materials: BLOCKS
            .iter()
            .map(|k| {
                let material = materials.add(StandardMaterial {
                    base_color: k.color,
                    perceptual_roughness: 0.8,
                    ..default()
                });
                (k.id, material)
            })
            .collect(),
    };
    commands.insert_resource(Prefabs::new(factory));

    let mut slots: Vec<BuildingSlot> = BLOCKS
        .iter()
        .map(|k| BuildingSlot::new(k.name, k.id))
        .collect();
    slots.push(BuildingSlot::empty("Coming soon"));
    commands.insert_resource(BuildingCatalog::new(slots));

    let origin = Vec3::from(grid.origin);

    // Thin box so the ground is also a ray target.
    commands.spawn((
        Name::new("Ground"),
        Mesh3d(meshes.add(Cuboid::new(GROUND_SIZE, 0.1, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.35, 0.5, 0.3),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::from_translation(origin - Vec3::Y * 0.05),
        Collider::cuboid(Vec3::new(GROUND_SIZE * 0.5, 0.05, GROUND_SIZE * 0.5)),
    ));

    commands.spawn((
        Name::new("Grid anchor"),
        GridAnchor,
        Transform::from_translation(origin),
    ));
    commands.spawn((
        Name::new("Placement controller"),
        PlacementController,
        Transform::from_translation(origin + Vec3::new(0.0, 8.0, 8.0))
            .looking_at(origin, Vec3::Y),
    ));
    commands.spawn((
        Name::new("Default spawn point"),
        DefaultSpawnPoint,
        Transform::from_translation(origin + Vec3::new(0.0, 0.0, 3.0)),
    ));

    info!("Demo scene ready: {} building kinds", BLOCKS.len());
}

pub struct DemoScenePlugin;

impl Plugin for DemoScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_demo_scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_label() {
        for kind in &BLOCKS {
            assert!(BlockFactory::kind(kind.id).is_some());
        }
        assert!(BlockFactory::kind(PrefabId(99)).is_none());
    }

    #[test]
    fn test_handle_scale_cancels_tower_height() {
        let tower = BlockFactory::kind(TOWER).unwrap();
        let local = Vec3::splat(HANDLE_SIZE) / tower.size;
        assert!(((local * tower.size) - Vec3::splat(HANDLE_SIZE)).length() < 1e-6);
    }
}
