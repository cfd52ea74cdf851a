//! The ground grid: cell size, origin, and the snap function every other
//! placement feature goes through.
//!
//! Rounding uses `f32::round`, i.e. **round half away from zero**: a point
//! exactly between two cell centres snaps to the centre farther from the
//! origin (`-0.5 → -1`, `0.5 → 1`, `2.5 → 3`).

use bevy::math::primitives::InfinitePlane3d;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_CELL_SIZE;
use crate::error::PlacementError;
use crate::hierarchy::live_world_transform;

/// Integer cell coordinates `(x, z)` relative to the grid origin.
pub type GridCell = IVec2;

/// Serializable grid configuration, validated into a [`GridDefinition`] at startup.
#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cell_size: f32,
    pub origin: [f32; 3],
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            origin: [0.0; 3],
        }
    }
}

/// The coordinate authority for placement. Read-only for every consumer.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct GridDefinition {
    cell_size: f32,
    origin: Vec3,
}

impl GridDefinition {
    pub fn new(cell_size: f32, origin: Vec3) -> Result<Self, PlacementError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(PlacementError::InvalidCellSize(cell_size));
        }
        Ok(Self { cell_size, origin })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Snap X/Z to the nearest cell centre; Y passes through.
    pub fn snap(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            self.snap_coord(point.x, self.origin.x),
            point.y,
            self.snap_coord(point.z, self.origin.z),
        )
    }

    /// Cell containing `point`, using the same rounding as [`Self::snap`].
    pub fn cell_of(&self, point: Vec3) -> GridCell {
        IVec2::new(
            ((point.x - self.origin.x) / self.cell_size).round() as i32,
            ((point.z - self.origin.z) / self.cell_size).round() as i32,
        )
    }

    /// World-space centre of `cell` at height `y`.
    pub fn cell_center(&self, cell: GridCell, y: f32) -> Vec3 {
        Vec3::new(
            self.origin.x + cell.x as f32 * self.cell_size,
            y,
            self.origin.z + cell.y as f32 * self.cell_size,
        )
    }

    /// Round every scale component to a whole number of cells.
    ///
    /// Components never drop below one cell, so a release can't collapse a
    /// building to zero thickness.
    pub fn snap_scale(&self, scale: Vec3) -> Vec3 {
        let snap = |c: f32| (c / self.cell_size).round().max(1.0) * self.cell_size;
        Vec3::new(snap(scale.x), snap(scale.y), snap(scale.z))
    }

    /// Distance along `ray` to the horizontal plane through the origin, if the
    /// ray points towards it.
    pub fn intersect_plane(&self, ray: Ray3d) -> Option<f32> {
        ray.intersect_plane(self.origin, InfinitePlane3d::new(Vec3::Y))
    }

    fn snap_coord(&self, value: f32, origin: f32) -> f32 {
        origin + ((value - origin) / self.cell_size).round() * self.cell_size
    }
}

impl TryFrom<GridConfig> for GridDefinition {
    type Error = PlacementError;

    fn try_from(config: GridConfig) -> Result<Self, Self::Error> {
        GridDefinition::new(config.cell_size, Vec3::from_array(config.origin))
    }
}

/// Marks the entity whose live position is the grid origin.
#[derive(Component, Debug, Default)]
pub struct GridAnchor;

/// Validate `GridConfig` and install the grid. A bad config leaves the scene
/// without a grid; placement keeps working unsnapped.
pub fn install_grid(mut commands: Commands, config: Res<GridConfig>) {
    match GridDefinition::try_from(*config) {
        Ok(grid) => {
            info!(
                "Grid installed: cell size {} at origin {:?}",
                grid.cell_size(),
                grid.origin()
            );
            commands.insert_resource(grid);
        }
        Err(e) => error!("Grid configuration rejected: {e}"),
    }
}

/// Follow the `GridAnchor` entity so the origin is always read live.
pub fn sync_grid_origin(
    grid: Option<ResMut<GridDefinition>>,
    anchors: Query<Entity, With<GridAnchor>>,
    parents: Query<&Parent>,
    transforms: Query<&Transform>,
) {
    let Some(mut grid) = grid else {
        return;
    };
    let Some(anchor) = anchors.iter().next() else {
        return;
    };
    let Some(world) = live_world_transform(
        anchor,
        |e| parents.get(e).ok().map(Parent::get),
        |e| transforms.get(e).ok().copied(),
    ) else {
        return;
    };
    if grid.origin != world.translation {
        grid.origin = world.translation;
    }
}

pub struct GridPlugin;

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GridConfig>()
            .add_systems(Startup, install_grid)
            .add_systems(PreUpdate, sync_grid_origin)
            .add_systems(FixedFirst, sync_grid_origin);
    }
}
