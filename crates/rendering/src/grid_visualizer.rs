use bevy::prelude::*;

use placement::config::GRID_LINE_LIFT;
use placement::grid::GridDefinition;
use placement::session::PlacementSession;

const GRID_COLOR: Color = Color::srgba(0.85, 0.9, 1.0, 0.35);
const TARGET_CELL_COLOR: Color = Color::srgba(0.25, 0.75, 1.0, 0.9);

/// Extent of the drawn grid, in cells from the origin along +X and +Z.
#[derive(Resource, Debug, Clone)]
pub struct GridVisualizer {
    pub width: u32,
    pub height: u32,
    pub color: Color,
    pub enabled: bool,
}

impl Default for GridVisualizer {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            color: GRID_COLOR,
            enabled: true,
        }
    }
}

/// Line segments of a `width` x `height` block of cells starting at the grid
/// origin, lifted slightly above the plane.
pub fn grid_lines(grid: &GridDefinition, width: u32, height: u32) -> Vec<(Vec3, Vec3)> {
    let cell = grid.cell_size();
    let origin = grid.origin() + Vec3::Y * GRID_LINE_LIFT;
    let (w, h) = (width as f32 * cell, height as f32 * cell);

    let along_z = (0..=width).map(|x| {
        let x = x as f32 * cell;
        (origin + Vec3::new(x, 0.0, 0.0), origin + Vec3::new(x, 0.0, h))
    });
    let along_x = (0..=height).map(|z| {
        let z = z as f32 * cell;
        (origin + Vec3::new(0.0, 0.0, z), origin + Vec3::new(w, 0.0, z))
    });
    along_z.chain(along_x).collect()
}

pub fn draw_grid(
    visualizer: Res<GridVisualizer>,
    grid: Option<Res<GridDefinition>>,
    mut gizmos: Gizmos,
) {
    let Some(grid) = grid else {
        return;
    };
    if !visualizer.enabled {
        return;
    }
    for (start, end) in grid_lines(&grid, visualizer.width, visualizer.height) {
        gizmos.line(start, end, visualizer.color);
    }
}

/// Outline the cell the preview would land in.
pub fn draw_target_cell(
    session: Res<PlacementSession>,
    grid: Option<Res<GridDefinition>>,
    mut gizmos: Gizmos,
) {
    let Some(grid) = grid else {
        return;
    };
    if !session.is_preview_active() || !session.preview_has_valid_cell {
        return;
    }
    let half = grid.cell_size() * 0.5;
    let bottom = session.last_valid_position.y - session.preview_half_height;
    let center = Vec3::new(
        session.last_valid_position.x,
        bottom + GRID_LINE_LIFT,
        session.last_valid_position.z,
    );
    let corners = [
        center + Vec3::new(-half, 0.0, -half),
        center + Vec3::new(half, 0.0, -half),
        center + Vec3::new(half, 0.0, half),
        center + Vec3::new(-half, 0.0, half),
    ];
    for i in 0..4 {
        gizmos.line(corners[i], corners[(i + 1) % 4], TARGET_CELL_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_count_and_extent() {
        let grid = GridDefinition::new(0.5, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        let lines = grid_lines(&grid, 4, 2);
        assert_eq!(lines.len(), 5 + 3);

        let lifted = 2.0 + GRID_LINE_LIFT;
        assert!(lines.iter().all(|(a, b)| a.y == lifted && b.y == lifted));

        let (first_start, first_end) = lines[0];
        assert_eq!(first_start, Vec3::new(1.0, lifted, 3.0));
        assert_eq!(first_end, Vec3::new(1.0, lifted, 4.0));

        let (last_start, last_end) = lines[lines.len() - 1];
        assert_eq!(last_start, Vec3::new(1.0, lifted, 4.0));
        assert_eq!(last_end, Vec3::new(3.0, lifted, 4.0));
    }

    #[test]
    fn test_zero_sized_grid_draws_border_lines_only() {
        let grid = GridDefinition::new(1.0, Vec3::ZERO).unwrap();
        assert_eq!(grid_lines(&grid, 0, 0).len(), 2);
    }
}
