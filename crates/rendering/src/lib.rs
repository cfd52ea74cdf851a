use bevy::prelude::*;

pub mod camera;
pub mod egui_input_guard;
pub mod grid_visualizer;
pub mod handle_visuals;
pub mod preview_material;

use camera::CameraOrbitDrag;
use grid_visualizer::GridVisualizer;
use placement::PlacementSet;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraOrbitDrag>()
            .init_resource::<GridVisualizer>()
            .add_systems(Startup, (camera::setup_camera, setup_lighting))
            .add_systems(
                Update,
                egui_input_guard::sync_pointer_over_ui.before(PlacementSet::Session),
            )
            .add_systems(
                Update,
                (
                    camera::camera_pan_keyboard,
                    camera::camera_orbit_drag,
                    camera::camera_zoom,
                    camera::apply_orbit_camera,
                )
                    .chain()
                    .after(egui_input_guard::sync_pointer_over_ui)
                    .before(PlacementSet::Session),
            )
            .add_systems(
                Update,
                (
                    (
                        handle_visuals::setup_handle_visuals,
                        preview_material::tint_preview_ghosts,
                        handle_visuals::highlight_active_handles,
                    )
                        .chain(),
                    grid_visualizer::draw_grid,
                    grid_visualizer::draw_target_cell,
                )
                    .in_set(PlacementSet::Visual),
            );
    }
}

fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.9, 1.0),
        brightness: 300.0,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_4, // 45 degrees down
            std::f32::consts::FRAC_PI_6,
            0.0,
        )),
    ));
}
