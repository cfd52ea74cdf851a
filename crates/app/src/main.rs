use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use placement::grid::GridConfig;
use placement::physics::ProxyPhysicsPlugin;
use placement::session::PlacementSettings;
use placement::PlacementPlugin;

mod config_file;
mod demo_scene;
mod desktop_interactor;
mod gamepad_bridge;

fn main() {
    let mut app = App::new();

    // Grid and session settings have to be in place before PlacementPlugin's
    // Startup validation runs.
    let path = std::env::var("GRID_PLACEMENT_CONFIG")
        .unwrap_or_else(|_| config_file::DEFAULT_CONFIG_PATH.to_string());
    let mut load_error = None;
    let (grid, settings) = match config_file::load(&path) {
        Ok(Some(file)) => (file.grid, file.placement),
        Ok(None) => (GridConfig::default(), PlacementSettings::default()),
        Err(e) => {
            load_error = Some(format!("Ignoring placement config {path}: {e}"));
            (GridConfig::default(), PlacementSettings::default())
        }
    };

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Grid Placement".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::Continuous,
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    })
    .insert_resource(grid)
    .insert_resource(settings)
    .add_plugins((
        PlacementPlugin,
        ProxyPhysicsPlugin,
        rendering::RenderingPlugin,
        ui::UiPlugin,
        demo_scene::DemoScenePlugin,
        desktop_interactor::DesktopInteractorPlugin,
        gamepad_bridge::GamepadBridgePlugin,
    ));

    // Logging only exists once DefaultPlugins are added.
    if let Some(message) = load_error {
        app.add_systems(Startup, move || error!("{message}"));
    }

    app.run();
}
