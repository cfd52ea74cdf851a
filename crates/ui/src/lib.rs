use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use placement::PlacementSet;

pub mod building_panel;
pub mod theme;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin);
        }
        app.init_resource::<theme::PanelTheme>()
            .init_resource::<building_panel::BuildingPanel>()
            .add_systems(
                Update,
                (
                    theme::apply_panel_theme,
                    building_panel::toggle_building_panel,
                    building_panel::building_panel_ui,
                )
                    .chain()
                    .before(PlacementSet::Session),
            );
    }
}
