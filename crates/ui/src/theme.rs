use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

/// Light frosted panels or their dark counterpart.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanelTheme {
    #[default]
    Light,
    Dark,
}

struct Palette {
    panel: egui::Color32,
    inactive: egui::Color32,
    hover: egui::Color32,
    active: egui::Color32,
    text: egui::Color32,
}

fn palette(theme: PanelTheme) -> Palette {
    match theme {
        PanelTheme::Light => Palette {
            panel: egui::Color32::from_rgba_unmultiplied(245, 247, 250, 200),
            inactive: egui::Color32::from_rgba_unmultiplied(255, 255, 255, 160),
            hover: egui::Color32::from_rgb(225, 232, 242),
            active: egui::Color32::from_rgb(64, 156, 255),
            text: egui::Color32::from_rgb(18, 18, 23),
        },
        PanelTheme::Dark => Palette {
            panel: egui::Color32::from_rgb(35, 37, 48),
            inactive: egui::Color32::from_rgb(50, 55, 65),
            hover: egui::Color32::from_rgb(70, 80, 100),
            active: egui::Color32::from_rgb(100, 160, 220),
            text: egui::Color32::from_rgb(230, 232, 240),
        },
    }
}

pub fn apply_panel_theme(mut contexts: EguiContexts, theme: Res<PanelTheme>) {
    if !theme.is_changed() {
        return;
    }
    let colors = palette(*theme);
    let ctx = contexts.ctx_mut();
    let mut style = (*ctx.style()).clone();

    style.visuals = match *theme {
        PanelTheme::Light => egui::Visuals::light(),
        PanelTheme::Dark => egui::Visuals::dark(),
    };
    style.visuals.widgets.noninteractive.bg_fill = colors.panel;
    style.visuals.widgets.inactive.bg_fill = colors.inactive;
    style.visuals.widgets.hovered.bg_fill = colors.hover;
    style.visuals.widgets.active.bg_fill = colors.active;
    style.visuals.widgets.inactive.weak_bg_fill = colors.inactive;
    style.visuals.widgets.hovered.weak_bg_fill = colors.hover;
    style.visuals.widgets.active.weak_bg_fill = colors.active;
    style.visuals.override_text_color = Some(colors.text);

    style.visuals.window_fill = colors.panel;
    style.visuals.panel_fill = colors.panel;

    style.visuals.selection.bg_fill = colors.active;
    style.visuals.selection.stroke = egui::Stroke::new(1.0, colors.active);

    // Rounded corners (egui 0.31+ uses CornerRadius with u8 values)
    let window_rounding = egui::CornerRadius::same(22);
    let widget_rounding = egui::CornerRadius::same(16);

    style.visuals.window_corner_radius = window_rounding;
    style.visuals.widgets.noninteractive.corner_radius = widget_rounding;
    style.visuals.widgets.inactive.corner_radius = widget_rounding;
    style.visuals.widgets.hovered.corner_radius = widget_rounding;
    style.visuals.widgets.active.corner_radius = widget_rounding;

    ctx.set_style(style);
}
