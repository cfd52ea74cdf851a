//! Building panel: a bottom strip of catalog slots plus the placement controls.
//!
//! Clicking a slot sends `PlacementRequest::SelectSlot`; the session resolves
//! it against the catalog, so an empty slot is rejected there with a warning.
//! Confirm, rotate and cancel buttons appear while a preview is active.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use placement::catalog::BuildingCatalog;
use placement::session::{PlacementRequest, PlacementSession, PlacementSettings};

// =============================================================================
// Resources
// =============================================================================

#[derive(Resource, Debug, Clone)]
pub struct BuildingPanel {
    pub title: String,
    pub visible: bool,
    /// The strip is padded with placeholders up to this many slots.
    pub min_slots: usize,
    pub disable_empty_slots: bool,
    pub slot_size: f32,
    pub slot_spacing: f32,
}

impl Default for BuildingPanel {
    fn default() -> Self {
        Self {
            title: "Buildings".into(),
            visible: true,
            min_slots: 6,
            disable_empty_slots: true,
            slot_size: 104.0,
            slot_spacing: 28.0,
        }
    }
}

/// One button in the strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    /// Catalog index; `None` for padding placeholders.
    pub index: Option<usize>,
    pub label: String,
    pub enabled: bool,
    pub selected: bool,
}

/// Lay the catalog out as buttons, padded with placeholders.
pub fn slot_views(
    catalog: &BuildingCatalog,
    panel: &BuildingPanel,
    selected: Option<usize>,
) -> Vec<SlotView> {
    let mut views: Vec<SlotView> = catalog
        .slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let has_prefab = slot.prefab.is_some();
            let label = if slot.name.trim().is_empty() {
                format!("Slot {}", i + 1)
            } else {
                slot.name.clone()
            };
            SlotView {
                index: Some(i),
                label,
                enabled: has_prefab || !panel.disable_empty_slots,
                selected: selected == Some(i),
            }
        })
        .collect();

    let padding = panel.min_slots.saturating_sub(views.len());
    views.extend((0..padding).map(|_| SlotView {
        index: None,
        label: "Empty".into(),
        enabled: false,
        selected: false,
    }));
    views
}

// =============================================================================
// Systems
// =============================================================================

/// B toggles the panel.
pub fn toggle_building_panel(
    keys: Res<ButtonInput<KeyCode>>,
    mut panel: ResMut<BuildingPanel>,
) {
    if keys.just_pressed(KeyCode::KeyB) {
        panel.visible = !panel.visible;
    }
}

pub fn building_panel_ui(
    mut contexts: EguiContexts,
    panel: Res<BuildingPanel>,
    catalog: Option<Res<BuildingCatalog>>,
    session: Res<PlacementSession>,
    settings: Res<PlacementSettings>,
    mut requests: EventWriter<PlacementRequest>,
) {
    if !panel.visible {
        return;
    }
    let Some(catalog) = catalog else {
        return;
    };

    // Register icons before borrowing the context.
    let icons: Vec<Option<egui::TextureId>> = catalog
        .slots
        .iter()
        .map(|slot| slot.icon.as_ref().map(|h| contexts.add_image(h.clone_weak())))
        .collect();
    let views = slot_views(&catalog, &panel, session.selected_slot);
    let size = egui::vec2(panel.slot_size, panel.slot_size);

    egui::TopBottomPanel::bottom("building_panel")
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal(|ui| {
                ui.heading(panel.title.as_str());
                if session.inert {
                    ui.colored_label(egui::Color32::from_rgb(200, 60, 60), "Placement disabled");
                }
            });
            ui.separator();

            egui::ScrollArea::horizontal().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = panel.slot_spacing;
                    for view in &views {
                        let icon = view.index.and_then(|i| icons.get(i).copied().flatten());
                        let button = match icon {
                            Some(texture) => egui::Button::image_and_text(
                                egui::load::SizedTexture::new(texture, size * 0.6),
                                view.label.as_str(),
                            ),
                            None => egui::Button::new(view.label.as_str()),
                        }
                        .min_size(size)
                        .selected(view.selected);
                        let response = ui.add_enabled(view.enabled, button);
                        if response.clicked() {
                            if let Some(index) = view.index {
                                requests.send(PlacementRequest::SelectSlot(index));
                            }
                        }
                    }
                });
            });

            if !session.is_preview_active() {
                return;
            }
            ui.separator();
            ui.horizontal(|ui| {
                let confirm = ui.add_enabled(
                    session.preview_has_valid_cell,
                    egui::Button::new("Place (Enter)"),
                );
                if confirm.clicked() {
                    requests.send(PlacementRequest::Confirm);
                }
                if !settings.force_identity_rotation {
                    let step = settings.rotation_step_degrees;
                    if ui.button("Rotate left (Q)").clicked() {
                        requests.send(PlacementRequest::RotateBy(step));
                    }
                    if ui.button("Rotate right (E)").clicked() {
                        requests.send(PlacementRequest::RotateBy(-step));
                    }
                }
                if ui.button("Cancel (Esc)").clicked() {
                    requests.send(PlacementRequest::Cancel);
                }
                if !session.preview_has_valid_cell {
                    ui.label("Aim at the ground to place");
                }
            });
        });
}
