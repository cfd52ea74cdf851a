//! Egui input guard: prevents click-through from UI panels to the world.
//!
//! When egui (the building panel, tooltips) is handling pointer input, world
//! input such as click-to-confirm and camera drags should stand down. The
//! result is published as [`PointerOverUi`] so crates without an egui
//! dependency can read it.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use placement::interaction::PointerOverUi;

/// Returns `true` when egui wants the pointer, i.e. the cursor is over an
/// egui panel or egui is actively handling a drag/click.
#[inline]
pub fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    let Some(ctx) = contexts.try_ctx_mut() else {
        return false;
    };
    ctx.wants_pointer_input() || ctx.is_pointer_over_area()
}

pub fn sync_pointer_over_ui(mut contexts: EguiContexts, mut over_ui: ResMut<PointerOverUi>) {
    let wants = egui_wants_pointer(&mut contexts);
    if over_ui.0 != wants {
        over_ui.0 = wants;
    }
}
