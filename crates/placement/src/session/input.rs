use bevy::prelude::*;

use super::{KeyBinding, PlacementKeys, PlacementRequest, PlacementSession, PlacementSettings};
use crate::interaction::{ControllerState, PointerOverUi, XrControllers};

/// Keyboard shortcuts and click-to-confirm. Active only while previewing.
pub fn read_debug_input(
    session: Res<PlacementSession>,
    settings: Res<PlacementSettings>,
    bindings: Res<PlacementKeys>,
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    over_ui: Res<PointerOverUi>,
    mut requests: EventWriter<PlacementRequest>,
) {
    if session.inert
        || !settings.use_debug_keyboard_shortcuts
        || !settings.use_preview_placement
        || !session.is_preview_active()
    {
        return;
    }

    let click = settings.allow_mouse_click_to_confirm
        && !over_ui.0
        && mouse.is_some_and(|m| m.just_pressed(MouseButton::Left));
    let keys = keys.as_deref();
    let key = |binding: KeyBinding| keys.is_some_and(|k| binding.just_pressed(k));

    if click || key(bindings.confirm) {
        requests.send(PlacementRequest::Confirm);
    }
    if key(bindings.cancel) {
        requests.send(PlacementRequest::Cancel);
    }
    let step = settings.rotation_step_degrees;
    if key(bindings.rotate_left) {
        requests.send(PlacementRequest::RotateBy(step));
    }
    if key(bindings.rotate_right) {
        requests.send(PlacementRequest::RotateBy(-step));
    }
}

pub(crate) fn confirm_pressed(state: &ControllerState, threshold: f32) -> bool {
    let threshold = threshold.clamp(0.0, 1.0);
    state.primary_button
        || state.trigger_button
        || state.trigger.is_some_and(|v| v >= threshold)
        || state.grip.is_some_and(|v| v >= threshold)
}

pub(crate) fn cancel_pressed(state: &ControllerState) -> bool {
    state.secondary_button || state.menu_button
}

/// Polled controller buttons: edge-triggered confirm/cancel and a stick flick
/// that rotates one step and must return near centre before the next.
pub fn read_controller_input(
    mut session: ResMut<PlacementSession>,
    settings: Res<PlacementSettings>,
    controllers: Res<XrControllers>,
    mut requests: EventWriter<PlacementRequest>,
) {
    if session.inert
        || !settings.use_controller_buttons
        || !settings.use_preview_placement
        || session.preview.is_none()
    {
        return;
    }

    let Some((_, state)) = controllers.device(settings.controller_hand) else {
        session.edges = Default::default();
        return;
    };

    let confirm = confirm_pressed(state, settings.trigger_press_threshold);
    let cancel = cancel_pressed(state);
    if confirm && !session.edges.last_confirm {
        requests.send(PlacementRequest::Confirm);
    }
    if cancel && !session.edges.last_cancel {
        requests.send(PlacementRequest::Cancel);
    }
    session.edges.last_confirm = confirm;
    session.edges.last_cancel = cancel;

    let Some(stick) = state.stick else {
        session.edges.stick_ready = true;
        return;
    };
    let deadzone = settings.stick_rotate_deadzone;
    if stick.x.abs() < deadzone * 0.5 {
        session.edges.stick_ready = true;
        return;
    }
    if !session.edges.stick_ready {
        return;
    }
    let step = settings.rotation_step_degrees;
    if stick.x >= deadzone {
        requests.send(PlacementRequest::RotateBy(-step));
        session.edges.stick_ready = false;
    } else if stick.x <= -deadzone {
        requests.send(PlacementRequest::RotateBy(step));
        session.edges.stick_ready = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_from_any_source() {
        let pressed = |s: ControllerState| confirm_pressed(&s, 0.75);
        assert!(!pressed(ControllerState::default()));
        assert!(pressed(ControllerState {
            primary_button: true,
            ..default()
        }));
        assert!(pressed(ControllerState {
            trigger: Some(0.8),
            ..default()
        }));
        assert!(!pressed(ControllerState {
            grip: Some(0.5),
            ..default()
        }));
        assert!(pressed(ControllerState {
            grip: Some(0.75),
            ..default()
        }));
    }

    #[test]
    fn test_cancel_from_secondary_or_menu() {
        assert!(cancel_pressed(&ControllerState {
            menu_button: true,
            ..default()
        }));
        assert!(!cancel_pressed(&ControllerState {
            primary_button: true,
            ..default()
        }));
    }
}
