//! Gamepads stand in for hand controllers: the first connected pad drives the
//! right hand, the second the left.

use bevy::input::gamepad::{Gamepad, GamepadAxis, GamepadButton};
use bevy::prelude::*;

use placement::interaction::{ControllerState, Hand, XrControllers};
use placement::PlacementSet;

/// South confirms, East or Start cancels, the right stick rotates. The right
/// trigger drives both the trigger value and its click; the left trigger is
/// the grip.
pub fn controller_state(
    pressed: impl Fn(GamepadButton) -> bool,
    button_value: impl Fn(GamepadButton) -> Option<f32>,
    axis: impl Fn(GamepadAxis) -> Option<f32>,
) -> ControllerState {
    let stick = match (axis(GamepadAxis::RightStickX), axis(GamepadAxis::RightStickY)) {
        (Some(x), Some(y)) => Some(Vec2::new(x, y)),
        (Some(x), None) => Some(Vec2::new(x, 0.0)),
        _ => None,
    };
    ControllerState {
        connected: true,
        primary_button: pressed(GamepadButton::South),
        secondary_button: pressed(GamepadButton::East),
        trigger_button: pressed(GamepadButton::RightTrigger2),
        menu_button: pressed(GamepadButton::Start),
        trigger: button_value(GamepadButton::RightTrigger2),
        grip: button_value(GamepadButton::LeftTrigger2),
        stick,
    }
}

fn bridge_gamepads(gamepads: Query<&Gamepad>, mut controllers: ResMut<XrControllers>) {
    let mut states = gamepads.iter().map(|pad| {
        controller_state(
            |b| pad.pressed(b),
            |b| pad.get(b),
            |a| pad.get(a),
        )
    });
    let right = states.next().unwrap_or_default();
    let left = states.next().unwrap_or_default();
    if controllers.get(Hand::Right) != &right {
        *controllers.get_mut(Hand::Right) = right;
    }
    if controllers.get(Hand::Left) != &left {
        *controllers.get_mut(Hand::Left) = left;
    }
}

pub struct GamepadBridgePlugin;

impl Plugin for GamepadBridgePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, bridge_gamepads.before(PlacementSet::Session));
    }
}
