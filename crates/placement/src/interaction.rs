//! Interaction layer seam: grab/hover events, interactors and polled
//! controller state. Whatever drives input (desktop mouse, gamepad, XR rig)
//! only has to produce these.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A pointer started or stopped grabbing `target`. Begins and ends share one
/// stream so readers see them in the order they were sent.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabEvent {
    Started { target: Entity, pointer: Entity },
    Ended { target: Entity, pointer: Entity },
}

impl GrabEvent {
    pub fn target(&self) -> Entity {
        match *self {
            GrabEvent::Started { target, .. } | GrabEvent::Ended { target, .. } => target,
        }
    }

    pub fn pointer(&self) -> Entity {
        match *self {
            GrabEvent::Started { pointer, .. } | GrabEvent::Ended { pointer, .. } => pointer,
        }
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverStarted {
    pub target: Entity,
    pub pointer: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverEnded {
    pub target: Entity,
    pub pointer: Entity,
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Hand {
    Left,
    #[default]
    Right,
}

impl Hand {
    pub fn other(self) -> Self {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }
}

/// An entity whose world pose is a pointer (hand, controller, mouse ray).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Interactor {
    pub hand: Option<Hand>,
}

/// Whether the whole-object grab of this entity is currently allowed.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrabInteraction {
    pub enabled: bool,
}

impl Default for GrabInteraction {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Entity (and its subtree) takes no part in interaction or constraints.
/// Set on preview ghosts.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Inert;

// ---------------------------------------------------------------------------
// Controller state
// ---------------------------------------------------------------------------

/// One polled controller. Analog values are `None` when the device lacks them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerState {
    pub connected: bool,
    pub primary_button: bool,
    pub secondary_button: bool,
    pub trigger_button: bool,
    pub menu_button: bool,
    pub trigger: Option<f32>,
    pub grip: Option<f32>,
    pub stick: Option<Vec2>,
}

/// Latest state of both hands, written by whatever input bridge is active.
#[derive(Resource, Debug, Clone, Default)]
pub struct XrControllers {
    pub left: ControllerState,
    pub right: ControllerState,
}

impl XrControllers {
    pub fn get(&self, hand: Hand) -> &ControllerState {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, hand: Hand) -> &mut ControllerState {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    /// The controller for `hand`, falling back to the other hand when that
    /// one is not connected.
    pub fn device(&self, hand: Hand) -> Option<(Hand, &ControllerState)> {
        [hand, hand.other()]
            .into_iter()
            .map(|h| (h, self.get(h)))
            .find(|(_, state)| state.connected)
    }
}

/// Set by the UI layer while the pointer is over a panel.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerOverUi(pub bool);

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<GrabEvent>()
            .add_event::<HoverStarted>()
            .add_event::<HoverEnded>()
            .init_resource::<XrControllers>()
            .init_resource::<PointerOverUi>();
    }
}
