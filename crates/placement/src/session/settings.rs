//! Placement configuration: tunables loaded from JSON and the debug key map.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_PREVIEW_TINT, MIN_PREVIEW_RAY_DISTANCE, MIN_SPAWNED_BODY_MASS};
use crate::error::PlacementError;
use crate::interaction::Hand;
use crate::raycast::LayerMask;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    // Selection
    pub spawn_on_selection: bool,
    pub use_spawn_point_rotation: bool,
    pub force_identity_rotation: bool,
    pub use_spawn_point_scale: bool,

    // Preview
    pub use_preview_placement: bool,
    pub preview_raycast_mask: LayerMask,
    pub preview_ray_distance: f32,
    pub preview_lift: f32,
    pub hide_preview_when_no_hit: bool,
    pub disable_behaviours_on_preview: bool,
    pub preview_tint: [f32; 4],

    // Debug input
    pub use_debug_keyboard_shortcuts: bool,
    pub allow_mouse_click_to_confirm: bool,
    pub rotation_step_degrees: f32,

    // Controller input
    pub use_controller_buttons: bool,
    pub controller_hand: Hand,
    pub trigger_press_threshold: f32,
    pub stick_rotate_deadzone: f32,

    // Spawn setup
    pub setup_grid_placement_on_spawn: bool,
    pub add_body_if_missing: bool,
    pub add_grab_interaction_if_missing: bool,
    pub add_grid_motion_constraint_if_missing: bool,
    pub add_planar_constraint_if_missing: bool,
    pub freeze_vertical_and_tilt: bool,
    pub enable_gravity_on_spawn: bool,
    pub spawned_body_mass: f32,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            spawn_on_selection: true,
            use_spawn_point_rotation: true,
            force_identity_rotation: true,
            use_spawn_point_scale: false,

            use_preview_placement: true,
            preview_raycast_mask: LayerMask::DEFAULT_RAYCAST,
            preview_ray_distance: 100.0,
            preview_lift: 0.01,
            hide_preview_when_no_hit: true,
            disable_behaviours_on_preview: true,
            preview_tint: DEFAULT_PREVIEW_TINT,

            use_debug_keyboard_shortcuts: true,
            allow_mouse_click_to_confirm: true,
            rotation_step_degrees: 90.0,

            use_controller_buttons: true,
            controller_hand: Hand::Right,
            trigger_press_threshold: 0.75,
            stick_rotate_deadzone: 0.75,

            setup_grid_placement_on_spawn: true,
            add_body_if_missing: true,
            add_grab_interaction_if_missing: true,
            add_grid_motion_constraint_if_missing: true,
            add_planar_constraint_if_missing: true,
            freeze_vertical_and_tilt: true,
            enable_gravity_on_spawn: true,
            spawned_body_mass: 1.0,
        }
    }
}

impl PlacementSettings {
    /// Check every ranged value. The first offending setting is returned.
    pub fn validate(&self) -> Result<(), PlacementError> {
        let checks: [(&'static str, f32, bool); 6] = [
            (
                "preview_ray_distance",
                self.preview_ray_distance,
                self.preview_ray_distance >= MIN_PREVIEW_RAY_DISTANCE,
            ),
            ("preview_lift", self.preview_lift, self.preview_lift >= 0.0),
            (
                "rotation_step_degrees",
                self.rotation_step_degrees,
                self.rotation_step_degrees >= 1.0,
            ),
            (
                "trigger_press_threshold",
                self.trigger_press_threshold,
                (0.1..=1.0).contains(&self.trigger_press_threshold),
            ),
            (
                "stick_rotate_deadzone",
                self.stick_rotate_deadzone,
                (0.1..=1.0).contains(&self.stick_rotate_deadzone),
            ),
            (
                "spawned_body_mass",
                self.spawned_body_mass,
                self.spawned_body_mass >= MIN_SPAWNED_BODY_MASS,
            ),
        ];
        for (name, value, ok) in checks {
            if !ok || !value.is_finite() {
                return Err(PlacementError::InvalidSetting { name, value });
            }
        }
        Ok(())
    }

    pub fn preview_tint_color(&self) -> Color {
        let [r, g, b, a] = self.preview_tint;
        Color::srgba(r, g, b, a)
    }
}

/// A single debug key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub alt_key: Option<KeyCode>,
}

impl KeyBinding {
    pub const fn simple(key: KeyCode) -> Self {
        Self { key, alt_key: None }
    }

    pub const fn with_alt(key: KeyCode, alt: KeyCode) -> Self {
        Self {
            key,
            alt_key: Some(alt),
        }
    }

    pub fn just_pressed(self, keys: &ButtonInput<KeyCode>) -> bool {
        keys.just_pressed(self.key) || self.alt_key.is_some_and(|k| keys.just_pressed(k))
    }
}

/// Debug keyboard shortcuts for the placement preview.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct PlacementKeys {
    pub confirm: KeyBinding,
    pub cancel: KeyBinding,
    pub rotate_left: KeyBinding,
    pub rotate_right: KeyBinding,
}

impl Default for PlacementKeys {
    fn default() -> Self {
        Self {
            confirm: KeyBinding::with_alt(KeyCode::Enter, KeyCode::NumpadEnter),
            cancel: KeyBinding::simple(KeyCode::Escape),
            rotate_left: KeyBinding::simple(KeyCode::KeyQ),
            rotate_right: KeyBinding::simple(KeyCode::KeyE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(PlacementSettings::default().validate(), Ok(()));
    }

    #[test]
    fn test_out_of_range_setting_is_named() {
        let settings = PlacementSettings {
            stick_rotate_deadzone: 0.0,
            ..default()
        };
        assert_eq!(
            settings.validate(),
            Err(PlacementError::InvalidSetting {
                name: "stick_rotate_deadzone",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let json = r#"{ "force_identity_rotation": false, "rotation_step_degrees": 45.0 }"#;
        let settings: PlacementSettings = serde_json::from_str(json).unwrap();
        assert!(!settings.force_identity_rotation);
        assert_eq!(settings.rotation_step_degrees, 45.0);
        assert_eq!(settings.preview_ray_distance, 100.0);
        assert_eq!(settings.controller_hand, Hand::Right);
    }

    #[test]
    fn test_confirm_accepts_numpad_enter() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::NumpadEnter);
        assert!(PlacementKeys::default().confirm.just_pressed(&keys));
    }
}
