use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use placement::interaction::PointerOverUi;

const PAN_SPEED: f32 = 8.0;
const ZOOM_SPEED: f32 = 0.1;
const MIN_DISTANCE: f32 = 3.0;
const MAX_DISTANCE: f32 = 120.0;
const MIN_PITCH: f32 = 10.0 * std::f32::consts::PI / 180.0;
const MAX_PITCH: f32 = 85.0 * std::f32::consts::PI / 180.0;
const ORBIT_SENSITIVITY: f32 = 0.005;
const FOCUS_LIMIT: f32 = 200.0;

/// Orbital camera model: camera orbits around a focus point on the ground.
#[derive(Resource)]
pub struct OrbitCamera {
    /// Ground point the camera looks at
    pub focus: Vec3,
    /// Horizontal rotation in radians
    pub yaw: f32,
    /// Elevation angle in radians (clamped between MIN_PITCH and MAX_PITCH)
    pub pitch: f32,
    /// Distance from focus point
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            yaw: 0.6,
            pitch: 50.0_f32.to_radians(),
            distance: 18.0,
        }
    }
}

#[derive(Resource, Default)]
pub struct CameraOrbitDrag {
    pub dragging: bool,
    pub last_pos: Vec2,
}

/// Marks the scene's main camera.
#[derive(Component, Debug, Default)]
pub struct MainCamera;

pub fn setup_camera(mut commands: Commands) {
    let orbit = OrbitCamera::default();
    let (pos, look_at) = orbit_to_transform(&orbit);

    commands.spawn((
        MainCamera,
        Camera3d::default(),
        Transform::from_translation(pos).looking_at(look_at, Vec3::Y),
    ));
    commands.insert_resource(orbit);
}

fn clamp_focus(focus: &mut Vec3) {
    focus.x = focus.x.clamp(-FOCUS_LIMIT, FOCUS_LIMIT);
    focus.z = focus.z.clamp(-FOCUS_LIMIT, FOCUS_LIMIT);
}

pub(crate) fn orbit_to_transform(orbit: &OrbitCamera) -> (Vec3, Vec3) {
    // Spherical to cartesian offset from focus
    let x = orbit.distance * orbit.pitch.cos() * orbit.yaw.sin();
    let y = orbit.distance * orbit.pitch.sin();
    let z = orbit.distance * orbit.pitch.cos() * orbit.yaw.cos();
    (orbit.focus + Vec3::new(x, y, z), orbit.focus)
}

/// Apply OrbitCamera state to the camera Transform whenever it changes.
pub fn apply_orbit_camera(
    orbit: Res<OrbitCamera>,
    mut query: Query<&mut Transform, With<MainCamera>>,
) {
    if !orbit.is_changed() {
        return;
    }
    let (pos, look_at) = orbit_to_transform(&orbit);
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    *transform = Transform::from_translation(pos).looking_at(look_at, Vec3::Y);
}

/// WASD: pan focus along the ground, relative to the current yaw.
/// Arrow keys and Q/E are left to placement.
pub fn camera_pan_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let mut dir = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        dir.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        dir.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        dir.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        dir.x += 1.0;
    }
    if dir == Vec2::ZERO {
        return;
    }

    let dir = dir.normalize();
    let delta = PAN_SPEED * (orbit.distance / 20.0) * time.delta_secs();
    let (sin_yaw, cos_yaw) = orbit.yaw.sin_cos();
    orbit.focus.x += (dir.x * cos_yaw + dir.y * sin_yaw) * delta;
    orbit.focus.z += (-dir.x * sin_yaw + dir.y * cos_yaw) * delta;
    clamp_focus(&mut orbit.focus);
}

/// Right-mouse drag: orbit (horizontal = yaw, vertical = pitch).
pub fn camera_orbit_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    over_ui: Res<PointerOverUi>,
    mut drag: ResMut<CameraOrbitDrag>,
    mut orbit: ResMut<OrbitCamera>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };

    if buttons.just_pressed(MouseButton::Right) && !over_ui.0 {
        if let Some(pos) = window.cursor_position() {
            drag.dragging = true;
            drag.last_pos = pos;
        }
    }
    if buttons.just_released(MouseButton::Right) {
        drag.dragging = false;
    }

    if drag.dragging {
        if let Some(pos) = window.cursor_position() {
            let delta = pos - drag.last_pos;
            orbit.yaw -= delta.x * ORBIT_SENSITIVITY;
            orbit.pitch = (orbit.pitch + delta.y * ORBIT_SENSITIVITY).clamp(MIN_PITCH, MAX_PITCH);
            drag.last_pos = pos;
        }
    }
}

/// Scroll wheel: zoom (change distance).
pub fn camera_zoom(
    mut scroll_evts: EventReader<MouseWheel>,
    over_ui: Res<PointerOverUi>,
    mut orbit: ResMut<OrbitCamera>,
) {
    if over_ui.0 {
        scroll_evts.clear();
        return;
    }
    for evt in scroll_evts.read() {
        let dy = match evt.unit {
            MouseScrollUnit::Line => evt.y,
            MouseScrollUnit::Pixel => evt.y / 100.0,
        };
        let factor = 1.0 - dy * ZOOM_SPEED;
        orbit.distance = (orbit.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_position_respects_distance_and_pitch() {
        let orbit = OrbitCamera {
            focus: Vec3::new(2.0, 0.0, -1.0),
            yaw: 0.0,
            pitch: 45.0_f32.to_radians(),
            distance: 10.0,
        };
        let (pos, look_at) = orbit_to_transform(&orbit);
        assert_eq!(look_at, orbit.focus);
        assert!(((pos - look_at).length() - 10.0).abs() < 1e-4);
        assert!((pos.y - 10.0 * 45.0_f32.to_radians().sin()).abs() < 1e-4);
        // yaw 0 looks down -Z from the +Z side
        assert!(pos.z > look_at.z);
    }

    #[test]
    fn test_focus_is_clamped() {
        let mut focus = Vec3::new(1e6, 0.0, -1e6);
        clamp_focus(&mut focus);
        assert_eq!(focus, Vec3::new(FOCUS_LIMIT, 0.0, -FOCUS_LIMIT));
    }
}
