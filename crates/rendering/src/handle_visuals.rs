use bevy::prelude::*;

use placement::scale_handle::AxisScaleHandle;

/// Unlit colour for a scale handle's meshes (the handle and its children).
#[derive(Component, Debug, Clone, Copy)]
pub struct HandleColor(pub Color);

impl Default for HandleColor {
    fn default() -> Self {
        Self(Color::srgb(1.0, 0.92, 0.016))
    }
}

impl HandleColor {
    /// Red, green and blue for the X, Y and Z families.
    pub fn for_axis(axis: Vec3) -> Self {
        let a = axis.abs();
        if a.x > 0.5 {
            Self(Color::srgb(0.9, 0.25, 0.2))
        } else if a.y > 0.5 {
            Self(Color::srgb(0.3, 0.85, 0.3))
        } else {
            Self(Color::srgb(0.25, 0.45, 0.95))
        }
    }
}

/// The material owned by one handle.
#[derive(Component, Debug, Clone)]
pub struct HandleMaterial(pub Handle<StandardMaterial>);

/// Hovered or grabbed handles are drawn halfway to white.
pub fn handle_display_color(color: Color, active: bool) -> Color {
    if !active {
        return color;
    }
    let c = color.to_srgba();
    Color::srgba(
        (c.red + 1.0) * 0.5,
        (c.green + 1.0) * 0.5,
        (c.blue + 1.0) * 0.5,
        c.alpha,
    )
}

pub fn setup_handle_visuals(
    mut commands: Commands,
    handles: Query<(Entity, &HandleColor), Added<HandleColor>>,
    children: Query<&Children>,
    meshes: Query<(), With<Mesh3d>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, color) in &handles {
        let material = materials.add(StandardMaterial {
            base_color: color.0,
            unlit: true,
            ..default()
        });
        for visual in std::iter::once(entity).chain(children.iter_descendants(entity)) {
            if meshes.contains(visual) {
                commands
                    .entity(visual)
                    .insert(MeshMaterial3d(material.clone()));
            }
        }
        commands.entity(entity).insert(HandleMaterial(material));
    }
}

pub fn highlight_active_handles(
    handles: Query<
        (&AxisScaleHandle, &HandleColor, &HandleMaterial),
        Or<(Changed<AxisScaleHandle>, Added<HandleMaterial>)>,
    >,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (handle, color, material) in &handles {
        let Some(material) = materials.get_mut(&material.0) else {
            continue;
        };
        let wanted = handle_display_color(color.0, handle.is_active());
        if material.base_color != wanted {
            material.base_color = wanted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_families_share_colours() {
        let x = HandleColor::for_axis(Vec3::X).0;
        assert_eq!(HandleColor::for_axis(Vec3::NEG_X).0, x);
        assert_ne!(HandleColor::for_axis(Vec3::Y).0, x);
        assert_ne!(HandleColor::for_axis(Vec3::Z).0, HandleColor::for_axis(Vec3::Y).0);
    }

    #[test]
    fn test_active_handles_are_lighter() {
        let base = Color::srgb(0.2, 0.4, 0.0);
        assert_eq!(handle_display_color(base, false), base);
        let lit = handle_display_color(base, true).to_srgba();
        assert!((lit.red - 0.6).abs() < 1e-6);
        assert!((lit.green - 0.7).abs() < 1e-6);
        assert!((lit.blue - 0.5).abs() < 1e-6);
    }
}
