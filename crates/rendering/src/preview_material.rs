//! Ghost look for preview instances: every material under a freshly prepared
//! ghost is cloned, pulled towards the preview tint and made transparent.

use bevy::pbr::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;

use placement::config::PREVIEW_TINT_BLEND;
use placement::session::{PlacementSettings, PreviewPrepared};

/// Component-wise blend of `base` towards `tint`, alpha included.
pub fn tinted(base: Color, tint: Color, blend: f32) -> Color {
    let a = base.to_srgba();
    let b = tint.to_srgba();
    let lerp = |x: f32, y: f32| x + (y - x) * blend;
    Color::srgba(
        lerp(a.red, b.red),
        lerp(a.green, b.green),
        lerp(a.blue, b.blue),
        lerp(a.alpha, b.alpha),
    )
}

fn ghost_material(source: &StandardMaterial, tint: Color) -> StandardMaterial {
    StandardMaterial {
        base_color: tinted(source.base_color, tint, PREVIEW_TINT_BLEND),
        alpha_mode: AlphaMode::Blend,
        ..source.clone()
    }
}

pub fn tint_preview_ghosts(
    mut commands: Commands,
    settings: Res<PlacementSettings>,
    ghosts: Query<Entity, Added<PreviewPrepared>>,
    children: Query<&Children>,
    meshes: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let tint = settings.preview_tint_color();
    for root in &ghosts {
        let mut tinted_count = 0;
        for entity in std::iter::once(root).chain(children.iter_descendants(root)) {
            let Ok(material) = meshes.get(entity) else {
                continue;
            };
            let Some(source) = materials.get(&material.0) else {
                continue;
            };
            let ghost_source = ghost_material(source, tint);
            let ghost = materials.add(ghost_source);
            commands
                .entity(entity)
                .insert((MeshMaterial3d(ghost), NotShadowCaster, NotShadowReceiver));
            tinted_count += 1;
        }
        debug!("Tinted {tinted_count} preview meshes under {root:?}");
    }
}
