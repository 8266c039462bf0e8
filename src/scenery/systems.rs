// src/scenery/systems.rs
//! Ground, a raised platform and seeded boulders to place things around.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::placement::{LayerMask, PlacementBlocker, PlacementSurface};
use crate::scenery::plugin::SceneSettings;

const GROUND_HALF: f32 = 30.0;

pub fn spawn_ground(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // 1) Ground slab, top face at y = 0
    commands.spawn((
        Name::new("Ground"),
        Mesh3d(meshes.add(Cuboid::new(GROUND_HALF * 2.0, 1.0, GROUND_HALF * 2.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(96, 128, 80),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::from_xyz(0.0, -0.5, 0.0),
        PlacementSurface { layers: LayerMask::GROUND },
    ));

    // 2) Platform: placeable on top, blocks from the side
    let half = Vec3::new(3.0, 0.75, 3.0);
    commands.spawn((
        Name::new("Platform"),
        Mesh3d(meshes.add(Cuboid::new(half.x * 2.0, half.y * 2.0, half.z * 2.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(150, 140, 120),
            ..default()
        })),
        Transform::from_xyz(-8.0, half.y, -6.0),
        PlacementSurface { layers: LayerMask::GROUND },
        PlacementBlocker { half_extents: half },
    ));
}

/// Deterministic scatter: same seed, same boulders.
pub fn scatter_boulders(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<SceneSettings>,
) {
    let mut rng = ChaCha8Rng::seed_from_u64(settings.world_seed ^ 0xB01D_E125_0000_0001u64);
    let mesh = meshes.add(Sphere::new(1.0));
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(110, 108, 104),
        perceptual_roughness: 1.0,
        ..default()
    });

    let inner = settings.clear_radius.min(settings.scatter_radius);
    for i in 0..settings.boulder_count {
        let ang = rng.random_range(0.0..std::f32::consts::TAU);
        let dist = rng.random_range(inner..=settings.scatter_radius);
        let r = rng.random_range(0.4..1.2);
        let pos = Vec3::new(ang.cos() * dist, r * 0.6, ang.sin() * dist);

        commands.spawn((
            Name::new(format!("Boulder {i}")),
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(pos).with_scale(Vec3::splat(r)),
            PlacementSurface { layers: LayerMask::PROPS },
            PlacementBlocker { half_extents: Vec3::splat(r) },
        ));
    }
    info!("Scenery: scattered {} boulders (seed {})", settings.boulder_count, settings.world_seed);
}
