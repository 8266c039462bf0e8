use bevy::prelude::*;
use crate::input::CameraOrbit;
use crate::placement::PlacementAnchor;

#[derive(Component)]
pub struct MainCamera;

pub fn setup(
    mut commands: Commands,
) {
    // 1) Light
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(4.0, 12.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // 2) Camera
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(10.0, 6.0, 0.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
        CameraOrbit {
            focus: Vec3::ZERO,
            radius: 12.0,
            yaw: 0.0,
            pitch: 0.5,
        },
    ));

    // 3) Everything the player places hangs off this
    commands.spawn((
        Name::new("Placement anchor"),
        PlacementAnchor,
        Transform::default(),
        Visibility::default(),
    ));
}
