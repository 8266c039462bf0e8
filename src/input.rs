use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::input::{mouse::MouseMotion, keyboard::KeyCode, ButtonInput};

use crate::actions::{PlayerAction, ActionState};
use crate::control::PlayerControl;
use crate::placement::{CommitTrigger, PlacementController};
use crate::setup::MainCamera;
use crate::state::GameState;

pub const MOVE_SPEED: f32 = 12.0;
pub const ROTATE_SPEED: f32 = 0.2;
pub const MAX_CAMERA_DT: f32 = 0.05; // never use a dt larger than 50ms
pub const MIN_CAMERA_HEIGHT: f32 = 1.0;

#[derive(Component)]
pub struct CameraOrbit {
    pub focus: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
}

/// Movement keys only register while placement has not suspended control.
pub fn input_mapping_system(
    keys: Res<ButtonInput<KeyCode>>,
    control: Res<PlayerControl>,
    mut action_state: ResMut<ActionState>,
) {
    let enabled = control.is_enabled();
    action_state.set(PlayerAction::MoveForward, enabled && keys.pressed(KeyCode::KeyW));
    action_state.set(PlayerAction::MoveBackward, enabled && keys.pressed(KeyCode::KeyS));
    action_state.set(PlayerAction::MoveLeft, enabled && keys.pressed(KeyCode::KeyA));
    action_state.set(PlayerAction::MoveRight, enabled && keys.pressed(KeyCode::KeyD));
}

/// 1 = enter, 2 = exit, left click = commit.
pub fn placement_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    controller: Res<PlacementController>,
    mut action_state: ResMut<ActionState>,
) {
    let trigger = controller.config().map(|c| c.commit_trigger).unwrap_or_default();
    let commit = match trigger {
        CommitTrigger::Pressed => mouse_buttons.just_pressed(MouseButton::Left),
        CommitTrigger::Held => mouse_buttons.pressed(MouseButton::Left),
    };
    action_state.set(PlayerAction::EnterPlacement, keys.just_pressed(KeyCode::Digit1));
    action_state.set(PlayerAction::ExitPlacement, keys.just_pressed(KeyCode::Digit2));
    action_state.set(PlayerAction::CommitPlacement, commit);
}

pub fn pause_toggle_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
    current_state: Res<State<GameState>>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        if current_state.get() == &GameState::Running {
            next_state.set(GameState::Paused);
            info!("Paused game");
        } else if current_state.get() == &GameState::Paused {
            next_state.set(GameState::Running);
            info!("Resumed game");
        }
    }
}

/// Orbit camera: WASD pans the focus, middle mouse orbits, wheel zooms.
/// Orbit and zoom stay live during placement so the player can aim.
pub fn camera_controller(
    time: Res<Time>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut motion_evr: EventReader<MouseMotion>,
    mut scroll_evr: EventReader<MouseWheel>,
    action_state: Res<ActionState>,
    mut query: Query<(&mut Transform, &mut CameraOrbit), With<MainCamera>>,
) {
    // 0) Clamp delta
    let dt = time.delta_secs().min(MAX_CAMERA_DT);

    let Ok((mut tf, mut orbit)) = query.single_mut() else { return; };

    // 1) Camera-relative movement
    let forward = Vec2::new(-orbit.yaw.cos(), -orbit.yaw.sin());
    let right = Vec2::new(-forward.y, forward.x);

    let mut dir = Vec2::ZERO;
    if action_state.pressed(PlayerAction::MoveForward) { dir += forward; }
    if action_state.pressed(PlayerAction::MoveBackward) { dir -= forward; }
    if action_state.pressed(PlayerAction::MoveLeft) { dir -= right; }
    if action_state.pressed(PlayerAction::MoveRight) { dir += right; }

    if dir != Vec2::ZERO {
        let delta = dir.normalize() * MOVE_SPEED * dt;
        orbit.focus.x += delta.x;
        orbit.focus.z += delta.y;
    }

    // 2) Zoom
    for ev in scroll_evr.read() {
        let amount = match ev.unit {
            MouseScrollUnit::Line => ev.y * 1.0,
            MouseScrollUnit::Pixel => ev.y * 0.02,
        };
        orbit.radius = (orbit.radius - amount).clamp(2.0, 60.0);
    }

    // 3) Orbit
    if mouse_buttons.pressed(MouseButton::Middle) {
        for ev in motion_evr.read() {
            orbit.yaw += ev.delta.x * ROTATE_SPEED * dt;
            orbit.pitch += ev.delta.y * ROTATE_SPEED * dt;
        }
    } else {
        motion_evr.clear();
    }

    orbit.pitch = orbit.pitch.clamp(
        -std::f32::consts::FRAC_PI_2 + 0.01,
        std::f32::consts::FRAC_PI_2 - 0.01,
    );

    // 4) Position camera
    let xz_radius = orbit.radius * orbit.pitch.cos();
    let offset = Vec3::new(
        xz_radius * orbit.yaw.cos(),
        orbit.radius * orbit.pitch.sin(),
        xz_radius * orbit.yaw.sin(),
    );

    tf.translation = orbit.focus + offset;

    // 5) Keep the camera off the floor
    if tf.translation.y < MIN_CAMERA_HEIGHT {
        tf.translation.y = MIN_CAMERA_HEIGHT;
    }

    tf.look_at(orbit.focus, Vec3::Y);
}
