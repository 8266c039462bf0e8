use bevy::prelude::*;

mod setup;
mod input;
mod actions;
mod control;
mod state;
mod placement;
mod scenery;

// re-export the bits we actually need in main
use actions::ActionState;
use control::PlayerControl;
use input::{camera_controller, input_mapping_system, pause_toggle_system};
use state::GameState;
use placement::PlacementPlugin;
use scenery::SceneryPlugin;

fn main() {
    App::new()
        // core engine plugins
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Surface Placer".into(),
                ..default()
            }),
            ..default()
        }))
        // shared state first so plugins can hook into it
        .init_resource::<ActionState>()
        .init_resource::<PlayerControl>()
        .init_state::<GameState>()
        // domain plugins
        .add_plugins(SceneryPlugin)     // ground, platform, boulders
        .add_plugins(PlacementPlugin)   // 1 = place mode, 2 = leave, click = commit
        // camera, lights, placement anchor
        .add_systems(Startup, setup::setup)
        // input + camera + pause toggle each frame
        .add_systems(Update, pause_toggle_system)
        .add_systems(
            Update,
            (input_mapping_system, camera_controller)
                .chain()
                .run_if(in_state(GameState::Running)),
        )
        .run();
}
