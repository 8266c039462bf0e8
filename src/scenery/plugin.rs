use bevy::prelude::*;

use crate::scenery::systems::{spawn_ground, scatter_boulders};

/// Demo world knobs.
#[derive(Resource, Clone)]
pub struct SceneSettings {
    pub world_seed: u64,
    pub boulder_count: usize,
    /// Boulders land within this distance of the origin.
    pub scatter_radius: f32,
    /// Keeps the area around the camera focus clear.
    pub clear_radius: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            world_seed: 1337,
            boulder_count: 24,
            scatter_radius: 25.0,
            clear_radius: 4.0,
        }
    }
}

pub struct SceneryPlugin;

impl Plugin for SceneryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneSettings>()
            .add_systems(Startup, (spawn_ground, scatter_boulders));
    }
}
