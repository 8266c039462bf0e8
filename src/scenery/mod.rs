// src/scenery/mod.rs

mod systems;
mod plugin;

pub use plugin::{SceneryPlugin, SceneSettings};
