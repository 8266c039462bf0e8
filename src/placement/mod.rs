// src/placement/mod.rs
//! Preview-and-commit placement of a single object onto scene surfaces.

pub mod core;
pub mod error;
pub mod config;
pub mod validity;
pub mod resolver;
pub mod presenter;
pub mod controller;
pub mod components;
pub mod scene;
pub mod systems;
mod plugin;

#[cfg(test)]
mod testing;

pub use components::{PlacedObject, PlacementAnchor, PlacementBlocker, PlacementPreview, PlacementSurface};
pub use config::{CommitTrigger, PlacementConfig, PlacementProfile};
pub use controller::{CommitOutcome, PlacementController};
pub use self::core::{ControlLock, LayerMask};
pub use error::PlacementError;
pub use plugin::PlacementPlugin;
