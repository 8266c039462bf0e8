use bevy::prelude::*;

use super::core::LayerMask;

/// Parent of everything placement spawns. Removing it cancels placement.
#[derive(Component, Default)]
pub struct PlacementAnchor;

/// Marks a mesh the surface ray cast may land on, and which layers it sits in.
#[derive(Component, Clone, Copy)]
pub struct PlacementSurface {
    pub layers: LayerMask,
}

/// Occupies space; previews may not overlap it.
#[derive(Component, Clone, Copy)]
pub struct PlacementBlocker {
    pub half_extents: Vec3,
}

/// The transient stand-in shown while placing.
#[derive(Component)]
pub struct PlacementPreview;

/// Committed by the player; the scene owns it from here on.
#[derive(Component)]
pub struct PlacedObject {
    pub prefab: String,
}
