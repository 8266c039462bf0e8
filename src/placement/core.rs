// src/placement/core.rs
//! Core placement types and the collaborator traits the controller talks to.
//! Engine-facing code implements these; the state machine only sees the traits.

use bevy::prelude::*; // Vec3, Quat, Entity
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::PlacementError;
use super::validity::ValidityCapability;

/// Used when the preview's vertical half-extent is unknown.
pub const FALLBACK_HALF_HEIGHT: f32 = 0.5;

/// Horizontal projections shorter than this count as degenerate.
pub const MIN_HORIZONTAL_LEN: f32 = 1e-4;

// ---------- Mode & transform ----------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlacementMode {
    #[default]
    Inactive,
    Active,
}

/// Position plus yaw-only orientation (radians about +Y).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlacementTransform {
    pub position: Vec3,
    pub yaw: f32,
}

impl PlacementTransform {
    pub const fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn to_transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation())
    }
}

/// Yaw that turns Bevy's forward (-Z) onto the given horizontal direction.
#[inline]
pub fn yaw_from_direction(dir: Vec3) -> f32 {
    (-dir.x).atan2(-dir.z)
}

/// Where the viewer is and which way it looks, sampled once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub forward: Vec3,
}

impl CameraPose {
    pub fn from_global(gt: &GlobalTransform) -> Self {
        Self { position: gt.translation(), forward: gt.forward().into() }
    }
}

// ---------- Layers ----------

/// Bitmask of collision layers. A query matches a surface when any bit overlaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const GROUND: Self = Self(1 << 0);
    pub const PROPS: Self = Self(1 << 1);

    pub fn from_layers(layers: &[u8]) -> Self {
        Self(layers.iter().filter(|&&l| l < 32).fold(0, |m, &l| m | (1 << l)))
    }
    pub fn any(self, other: Self) -> bool { (self.0 & other.0) != 0 }
}

impl Default for LayerMask {
    fn default() -> Self { Self::GROUND }
}

// ---------- Collaborators ----------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Downward ray query against scene geometry; nearest hit wins.
/// Takes `&mut self` so implementations can reuse scratch buffers between casts.
pub trait SpatialQuery {
    fn cast_downward(&mut self, origin: Vec3, max_distance: f32, layers: LayerMask) -> Option<SurfaceHit>;
}

/// Suspends and resumes whatever drives player movement.
pub trait ControlLock: Send + Sync + 'static {
    fn suspend(&mut self);
    fn resume(&mut self);
}

/// Handle to an instance living in the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstanceHandle(pub Entity);

/// Which prefab a spawn refers to, by catalog name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrefabRef(pub String);

impl PrefabRef {
    pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }
    pub fn name(&self) -> &str { &self.0 }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstanceRole {
    /// Transient stand-in, never persisted.
    Preview,
    /// Owned by the scene once spawned.
    Committed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PreviewStyle {
    Valid,
    Invalid,
}

impl PreviewStyle {
    pub fn from_verdict(valid: bool) -> Self {
        if valid { Self::Valid } else { Self::Invalid }
    }
}

/// What a spawn hands back: the handle plus what the preview carries with it.
pub struct SpawnedInstance {
    pub handle: InstanceHandle,
    pub validity: Option<Arc<dyn ValidityCapability>>,
    pub half_height: Option<f32>,
}

/// Instantiation, destruction and styling of scene objects.
pub trait SceneBackend {
    fn spawn(
        &mut self,
        prefab: &PrefabRef,
        at: &PlacementTransform,
        parent: Option<InstanceHandle>,
        role: InstanceRole,
    ) -> Result<SpawnedInstance, PlacementError>;

    fn destroy(&mut self, handle: InstanceHandle);

    fn set_transform(&mut self, handle: InstanceHandle, at: &PlacementTransform);

    fn set_style(&mut self, handle: InstanceHandle, style: PreviewStyle) -> Result<(), PlacementError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaw_faces_forward_direction() {
        assert!(yaw_from_direction(Vec3::NEG_Z).abs() < 1e-6);
        let yaw = yaw_from_direction(Vec3::X);
        let fwd = Quat::from_rotation_y(yaw) * Vec3::NEG_Z;
        assert!(fwd.distance(Vec3::X) < 1e-5);
    }

    #[test]
    fn layer_mask_from_indices() {
        let m = LayerMask::from_layers(&[0, 3, 40]);
        assert_eq!(m, LayerMask(0b1001));
        assert!(m.any(LayerMask::GROUND));
        assert!(!m.any(LayerMask::PROPS));
    }
}
