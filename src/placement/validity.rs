// src/placement/validity.rs
//! The "is this spot legal?" capability carried by preview instances.

use bevy::prelude::*;
use std::sync::{Arc, RwLock};

use super::core::PlacementTransform;

/// Answers whether the preview's current spot may be committed.
pub trait ValidityCapability: Send + Sync + 'static {
    fn is_valid(&self) -> bool;
}

/// Fail-closed read: no capability means invalid.
#[inline]
pub fn evaluate(capability: Option<&dyn ValidityCapability>) -> bool {
    capability.is_some_and(|c| c.is_valid())
}

// ---------- Shared state handed to capabilities ----------

/// Penetration depth below which two boxes are only resting on each other.
/// Covers the rounding in `hit.y + half_height`.
pub const CONTACT_SLOP: f32 = 1e-4;

/// World-space axis-aligned box something occupies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockerBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BlockerBox {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self { min: center - half_extents, max: center + half_extents }
    }

    /// Axis-aligned bounds of a box turned by `rotation`.
    pub fn oriented(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        Self::from_center(center, rotated_half_extents(half_extents, rotation))
    }

    /// Strict overlap; boxes that only touch (within `CONTACT_SLOP`) do not count.
    pub fn overlaps(&self, other: &BlockerBox) -> bool {
        let slop = Vec3::splat(CONTACT_SLOP);
        (other.max - self.min).cmpgt(slop).all() && (self.max - other.min).cmpgt(slop).all()
    }
}

/// Half extents of the world AABB enclosing a rotated box.
pub fn rotated_half_extents(half: Vec3, rotation: Quat) -> Vec3 {
    let m = Mat3::from_quat(rotation);
    let (x, y, z) = (m.x_axis.abs(), m.y_axis.abs(), m.z_axis.abs());
    x * half.x + y * half.y + z * half.z
}

/// Last pose written for a preview; updated by the scene backend on every move.
pub type SharedPose = Arc<RwLock<PlacementTransform>>;

/// Blocker boxes rebuilt once per frame before placement runs.
#[derive(Resource, Clone, Default)]
pub struct BlockerIndex(pub Arc<RwLock<Vec<BlockerBox>>>);

impl BlockerIndex {
    pub fn replace(&self, boxes: Vec<BlockerBox>) {
        match self.0.write() {
            Ok(mut guard) => *guard = boxes,
            Err(poisoned) => *poisoned.into_inner() = boxes,
        }
    }
}

// ---------- Footprint clearance ----------

/// Valid while the yaw-rotated footprint (grown sideways by `margin`) overlaps no blocker.
pub struct FootprintClearance {
    pub half_extents: Vec3,
    pub margin: f32,
    pub pose: SharedPose,
    pub blockers: BlockerIndex,
}

impl FootprintClearance {
    /// World AABB of the footprint at `at`. The margin never applies vertically,
    /// so resting on top of a blocker stays clear.
    pub fn footprint(&self, at: &PlacementTransform) -> BlockerBox {
        let world_half = rotated_half_extents(self.half_extents, at.rotation());
        BlockerBox::from_center(at.position, world_half + Vec3::new(self.margin, 0.0, self.margin))
    }
}

impl ValidityCapability for FootprintClearance {
    fn is_valid(&self) -> bool {
        let Ok(pose) = self.pose.read() else { return false; };
        let Ok(blockers) = self.blockers.0.read() else { return false; };
        let mine = self.footprint(&pose);
        !blockers.iter().any(|b| b.overlaps(&mine))
    }
}
