// src/placement/testing.rs
//! Hand-rolled collaborators for placement unit tests.

use bevy::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::core::*;
use super::error::PlacementError;
use super::validity::ValidityCapability;

/// Capability whose answer the test flips at will.
pub struct Fixed(AtomicBool);

impl Fixed {
    pub fn new(valid: bool) -> Arc<Self> { Arc::new(Self(AtomicBool::new(valid))) }
    pub fn set(&self, valid: bool) { self.0.store(valid, Ordering::SeqCst); }
}

impl ValidityCapability for Fixed {
    fn is_valid(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Spawn {
    pub handle: InstanceHandle,
    pub prefab: String,
    pub at: PlacementTransform,
    pub parent: Option<InstanceHandle>,
    pub role: InstanceRole,
}

/// Records every call; spawns succeed unless the prefab is in `broken`.
pub struct FakeScene {
    pub spawns: Vec<Spawn>,
    pub destroyed: Vec<InstanceHandle>,
    pub moves: Vec<(InstanceHandle, PlacementTransform)>,
    pub styles: Vec<PreviewStyle>,
    pub validity: Option<Arc<Fixed>>,
    pub half_height: Option<f32>,
    pub broken: Vec<String>,
    pub unstyled: bool,
    next: u32,
}

impl Default for FakeScene {
    fn default() -> Self {
        Self {
            spawns: Vec::new(),
            destroyed: Vec::new(),
            moves: Vec::new(),
            styles: Vec::new(),
            validity: Some(Fixed::new(false)),
            half_height: Some(0.5),
            broken: Vec::new(),
            unstyled: false,
            next: 1,
        }
    }
}

impl FakeScene {
    fn live(&self, role: InstanceRole) -> usize {
        self.spawns
            .iter()
            .filter(|s| s.role == role && !self.destroyed.contains(&s.handle))
            .count()
    }
    pub fn live_previews(&self) -> usize { self.live(InstanceRole::Preview) }
    pub fn committed(&self) -> Vec<&Spawn> {
        self.spawns.iter().filter(|s| s.role == InstanceRole::Committed).collect()
    }
}

impl SceneBackend for FakeScene {
    fn spawn(
        &mut self,
        prefab: &PrefabRef,
        at: &PlacementTransform,
        parent: Option<InstanceHandle>,
        role: InstanceRole,
    ) -> Result<SpawnedInstance, PlacementError> {
        if self.broken.iter().any(|b| b == prefab.name()) {
            return Err(PlacementError::SpawnFailed { prefab: prefab.name().to_string(), reason: "broken".into() });
        }
        let handle = InstanceHandle(Entity::from_raw(self.next));
        self.next += 1;
        self.spawns.push(Spawn { handle, prefab: prefab.name().to_string(), at: *at, parent, role });
        Ok(SpawnedInstance {
            handle,
            validity: self.validity.clone().map(|v| v as Arc<dyn ValidityCapability>),
            half_height: self.half_height,
        })
    }

    fn destroy(&mut self, handle: InstanceHandle) {
        self.destroyed.push(handle);
    }

    fn set_transform(&mut self, handle: InstanceHandle, at: &PlacementTransform) {
        self.moves.push((handle, *at));
    }

    fn set_style(&mut self, _handle: InstanceHandle, style: PreviewStyle) -> Result<(), PlacementError> {
        if self.unstyled {
            return Err(PlacementError::PreviewMaterialMissing(style));
        }
        self.styles.push(style);
        Ok(())
    }
}

/// Horizontal floor at a fixed height, or nothing.
pub struct Floor(pub Option<f32>);

impl SpatialQuery for Floor {
    fn cast_downward(&mut self, origin: Vec3, max_distance: f32, _layers: LayerMask) -> Option<SurfaceHit> {
        let h = self.0?;
        let d = origin.y - h;
        (d >= 0.0 && d <= max_distance).then(|| SurfaceHit { point: Vec3::new(origin.x, h, origin.z), normal: Vec3::Y, distance: d })
    }
}

/// Counts suspend/resume calls through shared counters.
#[derive(Clone, Default)]
pub struct CountingLock {
    pub suspends: Arc<AtomicUsize>,
    pub resumes: Arc<AtomicUsize>,
}

impl CountingLock {
    pub fn suspends(&self) -> usize { self.suspends.load(Ordering::SeqCst) }
    pub fn resumes(&self) -> usize { self.resumes.load(Ordering::SeqCst) }
}

impl ControlLock for CountingLock {
    fn suspend(&mut self) { self.suspends.fetch_add(1, Ordering::SeqCst); }
    fn resume(&mut self) { self.resumes.fetch_add(1, Ordering::SeqCst); }
}
