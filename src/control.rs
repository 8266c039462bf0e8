// src/control.rs
use bevy::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::placement::ControlLock;

/// Whether the player may move the camera rig. Only placement flips it.
#[derive(Resource, Clone)]
pub struct PlayerControl {
    enabled: Arc<AtomicBool>,
}

impl Default for PlayerControl {
    fn default() -> Self {
        Self { enabled: Arc::new(AtomicBool::new(true)) }
    }
}

impl PlayerControl {
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// A lock handle sharing this flag, for whoever needs to suspend movement.
    pub fn lock(&self) -> MovementLock {
        MovementLock { enabled: Arc::clone(&self.enabled) }
    }
}

pub struct MovementLock {
    enabled: Arc<AtomicBool>,
}

impl ControlLock for MovementLock {
    fn suspend(&mut self) {
        self.enabled.store(false, Ordering::Relaxed);
        debug!("Player movement suspended");
    }

    fn resume(&mut self) {
        self.enabled.store(true, Ordering::Relaxed);
        debug!("Player movement resumed");
    }
}
