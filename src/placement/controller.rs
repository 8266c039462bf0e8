// src/placement/controller.rs
//! The placement state machine. Owns the mode, the resolver, the presenter and
//! the control lock; everything scene-side goes through `SceneBackend`.

use bevy::prelude::*;

use super::config::PlacementConfig;
use super::core::{
    CameraPose, ControlLock, InstanceHandle, InstanceRole, PlacementMode, PlacementTransform,
    SceneBackend, SpatialQuery,
};
use super::error::PlacementError;
use super::presenter::PreviewPresenter;
use super::resolver::SurfaceResolver;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommitOutcome {
    Committed { handle: InstanceHandle, at: PlacementTransform },
    /// Verdict was invalid; placement stays active.
    Rejected,
    NotActive,
}

/// What one active frame produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub transform: PlacementTransform,
    pub hit: bool,
    pub valid: bool,
}

#[derive(Resource)]
pub struct PlacementController {
    mode: PlacementMode,
    config: Option<PlacementConfig>,
    resolver: SurfaceResolver,
    presenter: PreviewPresenter,
    lock: Box<dyn ControlLock>,
    lock_held: bool,
    anchor: Option<InstanceHandle>,
    last: Option<PlacementTransform>,
}

impl PlacementController {
    pub fn new(lock: impl ControlLock) -> Self {
        Self {
            mode: PlacementMode::Inactive,
            config: None,
            resolver: SurfaceResolver::default(),
            presenter: PreviewPresenter::default(),
            lock: Box::new(lock),
            lock_held: false,
            anchor: None,
            last: None,
        }
    }

    pub fn with_config(mut self, config: PlacementConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn configure(&mut self, config: PlacementConfig) {
        self.config = Some(config);
    }

    pub fn config(&self) -> Option<&PlacementConfig> { self.config.as_ref() }

    /// Parent for spawned instances; its position is the fallback placement spot.
    pub fn attach_anchor(&mut self, anchor: InstanceHandle, origin: Vec3) {
        self.anchor = Some(anchor);
        self.resolver.set_origin(origin);
    }

    pub fn anchor(&self) -> Option<InstanceHandle> { self.anchor }

    /// Where placement starts before anything was hit.
    pub fn anchor_origin(&self) -> Vec3 { self.resolver.origin() }

    /// The anchor moved in the world.
    pub fn set_anchor_origin(&mut self, origin: Vec3) {
        self.resolver.set_origin(origin);
    }

    pub fn detach_anchor(&mut self) {
        self.anchor = None;
    }

    pub fn mode(&self) -> PlacementMode { self.mode }
    pub fn is_active(&self) -> bool { self.mode == PlacementMode::Active }
    pub fn preview(&self) -> Option<InstanceHandle> { self.presenter.handle() }
    pub fn last_transform(&self) -> Option<PlacementTransform> { self.last }

    // ---------- Transitions ----------

    /// Inactive -> Active. No-op when already active.
    pub fn enter(&mut self, scene: &mut dyn SceneBackend, camera: Option<&CameraPose>) -> Result<(), PlacementError> {
        if self.is_active() {
            return Ok(());
        }
        let config = self.config.as_ref().ok_or(PlacementError::ConfigurationMissing("placement profile"))?;

        let at = self.resolver.current(camera);
        let preview = self.presenter.show(scene, &config.preview, &at, self.anchor)?;
        if !self.presenter.has_capability() {
            warn!("Placement: preview '{}' carries no validity check; it will never be placeable", config.preview.name());
        }

        self.lock.suspend();
        self.lock_held = true;
        self.last = Some(at);
        self.mode = PlacementMode::Active;
        info!("Placement: entered with preview {:?}", preview.0);
        Ok(())
    }

    /// Active -> Inactive. No-op when already inactive.
    pub fn exit(&mut self, scene: &mut dyn SceneBackend) {
        if self.teardown(scene) {
            info!("Placement: exited");
        }
    }

    /// Forced teardown from outside (anchor gone, game paused).
    pub fn cancel(&mut self, scene: &mut dyn SceneBackend) {
        if self.teardown(scene) {
            info!("Placement: cancelled");
        }
    }

    /// Commit at the last resolved transform if the capability says so right now.
    pub fn commit(&mut self, scene: &mut dyn SceneBackend) -> Result<CommitOutcome, PlacementError> {
        if !self.is_active() {
            return Ok(CommitOutcome::NotActive);
        }
        if !self.presenter.verdict() {
            debug!("Placement: commit ignored, spot is not valid");
            return Ok(CommitOutcome::Rejected);
        }
        let placeable = self
            .config
            .as_ref()
            .map(|c| c.placeable.clone())
            .ok_or(PlacementError::ConfigurationMissing("placement profile"))?;
        let Some(at) = self.last else {
            return Err(PlacementError::ConfigurationMissing("resolved placement transform"));
        };

        let spawned = scene.spawn(&placeable, &at, self.anchor, InstanceRole::Committed)?;
        info!("Placement: placed '{}' at {}", placeable.name(), at.position);
        self.teardown(scene);
        Ok(CommitOutcome::Committed { handle: spawned.handle, at })
    }

    /// The one teardown path. Returns whether anything was torn down.
    fn teardown(&mut self, scene: &mut dyn SceneBackend) -> bool {
        let was_active = self.mode == PlacementMode::Active;
        if self.lock_held {
            self.lock.resume();
            self.lock_held = false;
        }
        let removed = self.presenter.remove(scene);
        self.resolver.reset();
        self.last = None;
        self.mode = PlacementMode::Inactive;
        was_active || removed
    }

    // ---------- Per frame ----------

    /// Resolve, move, judge, tint. `Ok(None)` while inactive.
    pub fn tick(
        &mut self,
        scene: &mut dyn SceneBackend,
        query: &mut dyn SpatialQuery,
        camera: Option<&CameraPose>,
    ) -> Result<Option<FrameReport>, PlacementError> {
        if !self.is_active() {
            return Ok(None);
        }
        let camera = camera.ok_or(PlacementError::ConfigurationMissing("camera"))?;
        let config = self.config.as_ref().ok_or(PlacementError::ConfigurationMissing("placement profile"))?;
        if !self.presenter.is_present() {
            return Err(PlacementError::ConfigurationMissing("preview instance"));
        }

        let res = self.resolver.resolve(camera, &config.probe, query, self.presenter.half_height());
        self.last = Some(res.transform);
        self.presenter.sync(scene, &res.transform);

        let valid = self.presenter.verdict();
        self.presenter.restyle(scene, valid)?;

        Ok(Some(FrameReport { transform: res.transform, hit: res.hit, valid }))
    }
}

impl Drop for PlacementController {
    /// Never leave the player frozen, even if the controller goes away mid-placement.
    fn drop(&mut self) {
        if self.lock_held {
            self.lock.resume();
            self.lock_held = false;
        }
    }
}
