// src/placement/resolver.rs
//! Camera-relative surface probe: where the preview should sit this frame.

use bevy::prelude::*;

use super::core::{
    yaw_from_direction, CameraPose, LayerMask, PlacementTransform, SpatialQuery,
    FALLBACK_HALF_HEIGHT, MIN_HORIZONTAL_LEN,
};

/// Static probe tuning, copied out of the placement config.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeSettings {
    /// Horizontal distance in front of the camera.
    pub offset_distance: f32,
    /// How far above the camera the downward ray starts.
    pub start_height: f32,
    /// Max ray length; <= 0 never hits.
    pub max_distance: f32,
    pub layers: LayerMask,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub transform: PlacementTransform,
    pub hit: bool,
}

/// Remembers the last horizontal heading and the last resolved position so
/// degenerate headings and probe misses keep the previous values.
#[derive(Clone, Debug)]
pub struct SurfaceResolver {
    origin: Vec3,
    heading: Vec3,
    position: Option<Vec3>,
}

impl Default for SurfaceResolver {
    fn default() -> Self { Self::new(Vec3::ZERO) }
}

impl SurfaceResolver {
    /// `origin` is the position reported before anything was ever hit.
    pub fn new(origin: Vec3) -> Self {
        Self { origin, heading: Vec3::NEG_Z, position: None }
    }

    pub fn origin(&self) -> Vec3 { self.origin }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    /// Forget everything resolved so far.
    pub fn reset(&mut self) {
        self.heading = Vec3::NEG_Z;
        self.position = None;
    }

    pub fn heading(&self) -> Vec3 { self.heading }

    /// Last resolved transform for a camera pose, without probing.
    pub fn current(&mut self, camera: Option<&CameraPose>) -> PlacementTransform {
        if let Some(cam) = camera {
            self.update_heading(cam.forward);
        }
        PlacementTransform::new(self.position.unwrap_or(self.origin), yaw_from_direction(self.heading))
    }

    /// Probe the scene for this frame and update the cached transform.
    pub fn resolve(
        &mut self,
        camera: &CameraPose,
        settings: &ProbeSettings,
        query: &mut dyn SpatialQuery,
        half_height: Option<f32>,
    ) -> Resolution {
        // 1) Flatten the facing, keeping the last good one if degenerate
        let heading = self.update_heading(camera.forward);

        // 2) Probe origin in front of (and above) the camera
        let mut probe = camera.position + heading * settings.offset_distance;
        probe.y += settings.start_height;

        // 3) Cast down, 4) rest on the surface, 5) or keep the old spot
        let hit = if settings.max_distance > 0.0 {
            query.cast_downward(probe, settings.max_distance, settings.layers)
        } else {
            None
        };
        if let Some(h) = hit {
            let lift = half_height.unwrap_or(FALLBACK_HALF_HEIGHT);
            self.position = Some(h.point + Vec3::Y * lift);
        }

        // 6) Yaw always tracks the camera
        Resolution {
            transform: PlacementTransform::new(
                self.position.unwrap_or(self.origin),
                yaw_from_direction(heading),
            ),
            hit: hit.is_some(),
        }
    }

    fn update_heading(&mut self, forward: Vec3) -> Vec3 {
        let flat = Vec3::new(forward.x, 0.0, forward.z);
        if flat.length() > MIN_HORIZONTAL_LEN {
            self.heading = flat.normalize();
        }
        self.heading
    }
}
