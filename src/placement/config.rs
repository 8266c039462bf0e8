// src/placement/config.rs
//! Data-driven placement profile (`.placer.ron`) + the validated runtime config.

use bevy::asset::{io::Reader, AssetLoader, LoadContext};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::core::{LayerMask, PrefabRef};
use super::error::PlacementError;
use super::resolver::ProbeSettings;

// ---------- Public plugin to register asset+loader ----------

pub struct PlacementProfileAssetPlugin;

impl Plugin for PlacementProfileAssetPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<PlacementProfile>()
            .register_asset_loader(PlacementProfileLoader);
    }
}

// ---------- Prefab catalog (data form) ----------

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PrefabShape {
    Cuboid { half_extents: [f32; 3] },
    Sphere { radius: f32 },
}

impl PrefabShape {
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            PrefabShape::Cuboid { half_extents } => Vec3::from_array(half_extents),
            PrefabShape::Sphere { radius } => Vec3::splat(radius),
        }
    }
}

/// What a preview carries to judge its own spot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ValidityRule {
    /// Footprint must not overlap any blocker, grown by `margin` meters.
    Clearance {
        #[serde(default)]
        margin: f32,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrefabDef {
    /// Unique name used by `PrefabRef`.
    pub name: String,
    pub shape: PrefabShape,
    /// sRGBA.
    #[serde(default = "default_color")]
    pub color: [f32; 4],
    #[serde(default)]
    pub validity: Option<ValidityRule>,
}

fn default_color() -> [f32; 4] {
    [0.8, 0.8, 0.8, 1.0]
}

/// Valid/invalid tints for the preview material.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreviewColors {
    pub valid: [f32; 4],
    pub invalid: [f32; 4],
}

/// Edge fires once per press; level fires every frame the button is down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitTrigger {
    #[default]
    Pressed,
    Held,
}

// ---------- Profile asset ----------

#[derive(Asset, TypePath, Clone, Debug, Serialize, Deserialize)]
pub struct PlacementProfile {
    /// Prefab committed to the scene.
    pub placeable: String,
    /// Prefab used as the transient stand-in.
    pub preview: String,
    /// Layer indices the probe may land on.
    #[serde(default = "default_surface_layers")]
    pub surface_layers: Vec<u8>,
    #[serde(default)]
    pub preview_colors: Option<PreviewColors>,
    pub offset_distance: f32,
    pub probe_start_height: f32,
    pub probe_distance: f32,
    #[serde(default)]
    pub commit_trigger: CommitTrigger,
    pub prefabs: Vec<PrefabDef>,
}

fn default_surface_layers() -> Vec<u8> {
    vec![0]
}

// ---------- Runtime config ----------

/// Validated view of a profile. Static for the session.
#[derive(Clone, Debug)]
pub struct PlacementConfig {
    pub placeable: PrefabRef,
    pub preview: PrefabRef,
    pub probe: ProbeSettings,
    pub preview_colors: Option<PreviewColors>,
    pub commit_trigger: CommitTrigger,
    pub prefabs: HashMap<String, PrefabDef>,
}

impl PlacementConfig {
    pub fn from_profile(profile: &PlacementProfile) -> Result<Self, PlacementError> {
        let distances = [
            ("offset_distance", profile.offset_distance),
            ("probe_start_height", profile.probe_start_height),
            ("probe_distance", profile.probe_distance),
        ];
        for (name, v) in distances {
            if !v.is_finite() || v < 0.0 {
                return Err(PlacementError::InvalidConfiguration(format!("{name} must be >= 0, got {v}")));
            }
        }

        let mut prefabs = HashMap::with_capacity(profile.prefabs.len());
        for def in &profile.prefabs {
            if prefabs.insert(def.name.clone(), def.clone()).is_some() {
                return Err(PlacementError::InvalidConfiguration(format!("duplicate prefab '{}'", def.name)));
            }
        }
        for name in [&profile.placeable, &profile.preview] {
            if !prefabs.contains_key(name) {
                return Err(PlacementError::UnknownPrefab(name.clone()));
            }
        }

        Ok(Self {
            placeable: PrefabRef::new(profile.placeable.clone()),
            preview: PrefabRef::new(profile.preview.clone()),
            probe: ProbeSettings {
                offset_distance: profile.offset_distance,
                start_height: profile.probe_start_height,
                max_distance: profile.probe_distance,
                layers: LayerMask::from_layers(&profile.surface_layers),
            },
            preview_colors: profile.preview_colors,
            commit_trigger: profile.commit_trigger,
            prefabs,
        })
    }

    pub fn prefab(&self, prefab: &PrefabRef) -> Option<&PrefabDef> {
        self.prefabs.get(prefab.name())
    }
}

// ---------- Asset loader for `.placer.ron` ----------

#[derive(Default)]
pub struct PlacementProfileLoader;

impl AssetLoader for PlacementProfileLoader {
    type Asset = PlacementProfile;
    type Settings = ();
    type Error = PlacementProfileLoadError;

    fn extensions(&self) -> &[&str] {
        &["placer.ron"]
    }

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        parse_profile(&bytes)
    }
}

pub fn parse_profile(bytes: &[u8]) -> Result<PlacementProfile, PlacementProfileLoadError> {
    let profile: PlacementProfile =
        ron::de::from_bytes(bytes).map_err(|e| PlacementProfileLoadError::Ron(e.to_string()))?;

    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(profile.prefabs.len());
    for (i, def) in profile.prefabs.iter().enumerate() {
        if let Some(first) = seen.insert(def.name.as_str(), i) {
            return Err(PlacementProfileLoadError::DuplicateName {
                name: def.name.clone(),
                first,
                second: i,
            });
        }
    }
    Ok(profile)
}

// ---------- Loader errors ----------

#[derive(thiserror::Error, Debug)]
pub enum PlacementProfileLoadError {
    #[error("I/O while reading placement profile: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(String),
    #[error("Duplicate prefab name '{name}' (first idx {first}, second idx {second})")]
    DuplicateName { name: String, first: usize, second: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"(
        placeable: "crate",
        preview: "crate_ghost",
        surface_layers: [0, 2],
        preview_colors: Some((valid: (0.2, 0.9, 0.3, 0.5), invalid: (0.9, 0.2, 0.2, 0.5))),
        offset_distance: 4.0,
        probe_start_height: 5.0,
        probe_distance: 30.0,
        prefabs: [
            (name: "crate", shape: Cuboid(half_extents: (0.5, 0.5, 0.5))),
            (name: "crate_ghost", shape: Cuboid(half_extents: (0.5, 0.5, 0.5)), validity: Some(Clearance(margin: 0.05))),
        ],
    )"#;

    #[test]
    fn parses_and_validates_profile() {
        let profile = parse_profile(PROFILE.as_bytes()).unwrap();
        assert_eq!(profile.commit_trigger, CommitTrigger::Pressed);
        let cfg = PlacementConfig::from_profile(&profile).unwrap();
        assert_eq!(cfg.probe.layers, LayerMask(0b101));
        assert_eq!(cfg.probe.max_distance, 30.0);
        let ghost = cfg.prefab(&cfg.preview).unwrap();
        assert_eq!(ghost.validity, Some(ValidityRule::Clearance { margin: 0.05 }));
        assert_eq!(ghost.color, default_color());
    }

    #[test]
    fn duplicate_prefab_is_a_load_error() {
        let dup = PROFILE.replace("\"crate_ghost\", shape", "\"crate\", shape");
        assert!(matches!(
            parse_profile(dup.as_bytes()),
            Err(PlacementProfileLoadError::DuplicateName { first: 0, second: 1, .. })
        ));
    }

    #[test]
    fn unknown_prefab_is_rejected() {
        let mut profile = parse_profile(PROFILE.as_bytes()).unwrap();
        profile.placeable = "barrel".into();
        assert_eq!(
            PlacementConfig::from_profile(&profile).unwrap_err(),
            PlacementError::UnknownPrefab("barrel".into())
        );
    }

    #[test]
    fn negative_distance_is_rejected() {
        let mut profile = parse_profile(PROFILE.as_bytes()).unwrap();
        profile.probe_distance = -1.0;
        assert!(matches!(
            PlacementConfig::from_profile(&profile),
            Err(PlacementError::InvalidConfiguration(_))
        ));
    }
}
