// src/placement/scene.rs
//! Bevy side of the collaborator traits: mesh ray casts for the surface probe,
//! and a `SystemParam` that spawns/moves/tints placement instances through `Commands`.

use bevy::ecs::system::SystemParam;
use bevy::picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility};
use bevy::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::components::{PlacedObject, PlacementBlocker, PlacementPreview, PlacementSurface};
use super::config::{PlacementConfig, PrefabDef, ValidityRule};
use super::core::{
    InstanceHandle, InstanceRole, LayerMask, PlacementTransform, PrefabRef, PreviewStyle,
    SceneBackend, SpatialQuery, SpawnedInstance, SurfaceHit,
};
use super::error::PlacementError;
use super::validity::{BlockerIndex, FootprintClearance, SharedPose, ValidityCapability};

// ---------- Spatial query over surface meshes ----------

/// Downward ray casts against meshes tagged with `PlacementSurface`.
/// Untagged meshes (the preview included) are transparent to it.
#[derive(SystemParam)]
pub struct SurfaceRayCast<'w, 's> {
    ray_cast: MeshRayCast<'w, 's>,
    surfaces: Query<'w, 's, &'static PlacementSurface>,
}

impl SpatialQuery for SurfaceRayCast<'_, '_> {
    fn cast_downward(&mut self, origin: Vec3, max_distance: f32, layers: LayerMask) -> Option<SurfaceHit> {
        let surfaces = &self.surfaces;
        let filter = |entity: Entity| surfaces.get(entity).is_ok_and(|s| s.layers.any(layers));
        let settings = MeshRayCastSettings::default()
            .with_visibility(RayCastVisibility::Any)
            .with_filter(&filter);

        // hits come back nearest first
        let (_, hit) = self.ray_cast.cast_ray(Ray3d::new(origin, Dir3::NEG_Y), &settings).first()?;
        (hit.distance <= max_distance).then(|| SurfaceHit { point: hit.point, normal: hit.normal, distance: hit.distance })
    }
}

// ---------- Render handles per prefab ----------

pub struct PrefabAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
    pub half_extents: Vec3,
    pub validity: Option<ValidityRule>,
}

/// Meshes/materials built once the profile is adopted.
#[derive(Resource, Default)]
pub struct PreviewAssets {
    pub prefabs: HashMap<String, PrefabAssets>,
    pub valid: Option<Handle<StandardMaterial>>,
    pub invalid: Option<Handle<StandardMaterial>>,
}

fn srgba(c: [f32; 4]) -> Color {
    Color::srgba(c[0], c[1], c[2], c[3])
}

fn ghost_material(color: [f32; 4]) -> StandardMaterial {
    StandardMaterial {
        base_color: srgba(color),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    }
}

fn prefab_mesh(def: &PrefabDef) -> Mesh {
    let h = def.shape.half_extents();
    match def.shape {
        super::config::PrefabShape::Cuboid { .. } => Cuboid::new(h.x * 2.0, h.y * 2.0, h.z * 2.0).into(),
        super::config::PrefabShape::Sphere { radius } => Sphere::new(radius).into(),
    }
}

impl PreviewAssets {
    pub fn build(
        config: &PlacementConfig,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
    ) -> Self {
        let prefabs = config
            .prefabs
            .values()
            .map(|def| {
                let material = if def.name == config.preview.name() {
                    ghost_material(def.color)
                } else {
                    StandardMaterial { base_color: srgba(def.color), ..default() }
                };
                let assets = PrefabAssets {
                    mesh: meshes.add(prefab_mesh(def)),
                    material: materials.add(material),
                    half_extents: def.shape.half_extents(),
                    validity: def.validity,
                };
                (def.name.clone(), assets)
            })
            .collect();

        let (valid, invalid) = match config.preview_colors {
            Some(c) => (
                Some(materials.add(ghost_material(c.valid))),
                Some(materials.add(ghost_material(c.invalid))),
            ),
            None => (None, None),
        };
        Self { prefabs, valid, invalid }
    }
}

// ---------- Instance bookkeeping ----------

pub struct TrackedInstance {
    parent: Option<Entity>,
    pose: Option<SharedPose>,
}

/// Previews currently out in the world, with the pose their capability reads.
#[derive(Resource, Default)]
pub struct TrackedInstances(HashMap<Entity, TrackedInstance>);

impl TrackedInstances {
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

// ---------- SceneBackend over Commands ----------

#[derive(SystemParam)]
pub struct PlacementScene<'w, 's> {
    commands: Commands<'w, 's>,
    assets: Res<'w, PreviewAssets>,
    tracked: ResMut<'w, TrackedInstances>,
    blockers: Res<'w, BlockerIndex>,
    globals: Query<'w, 's, &'static GlobalTransform>,
}

impl PlacementScene<'_, '_> {
    /// World transform -> local to `parent` (or unchanged without one).
    fn local(&self, at: &PlacementTransform, parent: Option<Entity>) -> Option<Transform> {
        let world = at.to_transform();
        match parent {
            Some(p) => self.globals.get(p).ok().map(|gt| GlobalTransform::from(world).reparented_to(gt)),
            None => Some(world),
        }
    }
}

impl SceneBackend for PlacementScene<'_, '_> {
    fn spawn(
        &mut self,
        prefab: &PrefabRef,
        at: &PlacementTransform,
        parent: Option<InstanceHandle>,
        role: InstanceRole,
    ) -> Result<SpawnedInstance, PlacementError> {
        let Some(p) = self.assets.prefabs.get(prefab.name()) else {
            return Err(PlacementError::UnknownPrefab(prefab.name().to_string()));
        };
        let parent = parent.map(|h| h.0);
        let local = self.local(at, parent).ok_or_else(|| PlacementError::SpawnFailed {
            prefab: prefab.name().to_string(),
            reason: "anchor has no transform".into(),
        })?;

        let mut ec = self.commands.spawn((Mesh3d(p.mesh.clone()), MeshMaterial3d(p.material.clone()), local));
        if let Some(parent) = parent {
            ec.insert(ChildOf(parent));
        }
        match role {
            InstanceRole::Preview => {
                ec.insert((PlacementPreview, Name::new(format!("{} (preview)", prefab.name()))));
            }
            InstanceRole::Committed => {
                ec.insert((
                    PlacedObject { prefab: prefab.name().to_string() },
                    PlacementBlocker { half_extents: p.half_extents },
                    PlacementSurface { layers: LayerMask::PROPS },
                    Name::new(prefab.name().to_string()),
                ));
            }
        }
        let entity = ec.id();

        let mut validity: Option<Arc<dyn ValidityCapability>> = None;
        if role == InstanceRole::Preview {
            let pose = p.validity.map(|_| Arc::new(RwLock::new(*at)));
            if let (Some(ValidityRule::Clearance { margin }), Some(pose)) = (p.validity, &pose) {
                validity = Some(Arc::new(FootprintClearance {
                    half_extents: p.half_extents,
                    margin,
                    pose: Arc::clone(pose),
                    blockers: BlockerIndex::clone(&self.blockers),
                }));
            }
            self.tracked.0.insert(entity, TrackedInstance { parent, pose });
        }

        Ok(SpawnedInstance { handle: InstanceHandle(entity), validity, half_height: Some(p.half_extents.y) })
    }

    fn destroy(&mut self, handle: InstanceHandle) {
        self.tracked.0.remove(&handle.0);
        // the anchor cascade may already have taken it
        if let Ok(mut ec) = self.commands.get_entity(handle.0) {
            ec.try_despawn();
        }
    }

    fn set_transform(&mut self, handle: InstanceHandle, at: &PlacementTransform) {
        let Some(tracked) = self.tracked.0.get(&handle.0) else { return; };
        if let Some(pose) = &tracked.pose {
            match pose.write() {
                Ok(mut guard) => *guard = *at,
                Err(poisoned) => *poisoned.into_inner() = *at,
            }
        }
        let Some(local) = self.local(at, tracked.parent) else { return; };
        if let Ok(mut ec) = self.commands.get_entity(handle.0) {
            ec.try_insert(local);
        }
    }

    fn set_style(&mut self, handle: InstanceHandle, style: PreviewStyle) -> Result<(), PlacementError> {
        let material = match style {
            PreviewStyle::Valid => self.assets.valid.clone(),
            PreviewStyle::Invalid => self.assets.invalid.clone(),
        }
        .ok_or(PlacementError::PreviewMaterialMissing(style))?;
        if let Ok(mut ec) = self.commands.get_entity(handle.0) {
            ec.try_insert(MeshMaterial3d(material));
        }
        Ok(())
    }
}
