// src/placement/systems.rs

use bevy::prelude::*;

use crate::actions::{ActionState, PlayerAction};
use crate::setup::MainCamera;

use super::components::{PlacementAnchor, PlacementBlocker};
use super::config::{PlacementConfig, PlacementProfile};
use super::controller::{CommitOutcome, PlacementController};
use super::core::{CameraPose, InstanceHandle};
use super::error::PlacementError;
use super::scene::{PlacementScene, PreviewAssets, SurfaceRayCast};
use super::validity::{BlockerBox, BlockerIndex};

/// Where the placement profile lives.
#[derive(Resource, Clone)]
pub struct PlacementSettings {
    pub profile_path: String,
}
impl Default for PlacementSettings {
    fn default() -> Self {
        Self { profile_path: "placement/default.placer.ron".to_string() }
    }
}

/// Handle to the loaded PlacementProfile asset.
#[derive(Resource, Default)]
pub struct PlacementProfileHandle(pub Handle<PlacementProfile>);

/// Startup: request loading the profile, store handle.
pub fn load_profile(
    mut handle_res: ResMut<PlacementProfileHandle>,
    settings: Res<PlacementSettings>,
    assets: Res<AssetServer>,
) {
    if handle_res.0.is_strong() { return; }
    handle_res.0 = assets.load(settings.profile_path.as_str());
    info!("Placement: loading profile from '{}'", settings.profile_path);
}

/// Update: once the profile is available, validate it and hand it to the controller.
pub fn adopt_loaded_profile(
    handle_res: Res<PlacementProfileHandle>,
    profiles: Res<Assets<PlacementProfile>>,
    mut controller: ResMut<PlacementController>,
    mut preview_assets: ResMut<PreviewAssets>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut done: Local<bool>,
) {
    if *done { return; }
    let Some(profile) = profiles.get(&handle_res.0) else { return; };
    *done = true;

    match PlacementConfig::from_profile(profile) {
        Ok(config) => {
            *preview_assets = PreviewAssets::build(&config, &mut meshes, &mut materials);
            info!(
                "Placement: profile ready (placeable '{}', preview '{}', {} prefabs)",
                config.placeable.name(),
                config.preview.name(),
                config.prefabs.len()
            );
            controller.configure(config);
        }
        Err(e) => error!("Placement: rejected profile: {e}"),
    }
}

/// Update: the first anchor found becomes the placement parent; its world
/// position is kept as the fallback placement spot.
pub fn bind_placement_anchor(
    mut controller: ResMut<PlacementController>,
    anchors: Query<(Entity, &GlobalTransform, Ref<PlacementAnchor>)>,
) {
    for (entity, gt, anchor) in &anchors {
        match controller.anchor() {
            None => {
                controller.attach_anchor(InstanceHandle(entity), gt.translation());
                debug!("Placement: anchored to {entity:?}");
            }
            Some(bound) if bound.0 == entity => {
                if controller.anchor_origin() != gt.translation() {
                    controller.set_anchor_origin(gt.translation());
                }
            }
            Some(_) if anchor.is_added() => warn!("Placement: ignoring extra anchor {entity:?}"),
            Some(_) => {}
        }
    }
}

/// World box a blocker occupies, following its rotation.
fn blocker_box(gt: &GlobalTransform, blocker: &PlacementBlocker) -> BlockerBox {
    let (_, rotation, translation) = gt.to_scale_rotation_translation();
    BlockerBox::oriented(translation, blocker.half_extents, rotation)
}

/// Rebuild blocker boxes before anything judges validity this frame.
pub fn refresh_blocker_index(
    index: Res<BlockerIndex>,
    blockers: Query<(&GlobalTransform, &PlacementBlocker)>,
) {
    index.replace(blockers.iter().map(|(gt, b)| blocker_box(gt, b)).collect());
}

/// Enter, else exit, else commit; at most one transition per frame.
pub fn apply_placement_actions(
    actions: Res<ActionState>,
    mut controller: ResMut<PlacementController>,
    mut scene: PlacementScene,
    camera: Query<&GlobalTransform, With<MainCamera>>,
) {
    if actions.pressed(PlayerAction::EnterPlacement) {
        let pose = camera.single().ok().map(CameraPose::from_global);
        if let Err(e) = controller.enter(&mut scene, pose.as_ref()) {
            warn!("Placement: could not enter placement mode: {e}");
        }
    } else if actions.pressed(PlayerAction::ExitPlacement) {
        controller.exit(&mut scene);
    } else if actions.pressed(PlayerAction::CommitPlacement) {
        match controller.commit(&mut scene) {
            Ok(CommitOutcome::Committed { handle, .. }) => debug!("Placement: committed {:?}", handle.0),
            Ok(CommitOutcome::Rejected | CommitOutcome::NotActive) => {}
            Err(e) => warn!("Placement: commit failed: {e}"),
        }
    }
}

/// Per frame while active: resolve -> move -> judge -> tint.
pub fn tick_placement(
    mut controller: ResMut<PlacementController>,
    mut scene: PlacementScene,
    camera: Query<&GlobalTransform, With<MainCamera>>,
    mut surfaces: SurfaceRayCast,
) {
    if !controller.is_active() { return; }
    let pose = camera.single().ok().map(CameraPose::from_global);

    match controller.tick(&mut scene, &mut surfaces, pose.as_ref()) {
        Ok(_) => {}
        Err(e @ PlacementError::PreviewMaterialMissing(_)) => {
            warn_once!("Placement: {e}");
        }
        Err(e) => warn!("Placement: frame skipped: {e}"),
    }
}

/// Pausing drops out of placement so control is never left suspended.
pub fn cancel_on_pause(mut controller: ResMut<PlacementController>, mut scene: PlacementScene) {
    controller.cancel(&mut scene);
}

/// Observer: the anchor is going away, so its preview is too.
pub fn cancel_on_anchor_removed(
    trigger: Trigger<OnRemove, PlacementAnchor>,
    mut controller: ResMut<PlacementController>,
    mut scene: PlacementScene,
) {
    if controller.anchor() != Some(InstanceHandle(trigger.target())) {
        return;
    }
    controller.cancel(&mut scene);
    controller.detach_anchor();
}
