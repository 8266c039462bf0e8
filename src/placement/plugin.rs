//! Placement plugin wiring.
//! - Profile asset/loader + settings
//! - Controller bound to the player-control lock
//! - Per-frame pipeline: input -> transitions -> resolve/judge/tint
//! - Cancellation on pause and on anchor removal

use bevy::prelude::*;

use crate::actions::ActionState;
use crate::control::PlayerControl;
use crate::input::placement_input_system;
use crate::state::GameState;

use super::config::PlacementProfileAssetPlugin;
use super::controller::PlacementController;
use super::scene::{PreviewAssets, TrackedInstances};
use super::systems::{
    adopt_loaded_profile, apply_placement_actions, bind_placement_anchor, cancel_on_anchor_removed,
    cancel_on_pause, load_profile, refresh_blocker_index, tick_placement, PlacementProfileHandle,
    PlacementSettings,
};
use super::validity::BlockerIndex;

pub struct PlacementPlugin;

impl Plugin for PlacementPlugin {
    fn build(&self, app: &mut App) {
        let control = app.world_mut().get_resource_or_insert_with(PlayerControl::default).clone();

        app.add_plugins(PlacementProfileAssetPlugin)
            .init_resource::<PlacementSettings>()
            .init_resource::<PlacementProfileHandle>()
            .init_resource::<PreviewAssets>()
            .init_resource::<TrackedInstances>()
            .init_resource::<BlockerIndex>()
            .init_resource::<ActionState>()
            .insert_resource(PlacementController::new(control.lock()))
            .add_systems(Startup, load_profile)
            .add_systems(
                Update,
                (
                    adopt_loaded_profile,
                    bind_placement_anchor,
                    refresh_blocker_index,
                    placement_input_system,
                    apply_placement_actions,
                    tick_placement,
                )
                    .chain()
                    .run_if(in_state(GameState::Running)),
            )
            .add_systems(OnEnter(GameState::Paused), cancel_on_pause)
            .add_observer(cancel_on_anchor_removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::AssetPlugin;
    use bevy::render::primitives::Aabb;
    use bevy::state::app::StatesPlugin;
    use bevy::transform::TransformPlugin;

    use crate::placement::components::{PlacedObject, PlacementAnchor, PlacementPreview, PlacementSurface};
    use crate::placement::config::{parse_profile, PlacementProfile};
    use crate::placement::core::LayerMask;
    use crate::setup::MainCamera;

    const PROFILE: &str = r#"(
        placeable: "crate",
        preview: "crate_ghost",
        preview_colors: Some((valid: (0.0, 1.0, 0.0, 0.5), invalid: (1.0, 0.0, 0.0, 0.5))),
        offset_distance: 3.0,
        probe_start_height: 2.0,
        probe_distance: 20.0,
        prefabs: [
            (name: "crate", shape: Cuboid(half_extents: (0.5, 0.5, 0.5))),
            (name: "crate_ghost", shape: Cuboid(half_extents: (0.5, 0.5, 0.5)), validity: Some(Clearance(margin: 0.0))),
        ],
    )"#;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default(), StatesPlugin, TransformPlugin))
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .init_state::<GameState>()
            .add_plugins(PlacementPlugin);

        let profile = parse_profile(PROFILE.as_bytes()).unwrap();
        let handle = app.world_mut().resource_mut::<Assets<PlacementProfile>>().add(profile);
        app.insert_resource(PlacementProfileHandle(handle));

        let camera = Transform::from_xyz(0.0, 2.0, 0.0).looking_to(Vec3::new(0.0, -0.3, -1.0), Vec3::Y);
        app.world_mut().spawn((camera, GlobalTransform::from(camera), MainCamera));
        app.world_mut().spawn((PlacementAnchor, Transform::default()));
        // no render plugins here, so the ground carries its own bounds
        let ground = app.world_mut().resource_mut::<Assets<Mesh>>().add(Cuboid::new(40.0, 1.0, 40.0));
        app.world_mut().spawn((
            Mesh3d(ground),
            Transform::from_xyz(0.0, -0.5, 0.0),
            Aabb::from_min_max(Vec3::new(-20.0, -0.5, -20.0), Vec3::new(20.0, 0.5, 20.0)),
            PlacementSurface { layers: LayerMask::GROUND },
        ));

        // profile adoption + anchor binding
        app.update();
        app.update();
        app
    }

    fn tap_key(app: &mut App, key: KeyCode) {
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().press(key);
        app.update();
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.release(key);
        keys.clear();
    }

    fn click(app: &mut App) {
        app.world_mut().resource_mut::<ButtonInput<MouseButton>>().press(MouseButton::Left);
        app.update();
        let mut buttons = app.world_mut().resource_mut::<ButtonInput<MouseButton>>();
        buttons.release(MouseButton::Left);
        buttons.clear();
    }

    fn count<C: Component>(app: &mut App) -> usize {
        app.world_mut().query_filtered::<Entity, With<C>>().iter(app.world()).count()
    }

    fn active(app: &App) -> bool {
        app.world().resource::<PlacementController>().is_active()
    }

    fn control_enabled(app: &App) -> bool {
        app.world().resource::<PlayerControl>().is_enabled()
    }

    #[test]
    fn enter_place_and_block_second_placement() {
        let mut app = app();
        assert!(app.world().resource::<PlacementController>().config().is_some());

        tap_key(&mut app, KeyCode::Digit1);
        assert!(active(&app));
        assert!(!control_enabled(&app));
        assert_eq!(count::<PlacementPreview>(&mut app), 1);

        app.update();
        let y = app
            .world_mut()
            .query_filtered::<&Transform, With<PlacementPreview>>()
            .single(app.world())
            .map(|t| t.translation.y)
            .unwrap();
        assert!((y - 0.5).abs() < 1e-4);

        click(&mut app);
        assert!(!active(&app));
        assert!(control_enabled(&app));
        assert_eq!(count::<PlacementPreview>(&mut app), 0);
        assert_eq!(count::<PlacedObject>(&mut app), 1);

        // same spot again: the crate now blocks it
        tap_key(&mut app, KeyCode::Digit1);
        app.update();
        click(&mut app);
        assert!(active(&app));
        assert_eq!(count::<PlacedObject>(&mut app), 1);

        tap_key(&mut app, KeyCode::Digit2);
        assert!(!active(&app));
        assert!(control_enabled(&app));
        assert_eq!(count::<PlacementPreview>(&mut app), 0);
    }

    #[test]
    fn removing_anchor_cancels_placement() {
        let mut app = app();
        tap_key(&mut app, KeyCode::Digit1);
        assert!(active(&app));

        let anchor = app
            .world_mut()
            .query_filtered::<Entity, With<PlacementAnchor>>()
            .single(app.world())
            .unwrap();
        app.world_mut().despawn(anchor);
        app.update();

        assert!(!active(&app));
        assert!(control_enabled(&app));
        assert_eq!(count::<PlacementPreview>(&mut app), 0);
        assert!(app.world().resource::<TrackedInstances>().is_empty());
    }

    #[test]
    fn pausing_cancels_placement() {
        let mut app = app();
        tap_key(&mut app, KeyCode::Digit1);
        assert!(active(&app));

        app.world_mut().resource_mut::<NextState<GameState>>().set(GameState::Paused);
        app.update();

        assert!(!active(&app));
        assert!(control_enabled(&app));
        assert_eq!(count::<PlacementPreview>(&mut app), 0);
    }
}
