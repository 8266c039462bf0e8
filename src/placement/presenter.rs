// src/placement/presenter.rs
//! Owns the single preview instance: spawn, follow, tint, despawn.

use std::sync::Arc;

use super::core::{
    InstanceHandle, InstanceRole, PlacementTransform, PrefabRef, PreviewStyle, SceneBackend,
};
use super::error::PlacementError;
use super::validity::{self, ValidityCapability};

struct PreviewInstance {
    handle: InstanceHandle,
    validity: Option<Arc<dyn ValidityCapability>>,
    half_height: Option<f32>,
    style: Option<PreviewStyle>,
}

#[derive(Default)]
pub struct PreviewPresenter {
    preview: Option<PreviewInstance>,
}

impl PreviewPresenter {
    pub fn is_present(&self) -> bool { self.preview.is_some() }

    pub fn handle(&self) -> Option<InstanceHandle> {
        self.preview.as_ref().map(|p| p.handle)
    }

    pub fn half_height(&self) -> Option<f32> {
        self.preview.as_ref().and_then(|p| p.half_height)
    }

    pub fn has_capability(&self) -> bool {
        self.preview.as_ref().is_some_and(|p| p.validity.is_some())
    }

    /// Spawn the preview. Refuses if one is already out.
    pub fn show(
        &mut self,
        scene: &mut dyn SceneBackend,
        prefab: &PrefabRef,
        at: &PlacementTransform,
        parent: Option<InstanceHandle>,
    ) -> Result<InstanceHandle, PlacementError> {
        if self.preview.is_some() {
            return Err(PlacementError::PreviewAlreadyPresent);
        }
        let spawned = scene.spawn(prefab, at, parent, InstanceRole::Preview)?;
        let handle = spawned.handle;
        self.preview = Some(PreviewInstance {
            handle,
            validity: spawned.validity,
            half_height: spawned.half_height,
            style: None,
        });
        Ok(handle)
    }

    /// Move the preview; false when there is nothing to move.
    pub fn sync(&self, scene: &mut dyn SceneBackend, at: &PlacementTransform) -> bool {
        match &self.preview {
            Some(p) => {
                scene.set_transform(p.handle, at);
                true
            }
            None => false,
        }
    }

    /// Fresh verdict from the attached capability; fail-closed.
    pub fn verdict(&self) -> bool {
        self.preview
            .as_ref()
            .is_some_and(|p| validity::evaluate(p.validity.as_deref()))
    }

    /// Tint for the verdict. Only touches the scene when the style changes.
    pub fn restyle(&mut self, scene: &mut dyn SceneBackend, valid: bool) -> Result<(), PlacementError> {
        let Some(p) = self.preview.as_mut() else { return Ok(()); };
        let style = PreviewStyle::from_verdict(valid);
        if p.style == Some(style) {
            return Ok(());
        }
        scene.set_style(p.handle, style)?;
        p.style = Some(style);
        Ok(())
    }

    /// Despawn the preview if there is one. Returns whether anything was removed.
    pub fn remove(&mut self, scene: &mut dyn SceneBackend) -> bool {
        match self.preview.take() {
            Some(p) => {
                scene.destroy(p.handle);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::testing::{FakeScene, Fixed};

    fn at() -> PlacementTransform { PlacementTransform::default() }

    #[test]
    fn second_show_is_rejected() {
        let mut scene = FakeScene::default();
        let mut p = PreviewPresenter::default();
        p.show(&mut scene, &PrefabRef::new("ghost"), &at(), None).unwrap();
        let again = p.show(&mut scene, &PrefabRef::new("ghost"), &at(), None);
        assert_eq!(again, Err(PlacementError::PreviewAlreadyPresent));
        assert_eq!(scene.live_previews(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut scene = FakeScene::default();
        let mut p = PreviewPresenter::default();
        p.show(&mut scene, &PrefabRef::new("ghost"), &at(), None).unwrap();
        assert!(p.remove(&mut scene));
        assert!(!p.remove(&mut scene));
        assert_eq!(scene.destroyed.len(), 1);
        assert_eq!(scene.live_previews(), 0);
    }

    #[test]
    fn missing_capability_reads_invalid() {
        let mut scene = FakeScene::default();
        scene.validity = None;
        let mut p = PreviewPresenter::default();
        p.show(&mut scene, &PrefabRef::new("ghost"), &at(), None).unwrap();
        assert!(!p.has_capability());
        assert!(!p.verdict());
    }

    #[test]
    fn restyle_only_on_change() {
        let mut scene = FakeScene::default();
        scene.validity = Some(Fixed::new(true));
        let mut p = PreviewPresenter::default();
        p.show(&mut scene, &PrefabRef::new("ghost"), &at(), None).unwrap();
        p.restyle(&mut scene, true).unwrap();
        p.restyle(&mut scene, true).unwrap();
        p.restyle(&mut scene, false).unwrap();
        assert_eq!(scene.styles, vec![PreviewStyle::Valid, PreviewStyle::Invalid]);
    }

    #[test]
    fn sync_without_preview_is_noop() {
        let mut scene = FakeScene::default();
        let p = PreviewPresenter::default();
        assert!(!p.sync(&mut scene, &at()));
        assert!(scene.moves.is_empty());
    }
}
