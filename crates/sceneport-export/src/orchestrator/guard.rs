//! Scoped transform reset
//!
//! [`TransformGuard`] zeroes an entity's transform on acquire and puts the
//! saved transform back on release. Dropping the guard without releasing
//! (early return, `?`, panic unwind) restores it as well.

use tracing::{error, trace};

use sceneport_core::{Result, Transform};
use sceneport_scene::SceneGraph;

/// Holds an entity at the identity transform until released or dropped
pub struct TransformGuard<'a> {
    scene: &'a mut dyn SceneGraph,
    entity: String,
    saved: Transform,
    released: bool,
}

impl<'a> TransformGuard<'a> {
    /// Save the current transform of `entity` and set it to identity
    pub fn acquire(scene: &'a mut dyn SceneGraph, entity: &str) -> Result<Self> {
        let saved = scene.transform(entity)?;

        if let Err(e) = scene.set_transform(entity, Transform::IDENTITY) {
            // A partial write must not survive a failed acquire
            let _ = scene.set_transform(entity, saved);
            return Err(e);
        }

        trace!(entity = %entity, "Transform reset to identity");
        Ok(Self {
            scene,
            entity: entity.to_string(),
            saved,
            released: false,
        })
    }

    /// Read access to the scene while the transform is reset
    pub fn scene(&self) -> &dyn SceneGraph {
        &*self.scene
    }

    /// Transform that will be restored
    pub fn saved(&self) -> Transform {
        self.saved
    }

    /// Restore the saved transform, reporting failure to the caller
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        let result = self.scene.set_transform(&self.entity, self.saved);
        if result.is_ok() {
            trace!(entity = %self.entity, "Transform restored");
        }
        result
    }
}

impl Drop for TransformGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.scene.set_transform(&self.entity, self.saved) {
            error!(entity = %self.entity, error = %e, "Failed to restore transform");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sceneport_core::Vec3;
    use sceneport_scene::{SceneEntity, SceneSnapshot};

    fn placed() -> Transform {
        Transform::new(Vec3::new(3.0, -1.5, 0.25), Vec3::new(0.1, 0.2, 0.3), Vec3::new(2.0, 2.0, 0.5))
    }

    fn scene() -> SceneSnapshot {
        SceneSnapshot::new("town.blend", vec![SceneEntity::mesh("car", "G").with_transform(placed())]).unwrap()
    }

    #[test]
    fn test_acquire_zeroes_and_release_restores() {
        let mut scene = scene();

        let guard = TransformGuard::acquire(&mut scene, "car").unwrap();
        assert!(guard.scene().transform("car").unwrap().is_identity());
        assert!(guard.saved().bits_eq(&placed()));
        guard.release().unwrap();

        assert!(scene.transform("car").unwrap().bits_eq(&placed()));
    }

    #[test]
    fn test_drop_restores() {
        let mut scene = scene();
        {
            let _guard = TransformGuard::acquire(&mut scene, "car").unwrap();
        }
        assert!(scene.transform("car").unwrap().bits_eq(&placed()));
    }

    #[test]
    fn test_panic_restores() {
        let mut scene = scene();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = TransformGuard::acquire(&mut scene, "car").unwrap();
            panic!("exporter crashed");
        }));

        assert!(result.is_err());
        assert!(scene.transform("car").unwrap().bits_eq(&placed()));
    }

    #[test]
    fn test_acquire_unknown_entity() {
        let mut scene = scene();
        let err = TransformGuard::acquire(&mut scene, "bus").err().unwrap();
        assert!(err.is_not_found());
    }
}
