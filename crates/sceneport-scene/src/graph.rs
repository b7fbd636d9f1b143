//! The scene graph seam between the host authoring tool and the pipeline

use std::path::Path;

use sceneport_core::{Error, Result, Transform};

use crate::entity::SceneEntity;

/// Read access to a scene plus the few mutations the pipeline performs.
///
/// Implemented by [`crate::SceneSnapshot`] and by host-tool adapters.
/// `entities` must return entities in the tool's enumeration order; the
/// pipeline's ordering guarantees are defined relative to it.
pub trait SceneGraph {
    /// Path of the scene file the entities belong to
    fn source_path(&self) -> &Path;

    /// All entities in enumeration order
    fn entities(&self) -> &[SceneEntity];

    /// Look up an entity by its unique name
    fn entity(&self, name: &str) -> Option<&SceneEntity> {
        self.entities().iter().find(|e| e.name == name)
    }

    /// Current transform of `name`
    fn transform(&self, name: &str) -> Result<Transform> {
        self.entity(name)
            .map(|e| e.transform)
            .ok_or_else(|| Error::entity_not_found(name))
    }

    /// Overwrite the transform of `name`
    fn set_transform(&mut self, name: &str, transform: Transform) -> Result<()>;

    /// Rename an entity, updating links that point at it
    fn rename_entity(&mut self, old: &str, new: &str) -> Result<()>;
}

/// Scene base name: the source file name up to its first `.`
///
/// `levels/town.blend` gives `town`, `town.v2.blend` also gives `town`.
pub fn scene_base_name(source: &Path) -> Result<String> {
    let file_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let base = file_name.split('.').next().unwrap_or("");

    if base.is_empty() {
        return Err(Error::invalid_data(format!(
            "scene source path has no usable file name: {:?}",
            source
        )));
    }

    Ok(base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_scene_base_name() {
        assert_eq!(scene_base_name(Path::new("levels/town.blend")).unwrap(), "town");
        assert_eq!(scene_base_name(Path::new("town.v2.blend")).unwrap(), "town");
        assert_eq!(scene_base_name(Path::new("town")).unwrap(), "town");
    }

    #[test]
    fn test_scene_base_name_rejects_unsaved() {
        assert!(scene_base_name(&PathBuf::new()).is_err());
        assert!(scene_base_name(Path::new("levels/.blend")).is_err());
    }
}
