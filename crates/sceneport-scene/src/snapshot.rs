//! In-memory scene loaded from a JSON dump
//!
//! A host-tool plugin writes the scene as
//! `{ "source": "<scene file>", "entities": [ ... ] }`. The snapshot keeps
//! a name index so transform updates are O(1).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use sceneport_core::{Error, Result, ResultExt, Transform};

use crate::entity::SceneEntity;
use crate::graph::SceneGraph;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotFile {
    source: PathBuf,
    #[serde(default)]
    entities: Vec<SceneEntity>,
}

/// Scene graph backed by an entity list
#[derive(Debug, Clone)]
pub struct SceneSnapshot {
    /// `source` as written in the snapshot file
    source: PathBuf,
    /// `source` resolved against the snapshot's directory
    resolved: PathBuf,
    entities: Vec<SceneEntity>,
    index: HashMap<String, usize>,
}

impl SceneSnapshot {
    /// Build a snapshot, rejecting duplicate entity names
    pub fn new(source: impl Into<PathBuf>, entities: Vec<SceneEntity>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entities.len());
        for (idx, entity) in entities.iter().enumerate() {
            if index.insert(entity.name.clone(), idx).is_some() {
                return Err(Error::NameCollision {
                    name: entity.name.clone(),
                });
            }
        }

        let source = source.into();
        Ok(Self {
            resolved: source.clone(),
            source,
            entities,
            index,
        })
    }

    /// Parse a snapshot from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        Self::new(file.source, file.entities)
    }

    /// Load a snapshot file.
    ///
    /// A relative `source` inside the file is resolved against the
    /// snapshot's directory. Saving writes it back unresolved.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let text = fs::read_to_string(path)
            .map_err(Error::from)
            .with_context(|| format!("reading snapshot {:?}", path))?;
        let mut snapshot = Self::from_json_str(&text)
            .with_context(|| format!("parsing snapshot {:?}", path))?;

        if snapshot.source.is_relative() {
            if let Some(dir) = path.parent() {
                snapshot.resolved = dir.join(&snapshot.source);
            }
        }

        debug!(path = %path.display(), entities = snapshot.entities.len(), "Loaded scene snapshot");
        Ok(snapshot)
    }

    /// Serialize back to pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        let file = SnapshotFile {
            source: self.source.clone(),
            entities: self.entities.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Write the snapshot to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json_string()?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::entity_not_found(name))
    }
}

impl SceneGraph for SceneSnapshot {
    fn source_path(&self) -> &Path {
        &self.resolved
    }

    fn entities(&self) -> &[SceneEntity] {
        &self.entities
    }

    fn entity(&self, name: &str) -> Option<&SceneEntity> {
        self.index.get(name).map(|&idx| &self.entities[idx])
    }

    fn set_transform(&mut self, name: &str, transform: Transform) -> Result<()> {
        let idx = self.position(name)?;
        self.entities[idx].transform = transform;
        Ok(())
    }

    fn rename_entity(&mut self, old: &str, new: &str) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if self.index.contains_key(new) {
            return Err(Error::NameCollision {
                name: new.to_string(),
            });
        }

        let idx = self.position(old)?;
        self.index.remove(old);
        self.index.insert(new.to_string(), idx);
        self.entities[idx].name = new.to_string();

        for entity in &mut self.entities {
            entity.relink(old, new);
        }

        Ok(())
    }
}
