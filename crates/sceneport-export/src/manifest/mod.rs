//! JSON manifest writer
//!
//! Writes one `<scene>_<category>.json` array per category. Every record is
//! written, duplicates included: this is the as-placed manifest the engine
//! uses to position instances.
//!
//! Each file is serialized in memory, written to a temporary file in the
//! target directory and renamed into place, so a failed write never leaves
//! a truncated manifest behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{error, info};

use crate::classify::ClassifiedScene;
use crate::error::PipelineResult;
use crate::records::{Category, Record};

/// Manifest output options
#[derive(Debug, Clone)]
pub struct ManifestOptions {
    /// Use pretty-print formatting
    pub pretty: bool,

    /// Write a manifest even when a category has no records
    pub write_empty: bool,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            write_empty: true,
        }
    }
}

/// A category whose manifest could not be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFailure {
    pub category: Category,
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of writing all manifests
#[derive(Debug, Clone, Default)]
pub struct ManifestReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<ManifestFailure>,
}

impl ManifestReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// JSON manifest writer
pub struct ManifestWriter {
    options: ManifestOptions,
}

impl ManifestWriter {
    /// Create new writer with default options
    pub fn new() -> Self {
        Self {
            options: ManifestOptions::default(),
        }
    }

    /// Create writer with custom options
    pub fn with_options(options: ManifestOptions) -> Self {
        Self { options }
    }

    /// Write every category's manifest into `dir`.
    ///
    /// All categories are attempted even if one fails.
    pub fn write_all(&self, scene: &ClassifiedScene, scene_name: &str, dir: &Path) -> ManifestReport {
        let mut report = ManifestReport::default();

        for category in Category::ALL {
            let records = scene.records(category);
            if records.is_empty() && !self.options.write_empty {
                continue;
            }

            let path = dir.join(category.manifest_file_name(scene_name));
            match self.write_category(records, &path) {
                Ok(()) => {
                    info!(category = %category, records = records.len(), path = %path.display(), "Wrote manifest");
                    report.written.push(path);
                }
                Err(e) => {
                    error!(category = %category, path = %path.display(), error = %e, "Failed to write manifest");
                    report.failures.push(ManifestFailure {
                        category,
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Atomically write one manifest file
    pub fn write_category(&self, records: &[Record], path: &Path) -> PipelineResult<()> {
        let bytes = self.render(records)?;

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;

        Ok(())
    }

    /// Serialize records to the manifest byte layout
    pub fn render(&self, records: &[Record]) -> PipelineResult<Vec<u8>> {
        let mut bytes = if self.options.pretty {
            serde_json::to_vec_pretty(records)?
        } else {
            serde_json::to_vec(records)?
        };
        bytes.push(b'\n');
        Ok(bytes)
    }
}

impl Default for ManifestWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify_scene, ClassifyContext};
    use sceneport_scene::{EntityKind, LightData, LightVariant, SceneEntity, SceneSnapshot};

    fn classified() -> ClassifiedScene {
        let scene = SceneSnapshot::new(
            "town.blend",
            vec![
                SceneEntity::mesh("car", "CarMesh"),
                SceneEntity::mesh("car.001", "CarMesh"),
                SceneEntity::new("lamp", EntityKind::Light(LightData::new(LightVariant::Point)))
                    .with_visible(false),
                SceneEntity::new("spawn", EntityKind::Empty).with_property("pfx", "smoke.pfx"),
            ],
        )
        .unwrap();
        classify_scene(&scene, &ClassifyContext::new("town"))
    }

    fn read_array(path: &Path) -> Vec<serde_json::Value> {
        let text = fs::read_to_string(path).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_writes_one_file_per_category() {
        let dir = tempfile::tempdir().unwrap();
        let report = ManifestWriter::new().write_all(&classified(), "town", dir.path());

        assert!(report.is_complete());
        assert_eq!(report.written.len(), 4);

        let models = read_array(&dir.path().join("town_model.json"));
        assert_eq!(models.len(), 2);
        assert_eq!(models[0]["model_file_name"], "town_car");

        let lights = read_array(&dir.path().join("town_light.json"));
        assert!(lights.is_empty());

        let empties = read_array(&dir.path().join("town_empty.json"));
        assert_eq!(empties[0]["custom_properties"]["pfx"], "smoke.pfx");
    }

    #[test]
    fn test_skip_empty_categories() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ManifestWriter::with_options(ManifestOptions {
            pretty: false,
            write_empty: false,
        });

        let report = writer.write_all(&classified(), "town", dir.path());

        assert_eq!(report.written.len(), 2);
        assert!(!dir.path().join("town_camera.json").exists());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        ManifestWriter::new().write_all(&classified(), "town", dir.path());

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();

        assert_eq!(
            names,
            vec!["town_camera.json", "town_empty.json", "town_light.json", "town_model.json"]
        );
    }

    #[test]
    fn test_failure_does_not_block_other_categories() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the light manifest path makes that rename fail
        fs::create_dir(dir.path().join("town_light.json")).unwrap();

        let report = ManifestWriter::new().write_all(&classified(), "town", dir.path());

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].category, Category::Light);
        assert_eq!(report.written.len(), 3);
        assert!(dir.path().join("town_model.json").exists());
    }

    #[test]
    fn test_output_is_deterministic() {
        let writer = ManifestWriter::new();
        let scene = classified();

        let first = writer.render(scene.records(Category::Model)).unwrap();
        let second = writer.render(classified().records(Category::Model)).unwrap();

        assert_eq!(first, second);
    }
}
