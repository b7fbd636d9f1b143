//! Native export orchestration
//!
//! For every export target: reset its transform, run the native exporter
//! on it and its linked entities, restore the transform. Runs strictly
//! sequentially since every export mutates the shared scene.

mod exporter;
mod guard;

pub use exporter::{CommandExporter, ExportFailure, ExportRequest, NativeExporter};
pub use guard::TransformGuard;

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use sceneport_scene::SceneGraph;

use crate::dedup::ExportTarget;
use crate::error::{PipelineError, PipelineResult};

/// Intermediate file produced by the native exporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateFile {
    pub target: ExportTarget,
    pub path: PathBuf,
    /// Side files written with it (material libraries)
    pub companions: Vec<PathBuf>,
}

impl IntermediateFile {
    /// Delete the intermediate and its companions, ignoring missing files
    pub fn remove(&self) {
        for path in std::iter::once(&self.path).chain(self.companions.iter()) {
            match fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "Removed intermediate"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove intermediate"),
            }
        }
    }
}

/// Drives the native exporter over the deduplicated targets
pub struct ExportOrchestrator<'e> {
    exporter: &'e dyn NativeExporter,
    scratch_dir: PathBuf,
}

impl<'e> ExportOrchestrator<'e> {
    pub fn new(exporter: &'e dyn NativeExporter, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            exporter,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Intermediate path for `target`: `<scratch>/<model file name>.<ext>`
    pub fn intermediate_path(&self, target: &ExportTarget) -> PathBuf {
        self.scratch_dir
            .join(format!("{}.{}", target.model_file_name, self.exporter.extension()))
    }

    /// Export every target in order.
    ///
    /// Any failure aborts the run. Every target's transform is restored
    /// before this returns, and intermediates from this run are removed.
    pub fn run(&self, scene: &mut dyn SceneGraph, targets: &[ExportTarget]) -> PipelineResult<Vec<IntermediateFile>> {
        fs::create_dir_all(&self.scratch_dir)?;

        let mut produced: Vec<IntermediateFile> = Vec::with_capacity(targets.len());
        for target in targets {
            match self.export_one(scene, target) {
                Ok(file) => produced.push(file),
                Err(e) => {
                    for file in &produced {
                        file.remove();
                    }
                    return Err(e);
                }
            }
        }

        info!(count = produced.len(), dir = %self.scratch_dir.display(), "Native export finished");
        Ok(produced)
    }

    fn export_one(&self, scene: &mut dyn SceneGraph, target: &ExportTarget) -> PipelineResult<IntermediateFile> {
        let path = self.intermediate_path(target);
        let file = IntermediateFile {
            target: target.clone(),
            companions: self
                .exporter
                .companion_extensions()
                .iter()
                .map(|ext| path.with_extension(ext))
                .collect(),
            path,
        };

        debug!(entity = %target.entity, output = %file.path.display(), "Exporting");

        let guard = TransformGuard::acquire(scene, &target.entity)?;
        let request = ExportRequest {
            target,
            linked: &target.linked,
            output: &file.path,
        };
        let exported = self.exporter.export(guard.scene(), &request);
        let restored = guard.release();

        if let Err(source) = exported {
            file.remove();
            return Err(PipelineError::NativeExport {
                entity: target.entity.clone(),
                source,
            });
        }
        if let Err(source) = restored {
            file.remove();
            return Err(PipelineError::TransformRestore {
                entity: target.entity.clone(),
                source,
            });
        }

        Ok(file)
    }
}
