//! Native exporter seam
//!
//! The host tool's own exporter writes the intermediate geometry file.
//! [`CommandExporter`] drives it as an external program.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use sceneport_scene::{SceneGraph, SceneSnapshot};

use crate::command::{path_arg, CommandError, CommandSpec};
use crate::dedup::ExportTarget;

/// Blender-side helper run by the default exporter command
pub const EXPORT_SCRIPT: &str = include_str!("../../assets/export_selection.py");

/// File name the helper is written under, next to the intermediate
pub const EXPORT_SCRIPT_NAME: &str = "export_selection.py";

/// Why a native export failed
#[derive(Error, Debug)]
pub enum ExportFailure {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Exporter finished but did not write {0:?}")]
    MissingOutput(PathBuf),

    #[error("Scene error: {0}")]
    Scene(#[from] sceneport_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// One export invocation
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub target: &'a ExportTarget,
    /// Entities selected together with the target (rig, modifier links)
    pub linked: &'a [String],
    /// Intermediate file to produce
    pub output: &'a Path,
}

/// Host export operation: entity selection -> intermediate file
pub trait NativeExporter {
    /// Extension of the produced intermediate files, without the dot
    fn extension(&self) -> &str;

    /// Companion files written next to the intermediate (e.g. `mtl`)
    fn companion_extensions(&self) -> &[String] {
        &[]
    }

    /// Export the request's selection. The target's transform is already
    /// reset to identity in `scene`.
    fn export(&self, scene: &dyn SceneGraph, request: &ExportRequest<'_>) -> Result<(), ExportFailure>;
}

/// Runs an external exporter per target.
///
/// Placeholders: `{scene}` (scene file), `{object}` (target entity),
/// `{linked}` (comma separated linked entities), `{output}`, `{selection}`
/// and `{script}`. When `{selection}` is used, the selected entities are
/// written as a snapshot JSON file next to the output before the command
/// runs. This is the only way the exporter sees the zeroed transform of
/// the target. `{script}` expands to [`EXPORT_SCRIPT`] written next to the
/// output. Both files are removed afterwards.
pub struct CommandExporter {
    command: CommandSpec,
    extension: String,
    companions: Vec<String>,
}

impl CommandExporter {
    pub fn new(command: CommandSpec, extension: impl Into<String>) -> Self {
        Self {
            command,
            extension: extension.into(),
            companions: Vec::new(),
        }
    }

    pub fn with_companions(mut self, companions: Vec<String>) -> Self {
        self.companions = companions;
        self
    }

    fn write_selection(&self, scene: &dyn SceneGraph, request: &ExportRequest<'_>, path: &Path) -> Result<(), ExportFailure> {
        let mut selected = Vec::with_capacity(request.linked.len() + 1);
        for name in std::iter::once(&request.target.entity).chain(request.linked.iter()) {
            let entity = scene
                .entity(name)
                .ok_or_else(|| sceneport_core::Error::entity_not_found(name.as_str()))?;
            selected.push(entity.clone());
        }

        let selection = SceneSnapshot::new(scene.source_path(), selected)?;
        fs::write(path, selection.to_json_string()?)?;
        Ok(())
    }
}

impl NativeExporter for CommandExporter {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn companion_extensions(&self) -> &[String] {
        &self.companions
    }

    fn export(&self, scene: &dyn SceneGraph, request: &ExportRequest<'_>) -> Result<(), ExportFailure> {
        let selection_path = request.output.with_extension("selection.json");
        let script_path = request.output.with_file_name(EXPORT_SCRIPT_NAME);

        let mut scratch = Vec::new();
        if self.command.references("selection") {
            scratch.push(&selection_path);
            self.write_selection(scene, request, &selection_path)?;
        }
        if self.command.references("script") {
            scratch.push(&script_path);
            if let Err(e) = fs::write(&script_path, EXPORT_SCRIPT) {
                remove_scratch(&scratch);
                return Err(e.into());
            }
        }

        let vars = [
            ("scene", path_arg(scene.source_path())),
            ("object", request.target.entity.clone()),
            ("linked", request.linked.join(",")),
            ("output", path_arg(request.output)),
            ("selection", path_arg(&selection_path)),
            ("script", path_arg(&script_path)),
        ];
        let result = self.command.run(&vars);
        remove_scratch(&scratch);
        result?;

        if !request.output.exists() {
            return Err(ExportFailure::MissingOutput(request.output.to_path_buf()));
        }

        debug!(entity = %request.target.entity, output = %request.output.display(), "Native export complete");
        Ok(())
    }
}

fn remove_scratch(paths: &[&PathBuf]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "Failed to remove exporter scratch file");
        }
    }
}
