//! End-to-end export run
//!
//! ```text
//! classify -> manifests -> index -> conflicts? -> export -> convert
//!                 |                     |
//!              any failed           abort, nothing exported
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use sceneport_core::logging::instrument_stage;
use sceneport_scene::{scene_base_name, SceneGraph};

use crate::classify::{classify_scene, ClassifiedScene, ClassifyContext};
use crate::config::ExportConfig;
use crate::convert::{AssetConverter, ConversionDriver, ConversionOptions};
use crate::dedup::{ExportTarget, ModelMeshIndex};
use crate::error::{PipelineError, PipelineResult};
use crate::manifest::{ManifestOptions, ManifestWriter};
use crate::orchestrator::{ExportOrchestrator, NativeExporter};

/// Resolved output directories for one scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub root: PathBuf,
    pub manifest_dir: PathBuf,
    pub asset_dir: PathBuf,
    pub scratch_dir: PathBuf,
}

impl OutputLayout {
    /// Output root from config, falling back to the scene file's directory
    pub fn resolve(config: &ExportConfig, source: &Path) -> Self {
        let root = match &config.output_root {
            Some(root) => root.clone(),
            None => match source.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        };

        Self {
            manifest_dir: root.join(&config.manifest_dir),
            asset_dir: root.join(&config.asset_dir),
            scratch_dir: root.join(&config.scratch_dir),
            root,
        }
    }
}

/// Classification and indexing result, before anything is written
#[derive(Debug, Clone)]
pub struct Plan {
    pub scene_name: String,
    pub classified: ClassifiedScene,
    pub index: ModelMeshIndex,
}

impl Plan {
    pub fn has_conflicts(&self) -> bool {
        self.index.has_conflicts()
    }

    pub fn targets(&self) -> Vec<ExportTarget> {
        self.index.export_targets()
    }
}

/// Per-asset conversion failure as reported to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAsset {
    pub entity: String,
    pub intermediate: PathBuf,
    pub message: String,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub scene_name: String,
    pub manifests: Vec<PathBuf>,
    pub record_count: usize,
    pub skipped: usize,
    /// Model file names selected for export
    pub targets: Vec<String>,
    pub assets: Vec<PathBuf>,
    pub conversion_failures: Vec<FailedAsset>,
    pub dry_run: bool,
}

impl RunSummary {
    /// Every target converted (or nothing had to be)
    pub fn is_complete(&self) -> bool {
        self.conversion_failures.is_empty()
    }
}

/// Export pipeline for one configuration
pub struct ExportPipeline {
    config: ExportConfig,
}

impl ExportPipeline {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn layout(&self, scene: &dyn SceneGraph) -> OutputLayout {
        OutputLayout::resolve(&self.config, scene.source_path())
    }

    fn context(&self, scene_name: &str) -> ClassifyContext {
        ClassifyContext {
            scene_name: scene_name.to_string(),
            delimiter: self.config.delimiter,
            axis: self.config.axis,
        }
    }

    /// Classify and index without touching the filesystem
    pub fn plan(&self, scene: &dyn SceneGraph) -> PipelineResult<Plan> {
        let scene_name = scene_base_name(scene.source_path())?;
        let ctx = self.context(&scene_name);

        let classified = instrument_stage("classify", || classify_scene(scene, &ctx));
        let index = instrument_stage("index", || ModelMeshIndex::from_instances(&classified.models));

        Ok(Plan {
            scene_name,
            classified,
            index,
        })
    }

    /// Run the whole pipeline.
    ///
    /// Manifests are always written first. Name conflicts and manifest
    /// failures abort before any native export; conversion failures are
    /// reported in the summary.
    pub fn run(
        &self,
        scene: &mut dyn SceneGraph,
        exporter: &dyn NativeExporter,
        converter: &dyn AssetConverter,
    ) -> PipelineResult<RunSummary> {
        self.config.validate()?;

        let plan = self.plan(&*scene)?;
        let layout = self.layout(&*scene);
        info!(scene = %plan.scene_name, root = %layout.root.display(), "Exporting scene");

        let writer = ManifestWriter::with_options(ManifestOptions {
            pretty: self.config.pretty_json,
            write_empty: self.config.write_empty,
        });
        let manifests = instrument_stage("manifests", || {
            writer.write_all(&plan.classified, &plan.scene_name, &layout.manifest_dir)
        });
        if !manifests.is_complete() {
            return Err(PipelineError::ManifestWrite {
                failures: manifests.failures,
            });
        }

        if plan.has_conflicts() {
            let report = plan.index.conflict_report();
            error!("Refusing to export, rename the objects or re-link their geometry:\n{}", report);
            return Err(PipelineError::Conflict(report));
        }

        let targets = plan.targets();
        let mut summary = RunSummary {
            scene_name: plan.scene_name.clone(),
            manifests: manifests.written,
            record_count: plan.classified.record_count(),
            skipped: plan.classified.skipped.len(),
            targets: targets.iter().map(|t| t.model_file_name.clone()).collect(),
            dry_run: self.config.dry_run,
            ..Default::default()
        };

        if targets.is_empty() {
            info!("No models to export");
            return Ok(summary);
        }
        if self.config.dry_run {
            info!(targets = targets.len(), "Dry run, skipping export and conversion");
            return Ok(summary);
        }

        let orchestrator = ExportOrchestrator::new(exporter, &layout.scratch_dir);
        let intermediates = instrument_stage("export", || orchestrator.run(scene, &targets))?;

        let driver = ConversionDriver::new(converter, &layout.asset_dir).with_options(ConversionOptions {
            jobs: self.config.jobs,
            keep_intermediates: self.config.keep_intermediates,
        });
        let report = instrument_stage("convert", || driver.run(&intermediates))?;

        summary.assets = report.converted;
        summary.conversion_failures = report
            .failures
            .into_iter()
            .map(|f| FailedAsset {
                entity: f.entity,
                intermediate: f.intermediate,
                message: f.error.to_string(),
            })
            .collect();

        if summary.is_complete() {
            info!(assets = summary.assets.len(), "Export complete");
        } else {
            warn!(
                assets = summary.assets.len(),
                failed = summary.conversion_failures.len(),
                "Export finished with conversion failures"
            );
        }
        Ok(summary)
    }
}
