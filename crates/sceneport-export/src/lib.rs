//! sceneport Export Pipeline
//!
//! Turns a scene graph into engine-ready output:
//! - per-category JSON manifests of every placed entity
//! - one converted asset per distinct mesh geometry
//!
//! Stages run in this order: [`classify`] -> [`manifest`] -> [`dedup`] ->
//! [`orchestrator`] -> [`convert`]. [`pipeline::ExportPipeline`] wires
//! them together.

pub mod classify;
pub mod command;
pub mod config;
pub mod convert;
pub mod dedup;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod pipeline;
pub mod records;

pub use classify::{classify, classify_scene, AxisConvention, Classification, ClassifiedScene, ClassifyContext, ModelInstance, SkipReason};
pub use command::{CommandError, CommandSpec};
pub use config::{ConverterConfig, ExportConfig, ExporterConfig};
pub use convert::{AssetConverter, CommandConverter, ConversionDriver, ConversionFailure, ConversionOptions, ConversionReport, ConvertError};
pub use dedup::{ConflictReport, ExportTarget, ModelMeshIndex, NameConflict};
pub use error::{PipelineError, PipelineResult};
pub use manifest::{ManifestFailure, ManifestOptions, ManifestReport, ManifestWriter};
pub use orchestrator::{CommandExporter, ExportFailure, ExportOrchestrator, ExportRequest, IntermediateFile, NativeExporter, TransformGuard};
pub use pipeline::{ExportPipeline, FailedAsset, OutputLayout, Plan, RunSummary};
pub use records::{Category, Record, RecordBase};
