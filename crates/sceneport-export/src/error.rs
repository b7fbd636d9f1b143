//! Pipeline errors
//!
//! Only the fatal conditions live here. Unsupported entities and per-file
//! conversion failures are reported in the run summary instead.

use thiserror::Error;

use crate::dedup::ConflictReport;
use crate::manifest::ManifestFailure;
use crate::orchestrator::ExportFailure;

/// Errors that abort an export run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Scene error: {0}")]
    Scene(#[from] sceneport_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to write {} manifest(s): {:?}", .failures.len(), .failures)]
    ManifestWrite { failures: Vec<ManifestFailure> },

    #[error("Conflicting geometry under shared logical names\n{0}")]
    Conflict(ConflictReport),

    #[error("Native export failed for '{entity}': {source}")]
    NativeExport {
        entity: String,
        #[source]
        source: ExportFailure,
    },

    #[error("Failed to restore transform of '{entity}': {source}")]
    TransformRestore {
        entity: String,
        #[source]
        source: sceneport_core::Error,
    },

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    pub fn config(message: impl Into<String>) -> Self {
        PipelineError::Config(message.into())
    }

    /// Whether the run stopped before any native export was attempted
    pub fn is_pre_export(&self) -> bool {
        matches!(
            self,
            PipelineError::Config(_) | PipelineError::ManifestWrite { .. } | PipelineError::Conflict(_)
        )
    }
}
