//! Unified error handling for sceneport
//!
//! Errors raised while loading, querying and mutating a scene. The export
//! crate wraps this type in its own pipeline error.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for scene-level operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // ==================== Data Errors ====================

    /// Malformed JSON in a snapshot or selection file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid data structure
    #[error("Invalid data: {message}")]
    InvalidData {
        message: String,
    },

    // ==================== Scene Errors ====================

    /// No entity with this name exists in the scene
    #[error("Entity not found: {name}")]
    EntityNotFound {
        name: String,
    },

    /// An entity name is already taken
    #[error("Entity name already in use: {name}")]
    NameCollision {
        name: String,
    },

    // ==================== General Errors ====================

    /// Error with added context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Error::InvalidData {
            message: message.into(),
        }
    }

    /// Create an entity-not-found error
    pub fn entity_not_found(name: impl Into<String>) -> Self {
        Error::EntityNotFound { name: name.into() }
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::FileNotFound(_) | Error::EntityNotFound { .. } => true,
            Error::WithContext { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_context() {
        let err = Error::FileNotFound(PathBuf::from("/level.json"));
        let contextualized = err.with_context("while loading snapshot");

        assert!(contextualized.to_string().contains("while loading snapshot"));
        assert!(contextualized.to_string().contains("/level.json"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::FileNotFound(PathBuf::from("/test")).is_not_found());
        assert!(Error::entity_not_found("car").is_not_found());
        assert!(Error::entity_not_found("car").with_context("restore").is_not_found());
        assert!(!Error::invalid_data("bad").is_not_found());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::entity_not_found("lamp"));
        let with_context = result.context("reading transform");

        let message = with_context.unwrap_err().to_string();
        assert!(message.starts_with("reading transform"));
        assert!(message.contains("lamp"));
    }
}
