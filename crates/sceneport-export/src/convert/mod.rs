//! Asset conversion
//!
//! Turns intermediate files into the engine's runtime asset format. Each
//! intermediate is independent, so conversions run on a bounded worker
//! pool.

mod converter;
mod driver;

pub use converter::{CommandConverter, DEFAULT_EXTENSION, DEFAULT_PROGRAM};
pub use driver::{ConversionDriver, ConversionFailure, ConversionOptions, ConversionReport};

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::command::CommandError;

/// Asset conversion errors
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Converter finished but did not write {0:?}")]
    MissingOutput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// External converter: intermediate file -> runtime asset
pub trait AssetConverter: Sync {
    /// Extension of produced assets, without the dot
    fn extension(&self) -> &str;

    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;
}
