//! sceneport Core Library
//!
//! This crate provides the value types, error handling and logging setup
//! shared by the scene, export and CLI crates.

pub mod error;
pub mod logging;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use types::*;
