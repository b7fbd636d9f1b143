//! Scene graph model for sceneport
//!
//! The authoring tool owns the real scene. This crate describes the view
//! the export pipeline needs of it:
//! - [`SceneEntity`] and [`EntityKind`], the per-entity data
//! - [`SceneGraph`], the trait a host adapter implements
//! - [`SceneSnapshot`], an in-memory scene loaded from a JSON dump
//! - name helpers and batch renaming of logical names

pub mod entity;
pub mod graph;
pub mod naming;
pub mod rename;
pub mod snapshot;

pub use entity::{EntityKind, LightData, LightVariant, SceneEntity};
pub use graph::{scene_base_name, SceneGraph};
pub use naming::{logical_name, split_name, DEFAULT_DELIMITER};
pub use rename::rename_logical;
pub use snapshot::SceneSnapshot;
