//! Batch renaming of logical names
//!
//! Moves every placement of one logical name to another while keeping the
//! disambiguating suffixes, e.g. `house_window.003` -> `wall_window.003`.

use tracing::{debug, info};

use sceneport_core::{Error, Result};

use crate::graph::SceneGraph;
use crate::naming::split_name;

/// Rename all entities whose logical name is `from` to logical name `to`.
///
/// The whole batch is checked for collisions before anything is renamed,
/// so a failed call leaves the scene untouched. Returns the number of
/// renamed entities.
pub fn rename_logical(
    scene: &mut dyn SceneGraph,
    from: &str,
    to: &str,
    delimiter: char,
) -> Result<usize> {
    if to.is_empty() || to.contains(delimiter) {
        return Err(Error::invalid_data(format!(
            "target logical name {:?} must be non-empty and must not contain {:?}",
            to, delimiter
        )));
    }

    let plan: Vec<(String, String)> = scene
        .entities()
        .iter()
        .filter_map(|entity| {
            let (base, suffix) = split_name(&entity.name, delimiter);
            if base != from {
                return None;
            }
            let new_name = match suffix {
                Some(suffix) => format!("{}{}{}", to, delimiter, suffix),
                None => to.to_string(),
            };
            Some((entity.name.clone(), new_name))
        })
        .collect();

    if from == to || plan.is_empty() {
        return Ok(0);
    }

    // New names all share the base `to`, so they cannot clash with each
    // other or with the entities being renamed.
    for (_, new_name) in &plan {
        if scene.entity(new_name).is_some() {
            return Err(Error::NameCollision {
                name: new_name.clone(),
            });
        }
    }

    for (old, new_name) in &plan {
        debug!(from = %old, to = %new_name, "Renaming entity");
        scene.rename_entity(old, new_name)?;
    }

    info!(from = %from, to = %to, count = plan.len(), "Renamed logical name");
    Ok(plan.len())
}
