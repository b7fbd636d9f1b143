//! Model/mesh deduplication index
//!
//! Groups model placements by logical name, then by geometry identity:
//!
//! ```text
//! "car" -> CarMesh -> [car, car.001, car.002]
//! "rock" -> RockA  -> [rock]
//!        -> RockB  -> [rock.001]            <- conflict
//! ```
//!
//! Many placements of one geometry are instancing and convert to a single
//! asset. Two geometries under one logical name would both be written to
//! `<scene>_<name>.<ext>`, so any such name is a conflict and the run must
//! not export anything.
//!
//! Both levels keep insertion order. The first instance inserted for a
//! (name, geometry) pair is its export target.

use std::collections::HashMap;
use std::fmt;

use sceneport_core::GeometryId;

use crate::classify::ModelInstance;

/// The placement chosen to be exported for one (name, geometry) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    /// Entity whose transform is zeroed during export
    pub entity: String,
    pub logical_name: String,
    pub model_file_name: String,
    pub geometry: GeometryId,
    /// Linked rig/modifier entities selected alongside the target
    pub linked: Vec<String>,
    /// Number of placements sharing this geometry
    pub instances: usize,
}

#[derive(Debug, Clone)]
struct GeometryGroup {
    geometry: GeometryId,
    instances: Vec<ModelInstance>,
}

#[derive(Debug, Clone)]
struct NameGroup {
    logical_name: String,
    geometries: Vec<GeometryGroup>,
}

impl NameGroup {
    fn is_conflicting(&self) -> bool {
        self.geometries.len() > 1
    }
}

/// Ordered logical name -> geometry -> instances index
#[derive(Debug, Clone, Default)]
pub struct ModelMeshIndex {
    groups: Vec<NameGroup>,
    by_name: HashMap<String, usize>,
}

impl ModelMeshIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from placements in enumeration order
    pub fn from_instances<'a>(instances: impl IntoIterator<Item = &'a ModelInstance>) -> Self {
        let mut index = Self::new();
        for instance in instances {
            index.insert(instance.clone());
        }
        index
    }

    /// Append `instance` under its logical name and geometry
    pub fn insert(&mut self, instance: ModelInstance) {
        let slot = match self.by_name.get(&instance.logical_name) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.by_name.insert(instance.logical_name.clone(), slot);
                self.groups.push(NameGroup {
                    logical_name: instance.logical_name.clone(),
                    geometries: Vec::new(),
                });
                slot
            }
        };

        let group = &mut self.groups[slot];
        match group.geometries.iter_mut().find(|g| g.geometry == instance.geometry) {
            Some(existing) => existing.instances.push(instance),
            None => group.geometries.push(GeometryGroup {
                geometry: instance.geometry.clone(),
                instances: vec![instance],
            }),
        }
    }

    /// Number of distinct logical names
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of indexed placements
    pub fn instance_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| &g.geometries)
            .map(|g| g.instances.len())
            .sum()
    }

    /// Distinct geometries recorded for `logical_name`, first-seen first
    pub fn geometries(&self, logical_name: &str) -> Vec<&GeometryId> {
        self.by_name
            .get(logical_name)
            .map(|&slot| self.groups[slot].geometries.iter().map(|g| &g.geometry).collect())
            .unwrap_or_default()
    }

    /// True iff some logical name maps to more than one geometry
    pub fn has_conflicts(&self) -> bool {
        self.groups.iter().any(NameGroup::is_conflicting)
    }

    /// Every conflicting name with its geometries and their instances
    pub fn conflict_report(&self) -> ConflictReport {
        let conflicts = self
            .groups
            .iter()
            .filter(|g| g.is_conflicting())
            .map(|g| NameConflict {
                logical_name: g.logical_name.clone(),
                geometries: g
                    .geometries
                    .iter()
                    .map(|geo| {
                        (
                            geo.geometry.clone(),
                            geo.instances.iter().map(|i| i.entity.clone()).collect(),
                        )
                    })
                    .collect(),
            })
            .collect();

        ConflictReport { conflicts }
    }

    /// First-inserted instance of every (name, geometry) pair, in first-seen order
    pub fn export_targets(&self) -> Vec<ExportTarget> {
        self.groups
            .iter()
            .flat_map(|g| &g.geometries)
            .filter_map(|geo| {
                geo.instances.first().map(|first| ExportTarget {
                    entity: first.entity.clone(),
                    logical_name: first.logical_name.clone(),
                    model_file_name: first.model_file_name.clone(),
                    geometry: geo.geometry.clone(),
                    linked: first.linked.clone(),
                    instances: geo.instances.len(),
                })
            })
            .collect()
    }
}

/// One logical name claimed by several geometries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameConflict {
    pub logical_name: String,
    /// Geometry with the entity names using it
    pub geometries: Vec<(GeometryId, Vec<String>)>,
}

/// Diagnostic listing of all name conflicts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    pub conflicts: Vec<NameConflict>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for conflict in &self.conflicts {
            writeln!(
                f,
                "'{}' is used by {} different geometries:",
                conflict.logical_name,
                conflict.geometries.len()
            )?;
            for (geometry, entities) in &conflict.geometries {
                writeln!(f, "  {} <- {}", geometry, entities.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(entity: &str, geometry: &str) -> ModelInstance {
        let logical = sceneport_scene::logical_name(entity, '.').to_string();
        ModelInstance {
            entity: entity.into(),
            model_file_name: format!("town_{}", logical),
            logical_name: logical,
            geometry: geometry.into(),
            linked: Vec::new(),
        }
    }

    #[test]
    fn test_shared_geometry_is_one_target() {
        let index = ModelMeshIndex::from_instances(&[
            instance("car", "G"),
            instance("car.001", "G"),
            instance("car.002", "G"),
        ]);

        assert!(!index.has_conflicts());
        assert!(index.conflict_report().is_empty());

        let targets = index.export_targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].entity, "car");
        assert_eq!(targets[0].model_file_name, "town_car");
        assert_eq!(targets[0].instances, 3);
    }

    #[test]
    fn test_first_inserted_wins_even_with_suffix() {
        let index = ModelMeshIndex::from_instances(&[instance("tree.004", "T"), instance("tree", "T")]);

        assert_eq!(index.export_targets()[0].entity, "tree.004");
    }

    #[test]
    fn test_name_collision_is_conflict() {
        let index = ModelMeshIndex::from_instances(&[
            instance("car", "G1"),
            instance("house", "H"),
            instance("car.001", "G2"),
            instance("car.002", "G1"),
        ]);

        assert!(index.has_conflicts());

        let report = index.conflict_report();
        assert_eq!(report.len(), 1);
        assert_eq!(report.conflicts[0].logical_name, "car");
        assert_eq!(
            report.conflicts[0].geometries,
            vec![
                (GeometryId::from("G1"), vec!["car".to_string(), "car.002".to_string()]),
                (GeometryId::from("G2"), vec!["car.001".to_string()]),
            ]
        );

        let rendered = report.to_string();
        assert!(rendered.contains("'car' is used by 2 different geometries"));
        assert!(rendered.contains("G2 <- car.001"));
    }

    #[test]
    fn test_same_geometry_under_different_names_is_not_conflict() {
        let index = ModelMeshIndex::from_instances(&[instance("crate", "Box"), instance("barrel", "Box")]);

        assert!(!index.has_conflicts());
        let names: Vec<String> = index.export_targets().into_iter().map(|t| t.logical_name).collect();
        assert_eq!(names, vec!["crate", "barrel"]);
    }

    #[test]
    fn test_counts_and_geometries() {
        let index = ModelMeshIndex::from_instances(&[
            instance("a", "X"),
            instance("a.001", "Y"),
            instance("b", "Z"),
            instance("a.002", "X"),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.instance_count(), 4);
        assert_eq!(index.geometries("a"), vec![&GeometryId::from("X"), &GeometryId::from("Y")]);
        assert!(index.geometries("missing").is_empty());
    }

    #[test]
    fn test_empty_index() {
        let index = ModelMeshIndex::new();
        assert!(index.is_empty());
        assert!(!index.has_conflicts());
        assert!(index.export_targets().is_empty());
    }
}
