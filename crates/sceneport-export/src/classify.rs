//! Entity classification
//!
//! Maps every scene entity to exactly one [`Record`] or a [`SkipReason`].
//! Skips are never errors: hidden entities are dropped quietly, unsupported
//! ones with a warning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sceneport_core::{Color, GeometryId, Vec3};
use sceneport_scene::{split_name, EntityKind, LightVariant, SceneEntity, SceneGraph};

use crate::records::{
    CameraRecord, Category, EmptyRecord, LampColor, LightRecord, ModelRecord, Record, RecordBase,
};

/// Up-axis handling between the authoring tool and the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisConvention {
    /// Keep the authoring tool's axes
    #[default]
    Native,
    /// Z-up source to Y-up target: `(x, y, z) -> (x, z, -y)`
    YUp,
}

impl AxisConvention {
    pub fn remap(&self, v: Vec3) -> Vec3 {
        match self {
            AxisConvention::Native => v,
            AxisConvention::YUp => Vec3::new(v.x, v.z, -v.y),
        }
    }
}

/// Per-run classification settings
#[derive(Debug, Clone)]
pub struct ClassifyContext {
    /// Scene base name, used as model file prefix
    pub scene_name: String,
    /// Name suffix delimiter
    pub delimiter: char,
    pub axis: AxisConvention,
}

impl ClassifyContext {
    pub fn new(scene_name: impl Into<String>) -> Self {
        Self {
            scene_name: scene_name.into(),
            delimiter: sceneport_scene::DEFAULT_DELIMITER,
            axis: AxisConvention::Native,
        }
    }

    /// `<scene>_<logical name>`
    pub fn model_file_name(&self, logical_name: &str) -> String {
        format!("{}_{}", self.scene_name, logical_name)
    }
}

/// Why an entity produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Hidden,
    Unsupported(String),
    /// Mesh entity without a geometry data block
    MissingGeometry,
}

/// Outcome of classifying one entity
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Record(Record),
    Skip(SkipReason),
}

/// Model placement as seen by the deduplication index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInstance {
    /// Full entity name, e.g. "car.001"
    pub entity: String,
    pub logical_name: String,
    pub model_file_name: String,
    pub geometry: GeometryId,
    /// Rig and modifier entities exported together with this one
    pub linked: Vec<String>,
}

/// Classify a single entity
pub fn classify(entity: &SceneEntity, ctx: &ClassifyContext) -> Classification {
    if !entity.visible {
        return Classification::Skip(SkipReason::Hidden);
    }

    let (logical, _suffix) = split_name(&entity.name, ctx.delimiter);
    let t = &entity.transform;
    let base = RecordBase {
        name: logical.to_string(),
        kind: entity.kind.type_name().to_string(),
        position: ctx.axis.remap(t.location),
        rotation: ctx.axis.remap(t.rotation.to_degrees()),
        scale: ctx.axis.remap(t.scale),
        custom_properties: entity.custom_properties.clone(),
        layers: entity.layers.clone(),
    };

    let record = match &entity.kind {
        EntityKind::Mesh => {
            let Some(geometry) = entity.data.clone() else {
                return Classification::Skip(SkipReason::MissingGeometry);
            };
            Record::Model(ModelRecord {
                model_file_name: ctx.model_file_name(logical),
                geometry,
                base,
            })
        }
        EntityKind::Light(light) => {
            let color = light.color.unwrap_or(Color::BLACK);
            let lamp_falloff = match light.variant {
                LightVariant::Spot => (light.spot_size / 2.0).to_degrees(),
                LightVariant::Point | LightVariant::Sun => 0.0,
            };
            Record::Light(LightRecord {
                base,
                lamp_color: LampColor {
                    r: color.r,
                    g: color.g,
                    b: color.b,
                    a: 1.0,
                },
                lamp_energy: light.energy,
                lamp_distance: light.distance,
                lamp_falloff,
            })
        }
        EntityKind::Camera { angle } => Record::Camera(CameraRecord {
            base,
            fov: angle.to_degrees(),
        }),
        EntityKind::Empty => Record::Empty(EmptyRecord { base }),
        EntityKind::Unsupported { type_name } => {
            return Classification::Skip(SkipReason::Unsupported(type_name.clone()));
        }
    };

    Classification::Record(record)
}

/// Records of a whole scene, grouped by category
#[derive(Debug, Clone, Default)]
pub struct ClassifiedScene {
    records: BTreeMap<Category, Vec<Record>>,
    /// Model placements in enumeration order
    pub models: Vec<ModelInstance>,
    /// Skipped entity names with the reason
    pub skipped: Vec<(String, SkipReason)>,
}

impl ClassifiedScene {
    /// Records of one category in encounter order
    pub fn records(&self, category: Category) -> &[Record] {
        self.records.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    fn push(&mut self, record: Record) {
        self.records.entry(record.category()).or_default().push(record);
    }
}

/// Classify every entity of `scene` in enumeration order
pub fn classify_scene(scene: &dyn SceneGraph, ctx: &ClassifyContext) -> ClassifiedScene {
    let mut classified = ClassifiedScene::default();

    for entity in scene.entities() {
        match classify(entity, ctx) {
            Classification::Record(record) => {
                if let Record::Model(model) = &record {
                    classified.models.push(ModelInstance {
                        entity: entity.name.clone(),
                        logical_name: model.base.name.clone(),
                        model_file_name: model.model_file_name.clone(),
                        geometry: model.geometry.clone(),
                        linked: entity.linked_entities(),
                    });
                }
                classified.push(record);
            }
            Classification::Skip(reason) => {
                match &reason {
                    SkipReason::Hidden => {
                        debug!(entity = %entity.name, "Skipping hidden entity");
                    }
                    SkipReason::Unsupported(type_name) => {
                        warn!(entity = %entity.name, kind = %type_name, "Skipping entity of unsupported kind");
                    }
                    SkipReason::MissingGeometry => {
                        warn!(entity = %entity.name, "Skipping mesh entity without geometry data");
                    }
                }
                classified.skipped.push((entity.name.clone(), reason));
            }
        }
    }

    debug!(
        records = classified.record_count(),
        models = classified.models.len(),
        skipped = classified.skipped.len(),
        "Classified scene"
    );
    classified
}
