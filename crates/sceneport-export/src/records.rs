//! Engine-ready entity records
//!
//! One [`Record`] per placed entity. Field names match what the engine's
//! scene loader reads (`lamp_color`, `model_file_name`, ...).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use sceneport_core::{GeometryId, PropertyValue, Vec3};

/// Manifest category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Model,
    Light,
    Empty,
    Camera,
}

impl Category {
    /// Every category, in manifest writing order
    pub const ALL: [Category; 4] = [Category::Model, Category::Light, Category::Empty, Category::Camera];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Model => "model",
            Category::Light => "light",
            Category::Empty => "empty",
            Category::Camera => "camera",
        }
    }

    /// `<scene>_<category>.json`
    pub fn manifest_file_name(&self, scene_name: &str) -> String {
        format!("{}_{}.json", scene_name, self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by every record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordBase {
    /// Logical name (suffix stripped)
    pub name: String,
    /// Source kind tag ("mesh", "spot", "camera", ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Vec3,
    /// Euler angles in degrees
    pub rotation: Vec3,
    pub scale: Vec3,
    #[serde(default)]
    pub custom_properties: BTreeMap<String, PropertyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<bool>,
}

/// RGBA light color as the engine reads it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LampColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    #[serde(flatten)]
    pub base: RecordBase,
    /// `<scene>_<logical name>`, the asset file stem
    pub model_file_name: String,
    pub geometry: GeometryId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightRecord {
    #[serde(flatten)]
    pub base: RecordBase,
    pub lamp_color: LampColor,
    pub lamp_energy: f32,
    pub lamp_distance: f32,
    /// Spot cone half-angle in degrees, 0 for other lights
    pub lamp_falloff: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraRecord {
    #[serde(flatten)]
    pub base: RecordBase,
    /// Field of view in degrees
    pub fov: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmptyRecord {
    #[serde(flatten)]
    pub base: RecordBase,
}

/// A categorized entity record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Model(ModelRecord),
    Light(LightRecord),
    Empty(EmptyRecord),
    Camera(CameraRecord),
}

impl Record {
    pub fn category(&self) -> Category {
        match self {
            Record::Model(_) => Category::Model,
            Record::Light(_) => Category::Light,
            Record::Empty(_) => Category::Empty,
            Record::Camera(_) => Category::Camera,
        }
    }

    pub fn base(&self) -> &RecordBase {
        match self {
            Record::Model(r) => &r.base,
            Record::Light(r) => &r.base,
            Record::Empty(r) => &r.base,
            Record::Camera(r) => &r.base,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(name: &str) -> RecordBase {
        RecordBase {
            name: name.into(),
            kind: "spot".into(),
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            custom_properties: BTreeMap::new(),
            layers: Vec::new(),
        }
    }

    #[test]
    fn test_manifest_file_name() {
        assert_eq!(Category::Light.manifest_file_name("town"), "town_light.json");
    }

    #[test]
    fn test_light_record_json_shape() {
        let record = Record::Light(LightRecord {
            base: base("lamp"),
            lamp_color: LampColor { r: 1.0, g: 0.5, b: 0.0, a: 1.0 },
            lamp_energy: 2.0,
            lamp_distance: 25.0,
            lamp_falloff: 22.5,
        });

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["name"], "lamp");
        assert_eq!(value["type"], "spot");
        assert_eq!(value["position"]["z"], 3.0);
        assert_eq!(value["lamp_color"]["a"], 1.0);
        assert_eq!(value["lamp_falloff"], 22.5);
        assert!(value.get("layers").is_none());
        assert!(value["custom_properties"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_model_record_roundtrips_through_engine_shape() {
        let record = ModelRecord {
            base: base("car"),
            model_file_name: "town_car".into(),
            geometry: GeometryId::from("CarMesh"),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: ModelRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back, record);
        assert_eq!(Record::Model(back).category(), Category::Model);
    }
}
