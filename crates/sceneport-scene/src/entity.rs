//! Scene entities as seen by the export pipeline

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sceneport_core::{Color, GeometryId, PropertyValue, Transform};

/// Light source flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightVariant {
    Point,
    Spot,
    Sun,
}

impl LightVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightVariant::Point => "point",
            LightVariant::Spot => "spot",
            LightVariant::Sun => "sun",
        }
    }
}

/// Light parameters in the authoring tool's units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightData {
    pub variant: LightVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default)]
    pub energy: f32,
    /// Falloff distance
    #[serde(default)]
    pub distance: f32,
    /// Full spot cone angle in radians, only meaningful for spot lights
    #[serde(default)]
    pub spot_size: f32,
}

impl LightData {
    pub fn new(variant: LightVariant) -> Self {
        Self {
            variant,
            color: None,
            energy: 0.0,
            distance: 0.0,
            spot_size: 0.0,
        }
    }
}

/// What kind of data an entity carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityKind {
    Mesh,
    Light(LightData),
    Camera {
        /// Field of view in radians
        angle: f32,
    },
    /// Entity without data (transform-only placeholder)
    Empty,
    /// Any other data type (curves, text, armatures, ...)
    Unsupported {
        type_name: String,
    },
}

impl EntityKind {
    /// Short type tag for logs and manifests
    pub fn type_name(&self) -> &str {
        match self {
            EntityKind::Mesh => "mesh",
            EntityKind::Light(light) => light.variant.as_str(),
            EntityKind::Camera { .. } => "camera",
            EntityKind::Empty => "empty",
            EntityKind::Unsupported { type_name } => type_name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, EntityKind::Unsupported { .. })
    }
}

fn default_visible() -> bool {
    true
}

/// One object in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntity {
    /// Unique name within the scene, e.g. "car.001"
    pub name: String,

    pub kind: EntityKind,

    /// Geometry data block this entity uses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<GeometryId>,

    #[serde(default)]
    pub transform: Transform,

    #[serde(default = "default_visible")]
    pub visible: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Rig entity deforming this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armature: Option<String>,

    /// Entities referenced by this entity's modifiers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<bool>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: BTreeMap<String, PropertyValue>,
}

impl SceneEntity {
    /// Create a visible entity with an identity transform
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            data: None,
            transform: Transform::IDENTITY,
            visible: true,
            parent: None,
            armature: None,
            modifiers: Vec::new(),
            layers: Vec::new(),
            custom_properties: BTreeMap::new(),
        }
    }

    /// Mesh entity using `geometry`
    pub fn mesh(name: impl Into<String>, geometry: impl Into<GeometryId>) -> Self {
        Self::new(name, EntityKind::Mesh).with_data(geometry)
    }

    pub fn with_data(mut self, geometry: impl Into<GeometryId>) -> Self {
        self.data = Some(geometry.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_armature(mut self, armature: impl Into<String>) -> Self {
        self.armature = Some(armature.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.custom_properties.insert(key.into(), value.into());
        self
    }

    /// Armature followed by modifier links, without duplicates
    pub fn linked_entities(&self) -> Vec<String> {
        let mut linked: Vec<String> = Vec::new();
        for name in self.armature.iter().chain(self.modifiers.iter()) {
            if name != &self.name && !linked.contains(name) {
                linked.push(name.clone());
            }
        }
        linked
    }

    /// Whether any link (parent, armature, modifier) points at `name`
    pub fn references(&self, name: &str) -> bool {
        self.parent.as_deref() == Some(name)
            || self.armature.as_deref() == Some(name)
            || self.modifiers.iter().any(|m| m == name)
    }

    /// Rewrite links pointing at `old` to point at `new`
    pub fn relink(&mut self, old: &str, new: &str) {
        for link in self.parent.iter_mut().chain(self.armature.iter_mut()) {
            if *link == old {
                *link = new.to_string();
            }
        }
        for link in &mut self.modifiers {
            if *link == old {
                *link = new.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_type_names() {
        assert_eq!(EntityKind::Mesh.type_name(), "mesh");
        assert_eq!(EntityKind::Light(LightData::new(LightVariant::Spot)).type_name(), "spot");
        assert_eq!(
            EntityKind::Unsupported { type_name: "curve".into() }.type_name(),
            "curve"
        );
        assert!(!EntityKind::Unsupported { type_name: "curve".into() }.is_supported());
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{ "name": "lamp", "kind": { "type": "light", "variant": "point", "energy": 2.0 } }"#;
        let entity: SceneEntity = serde_json::from_str(json).unwrap();

        assert!(entity.visible);
        assert!(entity.transform.is_identity());
        assert!(entity.data.is_none());
        match entity.kind {
            EntityKind::Light(light) => {
                assert_eq!(light.variant, LightVariant::Point);
                assert!(light.color.is_none());
                assert_eq!(light.energy, 2.0);
            }
            other => panic!("expected light, got {:?}", other),
        }
    }

    #[test]
    fn test_linked_entities_dedup() {
        let mut entity = SceneEntity::mesh("body", "BodyMesh").with_armature("rig");
        entity.modifiers = vec!["rig".into(), "lattice".into(), "body".into()];

        assert_eq!(entity.linked_entities(), vec!["rig".to_string(), "lattice".to_string()]);
    }

    #[test]
    fn test_relink() {
        let mut entity = SceneEntity::mesh("body", "BodyMesh").with_armature("rig");
        entity.parent = Some("rig".into());
        entity.modifiers = vec!["rig".into()];

        entity.relink("rig", "skeleton");

        assert_eq!(entity.armature.as_deref(), Some("skeleton"));
        assert_eq!(entity.parent.as_deref(), Some("skeleton"));
        assert_eq!(entity.modifiers, vec!["skeleton".to_string()]);
        assert!(!entity.references("rig"));
    }
}
