//! Common types used across sceneport
//!
//! Plain value types for transforms, colors and custom properties. Angles
//! stored on scene entities are radians; manifests carry degrees.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 3D vector (location, Euler rotation, scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Apply `f` to every component
    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            x: f(self.x),
            y: f(self.y),
            z: f(self.z),
        }
    }

    /// Interpret components as radians and convert them to degrees
    pub fn to_degrees(self) -> Self {
        self.map(f32::to_degrees)
    }

    /// Compare bit patterns rather than float values, so `-0.0 != 0.0`
    /// and identical NaNs compare equal.
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
            && self.z.to_bits() == other.z.to_bits()
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Local transform of a scene entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation
    pub location: Vec3,
    /// Euler rotation in radians
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    /// Zero location, zero rotation, unit scale
    pub const IDENTITY: Self = Self {
        location: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn new(location: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            location,
            rotation,
            scale,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.bits_eq(&Self::IDENTITY)
    }

    /// Bit-for-bit equality of all nine components
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.location.bits_eq(&other.location)
            && self.rotation.bits_eq(&other.rotation)
            && self.scale.bits_eq(&other.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Linear RGB color (0.0-1.0 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Handle identifying the geometry data block an entity uses.
///
/// Entities with different names share a `GeometryId` when they are
/// instances of the same mesh.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeometryId(pub String);

impl GeometryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GeometryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for GeometryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Scalar or string value of a user-defined custom property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::String(v) => f.write_str(v),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}
