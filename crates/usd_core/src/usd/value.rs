//! Opaque attribute/relationship values forwarded between the lexer,
//! the metadata decoder, and the (peripheral) per-schema reconstructors.
//!
//! The core treats properties as opaque per spec.md §3 ("this spec treats
//! it as opaque and forwards it unchanged"); `PropertyValue` is the minimal
//! concrete shape needed to actually carry that data through the pipeline.

use std::collections::BTreeMap;

use crate::usd::path::ListEditQualifier;

/// A parsed scalar/array value as it appears in USDA text.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Token(String),
    Path(String),
    Vec3(f32, f32, f32),
    Quat(f32, f32, f32, f32),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
    Vec3Array(Vec<(f32, f32, f32)>),
    StringArray(Vec<String>),
    PathArray(Vec<String>),
    /// A nested dictionary, used by `customData` / `assetInfo`.
    Dict(BTreeMap<String, PropertyValue>),
    /// A reference/payload list was authored with `None` (block the opinion).
    Blocked,
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) | PropertyValue::Token(s) | PropertyValue::Path(s) => {
                Some(s)
            }
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<(f32, f32, f32)> {
        match self {
            PropertyValue::Vec3(x, y, z) => Some((*x, *y, *z)),
            _ => None,
        }
    }

    pub fn as_vec3_array(&self) -> Option<&[(f32, f32, f32)]> {
        match self {
            PropertyValue::Vec3Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i64]> {
        match self {
            PropertyValue::IntArray(v) => Some(v),
            _ => None,
        }
    }

    /// Short type name used in "expected X, got Y" diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::String(_) => "string",
            PropertyValue::Token(_) => "token",
            PropertyValue::Path(_) => "path",
            PropertyValue::Vec3(..) => "vec3",
            PropertyValue::Quat(..) => "quat",
            PropertyValue::IntArray(_) => "int[]",
            PropertyValue::FloatArray(_) => "float[]",
            PropertyValue::Vec3Array(_) => "vec3[]",
            PropertyValue::StringArray(_) => "string[]",
            PropertyValue::PathArray(_) => "path[]",
            PropertyValue::Dict(_) => "dictionary",
            PropertyValue::Blocked => "none",
        }
    }
}

/// A single USD attribute or relationship, kept opaque and forwarded as-is.
#[derive(Clone, Debug, PartialEq)]
pub enum Property {
    Attribute { type_name: String, value: Option<PropertyValue> },
    Relationship { targets: Vec<String> },
}

/// Ordered mapping from property name to `Property`, preserving textual order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyMap {
    entries: Vec<(String, Property)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, prop: Property) {
        self.entries.push((name.into(), prop));
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn get_value(&self, name: &str) -> Option<&PropertyValue> {
        match self.get(name)? {
            Property::Attribute { value, .. } => value.as_ref(),
            Property::Relationship { .. } => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Property)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A composition arc naming another layer and an optional prim path within it.
///
/// `layer_offset`/`layer_scale` are not in spec.md's distilled data model but
/// are carried through per SPEC_FULL.md §3 (tinyusdz and the teacher's
/// reference-node material both model a time offset/scale on references).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reference {
    pub asset_path: String,
    pub prim_path: Option<String>,
    pub layer_offset: f64,
    pub layer_scale: f64,
}

/// A raw (key, (list-edit qualifier, value)) pair as produced by the lexer,
/// before `PrimMetaDecoder` validates and structures it.
#[derive(Clone, Debug)]
pub struct RawMetaEntry {
    pub key: String,
    pub qualifier: ListEditQualifier,
    pub value: PropertyValue,
}

pub type RawMetaMap = Vec<RawMetaEntry>;
