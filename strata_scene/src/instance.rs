use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};
use strata_props::format::number_json;
use strata_props::{PropertyMap, TransformKeys, TransformValue};

/// Parsed instances grouped by header type, each group in document order.
pub type InstanceIndex = IndexMap<String, Vec<Instance>>;

/// One header line plus every attribute that followed it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Instance {
    pub ty: String,
    pub attributes: IndexMap<String, SceneValue>,
}

impl Instance {
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            attributes: IndexMap::new(),
        }
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&SceneValue> {
        self.attributes.get(key)
    }

    #[inline]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(SceneValue::as_str)
    }

    #[inline]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(SceneValue::as_f64)
    }

    /// `name` attribute of node headers.
    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    /// Copies every attribute whose key names a property into that property's
    /// current value. Returns how many were applied.
    pub fn apply_to(&self, properties: &mut PropertyMap) -> usize {
        let mut applied = 0;
        for (key, value) in &self.attributes {
            if let Some(property) = properties.get_mut(key) {
                property.set_value(&value.to_json());
                applied += 1;
            }
        }
        applied
    }
}

/// `Name(param, ...)`, e.g. `Vector3(1, 2, 3)` or `ExtResource("1")`.
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexValue {
    pub ty: String,
    pub params: Vec<SceneValue>,
}

/// `name { key = value, ... }`, folded onto its instance under `name`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct StructValue {
    pub name: String,
    pub fields: IndexMap<String, SceneValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SceneValue {
    Null,
    Str(String),
    /// Bare non-negative integer; selections are stored this way.
    EnumIndex(u64),
    Number(f64),
    Bool(bool),
    Array(Vec<SceneValue>),
    Complex(ComplexValue),
    Struct(StructValue),
}

impl SceneValue {
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SceneValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Enum indices read as plain numbers here.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SceneValue::Number(n) => Some(*n),
            SceneValue::EnumIndex(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SceneValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&[SceneValue]> {
        match self {
            SceneValue::Array(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_complex(&self) -> Option<&ComplexValue> {
        match self {
            SceneValue::Complex(c) => Some(c),
            _ => None,
        }
    }

    /// Source-data form, suitable for `Property::set_value`.
    ///
    /// Vector constructors become number arrays and `Transform3D` a basis
    /// object. `NodePath`/`ExtResource`/`SubResource` collapse to their single
    /// argument; other constructors keep their name under `type` with the
    /// arguments under `args`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            SceneValue::Null => JsonValue::Null,
            SceneValue::Str(s) => JsonValue::String(s.clone()),
            SceneValue::EnumIndex(i) => JsonValue::from(*i),
            SceneValue::Number(n) => number_json(*n),
            SceneValue::Bool(b) => JsonValue::Bool(*b),
            SceneValue::Array(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            SceneValue::Complex(c) => match c.ty.as_str() {
                "Transform3D" if c.params.len() == 12 => {
                    let mut flat = [0.0; 12];
                    for (slot, param) in flat.iter_mut().zip(&c.params) {
                        *slot = param.as_f64().unwrap_or_default();
                    }
                    TransformValue::from_flat(&flat).to_json(TransformKeys::Basis)
                }
                "Vector2" | "Vector3" | "Vector2i" | "Vector3i" => {
                    JsonValue::Array(c.params.iter().map(Self::to_json).collect())
                }
                "NodePath" | "ExtResource" | "SubResource" if c.params.len() == 1 => {
                    c.params[0].to_json()
                }
                _ => {
                    let mut object = JsonMap::new();
                    object.insert("type".to_string(), JsonValue::String(c.ty.clone()));
                    object.insert(
                        "args".to_string(),
                        JsonValue::Array(c.params.iter().map(Self::to_json).collect()),
                    );
                    JsonValue::Object(object)
                }
            },
            SceneValue::Struct(s) => JsonValue::Object(
                s.fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}
