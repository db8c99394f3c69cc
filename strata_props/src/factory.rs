use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::PropertyMap;
use crate::property::{Property, UNRESOLVED_REFERENCE, VectorValue};
use crate::transform::TransformValue;

impl Property {
    /// Resolves a declared type name to the matching property kind.
    ///
    /// Array notation (`T[]`, `Array[T]`) is stripped first and the element
    /// resolved on its own. Names outside the keyword set become a reference
    /// when `custom_types` knows them, otherwise a [`Property::Default`].
    pub fn from_declared(id: &str, declared: &str, custom_types: &HashSet<String>) -> Property {
        let declared = declared.trim();
        if let Some(element) = array_element(declared) {
            let element = scalar_from_declared(id, element, custom_types);
            return Property::array(id, element);
        }
        scalar_from_declared(id, declared, custom_types)
    }
}

fn array_element(declared: &str) -> Option<&str> {
    if let Some(inner) = declared.strip_suffix("[]") {
        return Some(inner.trim());
    }
    let lower = declared.to_ascii_lowercase();
    if (lower.starts_with("array[") && lower.ends_with(']'))
        || (lower.starts_with("array<") && lower.ends_with('>'))
    {
        return Some(declared["array".len() + 1..declared.len() - 1].trim());
    }
    None
}

fn scalar_from_declared(id: &str, declared: &str, custom_types: &HashSet<String>) -> Property {
    match declared.to_ascii_lowercase().as_str() {
        "raw" => Property::raw(id, ""),
        "string" | "str" | "text" => Property::string(id, ""),
        "reference" | "ref" | "node" => Property::reference(id, UNRESOLVED_REFERENCE, ""),
        "bool" | "boolean" => Property::bool(id, false),
        "int" | "integer" => Property::int(id, 0.0),
        "float" | "double" | "number" | "real" => Property::float(id, 0.0),
        "vector2" | "vec2" => Property::vector(id, VectorValue::ZERO2),
        "vector3" | "vec3" | "vector" => Property::vector(id, VectorValue::ZERO3),
        "transform" | "transform3d" | "matrix" => Property::transform(id, TransformValue::IDENTITY),
        "enum" | "selection" | "choice" => Property::selection(id, Vec::new(), ""),
        "object" | "path" | "nodepath" => Property::object(id, ""),
        _ if custom_types.contains(declared) => Property::reference(id, declared, ""),
        _ => {
            log::debug!("property `{id}` has unrecognized type `{declared}`");
            Property::fallback(id, declared)
        }
    }
}

/// One field of a per-asset-type schema, as stored in authoring data.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertySchema {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub default: Option<JsonValue>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub options: Vec<String>,
}

impl PropertySchema {
    /// Builds the property with its default applied as both default and current value.
    pub fn instantiate(&self, custom_types: &HashSet<String>) -> Property {
        let mut property = Property::from_declared(&self.id, &self.type_name, custom_types);

        match &mut property {
            Property::Int(p) => {
                p.min = self.min;
                p.max = self.max;
            }
            Property::Float(p) => {
                p.min = self.min;
                p.max = self.max;
            }
            Property::Selection(p) => p.options = self.options.clone(),
            Property::Array(p) => {
                if let Property::Selection(element) = p.element.as_mut() {
                    element.options = self.options.clone();
                }
            }
            _ => {}
        }

        if let Some(default) = &self.default {
            property.set_default(default);
            property.set_value(default);
        }
        property
    }
}

/// Instantiates a whole schema in declaration order.
pub fn instantiate_all(schema: &[PropertySchema], custom_types: &HashSet<String>) -> PropertyMap {
    schema
        .iter()
        .map(|field| (field.id.clone(), field.instantiate(custom_types)))
        .collect()
}
