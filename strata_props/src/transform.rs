use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::format::{format_numbers, number_json};

/// Which key-set a transform arrived with, so it can be written back the same way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TransformKeys {
    /// `basis_x`, `basis_y`, `basis_z`, `position`
    #[default]
    Basis,
    /// `x`, `y`, `z`, `w`
    Xyzw,
}

impl TransformKeys {
    pub const fn names(self) -> [&'static str; 4] {
        match self {
            TransformKeys::Basis => ["basis_x", "basis_y", "basis_z", "position"],
            TransformKeys::Xyzw => ["x", "y", "z", "w"],
        }
    }
}

/// Three basis axes followed by the position, each a 3-vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformValue {
    pub slots: [[f64; 3]; 4],
}

impl TransformValue {
    pub const IDENTITY: TransformValue = TransformValue {
        slots: [
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
        ],
    };

    #[inline]
    pub const fn basis(&self) -> [[f64; 3]; 3] {
        [self.slots[0], self.slots[1], self.slots[2]]
    }

    #[inline]
    pub const fn position(&self) -> [f64; 3] {
        self.slots[3]
    }

    /// Axis-major flat form: x axis, y axis, z axis, position.
    pub fn flatten(&self) -> [f64; 12] {
        let mut out = [0.0; 12];
        for (i, slot) in self.slots.iter().enumerate() {
            out[i * 3..i * 3 + 3].copy_from_slice(slot);
        }
        out
    }

    pub fn from_flat(values: &[f64; 12]) -> Self {
        let mut slots = [[0.0; 3]; 4];
        for (i, slot) in slots.iter_mut().enumerate() {
            slot.copy_from_slice(&values[i * 3..i * 3 + 3]);
        }
        Self { slots }
    }

    /// Accepts either recognized key-set. Missing slots keep their identity value.
    pub fn from_json(value: &JsonValue) -> Option<(Self, TransformKeys)> {
        let object = value.as_object()?;
        let keys = [TransformKeys::Basis, TransformKeys::Xyzw]
            .into_iter()
            .find(|keys| keys.names().iter().any(|name| object.contains_key(*name)))?;

        let mut transform = Self::IDENTITY;
        for (slot, name) in transform.slots.iter_mut().zip(keys.names()) {
            if let Some(v) = object.get(name).and_then(vec3_from_json) {
                *slot = v;
            }
        }
        Some((transform, keys))
    }

    pub fn to_json(&self, keys: TransformKeys) -> JsonValue {
        let mut object = JsonMap::new();
        for (slot, name) in self.slots.iter().zip(keys.names()) {
            object.insert(
                name.to_string(),
                JsonValue::Array(slot.iter().map(|v| number_json(*v)).collect()),
            );
        }
        JsonValue::Object(object)
    }

    pub fn render(&self) -> String {
        format!("Transform3D({})", format_numbers(&self.flatten()))
    }
}

impl Default for TransformValue {
    fn default() -> Self {
        Self::IDENTITY
    }
}

pub(crate) fn vec3_from_json(value: &JsonValue) -> Option<[f64; 3]> {
    match value {
        JsonValue::Array(items) => {
            let mut out = [0.0; 3];
            for (slot, item) in out.iter_mut().zip(items) {
                *slot = item.as_f64().unwrap_or_default();
            }
            Some(out)
        }
        JsonValue::Object(object) => Some([
            object.get("x").and_then(JsonValue::as_f64).unwrap_or_default(),
            object.get("y").and_then(JsonValue::as_f64).unwrap_or_default(),
            object.get("z").and_then(JsonValue::as_f64).unwrap_or_default(),
        ]),
        _ => None,
    }
}
