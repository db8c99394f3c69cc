// strata_props/src/property.rs

use serde_json::Value as JsonValue;

use crate::format::{format_decimal, format_number, number_json, quote, to_identifier, to_pascal_case};
use crate::transform::{TransformKeys, TransformValue, vec3_from_json};

/// Target-type marker of a reference whose type has not been resolved yet.
pub const UNRESOLVED_REFERENCE: &str = "reference";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Raw,
    String,
    Reference,
    Bool,
    Int,
    Float,
    Vector,
    Transform,
    Selection,
    Object,
    Array,
    Default,
}

// -------------------- Per-kind records --------------------

/// Verbatim text, written to both surfaces unchanged.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RawProperty {
    pub id: String,
    pub value: String,
    pub default: String,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct StringProperty {
    pub id: String,
    pub value: String,
    pub default: String,
}

/// Identity handle of another object; rewritten to a sibling path before rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceProperty {
    pub id: String,
    pub value: String,
    pub default: String,
    pub target: String,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct BoolProperty {
    pub id: String,
    pub value: bool,
    pub default: bool,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct IntProperty {
    pub id: String,
    pub value: f64,
    pub default: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct FloatProperty {
    pub id: String,
    pub value: f64,
    pub default: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Up to three components; `len` is 2 for 2D vectors (third slot unused).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VectorValue {
    pub slots: [f64; 3],
    pub len: usize,
}

impl VectorValue {
    pub const ZERO2: VectorValue = VectorValue {
        slots: [0.0; 3],
        len: 2,
    };
    pub const ZERO3: VectorValue = VectorValue {
        slots: [0.0; 3],
        len: 3,
    };

    pub fn new2(x: f64, y: f64) -> Self {
        Self {
            slots: [x, y, 0.0],
            len: 2,
        }
    }

    pub fn new3(x: f64, y: f64, z: f64) -> Self {
        Self {
            slots: [x, y, z],
            len: 3,
        }
    }

    #[inline]
    pub fn components(&self) -> &[f64] {
        &self.slots[..self.len]
    }

    pub fn render(&self) -> String {
        let [x, y, z] = self.slots.map(format_number);
        if self.len == 2 {
            format!("Vector2({x}, {y})")
        } else {
            format!("Vector3({x}, {y}, {z})")
        }
    }

    /// Keeps the stored arity when the input does not say otherwise.
    fn from_json(value: &JsonValue, fallback_len: usize) -> Self {
        let len = match value {
            JsonValue::Array(items) if items.len() >= 3 => 3,
            JsonValue::Array(items) if items.len() == 2 => 2,
            JsonValue::Object(object) if object.contains_key("z") => 3,
            JsonValue::Object(_) => 2,
            _ => fallback_len,
        };
        let slots = vec3_from_json(value).unwrap_or_default();
        Self { slots, len }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VectorProperty {
    pub id: String,
    pub value: VectorValue,
    pub default: VectorValue,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransformProperty {
    pub id: String,
    pub value: TransformValue,
    pub default: TransformValue,
    pub keys: TransformKeys,
}

/// One choice out of a fixed set.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SelectionProperty {
    pub id: String,
    pub value: String,
    pub default: String,
    pub options: Vec<String>,
}

impl SelectionProperty {
    #[inline]
    pub fn index_of(&self, choice: &str) -> Option<usize> {
        self.options.iter().position(|o| o == choice)
    }

    fn enum_name(&self) -> String {
        format!("{}Options", to_pascal_case(&self.id))
    }
}

/// Legacy path handle. Kept for scenes authored before typed references existed.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ObjectProperty {
    pub id: String,
    pub value: String,
    pub default: String,
}

/// Homogeneous list; `element` is the prototype every item is cloned from.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayProperty {
    pub id: String,
    pub element: Box<Property>,
    pub items: Vec<Property>,
    pub defaults: Vec<Property>,
}

impl ArrayProperty {
    pub fn element_kind(&self) -> PropertyKind {
        self.element.kind()
    }

    fn build_items(&self, value: &JsonValue) -> Vec<Property> {
        let values: Vec<&JsonValue> = match value {
            JsonValue::Array(items) => items.iter().collect(),
            JsonValue::Null => Vec::new(),
            single => vec![single],
        };
        values
            .into_iter()
            .map(|v| {
                let mut item = (*self.element).clone();
                item.set_value(v);
                item
            })
            .collect()
    }
}

/// Fallback for declared types nothing else recognizes.
#[derive(Clone, Debug, PartialEq)]
pub struct DefaultProperty {
    pub id: String,
    pub type_name: String,
    pub value: JsonValue,
    pub default: JsonValue,
}

// -------------------- Property --------------------

#[derive(Clone, Debug, PartialEq)]
pub enum Property {
    Raw(RawProperty),
    String(StringProperty),
    Reference(ReferenceProperty),
    Bool(BoolProperty),
    Int(IntProperty),
    Float(FloatProperty),
    Vector(VectorProperty),
    Transform(TransformProperty),
    Selection(SelectionProperty),
    Object(ObjectProperty),
    Array(ArrayProperty),
    Default(DefaultProperty),
}

impl Property {
    pub fn raw(id: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Property::Raw(RawProperty {
            id: id.into(),
            default: value.clone(),
            value,
        })
    }

    pub fn string(id: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Property::String(StringProperty {
            id: id.into(),
            default: value.clone(),
            value,
        })
    }

    pub fn reference(id: impl Into<String>, target: impl Into<String>, value: impl Into<String>) -> Self {
        Property::Reference(ReferenceProperty {
            id: id.into(),
            value: value.into(),
            default: String::new(),
            target: target.into(),
        })
    }

    pub fn bool(id: impl Into<String>, value: bool) -> Self {
        Property::Bool(BoolProperty {
            id: id.into(),
            value,
            default: value,
        })
    }

    pub fn int(id: impl Into<String>, value: f64) -> Self {
        Property::Int(IntProperty {
            id: id.into(),
            value,
            default: value,
            min: None,
            max: None,
        })
    }

    pub fn float(id: impl Into<String>, value: f64) -> Self {
        Property::Float(FloatProperty {
            id: id.into(),
            value,
            default: value,
            min: None,
            max: None,
        })
    }

    pub fn vector(id: impl Into<String>, value: VectorValue) -> Self {
        Property::Vector(VectorProperty {
            id: id.into(),
            value,
            default: value,
        })
    }

    pub fn transform(id: impl Into<String>, value: TransformValue) -> Self {
        Property::Transform(TransformProperty {
            id: id.into(),
            value,
            default: TransformValue::IDENTITY,
            keys: TransformKeys::default(),
        })
    }

    pub fn selection(id: impl Into<String>, options: Vec<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Property::Selection(SelectionProperty {
            id: id.into(),
            default: value.clone(),
            value,
            options,
        })
    }

    pub fn object(id: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Property::Object(ObjectProperty {
            id: id.into(),
            default: value.clone(),
            value,
        })
    }

    /// Array whose items are clones of `element` (its own id is reused for them).
    pub fn array(id: impl Into<String>, element: Property) -> Self {
        Property::Array(ArrayProperty {
            id: id.into(),
            element: Box::new(element),
            items: Vec::new(),
            defaults: Vec::new(),
        })
    }

    pub fn fallback(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Property::Default(DefaultProperty {
            id: id.into(),
            type_name: type_name.into(),
            value: JsonValue::Null,
            default: JsonValue::Null,
        })
    }

    pub fn with_value(mut self, value: &JsonValue) -> Self {
        self.set_value(value);
        self
    }
}

// -------------------- Accessors --------------------

impl Property {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Property::Raw(_) => PropertyKind::Raw,
            Property::String(_) => PropertyKind::String,
            Property::Reference(_) => PropertyKind::Reference,
            Property::Bool(_) => PropertyKind::Bool,
            Property::Int(_) => PropertyKind::Int,
            Property::Float(_) => PropertyKind::Float,
            Property::Vector(_) => PropertyKind::Vector,
            Property::Transform(_) => PropertyKind::Transform,
            Property::Selection(_) => PropertyKind::Selection,
            Property::Object(_) => PropertyKind::Object,
            Property::Array(_) => PropertyKind::Array,
            Property::Default(_) => PropertyKind::Default,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Property::Raw(p) => &p.id,
            Property::String(p) => &p.id,
            Property::Reference(p) => &p.id,
            Property::Bool(p) => &p.id,
            Property::Int(p) => &p.id,
            Property::Float(p) => &p.id,
            Property::Vector(p) => &p.id,
            Property::Transform(p) => &p.id,
            Property::Selection(p) => &p.id,
            Property::Object(p) => &p.id,
            Property::Array(p) => &p.id,
            Property::Default(p) => &p.id,
        }
    }

    /// Declared type tag as the factory would accept it back.
    pub fn declared_type(&self) -> String {
        match self {
            Property::Raw(_) => "raw".to_string(),
            Property::String(_) => "string".to_string(),
            Property::Reference(p) => p.target.clone(),
            Property::Bool(_) => "bool".to_string(),
            Property::Int(_) => "int".to_string(),
            Property::Float(_) => "float".to_string(),
            Property::Vector(p) if p.value.len == 2 => "vector2".to_string(),
            Property::Vector(_) => "vector3".to_string(),
            Property::Transform(_) => "transform".to_string(),
            Property::Selection(_) => "enum".to_string(),
            Property::Object(_) => "object".to_string(),
            Property::Array(p) => format!("{}[]", p.element.declared_type()),
            Property::Default(p) => p.type_name.clone(),
        }
    }

    /// True for properties the target editor stores as node paths in `node_paths`.
    pub fn is_node_path(&self) -> bool {
        match self {
            Property::Reference(_) => true,
            Property::Array(p) => p.element_kind() == PropertyKind::Reference,
            _ => false,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&ArrayProperty> {
        match self {
            Property::Array(p) => Some(p),
            _ => None,
        }
    }

    /// Current value in source-data form.
    pub fn value(&self) -> JsonValue {
        self.render_source()
    }

    /// Coerces source data into this kind's value. Mismatched input is not
    /// rejected; it degrades to the kind's zero value.
    pub fn set_value(&mut self, value: &JsonValue) {
        match self {
            Property::Raw(p) => p.value = json_text(value),
            Property::String(p) => p.value = json_text(value),
            Property::Reference(p) => p.value = json_text(value),
            Property::Bool(p) => p.value = json_bool(value),
            Property::Int(p) => p.value = json_f64(value),
            Property::Float(p) => p.value = json_f64(value),
            Property::Vector(p) => p.value = VectorValue::from_json(value, p.value.len),
            Property::Transform(p) => {
                let (transform, keys) =
                    TransformValue::from_json(value).unwrap_or((TransformValue::IDENTITY, p.keys));
                p.value = transform;
                p.keys = keys;
            }
            Property::Selection(p) => p.value = json_choice(value, &p.options),
            Property::Object(p) => p.value = json_text(value),
            Property::Array(p) => p.items = p.build_items(value),
            Property::Default(p) => p.value = value.clone(),
        }
    }

    pub fn set_default(&mut self, value: &JsonValue) {
        match self {
            Property::Raw(p) => p.default = json_text(value),
            Property::String(p) => p.default = json_text(value),
            Property::Reference(p) => p.default = json_text(value),
            Property::Bool(p) => p.default = json_bool(value),
            Property::Int(p) => p.default = json_f64(value),
            Property::Float(p) => p.default = json_f64(value),
            Property::Vector(p) => p.default = VectorValue::from_json(value, p.default.len),
            Property::Transform(p) => {
                if let Some((transform, _)) = TransformValue::from_json(value) {
                    p.default = transform;
                }
            }
            Property::Selection(p) => p.default = json_choice(value, &p.options),
            Property::Object(p) => p.default = json_text(value),
            Property::Array(p) => p.defaults = p.build_items(value),
            Property::Default(p) => p.default = value.clone(),
        }
    }
}

// -------------------- Rendering surfaces --------------------

impl Property {
    /// Script-surface declaration built from the default value. May span two lines.
    pub fn render_export(&self) -> String {
        match self {
            Property::Raw(p) if p.default.trim().is_empty() => format!("@export var {}", p.id),
            Property::Raw(p) => format!("@export var {} = {}", p.id, p.default),
            Property::String(p) => format!("@export var {}: String = {}", p.id, quote(&p.default)),
            Property::Reference(p) if p.target == UNRESOLVED_REFERENCE => {
                // assigned by the editor once the reference target is known
                format!("# @export var {}: Node", p.id)
            }
            Property::Reference(p) => format!("@export var {}: {}", p.id, p.target),
            Property::Bool(p) => format!("@export var {}: bool = {}", p.id, p.default),
            Property::Int(p) => match (p.min, p.max) {
                (Some(min), Some(max)) => format!(
                    "@export_range({}, {}) var {}: int = {}",
                    format_number(min.round()),
                    format_number(max.round()),
                    p.id,
                    format_number(p.default.round())
                ),
                _ => format!("@export var {}: int = {}", p.id, format_number(p.default.round())),
            },
            Property::Float(p) => match (p.min, p.max) {
                (Some(min), Some(max)) => format!(
                    "@export_range({}, {}) var {}: float = {}",
                    format_decimal(min),
                    format_decimal(max),
                    p.id,
                    format_decimal(p.default)
                ),
                _ => format!("@export var {}: float = {}", p.id, format_decimal(p.default)),
            },
            Property::Vector(p) => format!(
                "@export var {}: {} = {}",
                p.id,
                self.script_annotation(),
                p.default.render()
            ),
            Property::Transform(p) => {
                format!("@export var {}: Transform3D = {}", p.id, p.default.render())
            }
            Property::Selection(p) => {
                let enum_name = p.enum_name();
                let members = p
                    .options
                    .iter()
                    .map(|o| to_identifier(o))
                    .collect::<Vec<_>>()
                    .join(", ");
                let declaration = format!("enum {enum_name} {{ {members} }}");
                match p.index_of(&p.default) {
                    Some(_) => format!(
                        "{declaration}\n@export var {}: {enum_name} = {enum_name}.{}",
                        p.id,
                        to_identifier(&p.default)
                    ),
                    None => format!("{declaration}\n@export var {}: {enum_name}", p.id),
                }
            }
            Property::Object(p) => format!(
                "@export var {id}: NodePath\n@onready var {id}_node: Node = get_node_or_null({id})",
                id = p.id
            ),
            Property::Array(p) => {
                let element = p.element.script_annotation();
                if p.element_kind() == PropertyKind::Reference {
                    format!("@export var {}: Array[{element}] = []", p.id)
                } else {
                    format!(
                        "@export var {}: Array[{element}] = {}",
                        p.id,
                        render_list(&p.defaults)
                    )
                }
            }
            Property::Default(p) => format!("@export var {}: {}", p.id, p.type_name),
        }
    }

    /// Value half of a scene-document assignment, built from the current value.
    pub fn render_value(&self) -> String {
        match self {
            Property::Raw(p) if p.value.trim().is_empty() => "null".to_string(),
            Property::Raw(p) => p.value.clone(),
            Property::String(p) => quote(&p.value),
            Property::Reference(p) => format!("NodePath({})", quote(&p.value)),
            Property::Bool(p) => p.value.to_string(),
            Property::Int(p) => format_number(p.value.round()),
            Property::Float(p) => format_number(p.value),
            Property::Vector(p) => p.value.render(),
            Property::Transform(p) => p.value.render(),
            Property::Selection(p) => match p.index_of(&p.value) {
                Some(index) => index.to_string(),
                None => "null".to_string(),
            },
            Property::Object(p) => format!("NodePath({})", quote(&p.value)),
            Property::Array(p) => render_list(&p.items),
            Property::Default(p) => render_json(&p.value),
        }
    }

    /// `<id> = <value>` line of a scene document.
    pub fn render_assignment(&self) -> String {
        format!("{} = {}", self.id(), self.render_value())
    }

    /// Current value written back as authoring source data.
    pub fn render_source(&self) -> JsonValue {
        match self {
            Property::Raw(p) => JsonValue::String(p.value.clone()),
            Property::String(p) => JsonValue::String(p.value.clone()),
            Property::Reference(p) => JsonValue::String(p.value.clone()),
            Property::Bool(p) => JsonValue::Bool(p.value),
            Property::Int(p) => number_json(p.value.round()),
            Property::Float(p) => number_json(p.value),
            Property::Vector(p) => JsonValue::Array(
                p.value
                    .components()
                    .iter()
                    .map(|v| number_json(*v))
                    .collect(),
            ),
            Property::Transform(p) => p.value.to_json(p.keys),
            Property::Selection(p) => JsonValue::String(p.value.clone()),
            Property::Object(p) => JsonValue::String(p.value.clone()),
            Property::Array(p) => {
                JsonValue::Array(p.items.iter().map(Property::render_source).collect())
            }
            Property::Default(p) => p.value.clone(),
        }
    }

    /// Type annotation used on the script surface.
    pub fn script_annotation(&self) -> String {
        match self {
            Property::Raw(_) => "Variant".to_string(),
            Property::String(_) => "String".to_string(),
            Property::Reference(p) if p.target == UNRESOLVED_REFERENCE => "Node".to_string(),
            Property::Reference(p) => p.target.clone(),
            Property::Bool(_) => "bool".to_string(),
            Property::Int(_) => "int".to_string(),
            Property::Float(_) => "float".to_string(),
            Property::Vector(p) if p.value.len == 2 => "Vector2".to_string(),
            Property::Vector(_) => "Vector3".to_string(),
            Property::Transform(_) => "Transform3D".to_string(),
            Property::Selection(_) => "int".to_string(),
            Property::Object(_) => "NodePath".to_string(),
            Property::Array(p) => format!("Array[{}]", p.element.script_annotation()),
            Property::Default(p) => p.type_name.clone(),
        }
    }
}

fn render_list(items: &[Property]) -> String {
    let rendered = items
        .iter()
        .map(Property::render_value)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{rendered}]")
}

fn render_json(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n
            .as_f64()
            .map(format_number)
            .unwrap_or_else(|| n.to_string()),
        JsonValue::String(s) => quote(s),
        JsonValue::Array(items) => {
            let rendered = items.iter().map(render_json).collect::<Vec<_>>().join(", ");
            format!("[{rendered}]")
        }
        JsonValue::Object(_) => value.to_string(),
    }
}

// -------------------- Coercion --------------------

fn json_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_f64(value: &JsonValue) -> f64 {
    match value {
        JsonValue::Number(n) => n.as_f64().unwrap_or_default(),
        JsonValue::String(s) => s.trim().parse().unwrap_or_default(),
        JsonValue::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

fn json_bool(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        JsonValue::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Selections arrive either by name or by index into the option list.
fn json_choice(value: &JsonValue, options: &[String]) -> String {
    match value {
        JsonValue::Number(n) => n
            .as_u64()
            .and_then(|i| options.get(i as usize))
            .cloned()
            .unwrap_or_default(),
        other => json_text(other),
    }
}
