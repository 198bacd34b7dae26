//! Core types for CSDL conversion: value classification and the type mapper.

use serde::de::value::StrDeserializer;
use serde::de::IntoDeserializer;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::table::DescriptionTable;

/// Delimiter separating a property name from an inline annotation name
/// (`"ThingType!Description"`).
pub const ANNOTATION_DELIMITER: char = '!';

/// Keys containing this marker carry protocol metadata (`@odata.id`,
/// `@odata.type`) and are never turned into properties.
pub const METADATA_MARKER: char = '@';

/// Separator between enum members in a mock-up string value.
pub const ENUM_DELIMITER: char = '|';

/// Placeholder type and description for anything that could not be resolved.
pub const PLACEHOLDER: &str = "TBD";

/// Properties defined by the shared `Resource` schema rather than locally.
pub const RESOURCE_TYPES: &[&str] = &[
    "Id",
    "Description",
    "Name",
    "UUID",
    "Links",
    "Oem",
    "OemObject",
    "ItemOrCollection",
    "Item",
    "ReferenceableMember",
    "Resource",
    "ResourceCollection",
    "Status",
    "State",
    "Health",
    "ResetType",
    "Identifier",
    "Location",
    "IndicatorLED",
    "PowerState",
];

/// Properties inherited from the `Resource` base type by default.
pub const RESOURCE_PROPERTIES: &[&str] = &["Description", "Name", "Id"];

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Runtime kind of a mock-up value, used for type sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Classify a JSON value.
    ///
    /// Numbers that fit an `i64` or `u64` are integers; everything else is a float.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => ValueKind::Integer,
            Value::Number(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// CSDL primitive for this kind, if it has one.
    pub fn edm_type(&self) -> Option<&'static str> {
        match self {
            ValueKind::String => Some("Edm.String"),
            ValueKind::Float => Some("Edm.Decimal"),
            ValueKind::Boolean => Some("Edm.Boolean"),
            ValueKind::Integer => Some("Edm.Int64"),
            _ => None,
        }
    }
}

/// A JSON-schema `type` keyword value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

impl SchemaType {
    /// Parse a `type` keyword value. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        let deserializer: StrDeserializer<'_, serde::de::value::Error> = name.into_deserializer();
        Self::deserialize(deserializer).ok()
    }

    /// CSDL primitive for this type, if it has one.
    pub fn edm_type(&self) -> Option<&'static str> {
        match self {
            SchemaType::String => Some("Edm.String"),
            SchemaType::Number => Some("Edm.Decimal"),
            SchemaType::Boolean => Some("Edm.Boolean"),
            SchemaType::Integer => Some("Edm.Int64"),
            _ => None,
        }
    }
}

/// Map a JSON-schema primitive type name to a CSDL primitive.
pub fn edm_type_for_schema_type(name: &str) -> Option<&'static str> {
    SchemaType::parse(name).and_then(|t| t.edm_type())
}

/// Wrap a type reference as a CSDL collection.
pub fn collection_of(type_ref: &str) -> String {
    format!("Collection({})", type_ref)
}

/// Options for one conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Top-level properties supplied by the base type; these are not declared.
    pub inherited: Vec<String>,
    /// Supplemental descriptions, applied over inline annotations.
    pub descriptions: DescriptionTable,
}

impl ConvertOptions {
    /// Options with no inherited properties and an empty description table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options inheriting [`RESOURCE_PROPERTIES`] from `Resource`.
    pub fn resource() -> Self {
        Self::new().inherited(RESOURCE_PROPERTIES.iter().copied())
    }

    /// Replace the inherited property list.
    pub fn inherited<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inherited = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the description table.
    pub fn descriptions(mut self, descriptions: DescriptionTable) -> Self {
        self.descriptions = descriptions;
        self
    }
}

/// A mock-up value after shape classification.
///
/// Every base assignment in the database builder goes through
/// [`InputValue::classify`] exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue<'a> {
    Scalar(&'a Value),
    Sequence(&'a [Value]),
    Mapping(&'a Map<String, Value>),
    EnumString(Vec<String>),
}

impl<'a> InputValue<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => InputValue::Sequence(items),
            Value::Object(map) => InputValue::Mapping(map),
            Value::String(s) if s.contains(ENUM_DELIMITER) => {
                InputValue::EnumString(split_enum_values(s))
            }
            other => InputValue::Scalar(other),
        }
    }
}

/// Split a pipe-delimited enum string into trimmed, non-empty members.
pub fn split_enum_values(s: &str) -> Vec<String> {
    s.split(ENUM_DELIMITER)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

/// Interpret an annotation value as a flag.
///
/// Booleans are taken as-is, strings accept `true`/`yes`/`1` in any case,
/// non-zero numbers are true. Anything else is false.
pub fn annotation_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}
