//! Annotation database - the canonical per-property description model.
//!
//! Mock-ups are flat JSON objects where any key may carry an inline annotation
//! after a `!` delimiter:
//!
//! ```json
//! {
//!     "ThingType": "RackMount | Cheap | Expensive",
//!     "ThingType!Required": true,
//!     "ThingType!Description": "The type of thingy."
//! }
//! ```
//!
//! [`build_database`] folds the base value and its annotations into one
//! [`PropertyRecord`]; [`database_from_json_schema`] maps the `properties` of
//! a JSON schema onto the same model.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::table::DescriptionTable;
use crate::types::{
    annotation_flag, split_enum_values, InputValue, ValueKind, ANNOTATION_DELIMITER,
    METADATA_MARKER,
};

/// Shape of a property, decided once from its example value or schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Shape {
    /// Only annotations were given for this property.
    #[default]
    Unset,
    /// A single example value.
    Scalar(Value),
    /// An array of primitives; holds the distinct element kinds in encounter order.
    ArrayOf(Vec<ValueKind>),
    /// A nested object, or an array whose first element is one.
    Complex { children: Database, collection: bool },
    /// A pipe-delimited string, or an array whose first element is one.
    Enum { values: Vec<String>, collection: bool },
    /// A JSON-schema primitive type name (`"string"`, `"integer"`, ...).
    Declared { type_name: String, collection: bool },
}

impl Shape {
    pub fn is_collection(&self) -> bool {
        match self {
            Shape::ArrayOf(_) => true,
            Shape::Complex { collection, .. }
            | Shape::Enum { collection, .. }
            | Shape::Declared { collection, .. } => *collection,
            Shape::Unset | Shape::Scalar(_) => false,
        }
    }
}

/// Everything known about one property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyRecord {
    pub shape: Shape,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub required: bool,
    pub read_write: bool,
    /// Schema this property navigates to.
    pub link: Option<String>,
    pub enum_descriptions: BTreeMap<String, String>,
    /// Annotations with no dedicated field, keyed by their name as written.
    pub extra: Map<String, Value>,
}

impl PropertyRecord {
    pub fn children(&self) -> Option<&Database> {
        match &self.shape {
            Shape::Complex { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn enum_values(&self) -> Option<&[String]> {
        match &self.shape {
            Shape::Enum { values, .. } => Some(values),
            _ => None,
        }
    }

    fn apply_annotation(&mut self, name: &str, value: &Value) {
        match name.to_ascii_lowercase().as_str() {
            "description" => self.description = Some(annotation_text(value)),
            "longdescription" => self.long_description = Some(annotation_text(value)),
            "required" => self.required = annotation_flag(value),
            "readwrite" => self.read_write = annotation_flag(value),
            "link" => self.link = Some(annotation_text(value)),
            // merged member by member; table rows applied later win
            "enumdescriptions" if value.is_object() => {
                for (member, description) in value.as_object().into_iter().flatten() {
                    if let Some(description) = description.as_str() {
                        self.enum_descriptions
                            .insert(member.clone(), description.to_string());
                    }
                }
            }
            _ => {
                self.extra.insert(name.to_string(), value.clone());
            }
        }
    }

    fn apply_table_row(&mut self, columns: &[String]) {
        if let Some(description) = columns.first() {
            self.description = Some(description.clone());
        }
        if let Some(long_description) = columns.get(1) {
            self.long_description = Some(long_description.clone());
        }
        if let Shape::Enum { values, .. } = &self.shape {
            let member_descriptions = columns.iter().skip(2);
            for (member, description) in values.iter().zip(member_descriptions) {
                self.enum_descriptions
                    .insert(member.clone(), description.clone());
            }
        }
    }
}

/// Ordered collection of property records, keyed by property name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    entries: Vec<(String, PropertyRecord)>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&PropertyRecord> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, record)| record)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Record for `name`, created empty at the end if absent.
    pub fn entry(&mut self, name: &str) -> &mut PropertyRecord {
        let index = match self.entries.iter().position(|(key, _)| key == name) {
            Some(index) => index,
            None => {
                self.entries
                    .push((name.to_string(), PropertyRecord::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    pub fn insert(&mut self, name: impl Into<String>, record: PropertyRecord) {
        let name = name.into();
        *self.entry(&name) = record;
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyRecord> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyRecord)> {
        self.entries
            .iter()
            .map(|(name, record)| (name.as_str(), record))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the annotation database for one mock-up object.
///
/// Keys containing `@` and keys with an empty property name are skipped.
/// Table rows are applied last and override inline descriptions.
pub fn build_database(annotated: &Map<String, Value>, table: &DescriptionTable) -> Database {
    let mut database = Database::new();

    for (key, value) in annotated {
        let (property, annotation) = match key.split_once(ANNOTATION_DELIMITER) {
            Some((property, annotation)) => (property, Some(annotation)),
            None => (key.as_str(), None),
        };

        if key.contains(METADATA_MARKER) || property.is_empty() {
            continue;
        }

        match annotation {
            None => {
                let shape = shape_of(property, value, table);
                database.entry(property).shape = shape;
            }
            Some(annotation) => database.entry(property).apply_annotation(annotation, value),
        }
    }

    for (property, record) in database.entries.iter_mut() {
        if let Some(columns) = table.get(property) {
            debug!(property = %property, "applying description table row");
            record.apply_table_row(columns);
        }
    }

    database
}

fn shape_of(property: &str, value: &Value, table: &DescriptionTable) -> Shape {
    match InputValue::classify(value) {
        InputValue::Sequence(items) => {
            let mut kinds: Vec<ValueKind> = Vec::new();
            for kind in items.iter().map(ValueKind::of) {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            // Only the first element decides what the collection holds.
            match items.first().map(InputValue::classify) {
                Some(InputValue::Mapping(map)) => Shape::Complex {
                    children: build_database(map, &table.scoped(property)),
                    collection: true,
                },
                Some(InputValue::EnumString(values)) => Shape::Enum {
                    values,
                    collection: true,
                },
                _ => Shape::ArrayOf(kinds),
            }
        }
        InputValue::Mapping(map) => Shape::Complex {
            children: build_database(map, &table.scoped(property)),
            collection: false,
        },
        InputValue::EnumString(values) => Shape::Enum {
            values,
            collection: false,
        },
        InputValue::Scalar(value) => Shape::Scalar(value.clone()),
    }
}

fn annotation_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Map the `properties` object of a JSON schema onto the annotation database.
///
/// `required` is the enclosing object's `required` array.
pub fn database_from_json_schema(properties: &Map<String, Value>, required: &[String]) -> Database {
    let mut database = Database::new();

    for (name, schema) in properties {
        if name.contains(METADATA_MARKER) || name.is_empty() {
            continue;
        }

        let mut record = PropertyRecord {
            required: required.iter().any(|r| r == name),
            ..PropertyRecord::default()
        };

        if let Some(schema) = schema.as_object() {
            record.shape = schema_shape(schema, false);
            record.description = schema
                .get("description")
                .and_then(Value::as_str)
                .map(String::from);
            record.long_description = schema
                .get("longDescription")
                .and_then(Value::as_str)
                .map(String::from);
            if let Some(readonly) = schema.get("readonly").and_then(Value::as_bool) {
                record.read_write = !readonly;
            }
        }

        database.insert(name.clone(), record);
    }

    database
}

fn schema_shape(schema: &Map<String, Value>, collection: bool) -> Shape {
    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        return Shape::Complex {
            children: database_from_json_schema(properties, &required_names(schema)),
            collection,
        };
    }

    if let Some(members) = schema.get("enum").and_then(Value::as_array) {
        let values = members
            .iter()
            .filter_map(|m| match m {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect();
        return Shape::Enum { values, collection };
    }

    let type_name = declared_type(schema);
    if type_name.as_deref() == Some("array") && !collection {
        return match schema.get("items").and_then(Value::as_object) {
            Some(items) => schema_shape(items, true),
            None => Shape::Declared {
                type_name: String::new(),
                collection: true,
            },
        };
    }

    match type_name {
        Some(type_name) => Shape::Declared {
            type_name,
            collection,
        },
        None if collection => Shape::Declared {
            type_name: String::new(),
            collection,
        },
        None => Shape::Unset,
    }
}

/// The `type` keyword, taking the first non-null entry of a type union.
fn declared_type(schema: &Map<String, Value>) -> Option<String> {
    match schema.get("type")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .map(String::from),
        _ => None,
    }
}

pub(crate) fn required_names(schema: &Map<String, Value>) -> Vec<String> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
