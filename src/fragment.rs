//! Schema fragment constructors.
//!
//! Each function returns one self-contained CSDL element. None of them touch
//! the document being built; [`crate::CsdlFile`] decides where they go.

use std::collections::BTreeMap;

use crate::database::{PropertyRecord, Shape};
use crate::element::Element;
use crate::types::{collection_of, edm_type_for_schema_type, ValueKind, PLACEHOLDER};

pub const TERM_PERMISSIONS: &str = "OData.Permissions";
pub const TERM_DESCRIPTION: &str = "OData.Description";
pub const TERM_LONG_DESCRIPTION: &str = "OData.LongDescription";
pub const TERM_REQUIRED: &str = "Redfish.Required";
pub const TERM_AUTO_EXPAND: &str = "OData.AutoExpandReferences";
pub const TERM_ADDITIONAL_PROPERTIES: &str = "OData.AdditionalProperties";

pub const PERMISSION_READ: &str = "OData.Permission/Read";
pub const PERMISSION_READ_WRITE: &str = "OData.Permission/ReadWrite";

/// Where published Redfish CSDL documents live.
pub const SCHEMA_BASE_URI: &str = "http://redfish.dmtf.org/schemas/v1";

/// Descriptive fields shared by property and type fragments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Descriptors<'a> {
    pub description: Option<&'a str>,
    pub long_description: Option<&'a str>,
    pub read_write: bool,
    pub required: bool,
}

impl<'a> Descriptors<'a> {
    /// Descriptors carried by a database record.
    pub fn of(record: &'a PropertyRecord) -> Self {
        Self {
            description: record.description.as_deref(),
            long_description: record.long_description.as_deref(),
            read_write: record.read_write,
            required: record.required,
        }
    }

    pub fn description(mut self, description: &'a str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn long_description(mut self, long_description: &'a str) -> Self {
        self.long_description = Some(long_description);
        self
    }

    pub fn read_write(mut self, read_write: bool) -> Self {
        self.read_write = read_write;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

fn annotation(term: &str) -> Element {
    Element::new("Annotation").with_attr("Term", term)
}

fn string_annotation(term: &str, value: &str) -> Element {
    annotation(term).with_attr("String", value)
}

fn permissions(read_write: bool) -> Element {
    let permission = if read_write {
        PERMISSION_READ_WRITE
    } else {
        PERMISSION_READ
    };
    annotation(TERM_PERMISSIONS).with_attr("EnumMember", permission)
}

/// A `Property` element.
pub fn create_property(name: &str, type_ref: &str, descriptors: Descriptors<'_>) -> Element {
    let mut property = Element::new("Property")
        .with_attr("Name", name)
        .with_attr("Type", type_ref)
        .with_attr("Nullable", "false")
        .with_child(permissions(descriptors.read_write))
        .with_child(string_annotation(
            TERM_DESCRIPTION,
            descriptors.description.unwrap_or(PLACEHOLDER),
        ))
        .with_child(string_annotation(
            TERM_LONG_DESCRIPTION,
            descriptors.long_description.unwrap_or(PLACEHOLDER),
        ));
    if descriptors.required {
        property.push(annotation(TERM_REQUIRED));
    }
    property
}

/// A `NavigationProperty` pointing at the entity type of `schema_name`.
///
/// Navigation properties are always read-only; `read_write` and `required`
/// in `descriptors` are ignored.
pub fn create_navigation(
    name: &str,
    schema_name: &str,
    descriptors: Descriptors<'_>,
    collection: bool,
) -> Element {
    let target = format!("{}.{}", schema_name, schema_name);
    let type_ref = if collection {
        collection_of(&target)
    } else {
        target
    };
    let description = descriptors
        .description
        .map(String::from)
        .unwrap_or_else(|| format!("A link to {}", name));
    let long_description = descriptors
        .long_description
        .map(String::from)
        .unwrap_or_else(|| {
            format!(
                "This property shall be a link to a resource collection of type {}.",
                name
            )
        });

    let mut navigation = Element::new("NavigationProperty")
        .with_attr("Name", name)
        .with_attr("Type", type_ref)
        .with_attr("Nullable", "false")
        .with_child(permissions(false))
        .with_child(string_annotation(TERM_DESCRIPTION, &description))
        .with_child(string_annotation(TERM_LONG_DESCRIPTION, &long_description));
    if collection {
        navigation.push(annotation(TERM_AUTO_EXPAND));
    }
    navigation
}

/// A `ComplexType` element with no properties yet.
pub fn create_complex_type(
    name: &str,
    base_type: Option<&str>,
    descriptors: Descriptors<'_>,
) -> Element {
    let mut complex = Element::new("ComplexType").with_attr("Name", name);
    if let Some(base_type) = base_type {
        complex.set_attr("BaseType", base_type);
    }
    complex
        .with_child(string_annotation(
            TERM_DESCRIPTION,
            descriptors.description.unwrap_or(PLACEHOLDER),
        ))
        .with_child(string_annotation(
            TERM_LONG_DESCRIPTION,
            descriptors.long_description.unwrap_or(PLACEHOLDER),
        ))
        .with_child(annotation(TERM_ADDITIONAL_PROPERTIES).with_attr("Bool", "false"))
}

/// An `EnumType` with one `Member` per value, in order.
pub fn create_enum_type(
    name: &str,
    values: &[String],
    descriptions: &BTreeMap<String, String>,
) -> Element {
    let mut enum_type = Element::new("EnumType").with_attr("Name", name);
    for value in values {
        let description = descriptions
            .get(value)
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER);
        enum_type.push(
            Element::new("Member")
                .with_attr("Name", value)
                .with_child(string_annotation(TERM_DESCRIPTION, description)),
        );
    }
    enum_type
}

/// An `edmx:Reference` importing the published document of `schema_name`.
pub fn create_reference(schema_name: &str) -> Element {
    Element::new("edmx:Reference")
        .with_attr("Uri", format!("{}/{}_v1.xml", SCHEMA_BASE_URI, schema_name))
        .with_child(Element::new("edmx:Include").with_attr("Namespace", schema_name))
}

/// The references every generated document starts with, and the schema
/// names they import.
pub fn scaffold_references() -> (Vec<Element>, Vec<&'static str>) {
    let references = vec![
        Element::new("edmx:Reference")
            .with_attr(
                "Uri",
                "http://docs.oasis-open.org/odata/odata/v4.0/errata03/csd01/complete/vocabularies/Org.OData.Core.V1.xml",
            )
            .with_child(
                Element::new("edmx:Include")
                    .with_attr("Namespace", "Org.OData.Core.V1")
                    .with_attr("Alias", "OData"),
            ),
        Element::new("edmx:Reference")
            .with_attr("Uri", format!("{}/RedfishExtensions_v1.xml", SCHEMA_BASE_URI))
            .with_child(
                Element::new("edmx:Include")
                    .with_attr("Namespace", "RedfishExtensions.v1_0_0")
                    .with_attr("Alias", "Redfish"),
            ),
        Element::new("edmx:Reference")
            .with_attr("Uri", format!("{}/Resource_v1.xml", SCHEMA_BASE_URI))
            .with_child(Element::new("edmx:Include").with_attr("Namespace", "Resource"))
            .with_child(Element::new("edmx:Include").with_attr("Namespace", "Resource.v1_0_0")),
    ];
    (references, vec!["Org.OData.Core.V1", "RedfishExtensions", "Resource"])
}

/// Type reference for a primitive-valued record.
///
/// Unmapped kinds resolve to the `TBD` placeholder. Arrays use their first
/// recorded element kind.
pub fn resolve_type(shape: &Shape) -> String {
    match shape {
        Shape::Scalar(value) => ValueKind::of(value)
            .edm_type()
            .unwrap_or(PLACEHOLDER)
            .to_string(),
        Shape::ArrayOf(kinds) => collection_of(
            kinds
                .first()
                .and_then(ValueKind::edm_type)
                .unwrap_or(PLACEHOLDER),
        ),
        Shape::Declared {
            type_name,
            collection,
        } => {
            let edm = edm_type_for_schema_type(type_name).unwrap_or(PLACEHOLDER);
            if *collection {
                collection_of(edm)
            } else {
                edm.to_string()
            }
        }
        Shape::Unset | Shape::Complex { .. } | Shape::Enum { .. } => PLACEHOLDER.to_string(),
    }
}
