//! CSDL document construction from the annotation database.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::database::{
    build_database, database_from_json_schema, required_names, Database, PropertyRecord, Shape,
};
use crate::element::Element;
use crate::error::ConvertError;
use crate::fragment::{
    create_complex_type, create_enum_type, create_navigation, create_property, create_reference,
    resolve_type, scaffold_references, Descriptors,
};
use crate::types::{collection_of, json_type_name, ConvertOptions, RESOURCE_TYPES};
use crate::validator::check_document;

pub const EDMX_NAMESPACE: &str = "http://docs.oasis-open.org/odata/ns/edmx";
pub const EDM_NAMESPACE: &str = "http://docs.oasis-open.org/odata/ns/edm";

/// Position of the first imported reference among the root's children.
/// The scaffold's three references always come first.
const IMPORT_POSITION: usize = 3;

/// Which kind of document the database was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Annotated mock-up, named by `@odata.type`.
    MockUp,
    /// JSON schema (has `$schema`), named by `title`.
    JsonSchema,
}

fn versioned_type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"#([A-Za-z]*\.v\d+_\d+_\d+)").expect("versioned type pattern is valid")
    })
}

/// Derive the schema name from a type identifier.
///
/// `#Thingy.v1_0_0.Thingy` becomes `Thingy.v1_0_0`. Identifiers that don't
/// match are returned verbatim.
pub fn schema_name_from_type(identifier: &str) -> String {
    match versioned_type_pattern().captures(identifier) {
        Some(captures) => captures[1].to_string(),
        None => identifier.to_string(),
    }
}

/// A CSDL file under construction: the canonical database and the schema name.
#[derive(Debug, Clone)]
pub struct CsdlFile {
    name: String,
    mode: InputMode,
    database: Database,
}

impl CsdlFile {
    /// Select the input mode, build the annotation database and derive the name.
    ///
    /// Properties listed in `options.inherited` are dropped from the top level.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::InvalidDocument` if the document is not an object
    /// or lacks its type identifier (`@odata.type` or `title`).
    pub fn new(document: &Value, options: &ConvertOptions) -> Result<Self, ConvertError> {
        let map = document
            .as_object()
            .ok_or_else(|| ConvertError::InvalidDocument {
                message: format!(
                    "expected a JSON object at the top level, got {}",
                    json_type_name(document)
                ),
            })?;

        let mode = if map.contains_key("$schema") {
            InputMode::JsonSchema
        } else {
            InputMode::MockUp
        };
        check_document(document, mode)?;

        let (identifier, mut database) = match mode {
            InputMode::JsonSchema => (
                string_field(map, "title")?,
                database_from_json_schema(
                    map.get("properties")
                        .and_then(Value::as_object)
                        .ok_or_else(|| ConvertError::InvalidDocument {
                            message: "JSON schema has no properties object".into(),
                        })?,
                    &required_names(map),
                ),
            ),
            InputMode::MockUp => (
                string_field(map, "@odata.type")?,
                build_database(map, &options.descriptions),
            ),
        };

        for inherited in &options.inherited {
            if database.remove(inherited).is_some() {
                debug!(property = %inherited, "dropped inherited property");
            }
        }

        let name = schema_name_from_type(identifier);
        info!(schema = %name, mode = ?mode, properties = database.len(), "prepared annotation database");

        Ok(Self {
            name,
            mode,
            database,
        })
    }

    /// The schema name, e.g. `Thingy.v1_0_0`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Walk the database and produce the CSDL tree.
    pub fn build(&self) -> CsdlDocument {
        let (references, imported) = scaffold_references();
        let mut builder = TreeBuilder {
            schema_name: &self.name,
            references,
            imported: imported.into_iter().map(String::from).collect(),
            types: Vec::new(),
        };

        let base = self.name.split('.').next().unwrap_or(&self.name);
        let mut entity = Element::new("EntityType")
            .with_attr("Name", base)
            .with_attr("BaseType", format!("{}.{}", base, base));

        for (name, record) in self.database.iter() {
            builder.build_node(&mut entity, name, record);
        }

        CsdlDocument {
            name: self.name.clone(),
            references: builder.references,
            entity,
            types: builder.types,
        }
    }
}

/// Convert a mock-up or JSON schema into a CSDL document.
///
/// # Errors
///
/// Returns `ConvertError::InvalidDocument` if the input lacks what its mode requires.
pub fn convert(document: &Value, options: &ConvertOptions) -> Result<CsdlDocument, ConvertError> {
    Ok(CsdlFile::new(document, options)?.build())
}

fn string_field<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a str, ConvertError> {
    map.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ConvertError::InvalidDocument {
            message: format!("missing string field {}", key),
        })
}

struct TreeBuilder<'a> {
    schema_name: &'a str,
    references: Vec<Element>,
    imported: BTreeSet<String>,
    types: Vec<Element>,
}

impl TreeBuilder<'_> {
    fn build_node(&mut self, owner: &mut Element, name: &str, record: &PropertyRecord) {
        if RESOURCE_TYPES.contains(&name) {
            owner.push(create_property(
                name,
                &format!("Resource.{}", name),
                Descriptors::default(),
            ));
            return;
        }

        let descriptors = Descriptors::of(record);
        let collection = record.shape.is_collection();

        match &record.shape {
            Shape::Complex { children, .. } => {
                if let Some(link) = &record.link {
                    self.import(link);
                    owner.push(create_navigation(name, link, descriptors, collection));
                    return;
                }

                owner.push(create_property(
                    name,
                    &self.qualified(name, collection),
                    descriptors,
                ));
                let mut complex = create_complex_type(name, None, descriptors);
                for (child_name, child) in children.iter() {
                    self.build_node(&mut complex, child_name, child);
                }
                self.types.push(complex);
            }
            Shape::Enum { values, .. } => {
                owner.push(create_property(
                    name,
                    &self.qualified(name, collection),
                    descriptors,
                ));
                self.types
                    .push(create_enum_type(name, values, &record.enum_descriptions));
            }
            shape => {
                let type_ref = resolve_type(shape);
                debug!(property = %name, type_ref = %type_ref, "primitive property");
                owner.push(create_property(name, &type_ref, descriptors));
            }
        }
    }

    /// Type reference for a type defined in this schema.
    fn qualified(&self, name: &str, collection: bool) -> String {
        let type_ref = format!("{}.{}", self.schema_name, name);
        if collection {
            collection_of(&type_ref)
        } else {
            type_ref
        }
    }

    /// Add a reference to `schema_name` unless one was already added.
    fn import(&mut self, schema_name: &str) {
        if !self.imported.insert(schema_name.to_string()) {
            return;
        }
        info!(target_schema = %schema_name, "adding schema reference");
        let position = IMPORT_POSITION.min(self.references.len());
        self.references
            .insert(position, create_reference(schema_name));
    }
}

/// A complete CSDL document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsdlDocument {
    /// Schema name; also the `Namespace` of the generated schema.
    pub name: String,
    /// `edmx:Reference` elements in document order.
    pub references: Vec<Element>,
    /// The resource's `EntityType`.
    pub entity: Element,
    /// Complex and enum types, siblings of the entity type.
    pub types: Vec<Element>,
}

impl CsdlDocument {
    /// Complex or enum type with the given name.
    pub fn find_type(&self, name: &str) -> Option<&Element> {
        self.types.iter().find(|t| t.attr("Name") == Some(name))
    }

    /// File name the document is written to.
    pub fn file_name(&self) -> String {
        format!("{}.xml", self.name)
    }

    /// Assemble the full `edmx:Edmx` tree.
    pub fn to_element(&self) -> Element {
        let mut schema = Element::new("Schema")
            .with_attr("xmlns", EDM_NAMESPACE)
            .with_attr("Namespace", &self.name)
            .with_child(self.entity.clone());
        schema.children.extend(self.types.iter().cloned());

        let mut root = Element::new("edmx:Edmx")
            .with_attr("xmlns:edmx", EDMX_NAMESPACE)
            .with_attr("Version", "4.0");
        root.children.extend(self.references.iter().cloned());
        root.push(Element::new("edmx:DataServices").with_child(schema));
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn thingy() -> Value {
        json!({
            "@odata.id": "/redfish/v1/Thingy/1",
            "@odata.type": "#Thingy.v1_0_0.Thingy",
            "Id": "1",
            "Name": "Big Thingy",
            "ThingType": "RackMount | Cheap | Expensive | Obsolete | Trendy",
            "ThingType!Required": true,
            "ThingType!Description": "The type of thingy that this thingy is - really...",
            "IndicatorLED": "Off | Lit | Blinking",
            "IndicatorLED!ReadWrite": true,
            "Status": { "State": "Enabled", "Health": "OK" },
            "ThingContainer": {
                "ThingKnob": "Twist",
                "ThingKnobCount": 5,
                "ThingButton": { "ButtonColor": "Red" }
            },
            "Thermal": { "@odata.id": "/redfish/v1/Chassis/1/Thermal" },
            "Thermal!Link": "Thermal"
        })
    }

    #[test]
    fn schema_name_derivation() {
        assert_eq!(schema_name_from_type("#Thingy.v1_0_0.Thingy"), "Thingy.v1_0_0");
        assert_eq!(schema_name_from_type("#Chassis.v1_10_2.Chassis"), "Chassis.v1_10_2");
        assert_eq!(schema_name_from_type("Unversioned"), "Unversioned");
        assert_eq!(schema_name_from_type("#Thingy.Thingy"), "#Thingy.Thingy");
        assert_eq!(
            schema_name_from_type("Thingy.v1_0_0.Thingy"),
            "Thingy.v1_0_0.Thingy"
        );
    }

    #[test]
    fn entity_named_after_base() {
        let file = CsdlFile::new(&thingy(), &ConvertOptions::new()).unwrap();
        assert_eq!(file.name(), "Thingy.v1_0_0");
        assert_eq!(file.mode(), InputMode::MockUp);

        let doc = file.build();
        assert_eq!(doc.entity.name, "EntityType");
        assert_eq!(doc.entity.attr("Name"), Some("Thingy"));
        assert_eq!(doc.entity.attr("BaseType"), Some("Thingy.Thingy"));
    }

    #[test]
    fn inherited_properties_removed() {
        let options = ConvertOptions::new().inherited(["Id", "Name", "Missing"]);
        let file = CsdlFile::new(&thingy(), &options).unwrap();
        assert!(!file.database().contains("Id"));
        assert!(!file.database().contains("Name"));
        assert!(file.database().contains("ThingType"));
    }

    #[test]
    fn shared_resource_properties_not_expanded() {
        let doc = CsdlFile::new(&thingy(), &ConvertOptions::new()).unwrap().build();

        let status = doc.entity.named("Status").unwrap();
        assert_eq!(status.attr("Type"), Some("Resource.Status"));
        assert!(doc.find_type("Status").is_none());

        let led = doc.entity.named("IndicatorLED").unwrap();
        assert_eq!(led.attr("Type"), Some("Resource.IndicatorLED"));
        assert!(doc.find_type("IndicatorLED").is_none());
    }

    #[test]
    fn enum_property_and_type() {
        let doc = CsdlFile::new(&thingy(), &ConvertOptions::new()).unwrap().build();

        let property = doc.entity.named("ThingType").unwrap();
        assert_eq!(property.attr("Type"), Some("Thingy.v1_0_0.ThingType"));
        assert!(property.annotation("Redfish.Required").is_some());

        let enum_type = doc.find_type("ThingType").unwrap();
        assert_eq!(enum_type.name, "EnumType");
        assert_eq!(enum_type.find_all("Member").count(), 5);
    }

    #[test]
    fn complex_types_are_schema_siblings() {
        let doc = CsdlFile::new(&thingy(), &ConvertOptions::new()).unwrap().build();

        let property = doc.entity.named("ThingContainer").unwrap();
        assert_eq!(property.attr("Type"), Some("Thingy.v1_0_0.ThingContainer"));

        let container = doc.find_type("ThingContainer").unwrap();
        assert_eq!(container.name, "ComplexType");
        assert_eq!(
            container.named("ThingKnobCount").and_then(|p| p.attr("Type")),
            Some("Edm.Int64")
        );
        assert_eq!(
            container.named("ThingButton").and_then(|p| p.attr("Type")),
            Some("Thingy.v1_0_0.ThingButton")
        );

        // nested types are appended before the type that contains them
        let order: Vec<_> = doc.types.iter().filter_map(|t| t.attr("Name")).collect();
        let button = order.iter().position(|n| *n == "ThingButton").unwrap();
        let outer = order.iter().position(|n| *n == "ThingContainer").unwrap();
        assert!(button < outer);
        assert!(doc.entity.find("ComplexType").is_none());
    }

    #[test]
    fn linked_object_becomes_navigation() {
        let doc = CsdlFile::new(&thingy(), &ConvertOptions::new()).unwrap().build();

        let thermal = doc.entity.named("Thermal").unwrap();
        assert_eq!(thermal.name, "NavigationProperty");
        assert_eq!(thermal.attr("Type"), Some("Thermal.Thermal"));
        assert!(doc.find_type("Thermal").is_none());

        assert_eq!(doc.references.len(), 4);
        assert_eq!(
            doc.references[3].attr("Uri"),
            Some("http://redfish.dmtf.org/schemas/v1/Thermal_v1.xml")
        );
    }

    #[test]
    fn reference_inserted_once_per_target() {
        let mockup = json!({
            "@odata.type": "#Thingy.v1_0_0.Thingy",
            "Fans": [{ "@odata.id": "/a" }],
            "Fans!Link": "Thermal",
            "Temperatures": [{ "@odata.id": "/b" }],
            "Temperatures!Link": "Thermal",
            "Slots": { "@odata.id": "/c" },
            "Slots!Link": "PCIeDevice"
        });
        let doc = CsdlFile::new(&mockup, &ConvertOptions::new()).unwrap().build();

        let fans = doc.entity.named("Fans").unwrap();
        assert_eq!(fans.attr("Type"), Some("Collection(Thermal.Thermal)"));
        assert!(fans.annotation("OData.AutoExpandReferences").is_some());

        let uris: Vec<_> = doc.references.iter().filter_map(|r| r.attr("Uri")).collect();
        assert_eq!(uris.len(), 5);
        assert_eq!(uris.iter().filter(|u| u.ends_with("/Thermal_v1.xml")).count(), 1);
        // each import goes to the same fixed position, after the scaffold
        assert!(uris[3].ends_with("/PCIeDevice_v1.xml"));
        assert!(uris[4].ends_with("/Thermal_v1.xml"));
    }

    #[test]
    fn build_is_repeatable() {
        let file = CsdlFile::new(&thingy(), &ConvertOptions::new()).unwrap();
        assert_eq!(file.build(), file.build());
    }

    #[test]
    fn json_schema_mode() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "#Widget.v1_2_0.Widget",
            "type": "object",
            "properties": {
                "@odata.id": { "type": "string" },
                "Id": { "type": "string" },
                "Size": { "type": "integer", "readonly": false },
                "Mode": { "type": "string", "enum": ["On", "Off"] }
            }
        });
        let file = CsdlFile::new(&schema, &ConvertOptions::new().inherited(["Id"])).unwrap();
        assert_eq!(file.mode(), InputMode::JsonSchema);
        assert_eq!(file.name(), "Widget.v1_2_0");
        assert_eq!(file.database().names().collect::<Vec<_>>(), vec!["Size", "Mode"]);

        let doc = file.build();
        let size = doc.entity.named("Size").unwrap();
        assert_eq!(size.attr("Type"), Some("Edm.Int64"));
        assert_eq!(
            size.annotation("OData.Permissions").and_then(|a| a.attr("EnumMember")),
            Some("OData.Permission/ReadWrite")
        );
        assert!(doc.find_type("Mode").is_some());
    }

    #[test]
    fn missing_type_identifier_is_an_error() {
        let result = CsdlFile::new(&json!({ "Id": "1" }), &ConvertOptions::new());
        assert!(matches!(result, Err(ConvertError::InvalidDocument { .. })));

        let result = CsdlFile::new(&json!(["not", "an", "object"]), &ConvertOptions::new());
        assert!(matches!(result, Err(ConvertError::InvalidDocument { .. })));
    }

    #[test]
    fn to_element_layout() {
        let doc = CsdlFile::new(&thingy(), &ConvertOptions::new()).unwrap().build();
        let root = doc.to_element();

        assert_eq!(root.name, "edmx:Edmx");
        assert_eq!(root.attr("Version"), Some("4.0"));
        assert_eq!(root.find_all("edmx:Reference").count(), 4);

        let schema = root
            .find("edmx:DataServices")
            .and_then(|d| d.find("Schema"))
            .unwrap();
        assert_eq!(schema.attr("Namespace"), Some("Thingy.v1_0_0"));
        assert_eq!(schema.children[0].name, "EntityType");
        assert_eq!(schema.children.len(), 1 + doc.types.len());
    }
}
