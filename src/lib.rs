//! CSDL Creator
//!
//! Builds a mostly complete CSDL schema document from an annotated JSON
//! mock-up of a resource, or from a JSON schema.
//!
//! # Example
//!
//! ```
//! use csdl_creator::{convert, render, ConvertOptions};
//! use serde_json::json;
//!
//! let mockup = json!({
//!     "@odata.type": "#Thingy.v1_0_0.Thingy",
//!     "Id": "1",
//!     "ThingType": "RackMount | Cheap | Expensive",
//!     "ThingType!Required": true,
//!     "ThingKnobCount": 5
//! });
//!
//! let document = convert(&mockup, &ConvertOptions::resource()).unwrap();
//! assert_eq!(document.name, "Thingy.v1_0_0");
//!
//! // "Id" comes from the Resource base type and is not redeclared
//! assert!(document.entity.named("Id").is_none());
//! assert_eq!(
//!     document.entity.named("ThingKnobCount").and_then(|p| p.attr("Type")),
//!     Some("Edm.Int64")
//! );
//! assert!(document.find_type("ThingType").is_some());
//!
//! let xml = render(&document).unwrap();
//! assert!(xml.contains(r#"<EntityType Name="Thingy" BaseType="Thingy.Thingy">"#));
//! ```
//!
//! # Annotations
//!
//! | Key | Effect |
//! |-----|--------|
//! | `"Prop": "A \| B"` | Enum type `Prop` with members `A`, `B` |
//! | `"Prop!Description"` | `OData.Description` |
//! | `"Prop!LongDescription"` | `OData.LongDescription` |
//! | `"Prop!Required": true` | `Redfish.Required` |
//! | `"Prop!ReadWrite": true` | `OData.Permission/ReadWrite` |
//! | `"Prop!Link": "Schema"` | Navigation property to `Schema.Schema` |
//! | `"Prop!enumDescriptions": {"A": "..."}` | `OData.Description` on enum member `A` |
//!
//! Keys containing `@` are protocol metadata and are ignored.

mod csdl;
mod database;
mod element;
mod error;
mod fragment;
mod loader;
mod table;
mod types;
mod validator;
mod writer;

pub use csdl::{convert, schema_name_from_type, CsdlDocument, CsdlFile, InputMode};
pub use database::{build_database, database_from_json_schema, Database, PropertyRecord, Shape};
pub use element::Element;
pub use error::ConvertError;
pub use fragment::{
    create_complex_type, create_enum_type, create_navigation, create_property, create_reference,
    resolve_type, Descriptors,
};
pub use loader::{
    is_url, load_description_table, load_document, load_document_auto, load_document_str,
};
pub use table::{parse_description_table, DescriptionTable};
pub use types::{
    ConvertOptions, InputValue, SchemaType, ValueKind, RESOURCE_PROPERTIES, RESOURCE_TYPES,
};
pub use validator::check_document;
pub use writer::{render, render_element, write_document};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
