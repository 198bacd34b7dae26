//! CSDL serialization.
//!
//! Documents are written with a fixed header comment, two-space indentation,
//! and attributes in CSDL reading order (see [`PRIORITY_ATTRIBUTES`]).

use std::path::{Path, PathBuf};

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use tracing::info;

use crate::csdl::CsdlDocument;
use crate::element::Element;
use crate::error::ConvertError;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Attributes that lead a tag, in this order. Others follow as encountered.
pub const PRIORITY_ATTRIBUTES: &[&str] = &[
    "xmlns",
    "xmlns:edmx",
    "Name",
    "Term",
    "Property",
    "Type",
    "Namespace",
    "EnumMember",
    "String",
    "Bool",
];

fn header(schema_name: &str) -> String {
    format!(
        r#"<!---->
<!--################################################################################       -->
<!--# Redfish Schema:  {}                                          -->
<!--#                                                                                      -->
<!--# For a detailed change log, see the README file contained in the DSP8010 bundle,      -->
<!--# available at http://www.dmtf.org/standards/redfish                                   -->
<!--# Copyright 2020 DMTF.                                                                 -->
<!--# For the full DMTF copyright policy, see http://www.dmtf.org/about/policies/copyright -->
<!--################################################################################       -->
<!---->
"#,
        schema_name
    )
}

/// Attributes of `element` in output order.
pub fn ordered_attributes(element: &Element) -> Vec<(&str, &str)> {
    let mut attributes: Vec<(&str, &str)> = element
        .attributes
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    // stable: non-priority attributes keep their relative order
    attributes.sort_by_key(|(key, _)| {
        PRIORITY_ATTRIBUTES
            .iter()
            .position(|p| p == key)
            .unwrap_or(PRIORITY_ATTRIBUTES.len())
    });
    attributes
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &Element,
) -> Result<(), quick_xml::Error> {
    let mut start = BytesStart::new(element.name.as_str());
    for attribute in ordered_attributes(element) {
        start.push_attribute(attribute);
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &element.children {
            write_element(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    }
    Ok(())
}

/// Render an element tree as indented XML, without declaration or header.
pub fn render_element(element: &Element) -> Result<String, ConvertError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_element(&mut writer, element)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Render a complete CSDL document.
pub fn render(document: &CsdlDocument) -> Result<String, ConvertError> {
    let body = render_element(&document.to_element())?;
    Ok(format!(
        "{}\n{}{}\n",
        XML_DECLARATION,
        header(&document.name),
        body
    ))
}

/// Render `document` and write it to `<dir>/<SchemaName>.xml`.
///
/// Nothing is written if rendering fails.
///
/// # Errors
///
/// Returns `ConvertError::WriteError` if the file can't be written.
pub fn write_document(document: &CsdlDocument, dir: &Path) -> Result<PathBuf, ConvertError> {
    let rendered = render(document)?;
    let path = dir.join(document.file_name());
    std::fs::write(&path, rendered).map_err(|source| ConvertError::WriteError {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "wrote CSDL document");
    Ok(path)
}
