//! Supplemental description table.
//!
//! The table is a pipe-delimited text file, one property per line:
//!
//! ```text
//! ThingType|The type of thingy.|A long thingy description.|Rack mounted.|Cheap.
//! ThingContainer/ThingKnob|A knob.|The knob on the container.
//! ```
//!
//! Column 0 is the property name (`Parent/Child` addresses nested properties),
//! column 1 the description, column 2 the long description, and any remaining
//! columns describe enum members in declaration order. A field containing
//! `|` is written in double quotes.

use std::collections::BTreeMap;

use crate::error::ConvertError;

/// Descriptions keyed by property name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionTable {
    rows: BTreeMap<String, Vec<String>>,
}

impl DescriptionTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the columns for a property.
    pub fn insert(&mut self, name: impl Into<String>, columns: Vec<String>) {
        self.rows.insert(name.into(), columns);
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.rows.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows addressed below `property`, with the `"<property>/"` prefix stripped.
    pub fn scoped(&self, property: &str) -> DescriptionTable {
        let prefix = format!("{}/", property);
        let rows = self
            .rows
            .iter()
            .filter_map(|(key, columns)| {
                key.strip_prefix(&prefix)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_string(), columns.clone()))
            })
            .collect();
        DescriptionTable { rows }
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for DescriptionTable {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        DescriptionTable {
            rows: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Parse a pipe-delimited description table.
///
/// Fields may be double-quoted to hold a literal `|`. Blank lines are
/// skipped. A later row for the same property replaces the earlier one.
///
/// # Errors
///
/// Returns `ConvertError::InvalidDescriptionTable` when a row has an empty
/// property name or lacks the description and long description columns.
pub fn parse_description_table(content: &str) -> Result<DescriptionTable, ConvertError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut table = DescriptionTable::new();

    for result in reader.records() {
        let record = result.map_err(|e| ConvertError::InvalidDescriptionTable {
            line: e.position().map_or(0, |p| p.line() as usize),
            message: e.to_string(),
        })?;
        let line = record.position().map_or(0, |p| p.line() as usize);

        let mut fields = record.iter();
        let name = fields.next().unwrap_or_default().trim();
        let columns: Vec<String> = fields.map(String::from).collect();

        if name.is_empty() && columns.is_empty() {
            continue;
        }
        if name.is_empty() {
            return Err(ConvertError::InvalidDescriptionTable {
                line,
                message: "empty property name".into(),
            });
        }
        if columns.len() < 2 {
            return Err(ConvertError::InvalidDescriptionTable {
                line,
                message: format!(
                    "expected description and long description for {}, got {} column(s)",
                    name,
                    columns.len()
                ),
            });
        }

        table.insert(name, columns);
    }

    Ok(table)
}
