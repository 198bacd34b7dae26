//! Input loading from files, strings, and HTTP URLs.

use std::path::Path;

use serde_json::Value;

use crate::error::ConvertError;
use crate::table::{parse_description_table, DescriptionTable};

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

fn read_file(path: &Path) -> Result<String, ConvertError> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| ConvertError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a JSON document (mock-up or JSON schema) from a file path.
///
/// # Errors
///
/// Returns `ConvertError::FileNotFound` if the file doesn't exist,
/// or `ConvertError::InvalidJson` if the file isn't valid JSON.
pub fn load_document(path: &Path) -> Result<Value, ConvertError> {
    let content = read_file(path)?;
    load_document_str(&content)
}

/// Load a JSON document from a string.
///
/// # Errors
///
/// Returns `ConvertError::InvalidJson` if the string isn't valid JSON.
pub fn load_document_str(content: &str) -> Result<Value, ConvertError> {
    serde_json::from_str(content).map_err(|source| ConvertError::InvalidJson { source })
}

/// Load a JSON document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `ConvertError::NetworkError` if the request fails or the
/// response isn't valid JSON.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, ConvertError> {
    let network_error = |source| ConvertError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
        .map_err(network_error)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a JSON document from a file path or URL.
///
/// URL loading requires the `remote` feature.
///
/// # Errors
///
/// Returns the errors of [`load_document`] for paths and of
/// `load_document_url` for URLs. Without the `remote` feature a URL yields
/// `ConvertError::FileNotFound`.
pub fn load_document_auto(source: &str) -> Result<Value, ConvertError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(ConvertError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}

/// Load a pipe-delimited description table from a file.
///
/// # Errors
///
/// Returns `ConvertError::FileNotFound`/`ReadError` if the file can't be read,
/// or `ConvertError::InvalidDescriptionTable` for a malformed row.
pub fn load_description_table(path: &Path) -> Result<DescriptionTable, ConvertError> {
    let content = read_file(path)?;
    parse_description_table(&content)
}
