//! Error types for CSDL conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading input or converting it into a CSDL document.
#[derive(Debug, Error)]
pub enum ConvertError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Format errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid document: {message}")]
    InvalidDocument { message: String },

    #[error("invalid JSON schema: {message}")]
    InvalidSchema { message: String },

    #[error("invalid description table at line {line}: {message}")]
    InvalidDescriptionTable { line: usize, message: String },

    #[error("failed to serialize CSDL: {source}")]
    Serialize {
        #[source]
        source: quick_xml::Error,
    },
}

impl ConvertError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::FileNotFound { .. }
            | ConvertError::ReadError { .. }
            | ConvertError::WriteError { .. } => 3,
            #[cfg(feature = "remote")]
            ConvertError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

impl From<quick_xml::Error> for ConvertError {
    fn from(source: quick_xml::Error) -> Self {
        ConvertError::Serialize { source }
    }
}
