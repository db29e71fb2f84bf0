//! Error types for loading, parsing, and serializing API descriptions.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::Format;

/// Errors while reading a source document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
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

    // Parse errors (exit code 2)
    #[error("document is neither valid JSON nor valid YAML: {message}")]
    InvalidDocument { message: String },

    #[error("fragment not found: {fragment}")]
    FragmentNotFound { fragment: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors raised by a format parser.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("unknown format: no parser recognized the document")]
    UnknownFormat,

    #[error("invalid {format} document: {message}")]
    InvalidDocument {
        format: &'static str,
        message: String,
    },
}

impl ParseError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ParseError::Load(e) => e.exit_code(),
            _ => 2,
        }
    }
}

/// Errors raised by a format serializer.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("cannot encode JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("cannot encode YAML: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },
}

/// Errors during a full conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error("no serializer for format: {format}")]
    UnsupportedTarget { format: Format },

    #[error("{} schema(s) could not be converted natively: {}", names.len(), names.join(", "))]
    Demoted { names: Vec<String> },
}

impl ConvertError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::Parse(e) => e.exit_code(),
            ConvertError::Serialize(_) | ConvertError::UnsupportedTarget { .. } => 2,
            ConvertError::Demoted { .. } => 1,
        }
    }
}
