//! Document loading from files, strings, and HTTP URLs.
//!
//! Source documents may be JSON or YAML. JSON is tried first.

use std::path::Path;

use serde_json::Value;

use crate::error::LoadError;
use crate::parameter::unescape_fragment;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Read a source file as text.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::ReadError` if it can't be read.
pub fn read_source(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a document from a file path.
///
/// # Errors
///
/// Returns the errors of [`read_source`], or `LoadError::InvalidDocument`
/// if the file is neither JSON nor YAML.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    let content = read_source(path)?;
    load_document_str(&content)
}

/// Parse a JSON or YAML string.
///
/// # Errors
///
/// Returns `LoadError::InvalidDocument` if the string is neither.
pub fn load_document_str(content: &str) -> Result<Value, LoadError> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str(content).map_err(|yaml_err| {
            tracing::debug!(json = %json_err, yaml = %yaml_err, "document parse failed");
            LoadError::InvalidDocument {
                message: yaml_err.to_string(),
            }
        }),
    }
}

/// Fetch the text of an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the server
/// answers with an error status.
#[cfg(feature = "remote")]
pub fn fetch_source(url: &str) -> Result<String, LoadError> {
    let network = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    let response = client.get(url).send().map_err(network)?;

    // Check for HTTP errors before reading the body
    let response = response.error_for_status().map_err(network)?;

    response.text().map_err(network)
}

/// Load a document from an HTTP/HTTPS URL.
///
/// # Errors
///
/// Returns the errors of [`fetch_source`] and [`load_document_str`].
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, LoadError> {
    let content = fetch_source(url)?;
    load_document_str(&content)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Read a source as text from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn read_source_auto(source: &str) -> Result<String, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            fetch_source(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        read_source(Path::new(source))
    }
}

/// Load a document from a file path or URL.
pub fn load_document_auto(source: &str) -> Result<Value, LoadError> {
    let content = read_source_auto(source)?;
    load_document_str(&content)
}

/// Navigate a JSON Pointer fragment (e.g. "#/definitions/Pet").
///
/// The fragment should start with '#'. An empty pointer selects the whole document.
pub fn navigate_fragment(document: &Value, fragment: &str) -> Result<Value, LoadError> {
    let path = fragment.trim_start_matches('#').trim_start_matches('/');
    if path.is_empty() {
        return Ok(document.clone());
    }

    let mut current = document;
    for part in path.split('/') {
        let key = unescape_fragment(part);
        let next = match current {
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            other => other.get(&key),
        };
        current = next.ok_or_else(|| LoadError::FragmentNotFound {
            fragment: fragment.to_string(),
        })?;
    }
    Ok(current.clone())
}
