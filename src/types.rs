//! Shared option and result types for format conversion.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JSON-Schema `type` keyword matching a runtime value.
///
/// Unlike [`json_type_name`], whole numbers map to `integer`.
pub fn json_schema_type(value: &Value) -> &'static str {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        other => json_type_name(other),
    }
}

/// API description formats this crate knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Swagger,
    Internal,
    Raml,
}

impl Format {
    /// Parse a format name, case-insensitively.
    ///
    /// Returns `None` for unknown names (caller should error).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "swagger" => Some(Format::Swagger),
            "internal" => Some(Format::Internal),
            "raml" => Some(Format::Raml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Swagger => "swagger",
            Format::Internal => "internal",
            Format::Raml => "raml",
        }
    }

    /// Version string of the dialect handled for this format.
    pub fn version(&self) -> &'static str {
        match self {
            Format::Swagger => "v2.0",
            Format::Internal => "v0.1",
            Format::Raml => "v1.0",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How well a parser recognizes a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub format: Format,
    pub version: &'static str,
    /// Confidence in `[0, 1]`.
    pub score: f64,
}

/// Options for [`convert`](crate::convert).
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Source format. Detected from the content when unset.
    pub from: Option<Format>,
    /// Target format.
    pub to: Format,
    /// Fail instead of emitting schemas demoted to raw JSON.
    pub strict: bool,
}

impl ConvertOptions {
    /// Options converting to `to`, detecting the source format, non-strict.
    pub fn new(to: Format) -> Self {
        Self {
            from: None,
            to,
            strict: false,
        }
    }

    /// Set the source format explicitly.
    pub fn from(mut self, from: Format) -> Self {
        self.from = Some(from);
        self
    }

    /// Set strict mode.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
