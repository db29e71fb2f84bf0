//! Canonical JSON dump of the model.

use serde_json::{Map, Value};

use super::{Parser, Serializer};
use crate::error::{ParseError, SerializeError};
use crate::loader::load_document_str;
use crate::model::Api;
use crate::types::Format;

/// Model name written under `_model`.
pub const MODEL_NAME: &str = "api.core.models";

/// Model version written under `_model`.
pub const MODEL_VERSION: &str = "0.1.0";

const FORMAT_NAME: &str = "internal";

fn score(document: &Value) -> f64 {
    let Some(model) = document.get("_model") else {
        return 0.0;
    };
    let versioned = model.get("version").and_then(Value::as_str) == Some(MODEL_VERSION);
    0.5 + if versioned { 0.5 } else { 0.0 }
}

/// Reads documents written by [`InternalSerializer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InternalParser;

impl Parser for InternalParser {
    fn format(&self) -> Format {
        Format::Internal
    }

    fn detect(&self, content: &str) -> f64 {
        load_document_str(content).map_or(0.0, |doc| score(&doc))
    }

    fn api_name(&self, content: &str) -> Option<String> {
        let document = load_document_str(content).ok()?;
        document
            .pointer("/info/title")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn parse(&self, content: &str) -> Result<Api, ParseError> {
        let mut document = load_document_str(content)?;
        let Value::Object(obj) = &mut document else {
            return Err(ParseError::InvalidDocument {
                format: FORMAT_NAME,
                message: "top level is not an object".into(),
            });
        };
        if obj.remove("_model").is_none() {
            return Err(ParseError::InvalidDocument {
                format: FORMAT_NAME,
                message: "missing `_model` field".into(),
            });
        }

        serde_json::from_value(document).map_err(|e| ParseError::InvalidDocument {
            format: FORMAT_NAME,
            message: e.to_string(),
        })
    }
}

/// Writes the whole model as pretty JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct InternalSerializer;

impl Serializer for InternalSerializer {
    fn format(&self) -> Format {
        Format::Internal
    }

    fn serialize(&self, api: &Api) -> Result<String, SerializeError> {
        let mut document = Map::new();
        document.insert(
            "_model".into(),
            serde_json::json!({ "name": MODEL_NAME, "version": MODEL_VERSION }),
        );
        if let Value::Object(fields) = serde_json::to_value(api)? {
            document.extend(fields);
        }
        Ok(serde_json::to_string_pretty(&Value::Object(document))?)
    }

    fn validate(&self, content: &str) -> f64 {
        InternalParser.detect(content)
    }
}
