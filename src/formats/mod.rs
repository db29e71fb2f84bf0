//! Format adapters around the shared model.
//!
//! A [`Parser`] turns source text into an [`Api`]; a [`Serializer`] turns an
//! [`Api`] back into text. [`convert`] chains the two.

mod internal;
mod raml;
mod swagger;

pub use internal::{InternalParser, InternalSerializer, MODEL_NAME, MODEL_VERSION};
pub use raml::RamlSerializer;
pub use swagger::SwaggerParser;

use crate::error::{ConvertError, ParseError, SerializeError};
use crate::model::Api;
use crate::types::{ConvertOptions, Detection, Format};

/// Reads one source format.
pub trait Parser {
    fn format(&self) -> Format;

    /// Confidence in `[0, 1]` that `content` is in this format.
    fn detect(&self, content: &str) -> f64;

    /// Title of the described API, when the document declares one.
    fn api_name(&self, content: &str) -> Option<String>;

    fn parse(&self, content: &str) -> Result<Api, ParseError>;
}

/// Writes one target format.
pub trait Serializer {
    fn format(&self) -> Format;

    fn serialize(&self, api: &Api) -> Result<String, SerializeError>;

    /// Confidence in `[0, 1]` that `content` was produced in this format.
    fn validate(&self, content: &str) -> f64;

    /// Names of the schemas this serializer cannot declare natively for `api`.
    fn demoted(&self, _api: &Api) -> Vec<String> {
        Vec::new()
    }
}

/// All known parsers.
pub fn parsers() -> Vec<Box<dyn Parser>> {
    vec![Box::new(SwaggerParser), Box::new(InternalParser)]
}

pub fn parser_for(format: Format) -> Option<Box<dyn Parser>> {
    parsers().into_iter().find(|p| p.format() == format)
}

pub fn serializer_for(format: Format) -> Option<Box<dyn Serializer>> {
    match format {
        Format::Internal => Some(Box::new(InternalSerializer)),
        Format::Raml => Some(Box::new(RamlSerializer)),
        Format::Swagger => None,
    }
}

/// Score `content` against every parser, best match first.
pub fn detect(content: &str) -> Vec<Detection> {
    let mut detections: Vec<Detection> = parsers()
        .iter()
        .map(|parser| Detection {
            format: parser.format(),
            version: parser.format().version(),
            score: parser.detect(content),
        })
        .collect();
    detections.sort_by(|a, b| b.score.total_cmp(&a.score));
    detections
}

/// Parse `content` with the chosen (or detected) parser.
pub fn parse(content: &str, from: Option<Format>) -> Result<Api, ParseError> {
    let format = match from {
        Some(format) => format,
        None => detect(content)
            .into_iter()
            .find(|d| d.score > 0.0)
            .map(|d| d.format)
            .ok_or(ParseError::UnknownFormat)?,
    };
    let parser = parser_for(format).ok_or(ParseError::UnknownFormat)?;
    tracing::debug!(format = %format, "parsing document");
    parser.parse(content)
}

/// Parse `content` and serialize it in `options.to`.
///
/// # Errors
///
/// Returns `ConvertError::Demoted` in strict mode when the target cannot
/// declare some schemas natively.
pub fn convert(content: &str, options: &ConvertOptions) -> Result<String, ConvertError> {
    let api = parse(content, options.from)?;
    let serializer = serializer_for(options.to)
        .ok_or(ConvertError::UnsupportedTarget { format: options.to })?;

    let demoted = serializer.demoted(&api);
    if options.strict && !demoted.is_empty() {
        return Err(ConvertError::Demoted { names: demoted });
    }

    Ok(serializer.serialize(&api)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWAGGER: &str = r#"{
        "swagger": "2.0",
        "info": { "title": "Petstore", "version": "1.0.0" },
        "paths": {}
    }"#;

    #[test]
    fn detect_ranks_swagger_first() {
        let detections = detect(SWAGGER);
        assert_eq!(detections[0].format, Format::Swagger);
        assert_eq!(detections[0].score, 1.0);
        assert_eq!(detections[1].score, 0.0);
    }

    #[test]
    fn parse_unknown_content() {
        let result = parse("just some text", None);
        assert!(matches!(result, Err(ParseError::UnknownFormat)));
    }

    #[test]
    fn convert_swagger_to_internal() {
        let output = convert(SWAGGER, &ConvertOptions::new(Format::Internal)).unwrap();
        assert!(output.contains("api.core.models"));
        assert!(output.contains("Petstore"));
    }

    #[test]
    fn swagger_has_no_serializer() {
        let result = convert(SWAGGER, &ConvertOptions::new(Format::Swagger));
        assert!(matches!(
            result,
            Err(ConvertError::UnsupportedTarget {
                format: Format::Swagger
            })
        ));
    }
}
