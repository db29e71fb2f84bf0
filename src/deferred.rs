//! References whose value is only known after a second pass.
//!
//! - [`LateResolutionReference`] expands `{{var}}` placeholders against sibling references.
//! - [`ExoticReference`] wraps content fetched from somewhere we do not model.
//! - [`JsonSchemaReference`] points into a JSON or YAML document through a `#/` fragment.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::loader::{load_document_str, navigate_fragment};

/// Namespace prefix of template variables.
pub const TEMPLATE_PREFIX: &str = "#/x-postman/";

/// Upper bound on placeholder substitutions in one evaluation.
pub const MAX_SUBSTITUTIONS: usize = 20;

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{[^{}]*\}\}").expect("static regex"))
}

/// A templated value such as `{{host}}/{{version}}`.
///
/// `uuid` is the template under [`TEMPLATE_PREFIX`]. Once evaluated, `value` holds the
/// expanded string and further evaluation is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateResolutionReference {
    pub uuid: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub resolved: bool,
}

impl LateResolutionReference {
    /// Reference for the given template text.
    pub fn new(template: &str) -> Self {
        Self {
            uuid: format!("{}{}", TEMPLATE_PREFIX, template),
            value: None,
            resolved: false,
        }
    }

    /// A variable definition: `{{name}}` expands to `value`.
    pub fn variable(name: &str, value: impl Into<String>) -> Self {
        Self {
            uuid: format!("{}{{{{{}}}}}", TEMPLATE_PREFIX, name),
            value: Some(value.into()),
            resolved: true,
        }
    }

    /// Template text without the namespace prefix.
    pub fn template(&self) -> &str {
        self.uuid.strip_prefix(TEMPLATE_PREFIX).unwrap_or(&self.uuid)
    }

    pub fn resolve(&self) -> Self {
        Self {
            resolved: true,
            ..self.clone()
        }
    }

    /// Expand placeholders using `refs` as the variable table.
    ///
    /// Each round substitutes the leftmost innermost `{{...}}` group that has a known
    /// value. Groups with no known value stay verbatim. Evaluation ends when nothing
    /// changes or after [`MAX_SUBSTITUTIONS`] rounds, keeping whatever was expanded.
    pub fn evaluate(&self, refs: &[LateResolutionReference]) -> Self {
        if self.value.is_some() {
            return self.clone();
        }

        let mut current = self.uuid.clone();
        let mut rounds = 0;
        while rounds < MAX_SUBSTITUTIONS {
            let Some(next) = self.substitute_once(&current, refs) else {
                break;
            };
            rounds += 1;
            tracing::trace!(round = rounds, expanded = %next, "template substitution");
            if next == current {
                break;
            }
            current = next;
        }

        if rounds == MAX_SUBSTITUTIONS && placeholder().is_match(&current) {
            tracing::warn!(
                template = %self.template(),
                "template expansion hit the substitution bound"
            );
        }

        let expanded = current.strip_prefix(TEMPLATE_PREFIX).unwrap_or(&current);
        Self {
            uuid: self.uuid.clone(),
            value: (expanded != "null").then(|| expanded.to_string()),
            resolved: true,
        }
    }

    fn substitute_once(&self, current: &str, refs: &[LateResolutionReference]) -> Option<String> {
        placeholder().find_iter(current).find_map(|m| {
            let key = format!("{}{}", TEMPLATE_PREFIX, m.as_str());
            let replacement = if key == self.uuid {
                None
            } else {
                refs.iter()
                    .find(|r| r.uuid == key)
                    .and_then(|r| r.value.as_deref())
            }?;
            let mut next = String::with_capacity(current.len());
            next.push_str(&current[..m.start()]);
            next.push_str(replacement);
            next.push_str(&current[m.end()..]);
            Some(next)
        })
    }
}

/// Opaque externally fetched content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExoticReference {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub resolved: bool,
}

impl ExoticReference {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uuid: uri.into(),
            relative: None,
            value: None,
            resolved: false,
        }
    }

    /// Attach the fetched content.
    pub fn resolve(&self, content: &str) -> Self {
        Self {
            value: Some(content.to_string()),
            resolved: true,
            ..self.clone()
        }
    }
}

/// Pointer into a JSON-Schema document, e.g. `schemas/pet.json#/definitions/Pet`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaReference {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    /// Source text kept when it could not be parsed or the fragment was missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<JsonSchemaReference>,
    #[serde(default)]
    pub resolved: bool,
}

impl JsonSchemaReference {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uuid: uri.into(),
            relative: None,
            value: None,
            raw: None,
            dependencies: Vec::new(),
            resolved: false,
        }
    }

    /// Document part of the uri, without the fragment.
    pub fn data_uri(&self) -> &str {
        match self.uuid.find('#') {
            Some(idx) => &self.uuid[..idx],
            None => &self.uuid,
        }
    }

    /// Parse `content` (JSON, then YAML), select the fragment, and collect `$ref`s.
    ///
    /// Content that does not parse, or a fragment that does not exist, is kept as `raw`.
    pub fn resolve(&self, content: &str) -> Self {
        let unparsed = || Self {
            raw: Some(content.to_string()),
            dependencies: Vec::new(),
            resolved: true,
            ..self.clone()
        };

        let Ok(document) = load_document_str(content) else {
            return unparsed();
        };

        let value = match self.uuid.find('#') {
            Some(idx) => match navigate_fragment(&document, &self.uuid[idx..]) {
                Ok(value) => value,
                Err(_) => return unparsed(),
            },
            None => document,
        };

        let dependencies = find_refs(&value)
            .into_iter()
            .map(|relative| JsonSchemaReference {
                relative: Some(relative.clone()),
                ..JsonSchemaReference::new(join_uri(self.data_uri(), &relative))
            })
            .collect();

        Self {
            value: Some(value),
            dependencies,
            resolved: true,
            ..self.clone()
        }
    }
}

fn find_refs(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().flat_map(find_refs).collect(),
        Value::Object(obj) => obj
            .iter()
            .flat_map(|(key, v)| match (key.as_str(), v.as_str()) {
                ("$ref", Some(r)) => vec![r.to_string()],
                _ => find_refs(v),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Resolve `relative` against the document uri `base`.
fn join_uri(base: &str, relative: &str) -> String {
    if relative.starts_with('#') {
        return format!("{}{}", base, relative);
    }
    if relative.contains("://") || relative.starts_with('/') {
        return relative.to_string();
    }
    match base.rfind('/') {
        Some(idx) => format!("{}{}", &base[..=idx], relative),
        None => relative.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars() -> Vec<LateResolutionReference> {
        vec![
            LateResolutionReference::variable("a", "api"),
            LateResolutionReference::variable("b", "/v1"),
            LateResolutionReference::variable("inner", "a"),
        ]
    }

    #[test]
    fn chained_placeholders() {
        let evaluated = LateResolutionReference::new("{{a}}{{b}}").evaluate(&vars());
        assert_eq!(evaluated.value.as_deref(), Some("api/v1"));
        assert!(evaluated.resolved);
    }

    #[test]
    fn nested_placeholders_resolve_innermost_first() {
        let evaluated = LateResolutionReference::new("{{{{inner}}}}").evaluate(&vars());
        assert_eq!(evaluated.value.as_deref(), Some("api"));
    }

    #[test]
    fn unknown_placeholder_is_kept_and_others_expand() {
        let evaluated = LateResolutionReference::new("{{missing}}{{a}}").evaluate(&vars());
        assert_eq!(evaluated.value.as_deref(), Some("{{missing}}api"));
    }

    #[test]
    fn self_reference_is_left_alone() {
        let looping = vec![LateResolutionReference::variable("x", "{{x}}{{x}}")];
        let evaluated = LateResolutionReference::new("{{x}}").evaluate(&looping);
        assert_eq!(evaluated.value.as_deref(), Some("{{x}}"));
    }

    #[test]
    fn growing_expansion_stops_at_bound() {
        let growing = vec![LateResolutionReference::variable("y", "{{y}}{{y}}")];
        let evaluated = LateResolutionReference::new("<{{y}}>").evaluate(&growing);
        let value = evaluated.value.unwrap();
        assert_eq!(value.matches("{{y}}").count(), MAX_SUBSTITUTIONS + 1);
        assert!(value.starts_with('<') && value.ends_with('>'));
    }

    #[test]
    fn literal_null_becomes_none() {
        let refs = vec![LateResolutionReference::variable("n", "null")];
        let evaluated = LateResolutionReference::new("{{n}}").evaluate(&refs);
        assert!(evaluated.value.is_none());
    }

    #[test]
    fn evaluation_is_idempotent() {
        let once = LateResolutionReference::new("{{a}}").evaluate(&vars());
        let twice = once.evaluate(&[]);
        assert_eq!(once, twice);
    }

    #[test]
    fn exotic_resolve_keeps_content() {
        let r = ExoticReference::new("file.bin").resolve("payload");
        assert_eq!(r.value.as_deref(), Some("payload"));
        assert!(r.resolved);
    }

    #[test]
    fn json_schema_reference_extracts_fragment_and_deps() {
        let content = r##"{
            "definitions": {
                "Pet": { "type": "object", "properties": { "owner": { "$ref": "#/definitions/Owner" } } },
                "Owner": { "type": "string" }
            }
        }"##;
        let r = JsonSchemaReference::new("schemas/api.json#/definitions/Pet").resolve(content);
        assert_eq!(r.value.as_ref().unwrap()["type"], json!("object"));
        assert_eq!(r.dependencies.len(), 1);
        assert_eq!(
            r.dependencies[0].uuid,
            "schemas/api.json#/definitions/Owner"
        );
        assert_eq!(
            r.dependencies[0].relative.as_deref(),
            Some("#/definitions/Owner")
        );
    }

    #[test]
    fn json_schema_reference_accepts_yaml() {
        let r = JsonSchemaReference::new("pet.yaml").resolve("type: string\nminLength: 2\n");
        assert_eq!(r.value, Some(json!({ "type": "string", "minLength": 2 })));
    }

    #[test]
    fn json_schema_reference_missing_fragment_keeps_raw() {
        let r = JsonSchemaReference::new("a.json#/nope").resolve("{}");
        assert!(r.value.is_none());
        assert_eq!(r.raw.as_deref(), Some("{}"));
        assert!(r.resolved);
    }

    #[test]
    fn relative_uri_join() {
        assert_eq!(join_uri("dir/a.json", "b.json"), "dir/b.json");
        assert_eq!(join_uri("a.json", "#/x"), "a.json#/x");
        assert_eq!(join_uri("dir/a.json", "http://h/b.json"), "http://h/b.json");
    }
}
