//! Request and response fields.
//!
//! A [`Parameter`] comes in four shapes, decided by its [`ParameterValue`]:
//!
//! | Shape | `value` | JSON-Schema |
//! |-------|---------|-------------|
//! | plain | none or a literal | constraints + `type` + `x-title` + `default` |
//! | sequence | ordered sub-parameters | plain + `format: sequence` + `x-sequence` |
//! | array | element parameter | plain + `items` |
//! | reference | a [`Link`] | constraints + `x-title` + whatever the link resolves to |
//!
//! Parameters also carry `applicable_contexts`: the sibling values (usually a
//! `Content-Type`) under which this parameter is allowed to appear.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::constraint::{assign, merge_into, Constraint};
use crate::reference::{Link, Reference};
use crate::store::Store;

/// JSON-Schema primitive type names.
const SCHEMA_TYPES: &[&str] = &[
    "integer", "number", "array", "string", "object", "boolean", "null",
];

const BASE64_PATTERN: &str =
    "^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$";

/// Block of a [`ParameterContainer`](crate::ParameterContainer) a parameter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Headers,
    Queries,
    Body,
    Path,
}

/// Structural kind of a parameter, derived from its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuperType {
    Plain,
    Sequence,
    Array,
    Reference,
}

/// What a parameter holds besides its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterValue {
    /// Element description of an array parameter.
    Items(Box<Parameter>),
    /// Ordered pieces concatenated into one string, e.g. a templated path.
    Sequence(Vec<Parameter>),
    Reference(Link),
    Literal(Value),
}

/// One request or response field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Parameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ParameterValue>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applicable_contexts: Vec<Parameter>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub interfaces: IndexMap<String, Reference>,
}

/// Knobs for [`Parameter::json_schema`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaOptions<'a> {
    /// Add example-data hints derived from the parameter's `format`.
    pub use_faker: bool,
    /// Replace every `$ref` with a string placeholder.
    pub replace_refs: bool,
    /// Store used to resolve reference-typed parameters.
    pub store: Option<&'a Store>,
}

impl<'a> SchemaOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: toggle example-data hints.
    pub fn faker(mut self, use_faker: bool) -> Self {
        self.use_faker = use_faker;
        self
    }

    /// Builder: toggle `$ref` inlining.
    pub fn replace_refs(mut self, replace_refs: bool) -> Self {
        self.replace_refs = replace_refs;
        self
    }

    /// Builder: resolve store references against `store`.
    pub fn store(mut self, store: &'a Store) -> Self {
        self.store = Some(store);
        self
    }
}

impl Parameter {
    /// A plain parameter with a key and a type.
    pub fn new(key: impl Into<String>, param_type: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            name: Some(key.clone()),
            key: Some(key),
            param_type: Some(param_type.into()),
            ..Default::default()
        }
    }

    /// Builder: append a constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Builder: set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Builder: set the value.
    pub fn with_value(mut self, value: ParameterValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Builder: place the parameter in a container block.
    pub fn located(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Builder: add a context this parameter is applicable in.
    pub fn applicable_in(mut self, context: Parameter) -> Self {
        self.applicable_contexts.push(context);
        self
    }

    pub fn super_type(&self) -> SuperType {
        match &self.value {
            Some(ParameterValue::Items(_)) => SuperType::Array,
            Some(ParameterValue::Sequence(_)) => SuperType::Sequence,
            Some(ParameterValue::Reference(_)) => SuperType::Reference,
            Some(ParameterValue::Literal(_)) | None => SuperType::Plain,
        }
    }

    /// The concrete value this parameter carries: its default, or a literal value.
    pub fn effective_default(&self) -> Option<&Value> {
        match (&self.default, &self.value) {
            (Some(default), _) if !default.is_null() => Some(default),
            (_, Some(ParameterValue::Literal(literal))) if !literal.is_null() => Some(literal),
            _ => None,
        }
    }

    /// JSON-Schema fragment describing this parameter.
    pub fn json_schema(&self, options: &SchemaOptions<'_>) -> Value {
        let mut schema = match &self.value {
            Some(ParameterValue::Sequence(sequence)) => self.sequence_schema(sequence, options),
            Some(ParameterValue::Items(items)) => self.array_schema(items, options),
            Some(ParameterValue::Reference(link)) => self.reference_schema(link, options),
            Some(ParameterValue::Literal(_)) | None => self.simple_schema(),
        };

        if options.use_faker {
            if let Some(format) = &self.format {
                apply_faker_hint(format, &mut schema);
            }
        }

        simplify_refs(&mut schema);
        if options.replace_refs {
            replace_refs(&mut schema);
        }
        schema
    }

    /// Merged constraints, then `type`, then `x-title`.
    ///
    /// An undeclared type defaults to `string` unless a constraint already
    /// supplies `type` or `$ref`.
    fn base_schema(&self) -> Value {
        let mut schema = merge_into(Value::Object(Map::new()), &self.constraints);
        match self.param_type.as_deref() {
            Some(declared) => schema["type"] = Value::String(infer_type(declared)),
            None if schema.get("type").is_none() && schema.get("$ref").is_none() => {
                schema["type"] = json!("string");
            }
            None => {}
        }
        self.add_title(&mut schema);
        schema
    }

    fn add_title(&self, schema: &mut Value) {
        if let Some(key) = &self.key {
            schema["x-title"] = Value::String(key.clone());
        }
    }

    fn simple_schema(&self) -> Value {
        let mut schema = self.base_schema();
        if let Some(default) = self.effective_default() {
            schema["default"] = default.clone();
        }
        schema
    }

    fn sequence_schema(&self, sequence: &[Parameter], options: &SchemaOptions<'_>) -> Value {
        let mut schema = self.base_schema();
        schema["format"] = json!("sequence");
        schema["x-sequence"] = Value::Array(
            sequence
                .iter()
                .map(|section| section.json_schema(options))
                .collect(),
        );
        schema
    }

    fn array_schema(&self, items: &Parameter, options: &SchemaOptions<'_>) -> Value {
        let mut schema = self.base_schema();
        schema["items"] = items.json_schema(options);
        schema
    }

    fn reference_schema(&self, link: &Link, options: &SchemaOptions<'_>) -> Value {
        let mut schema = merge_into(Value::Object(Map::new()), &self.constraints);
        self.add_title(&mut schema);

        match link.value(options.store) {
            Some(Value::Object(fields)) => assign(&mut schema, Value::Object(fields)),
            Some(Value::Null) | None => {
                tracing::debug!(uri = %link.uri(), "reference unresolved, emitting $ref");
                schema["$ref"] = Value::String(link.uri());
            }
            Some(Value::Array(items)) => {
                schema["type"] = json!("array");
                schema["default"] = Value::Array(items);
            }
            Some(scalar) => {
                schema["type"] = json!(crate::types::json_schema_type(&scalar));
                schema["default"] = scalar;
            }
        }
        schema
    }

    /// Produce an example value.
    ///
    /// Sequences concatenate their sections, counting missing ones as empty strings.
    /// Other parameters return their default (when `use_default` is set), their literal
    /// value, or the first enumerated value, in that order.
    pub fn generate(&self, use_default: bool) -> Option<Value> {
        if let Some(ParameterValue::Sequence(sequence)) = &self.value {
            if sequence.is_empty() {
                return None;
            }
            let joined: String = sequence
                .iter()
                .map(|section| match section.generate(use_default) {
                    Some(Value::String(s)) => s,
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                })
                .collect();
            return Some(Value::String(joined));
        }

        if use_default {
            if let Some(default) = self.default.as_ref().filter(|d| !d.is_null()) {
                return Some(default.clone());
            }
        }
        if let Some(ParameterValue::Literal(literal)) = &self.value {
            if !literal.is_null() {
                return Some(literal.clone());
            }
        }
        self.constraints
            .iter()
            .find_map(Constraint::first_enum_value)
            .cloned()
    }

    /// True when every constraint accepts `value`.
    pub fn validate(&self, value: &Value) -> bool {
        self.constraints.iter().all(|c| c.validate(value))
    }

    /// Whether this parameter may appear alongside `input`.
    ///
    /// With no applicable contexts the parameter is unconstrained. Otherwise one of the
    /// contexts sharing `input`'s key must accept `input`'s literal value, or its default
    /// when it holds no value. When none shares the key the parameter is rejected.
    pub fn is_valid(&self, input: &Parameter) -> bool {
        if self.applicable_contexts.is_empty() {
            return true;
        }

        let value = match &input.value {
            Some(ParameterValue::Literal(literal)) => literal.clone(),
            _ => input.default.clone().unwrap_or(Value::Null),
        };
        self.applicable_contexts
            .iter()
            .filter(|context| context.key == input.key)
            .any(|context| context.validate(&value))
    }
}

/// Map a source-format type name onto a JSON-Schema type.
pub fn infer_type(param_type: &str) -> String {
    if SCHEMA_TYPES.contains(&param_type) {
        return param_type.to_string();
    }
    if param_type.contains("double") || param_type.contains("float") {
        return "number".to_string();
    }
    "string".to_string()
}

fn apply_faker_hint(format: &str, schema: &mut Value) {
    let is_sequence = schema.get("format").and_then(Value::as_str) == Some("sequence");
    if is_sequence || schema.get("faker").is_some() || schema.get("x-faker").is_some() {
        return;
    }

    let hint = match format {
        "email" => json!({ "x-faker": "internet.email" }),
        "byte" => json!({ "pattern": BASE64_PATTERN }),
        "binary" | "password" => json!({ "pattern": "^.*$" }),
        "date-time" => json!({ "x-faker": "date.recent" }),
        _ => return,
    };
    assign(schema, hint);
}

/// Turn `$ref` values holding a serialized [`Reference`] into uri strings.
pub fn simplify_refs(value: &mut Value) {
    match value {
        Value::Object(obj) => {
            if let Some(target) = obj.get_mut("$ref") {
                if target.is_object() {
                    if let Ok(reference) = serde_json::from_value::<Reference>(target.clone()) {
                        *target = Value::String(Link::Store(reference).uri());
                    }
                }
            }
            obj.values_mut().for_each(simplify_refs);
        }
        Value::Array(items) => items.iter_mut().for_each(simplify_refs),
        _ => {}
    }
}

/// Replace every `$ref` by a string placeholder named after the target.
///
/// `{"$ref": "#/definitions/Pet"}` becomes `{"type": "string", "default": "Pet"}`.
pub fn replace_refs(value: &mut Value) {
    match value {
        Value::Object(obj) => {
            if let Some(Value::String(target)) = obj.get("$ref").cloned() {
                obj.remove("$ref");
                let last = target.rsplit('/').next().unwrap_or(&target);
                obj.insert("default".into(), Value::String(unescape_fragment(last)));
                obj.insert("type".into(), json!("string"));
            }
            obj.values_mut().for_each(replace_refs);
        }
        Value::Array(items) => items.iter_mut().for_each(replace_refs),
        _ => {}
    }
}

/// JSON Pointer unescaping (`~1` = `/`, `~0` = `~`).
pub fn unescape_fragment(fragment: &str) -> String {
    fragment.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::LateResolutionReference;
    use crate::reference::RefType;

    fn content_type(media: &str) -> Parameter {
        Parameter::new("Content-Type", "string")
            .with_constraint(Constraint::Enum(vec![json!(media)]))
    }

    #[test]
    fn simple_schema_order_and_fields() {
        let param = Parameter::new("limit", "integer")
            .with_constraint(Constraint::Minimum(1.into()))
            .with_default(json!(20));
        let schema = param.json_schema(&SchemaOptions::new());
        assert_eq!(
            serde_json::to_string(&schema).unwrap(),
            r#"{"minimum":1,"type":"integer","x-title":"limit","default":20}"#
        );
    }

    #[test]
    fn undeclared_type_keeps_schema_type() {
        let body = Parameter::default()
            .with_constraint(Constraint::JsonSchema(json!({ "type": "object" })));
        assert_eq!(body.json_schema(&SchemaOptions::new())["type"], json!("object"));

        let pet = Parameter::default()
            .with_constraint(Constraint::JsonSchema(json!({ "$ref": "#/definitions/Pet" })));
        assert_eq!(
            pet.json_schema(&SchemaOptions::new()),
            json!({ "$ref": "#/definitions/Pet" })
        );

        assert_eq!(
            Parameter::default().json_schema(&SchemaOptions::new()),
            json!({ "type": "string" })
        );
    }

    #[test]
    fn type_inference() {
        assert_eq!(infer_type("double"), "number");
        assert_eq!(infer_type("float"), "number");
        assert_eq!(infer_type("date"), "string");
        assert_eq!(infer_type(""), "string");
        assert_eq!(infer_type("file"), "string");
        assert_eq!(infer_type("boolean"), "boolean");
    }

    #[test]
    fn array_schema_has_items_and_size() {
        let die = Parameter {
            param_type: Some("integer".into()),
            constraints: vec![Constraint::Minimum(1.into()), Constraint::Maximum(6.into())],
            ..Default::default()
        };
        let throws = Parameter::new("diceThrows", "array")
            .with_constraint(Constraint::MinimumItems(3))
            .with_constraint(Constraint::MaximumItems(6))
            .with_value(ParameterValue::Items(Box::new(die)));

        let schema = throws.json_schema(&SchemaOptions::new());
        assert_eq!(
            schema,
            json!({
                "minItems": 3,
                "maxItems": 6,
                "type": "array",
                "x-title": "diceThrows",
                "items": { "minimum": 1, "maximum": 6, "type": "integer" }
            })
        );
    }

    #[test]
    fn sequence_schema_preserves_order() {
        let path = Parameter::new("path", "string").with_value(ParameterValue::Sequence(vec![
            Parameter::default().with_default(json!("/users/")),
            Parameter::new("userId", "string").with_default(json!("userId")),
        ]));
        let schema = path.json_schema(&SchemaOptions::new());
        assert_eq!(schema["format"], json!("sequence"));
        let sections = schema["x-sequence"].as_array().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0]["default"], json!("/users/"));
        assert_eq!(sections[1]["x-title"], json!("userId"));
    }

    #[test]
    fn unresolved_reference_emits_ref() {
        let param = Parameter::new("owner", "reference").with_value(ParameterValue::Reference(
            Link::Store(Reference::new(RefType::Constraint, "Owner")),
        ));
        let schema = param.json_schema(&SchemaOptions::new());
        assert_eq!(schema, json!({ "x-title": "owner", "$ref": "#/constraint/Owner" }));
    }

    #[test]
    fn object_reference_is_merged() {
        let store = Store::default().with_constraint(
            "Owner",
            Constraint::JsonSchema(json!({ "type": "object", "required": ["id"] })),
        );
        let param = Parameter::new("owner", "reference").with_value(ParameterValue::Reference(
            Link::Store(Reference::new(RefType::Constraint, "Owner")),
        ));
        let schema = param.json_schema(&SchemaOptions::new().store(&store));
        assert_eq!(
            schema,
            json!({ "x-title": "owner", "type": "object", "required": ["id"] })
        );
    }

    #[test]
    fn scalar_reference_becomes_default() {
        let late = LateResolutionReference::new("{{host}}")
            .evaluate(&[LateResolutionReference::variable("host", "api.example.com")]);
        let param = Parameter::new("host", "reference")
            .with_value(ParameterValue::Reference(Link::Late(late)));
        let schema = param.json_schema(&SchemaOptions::new());
        assert_eq!(schema["type"], json!("string"));
        assert_eq!(schema["default"], json!("api.example.com"));
    }

    #[test]
    fn faker_hint_overrides() {
        let mut param = Parameter::new("email", "string");
        param.format = Some("email".into());
        let schema = param.json_schema(&SchemaOptions::new().faker(true));
        assert_eq!(schema["x-faker"], json!("internet.email"));

        let plain = param.json_schema(&SchemaOptions::new());
        assert!(plain.get("x-faker").is_none());

        param.format = Some("password".into());
        param.constraints = vec![Constraint::Pattern("^[a-z]+$".into())];
        let schema = param.json_schema(&SchemaOptions::new().faker(true));
        assert_eq!(schema["pattern"], json!("^.*$"));
    }

    #[test]
    fn faker_field_blocks_hint() {
        let mut param = Parameter::new("first", "string").with_constraint(Constraint::Generic {
            name: "faker".into(),
            value: json!("name.firstName"),
        });
        param.format = Some("email".into());

        let schema = param.json_schema(&SchemaOptions::new().faker(true));
        assert_eq!(schema["faker"], json!("name.firstName"));
        assert!(schema.get("x-faker").is_none());
    }

    #[test]
    fn replace_refs_keeps_property_named_ref() {
        let mut schema = json!({
            "properties": {
                "$ref": { "type": "string" },
                "name": { "type": "string" }
            }
        });
        replace_refs(&mut schema);
        assert_eq!(schema["properties"]["$ref"], json!({ "type": "string" }));
        assert_eq!(schema["properties"]["name"], json!({ "type": "string" }));
    }

    #[test]
    fn replace_refs_inlines_placeholder() {
        let mut schema = json!({
            "type": "array",
            "items": { "$ref": "#/definitions/Pet~1Owner" }
        });
        replace_refs(&mut schema);
        assert_eq!(
            schema["items"],
            json!({ "default": "Pet/Owner", "type": "string" })
        );
    }

    #[test]
    fn simplify_refs_turns_references_into_uris() {
        let mut schema = json!({ "$ref": { "type": "constraint", "uuid": "Pet" } });
        simplify_refs(&mut schema);
        assert_eq!(schema, json!({ "$ref": "#/constraint/Pet" }));
    }

    #[test]
    fn generate_values() {
        assert_eq!(Parameter::default().generate(true), None);
        assert_eq!(
            Parameter::default().with_default(json!(123)).generate(true),
            Some(json!(123))
        );
        assert_eq!(
            Parameter::default().with_default(json!(123)).generate(false),
            None
        );
        assert_eq!(
            content_type("application/json").generate(false),
            Some(json!("application/json"))
        );

        let seq = |parts: Vec<Parameter>| {
            Parameter::default().with_value(ParameterValue::Sequence(parts))
        };
        assert_eq!(seq(vec![]).generate(true), None);
        assert_eq!(seq(vec![Parameter::default()]).generate(true), Some(json!("")));
        assert_eq!(
            seq(vec![
                Parameter::default().with_default(json!("234")),
                Parameter::default().with_default(json!(345)),
            ])
            .generate(true),
            Some(json!("234345"))
        );
    }

    #[test]
    fn validate_is_conjunction() {
        let param = Parameter::new("n", "integer")
            .with_constraint(Constraint::Minimum(1.into()))
            .with_constraint(Constraint::Maximum(6.into()));
        assert!(param.validate(&json!(3)));
        assert!(!param.validate(&json!(7)));
        assert!(Parameter::default().validate(&json!("anything")));
    }

    #[test]
    fn is_valid_without_contexts() {
        let param = Parameter::new("body", "object");
        assert!(param.is_valid(&content_type("text/plain").with_default(json!("text/plain"))));
    }

    #[test]
    fn is_valid_matching_context() {
        let body = Parameter::new("body", "object").applicable_in(content_type("application/json"));
        let json_input = Parameter::new("Content-Type", "string")
            .with_default(json!("application/json"));
        let xml_input = Parameter::new("Content-Type", "string")
            .with_default(json!("application/xml"));
        assert!(body.is_valid(&json_input));
        assert!(!body.is_valid(&xml_input));
    }

    #[test]
    fn is_valid_checks_literal_value_before_default() {
        let body = Parameter::new("body", "object").applicable_in(content_type("application/json"));
        let input = Parameter::new("Content-Type", "string")
            .with_default(json!("application/json"))
            .with_value(ParameterValue::Literal(json!("application/xml")));
        assert!(!body.is_valid(&input));

        let input = Parameter::new("Content-Type", "string")
            .with_default(json!("application/xml"))
            .with_value(ParameterValue::Literal(json!("application/json")));
        assert!(body.is_valid(&input));
    }

    #[test]
    fn is_valid_any_same_key_context() {
        let body = Parameter::new("body", "object")
            .applicable_in(content_type("application/json"))
            .applicable_in(content_type("application/xml"));
        let xml_input = Parameter::new("Content-Type", "string")
            .with_default(json!("application/xml"));
        assert!(body.is_valid(&xml_input));
    }

    #[test]
    fn is_valid_fails_closed_on_unknown_key() {
        let param = Parameter::new("body", "object").applicable_in(
            Parameter::new("a", "string").with_constraint(Constraint::Enum(vec![json!("x")])),
        );
        let input = Parameter::new("b", "string").with_default(json!("x"));
        assert!(!param.is_valid(&input));
    }

    #[test]
    fn super_type_follows_value() {
        assert_eq!(Parameter::default().super_type(), SuperType::Plain);
        assert_eq!(
            Parameter::default()
                .with_value(ParameterValue::Sequence(vec![]))
                .super_type(),
            SuperType::Sequence
        );
    }

    #[test]
    fn serde_round_trip_keeps_shape() {
        let param = Parameter::new("Content-Type", "string")
            .located(Location::Headers)
            .with_constraint(Constraint::Enum(vec![json!("application/json")]));
        let value = serde_json::to_value(&param).unwrap();
        assert_eq!(value["in"], json!("headers"));
        assert_eq!(value["required"], json!(false));
        let back: Parameter = serde_json::from_value(value).unwrap();
        assert_eq!(back, param);
    }
}
