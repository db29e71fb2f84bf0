//! Validation primitives and their JSON-Schema projection.
//!
//! A [`Constraint`] is one rule: it can check a value and it can describe itself
//! as a JSON-Schema fragment. Several constraints fold into a single schema with
//! [`merge_into`], where later constraints overwrite the fields of earlier ones.
//!
//! ```
//! use api_flow::{merge_into, Constraint};
//! use serde_json::json;
//!
//! let schema = merge_into(
//!     json!({ "type": "integer" }),
//!     &[Constraint::Enum(vec![json!(1), json!(2), json!(3)]), Constraint::Maximum(2.into())],
//! );
//! assert_eq!(schema, json!({ "type": "integer", "enum": [1, 2, 3], "maximum": 2 }));
//! ```

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};

/// A single validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Constraint {
    MultipleOf(Number),
    Maximum(Number),
    ExclusiveMaximum(Number),
    Minimum(Number),
    ExclusiveMinimum(Number),
    #[serde(rename = "maxLength")]
    MaximumLength(u64),
    #[serde(rename = "minLength")]
    MinimumLength(u64),
    Pattern(String),
    #[serde(rename = "maxItems")]
    MaximumItems(u64),
    #[serde(rename = "minItems")]
    MinimumItems(u64),
    UniqueItems(bool),
    #[serde(rename = "maxProperties")]
    MaximumProperties(u64),
    #[serde(rename = "minProperties")]
    MinimumProperties(u64),
    Enum(Vec<Value>),
    #[serde(rename = "jsonSchema")]
    JsonSchema(Value),
    #[serde(rename = "xmlSchema")]
    XmlSchema(String),
    Generic { name: String, value: Value },
}

impl Constraint {
    /// JSON-Schema fragment describing this constraint.
    pub fn to_json_schema(&self) -> Value {
        match self {
            Constraint::MultipleOf(n) => json!({ "multipleOf": n }),
            Constraint::Maximum(n) => json!({ "maximum": n }),
            Constraint::ExclusiveMaximum(n) => json!({ "maximum": n, "exclusiveMaximum": true }),
            Constraint::Minimum(n) => json!({ "minimum": n }),
            Constraint::ExclusiveMinimum(n) => json!({ "minimum": n, "exclusiveMinimum": true }),
            Constraint::MaximumLength(n) => json!({ "maxLength": n }),
            Constraint::MinimumLength(n) => json!({ "minLength": n }),
            Constraint::Pattern(p) => json!({ "pattern": p }),
            Constraint::MaximumItems(n) => json!({ "maxItems": n }),
            Constraint::MinimumItems(n) => json!({ "minItems": n }),
            Constraint::UniqueItems(b) => json!({ "uniqueItems": b }),
            Constraint::MaximumProperties(n) => json!({ "maxProperties": n }),
            Constraint::MinimumProperties(n) => json!({ "minProperties": n }),
            Constraint::Enum(values) => json!({ "enum": values }),
            Constraint::JsonSchema(schema) => schema.clone(),
            Constraint::XmlSchema(xml) => json!({ "x-xml": xml }),
            Constraint::Generic { name, value } => {
                let mut obj = Map::new();
                obj.insert(name.clone(), value.clone());
                Value::Object(obj)
            }
        }
    }

    /// Check `value` against this rule.
    ///
    /// Never panics. A rule that cannot apply to the value's type rejects it,
    /// except for the schema-document rules which accept what they cannot judge.
    pub fn validate(&self, value: &Value) -> bool {
        match self {
            Constraint::MultipleOf(n) => numeric(value, n, |d, v| v != 0.0 && d % v == 0.0),
            Constraint::Maximum(n) => numeric(value, n, |d, v| d <= v),
            Constraint::ExclusiveMaximum(n) => numeric(value, n, |d, v| d < v),
            Constraint::Minimum(n) => numeric(value, n, |d, v| d >= v),
            Constraint::ExclusiveMinimum(n) => numeric(value, n, |d, v| d > v),
            Constraint::MaximumLength(n) => string_len(value).is_some_and(|len| len <= *n),
            Constraint::MinimumLength(n) => string_len(value).is_some_and(|len| len >= *n),
            Constraint::Pattern(p) => match (value.as_str(), Regex::new(p)) {
                (Some(s), Ok(re)) => re.is_match(s),
                _ => false,
            },
            Constraint::MaximumItems(n) => value
                .as_array()
                .is_some_and(|items| items.len() as u64 <= *n),
            Constraint::MinimumItems(n) => value
                .as_array()
                .is_some_and(|items| items.len() as u64 >= *n),
            Constraint::UniqueItems(unique) => {
                let Some(items) = value.as_array() else {
                    return false;
                };
                if !unique {
                    return true;
                }
                let mut seen = HashSet::new();
                items.iter().all(|item| seen.insert(item.to_string()))
            }
            Constraint::MaximumProperties(n) => value
                .as_object()
                .is_some_and(|obj| obj.len() as u64 <= *n),
            Constraint::MinimumProperties(n) => value
                .as_object()
                .is_some_and(|obj| obj.len() as u64 >= *n),
            Constraint::Enum(values) => values.contains(value),
            Constraint::JsonSchema(schema) => match jsonschema::validator_for(schema) {
                Ok(validator) => validator.is_valid(value),
                Err(e) => {
                    tracing::debug!(error = %e, "schema constraint does not compile, accepting value");
                    true
                }
            },
            Constraint::XmlSchema(_) | Constraint::Generic { .. } => true,
        }
    }

    /// First enumerated value, used when generating example data.
    pub fn first_enum_value(&self) -> Option<&Value> {
        match self {
            Constraint::Enum(values) => values.first(),
            _ => None,
        }
    }
}

/// Shallow-merge each constraint's schema over `base`, left to right.
///
/// Fields written by later constraints replace earlier ones wholesale, arrays included.
pub fn merge_into(base: Value, constraints: &[Constraint]) -> Value {
    constraints.iter().fold(base, |mut acc, constraint| {
        assign(&mut acc, constraint.to_json_schema());
        acc
    })
}

/// `Object.assign`-style shallow merge of `source` into `target`.
///
/// A non-object `target` is replaced by an empty object first.
pub(crate) fn assign(target: &mut Value, source: Value) {
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let (Value::Object(dst), Value::Object(src)) = (target, source) {
        for (k, v) in src {
            dst.insert(k, v);
        }
    }
}

fn numeric(value: &Value, bound: &Number, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (value.as_f64(), bound.as_f64()) {
        (Some(d), Some(v)) => cmp(d, v),
        _ => false,
    }
}

fn string_len(value: &Value) -> Option<u64> {
    value.as_str().map(|s| s.chars().count() as u64)
}
