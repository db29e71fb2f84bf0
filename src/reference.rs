//! Typed pointers into a [`Store`](crate::Store).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::deferred::{ExoticReference, JsonSchemaReference, LateResolutionReference};
use crate::store::{Store, Stored};

/// Registry a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    Endpoint,
    Parameter,
    Auth,
    Constraint,
    Response,
    Interface,
    Variable,
}

impl RefType {
    /// Parse a registry name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "endpoint" => Some(RefType::Endpoint),
            "parameter" => Some(RefType::Parameter),
            "auth" => Some(RefType::Auth),
            "constraint" => Some(RefType::Constraint),
            "response" => Some(RefType::Response),
            "interface" => Some(RefType::Interface),
            "variable" => Some(RefType::Variable),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RefType::Endpoint => "endpoint",
            RefType::Parameter => "parameter",
            RefType::Auth => "auth",
            RefType::Constraint => "constraint",
            RefType::Response => "response",
            RefType::Interface => "interface",
            RefType::Variable => "variable",
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointer to `store[ref_type][uuid]`, optionally patched by `overlay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reference {
    #[serde(rename = "type")]
    pub ref_type: RefType,
    #[serde(deserialize_with = "string_or_number")]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Value>,
}

impl Reference {
    pub fn new(ref_type: RefType, uuid: impl Into<String>) -> Self {
        Self {
            ref_type,
            uuid: uuid.into(),
            overlay: None,
        }
    }

    /// Builder: attach an overlay merged over the target on resolution.
    pub fn with_overlay(mut self, overlay: Value) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Resolve to a typed record.
    ///
    /// Returns `None` when the reference targets another registry, when the id is
    /// unknown, or when the overlay produces a value that no longer fits `T`.
    pub fn resolve<T: Stored>(&self, store: &Store) -> Option<T> {
        if self.ref_type != T::REF_TYPE {
            return None;
        }
        let target = T::registry(store).get(&self.uuid)?;
        let Some(overlay) = &self.overlay else {
            return Some(target.clone());
        };

        let mut merged = serde_json::to_value(target).ok()?;
        deep_merge(&mut merged, overlay);
        match serde_json::from_value(merged) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    reference = %self,
                    error = %e,
                    "overlay does not fit the referenced record"
                );
                None
            }
        }
    }

    /// Resolve to the JSON form of the target, with the overlay applied.
    ///
    /// Constraints resolve to their JSON-Schema fragment rather than their serde form.
    pub fn resolve_value(&self, store: &Store) -> Option<Value> {
        let mut value = store.lookup_value(self.ref_type, &self.uuid)?;
        if let Some(overlay) = &self.overlay {
            deep_merge(&mut value, overlay);
        }
        Some(value)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ref_type, self.uuid)
    }
}

/// A value stored inline or behind a store reference.
///
/// On the wire a reference is `{type, uuid, overlay?}` and is tried first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Indirect<T> {
    Ref(Reference),
    Direct(T),
}

impl<T: Stored> Indirect<T> {
    /// Produce the direct value, following the reference if needed.
    pub fn resolve(&self, store: &Store) -> Option<T> {
        match self {
            Indirect::Direct(value) => Some(value.clone()),
            Indirect::Ref(reference) => reference.resolve(store),
        }
    }
}

impl<T> Indirect<T> {
    pub fn as_direct(&self) -> Option<&T> {
        match self {
            Indirect::Direct(value) => Some(value),
            Indirect::Ref(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Indirect::Ref(reference) => Some(reference),
            Indirect::Direct(_) => None,
        }
    }
}

impl<T> From<Reference> for Indirect<T> {
    fn from(reference: Reference) -> Self {
        Indirect::Ref(reference)
    }
}

/// Any kind of reference a reference-typed parameter can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ref", rename_all = "kebab-case")]
pub enum Link {
    Store(Reference),
    Late(LateResolutionReference),
    Exotic(ExoticReference),
    JsonSchema(JsonSchemaReference),
}

impl Link {
    /// Uri used when the link has to be emitted as a `$ref`.
    pub fn uri(&self) -> String {
        match self {
            Link::Store(r) if r.uuid.starts_with("#/") => r.uuid.clone(),
            Link::Store(r) => format!("#/{}/{}", r.ref_type, r.uuid),
            Link::Late(r) => r.uuid.clone(),
            Link::Exotic(r) => r.relative.clone().unwrap_or_else(|| r.uuid.clone()),
            Link::JsonSchema(r) => r.relative.clone().unwrap_or_else(|| r.uuid.clone()),
        }
    }

    /// Content the link stands for, if known.
    ///
    /// Store references need a store to resolve. The other kinds carry their value.
    pub fn value(&self, store: Option<&Store>) -> Option<Value> {
        match self {
            Link::Store(r) => store.and_then(|s| r.resolve_value(s)),
            Link::Late(r) => r.value.clone().map(Value::String),
            Link::Exotic(r) => r.value.clone().map(Value::String),
            Link::JsonSchema(r) => r.value.clone(),
        }
    }
}

/// Recursive merge of `overlay` into `base`.
///
/// Objects merge key by key and anything else in the overlay replaces the base.
/// A null in the overlay leaves the base untouched.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(dst), Value::Object(src)) => {
            for (key, value) in src {
                match dst.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        if !value.is_null() {
                            dst.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// Ids may arrive as JSON numbers; they are kept as strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            crate::types::json_type_name(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Auth, BasicAuth};
    use serde_json::json;

    fn store_with_basic() -> Store {
        let mut store = Store::default();
        store.auth.insert(
            "a".into(),
            Auth::Basic(BasicAuth {
                username: Some("y".into()),
                password: Some("z".into()),
                ..Default::default()
            }),
        );
        store
    }

    #[test]
    fn overlay_wins_over_stored_fields() {
        let store = store_with_basic();
        let reference =
            Reference::new(RefType::Auth, "a").with_overlay(json!({ "username": "x" }));

        let Some(Auth::Basic(basic)) = reference.resolve::<Auth>(&store) else {
            panic!("expected basic auth");
        };
        assert_eq!(basic.username.as_deref(), Some("x"));
        assert_eq!(basic.password.as_deref(), Some("z"));
    }

    #[test]
    fn unresolved_is_none() {
        let store = Store::default();
        assert!(Reference::new(RefType::Auth, "a")
            .resolve::<Auth>(&store)
            .is_none());
        assert!(Reference::new(RefType::Auth, "a")
            .resolve_value(&store)
            .is_none());
    }

    #[test]
    fn mismatched_registry_is_none() {
        let store = store_with_basic();
        assert!(Reference::new(RefType::Parameter, "a")
            .resolve::<Auth>(&store)
            .is_none());
    }

    #[test]
    fn resolution_is_repeatable() {
        let store = store_with_basic();
        let reference = Reference::new(RefType::Auth, "a");
        assert_eq!(reference.resolve_value(&store), reference.resolve_value(&store));
    }

    #[test]
    fn deep_merge_nested() {
        let mut base = json!({ "a": { "b": 1, "c": 2 }, "d": [1, 2] });
        deep_merge(&mut base, &json!({ "a": { "b": 3 }, "d": [9], "e": null }));
        assert_eq!(base, json!({ "a": { "b": 3, "c": 2 }, "d": [9] }));
    }

    #[test]
    fn numeric_uuid_deserializes() {
        let reference: Reference =
            serde_json::from_value(json!({ "type": "parameter", "uuid": 42 })).unwrap();
        assert_eq!(reference.uuid, "42");
    }

    #[test]
    fn indirect_prefers_reference_shape() {
        let value: Indirect<Value> =
            serde_json::from_value(json!({ "type": "endpoint", "uuid": "base" })).unwrap();
        assert!(value.as_reference().is_some());

        let value: Indirect<Value> =
            serde_json::from_value(json!({ "type": "string", "uuid": "x" })).unwrap();
        assert!(value.as_direct().is_some());
    }

    #[test]
    fn link_uri() {
        let link = Link::Store(Reference::new(RefType::Constraint, "Pet"));
        assert_eq!(link.uri(), "#/constraint/Pet");

        let link = Link::Store(Reference::new(RefType::Parameter, "#/parameters/limit"));
        assert_eq!(link.uri(), "#/parameters/limit");
    }
}
