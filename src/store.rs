//! Shared registries that references point into.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::Auth;
use crate::constraint::Constraint;
use crate::model::{Interface, Response, Variable};
use crate::parameter::Parameter;
use crate::reference::RefType;
use crate::url::Url;

/// One ordered registry per kind of shared definition.
///
/// Registries are independent namespaces: the same id may appear in several of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Store {
    pub endpoint: IndexMap<String, Url>,
    pub parameter: IndexMap<String, Parameter>,
    pub auth: IndexMap<String, Auth>,
    pub constraint: IndexMap<String, Constraint>,
    pub response: IndexMap<String, Response>,
    pub interface: IndexMap<String, Interface>,
    pub variable: IndexMap<String, Variable>,
}

/// A record type that lives in one of the [`Store`] registries.
pub trait Stored: Clone + Serialize + DeserializeOwned {
    const REF_TYPE: RefType;

    fn registry(store: &Store) -> &IndexMap<String, Self>;
}

macro_rules! stored {
    ($ty:ty, $variant:ident, $field:ident) => {
        impl Stored for $ty {
            const REF_TYPE: RefType = RefType::$variant;

            fn registry(store: &Store) -> &IndexMap<String, Self> {
                &store.$field
            }
        }
    };
}

stored!(Url, Endpoint, endpoint);
stored!(Parameter, Parameter, parameter);
stored!(Auth, Auth, auth);
stored!(Constraint, Constraint, constraint);
stored!(Response, Response, response);
stored!(Interface, Interface, interface);
stored!(Variable, Variable, variable);

impl Store {
    pub fn is_empty(&self) -> bool {
        self.endpoint.is_empty()
            && self.parameter.is_empty()
            && self.auth.is_empty()
            && self.constraint.is_empty()
            && self.response.is_empty()
            && self.interface.is_empty()
            && self.variable.is_empty()
    }

    /// JSON form of `self[ref_type][uuid]`.
    ///
    /// Constraints yield their JSON-Schema fragment since that is what
    /// schema generation merges in.
    pub fn lookup_value(&self, ref_type: RefType, uuid: &str) -> Option<Value> {
        match ref_type {
            RefType::Endpoint => to_value(self.endpoint.get(uuid)?),
            RefType::Parameter => to_value(self.parameter.get(uuid)?),
            RefType::Auth => to_value(self.auth.get(uuid)?),
            RefType::Constraint => Some(self.constraint.get(uuid)?.to_json_schema()),
            RefType::Response => to_value(self.response.get(uuid)?),
            RefType::Interface => to_value(self.interface.get(uuid)?),
            RefType::Variable => to_value(self.variable.get(uuid)?),
        }
    }

    /// Structural update: a new store with `constraint` registered under `name`.
    pub fn with_constraint(mut self, name: impl Into<String>, constraint: Constraint) -> Self {
        self.constraint.insert(name.into(), constraint);
        self
    }
}

fn to_value<T: Serialize>(record: &T) -> Option<Value> {
    serde_json::to_value(record).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Reference;
    use serde_json::json;

    #[test]
    fn registries_are_separate_namespaces() {
        let mut store = Store::default();
        store.parameter.insert(
            "shared".into(),
            Parameter {
                key: Some("limit".into()),
                ..Default::default()
            },
        );
        store = store.with_constraint("shared", Constraint::Maximum(10.into()));

        let param = Reference::new(RefType::Parameter, "shared").resolve::<Parameter>(&store);
        assert_eq!(param.and_then(|p| p.key).as_deref(), Some("limit"));

        let constraint = Reference::new(RefType::Constraint, "shared").resolve_value(&store);
        assert_eq!(constraint, Some(json!({ "maximum": 10 })));
    }

    #[test]
    fn registries_keep_insertion_order() {
        let store = Store::default()
            .with_constraint("Zebra", Constraint::MinimumLength(1))
            .with_constraint("Apple", Constraint::MinimumLength(1));
        let names: Vec<_> = store.constraint.keys().cloned().collect();
        assert_eq!(names, vec!["Zebra", "Apple"]);
    }

    #[test]
    fn empty_store() {
        assert!(Store::default().is_empty());
        assert!(Store::default()
            .lookup_value(RefType::Endpoint, "x")
            .is_none());
    }
}
