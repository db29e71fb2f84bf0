//! `$ref` dependency graph over named schemas.
//!
//! Target type systems (RAML types, for instance) cannot express every
//! JSON-Schema keyword. The graph decides, per named schema, whether the schema
//! and everything it reaches through `$ref` can be declared natively. Schemas
//! that cannot are demoted to self-contained raw JSON via [`SchemaGraph::dump_raw`].
//!
//! Traversals keep a visited set, so cyclic definitions terminate.

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

use crate::parameter::unescape_fragment;
use crate::store::Store;

/// Keywords with no native equivalent.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "additionalItems",
    "patternProperties",
    "dependencies",
    "oneOf",
    "not",
];

/// One named schema and its outgoing references.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyNode {
    pub name: String,
    pub schema: Value,
    /// Names of the schemas referenced through `$ref`, in first-seen order.
    pub deps: Vec<String>,
    /// Whether the schema itself avoids unsupported keywords.
    pub convertible: bool,
}

impl DependencyNode {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        let deps = refs_from_schema(&schema)
            .iter()
            .map(|uri| ref_name(uri))
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        Self {
            name: name.into(),
            convertible: is_convertible(&schema),
            deps,
            schema,
        }
    }
}

/// Named schemas indexed for convertibility analysis.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    nodes: IndexMap<String, DependencyNode>,
}

impl SchemaGraph {
    /// Graph of the constraint registry, using each constraint's JSON-Schema form.
    pub fn from_store(store: &Store) -> Self {
        Self::from_schemas(
            store
                .constraint
                .iter()
                .map(|(name, constraint)| (name.clone(), constraint.to_json_schema())),
        )
    }

    pub fn from_schemas(schemas: impl IntoIterator<Item = (String, Value)>) -> Self {
        let nodes = schemas
            .into_iter()
            .map(|(name, schema)| (name.clone(), DependencyNode::new(name, schema)))
            .collect();
        Self { nodes }
    }

    pub fn node(&self, name: &str) -> Option<&DependencyNode> {
        self.nodes.get(name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `name` and every schema reachable from it, in discovery order.
    ///
    /// Names with no node are included but not expanded.
    pub fn all_dependencies(&self, name: &str) -> IndexSet<String> {
        let deps = self
            .nodes
            .get(name)
            .map(|node| node.deps.clone())
            .unwrap_or_default();
        self.reachable(name, &deps)
    }

    fn reachable(&self, name: &str, deps: &[String]) -> IndexSet<String> {
        let mut visited = IndexSet::new();
        visited.insert(name.to_string());
        let mut stack: Vec<String> = deps.iter().rev().cloned().collect();

        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.deps.iter().rev().cloned());
            }
        }
        visited
    }

    /// Whether `name` and everything it depends on are locally convertible.
    ///
    /// An unknown name, or a dependency naming no schema, is not convertible.
    pub fn is_transitively_convertible(&self, name: &str) -> bool {
        match self.nodes.get(name) {
            Some(node) => self.closure_convertible(name, node.convertible, &node.deps),
            None => false,
        }
    }

    fn closure_convertible(&self, name: &str, convertible: bool, deps: &[String]) -> bool {
        if !convertible {
            return false;
        }
        self.reachable(name, deps)
            .iter()
            .filter(|dep| dep.as_str() != name)
            .all(|dep| match self.nodes.get(dep) {
                Some(node) => node.convertible,
                None => {
                    tracing::debug!(schema = %name, dependency = %dep, "unknown schema dependency");
                    false
                }
            })
    }

    /// Names of the schemas that would be demoted to raw JSON.
    pub fn demoted(&self) -> Vec<String> {
        self.nodes
            .keys()
            .filter(|name| !self.is_transitively_convertible(name))
            .cloned()
            .collect()
    }

    /// Pretty JSON of `schema` with the bodies of everything it transitively
    /// references inlined under `definitions`.
    pub fn dump_raw(&self, name: &str, schema: &Value) -> String {
        let deps = DependencyNode::new(name, schema.clone()).deps;
        let mut reachable = self.reachable(name, &deps);
        reachable.shift_remove(name);

        let mut blob = schema.clone();
        if !reachable.is_empty() {
            let definitions: Map<String, Value> = reachable
                .into_iter()
                .map(|dep| {
                    let body = self
                        .nodes
                        .get(&dep)
                        .map(|node| node.schema.clone())
                        .unwrap_or_else(|| Value::Object(Map::new()));
                    (dep, body)
                })
                .collect();
            if let Value::Object(obj) = &mut blob {
                obj.insert("definitions".into(), Value::Object(definitions));
            }
        }

        serde_json::to_string_pretty(&blob).unwrap_or_else(|_| blob.to_string())
    }
}

/// Every `$ref` target in `schema`, searching arrays and objects recursively.
pub fn refs_from_schema(schema: &Value) -> Vec<String> {
    match schema {
        Value::Array(items) => items.iter().flat_map(refs_from_schema).collect(),
        Value::Object(obj) => obj
            .iter()
            .flat_map(|(key, value)| match (key.as_str(), value) {
                ("$ref", Value::String(target)) => vec![target.clone()],
                _ => refs_from_schema(value),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Whether `schema` avoids every keyword without a native equivalent.
///
/// Boolean `exclusiveMinimum`/`exclusiveMaximum` (the Draft-04 form) are rejected
/// while their numeric form is accepted.
pub fn is_convertible(schema: &Value) -> bool {
    match schema {
        Value::Array(items) => items.iter().all(is_convertible),
        Value::Object(obj) => obj.iter().all(|(key, value)| {
            let unsupported = UNSUPPORTED_KEYWORDS.contains(&key.as_str())
                || (matches!(key.as_str(), "exclusiveMinimum" | "exclusiveMaximum")
                    && value.is_boolean());
            !unsupported && is_convertible(value)
        }),
        _ => true,
    }
}

/// Schema name a `$ref` points to: `#/definitions/Pet` gives `Pet`.
pub fn ref_name(uri: &str) -> String {
    let fragment = match uri.find('#') {
        Some(idx) => &uri[idx..],
        None => uri,
    };
    let segment = fragment
        .split('/')
        .nth(2)
        .or_else(|| fragment.rsplit('/').next())
        .unwrap_or(fragment);
    unescape_fragment(segment)
}
