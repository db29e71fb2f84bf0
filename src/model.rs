//! The API tree: info, resources, requests, responses and groups.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::Auth;
use crate::container::ParameterContainer;
use crate::context::Context;
use crate::reference::{Indirect, Reference};
use crate::store::Store;
use crate::url::Url;

/// A parsed API description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Api {
    pub info: Info,
    pub store: Store,
    /// Resources keyed by path, in source order.
    pub resources: IndexMap<String, Resource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
}

impl Api {
    /// Every request of every resource, in order.
    pub fn requests(&self) -> impl Iterator<Item = &Request> {
        self.resources.values().flat_map(|r| r.methods.values())
    }

    /// Requests keyed by id, for group traversal.
    pub fn request_map(&self) -> IndexMap<&str, &Request> {
        self.requests()
            .filter_map(|req| Some((req.id.as_deref()?, req)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Info {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Terms of service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Everything served under one path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub path: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub endpoints: IndexMap<String, Reference>,
    /// Requests keyed by lowercase method.
    pub methods: IndexMap<String, Request>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub interfaces: IndexMap<String, Reference>,
}

/// One operation on a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Endpoints the request may be sent to, possibly with a scheme overlay.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub endpoints: IndexMap<String, Reference>,
    pub parameters: ParameterContainer,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub auths: Vec<Indirect<Auth>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Indirect<Response>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<Context>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub interfaces: IndexMap<String, Reference>,
}

impl Request {
    /// Auth schemes with references resolved. Unresolved ones are skipped.
    pub fn resolved_auths(&self, store: &Store) -> Vec<Auth> {
        self.auths
            .iter()
            .filter_map(|auth| {
                let resolved = auth.resolve(store);
                if resolved.is_none() {
                    tracing::warn!(request = ?self.id, "dropping unresolved auth reference");
                }
                resolved
            })
            .collect()
    }

    /// Endpoints with their overlays applied.
    pub fn resolved_endpoints(&self, store: &Store) -> Vec<Url> {
        self.endpoints
            .values()
            .filter_map(|reference| reference.resolve(store))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Value>,
    pub parameters: ParameterContainer,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<Context>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub interfaces: IndexMap<String, Reference>,
}

/// A shared trait of requests or parameters, e.g. a Swagger tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interface {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named value that changes per environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Variable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub values: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_environment: Option<String>,
}

/// Hierarchical grouping of requests, by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub children: IndexMap<String, GroupChild>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupChild {
    /// Id of a request.
    Request(String),
    Group(Group),
}

impl Group {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// All request ids below this group, depth first, in order.
    pub fn request_ids(&self) -> Vec<&str> {
        self.children
            .values()
            .flat_map(|child| match child {
                GroupChild::Request(id) => vec![id.as_str()],
                GroupChild::Group(group) => group.request_ids(),
            })
            .collect()
    }

    /// Requests below this group. Ids missing from `requests` are skipped.
    pub fn requests<'a>(&self, requests: &IndexMap<&str, &'a Request>) -> Vec<&'a Request> {
        self.request_ids()
            .into_iter()
            .filter_map(|id| requests.get(id).copied())
            .collect()
    }

    /// Structural update: merge `group` into the child of the same name.
    pub fn merge_group(mut self, group: Group) -> Self {
        let key = group.name.clone().unwrap_or_default();
        let merged = match self.children.shift_remove(&key) {
            Some(GroupChild::Group(mut existing)) => {
                for (child_key, child) in group.children {
                    existing.children.insert(child_key, child);
                }
                existing
            }
            _ => group,
        };
        self.children.insert(key, GroupChild::Group(merged));
        self
    }
}
