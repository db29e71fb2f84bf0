//! Parameters grouped by where they appear in a request.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::parameter::{Location, Parameter};
use crate::reference::Indirect;
use crate::store::Store;

/// Ordered parameter blocks of a request or response.
///
/// Entries are either inline parameters or references into the store's
/// `parameter` registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterContainer {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Indirect<Parameter>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub queries: IndexMap<String, Indirect<Parameter>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub body: IndexMap<String, Indirect<Parameter>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub path: IndexMap<String, Indirect<Parameter>>,
}

const LOCATIONS: [Location; 4] = [
    Location::Headers,
    Location::Queries,
    Location::Body,
    Location::Path,
];

impl ParameterContainer {
    pub fn block(&self, location: Location) -> &IndexMap<String, Indirect<Parameter>> {
        match location {
            Location::Headers => &self.headers,
            Location::Queries => &self.queries,
            Location::Body => &self.body,
            Location::Path => &self.path,
        }
    }

    fn block_mut(&mut self, location: Location) -> &mut IndexMap<String, Indirect<Parameter>> {
        match location {
            Location::Headers => &mut self.headers,
            Location::Queries => &mut self.queries,
            Location::Body => &mut self.body,
            Location::Path => &mut self.path,
        }
    }

    /// Structural update: a container with `entry` added to the given block.
    pub fn with(
        mut self,
        location: Location,
        key: impl Into<String>,
        entry: impl Into<Indirect<Parameter>>,
    ) -> Self {
        self.block_mut(location).insert(key.into(), entry.into());
        self
    }

    pub fn len(&self) -> usize {
        LOCATIONS.iter().map(|&l| self.block(l).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace every reference by the parameter it points to.
    ///
    /// References that do not resolve are dropped.
    pub fn resolve(&self, store: &Store) -> Self {
        let mut resolved = Self::default();
        for location in LOCATIONS {
            for (key, entry) in self.block(location) {
                match entry.resolve(store) {
                    Some(param) => {
                        resolved
                            .block_mut(location)
                            .insert(key.clone(), Indirect::Direct(param));
                    }
                    None => {
                        tracing::warn!(
                            location = ?location,
                            key = %key,
                            "dropping unresolved parameter reference"
                        );
                    }
                }
            }
        }
        resolved
    }

    /// Keep the parameters applicable under every one of `constraints`.
    ///
    /// Filtering never adds entries. Reference entries are kept unchanged since
    /// their applicability is unknown until resolution; call [`resolve`](Self::resolve)
    /// first to filter them too.
    pub fn filter(&self, constraints: &[Parameter]) -> Self {
        let mut filtered = Self::default();
        for location in LOCATIONS {
            for (key, entry) in self.block(location) {
                let keep = match entry {
                    Indirect::Direct(param) => constraints.iter().all(|c| param.is_valid(c)),
                    Indirect::Ref(_) => true,
                };
                if keep {
                    filtered.block_mut(location).insert(key.clone(), entry.clone());
                } else {
                    tracing::debug!(location = ?location, key = %key, "parameter filtered out");
                }
            }
        }
        filtered
    }

    /// Inline headers keyed by their header name.
    pub fn headers_set(&self) -> IndexMap<&str, &Parameter> {
        self.headers
            .values()
            .filter_map(Indirect::as_direct)
            .filter_map(|param| Some((param.key.as_deref()?, param)))
            .collect()
    }
}

impl From<Parameter> for Indirect<Parameter> {
    fn from(param: Parameter) -> Self {
        Indirect::Direct(param)
    }
}
