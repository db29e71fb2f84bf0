//! Applicability modes of requests and responses.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::container::ParameterContainer;
use crate::parameter::Parameter;
use crate::reference::Reference;

/// One mode a request or response can be in, e.g. "sent as JSON".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    /// Parameters carrying the concrete values that define the mode.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Parameter>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub context_type: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub implements: IndexMap<String, Reference>,
}

impl Context {
    pub fn new(constraints: Vec<Parameter>) -> Self {
        Self {
            constraints,
            ..Default::default()
        }
    }

    /// The part of `container` applicable in this context.
    pub fn filter(&self, container: &ParameterContainer) -> ParameterContainer {
        container.filter(&self.constraints)
    }
}
