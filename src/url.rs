//! Endpoint urls and templated url components.
//!
//! A templated component such as `/users/{userId}` is kept as a sequence
//! [`Parameter`]: literal sections alternate with variables, always starting
//! with a literal (possibly empty) section.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constraint::Constraint;
use crate::parameter::{Parameter, ParameterValue};

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^([^:./?#]+:)?(?://(?:([^:@/?#]*)(?::([^:@/?#]*))?@)?(([^:/?#]*)(?::(\d*))?))?([^?#]*)(\?[^#]*)?(#[\s\S]*)?",
        )
        .expect("static regex")
    })
}

/// Split `s` into alternating literal and variable sections.
///
/// With `["{", "}"]`, `/a/{userId}/path/{pathId}` gives
/// `["/a/", "userId", "/path/", "pathId", ""]`. A single delimiter is used on both sides.
pub fn extract_sections(s: &str, delimiters: &[String]) -> Vec<String> {
    let Some(open) = delimiters.first() else {
        return vec![s.to_string()];
    };
    let close = delimiters.get(1).unwrap_or(open);
    let pattern = format!("{}(.+?){}", regex::escape(open), regex::escape(close));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(_) => return vec![s.to_string()],
    };

    let mut sections = Vec::new();
    let mut last = 0;
    for caps in re.captures_iter(s) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        sections.push(s[last..whole.start()].to_string());
        sections.push(name.as_str().to_string());
        last = whole.end();
    }
    sections.push(s[last..].to_string());
    sections
}

/// Build the parameter describing a url component.
///
/// Without delimiters, or without any variable in `s`, the result is a plain string
/// parameter defaulting to `s`. Otherwise it is a sequence whose odd sections are
/// variables named after themselves.
pub fn to_parameter(key: &str, s: &str, delimiters: &[String]) -> Parameter {
    let simple = |key: Option<&str>, value: &str| Parameter {
        key: key.map(str::to_string),
        name: key.map(str::to_string),
        param_type: Some("string".into()),
        default: Some(Value::String(value.to_string())),
        ..Default::default()
    };

    if delimiters.is_empty() {
        return simple(Some(key), s);
    }

    let sections = extract_sections(s, delimiters);
    if sections.len() == 1 {
        return simple(Some(key), &sections[0]);
    }

    let sequence = sections
        .iter()
        .enumerate()
        .map(|(index, section)| simple((index % 2 == 1).then_some(section.as_str()), section))
        .collect();

    Parameter {
        key: Some(key.to_string()),
        name: Some(key.to_string()),
        param_type: Some("string".into()),
        value: Some(ParameterValue::Sequence(sequence)),
        ..Default::default()
    }
}

/// One part of a url (host, pathname, ...) and the parameter describing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlComponent {
    pub component_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    pub parameter: Parameter,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable_delimiters: Vec<String>,
}

impl UrlComponent {
    pub fn new(name: &str, s: &str, delimiters: &[String]) -> Self {
        Self {
            component_name: name.to_string(),
            string: Some(s.to_string()),
            parameter: to_parameter(name, s, delimiters),
            variable_delimiters: delimiters.to_vec(),
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.parameter.constraints.push(constraint);
        self
    }

    /// Render the component, wrapping variables in `delimiters`.
    ///
    /// With no delimiters, variables render as their own names.
    pub fn generate(&self, delimiters: &[String]) -> Option<String> {
        let mut parameter = self.parameter.clone();
        if let (Some(open), Some(ParameterValue::Sequence(sequence))) =
            (delimiters.first(), parameter.value.as_mut())
        {
            let close = delimiters.get(1).unwrap_or(open);
            for section in sequence.iter_mut().skip(1).step_by(2) {
                let name = section.key.clone().unwrap_or_default();
                section.default = Some(Value::String(format!("{}{}{}", open, name, close)));
            }
        }

        match parameter.generate(true)? {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Where an API, or one of its requests, is served.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Url {
    /// Schemes with their trailing colon, e.g. `["https:"]`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub protocol: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<UrlComponent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pathname: Option<UrlComponent>,
    pub secure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variable_delimiters: Vec<String>,
}

impl Url {
    /// Split a url string into protocol, host and pathname.
    ///
    /// Query strings and fragments are not kept.
    pub fn parse(s: &str, delimiters: &[String]) -> Self {
        let Some(caps) = url_regex().captures(s.trim()) else {
            return Self::default();
        };
        let group = |i: usize| caps.get(i).map(|m| m.as_str()).filter(|m| !m.is_empty());

        let protocol: Vec<String> = group(1).map(str::to_string).into_iter().collect();
        Self {
            secure: protocol.iter().any(|p| p == "https:"),
            protocol,
            host: group(4).map(|h| UrlComponent::new("host", h, delimiters)),
            pathname: group(7).map(|p| UrlComponent::new("pathname", p, delimiters)),
            description: None,
            variable_delimiters: delimiters.to_vec(),
        }
    }

    /// Url from already separated parts.
    pub fn from_parts(protocol: Vec<String>, host: &str, pathname: &str) -> Self {
        Self {
            secure: protocol.iter().any(|p| p == "https:"),
            protocol,
            host: Some(UrlComponent::new("host", host, &[])),
            pathname: Some(UrlComponent::new("pathname", pathname, &[])),
            ..Default::default()
        }
    }

    /// A url holding only a templated pathname.
    pub fn path(pathname: &str, delimiters: &[String]) -> Self {
        Self {
            pathname: Some(UrlComponent::new("pathname", pathname, delimiters)),
            variable_delimiters: delimiters.to_vec(),
            ..Default::default()
        }
    }

    /// Concrete url string, using the first protocol.
    ///
    /// Variables are re-wrapped in this url's own delimiters.
    pub fn href(&self) -> String {
        let host = self
            .host
            .as_ref()
            .and_then(|h| h.generate(&self.variable_delimiters))
            .unwrap_or_default();
        let pathname = self
            .pathname
            .as_ref()
            .and_then(|p| p.generate(&self.variable_delimiters))
            .unwrap_or_default();

        let mut protocol = self.protocol.first().cloned().unwrap_or_default();
        if protocol.is_empty() && !host.is_empty() {
            protocol = "http:".into();
        }

        let mut href = protocol;
        if !href.is_empty() || !host.is_empty() {
            href.push_str("//");
        }
        href.push_str(&host);
        href.push_str(&pathname);
        href
    }
}
