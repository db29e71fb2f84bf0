//! Authentication schemes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::reference::Reference;

/// An authentication scheme, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Auth {
    Basic(BasicAuth),
    Digest(DigestAuth),
    Ntlm(DigestAuth),
    Negotiate(DigestAuth),
    ApiKey(ApiKeyAuth),
    #[serde(rename = "oauth-1")]
    OAuth1(OAuth1Auth),
    #[serde(rename = "oauth-2")]
    OAuth2(OAuth2Auth),
    #[serde(rename = "aws-sig-4")]
    AwsSig4(AwsSig4Auth),
    Hawk(HawkAuth),
    Custom(CustomAuth),
}

impl Auth {
    /// Name of the scheme as declared in the source document.
    pub fn auth_name(&self) -> Option<&str> {
        match self {
            Auth::Basic(a) => a.auth_name.as_deref(),
            Auth::Digest(a) | Auth::Ntlm(a) | Auth::Negotiate(a) => a.auth_name.as_deref(),
            Auth::ApiKey(a) => a.auth_name.as_deref(),
            Auth::OAuth1(a) => a.auth_name.as_deref(),
            Auth::OAuth2(a) => a.auth_name.as_deref(),
            Auth::AwsSig4(a) => a.auth_name.as_deref(),
            Auth::Hawk(a) => a.auth_name.as_deref(),
            Auth::Custom(a) => a.auth_name.as_deref(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Auth::Basic(a) => a.description.as_deref(),
            Auth::Digest(a) | Auth::Ntlm(a) | Auth::Negotiate(a) => a.description.as_deref(),
            Auth::ApiKey(a) => a.description.as_deref(),
            Auth::OAuth1(a) => a.description.as_deref(),
            Auth::OAuth2(a) => a.description.as_deref(),
            Auth::AwsSig4(a) => a.description.as_deref(),
            Auth::Hawk(a) => a.description.as_deref(),
            Auth::Custom(a) => a.description.as_deref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Auth::Basic(_) => "basic",
            Auth::Digest(_) => "digest",
            Auth::Ntlm(_) => "ntlm",
            Auth::Negotiate(_) => "negotiate",
            Auth::ApiKey(_) => "api-key",
            Auth::OAuth1(_) => "oauth-1",
            Auth::OAuth2(_) => "oauth-2",
            Auth::AwsSig4(_) => "aws-sig-4",
            Auth::Hawk(_) => "hawk",
            Auth::Custom(_) => "custom",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BasicAuth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Pre-encoded `user:password` credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// Username/password schemes negotiated by the transport (Digest, NTLM, Negotiate).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DigestAuth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Query,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiKeyAuth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_name: Option<String>,
    /// Header or query parameter carrying the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ApiKeyLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OAuth1Auth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_parameters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_token_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_credentials_uri: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OAuth2Flow {
    Implicit,
    Password,
    Application,
    AccessCode,
}

impl OAuth2Flow {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "implicit" => Some(OAuth2Flow::Implicit),
            "password" => Some(OAuth2Flow::Password),
            "application" => Some(OAuth2Flow::Application),
            "accessCode" => Some(OAuth2Flow::AccessCode),
            _ => None,
        }
    }
}

/// One OAuth2 scope and its description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Scope {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OAuth2Auth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<OAuth2Flow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<Scope>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AwsSig4Auth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HawkAuth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

/// A scheme with no standard shape, described by free-form setup text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomAuth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub interfaces: IndexMap<String, Reference>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tagged_by_type() {
        let auth = Auth::ApiKey(ApiKeyAuth {
            auth_name: Some("api_key".into()),
            name: Some("X-API-Key".into()),
            location: Some(ApiKeyLocation::Header),
            ..Default::default()
        });
        assert_eq!(
            serde_json::to_value(&auth).unwrap(),
            json!({ "type": "api-key", "authName": "api_key", "name": "X-API-Key", "in": "header" })
        );
    }

    #[test]
    fn oauth2_round_trip() {
        let value = json!({
            "type": "oauth-2",
            "flow": "accessCode",
            "authorizationUrl": "https://auth.example.com/authorize",
            "scopes": [{ "key": "read:pets", "value": "read your pets" }]
        });
        let auth: Auth = serde_json::from_value(value.clone()).unwrap();
        let Auth::OAuth2(oauth) = &auth else {
            panic!("expected oauth2");
        };
        assert_eq!(oauth.flow, Some(OAuth2Flow::AccessCode));
        assert_eq!(oauth.scopes[0].key, "read:pets");
        assert_eq!(serde_json::to_value(&auth).unwrap(), value);
    }

    #[test]
    fn auth_name_and_kind() {
        let auth = Auth::Ntlm(DigestAuth {
            auth_name: Some("corp".into()),
            ..Default::default()
        });
        assert_eq!(auth.auth_name(), Some("corp"));
        assert_eq!(auth.kind(), "ntlm");
    }
}
