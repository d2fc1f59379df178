//! Canonical service key shape

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::non_empty;

/// OAuth client credentials of the UAA that issues tokens for a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UaaCredentials {
    pub url: String,
    pub clientid: String,
    pub clientsecret: String,
    /// Remaining UAA attributes (`identityzone`, `xsappname`, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The optional `abap` block describing the backend system itself.
///
/// Attributes are kept exactly as provisioned; the typed accessors only
/// interpret the ones the broker needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbapSection(Map<String, Value>);

impl AbapSection {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn url(&self) -> Option<&str> {
        non_empty(self.0.get("url").and_then(Value::as_str))
    }

    /// Client number, which some keys carry as a JSON number.
    pub fn client(&self) -> Option<Cow<'_, str>> {
        self.0.get("client").and_then(scalar_text)
    }

    pub fn language(&self) -> Option<&str> {
        non_empty(self.0.get("language").and_then(Value::as_str))
    }
}

/// Non-empty string or number attribute as text.
fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) if !s.is_empty() => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

/// A parsed service key in canonical shape.
///
/// Every accepted input shape normalizes to a nested `uaa` block plus an
/// optional `abap` block; all other root attributes are carried in
/// `fields` untouched. A service key never holds a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceKey {
    pub uaa: UaaCredentials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abap: Option<AbapSection>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ServiceKey {
    /// A non-empty string attribute at the root of the key.
    pub fn field(&self, name: &str) -> Option<&str> {
        non_empty(self.fields.get(name).and_then(Value::as_str))
    }

    /// URL of the backend system.
    ///
    /// Priority: `abap.url`, then `sap_url`, then the root `url` unless it
    /// points at the UAA (see [`ServiceKey::is_uaa_endpoint`]).
    pub fn service_url(&self) -> Option<&str> {
        self.abap
            .as_ref()
            .and_then(AbapSection::url)
            .or_else(|| self.field("sap_url"))
            .or_else(|| self.field("url").filter(|url| !Self::is_uaa_endpoint(url)))
    }

    /// SAP client number: `abap.client`, then `sap_client`, then `client`.
    pub fn sap_client(&self) -> Option<Cow<'_, str>> {
        self.abap
            .as_ref()
            .and_then(AbapSection::client)
            .or_else(|| self.fields.get("sap_client").and_then(scalar_text))
            .or_else(|| self.fields.get("client").and_then(scalar_text))
    }

    /// Logon language: `abap.language`, then `language`.
    pub fn language(&self) -> Option<&str> {
        self.abap
            .as_ref()
            .and_then(AbapSection::language)
            .or_else(|| self.field("language"))
    }

    /// Heuristic separating the UAA endpoint from a system URL when an
    /// XSUAA key carries only a root `url`.
    ///
    /// A system whose host name legitimately contains "authentication"
    /// is misclassified as a UAA endpoint.
    pub fn is_uaa_endpoint(url: &str) -> bool {
        url.contains("authentication")
    }
}
