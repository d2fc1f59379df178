//! Connection and authorization views

use serde::{Deserialize, Serialize};

/// How requests to a destination authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// Username and password
    Basic,
    /// Bearer token
    Jwt,
    /// Session cookies obtained through a SAML login
    Saml,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Jwt => "jwt",
            Self::Saml => "saml",
        }
    }

    /// Case-insensitive parse of the persisted form.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "jwt" => Some(Self::Jwt),
            "saml" => Some(Self::Saml),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime connection parameters for a destination.
///
/// Used both as a full view (returned by stores) and as a partial update
/// (handed to `set_connection_config`). In an update `None` means "keep
/// the stored value" while `Some("")` explicitly clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sap_client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookies: Option<String>,
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = Some(url.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.authorization_token = Some(token.into());
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_session_cookies(mut self, cookies: impl Into<String>) -> Self {
        self.session_cookies = Some(cookies.into());
        self
    }

    pub fn with_sap_client(mut self, client: impl Into<String>) -> Self {
        self.sap_client = Some(client.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_auth_type(mut self, auth_type: AuthType) -> Self {
        self.auth_type = Some(auth_type);
        self
    }
}

/// Fields needed to mint or refresh a token.
///
/// A view exists only when all three UAA fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationConfig {
    pub uaa_url: String,
    pub uaa_client_id: String,
    pub uaa_client_secret: String,
    /// `None` in an update keeps the stored refresh token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl AuthorizationConfig {
    pub fn new(
        uaa_url: impl Into<String>,
        uaa_client_id: impl Into<String>,
        uaa_client_secret: impl Into<String>,
    ) -> Self {
        Self {
            uaa_url: uaa_url.into(),
            uaa_client_id: uaa_client_id.into(),
            uaa_client_secret: uaa_client_secret.into(),
            refresh_token: None,
        }
    }

    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    pub fn is_complete(&self) -> bool {
        !self.uaa_url.is_empty() && !self.uaa_client_id.is_empty() && !self.uaa_client_secret.is_empty()
    }
}

/// Both views of a destination's credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationCredentials {
    pub authorization: Option<AuthorizationConfig>,
    pub connection: Option<ConnectionConfig>,
}

impl DestinationCredentials {
    /// `None` when neither view is present.
    pub fn from_views(
        authorization: Option<AuthorizationConfig>,
        connection: Option<ConnectionConfig>,
    ) -> Option<Self> {
        if authorization.is_none() && connection.is_none() {
            return None;
        }
        Some(Self {
            authorization,
            connection,
        })
    }
}
