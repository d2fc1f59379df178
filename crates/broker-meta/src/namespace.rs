//! Env key namespaces for session files

use crate::schema::Session;

/// Session field a namespace may persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionField {
    ServiceUrl,
    JwtToken,
    SessionCookies,
    Username,
    Password,
    AuthType,
    SapClient,
    Language,
    UaaUrl,
    UaaClientId,
    UaaClientSecret,
    RefreshToken,
}

impl SessionField {
    pub const ALL: [SessionField; 12] = [
        Self::ServiceUrl,
        Self::JwtToken,
        Self::SessionCookies,
        Self::Username,
        Self::Password,
        Self::AuthType,
        Self::SapClient,
        Self::Language,
        Self::UaaUrl,
        Self::UaaClientId,
        Self::UaaClientSecret,
        Self::RefreshToken,
    ];

    /// camelCase name, matching the serialized record.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ServiceUrl => "serviceUrl",
            Self::JwtToken => "jwtToken",
            Self::SessionCookies => "sessionCookies",
            Self::Username => "username",
            Self::Password => "password",
            Self::AuthType => "authType",
            Self::SapClient => "sapClient",
            Self::Language => "language",
            Self::UaaUrl => "uaaUrl",
            Self::UaaClientId => "uaaClientId",
            Self::UaaClientSecret => "uaaClientSecret",
            Self::RefreshToken => "refreshToken",
        }
    }

    /// Whether `session` has a value for this field.
    pub fn is_set(&self, session: &Session) -> bool {
        match self {
            Self::AuthType => session.auth_type.is_some(),
            _ => self.text(session).is_some(),
        }
    }

    /// The field's string value, if it holds one.
    pub fn text<'a>(&self, session: &'a Session) -> Option<&'a str> {
        let value = match self {
            Self::ServiceUrl => &session.service_url,
            Self::JwtToken => &session.jwt_token,
            Self::SessionCookies => &session.session_cookies,
            Self::Username => &session.username,
            Self::Password => &session.password,
            Self::AuthType => return session.auth_type.map(|t| t.as_str()),
            Self::SapClient => &session.sap_client,
            Self::Language => &session.language,
            Self::UaaUrl => &session.uaa_url,
            Self::UaaClientId => &session.uaa_client_id,
            Self::UaaClientSecret => &session.uaa_client_secret,
            Self::RefreshToken => &session.refresh_token,
        };
        value.as_deref()
    }

    /// Mutable slot for string-valued fields; `None` for `AuthType`.
    pub fn slot<'a>(&self, session: &'a mut Session) -> Option<&'a mut Option<String>> {
        Some(match self {
            Self::ServiceUrl => &mut session.service_url,
            Self::JwtToken => &mut session.jwt_token,
            Self::SessionCookies => &mut session.session_cookies,
            Self::Username => &mut session.username,
            Self::Password => &mut session.password,
            Self::AuthType => return None,
            Self::SapClient => &mut session.sap_client,
            Self::Language => &mut session.language,
            Self::UaaUrl => &mut session.uaa_url,
            Self::UaaClientId => &mut session.uaa_client_id,
            Self::UaaClientSecret => &mut session.uaa_client_secret,
            Self::RefreshToken => &mut session.refresh_token,
        })
    }
}

/// Family of env keys a session file is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyNamespace {
    /// `SAP_*` keys used by ABAP destinations
    Sap,
    /// `XSUAA_*` keys used by XSUAA and base BTP destinations
    Xsuaa,
}

const SAP_KEYS: &[(SessionField, &str)] = &[
    (SessionField::ServiceUrl, "SAP_URL"),
    (SessionField::JwtToken, "SAP_JWT_TOKEN"),
    (SessionField::SessionCookies, "SAP_SESSION_COOKIES_B64"),
    (SessionField::Username, "SAP_USERNAME"),
    (SessionField::Password, "SAP_PASSWORD"),
    (SessionField::SapClient, "SAP_CLIENT"),
    (SessionField::Language, "SAP_LANGUAGE"),
    (SessionField::AuthType, "SAP_AUTH_TYPE"),
    (SessionField::UaaUrl, "SAP_UAA_URL"),
    (SessionField::UaaClientId, "SAP_UAA_CLIENT_ID"),
    (SessionField::UaaClientSecret, "SAP_UAA_CLIENT_SECRET"),
    (SessionField::RefreshToken, "SAP_REFRESH_TOKEN"),
];

const XSUAA_KEYS: &[(SessionField, &str)] = &[
    (SessionField::ServiceUrl, "XSUAA_MCP_URL"),
    (SessionField::JwtToken, "XSUAA_JWT_TOKEN"),
    (SessionField::UaaUrl, "XSUAA_UAA_URL"),
    (SessionField::UaaClientId, "XSUAA_UAA_CLIENT_ID"),
    (SessionField::UaaClientSecret, "XSUAA_UAA_CLIENT_SECRET"),
    (SessionField::RefreshToken, "XSUAA_REFRESH_TOKEN"),
];

impl KeyNamespace {
    pub const ALL: [KeyNamespace; 2] = [Self::Sap, Self::Xsuaa];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sap => "SAP",
            Self::Xsuaa => "XSUAA",
        }
    }

    /// Field-to-key table in write order.
    pub fn entries(&self) -> &'static [(SessionField, &'static str)] {
        match self {
            Self::Sap => SAP_KEYS,
            Self::Xsuaa => XSUAA_KEYS,
        }
    }

    pub fn key(&self, field: SessionField) -> Option<&'static str> {
        self.entries()
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, key)| *key)
    }

    pub fn supports(&self, field: SessionField) -> bool {
        self.key(field).is_some()
    }

    pub fn keys(self) -> impl Iterator<Item = &'static str> {
        self.entries().iter().map(|(_, key)| *key)
    }

    /// Every key of every namespace, for stripping legacy entries.
    pub fn all_keys() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().flat_map(|ns| ns.keys())
    }
}

impl std::fmt::Display for KeyNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
