//! Per-destination session record and its merge rule

use serde::{Deserialize, Serialize};

use super::connection::{AuthType, AuthorizationConfig, ConnectionConfig};
use super::non_empty;

/// Token-bearing state for one destination: the union of the connection
/// and authorization views.
///
/// The same type doubles as a partial update. Applying an update with
/// [`Session::merge`] overwrites every field the update sets (including
/// explicit empty strings) and keeps every field it leaves as `None`.
///
/// A session holds one authentication mode at a time. When an update
/// writes credentials of one mode, fields of the other two are cleared:
///
/// | Mode | Kept | Cleared |
/// |---|---|---|
/// | SAML | session cookies | token, username, password |
/// | basic | username, password | token, session cookies |
/// | JWT | token | username, password, session cookies |
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_token: Option<String>,
    /// Decoded cookie header value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sap_client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uaa_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uaa_client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uaa_client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update that writes the fields set on a connection config.
    pub fn from_connection(config: &ConnectionConfig) -> Self {
        Self {
            service_url: config.service_url.clone(),
            jwt_token: config.authorization_token.clone(),
            session_cookies: config.session_cookies.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            auth_type: config.auth_type,
            sap_client: config.sap_client.clone(),
            language: config.language.clone(),
            ..Self::default()
        }
    }

    /// Update that writes the UAA fields and, if set, the refresh token.
    pub fn from_authorization(config: &AuthorizationConfig) -> Self {
        Self {
            uaa_url: Some(config.uaa_url.clone()),
            uaa_client_id: Some(config.uaa_client_id.clone()),
            uaa_client_secret: Some(config.uaa_client_secret.clone()),
            refresh_token: config.refresh_token.clone(),
            ..Self::default()
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply `update` onto this record.
    pub fn merge(&mut self, update: &Session) {
        fn overwrite<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }

        overwrite(&mut self.service_url, &update.service_url);
        overwrite(&mut self.jwt_token, &update.jwt_token);
        overwrite(&mut self.session_cookies, &update.session_cookies);
        overwrite(&mut self.username, &update.username);
        overwrite(&mut self.password, &update.password);
        overwrite(&mut self.auth_type, &update.auth_type);
        overwrite(&mut self.sap_client, &update.sap_client);
        overwrite(&mut self.language, &update.language);
        overwrite(&mut self.uaa_url, &update.uaa_url);
        overwrite(&mut self.uaa_client_id, &update.uaa_client_id);
        overwrite(&mut self.uaa_client_secret, &update.uaa_client_secret);
        overwrite(&mut self.refresh_token, &update.refresh_token);

        if let Some(mode) = update.written_auth_type() {
            self.switch_auth_type(mode);
        }
    }

    /// The mode an update writes credentials for, if any.
    ///
    /// An explicit `auth_type` wins; otherwise the credentials present in
    /// the update decide.
    pub fn written_auth_type(&self) -> Option<AuthType> {
        if self.auth_type.is_some() {
            return self.auth_type;
        }
        if non_empty(self.session_cookies.as_deref()).is_some() {
            return Some(AuthType::Saml);
        }
        let has_basic = non_empty(self.username.as_deref()).is_some()
            && non_empty(self.password.as_deref()).is_some();
        let has_token = non_empty(self.jwt_token.as_deref()).is_some();
        if has_basic && !has_token {
            return Some(AuthType::Basic);
        }
        if has_token {
            return Some(AuthType::Jwt);
        }
        None
    }

    /// Mode of a stored record.
    ///
    /// Precedence: explicit `auth_type`, then session cookies, then a
    /// username/password pair without a token, otherwise JWT.
    pub fn effective_auth_type(&self) -> AuthType {
        self.written_auth_type().unwrap_or(AuthType::Jwt)
    }

    /// Make `mode` the only active mode, clearing the other modes' fields.
    pub fn switch_auth_type(&mut self, mode: AuthType) {
        self.auth_type = Some(mode);
        match mode {
            AuthType::Saml => {
                self.jwt_token = None;
                self.username = None;
                self.password = None;
            }
            AuthType::Basic => {
                self.jwt_token = None;
                self.session_cookies = None;
            }
            AuthType::Jwt => {
                self.username = None;
                self.password = None;
                self.session_cookies = None;
            }
        }
    }

    /// Whether the record holds anything a connection view can show.
    pub fn has_connection_data(&self) -> bool {
        [
            &self.service_url,
            &self.jwt_token,
            &self.session_cookies,
            &self.username,
        ]
        .into_iter()
        .any(|field| non_empty(field.as_deref()).is_some())
    }

    /// Connection view of this record, shaped by its effective mode.
    ///
    /// Non-JWT modes report an empty token.
    pub fn connection_config(&self) -> Option<ConnectionConfig> {
        if !self.has_connection_data() {
            return None;
        }

        let mode = self.effective_auth_type();
        let mut config = ConnectionConfig {
            service_url: self.service_url.clone(),
            sap_client: self.sap_client.clone(),
            language: self.language.clone(),
            auth_type: Some(mode),
            ..ConnectionConfig::default()
        };

        match mode {
            AuthType::Saml => {
                config.authorization_token = Some(String::new());
                config.session_cookies = self.session_cookies.clone();
            }
            AuthType::Basic => {
                config.authorization_token = Some(String::new());
                config.username = self.username.clone();
                config.password = self.password.clone();
            }
            AuthType::Jwt => {
                config.authorization_token = Some(self.jwt_token.clone().unwrap_or_default());
            }
        }

        Some(config)
    }

    /// Authorization view; `None` unless all three UAA fields are non-empty.
    pub fn authorization_config(&self) -> Option<AuthorizationConfig> {
        let uaa_url = non_empty(self.uaa_url.as_deref())?;
        let uaa_client_id = non_empty(self.uaa_client_id.as_deref())?;
        let uaa_client_secret = non_empty(self.uaa_client_secret.as_deref())?;

        Some(AuthorizationConfig {
            uaa_url: uaa_url.to_string(),
            uaa_client_id: uaa_client_id.to_string(),
            uaa_client_secret: uaa_client_secret.to_string(),
            refresh_token: non_empty(self.refresh_token.as_deref()).map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_keeps_explicit_empty_values() {
        let mut record = Session {
            language: Some("EN".into()),
            ..Session::default()
        };
        record.merge(&Session {
            language: Some(String::new()),
            ..Session::default()
        });
        assert_eq!(record.language.as_deref(), Some(""));
    }

    #[test]
    fn update_without_credentials_keeps_mode() {
        let mut record = Session {
            username: Some("u".into()),
            password: Some("p".into()),
            auth_type: Some(AuthType::Basic),
            ..Session::default()
        };
        record.merge(&Session {
            sap_client: Some("100".into()),
            ..Session::default()
        });
        assert_eq!(record.effective_auth_type(), AuthType::Basic);
        assert_eq!(record.username.as_deref(), Some("u"));
    }
}
