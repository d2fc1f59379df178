//! Read-only access to `{destination}.json` service keys

use std::borrow::Cow;

use async_trait::async_trait;
use broker_content::JsonFileHandler;
use broker_fs::{FileKind, PathResolver, validate_path_identifier};
use broker_meta::{
    AuthorizationConfig, ConnectionConfig, DestinationCredentials, ServiceKey, parse_service_key,
};

use crate::error::{Error, Result};

/// Views over a destination's provisioned service key.
///
/// A missing key file is `Ok(None)`. A key that exists but cannot be
/// parsed is always an error.
#[async_trait]
pub trait ServiceKeyStore: Send + Sync {
    /// Both views; `None` only when neither is available.
    async fn get_service_key(&self, destination: &str) -> Result<Option<DestinationCredentials>>;

    /// The parsed key in canonical shape.
    async fn load_service_key(&self, destination: &str) -> Result<Option<ServiceKey>>;

    async fn get_authorization_config(&self, destination: &str) -> Result<Option<AuthorizationConfig>>;

    async fn get_connection_config(&self, destination: &str) -> Result<Option<ConnectionConfig>>;

    /// Destinations with a key file in any search directory, sorted.
    async fn list_destinations(&self) -> Result<Vec<String>>;
}

/// Service key store over JSON files found through a [`PathResolver`].
#[derive(Debug)]
pub struct JsonServiceKeyStore {
    resolver: PathResolver,
    handler: JsonFileHandler,
}

impl JsonServiceKeyStore {
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            resolver,
            handler: JsonFileHandler::new(),
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    fn read(&self, destination: &str) -> Result<Option<ServiceKey>> {
        validate_path_identifier(destination)
            .map_err(|e| Error::invalid_config(destination, e.to_string()))?;

        let Some(path) = self.resolver.find_file(&FileKind::ServiceKey.file_name(destination)) else {
            return Ok(None);
        };
        let Some(raw) = self.handler.load(&path)? else {
            return Ok(None);
        };

        let key = parse_service_key(&raw).inspect_err(|e| {
            tracing::debug!(%path, error = %e, "Rejected service key");
        })?;
        Ok(Some(key))
    }
}

/// Authorization view of a key; `None` unless all UAA fields are non-empty.
pub fn authorization_view(key: &ServiceKey) -> Option<AuthorizationConfig> {
    Some(AuthorizationConfig::new(&key.uaa.url, &key.uaa.clientid, &key.uaa.clientsecret))
        .filter(AuthorizationConfig::is_complete)
}

/// Connection view of a key; `None` when no system URL can be derived.
///
/// Service keys carry no token, so the token is always empty.
pub fn connection_view(key: &ServiceKey) -> Option<ConnectionConfig> {
    let service_url = key.service_url()?;
    Some(ConnectionConfig {
        service_url: Some(service_url.to_string()),
        authorization_token: Some(String::new()),
        sap_client: key.sap_client().map(Cow::into_owned),
        language: key.language().map(str::to_string),
        ..ConnectionConfig::default()
    })
}

#[async_trait]
impl ServiceKeyStore for JsonServiceKeyStore {
    async fn get_service_key(&self, destination: &str) -> Result<Option<DestinationCredentials>> {
        Ok(self.read(destination)?.and_then(|key| {
            DestinationCredentials::from_views(authorization_view(&key), connection_view(&key))
        }))
    }

    async fn load_service_key(&self, destination: &str) -> Result<Option<ServiceKey>> {
        self.read(destination)
    }

    async fn get_authorization_config(&self, destination: &str) -> Result<Option<AuthorizationConfig>> {
        Ok(self.read(destination)?.as_ref().and_then(authorization_view))
    }

    async fn get_connection_config(&self, destination: &str) -> Result<Option<ConnectionConfig>> {
        Ok(self.read(destination)?.as_ref().and_then(connection_view))
    }

    async fn list_destinations(&self) -> Result<Vec<String>> {
        Ok(self.resolver.list_stems(FileKind::ServiceKey.extension())?)
    }
}
