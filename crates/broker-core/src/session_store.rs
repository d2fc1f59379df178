//! Session stores
//!
//! Every store kind runs the same engine, [`PolicySessionStore`], and
//! differs only in its [`SessionPolicy`] and [`SessionBackend`]:
//!
//! | Alias | Backend |
//! |---|---|
//! | [`FileSessionStore`] | `{destination}.env` files |
//! | [`SafeSessionStore`] | process memory only |
//!
//! Writes are read-modify-write cycles: the stored record is read, the
//! update is merged onto it with [`Session::merge`], and the whole record
//! is written back. Cycles for one destination are serialized within a
//! store instance; separate processes writing the same file still race
//! and the last rename wins.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use broker_fs::{PathResolver, validate_path_identifier};
use broker_meta::{
    AuthType, AuthorizationConfig, ConnectionConfig, KeyNamespace, Session, SessionField,
};
use tokio::sync::Mutex;

use crate::backend::{EnvFileBackend, MemoryBackend, SessionBackend};
use crate::error::{Error, Result};
use crate::policy::SessionPolicy;

/// Read and update token-bearing session state per destination.
///
/// Getters return `Ok(None)` for a destination without a session. Setters
/// treat their argument as a partial update: `None` fields keep the stored
/// value, `Some("")` clears it.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_authorization_config(&self, destination: &str) -> Result<Option<AuthorizationConfig>>;

    async fn set_authorization_config(&self, destination: &str, config: &AuthorizationConfig) -> Result<()>;

    async fn get_connection_config(&self, destination: &str) -> Result<Option<ConnectionConfig>>;

    async fn set_connection_config(&self, destination: &str, config: &ConnectionConfig) -> Result<()>;

    /// The full stored record.
    async fn load_session(&self, destination: &str) -> Result<Option<Session>>;

    /// Merge every field set on `session` onto the stored record.
    async fn save_session(&self, destination: &str, session: &Session) -> Result<()>;

    /// Remove the session. Returns `false`, not an error, when there was none.
    async fn delete_session(&self, destination: &str) -> Result<bool>;

    /// Destinations with a stored session, sorted.
    async fn list_destinations(&self) -> Result<Vec<String>>;
}

/// Session store engine parameterized by policy and backend.
#[derive(Debug)]
pub struct PolicySessionStore<B> {
    policy: SessionPolicy,
    backend: B,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Session store persisting to env files.
pub type FileSessionStore = PolicySessionStore<EnvFileBackend>;

/// Session store that never touches disk.
pub type SafeSessionStore = PolicySessionStore<MemoryBackend>;

impl<B: SessionBackend> PolicySessionStore<B> {
    pub fn new(policy: SessionPolicy, backend: B) -> Self {
        Self {
            policy,
            backend,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn validate_destination(&self, destination: &str) -> Result<()> {
        validate_path_identifier(destination)
            .map_err(|e| Error::invalid_config(destination, e.to_string()))
    }

    async fn destination_lock(&self, destination: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(destination.to_string())
            .or_default()
            .clone()
    }

    /// Forget the lock of a deleted destination unless another call holds it.
    async fn release_destination_lock(&self, destination: &str, lock: &Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // One reference lives in the map, one with the caller.
        if Arc::strong_count(lock) == 2 {
            locks.remove(destination);
        }
    }

    async fn read(&self, destination: &str) -> Result<Option<Session>> {
        self.validate_destination(destination)?;
        self.backend.read(destination, self.policy.namespace).await
    }

    /// Reject or drop update fields the policy's namespace cannot persist.
    fn fit_to_namespace(&self, destination: &str, mut update: Session) -> Result<Session> {
        let namespace = self.policy.namespace;

        for field in SessionField::ALL {
            if namespace.supports(field) || !field.is_set(&update) {
                continue;
            }
            match field {
                SessionField::Username | SessionField::Password | SessionField::SessionCookies
                    if field.text(&update).is_some_and(|v| !v.is_empty()) =>
                {
                    return Err(self.kind_mismatch(destination, field.name()));
                }
                SessionField::AuthType => {
                    if let Some(auth_type @ (AuthType::Basic | AuthType::Saml)) = update.auth_type {
                        return Err(self.kind_mismatch(destination, &format!("{auth_type} authentication")));
                    }
                }
                SessionField::SapClient | SessionField::Language => {
                    tracing::warn!(
                        destination,
                        store = self.policy.label(),
                        field = field.name(),
                        "Dropping field the session namespace cannot hold"
                    );
                }
                _ => {}
            }
        }

        strip_unsupported(namespace, &mut update);
        Ok(update)
    }

    fn kind_mismatch(&self, destination: &str, field: &str) -> Error {
        Error::KindMismatch {
            destination: destination.to_string(),
            store: self.policy.label().to_string(),
            field: field.to_string(),
        }
    }

    /// A new session takes the update's URL, else the policy default.
    /// An explicitly empty URL is kept and counts as unresolved.
    fn resolve_service_url(&self, destination: &str, session: &mut Session) -> Result<()> {
        if session.service_url.is_none() {
            if let Some(default) = &self.policy.default_service_url {
                tracing::debug!(destination, url = %default, "Using default service URL");
                session.service_url = Some(default.clone());
            }
        }
        if self.policy.require_service_url && session.service_url.as_deref().is_none_or(str::is_empty) {
            return Err(Error::invalid_config(destination, "serviceUrl is required"));
        }
        Ok(())
    }

    /// Merge `update` onto the stored record and persist the result.
    async fn update(&self, destination: &str, update: Session) -> Result<()> {
        self.validate_destination(destination)?;
        let update = self.fit_to_namespace(destination, update)?;

        let lock = self.destination_lock(destination).await;
        let _guard = lock.lock().await;

        let namespace = self.policy.namespace;
        let existing = self.backend.read(destination, namespace).await?;
        let created = existing.is_none();

        let mut session = existing.unwrap_or_default();
        session.merge(&update);
        strip_unsupported(namespace, &mut session);
        if created {
            self.resolve_service_url(destination, &mut session)?;
        }

        self.backend.write(destination, namespace, &session).await?;

        if created {
            tracing::info!(
                destination,
                store = self.policy.label(),
                backend = self.backend.name(),
                "Created session"
            );
        } else {
            tracing::debug!(destination, store = self.policy.label(), "Updated session");
        }
        Ok(())
    }
}

fn strip_unsupported(namespace: KeyNamespace, session: &mut Session) {
    for field in SessionField::ALL {
        if namespace.supports(field) {
            continue;
        }
        if field == SessionField::AuthType {
            session.auth_type = None;
        } else if let Some(slot) = field.slot(session) {
            *slot = None;
        }
    }
}

impl PolicySessionStore<EnvFileBackend> {
    pub fn with_policy(policy: SessionPolicy, resolver: PathResolver) -> Self {
        Self::new(policy, EnvFileBackend::new(resolver))
    }

    /// Store for ABAP destinations; `SAP_*` keys, service URL required.
    pub fn abap(resolver: PathResolver) -> Self {
        Self::with_policy(SessionPolicy::abap(), resolver)
    }

    /// Store for base BTP destinations; `XSUAA_*` keys.
    pub fn btp(resolver: PathResolver) -> Self {
        Self::with_policy(SessionPolicy::btp(), resolver)
    }

    /// Store for XSUAA destinations; `XSUAA_*` keys.
    pub fn xsuaa(resolver: PathResolver) -> Self {
        Self::with_policy(SessionPolicy::xsuaa(), resolver)
    }
}

impl PolicySessionStore<MemoryBackend> {
    pub fn with_policy(policy: SessionPolicy) -> Self {
        Self::new(policy, MemoryBackend::new())
    }

    pub fn abap() -> Self {
        Self::with_policy(SessionPolicy::abap())
    }

    pub fn btp() -> Self {
        Self::with_policy(SessionPolicy::btp())
    }

    pub fn xsuaa() -> Self {
        Self::with_policy(SessionPolicy::xsuaa())
    }
}

#[async_trait]
impl<B: SessionBackend> SessionStore for PolicySessionStore<B> {
    async fn get_authorization_config(&self, destination: &str) -> Result<Option<AuthorizationConfig>> {
        Ok(self
            .read(destination)
            .await?
            .and_then(|session| session.authorization_config()))
    }

    async fn set_authorization_config(&self, destination: &str, config: &AuthorizationConfig) -> Result<()> {
        self.update(destination, Session::from_authorization(config)).await
    }

    async fn get_connection_config(&self, destination: &str) -> Result<Option<ConnectionConfig>> {
        Ok(self
            .read(destination)
            .await?
            .and_then(|session| session.connection_config()))
    }

    async fn set_connection_config(&self, destination: &str, config: &ConnectionConfig) -> Result<()> {
        self.update(destination, Session::from_connection(config)).await
    }

    async fn load_session(&self, destination: &str) -> Result<Option<Session>> {
        self.read(destination).await
    }

    async fn save_session(&self, destination: &str, session: &Session) -> Result<()> {
        self.update(destination, session.clone()).await
    }

    async fn delete_session(&self, destination: &str) -> Result<bool> {
        self.validate_destination(destination)?;

        let lock = self.destination_lock(destination).await;
        let _guard = lock.lock().await;

        let removed = self.backend.remove(destination).await;
        self.release_destination_lock(destination, &lock).await;
        let removed = removed?;
        if removed {
            tracing::info!(destination, store = self.policy.label(), "Deleted session");
        } else {
            tracing::debug!(destination, "No session to delete");
        }
        Ok(removed)
    }

    async fn list_destinations(&self) -> Result<Vec<String>> {
        self.backend.list().await
    }
}
