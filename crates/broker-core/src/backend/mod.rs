//! Persistence backends for session stores

mod env_file;
mod memory;

pub use env_file::EnvFileBackend;
pub use memory::MemoryBackend;

use async_trait::async_trait;
use broker_meta::{KeyNamespace, Session};

use crate::Result;

/// Where a session store keeps its records.
///
/// A backend only moves whole records. Merging and validation happen in
/// the store before [`SessionBackend::write`] is called.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Short name for logs, e.g. `env-file`.
    fn name(&self) -> &'static str;

    /// The stored record, `None` when the destination has none.
    async fn read(&self, destination: &str, namespace: KeyNamespace) -> Result<Option<Session>>;

    /// Replace the stored record with `session`.
    async fn write(&self, destination: &str, namespace: KeyNamespace, session: &Session) -> Result<()>;

    /// Drop the record; `false` when there was nothing to drop.
    async fn remove(&self, destination: &str) -> Result<bool>;

    /// Destinations that currently have a record, sorted.
    async fn list(&self) -> Result<Vec<String>>;
}
