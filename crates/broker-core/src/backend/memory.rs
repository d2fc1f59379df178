//! In-memory session records

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use broker_meta::{KeyNamespace, Session};
use tokio::sync::Mutex;

use super::SessionBackend;
use crate::Result;

/// Session records held only in process memory, never written to disk.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, destination: &str, _namespace: KeyNamespace) -> Result<Option<Session>> {
        Ok(self.sessions.lock().await.get(destination).cloned())
    }

    async fn write(&self, destination: &str, _namespace: KeyNamespace, session: &Session) -> Result<()> {
        self.sessions
            .lock()
            .await
            .insert(destination.to_string(), session.clone());
        Ok(())
    }

    async fn remove(&self, destination: &str) -> Result<bool> {
        Ok(self.sessions.lock().await.remove(destination).is_some())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
