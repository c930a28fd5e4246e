//! Session-scoped key/value storage
//!
//! The request layer owns session identity; the core only sees an explicit
//! `session_id` and this narrow store interface.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Session key/value store with per-entry expiry
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<String>, SessionStoreError>;

    /// Insert or overwrite; the entry expires `ttl` from now
    async fn set(
        &self,
        session_id: &str,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), SessionStoreError>;

    async fn remove(&self, session_id: &str, key: &str) -> Result<(), SessionStoreError>;
}

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Process-local [`SessionStore`]
///
/// Expired entries are invisible to `get` immediately and are dropped by
/// [`purge_expired`](Self::purge_expired).
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<(String, String), StoredValue>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, stored| stored.expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<String>, SessionStoreError> {
        let entries = self.entries.read().await;
        let found = entries
            .get(&(session_id.to_string(), key.to_string()))
            .filter(|stored| stored.expires_at > Utc::now())
            .map(|stored| stored.value.clone());
        Ok(found)
    }

    async fn set(
        &self,
        session_id: &str,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let expires_at = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
            SessionStoreError::Unavailable(format!("ttl {} overflows the clock", ttl))
        })?;
        let stored = StoredValue { value, expires_at };
        self.entries
            .write()
            .await
            .insert((session_id.to_string(), key.to_string()), stored);
        Ok(())
    }

    async fn remove(&self, session_id: &str, key: &str) -> Result<(), SessionStoreError> {
        self.entries
            .write()
            .await
            .remove(&(session_id.to_string(), key.to_string()));
        Ok(())
    }
}
