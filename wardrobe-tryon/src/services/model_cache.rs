//! Per-session model photo cache
//!
//! Remembers which published URL a session's person photo resolved to, so
//! later try-on submissions can omit the person image. Entries live in the
//! injected [`SessionStore`] and expire `ttl` after the most recent
//! `remember` (each call resets the window, it does not add to it).

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use super::session_store::{SessionStore, SessionStoreError};
use crate::models::ModelCacheEntry;

/// Session key under which the entry is stored
pub const MODEL_CACHE_KEY: &str = "model_image";

pub struct ModelCache {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl ModelCache {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Record the resolved person photo for `session_id`, replacing any previous entry
    pub async fn remember(
        &self,
        session_id: &str,
        published_url: &str,
        original_reference: &str,
    ) -> Result<ModelCacheEntry, SessionStoreError> {
        let entry = ModelCacheEntry {
            session_id: session_id.to_string(),
            published_url: published_url.to_string(),
            original_reference_url: original_reference.to_string(),
            permanent: true,
            remembered_at: Utc::now(),
        };

        let serialized = serde_json::to_string(&entry)
            .map_err(|e| SessionStoreError::Unavailable(format!("serialize entry: {}", e)))?;

        self.store
            .set(session_id, MODEL_CACHE_KEY, serialized, self.ttl)
            .await?;

        debug!(session_id = session_id, url = published_url, "Model photo cached for session");
        Ok(entry)
    }

    /// Entry for `session_id`, or `None`
    ///
    /// A miss is not an error. Store failures and undecodable entries are
    /// logged and reported as a miss.
    pub async fn recall(&self, session_id: &str) -> Option<ModelCacheEntry> {
        let raw = match self.store.get(session_id, MODEL_CACHE_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(session_id = session_id, error = %e, "Model cache lookup failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(session_id = session_id, error = %e, "Discarding undecodable model cache entry");
                None
            }
        }
    }

    /// Explicitly clear the session's entry
    pub async fn forget(&self, session_id: &str) -> Result<(), SessionStoreError> {
        self.store.remove(session_id, MODEL_CACHE_KEY).await
    }
}
