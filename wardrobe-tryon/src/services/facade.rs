//! Try-on facade
//!
//! The single entry point the request layer talks to:
//! - [`submit_try_on`](TryOnFacade::submit_try_on): person photo from the
//!   session's model cache when omitted, then submit; returns immediately
//! - [`poll_try_on`](TryOnFacade::poll_try_on): one provider status query
//! - [`resolve_and_cache_model`](TryOnFacade::resolve_and_cache_model):
//!   publish a person photo and remember it for the session

use chrono::Duration;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use super::errors::TryOnError;
use super::model_cache::ModelCache;
use super::provider::ImagingProvider;
use super::resolver::ResourceResolver;
use super::session_store::SessionStore;
use super::storage::ObjectStorage;
use super::status_tracker::StatusTracker;
use super::submitter::{GarmentRefs, TaskSubmitter};
use crate::models::{ImageReference, ModelCacheEntry, TaskHandle, TryOnMode, TryOnTask};

/// Task id meaning "the result was returned synchronously; no remote job exists"
pub const SYNC_RESULT_TASK_ID: &str = "sync-result";

/// Tunables the facade's components are built with
#[derive(Debug, Clone)]
pub struct FacadeSettings {
    /// Prefix for object storage keys
    pub key_prefix: String,
    /// Provider model name
    pub model: String,
    /// Model cache entry lifetime
    pub session_ttl: Duration,
    /// Local references must resolve under this folder; `None` allows any path
    pub upload_root: Option<PathBuf>,
}

impl Default for FacadeSettings {
    fn default() -> Self {
        Self {
            key_prefix: "tryon/".to_string(),
            model: "aitryon".to_string(),
            session_ttl: Duration::days(7),
            upload_root: None,
        }
    }
}

pub struct TryOnFacade {
    resolver: Arc<ResourceResolver>,
    model_cache: ModelCache,
    submitter: TaskSubmitter,
    tracker: StatusTracker,
}

impl TryOnFacade {
    pub fn new(
        resolver: Arc<ResourceResolver>,
        model_cache: ModelCache,
        submitter: TaskSubmitter,
        tracker: StatusTracker,
    ) -> Self {
        Self {
            resolver,
            model_cache,
            submitter,
            tracker,
        }
    }

    /// Wire the components around the three collaborators
    pub fn assemble(
        storage: Arc<dyn ObjectStorage>,
        provider: Arc<dyn ImagingProvider>,
        sessions: Arc<dyn SessionStore>,
        settings: &FacadeSettings,
    ) -> Self {
        let mut resolver = ResourceResolver::new(storage, settings.key_prefix.clone());
        if let Some(root) = &settings.upload_root {
            resolver = resolver.with_root(root.clone());
        }
        let resolver = Arc::new(resolver);
        let model_cache = ModelCache::new(sessions, settings.session_ttl);
        let submitter = TaskSubmitter::new(resolver.clone(), provider.clone(), settings.model.clone());
        let tracker = StatusTracker::new(provider);
        Self::new(resolver, model_cache, submitter, tracker)
    }

    /// Submit a try-on job
    ///
    /// When `person` is `None` the session's cached model photo is used; with
    /// no session or no cached photo this fails with `MissingInput`.
    pub async fn submit_try_on(
        &self,
        person: Option<ImageReference>,
        mode: TryOnMode,
        garments: &GarmentRefs,
        session_id: Option<&str>,
    ) -> Result<TaskHandle, TryOnError> {
        let person = match person {
            Some(person) => person,
            None => self.cached_person(session_id).await?,
        };

        self.submitter.submit(&person, mode, garments).await
    }

    /// Current state of a task
    pub async fn poll_try_on(&self, task_id: &str) -> Result<TryOnTask, TryOnError> {
        if task_id == SYNC_RESULT_TASK_ID {
            debug!("Synchronous result sentinel, skipping status query");
            return Ok(TryOnTask::succeeded(task_id.to_string(), None));
        }

        self.tracker.poll(task_id).await
    }

    /// Publish a person photo and remember it for `session_id`
    ///
    /// Remembering is best-effort: a cache write failure is logged and the
    /// published URL is still returned.
    pub async fn resolve_and_cache_model(
        &self,
        reference: &ImageReference,
        original_reference: &str,
        session_id: &str,
    ) -> Result<String, TryOnError> {
        let url = self.resolver.resolve(reference).await?;

        if let Err(e) = self
            .model_cache
            .remember(session_id, &url, original_reference)
            .await
        {
            warn!(session_id = session_id, error = %e, "Model photo published but not cached");
        }

        Ok(url)
    }

    /// Publish (or pass through) any image without touching the model cache
    pub async fn publish(&self, reference: &ImageReference) -> Result<String, TryOnError> {
        self.resolver.resolve(reference).await
    }

    pub async fn current_model(&self, session_id: &str) -> Option<ModelCacheEntry> {
        self.model_cache.recall(session_id).await
    }

    /// Clear the session's cached model photo (best-effort)
    pub async fn clear_model(&self, session_id: &str) {
        if let Err(e) = self.model_cache.forget(session_id).await {
            warn!(session_id = session_id, error = %e, "Failed to clear cached model photo");
        }
    }

    pub fn storage_configured(&self) -> bool {
        self.resolver.storage_configured()
    }

    pub fn provider_configured(&self) -> bool {
        self.submitter.provider_configured()
    }

    async fn cached_person(&self, session_id: Option<&str>) -> Result<ImageReference, TryOnError> {
        let Some(session_id) = session_id else {
            return Err(TryOnError::MissingInput(
                "person image (no session to recall a cached photo from)".to_string(),
            ));
        };

        match self.model_cache.recall(session_id).await {
            Some(entry) => {
                debug!(session_id = session_id, url = %entry.published_url, "Using cached model photo");
                Ok(ImageReference::remote(entry.published_url))
            }
            None => Err(TryOnError::MissingInput(
                "person image (none supplied and none cached for this session)".to_string(),
            )),
        }
    }
}
