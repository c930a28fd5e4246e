//! Resource resolver
//!
//! Turns an [`ImageReference`] into a URL the imaging provider can fetch.
//! Remote references pass through untouched. Local files are published to
//! object storage once per canonical path for the life of the process; later
//! resolutions of the same path reuse the recorded [`ResourceMapping`].
//!
//! Concurrent first-time resolutions of one path are serialized on a
//! per-path lock so the file is published exactly once. Different paths
//! never wait on each other.
//!
//! With a root set, a local reference whose canonical path (symlinks
//! followed) is not under the canonical root is reported as not found.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::errors::TryOnError;
use super::storage::{content_type_for, ObjectStorage, StorageError};
use crate::models::{ImageReference, ResourceMapping};

pub struct ResourceResolver {
    storage: Arc<dyn ObjectStorage>,
    key_prefix: String,
    root: Option<PathBuf>,
    mappings: RwLock<HashMap<PathBuf, ResourceMapping>>,
    path_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl ResourceResolver {
    pub fn new(storage: Arc<dyn ObjectStorage>, key_prefix: impl Into<String>) -> Self {
        Self {
            storage,
            key_prefix: key_prefix.into(),
            root: None,
            mappings: RwLock::new(HashMap::new()),
            path_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Confine local references to files under `root`
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Resolve a reference to a publicly fetchable URL
    pub async fn resolve(&self, reference: &ImageReference) -> Result<String, TryOnError> {
        match reference {
            ImageReference::Remote { url } => Ok(url.clone()),
            ImageReference::Local { path } => self.resolve_local(path).await,
        }
    }

    /// Mapping recorded for a local path, if it was published by this process
    pub async fn mapping_for(&self, path: &Path) -> Option<ResourceMapping> {
        let source = tokio::fs::canonicalize(path).await.ok()?;
        self.mappings.read().await.get(&source).cloned()
    }

    pub async fn mapping_count(&self) -> usize {
        self.mappings.read().await.len()
    }

    pub fn storage_configured(&self) -> bool {
        self.storage.is_configured()
    }

    async fn resolve_local(&self, path: &Path) -> Result<String, TryOnError> {
        let source = match tokio::fs::canonicalize(path).await {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TryOnError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(TryOnError::storage(path.to_path_buf(), StorageError::Io(e))),
        };

        if !self.is_within_root(&source).await {
            warn!(path = %path.display(), "Local reference outside the upload folder");
            return Err(TryOnError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let is_file = tokio::fs::metadata(&source)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(TryOnError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        if let Some(url) = self.cached_url(&source).await {
            debug!(path = %source.display(), "Resolved from mapping cache");
            return Ok(url);
        }

        let lock = self.path_lock(&source).await;
        let result = {
            let _guard = lock.lock().await;
            self.publish_if_absent(&source).await
        };
        self.release_path_lock(&source, &lock).await;

        result
    }

    async fn is_within_root(&self, source: &Path) -> bool {
        let Some(root) = &self.root else {
            return true;
        };
        match tokio::fs::canonicalize(root).await {
            Ok(root) => source.starts_with(root),
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Upload folder not accessible");
                false
            }
        }
    }

    async fn publish_if_absent(&self, source: &Path) -> Result<String, TryOnError> {
        // Another request may have published while we waited for the lock
        if let Some(url) = self.cached_url(source).await {
            debug!(path = %source.display(), "Published by concurrent request");
            return Ok(url);
        }

        let key = storage_key(&self.key_prefix, source);
        let content_type = content_type_for(source);

        let url = self
            .storage
            .publish(source, &key, content_type)
            .await
            .map_err(|e| {
                warn!(path = %source.display(), key = %key, error = %e, "Publish failed");
                TryOnError::storage(source.to_path_buf(), e)
            })?;

        info!(path = %source.display(), key = %key, url = %url, "Published local image");

        let mapping = ResourceMapping::new(source.to_path_buf(), url.clone());
        self.mappings
            .write()
            .await
            .insert(source.to_path_buf(), mapping);

        Ok(url)
    }

    async fn cached_url(&self, source: &Path) -> Option<String> {
        self.mappings
            .read()
            .await
            .get(source)
            .map(|m| m.published_url.clone())
    }

    async fn path_lock(&self, source: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.path_locks.lock().await;
        locks
            .entry(source.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn release_path_lock(&self, source: &Path, lock: &Arc<Mutex<()>>) {
        let mut locks = self.path_locks.lock().await;
        // One reference in the map plus ours: nobody else is waiting
        if Arc::strong_count(lock) <= 2 {
            locks.remove(source);
        }
    }
}

/// Storage key: `<prefix><unique millis>_<sanitized file name>`
///
/// The millisecond stamp keeps keys distinct across uploads of files that
/// share a name.
pub fn storage_key(prefix: &str, source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!(
        "{}{}_{}",
        prefix,
        wardrobe_common::time::unique_millis(),
        sanitize_file_name(&name)
    )
}

/// Keep ASCII alphanumerics, `.`, `-`, `_`; replace everything else with `_`
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}
