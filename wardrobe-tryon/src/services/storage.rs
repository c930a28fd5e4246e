//! Object storage seam
//!
//! The orchestration core only needs `publish(file) -> public URL`. The
//! production implementation is [`OssStorage`](super::OssStorage); tests
//! substitute in-process fakes.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Object storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Credentials, bucket, or endpoint absent
    #[error("Object storage not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Publishes local files and returns publicly fetchable URLs
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload `file_path` under `key`
    ///
    /// `content_type` is a hint derived from the file name; implementations
    /// may sniff the content when it is `None`.
    async fn publish(
        &self,
        file_path: &Path,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<String, StorageError>;

    /// Whether credentials are present (for health reporting)
    fn is_configured(&self) -> bool {
        true
    }
}

/// Content type from a file's extension, when recognizable
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        _ => return None,
    };
    Some(mime)
}
