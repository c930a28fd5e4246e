//! Image references and published-resource mappings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// URL prefix under which the request layer serves uploaded files
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

/// A pointer to an image, either on this node's disk or already remotely fetchable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageReference {
    /// File on the serving node; must exist at resolution time
    Local { path: PathBuf },
    /// Already public URL; passed through without any check
    Remote { url: String },
}

impl ImageReference {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local { path: path.into() }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote { url: url.into() }
    }

    /// Interpret a raw reference string from a client request
    ///
    /// - `http://` / `https://` URLs are remote
    /// - `file://` URLs are local paths
    /// - `/uploads/<name>` (the served upload URL) maps into `upload_folder`
    /// - other absolute paths are used as-is (a rooted resolver still
    ///   refuses them outside the upload folder)
    /// - relative paths keep only their file name, joined onto `upload_folder`
    ///
    /// Returns `None` for an empty or whitespace-only string.
    pub fn parse(raw: &str, upload_folder: &Path) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Some(Self::remote(raw));
        }

        if let Some(stripped) = raw.strip_prefix("file://") {
            return Some(Self::local(stripped));
        }

        if let Some(name) = raw.strip_prefix(UPLOADS_URL_PREFIX) {
            return Some(Self::local(upload_folder.join(base_name(Path::new(name))?)));
        }

        let path = Path::new(raw);
        if path.is_absolute() {
            Some(Self::local(path))
        } else {
            Some(Self::local(upload_folder.join(base_name(path)?)))
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { path } => write!(f, "{}", path.display()),
            Self::Remote { url } => f.write_str(url),
        }
    }
}

fn base_name(path: &Path) -> Option<&std::ffi::OsStr> {
    path.file_name()
}

/// Record of one local file published to object storage
///
/// Immutable once created. Re-publishing the same source produces a new
/// mapping under a new storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceMapping {
    /// Canonicalized local path the mapping is keyed by
    pub source_path: PathBuf,
    /// Public URL returned by object storage
    pub published_url: String,
    pub published_at: DateTime<Utc>,
}

impl ResourceMapping {
    pub fn new(source_path: PathBuf, published_url: String) -> Self {
        Self {
            source_path,
            published_url,
            published_at: Utc::now(),
        }
    }
}
