//! Per-session memo of the resolved person ("model") photo

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The person photo most recently resolved for one session
///
/// Stored serialized in the session store, so it survives as long as the
/// session entry does (default 7 days from the last `remember`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCacheEntry {
    pub session_id: String,
    /// Public URL the imaging provider can fetch
    pub published_url: String,
    /// Reference the client originally supplied (served upload URL, path, or URL)
    pub original_reference_url: String,
    /// Whether the entry outlives a browser session (always true for remembered photos)
    pub permanent: bool,
    pub remembered_at: DateTime<Utc>,
}
