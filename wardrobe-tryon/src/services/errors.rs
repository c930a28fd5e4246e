//! Try-on orchestration error taxonomy
//!
//! A provider-reported `FAILED` job is not an error here: it is a normal
//! terminal [`TaskState`](crate::models::TaskState) carrying a message.

use std::path::PathBuf;
use thiserror::Error;

use super::provider::ProviderError;
use super::storage::StorageError;

/// Errors surfaced by the resolver, submitter, tracker, and facade
#[derive(Debug, Error)]
pub enum TryOnError {
    /// Local reference names a file that does not exist (not retried)
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Publishing a local file to object storage failed (not retried)
    #[error("Publishing {} failed: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    /// Caller supplied an incomplete request; no network call was made
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Provider rejected the job or acknowledged it without a task id
    #[error("Submission failed{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Submission {
        status: Option<u16>,
        message: String,
        /// Raw provider response body, kept for diagnostics
        body: String,
    },

    /// Task id contains characters a provider task id never has
    #[error("Invalid task id: {0:?}")]
    InvalidTaskId(String),

    /// Could not learn the task's status (transport failure, bad response)
    #[error("Polling task {task_id} failed: {message}")]
    Poll { task_id: String, message: String },
}

impl TryOnError {
    pub fn storage(path: PathBuf, source: StorageError) -> Self {
        Self::Storage { path, source }
    }

    pub fn poll(task_id: &str, message: impl Into<String>) -> Self {
        Self::Poll {
            task_id: task_id.to_string(),
            message: message.into(),
        }
    }

    /// Wrap a provider failure on the submit path
    pub fn from_submit_failure(err: ProviderError) -> Self {
        match err {
            ProviderError::Http { status, body } => Self::Submission {
                status: Some(status),
                message: "provider rejected the job".to_string(),
                body,
            },
            other => Self::Submission {
                status: None,
                message: other.to_string(),
                body: String::new(),
            },
        }
    }

    /// Wrap a provider failure on the poll path
    pub fn from_poll_failure(task_id: &str, err: ProviderError) -> Self {
        Self::poll(task_id, err.to_string())
    }
}
