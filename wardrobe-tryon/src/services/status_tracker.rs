//! Task status tracker
//!
//! One call to [`StatusTracker::poll`] issues exactly one provider status
//! query. Polling cadence, backoff, and giving up belong to the caller.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::errors::TryOnError;
use super::provider::{ImagingProvider, TaskStatusOutput};
use crate::models::{TaskState, TryOnTask};

/// Message used when the provider reports failure without a reason
pub const UNKNOWN_FAILURE_MESSAGE: &str = "Unknown error";

/// Provider task ids are ASCII letters, digits, `-` and `_`
pub fn is_valid_task_id(task_id: &str) -> bool {
    !task_id.is_empty()
        && task_id.len() <= 128
        && task_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Map the provider's status vocabulary onto [`TaskState`]
pub fn normalize_status(remote: Option<&str>) -> TaskState {
    match remote.map(str::trim) {
        Some("PENDING") => TaskState::Pending,
        Some("RUNNING") => TaskState::Running,
        Some("SUCCEEDED") => TaskState::Succeeded,
        Some("FAILED") => TaskState::Failed,
        _ => TaskState::Unknown,
    }
}

/// First non-empty result URL: `image_url`, then `result_url`, then `results[0].url`
pub fn extract_result_url(output: &TaskStatusOutput) -> Option<String> {
    if let Some(url) = non_empty(output.image_url.as_deref()) {
        return Some(url);
    }
    if let Some(url) = non_empty(output.result_url.as_deref()) {
        return Some(url);
    }
    if let Some(first) = output.results.as_ref().and_then(|results| results.first()) {
        if let Some(url) = non_empty(first.url.as_deref()) {
            return Some(url);
        }
    }
    None
}

/// Failure message: `message`, then `code`, then a generic message
pub fn extract_failure_message(output: &TaskStatusOutput) -> String {
    non_empty(output.message.as_deref())
        .or_else(|| non_empty(output.code.as_deref()))
        .unwrap_or_else(|| UNKNOWN_FAILURE_MESSAGE.to_string())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub struct StatusTracker {
    provider: Arc<dyn ImagingProvider>,
}

impl StatusTracker {
    pub fn new(provider: Arc<dyn ImagingProvider>) -> Self {
        Self { provider }
    }

    /// Query the provider once and normalize the answer
    ///
    /// A provider-reported failure is `Ok` with state `Failed`. `Err` means
    /// the status itself could not be learned, or a success carried no result.
    pub async fn poll(&self, task_id: &str) -> Result<TryOnTask, TryOnError> {
        if !is_valid_task_id(task_id) {
            warn!(task_id = task_id, "Rejected malformed task id");
            return Err(TryOnError::InvalidTaskId(task_id.to_string()));
        }

        let response = self.provider.job_status(task_id).await.map_err(|e| {
            warn!(task_id = task_id, error = %e, "Status query failed");
            TryOnError::from_poll_failure(task_id, e)
        })?;

        let output = &response.output;
        let state = normalize_status(output.task_status.as_deref());
        debug!(
            task_id = task_id,
            remote_status = output.task_status.as_deref().unwrap_or("<none>"),
            request_id = response.request_id.as_deref().unwrap_or("<none>"),
            state = %state,
            "Polled try-on task"
        );

        match state {
            TaskState::Succeeded => {
                let url = extract_result_url(output).ok_or_else(|| {
                    TryOnError::poll(task_id, "provider reported success without a result URL")
                })?;
                info!(task_id = task_id, result_url = %url, "Try-on task succeeded");
                Ok(TryOnTask::succeeded(task_id.to_string(), Some(url)))
            }
            TaskState::Failed => {
                let message = extract_failure_message(output);
                info!(task_id = task_id, reason = %message, "Try-on task failed");
                Ok(TryOnTask::failed(task_id.to_string(), message))
            }
            TaskState::Unknown => {
                warn!(
                    task_id = task_id,
                    remote_status = output.task_status.as_deref().unwrap_or("<none>"),
                    "Unrecognized task status"
                );
                Ok(TryOnTask::in_progress(task_id.to_string(), state))
            }
            TaskState::Pending | TaskState::Running => {
                Ok(TryOnTask::in_progress(task_id.to_string(), state))
            }
        }
    }
}
