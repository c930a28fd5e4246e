//! Generative imaging provider seam and wire schemas
//!
//! Response schemas model every field as optional: the provider's payloads
//! are loosely structured and the tracker decides what a missing field means.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider client errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// API key absent
    #[error("Imaging provider not configured: {0}")]
    NotConfigured(String),

    /// Connection failure or timeout
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-2xx response
    #[error("Provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// 2xx response whose body is not the expected JSON shape
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Job request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TryOnJobRequest {
    pub model: String,
    pub input: TryOnJobInput,
    pub parameters: TryOnJobParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TryOnJobInput {
    pub person_image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_garment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_garment_url: Option<String>,
}

/// Fixed generation intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TryOnJobParameters {
    /// `-1` keeps the provider's default output resolution
    pub resolution: i32,
    pub restore_face: bool,
}

impl Default for TryOnJobParameters {
    fn default() -> Self {
        Self {
            resolution: -1,
            restore_face: true,
        }
    }
}

/// A 2xx acknowledgement of a submitted job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub status: u16,
    /// Raw response body, for diagnostics when `task_id` is missing
    pub body: String,
    pub task_id: Option<String>,
}

/// Submit response body: `{"output": {"task_id", "task_status"}}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub output: Option<SubmitOutput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitOutput {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub task_status: Option<String>,
}

/// Status response body: `{"output": {...}, "request_id"}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskStatusResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub output: TaskStatusOutput,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskStatusOutput {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub task_status: Option<String>,
    /// Primary result field
    #[serde(default)]
    pub image_url: Option<String>,
    /// Legacy result field
    #[serde(default)]
    pub result_url: Option<String>,
    /// Generic results list
    #[serde(default)]
    pub results: Option<Vec<TaskResultItem>>,
    /// Human-readable failure reason
    #[serde(default)]
    pub message: Option<String>,
    /// Machine-readable failure code
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskResultItem {
    #[serde(default)]
    pub url: Option<String>,
}

/// Remote generative imaging service
#[async_trait]
pub trait ImagingProvider: Send + Sync {
    /// Submit an asynchronous job; returns once the provider accepts it
    async fn submit_job(&self, request: &TryOnJobRequest) -> Result<SubmitReceipt, ProviderError>;

    /// One status query for a previously accepted job
    async fn job_status(&self, task_id: &str) -> Result<TaskStatusResponse, ProviderError>;

    /// Whether an API key is present (for health reporting)
    fn is_configured(&self) -> bool {
        true
    }
}
