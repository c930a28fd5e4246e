//! Try-on task lifecycle
//!
//! A task is created when the imaging provider accepts a job and reaches a
//! terminal state (`Succeeded` / `Failed`) on some later poll:
//!
//! ```text
//! Pending ──> Running ──> Succeeded
//!    │           │
//!    └───────────┴──────> Failed
//! ```
//!
//! `Unknown` covers any provider status outside this vocabulary. It is not
//! terminal; callers keep polling or give up after their own deadline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Garment position filled by one garment image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentSlot {
    Top,
    Bottom,
}

impl fmt::Display for GarmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => f.write_str("top"),
            Self::Bottom => f.write_str("bottom"),
        }
    }
}

/// What the caller wants to try on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "slot", rename_all = "lowercase")]
pub enum TryOnMode {
    /// One garment in the given slot
    Single(GarmentSlot),
    /// Top and bottom together
    Full,
}

impl FromStr for TryOnMode {
    type Err = String;

    /// Parses the request-layer `clothing_type` vocabulary: `top`, `bottom`, `full`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Single(GarmentSlot::Top)),
            "bottom" => Ok(Self::Single(GarmentSlot::Bottom)),
            "full" => Ok(Self::Full),
            other => Err(format!("unsupported clothing type '{}'", other)),
        }
    }
}

impl fmt::Display for TryOnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(slot) => write!(f, "{}", slot),
            Self::Full => f.write_str("full"),
        }
    }
}

/// Normalized task state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl TaskState {
    /// No further transitions happen after a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// Handle returned to the caller as soon as a job is accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskHandle {
    pub task_id: String,
    pub mode: TryOnMode,
    pub state: TaskState,
}

impl TaskHandle {
    pub fn pending(task_id: String, mode: TryOnMode) -> Self {
        Self {
            task_id,
            mode,
            state: TaskState::Pending,
        }
    }
}

/// Snapshot of a task as observed by one poll
///
/// Never persisted: the caller remembers `task_id` between polls. `mode` is
/// only known to the submitting call, so polls report `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TryOnTask {
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TryOnMode>,
    pub state: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl TryOnTask {
    pub fn in_progress(task_id: String, state: TaskState) -> Self {
        Self {
            task_id,
            mode: None,
            state,
            result_url: None,
            error_message: None,
        }
    }

    pub fn succeeded(task_id: String, result_url: Option<String>) -> Self {
        Self {
            task_id,
            mode: None,
            state: TaskState::Succeeded,
            result_url,
            error_message: None,
        }
    }

    pub fn failed(task_id: String, error_message: String) -> Self {
        Self {
            task_id,
            mode: None,
            state: TaskState::Failed,
            result_url: None,
            error_message: Some(error_message),
        }
    }
}
