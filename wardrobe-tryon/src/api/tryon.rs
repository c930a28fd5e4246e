//! Try-on submit and status endpoints
//!
//! - `POST /api/try-on`: submit a job, returns the task id immediately
//! - `GET /api/try-on/status/:task_id`: one provider status query
//!
//! The client drives polling; these handlers never wait on the remote job.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use tracing::info;

use super::session::MaybeSession;
use crate::models::{ImageReference, TaskState, TryOnMode};
use crate::services::GarmentRefs;
use crate::{ApiError, ApiResult, AppState};

/// `POST /api/try-on` body
#[derive(Debug, Deserialize)]
pub struct SubmitTryOnRequest {
    /// Person photo; falls back to the session's cached model photo
    #[serde(default)]
    pub person_image_url: Option<String>,
    /// Garment for single-garment try-on
    #[serde(default)]
    pub clothing_image_url: Option<String>,
    #[serde(default)]
    pub top_garment_url: Option<String>,
    #[serde(default)]
    pub bottom_garment_url: Option<String>,
    /// `top`, `bottom`, or `full`
    #[serde(default = "default_clothing_type")]
    pub clothing_type: String,
}

fn default_clothing_type() -> String {
    "top".to_string()
}

#[derive(Debug, Serialize)]
pub struct SubmitTryOnResponse {
    pub success: bool,
    pub task_id: String,
    pub status: TaskState,
}

#[derive(Debug, Serialize)]
pub struct TryOnStatusResponse {
    pub success: bool,
    pub task_id: String,
    pub status: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn parse_optional(raw: Option<&str>, upload_folder: &FsPath) -> Option<ImageReference> {
    raw.and_then(|r| ImageReference::parse(r, upload_folder))
}

/// POST /api/try-on
pub async fn submit_try_on(
    State(state): State<AppState>,
    session: MaybeSession,
    Json(payload): Json<SubmitTryOnRequest>,
) -> ApiResult<Json<SubmitTryOnResponse>> {
    let mode: TryOnMode = payload
        .clothing_type
        .parse()
        .map_err(ApiError::BadRequest)?;

    let uploads = state.upload_folder.as_path();
    let person = parse_optional(payload.person_image_url.as_deref(), uploads);
    let garments = GarmentRefs {
        garment: parse_optional(payload.clothing_image_url.as_deref(), uploads),
        top: parse_optional(payload.top_garment_url.as_deref(), uploads),
        bottom: parse_optional(payload.bottom_garment_url.as_deref(), uploads),
    };

    let handle = match state
        .facade
        .submit_try_on(person, mode, &garments, session.id())
        .await
    {
        Ok(handle) => handle,
        Err(e) => return Err(state.record_error(e).await),
    };

    info!(task_id = %handle.task_id, mode = %mode, "Try-on accepted");

    Ok(Json(SubmitTryOnResponse {
        success: true,
        task_id: handle.task_id,
        status: handle.state,
    }))
}

/// GET /api/try-on/status/:task_id
pub async fn try_on_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<TryOnStatusResponse>> {
    let task = match state.facade.poll_try_on(&task_id).await {
        Ok(task) => task,
        Err(e) => return Err(state.record_error(e).await),
    };

    Ok(Json(TryOnStatusResponse {
        success: true,
        task_id: task.task_id,
        status: task.state,
        result_url: task.result_url,
        error: task.error_message,
    }))
}

/// Build try-on routes
pub fn tryon_routes() -> Router<AppState> {
    Router::new()
        .route("/api/try-on", post(submit_try_on))
        .route("/api/try-on/status/:task_id", get(try_on_status))
}
