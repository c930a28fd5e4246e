//! Model photo and ad-hoc publish endpoints
//!
//! - `POST /api/model`: publish a person photo and remember it for the session
//! - `GET /api/current-model`: the session's remembered photo
//! - `DELETE /api/current-model`: forget it
//! - `POST /api/upload-to-oss`: publish any local image

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::session::{session_cookie, MaybeSession};
use crate::models::ImageReference;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SetModelRequest {
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SetModelResponse {
    pub success: bool,
    pub oss_url: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct CurrentModelResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oss_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub local_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub success: bool,
}

/// POST /api/model
///
/// Mints a session id when the client has none and hands it back both in the
/// body and as a cookie.
pub async fn set_model(
    State(state): State<AppState>,
    session: MaybeSession,
    Json(payload): Json<SetModelRequest>,
) -> ApiResult<impl IntoResponse> {
    let raw = payload.image_url.unwrap_or_default();
    let reference = ImageReference::parse(&raw, &state.upload_folder)
        .ok_or_else(|| ApiError::BadRequest("image_url is required".to_string()))?;

    let session_id = session
        .0
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let oss_url = match state
        .facade
        .resolve_and_cache_model(&reference, raw.trim(), &session_id)
        .await
    {
        Ok(url) => url,
        Err(e) => return Err(state.record_error(e).await),
    };

    info!(session_id = %session_id, "Model photo set");

    let cookie = session_cookie(&session_id, state.session_ttl);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SetModelResponse {
            success: true,
            oss_url,
            session_id,
        }),
    ))
}

/// GET /api/current-model
pub async fn current_model(
    State(state): State<AppState>,
    session: MaybeSession,
) -> Json<CurrentModelResponse> {
    let entry = match session.id() {
        Some(id) => state.facade.current_model(id).await,
        None => None,
    };

    match entry {
        Some(entry) => Json(CurrentModelResponse {
            success: true,
            oss_url: Some(entry.published_url),
            local_url: Some(entry.original_reference_url),
            message: None,
        }),
        None => Json(CurrentModelResponse {
            success: false,
            oss_url: None,
            local_url: None,
            message: Some("No model set".to_string()),
        }),
    }
}

/// DELETE /api/current-model
pub async fn clear_model(
    State(state): State<AppState>,
    session: MaybeSession,
) -> Json<ClearedResponse> {
    if let Some(id) = session.id() {
        state.facade.clear_model(id).await;
    }
    Json(ClearedResponse { success: true })
}

/// POST /api/upload-to-oss
pub async fn upload_to_oss(
    State(state): State<AppState>,
    Json(payload): Json<UploadRequest>,
) -> ApiResult<Json<UploadResponse>> {
    let reference = payload
        .local_path
        .as_deref()
        .and_then(|raw| ImageReference::parse(raw, &state.upload_folder))
        .ok_or_else(|| ApiError::BadRequest("local_path is required".to_string()))?;

    let url = match state.facade.publish(&reference).await {
        Ok(url) => url,
        Err(e) => return Err(state.record_error(e).await),
    };

    Ok(Json(UploadResponse { success: true, url }))
}

/// Build model routes
pub fn model_routes() -> Router<AppState> {
    Router::new()
        .route("/api/model", post(set_model))
        .route("/api/current-model", get(current_model).delete(clear_model))
        .route("/api/upload-to-oss", post(upload_to_oss))
}
