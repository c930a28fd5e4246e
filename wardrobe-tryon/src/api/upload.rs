//! Multipart upload endpoints
//!
//! - `POST /api/upload`: save a person photo, publish it and remember it for
//!   the session
//! - `POST /api/upload-garment`: save a garment image and publish it
//!
//! The saved file is kept when publishing fails; the response then has no
//! `oss_url` and the client can retry through `/api/upload-to-oss`.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::header,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;
use wardrobe_common::time::unique_millis;

use super::session::{session_cookie, MaybeSession};
use crate::models::reference::UPLOADS_URL_PREFIX;
use crate::models::ImageReference;
use crate::services::resolver::sanitize_file_name;
use crate::{ApiError, ApiResult, AppState};

/// Request body cap for uploads
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Accepted image extensions (lowercase)
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadedResponse {
    pub success: bool,
    /// Path of the saved file on this node
    pub file_path: String,
    /// URL the file is served under
    pub file_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oss_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

struct UploadedFile {
    file_name: String,
    bytes: Bytes,
}

/// Lowercased extension when it is on the allow-list
pub fn allowed_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// First `file` field of the form
async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().trim().to_string();
        if file_name.is_empty() {
            return Err(ApiError::BadRequest("No file selected".to_string()));
        }
        if allowed_extension(&file_name).is_none() {
            return Err(ApiError::BadRequest(format!(
                "Invalid file type; allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        return Ok(UploadedFile { file_name, bytes });
    }

    Err(ApiError::BadRequest("No file provided".to_string()))
}

async fn save_upload(folder: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, ApiError> {
    tokio::fs::create_dir_all(folder)
        .await
        .map_err(|e| ApiError::Internal(format!("Cannot create upload folder: {}", e)))?;

    let path = folder.join(name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to save {}: {}", name, e)))?;

    Ok(path)
}

/// POST /api/upload
///
/// Mints a session id when the client has none, like `POST /api/model`.
pub async fn upload_model(
    State(state): State<AppState>,
    session: MaybeSession,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let upload = read_file_field(&mut multipart).await?;

    let stored_name = format!("{}_{}", unique_millis(), sanitize_file_name(&upload.file_name));
    let path = match save_upload(&state.upload_folder, &stored_name, &upload.bytes).await {
        Ok(path) => path,
        Err(e) => return Err(state.record_error(e).await),
    };
    let file_url = format!("{}{}", UPLOADS_URL_PREFIX, stored_name);

    let session_id = session.0.unwrap_or_else(|| Uuid::new_v4().to_string());
    let oss_url = match state
        .facade
        .resolve_and_cache_model(&ImageReference::local(&path), &file_url, &session_id)
        .await
    {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(file = %stored_name, error = %e, "Uploaded model photo kept locally, not published");
            None
        }
    };

    info!(
        session_id = %session_id,
        file = %stored_name,
        size_bytes = upload.bytes.len(),
        published = oss_url.is_some(),
        "Model photo uploaded"
    );

    let cookie = session_cookie(&session_id, state.session_ttl);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(UploadedResponse {
            success: true,
            file_path: path.display().to_string(),
            file_url,
            oss_url,
            session_id: Some(session_id),
        }),
    ))
}

/// POST /api/upload-garment
pub async fn upload_garment(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadedResponse>> {
    let upload = read_file_field(&mut multipart).await?;

    let ext = allowed_extension(&upload.file_name).unwrap_or_else(|| "jpg".to_string());
    let stored_name = format!("garment_{}.{}", unique_millis(), ext);
    let path = match save_upload(&state.upload_folder, &stored_name, &upload.bytes).await {
        Ok(path) => path,
        Err(e) => return Err(state.record_error(e).await),
    };

    let oss_url = match state.facade.publish(&ImageReference::local(&path)).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(file = %stored_name, error = %e, "Uploaded garment kept locally, not published");
            None
        }
    };

    info!(file = %stored_name, published = oss_url.is_some(), "Garment uploaded");

    Ok(Json(UploadedResponse {
        success: true,
        file_path: path.display().to_string(),
        file_url: format!("{}{}", UPLOADS_URL_PREFIX, stored_name),
        oss_url,
        session_id: None,
    }))
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/api/upload", post(upload_model))
        .route("/api/upload-garment", post(upload_garment))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
