//! wardrobe-tryon library interface
//!
//! Exposes the orchestration services and the router for integration testing

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::services::TryOnFacade;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<TryOnFacade>,
    /// Directory served under `/uploads/`; relative references resolve into it
    pub upload_folder: PathBuf,
    /// Lifetime of the session cookie handed to clients
    pub session_ttl: Duration,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last request failure, reported by `/health`
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(facade: Arc<TryOnFacade>, upload_folder: PathBuf) -> Self {
        Self {
            facade,
            upload_folder,
            session_ttl: Duration::days(7),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Log a failure, returning it as an HTTP error
    ///
    /// Only server-side and upstream failures are kept for `/health`.
    pub async fn record_error(&self, err: impl Into<ApiError>) -> ApiError {
        let err = err.into();
        if err.status_code().is_server_error() {
            warn!(error = %err, "Request failed");
            *self.last_error.write().await = Some(err.to_string());
        } else {
            debug!(error = %err, "Request rejected");
        }
        err
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.upload_folder);
    Router::new()
        .merge(api::tryon_routes())
        .merge(api::model_routes())
        .merge(api::upload_routes())
        .merge(api::health_routes())
        .nest_service(models::reference::UPLOADS_URL_PREFIX.trim_end_matches('/'), uploads)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
