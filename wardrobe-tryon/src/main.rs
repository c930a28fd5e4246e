//! wardrobe-tryon - Virtual try-on orchestration service
//!
//! Publishes local photos to object storage, submits try-on jobs to the
//! imaging provider, and reports job status for client-driven polling.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wardrobe_tryon::config::{CliOverrides, ServiceConfig};
use wardrobe_tryon::services::{DashScopeClient, InMemorySessionStore, OssStorage, TryOnFacade};
use wardrobe_tryon::AppState;

/// Interval between sweeps of expired session entries
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(600);

/// Command-line arguments for wardrobe-tryon
#[derive(Parser, Debug)]
#[command(name = "wardrobe-tryon")]
#[command(about = "Virtual try-on orchestration service")]
#[command(version)]
struct Args {
    /// Address to listen on (host:port)
    #[arg(short, long, env = "WARDROBE_BIND_ADDRESS")]
    bind: Option<String>,

    /// Folder holding uploaded images
    #[arg(short, long, env = "WARDROBE_UPLOAD_FOLDER")]
    upload_folder: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "WARDROBE_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cli = CliOverrides {
        bind_address: args.bind,
        upload_folder: args.upload_folder,
        log_level: args.log_level,
    };
    let config_path = ServiceConfig::config_file();
    let config = ServiceConfig::resolve_from(config_path.as_deref(), &cli)
        .context("Failed to resolve configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting wardrobe-tryon v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE"),
    );
    match &config_path {
        Some(path) => info!("Configuration file: {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }
    config.log_credential_status();
    info!("Upload folder: {}", config.upload_folder.display());

    let storage = Arc::new(
        OssStorage::new(config.oss.clone(), config.timeouts.publish())
            .context("Failed to initialize object storage client")?,
    );
    let provider = Arc::new(
        DashScopeClient::new(
            config.dashscope.clone(),
            config.timeouts.submit(),
            config.timeouts.poll(),
        )
        .context("Failed to initialize imaging provider client")?,
    );
    let sessions = Arc::new(InMemorySessionStore::new());

    spawn_session_purge(sessions.clone());

    let facade = TryOnFacade::assemble(storage, provider, sessions, &config.facade_settings());
    let state = AppState::new(Arc::new(facade), config.upload_folder.clone())
        .with_session_ttl(config.session_ttl());
    let app = wardrobe_tryon::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address))?;
    info!("Listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Periodically drop expired session entries
fn spawn_session_purge(sessions: Arc<InMemorySessionStore>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = sessions.purge_expired().await;
            if purged > 0 {
                debug!("Purged {} expired session entries", purged);
            }
        }
    });
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
