//! Server entry point for the livestat snapshot feed.
//!
//! Serves `GET /ws`: an origin-checked `WebSocket` that pushes a JSON
//! snapshot of this host every interval until the client goes away.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from the environment
//! 3. Create the host monitor
//! 4. Bind and serve until SIGINT/SIGTERM

mod config;
mod error;
mod monitor;

use std::sync::Arc;

use livestat_feed::origin::DEFAULT_CONFIGURED_ORIGIN;
use livestat_feed::{FeedState, SystemInterfaces, start_server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::FeedConfig;
use crate::error::AppError;
use crate::monitor::HostMonitor;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the server fails to
/// bind or serve.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("livestat-server starting");

    // 2. Load configuration.
    let config = FeedConfig::from_env()?;
    info!(
        host = config.host,
        port = config.port,
        push_interval_ms = config.push_interval.as_millis(),
        allowed_origins = config
            .allowed_origins
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_CONFIGURED_ORIGIN),
        "Configuration loaded"
    );
    if config.has_empty_origin_entry() {
        warn!("ALLOWED_CORS_ORIGINS contains an empty entry; every origin will be accepted");
    }

    // 3. Create the host monitor.
    let monitor = Arc::new(HostMonitor::new());
    let state = Arc::new(FeedState::from_parts(
        monitor,
        config.allowed_origins.clone(),
        Arc::new(SystemInterfaces),
        config.push_interval,
    ));

    // 4. Serve until a termination signal arrives.
    start_server(&config.server_config(), state, shutdown_signal())
        .await
        .map_err(AppError::from)?;

    info!("livestat-server stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
///
/// If a handler cannot be installed the failure is logged and that signal is
/// ignored; the other one still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
