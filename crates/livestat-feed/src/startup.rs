//! Background startup helper for embedding the feed in another binary.
//!
//! [`spawn_server`] binds eagerly, so address and permission problems are
//! reported to the caller, then serves on a background Tokio task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use livestat_feed::startup::spawn_server;
//!
//! let (addr, handle) = spawn_server(&config, state).await?;
//! // The server is now running. Abort the handle to stop it.
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::monitor::Monitor;
use crate::server::{self, ServerConfig, ServerError};
use crate::state::FeedState;

/// Errors that can occur when spawning the feed server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the feed server on a background Tokio task.
///
/// Returns the bound address (useful with port `0`) and the task handle.
/// The server runs until the runtime shuts down or the handle is aborted.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the listener cannot be bound.
pub async fn spawn_server<M: Monitor>(
    config: &ServerConfig,
    state: Arc<FeedState<M>>,
) -> Result<(SocketAddr, JoinHandle<()>), StartupError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("local address unavailable: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state, std::future::pending()).await {
            tracing::error!(error = %e, "Feed server exited with error");
        }
    });

    tracing::info!(%addr, "Feed server spawned on background task");

    Ok((addr, handle))
}
