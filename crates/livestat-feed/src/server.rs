//! Feed server lifecycle management.
//!
//! [`start_server`] binds a TCP port and serves the router until the
//! provided shutdown future resolves. [`serve`] does the same on a listener
//! the caller already bound.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::monitor::Monitor;
use crate::router::build_router;
use crate::state::FeedState;

/// Configuration for the feed server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on. `0` picks an ephemeral port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Parse the configured host and port into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))
    }
}

/// Bind a listener for `config`.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr = config.socket_addr()?;
    TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))
}

/// Serve the feed on an already bound listener.
///
/// Stops accepting new connections once `shutdown` resolves. Streaming
/// sessions end when their task is dropped with the runtime.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server hits a fatal I/O error.
pub async fn serve<M, F>(
    listener: TcpListener,
    state: Arc<FeedState<M>>,
    shutdown: F,
) -> Result<(), ServerError>
where
    M: Monitor,
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("local address unavailable: {e}")))?;
    let router = build_router(state);

    info!(%addr, "Feed server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!(%addr, "Feed server stopped");
    Ok(())
}

/// Bind to the configured address and serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind or the server
/// encounters a fatal I/O error.
pub async fn start_server<M, F>(
    config: &ServerConfig,
    state: Arc<FeedState<M>>,
    shutdown: F,
) -> Result<(), ServerError>
where
    M: Monitor,
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind(config).await?;
    serve(listener, state, shutdown).await
}

/// Errors that can occur when starting or running the feed server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
