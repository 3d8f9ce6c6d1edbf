//! Error types for the server binary.
//!
//! Uses `thiserror` for typed errors covering startup configuration and the
//! feed server itself.

use livestat_feed::ServerError;

/// Errors that can abort the server process.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// The feed server failed to bind or serve.
    #[error(transparent)]
    Server(#[from] ServerError),
}
