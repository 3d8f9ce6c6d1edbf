//! Error types for the feed.
//!
//! [`FeedError`] covers every way a single decision or session can fail.
//! None of them are fatal to the process. It converts into an Axum
//! response via its [`IntoResponse`](axum::response::IntoResponse)
//! implementation so the upgrade handler can return it directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur while authorizing or serving a feed connection.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The declared origin matched no allowed prefix.
    #[error("origin not allowed: {0:?}")]
    OriginRejected(String),

    /// Writing to the connection failed; the peer is gone or the transport broke.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// A snapshot could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::OriginRejected(_) => StatusCode::FORBIDDEN,
            Self::ConnectionClosed(_) | Self::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
