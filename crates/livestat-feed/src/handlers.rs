//! Plain HTTP handlers served next to the feed.

use axum::Json;
use axum::response::IntoResponse;

/// Liveness probe.
///
/// # Route
///
/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
