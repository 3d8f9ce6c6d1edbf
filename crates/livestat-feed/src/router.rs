//! Axum router construction for the feed server.
//!
//! Assembles the feed endpoint and the health probe into a single
//! [`Router`]. CORS for plain HTTP routes follows the same origin policy as
//! the `WebSocket` upgrade, prefix matching included.

use std::sync::Arc;

use axum::Router;
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::monitor::Monitor;
use crate::state::FeedState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /ws` -- origin-checked snapshot feed
/// - `GET /health` -- liveness probe
pub fn build_router<M: Monitor>(state: Arc<FeedState<M>>) -> Router {
    let policy = state.origins.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin.to_str().is_ok_and(|o| policy.allows(o))
            },
        ))
        .allow_methods([Method::GET]);

    Router::new()
        .route("/ws", get(ws::ws_feed::<M>))
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
