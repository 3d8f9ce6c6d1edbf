//! `WebSocket` upgrade handler for the snapshot feed.
//!
//! Clients connect to `GET /ws`. The request must first be a well-formed
//! upgrade request, then its `Origin` header must pass the
//! [`OriginPolicy`](crate::origin::OriginPolicy). Accepted connections are
//! handed to a [`PushLoop`] running on the connection's own task; rejected
//! ones get `403 Forbidden` and no channel is opened.
//!
//! The read half of the socket is never polled. A client that goes away is
//! noticed when the next write fails.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::ORIGIN;
use axum::response::{IntoResponse, Response};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::FeedError;
use crate::monitor::Monitor;
use crate::push::PushLoop;
use crate::state::FeedState;

/// Authorize the origin, upgrade, and start streaming snapshots.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_feed<M: Monitor>(
    State(state): State<Arc<FeedState<M>>>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!(error = %rejection, "WebSocket upgrade failed");
            return rejection.into_response();
        }
    };

    // A missing or non-UTF-8 header is treated as an empty origin.
    let origin = headers
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !state.origins.allows(origin) {
        debug!(origin, "Feed connection rejected by origin policy");
        return FeedError::OriginRejected(origin.to_owned()).into_response();
    }

    let conn_id = Uuid::new_v4();
    let push = state.push.clone();
    debug!(%conn_id, origin, "Feed origin authorized, upgrading");

    ws.on_failed_upgrade(move |e| {
        warn!(%conn_id, error = %e, "WebSocket upgrade failed after handshake");
    })
    .on_upgrade(move |socket| stream_feed(socket, push, conn_id))
    .into_response()
}

/// Run the push loop for one connection and log its lifecycle.
async fn stream_feed<M: Monitor>(socket: WebSocket, push: PushLoop<M>, conn_id: Uuid) {
    info!(%conn_id, interval_ms = push.interval().as_millis(), "Feed client connected");

    let summary = push.run(socket).await;

    info!(
        %conn_id,
        ticks_sent = summary.ticks_sent,
        "Feed client disconnected"
    );
}
