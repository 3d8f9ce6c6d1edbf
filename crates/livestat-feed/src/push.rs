//! Per-connection push loop.
//!
//! A [`PushLoop`] owns one connection from the moment the upgrade completes.
//! Each tick it fetches a snapshot from the [`Monitor`], writes it as one
//! JSON text message, then sleeps for the configured interval. The first
//! failed write ends the session, and so does a snapshot that cannot be
//! encoded. There is no retry; clients reconnect.
//!
//! The connection is taken by value, so it is dropped (and the underlying
//! socket closed) exactly once on every exit path, unwinding included.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use tracing::{debug, warn};

use crate::error::FeedError;
use crate::monitor::Monitor;

/// Default delay between ticks.
pub const DEFAULT_PUSH_INTERVAL: Duration = Duration::from_secs(1);

/// The write half of an established feed connection.
///
/// Dropping the value closes the connection.
pub trait FeedConnection: Send {
    /// Write one text message.
    fn send_text(&mut self, text: String) -> impl Future<Output = Result<(), FeedError>> + Send;
}

impl FeedConnection for WebSocket {
    async fn send_text(&mut self, text: String) -> Result<(), FeedError> {
        self.send(Message::Text(text.into()))
            .await
            .map_err(|e| FeedError::ConnectionClosed(e.to_string()))
    }
}

/// Outcome of one streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Messages written successfully before the session ended.
    pub ticks_sent: u64,
}

/// Streams snapshots from a shared monitor at a fixed cadence.
#[derive(Debug)]
pub struct PushLoop<M> {
    monitor: Arc<M>,
    interval: Duration,
}

impl<M> Clone for PushLoop<M> {
    fn clone(&self) -> Self {
        Self {
            monitor: Arc::clone(&self.monitor),
            interval: self.interval,
        }
    }
}

impl<M: Monitor> PushLoop<M> {
    /// Create a loop over `monitor` ticking every `interval`.
    pub const fn new(monitor: Arc<M>, interval: Duration) -> Self {
        Self { monitor, interval }
    }

    /// The delay between ticks.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Stream to `conn` until a write fails.
    ///
    /// Serializing and writing are one step: a snapshot that cannot be
    /// encoded ends the session the same way a failed write does. Writes are
    /// strictly sequential, so tick N is fully written before the snapshot
    /// for tick N+1 is fetched. After a failure the monitor is not called
    /// again.
    pub async fn run<C: FeedConnection>(&self, mut conn: C) -> SessionSummary {
        let mut summary = SessionSummary { ticks_sent: 0 };

        loop {
            if let Err(e) = self.push_once(&mut conn).await {
                match e {
                    FeedError::Serialization(_) => {
                        warn!(error = %e, ticks_sent = summary.ticks_sent, "Snapshot could not be encoded, ending session");
                    }
                    FeedError::ConnectionClosed(_) | FeedError::OriginRejected(_) => {
                        debug!(error = %e, ticks_sent = summary.ticks_sent, "Feed write failed, ending session");
                    }
                }
                break;
            }
            summary.ticks_sent = summary.ticks_sent.saturating_add(1);

            tokio::time::sleep(self.interval).await;
        }

        drop(conn);
        summary
    }

    /// Fetch one snapshot, encode it, and write it as a text message.
    async fn push_once<C: FeedConnection>(&self, conn: &mut C) -> Result<(), FeedError> {
        let json = {
            let snapshot = self.monitor.combined_snapshot();
            serde_json::to_string(&snapshot)?
        };
        conn.send_text(json).await
    }
}
