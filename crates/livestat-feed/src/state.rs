//! Shared application state for the feed server.
//!
//! [`FeedState`] bundles the push loop template (monitor + cadence) with the
//! origin policy. It is wrapped in [`Arc`](std::sync::Arc) and injected via
//! Axum's `State` extractor. Nothing in it is mutated after startup; each
//! connection clones the push loop and runs its own copy.

use std::sync::Arc;
use std::time::Duration;

use crate::interfaces::InterfaceSource;
use crate::monitor::Monitor;
use crate::origin::OriginPolicy;
use crate::push::PushLoop;

/// Shared state for the Axum application.
#[derive(Debug)]
pub struct FeedState<M> {
    /// Push loop cloned into every accepted connection.
    pub push: PushLoop<M>,
    /// Policy consulted before every upgrade.
    pub origins: OriginPolicy,
}

impl<M: Monitor> FeedState<M> {
    /// Create state with an explicit cadence.
    pub const fn with_interval(monitor: Arc<M>, origins: OriginPolicy, interval: Duration) -> Self {
        Self {
            push: PushLoop::new(monitor, interval),
            origins,
        }
    }

    /// Convenience constructor from the raw configured value and an
    /// interface source.
    pub fn from_parts(
        monitor: Arc<M>,
        configured_origins: Option<String>,
        interfaces: Arc<dyn InterfaceSource>,
        interval: Duration,
    ) -> Self {
        Self::with_interval(
            monitor,
            OriginPolicy::new(configured_origins, interfaces),
            interval,
        )
    }
}
