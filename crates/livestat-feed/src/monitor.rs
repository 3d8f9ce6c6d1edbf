//! The data source behind the feed.

use serde::Serialize;

/// Supplies the combined snapshot pushed to every feed connection.
///
/// Implementations are shared read-only across all connections and must be
/// safe to call concurrently. The call is synchronous and expected to be
/// cheap; failure handling belongs to the implementation.
pub trait Monitor: Send + Sync + 'static {
    /// The snapshot type, serialized to JSON verbatim.
    type Snapshot: Serialize;

    /// Produce the current combined snapshot.
    fn combined_snapshot(&self) -> Self::Snapshot;
}
