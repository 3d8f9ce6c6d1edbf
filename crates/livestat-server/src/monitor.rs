//! Host monitor backing the feed.
//!
//! Produces a small combined snapshot of this host and process. Reads are
//! cheap (one procfs file at most) and safe from any number of connections.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use livestat_feed::Monitor;
use serde::Serialize;

/// Combined snapshot pushed on every tick.
#[derive(Debug, Clone, Serialize)]
pub struct HostSnapshot {
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Host name, or `unknown`.
    pub hostname: String,
    /// Seconds since this process started.
    pub uptime_secs: u64,
    /// Monotonic sample number across all connections.
    pub sample: u64,
    /// System load average, where the platform exposes one.
    pub load_average: Option<LoadAverage>,
}

/// One, five and fifteen minute load averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadAverage {
    /// One minute average.
    pub one: f64,
    /// Five minute average.
    pub five: f64,
    /// Fifteen minute average.
    pub fifteen: f64,
}

/// Supplies [`HostSnapshot`]s.
#[derive(Debug)]
pub struct HostMonitor {
    started: Instant,
    hostname: String,
    samples: AtomicU64,
}

impl HostMonitor {
    /// Create a monitor, resolving the host name once.
    pub fn new() -> Self {
        let hostname = std::fs::read_to_string("/proc/sys/kernel/hostname")
            .ok()
            .or_else(|| std::env::var("HOSTNAME").ok())
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| String::from("unknown"));

        Self {
            started: Instant::now(),
            hostname,
            samples: AtomicU64::new(0),
        }
    }
}

impl Default for HostMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor for HostMonitor {
    type Snapshot = HostSnapshot;

    fn combined_snapshot(&self) -> HostSnapshot {
        let sample = self.samples.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let load_average = std::fs::read_to_string("/proc/loadavg")
            .ok()
            .and_then(|raw| parse_loadavg(&raw));

        HostSnapshot {
            timestamp: Utc::now(),
            hostname: self.hostname.clone(),
            uptime_secs: self.started.elapsed().as_secs(),
            sample,
            load_average,
        }
    }
}

/// Parse the first three fields of `/proc/loadavg`.
fn parse_loadavg(raw: &str) -> Option<LoadAverage> {
    let mut fields = raw.split_whitespace().map(str::parse::<f64>);
    let one = fields.next()?.ok()?;
    let five = fields.next()?.ok()?;
    let fifteen = fields.next()?.ok()?;
    Some(LoadAverage { one, five, fifteen })
}
