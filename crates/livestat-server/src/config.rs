//! Configuration for the server binary.
//!
//! All configuration is loaded from environment variables once at startup.
//! The allowed-origin value is passed to the feed verbatim; the feed
//! re-reads interface addresses on every decision.

use std::time::Duration;

use livestat_feed::ServerConfig;

use crate::error::AppError;

/// Complete server configuration loaded from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Raw `ALLOWED_CORS_ORIGINS` value, comma separated.
    pub allowed_origins: Option<String>,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Delay between pushes on each connection.
    pub push_interval: Duration,
}

impl FeedConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `ALLOWED_CORS_ORIGINS` -- origin prefixes, comma separated (default `http://localhost`)
    /// - `LIVESTAT_HOST` -- bind host (default `0.0.0.0`)
    /// - `LIVESTAT_PORT` -- bind port (default 8080)
    /// - `FEED_INTERVAL_MS` -- push cadence in milliseconds (default 1000)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let allowed_origins = lookup("ALLOWED_CORS_ORIGINS");

        let host = lookup("LIVESTAT_HOST").unwrap_or_else(|| "0.0.0.0".to_owned());

        let port: u16 = lookup("LIVESTAT_PORT")
            .unwrap_or_else(|| "8080".to_owned())
            .parse()
            .map_err(|e| AppError::Config(format!("invalid LIVESTAT_PORT: {e}")))?;

        let interval_ms: u64 = lookup("FEED_INTERVAL_MS")
            .unwrap_or_else(|| "1000".to_owned())
            .parse()
            .map_err(|e| AppError::Config(format!("invalid FEED_INTERVAL_MS: {e}")))?;
        if interval_ms == 0 {
            return Err(AppError::Config(String::from(
                "invalid FEED_INTERVAL_MS: must be greater than zero",
            )));
        }

        Ok(Self {
            allowed_origins,
            host,
            port,
            push_interval: Duration::from_millis(interval_ms),
        })
    }

    /// Whether the origin list contains an empty entry (e.g. a stray comma).
    ///
    /// An empty prefix matches every origin.
    pub fn has_empty_origin_entry(&self) -> bool {
        self.allowed_origins
            .as_deref()
            .is_some_and(|value| !value.is_empty() && value.split(',').any(str::is_empty))
    }

    /// Bind settings for the feed server.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}
