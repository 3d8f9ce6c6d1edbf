//! Real-time snapshot feed over `WebSocket`.
//!
//! This crate provides an Axum server exposing one endpoint, `GET /ws`.
//! A client connects once and receives a JSON snapshot from a [`Monitor`]
//! every interval (one second by default) until a write fails.
//!
//! # Architecture
//!
//! ```text
//! request --> OriginPolicy --> upgrade --> PushLoop (one task per connection)
//!                 |                            |
//!          InterfaceSource                  Monitor
//! ```
//!
//! - [`origin`] decides who may connect: configured prefixes, loopback
//!   defaults, and the host's live non-loopback IPv4 addresses, matched by
//!   string prefix
//! - [`push`] owns an accepted connection and streams snapshots until the
//!   first failed write, closing the connection on every exit path
//! - [`ws`], [`router`], [`server`] and [`startup`] are the hosting glue

pub mod error;
pub mod handlers;
pub mod interfaces;
pub mod monitor;
pub mod origin;
pub mod push;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::FeedError;
pub use interfaces::{InterfaceSource, StaticInterfaces, SystemInterfaces};
pub use monitor::Monitor;
pub use origin::{AllowedOriginSet, OriginPolicy, is_origin_allowed};
pub use push::{FeedConnection, PushLoop, SessionSummary};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::FeedState;
