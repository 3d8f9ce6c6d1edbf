//! Local network interface enumeration.
//!
//! The origin policy needs the addresses bound to this host at decision
//! time. [`InterfaceSource`] abstracts that query so tests can supply a
//! fixed list through [`StaticInterfaces`].

use std::net::IpAddr;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

/// A read-only view of the addresses bound to local interfaces.
pub trait InterfaceSource: Send + Sync {
    /// Every address currently bound to any interface, loopback included.
    ///
    /// Enumeration failures yield an empty list rather than an error.
    fn addresses(&self) -> Vec<IpAddr>;
}

/// Queries the operating system on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    #[cfg(unix)]
    fn addresses(&self) -> Vec<IpAddr> {
        let ifaddrs = match nix::ifaddrs::getifaddrs() {
            Ok(ifaddrs) => ifaddrs,
            Err(e) => {
                debug!(error = %e, "Interface enumeration failed, contributing no addresses");
                return Vec::new();
            }
        };

        ifaddrs
            .filter_map(|ifaddr| {
                let storage = ifaddr.address?;
                if let Some(sin) = storage.as_sockaddr_in() {
                    return Some(IpAddr::V4(sin.ip()));
                }
                storage.as_sockaddr_in6().map(|sin6| IpAddr::V6(sin6.ip()))
            })
            .collect()
    }

    #[cfg(not(unix))]
    fn addresses(&self) -> Vec<IpAddr> {
        debug!("Interface enumeration unsupported on this platform");
        Vec::new()
    }
}

/// A fixed, replaceable address list.
#[derive(Debug, Default)]
pub struct StaticInterfaces {
    addrs: RwLock<Vec<IpAddr>>,
}

impl StaticInterfaces {
    /// Create a source that reports `addrs`.
    pub const fn new(addrs: Vec<IpAddr>) -> Self {
        Self {
            addrs: RwLock::new(addrs),
        }
    }

    /// Swap in a new address list, as if interfaces had changed.
    pub fn replace(&self, addrs: Vec<IpAddr>) {
        *self.addrs.write().unwrap_or_else(PoisonError::into_inner) = addrs;
    }
}

impl InterfaceSource for StaticInterfaces {
    fn addresses(&self) -> Vec<IpAddr> {
        self.addrs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
