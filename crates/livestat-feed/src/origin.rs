//! Origin authorization for feed upgrades.
//!
//! Every upgrade request is checked against an [`AllowedOriginSet`] that is
//! rebuilt from scratch for each decision. The set combines:
//!
//! - the operator-configured prefixes (`ALLOWED_CORS_ORIGINS`, comma
//!   separated, defaulting to [`DEFAULT_CONFIGURED_ORIGIN`] when unset)
//! - the fixed loopback entries in [`LOOPBACK_ORIGINS`]
//! - `http://<ip>` for every non-loopback IPv4 address currently bound to a
//!   local interface
//!
//! Matching is by string prefix, not equality. `http://localhost` admits
//! `http://localhost:3000` and also `http://localhost.evil.com`. Legitimate
//! multi-port localhost setups rely on this, so the looseness is kept.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use crate::interfaces::InterfaceSource;

/// Prefix used when no origins are configured.
pub const DEFAULT_CONFIGURED_ORIGIN: &str = "http://localhost";

/// Entries appended to every allowed set regardless of configuration.
pub const LOOPBACK_ORIGINS: [&str; 2] = ["http://localhost", "http://127.0.0.1"];

/// Ordered list of origin prefixes accepted for one decision.
///
/// Never empty: [`LOOPBACK_ORIGINS`] are always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedOriginSet {
    prefixes: Vec<String>,
}

impl AllowedOriginSet {
    /// Build the set from the configured value and the addresses currently
    /// bound to local interfaces.
    ///
    /// `configured` is used verbatim: it is split on commas and the pieces
    /// are not trimmed. `None` and `Some("")` both fall back to
    /// [`DEFAULT_CONFIGURED_ORIGIN`].
    pub fn build(configured: Option<&str>, interface_addrs: &[IpAddr]) -> Self {
        let configured = match configured {
            Some(value) if !value.is_empty() => value,
            _ => DEFAULT_CONFIGURED_ORIGIN,
        };

        let mut prefixes: Vec<String> = configured.split(',').map(str::to_owned).collect();
        prefixes.extend(LOOPBACK_ORIGINS.iter().map(|o| (*o).to_owned()));
        prefixes.extend(
            interface_addrs
                .iter()
                .filter_map(|addr| routable_ipv4(*addr))
                .map(|ip| format!("http://{ip}")),
        );

        Self { prefixes }
    }

    /// Whether `origin` starts with any prefix in the set.
    pub fn allows(&self, origin: &str) -> bool {
        self.prefixes.iter().any(|prefix| origin.starts_with(prefix.as_str()))
    }

    /// The prefixes in the order they were assembled.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

/// Decide whether a declared origin may open a feed connection.
///
/// Pure function over its inputs; see [`AllowedOriginSet::build`].
pub fn is_origin_allowed(origin: &str, configured: Option<&str>, interface_addrs: &[IpAddr]) -> bool {
    AllowedOriginSet::build(configured, interface_addrs).allows(origin)
}

/// IPv4 form of an interface address, if it has one and is not loopback.
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) count as IPv4.
fn routable_ipv4(addr: IpAddr) -> Option<Ipv4Addr> {
    let v4 = match addr {
        IpAddr::V4(v4) => v4,
        IpAddr::V6(v6) => v6.to_ipv4_mapped()?,
    };
    (!v4.is_loopback()).then_some(v4)
}

/// Origin policy bound to its live inputs.
///
/// Holds the configured prefixes and the interface source. Each call to
/// [`OriginPolicy::allows`] enumerates interfaces again, so address changes
/// take effect without a restart.
///
/// The configured value is captured once, when the policy is built, rather
/// than read from the environment on every decision. Only the interface
/// half of the set is live. Editing `ALLOWED_CORS_ORIGINS` therefore needs a
/// restart; the environment of a running process does not change anyway.
#[derive(Clone)]
pub struct OriginPolicy {
    configured: Option<String>,
    interfaces: Arc<dyn InterfaceSource>,
}

impl OriginPolicy {
    /// Create a policy from the configured value and an interface source.
    pub fn new(configured: Option<String>, interfaces: Arc<dyn InterfaceSource>) -> Self {
        Self {
            configured,
            interfaces,
        }
    }

    /// Build the allowed set for one decision.
    pub fn current_set(&self) -> AllowedOriginSet {
        let addrs = self.interfaces.addresses();
        AllowedOriginSet::build(self.configured.as_deref(), &addrs)
    }

    /// Decide whether `origin` may connect.
    pub fn allows(&self, origin: &str) -> bool {
        self.current_set().allows(origin)
    }
}

impl std::fmt::Debug for OriginPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OriginPolicy")
            .field("configured", &self.configured)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv6Addr;

    use super::*;
    use crate::interfaces::StaticInterfaces;

    fn loopback_only() -> Vec<IpAddr> {
        vec![
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(Ipv6Addr::LOCALHOST),
        ]
    }

    #[test]
    fn unset_config_with_loopback_interfaces() {
        let set = AllowedOriginSet::build(None, &loopback_only());
        assert_eq!(
            set.prefixes(),
            ["http://localhost", "http://localhost", "http://127.0.0.1"]
        );
        assert!(set.allows("http://localhost:3000"));
        assert!(!set.allows("http://example.com"));
    }

    #[test]
    fn configured_origin_with_port_is_accepted() {
        assert!(is_origin_allowed(
            "http://10.0.0.9:8080",
            Some("http://10.0.0.9"),
            &loopback_only(),
        ));
    }

    #[test]
    fn loopback_defaults_survive_any_config() {
        for configured in [None, Some(""), Some("garbage"), Some(",,,"), Some("https://a.b")] {
            let set = AllowedOriginSet::build(configured, &[]);
            assert!(set.prefixes().iter().any(|p| p == "http://localhost"));
            assert!(set.prefixes().iter().any(|p| p == "http://127.0.0.1"));
            assert!(set.allows("http://127.0.0.1:5173"));
        }
    }

    #[test]
    fn empty_config_falls_back_to_localhost() {
        let set = AllowedOriginSet::build(Some(""), &[]);
        assert_eq!(set.prefixes().first().map(String::as_str), Some("http://localhost"));
        assert!(!set.allows(""));
    }

    #[test]
    fn comma_separated_list_is_split_verbatim() {
        let set = AllowedOriginSet::build(Some("http://10.0.0.5,https://dashboard.internal"), &[]);
        assert!(set.allows("https://dashboard.internal/app"));
        assert!(set.allows("http://10.0.0.5:80"));
        assert!(!set.allows("https://other.internal"));

        // Pieces are not trimmed, so a leading space never matches a real origin.
        let spaced = AllowedOriginSet::build(Some("http://a, http://b"), &[]);
        assert!(spaced.allows("http://a"));
        assert!(!spaced.allows("http://b"));
    }

    #[test]
    fn empty_segment_matches_everything() {
        let set = AllowedOriginSet::build(Some("http://10.9.9.9,"), &[]);
        assert!(set.allows("https://anything.example"));
    }

    #[test]
    fn prefix_match_is_loose() {
        let set = AllowedOriginSet::build(None, &[]);
        assert!(set.allows("http://localhost:9999/extra"));
        assert!(set.allows("http://localhost.evil.com"));
        assert!(set.allows("http://localhostevil"));
        assert!(!set.allows("https://localhost"));
        assert!(!set.allows("http://evillocalhost"));
    }

    #[test]
    fn missing_origin_is_rejected() {
        assert!(!is_origin_allowed("", None, &loopback_only()));
    }

    #[test]
    fn interface_addresses_are_filtered() {
        let addrs = vec![
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 23)),
            IpAddr::V4(Ipv4Addr::new(127, 0, 1, 1)),
            IpAddr::V6("fe80::1".parse().unwrap()),
            IpAddr::V6("::ffff:192.168.1.7".parse().unwrap()),
            IpAddr::V6("::ffff:127.0.0.1".parse().unwrap()),
        ];
        let set = AllowedOriginSet::build(None, &addrs);
        assert_eq!(
            set.prefixes(),
            [
                "http://localhost",
                "http://localhost",
                "http://127.0.0.1",
                "http://10.0.0.23",
                "http://192.168.1.7",
            ]
        );
        assert!(set.allows("http://10.0.0.23:80"));
        assert!(set.allows("http://192.168.1.7:3000"));
        assert!(!set.allows("http://[fe80::1]"));
        assert!(!set.allows("http://127.0.1.1"));
    }

    #[test]
    fn policy_reads_interfaces_on_every_decision() {
        let source = Arc::new(StaticInterfaces::new(Vec::new()));
        let policy = OriginPolicy::new(None, source.clone());
        assert!(!policy.allows("http://10.1.2.3:8080"));

        source.replace(vec![IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3))]);
        assert!(policy.allows("http://10.1.2.3:8080"));

        source.replace(Vec::new());
        assert!(!policy.allows("http://10.1.2.3:8080"));
    }

    #[test]
    fn policy_keeps_configured_value_from_construction() {
        let source = Arc::new(StaticInterfaces::new(Vec::new()));
        let policy = OriginPolicy::new(Some(String::from("http://10.0.0.9")), source.clone());

        let before = policy.current_set();
        source.replace(vec![IpAddr::V4(Ipv4Addr::new(172, 16, 0, 2))]);
        let after = policy.current_set();

        assert_eq!(before.prefixes().first().map(String::as_str), Some("http://10.0.0.9"));
        assert_eq!(after.prefixes().first().map(String::as_str), Some("http://10.0.0.9"));
        assert_eq!(after.prefixes().last().map(String::as_str), Some("http://172.16.0.2"));
        assert!(policy.allows("http://10.0.0.9:8080"));
    }
}
