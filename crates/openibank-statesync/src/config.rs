//! Engine configuration.
//!
//! Every option is optional in spirit — [`StateSyncConfig::default`]
//! reproduces the defaults in spec §6.5 — following the plain
//! struct-plus-`Default` convention the workspace uses for library-level
//! configuration (`openibank-sdk::Config`, `resonancex-trading-bot::BotConfig`)
//! rather than a builder macro or env-var layer.

use std::time::Duration;

/// Tunable parameters for a [`crate::provider::StateSyncProvider`].
#[derive(Debug, Clone)]
pub struct StateSyncConfig {
    /// Ordered list of gateway base URLs, e.g. `https://ipfs.example.com`.
    pub gateways: Vec<String>,
    /// Per-gateway content GET timeout.
    pub fetch_timeout: Duration,
    /// Per-gateway IPNS resolve timeout.
    pub resolve_timeout: Duration,
    /// Per-gateway publish timeout.
    pub publish_timeout: Duration,
    /// Per-gateway connectivity probe timeout.
    pub connectivity_timeout: Duration,
    /// Signed-record lifetime handed to [`crate::record_codec::RecordCodec::sign`].
    pub ipns_lifetime: Duration,
    /// TTL for cached IPNS records.
    pub ipns_cache_ttl: Duration,
    /// Consecutive gateway failures required to trip the circuit breaker.
    pub circuit_breaker_threshold: u32,
    /// Cooldown duration once a gateway's breaker has tripped.
    pub circuit_breaker_cooldown: Duration,
    /// Zero-RTT read window after a local publish or push notification.
    pub known_fresh_window: Duration,
    /// Write-behind debounce delay.
    pub flush_debounce: Duration,
    /// Poll interval used when the push subscription stream is down.
    pub fallback_poll_interval: Duration,
    /// Enable the optional push-subscription client. Disabled by default:
    /// the engine must function fully on polling alone (spec §9, capability
    /// sets).
    pub enable_subscription: bool,
    /// Explicit push-subscription WebSocket URL. When absent and
    /// `enable_subscription` is set, the URL is derived from the first
    /// configured gateway (`https://host` -> `wss://host/ws/ipns`).
    pub ws_url: Option<String>,
    /// Enable verbose tracing beyond the default level.
    pub debug: bool,
}

impl Default for StateSyncConfig {
    fn default() -> Self {
        Self {
            gateways: Vec::new(),
            fetch_timeout: Duration::from_secs(15),
            resolve_timeout: Duration::from_secs(10),
            publish_timeout: Duration::from_secs(30),
            connectivity_timeout: Duration::from_secs(5),
            ipns_lifetime: Duration::from_secs(99 * 365 * 24 * 60 * 60),
            ipns_cache_ttl: Duration::from_secs(60),
            circuit_breaker_threshold: 3,
            circuit_breaker_cooldown: Duration::from_secs(60),
            known_fresh_window: Duration::from_secs(30),
            flush_debounce: Duration::from_secs(2),
            fallback_poll_interval: Duration::from_secs(90),
            enable_subscription: false,
            ws_url: None,
            debug: false,
        }
    }
}

impl StateSyncConfig {
    /// Convenience constructor that only sets the gateway list, taking all
    /// other defaults.
    pub fn with_gateways(gateways: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gateways: gateways.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = StateSyncConfig::default();
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(15));
        assert_eq!(cfg.resolve_timeout, Duration::from_secs(10));
        assert_eq!(cfg.publish_timeout, Duration::from_secs(30));
        assert_eq!(cfg.connectivity_timeout, Duration::from_secs(5));
        assert_eq!(cfg.ipns_cache_ttl, Duration::from_secs(60));
        assert_eq!(cfg.circuit_breaker_threshold, 3);
        assert_eq!(cfg.circuit_breaker_cooldown, Duration::from_secs(60));
        assert_eq!(cfg.known_fresh_window, Duration::from_secs(30));
        assert_eq!(cfg.flush_debounce, Duration::from_secs(2));
        assert_eq!(cfg.fallback_poll_interval, Duration::from_secs(90));
        assert!(!cfg.debug);
    }

    #[test]
    fn with_gateways_sets_only_gateways() {
        let cfg = StateSyncConfig::with_gateways(["https://a", "https://b"]);
        assert_eq!(cfg.gateways, vec!["https://a", "https://b"]);
        assert_eq!(cfg.circuit_breaker_threshold, 3);
    }
}
