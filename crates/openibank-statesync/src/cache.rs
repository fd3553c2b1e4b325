//! In-memory caches shared across an engine instance.
//!
//! Four independent maps, each serving one concern — IPNS record lookups,
//! content-by-CID, per-gateway circuit breaker state, and a "known fresh"
//! flag for zero-RTT reads after a local publish. Built on `dashmap`, the
//! same concurrent-map primitive `openibank-state` reaches for whenever
//! multiple tasks need point-wise independent access to a shared table
//! without a single coarse lock.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// A resolved IPNS pointer as cached from `HttpClient::resolve`.
#[derive(Debug, Clone)]
pub struct ResolvedRecord {
    pub cid: String,
    pub sequence: u64,
}

struct TtlEntry<T> {
    value: T,
    inserted_at: Instant,
}

/// Cached IPNS records, each valid for `ttl` from insertion.
pub struct IpnsRecordCache {
    entries: DashMap<String, TtlEntry<ResolvedRecord>>,
    ttl: Duration,
}

impl IpnsRecordCache {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: DashMap::new(), ttl }
    }

    pub fn put(&self, name: &str, record: ResolvedRecord) {
        self.entries.insert(
            name.to_string(),
            TtlEntry { value: record, inserted_at: Instant::now() },
        );
    }

    /// Return the cached record if present and not expired.
    pub fn get(&self, name: &str) -> Option<ResolvedRecord> {
        let entry = self.entries.get(name)?;
        if entry.inserted_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Return the cached record regardless of TTL, used by `Provider::load`'s
    /// stale-cache fallback when every gateway is unreachable.
    pub fn get_ignore_ttl(&self, name: &str) -> Option<ResolvedRecord> {
        self.entries.get(name).map(|e| e.value.clone())
    }

    pub fn invalidate(&self, name: &str) {
        self.entries.remove(name);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Cached content by CID. Content is immutable once published, so entries
/// never expire.
pub struct ContentCache {
    entries: DashMap<String, Vec<u8>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    pub fn put(&self, cid: &str, bytes: Vec<u8>) {
        self.entries.insert(cid.to_string(), bytes);
    }

    pub fn get(&self, cid: &str) -> Option<Vec<u8>> {
        self.entries.get(cid).map(|e| e.clone())
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new()
    }
}

struct BreakerState {
    consecutive_failures: u32,
    tripped_until: Option<Instant>,
}

/// Per-gateway circuit breaker. A gateway trips after `threshold`
/// consecutive breaker-tripping failures (see
/// [`crate::error::ErrorKind::trips_breaker`]) and is excluded from racing
/// until `cooldown` has elapsed.
pub struct GatewayFailureCache {
    gateways: DashMap<String, BreakerState>,
    threshold: u32,
    cooldown: Duration,
}

impl GatewayFailureCache {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self { gateways: DashMap::new(), threshold, cooldown }
    }

    /// Record a failure for `gateway`. Trips the breaker once
    /// `consecutive_failures` reaches `threshold`.
    pub fn record_failure(&self, gateway: &str) {
        let mut entry = self.gateways.entry(gateway.to_string()).or_insert(BreakerState {
            consecutive_failures: 0,
            tripped_until: None,
        });
        entry.consecutive_failures += 1;
        if entry.consecutive_failures >= self.threshold {
            entry.tripped_until = Some(Instant::now() + self.cooldown);
        }
    }

    /// Reset a gateway's failure count after a success.
    pub fn record_success(&self, gateway: &str) {
        self.gateways.remove(gateway);
    }

    /// Whether `gateway` is currently excluded from racing. Once the
    /// cooldown elapses the entry is removed entirely, so the gateway must
    /// accumulate a fresh run of `threshold` consecutive failures to trip
    /// the breaker again (a single post-cooldown failure must not re-trip
    /// it immediately).
    pub fn is_tripped(&self, gateway: &str) -> bool {
        let tripped_until = match self.gateways.get(gateway) {
            Some(entry) => entry.tripped_until,
            None => return false,
        };
        match tripped_until {
            Some(until) if Instant::now() < until => true,
            Some(_) => {
                self.gateways.remove(gateway);
                false
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        self.gateways.clear();
    }
}

/// A single "is this identity's state known to be fresh" flag, set after a
/// local publish or an incoming push-subscription update and valid for
/// `window`. While set, `Provider::load` can skip resolution entirely and
/// serve straight from the content cache (a zero-RTT read).
pub struct KnownFreshFlag {
    set_at: DashMap<(), Instant>,
    window: Duration,
}

impl KnownFreshFlag {
    pub fn new(window: Duration) -> Self {
        Self { set_at: DashMap::new(), window }
    }

    pub fn mark_fresh(&self) {
        self.set_at.insert((), Instant::now());
    }

    pub fn is_fresh(&self) -> bool {
        match self.set_at.get(&()) {
            Some(at) => at.elapsed() <= self.window,
            None => false,
        }
    }

    pub fn clear(&self) {
        self.set_at.clear();
    }
}

/// The full set of caches used by one [`crate::provider::StateSyncProvider`].
pub struct Cache {
    pub ipns_records: IpnsRecordCache,
    pub content: ContentCache,
    pub gateway_failures: GatewayFailureCache,
    pub known_fresh: KnownFreshFlag,
}

impl Cache {
    pub fn new(cfg: &crate::config::StateSyncConfig) -> Self {
        Self {
            ipns_records: IpnsRecordCache::new(cfg.ipns_cache_ttl),
            content: ContentCache::new(),
            gateway_failures: GatewayFailureCache::new(
                cfg.circuit_breaker_threshold,
                cfg.circuit_breaker_cooldown,
            ),
            known_fresh: KnownFreshFlag::new(cfg.known_fresh_window),
        }
    }

    /// Clear all four maps, used by `Provider::clear()`.
    pub fn clear(&self) {
        self.ipns_records.clear();
        self.content.clear();
        self.gateway_failures.clear();
        self.known_fresh.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipns_record_respects_ttl() {
        let cache = IpnsRecordCache::new(Duration::from_millis(10));
        cache.put("name", ResolvedRecord { cid: "cid1".into(), sequence: 1 });
        assert!(cache.get("name").is_some());
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get("name").is_none());
        assert!(cache.get_ignore_ttl("name").is_some());
    }

    #[test]
    fn ipns_record_invalidate_removes_entry() {
        let cache = IpnsRecordCache::new(Duration::from_secs(60));
        cache.put("name", ResolvedRecord { cid: "cid1".into(), sequence: 1 });
        cache.invalidate("name");
        assert!(cache.get("name").is_none());
        assert!(cache.get_ignore_ttl("name").is_none());
    }

    #[test]
    fn content_cache_never_expires() {
        let cache = ContentCache::new();
        cache.put("cid1", vec![1, 2, 3]);
        assert_eq!(cache.get("cid1"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn breaker_trips_after_threshold_failures() {
        let cache = GatewayFailureCache::new(3, Duration::from_secs(60));
        assert!(!cache.is_tripped("gw1"));
        cache.record_failure("gw1");
        cache.record_failure("gw1");
        assert!(!cache.is_tripped("gw1"));
        cache.record_failure("gw1");
        assert!(cache.is_tripped("gw1"));
    }

    #[test]
    fn breaker_resets_on_success() {
        let cache = GatewayFailureCache::new(2, Duration::from_secs(60));
        cache.record_failure("gw1");
        cache.record_success("gw1");
        cache.record_failure("gw1");
        assert!(!cache.is_tripped("gw1"));
    }

    #[test]
    fn breaker_cools_down_after_elapsed_duration() {
        let cache = GatewayFailureCache::new(1, Duration::from_millis(10));
        cache.record_failure("gw1");
        assert!(cache.is_tripped("gw1"));
        std::thread::sleep(Duration::from_millis(20));
        assert!(!cache.is_tripped("gw1"));
    }

    #[test]
    fn breaker_requires_fresh_threshold_failures_after_cooldown() {
        let cache = GatewayFailureCache::new(3, Duration::from_millis(10));
        cache.record_failure("gw1");
        cache.record_failure("gw1");
        cache.record_failure("gw1");
        assert!(cache.is_tripped("gw1"));
        std::thread::sleep(Duration::from_millis(20));
        assert!(!cache.is_tripped("gw1"), "cooldown elapsed, entry must be cleared");

        // One failure right after cooldown must not re-trip the breaker;
        // it needs a fresh run of `threshold` consecutive failures.
        cache.record_failure("gw1");
        assert!(!cache.is_tripped("gw1"));
        cache.record_failure("gw1");
        assert!(!cache.is_tripped("gw1"));
        cache.record_failure("gw1");
        assert!(cache.is_tripped("gw1"));
    }

    #[test]
    fn known_fresh_flag_expires_after_window() {
        let flag = KnownFreshFlag::new(Duration::from_millis(10));
        assert!(!flag.is_fresh());
        flag.mark_fresh();
        assert!(flag.is_fresh());
        std::thread::sleep(Duration::from_millis(20));
        assert!(!flag.is_fresh());
    }

    #[test]
    fn cache_clear_resets_all_maps() {
        let cache = Cache::new(&crate::config::StateSyncConfig::default());
        cache.ipns_records.put("name", ResolvedRecord { cid: "cid1".into(), sequence: 1 });
        cache.content.put("cid1", vec![1]);
        cache.gateway_failures.record_failure("gw1");
        cache.known_fresh.mark_fresh();

        cache.clear();

        assert!(cache.ipns_records.get_ignore_ttl("name").is_none());
        assert!(cache.content.get("cid1").is_none());
        assert!(!cache.gateway_failures.is_tripped("gw1"));
        assert!(!cache.known_fresh.is_fresh());
    }
}
