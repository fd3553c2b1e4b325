//! Multi-gateway HTTP transport.
//!
//! Generalizes `openibank_sdk::OpeniBank`'s single-endpoint `reqwest`
//! client into a racer over an arbitrary number of gateways: uploads and
//! resolves run concurrently across every healthy gateway and the first
//! (or best) answer wins, the same way `openibank-sdk` races nothing
//! today only because it only ever talks to one endpoint.
//!
//! [`GatewayTransport`] is the seam a test double substitutes for
//! `reqwest` — no mocking crate exists anywhere in this workspace, so the
//! trait-plus-in-memory-double pattern is borrowed from the wider
//! example pack's light-client sync crate (`FullNodeConnection` /
//! `MockFullNode`), not from this crate's own teacher.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::FuturesUnordered;
use futures::StreamExt;

use crate::cache::Cache;
use crate::config::StateSyncConfig;
use crate::error::{classify_http_status, classify_transport_error, ErrorKind, StateSyncError, StateSyncResult};
use crate::record_codec::RecordCodec;

/// A gateway's raw HTTP answer, pre-classification.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl GatewayResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// One gateway's HTTP surface. Implemented by [`ReqwestTransport`] for
/// production use and by in-memory doubles in tests.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn upload(&self, gateway: &str, bytes: Vec<u8>, timeout: Duration) -> StateSyncResult<GatewayResponse>;
    async fn fetch(&self, gateway: &str, cid: &str, timeout: Duration) -> StateSyncResult<GatewayResponse>;
    async fn resolve(&self, gateway: &str, name: &str, timeout: Duration) -> StateSyncResult<GatewayResponse>;
    async fn publish(
        &self,
        gateway: &str,
        name: &str,
        record_bytes: Vec<u8>,
        timeout: Duration,
    ) -> StateSyncResult<GatewayResponse>;
    async fn version(&self, gateway: &str, timeout: Duration) -> StateSyncResult<GatewayResponse>;
}

/// Production [`GatewayTransport`] over `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }

    async fn run(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> StateSyncResult<GatewayResponse> {
        let response = tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| StateSyncError::transport(ErrorKind::Timeout, "request timed out", None))?
            .map_err(|e| {
                StateSyncError::transport(classify_transport_error(e.is_timeout()), e.to_string(), None)
            })?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| StateSyncError::transport(ErrorKind::InvalidResponse, e.to_string(), None))?
            .to_vec();
        Ok(GatewayResponse { status, body })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GatewayTransport for ReqwestTransport {
    async fn upload(&self, gateway: &str, bytes: Vec<u8>, timeout: Duration) -> StateSyncResult<GatewayResponse> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name("state.json");
        let form = reqwest::multipart::Form::new().part("file", part);
        let url = format!("{gateway}/api/v0/add?pin=true&cid-version=1");
        self.run(self.client.post(url).multipart(form), timeout).await
    }

    async fn fetch(&self, gateway: &str, cid: &str, timeout: Duration) -> StateSyncResult<GatewayResponse> {
        let url = format!("{gateway}/ipfs/{cid}");
        self.run(self.client.get(url), timeout).await
    }

    async fn resolve(&self, gateway: &str, name: &str, timeout: Duration) -> StateSyncResult<GatewayResponse> {
        let url = format!("{gateway}/api/v0/routing/get?arg=/ipns/{name}");
        self.run(self.client.post(url), timeout).await
    }

    async fn publish(
        &self,
        gateway: &str,
        name: &str,
        record_bytes: Vec<u8>,
        timeout: Duration,
    ) -> StateSyncResult<GatewayResponse> {
        let part = reqwest::multipart::Part::bytes(record_bytes).file_name("record");
        let form = reqwest::multipart::Form::new().part("record", part);
        let url = format!("{gateway}/api/v0/routing/put?arg=/ipns/{name}&allow-offline=true");
        self.run(self.client.post(url).multipart(form), timeout).await
    }

    async fn version(&self, gateway: &str, timeout: Duration) -> StateSyncResult<GatewayResponse> {
        let url = format!("{gateway}/api/v0/version");
        self.run(self.client.post(url), timeout).await
    }
}

type BoxedAttempt = Pin<Box<dyn Future<Output = StateSyncResult<GatewayResponse>> + Send>>;

/// Multi-gateway client built on a [`GatewayTransport`].
pub struct HttpClient<T: GatewayTransport = ReqwestTransport> {
    transport: Arc<T>,
    cache: Arc<Cache>,
    gateways: Vec<String>,
    config: StateSyncConfig,
}

impl<T: GatewayTransport + 'static> HttpClient<T> {
    pub fn new(transport: Arc<T>, cache: Arc<Cache>, config: StateSyncConfig) -> Self {
        Self { gateways: config.gateways.clone(), transport, cache, config }
    }

    /// Gateways not currently excluded by the circuit breaker.
    fn active_gateways(&self) -> Vec<String> {
        self.gateways
            .iter()
            .filter(|gw| !self.cache.gateway_failures.is_tripped(gw))
            .cloned()
            .collect()
    }

    /// Race `attempts` to completion, returning the first 2xx response.
    /// Failing attempts that complete before a winner is found count
    /// against that gateway's circuit breaker; attempts still outstanding
    /// when a winner is found are dropped (cancelled).
    async fn race_first_success(
        &self,
        attempts: Vec<(String, BoxedAttempt)>,
    ) -> StateSyncResult<(String, GatewayResponse)> {
        if attempts.is_empty() {
            return Err(StateSyncError::transport(
                ErrorKind::NetworkError,
                "no healthy gateways available",
                None,
            ));
        }

        let mut pending: FuturesUnordered<_> = attempts
            .into_iter()
            .map(|(gateway, fut)| async move { (gateway, fut.await) })
            .collect();

        let mut last_err = None;
        while let Some((gateway, result)) = pending.next().await {
            match result {
                Ok(resp) if resp.is_success() => {
                    self.cache.gateway_failures.record_success(&gateway);
                    return Ok((gateway, resp));
                }
                Ok(resp) => {
                    let kind = classify_http_status(resp.status, resp.body_str());
                    if kind.trips_breaker() {
                        self.cache.gateway_failures.record_failure(&gateway);
                    }
                    last_err = Some(StateSyncError::transport(kind, format!("HTTP {}", resp.status), Some(&gateway)));
                }
                Err(err) => {
                    if err.kind().trips_breaker() {
                        self.cache.gateway_failures.record_failure(&gateway);
                    }
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            StateSyncError::transport(ErrorKind::NetworkError, "all gateways failed", None)
        }))
    }

    /// Upload `bytes`, racing every healthy gateway. Returns the resulting
    /// CID.
    pub async fn upload(&self, bytes: Vec<u8>) -> StateSyncResult<String> {
        let timeout = self.config.publish_timeout;
        let attempts: Vec<(String, BoxedAttempt)> = self
            .active_gateways()
            .into_iter()
            .map(|gw| {
                let transport = self.transport.clone();
                let bytes = bytes.clone();
                let fut: BoxedAttempt = Box::pin(async move { transport.upload(&gw, bytes, timeout).await });
                (gw.clone(), fut)
            })
            .collect();

        let (_gateway, resp) = self.race_first_success(attempts).await?;
        extract_cid_from_add_response(&resp.body)
    }

    /// Fetch content by CID: cache-first, then race every healthy gateway.
    pub async fn fetch(&self, cid: &str) -> StateSyncResult<Vec<u8>> {
        if let Some(cached) = self.cache.content.get(cid) {
            return Ok(cached);
        }

        let timeout = self.config.fetch_timeout;
        let cid_owned = cid.to_string();
        let attempts: Vec<(String, BoxedAttempt)> = self
            .active_gateways()
            .into_iter()
            .map(|gw| {
                let transport = self.transport.clone();
                let cid = cid_owned.clone();
                let fut: BoxedAttempt = Box::pin(async move { transport.fetch(&gw, &cid, timeout).await });
                (gw.clone(), fut)
            })
            .collect();

        let (_gateway, resp) = self.race_first_success(attempts).await?;
        self.cache.content.put(cid, resp.body.clone());
        Ok(resp.body)
    }

    /// Resolve an IPNS name. Waits for every gateway to answer (bounded by
    /// `resolve_timeout + 1s` overall) and picks the highest sequence
    /// number across all parsed records, since a stale gateway answering
    /// quickly must not shadow a fresher one answering a moment later.
    pub async fn resolve(
        &self,
        name: &str,
        codec: &dyn RecordCodec,
    ) -> StateSyncResult<crate::cache::ResolvedRecord> {
        let per_gateway_timeout = self.config.resolve_timeout;
        let overall_timeout = self.config.resolve_timeout + Duration::from_secs(1);

        let gateways = self.active_gateways();
        if gateways.is_empty() {
            return Err(StateSyncError::transport(ErrorKind::NetworkError, "no healthy gateways available", None));
        }

        let responses = tokio::time::timeout(overall_timeout, async {
            let mut set: FuturesUnordered<_> = gateways
                .into_iter()
                .map(|gw| {
                    let transport = self.transport.clone();
                    async move {
                        let result = transport.resolve(&gw, name, per_gateway_timeout).await;
                        (gw, result)
                    }
                })
                .collect();
            let mut collected = Vec::new();
            while let Some(item) = set.next().await {
                collected.push(item);
            }
            collected
        })
        .await
        .unwrap_or_default();

        let mut best: Option<crate::record_codec::ParsedRecord> = None;
        let mut last_err = None;
        for (gateway, result) in responses {
            match result {
                Ok(resp) if resp.is_success() => {
                    self.cache.gateway_failures.record_success(&gateway);
                    let body = String::from_utf8_lossy(&resp.body);
                    for line in body.lines() {
                        if let Ok(Some(parsed)) = codec.parse(line) {
                            if best.as_ref().map(|b| parsed.sequence > b.sequence).unwrap_or(true) {
                                best = Some(parsed);
                            }
                        }
                    }
                }
                Ok(resp) => {
                    let kind = classify_http_status(resp.status, resp.body_str());
                    if kind.trips_breaker() {
                        self.cache.gateway_failures.record_failure(&gateway);
                    }
                    last_err = Some(StateSyncError::transport(kind, format!("HTTP {}", resp.status), Some(&gateway)));
                }
                Err(err) => {
                    if err.kind().trips_breaker() {
                        self.cache.gateway_failures.record_failure(&gateway);
                    }
                    last_err = Some(err);
                }
            }
        }

        match best {
            Some(parsed) => {
                let record = crate::cache::ResolvedRecord { cid: parsed.cid, sequence: parsed.sequence };
                self.cache.ipns_records.put(name, record.clone());
                Ok(record)
            }
            // No gateway produced a parsable record. Spec §4.7.6/"All-gateway
            // failure on resolve": reported as not-found regardless of cause
            // (distinguishing "never published" from "every gateway errored"
            // is best-effort via the body-sniffing classifier, not a hard
            // guarantee) — callers match on `PointerNotFound`/`kind() ==
            // NotFound`, not on the underlying per-gateway error.
            None => {
                if let Some(err) = last_err {
                    tracing::debug!(%name, error = %err, "[statesync] resolve: no gateway produced a record, reporting not-found");
                }
                Err(StateSyncError::PointerNotFound { name: name.to_string() })
            }
        }
    }

    /// Publish a signed record. Fire-and-settle: every healthy gateway is
    /// attempted and awaited to completion; success if any one accepts.
    pub async fn publish(&self, name: &str, record_bytes: Vec<u8>) -> StateSyncResult<()> {
        let timeout = self.config.publish_timeout;
        let gateways = self.active_gateways();
        if gateways.is_empty() {
            return Err(StateSyncError::transport(ErrorKind::NetworkError, "no healthy gateways available", None));
        }

        let mut set: FuturesUnordered<_> = gateways
            .into_iter()
            .map(|gw| {
                let transport = self.transport.clone();
                let bytes = record_bytes.clone();
                async move {
                    let result = transport.publish(&gw, name, bytes, timeout).await;
                    (gw, result)
                }
            })
            .collect();

        let mut any_success = false;
        let mut attempted = 0usize;
        while let Some((gateway, result)) = set.next().await {
            attempted += 1;
            match result {
                Ok(resp) if resp.is_success() => {
                    self.cache.gateway_failures.record_success(&gateway);
                    any_success = true;
                }
                Ok(resp) => {
                    let kind = classify_http_status(resp.status, resp.body_str());
                    if kind.trips_breaker() {
                        self.cache.gateway_failures.record_failure(&gateway);
                    }
                }
                Err(err) => {
                    if err.kind().trips_breaker() {
                        self.cache.gateway_failures.record_failure(&gateway);
                    }
                }
            }
        }

        if any_success {
            Ok(())
        } else {
            Err(StateSyncError::PublishFailed { attempted })
        }
    }

    /// Probe one gateway's reachability.
    pub async fn test_connectivity(&self, gateway: &str) -> bool {
        self.transport
            .version(gateway, self.config.connectivity_timeout)
            .await
            .map(|r| r.is_success())
            .unwrap_or(false)
    }

    /// Return the first gateway (in configured order) that answers a
    /// connectivity probe.
    pub async fn find_healthy(&self) -> Option<String> {
        for gateway in &self.gateways {
            if self.test_connectivity(gateway).await {
                return Some(gateway.clone());
            }
        }
        None
    }

    /// Re-resolve `name` up to `retries` times, returning success as soon
    /// as the resolved record matches `(expected_cid, expected_sequence)`.
    /// Used after a publish to confirm propagation before reporting
    /// `storage:saved`.
    pub async fn verify(
        &self,
        name: &str,
        expected_cid: &str,
        expected_sequence: u64,
        retries: u32,
        codec: &dyn RecordCodec,
    ) -> bool {
        for _ in 0..retries.max(1) {
            if let Ok(record) = self.resolve(name, codec).await {
                if record.cid == expected_cid && record.sequence == expected_sequence {
                    return true;
                }
            }
        }
        false
    }
}

fn extract_cid_from_add_response(body: &[u8]) -> StateSyncResult<String> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| StateSyncError::transport(ErrorKind::InvalidResponse, format!("malformed add response: {e}"), None))?;
    value
        .get("Hash")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| StateSyncError::transport(ErrorKind::InvalidResponse, "add response missing Hash field", None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_codec::DefaultRecordCodec;
    use base64::Engine;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex as StdMutex;

    struct ScriptedTransport {
        upload_calls: AtomicU32,
        responses: StdMutex<std::collections::HashMap<String, StateSyncResult<GatewayResponse>>>,
    }

    impl ScriptedTransport {
        fn new() -> Self {
            Self { upload_calls: AtomicU32::new(0), responses: StdMutex::new(std::collections::HashMap::new()) }
        }

        fn script(&self, gateway: &str, response: StateSyncResult<GatewayResponse>) {
            self.responses.lock().unwrap().insert(gateway.to_string(), response);
        }

        fn ok(status: u16, body: &str) -> StateSyncResult<GatewayResponse> {
            Ok(GatewayResponse { status, body: body.as_bytes().to_vec() })
        }
    }

    fn clone_result(r: &StateSyncResult<GatewayResponse>) -> StateSyncResult<GatewayResponse> {
        match r {
            Ok(resp) => Ok(resp.clone()),
            Err(_) => Err(StateSyncError::transport(ErrorKind::NetworkError, "scripted failure", None)),
        }
    }

    #[async_trait]
    impl GatewayTransport for ScriptedTransport {
        async fn upload(&self, gateway: &str, _bytes: Vec<u8>, _timeout: Duration) -> StateSyncResult<GatewayResponse> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            self.responses.lock().unwrap().get(gateway).map(clone_result).unwrap_or_else(|| {
                Err(StateSyncError::transport(ErrorKind::NetworkError, "no script", None))
            })
        }

        async fn fetch(&self, gateway: &str, _cid: &str, _timeout: Duration) -> StateSyncResult<GatewayResponse> {
            self.responses.lock().unwrap().get(gateway).map(clone_result).unwrap_or_else(|| {
                Err(StateSyncError::transport(ErrorKind::NetworkError, "no script", None))
            })
        }

        async fn resolve(&self, gateway: &str, _name: &str, _timeout: Duration) -> StateSyncResult<GatewayResponse> {
            self.responses.lock().unwrap().get(gateway).map(clone_result).unwrap_or_else(|| {
                Err(StateSyncError::transport(ErrorKind::NetworkError, "no script", None))
            })
        }

        async fn publish(
            &self,
            gateway: &str,
            _name: &str,
            _record_bytes: Vec<u8>,
            _timeout: Duration,
        ) -> StateSyncResult<GatewayResponse> {
            self.responses.lock().unwrap().get(gateway).map(clone_result).unwrap_or_else(|| {
                Err(StateSyncError::transport(ErrorKind::NetworkError, "no script", None))
            })
        }

        async fn version(&self, gateway: &str, _timeout: Duration) -> StateSyncResult<GatewayResponse> {
            self.responses.lock().unwrap().get(gateway).map(clone_result).unwrap_or_else(|| {
                Err(StateSyncError::transport(ErrorKind::NetworkError, "no script", None))
            })
        }
    }

    fn client(transport: ScriptedTransport, gateways: Vec<&str>) -> HttpClient<ScriptedTransport> {
        let cfg = StateSyncConfig::with_gateways(gateways);
        HttpClient::new(Arc::new(transport), Arc::new(Cache::new(&cfg)), cfg)
    }

    #[tokio::test]
    async fn upload_returns_cid_from_first_success() {
        let transport = ScriptedTransport::new();
        transport.script("gw-a", ScriptedTransport::ok(200, r#"{"Hash":"bafy123"}"#));
        transport.script("gw-b", Err(StateSyncError::transport(ErrorKind::NetworkError, "down", None)));
        let client = client(transport, vec!["gw-a", "gw-b"]);

        let cid = client.upload(vec![1, 2, 3]).await.unwrap();
        assert_eq!(cid, "bafy123");
    }

    #[tokio::test]
    async fn upload_fails_when_every_gateway_fails() {
        let transport = ScriptedTransport::new();
        transport.script("gw-a", Err(StateSyncError::transport(ErrorKind::NetworkError, "down", None)));
        let client = client(transport, vec!["gw-a"]);

        assert!(client.upload(vec![1]).await.is_err());
    }

    #[tokio::test]
    async fn fetch_is_cache_first() {
        let transport = ScriptedTransport::new();
        let cfg = StateSyncConfig::with_gateways(vec!["gw-a"]);
        let cache = Arc::new(Cache::new(&cfg));
        cache.content.put("bafy1", vec![9, 9, 9]);
        let client = HttpClient::new(Arc::new(transport), cache, cfg);

        let bytes = client.fetch("bafy1").await.unwrap();
        assert_eq!(bytes, vec![9, 9, 9]);
    }

    #[tokio::test]
    async fn resolve_picks_highest_sequence_across_gateways() {
        let codec = DefaultRecordCodec::new();
        let key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);

        let low = codec.sign(&key, "bafy-low", 3, Duration::from_secs(60)).unwrap();
        let high = codec.sign(&key, "bafy-high", 9, Duration::from_secs(60)).unwrap();

        let line = |bytes: &[u8]| {
            serde_json::json!({"Extra": base64::engine::general_purpose::STANDARD.encode(bytes)}).to_string()
        };
        use base64::Engine;

        let transport = ScriptedTransport::new();
        transport.script("gw-a", ScriptedTransport::ok(200, &line(&low)));
        transport.script("gw-b", ScriptedTransport::ok(200, &line(&high)));
        let client = client(transport, vec!["gw-a", "gw-b"]);

        let resolved = client.resolve("name1", &codec).await.unwrap();
        assert_eq!(resolved.sequence, 9);
        assert_eq!(resolved.cid, "bafy-high");
    }

    #[tokio::test]
    async fn publish_succeeds_if_any_gateway_accepts() {
        let transport = ScriptedTransport::new();
        transport.script("gw-a", Err(StateSyncError::transport(ErrorKind::GatewayError, "rejected", None)));
        transport.script("gw-b", ScriptedTransport::ok(200, "{}"));
        let client = client(transport, vec!["gw-a", "gw-b"]);

        assert!(client.publish("name1", vec![1, 2, 3]).await.is_ok());
    }

    #[tokio::test]
    async fn publish_fails_when_every_gateway_rejects() {
        let transport = ScriptedTransport::new();
        transport.script("gw-a", ScriptedTransport::ok(500, "internal error"));
        let client = client(transport, vec!["gw-a"]);

        assert!(client.publish("name1", vec![1]).await.is_err());
    }

    #[tokio::test]
    async fn not_found_does_not_trip_breaker() {
        let transport = ScriptedTransport::new();
        transport.script("gw-a", ScriptedTransport::ok(404, ""));
        let client = client(transport, vec!["gw-a"]);

        let _ = client.fetch("bafy-missing").await;
        assert!(!client.cache.gateway_failures.is_tripped("gw-a"));
    }

    #[tokio::test]
    async fn repeated_gateway_errors_trip_breaker_and_exclude_it() {
        let transport = ScriptedTransport::new();
        transport.script("gw-a", ScriptedTransport::ok(500, "internal error"));
        let client = client(transport, vec!["gw-a"]);

        for _ in 0..3 {
            let _ = client.fetch("bafy-x").await;
        }
        assert!(client.cache.gateway_failures.is_tripped("gw-a"));
        assert!(client.active_gateways().is_empty());
    }

    #[tokio::test]
    async fn resolve_reports_pointer_not_found_when_every_gateway_says_404() {
        let transport = ScriptedTransport::new();
        transport.script("gw-a", ScriptedTransport::ok(404, ""));
        let client = client(transport, vec!["gw-a"]);
        let codec = DefaultRecordCodec::new();

        let err = client.resolve("never-published", &codec).await.unwrap_err();
        assert!(matches!(err, StateSyncError::PointerNotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        // A 404 must not trip the breaker either.
        assert!(!client.cache.gateway_failures.is_tripped("gw-a"));
    }
}
