//! Optional push-pointer subscription (spec §4.8).
//!
//! Generalizes `resonancex-ws`'s tagged-JSON WebSocket protocol to a
//! client connecting outbound to a gateway's push feed instead of serving
//! one. The engine must function fully with this module entirely absent
//! (spec §9, "optional behavior via capability sets") — `provider.rs` only
//! constructs a [`SubscriptionClient`] when [`crate::config::StateSyncConfig::enable_subscription`]
//! is set.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::cache::ResolvedRecord;

/// Derive a push-subscription WebSocket URL from a gateway base URL:
/// `https://host` -> `wss://host/ws/ipns`, `http://host` -> `ws://host/ws/ipns`.
/// Returns `None` for a gateway URL with neither scheme.
pub fn derive_ws_url(gateway: &str) -> Option<String> {
    if let Some(rest) = gateway.strip_prefix("https://") {
        Some(format!("wss://{rest}/ws/ipns"))
    } else if let Some(rest) = gateway.strip_prefix("http://") {
        Some(format!("ws://{rest}/ws/ipns"))
    } else {
        None
    }
}

type ResolveFuture = Pin<Box<dyn Future<Output = Option<ResolvedRecord>> + Send>>;
type ResolveFn = Arc<dyn Fn() -> ResolveFuture + Send + Sync>;
type OnUpdate = Arc<dyn Fn(ResolvedRecord) + Send + Sync>;

/// Reconnecting WebSocket subscriber plus a fallback poller that covers
/// for it whenever the stream isn't open. Both run as background tasks;
/// dropping (or explicitly [`SubscriptionClient::shutdown`]ing) the handle
/// aborts them.
pub struct SubscriptionClient {
    connected: Arc<AtomicBool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SubscriptionClient {
    /// Start the stream and fallback-poll tasks for `name` against
    /// `ws_url`. `last_known_remote_sequence` is shared with the owning
    /// provider so the poller's "only emit on advance" check (spec §4.8)
    /// sees the same counter `Provider::load`/`_doSave` maintain.
    pub fn start(
        name: String,
        ws_url: String,
        fallback_poll_interval: Duration,
        last_known_remote_sequence: Arc<AtomicU64>,
        on_update: OnUpdate,
        resolve: ResolveFn,
    ) -> Self {
        let connected = Arc::new(AtomicBool::new(false));

        let stream_task = tokio::spawn(stream_loop(
            name,
            ws_url,
            connected.clone(),
            last_known_remote_sequence.clone(),
            on_update.clone(),
        ));
        let poller_task = tokio::spawn(poll_loop(
            fallback_poll_interval,
            connected.clone(),
            last_known_remote_sequence,
            on_update,
            resolve,
        ));

        Self { connected, tasks: vec![stream_task, poller_task] }
    }

    /// Whether the push stream is currently open (used only for tests and
    /// diagnostics; the poller makes its own decision independently).
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Stop both background tasks.
    pub fn shutdown(self) {
        for task in self.tasks {
            task.abort();
        }
    }
}

const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

async fn stream_loop(
    name: String,
    url: String,
    connected: Arc<AtomicBool>,
    last_known_remote_sequence: Arc<AtomicU64>,
    on_update: OnUpdate,
) {
    loop {
        match tokio_tungstenite::connect_async(&url).await {
            Ok((mut socket, _response)) => {
                let subscribe = serde_json::json!({"action": "subscribe", "names": [name]}).to_string();
                if socket.send(Message::Text(subscribe)).await.is_err() {
                    tracing::debug!(%url, "[statesync] subscription send failed");
                } else {
                    connected.store(true, Ordering::SeqCst);
                    tracing::debug!(%url, "[statesync] subscription stream open");

                    while let Some(message) = socket.next().await {
                        match message {
                            Ok(Message::Text(text)) => {
                                if let Some(update) = parse_update(&text, &name) {
                                    last_known_remote_sequence.fetch_max(update.sequence, Ordering::SeqCst);
                                    on_update(update);
                                }
                            }
                            Ok(Message::Close(_)) | Err(_) => break,
                            _ => {}
                        }
                    }
                }
                connected.store(false, Ordering::SeqCst);
            }
            Err(err) => {
                tracing::debug!(%url, error = %err, "[statesync] subscription connect failed");
            }
        }
        tokio::time::sleep(RECONNECT_BACKOFF).await;
    }
}

async fn poll_loop(
    interval: Duration,
    connected: Arc<AtomicBool>,
    last_known_remote_sequence: Arc<AtomicU64>,
    on_update: OnUpdate,
    resolve: ResolveFn,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // first tick fires immediately; skip it, we just started.
    loop {
        ticker.tick().await;
        if connected.load(Ordering::SeqCst) {
            continue;
        }
        if let Some(record) = resolve().await {
            if record.sequence > last_known_remote_sequence.load(Ordering::SeqCst) {
                last_known_remote_sequence.store(record.sequence, Ordering::SeqCst);
                on_update(record);
            }
        }
    }
}

/// Parse one server frame, returning `Some` only for a `type: "update"`
/// message addressed to `own_name` (spec §6.2). Messages for other names
/// are ignored, matching a multi-tenant push feed shared across peers.
fn parse_update(text: &str, own_name: &str) -> Option<ResolvedRecord> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    if value.get("type").and_then(|v| v.as_str()) != Some("update") {
        return None;
    }
    if value.get("name").and_then(|v| v.as_str()) != Some(own_name) {
        return None;
    }
    let cid = value.get("cid").and_then(|v| v.as_str())?.to_string();
    let sequence = value.get("sequence").and_then(|v| v.as_u64())?;
    Some(ResolvedRecord { cid, sequence })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_wss_from_https_gateway() {
        assert_eq!(
            derive_ws_url("https://ipfs.example.com"),
            Some("wss://ipfs.example.com/ws/ipns".to_string())
        );
    }

    #[test]
    fn derives_ws_from_http_gateway() {
        assert_eq!(
            derive_ws_url("http://localhost:8080"),
            Some("ws://localhost:8080/ws/ipns".to_string())
        );
    }

    #[test]
    fn returns_none_for_unrecognized_scheme() {
        assert_eq!(derive_ws_url("ftp://example.com"), None);
    }

    #[test]
    fn parse_update_matches_own_name_only() {
        let frame = serde_json::json!({
            "type": "update", "name": "peer1", "sequence": 5, "cid": "bafy1", "timestamp": "123"
        })
        .to_string();

        let mine = parse_update(&frame, "peer1").unwrap();
        assert_eq!(mine.sequence, 5);
        assert_eq!(mine.cid, "bafy1");

        assert!(parse_update(&frame, "peer2").is_none());
    }

    #[test]
    fn parse_update_ignores_non_update_frames() {
        let frame = serde_json::json!({"type": "subscribed", "names": ["peer1"]}).to_string();
        assert!(parse_update(&frame, "peer1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn poller_emits_only_when_sequence_advances_and_stream_down() {
        use std::sync::atomic::AtomicUsize;

        let connected = Arc::new(AtomicBool::new(false));
        let last_seq = Arc::new(AtomicU64::new(5));
        let emit_count = Arc::new(AtomicUsize::new(0));
        let emit_count2 = emit_count.clone();

        let resolve: ResolveFn = Arc::new(|| {
            Box::pin(async { Some(ResolvedRecord { cid: "bafy-new".into(), sequence: 9 }) })
        });
        let on_update: OnUpdate = Arc::new(move |_record| {
            emit_count2.fetch_add(1, Ordering::SeqCst);
        });

        let handle = tokio::spawn(poll_loop(
            Duration::from_millis(100),
            connected.clone(),
            last_seq.clone(),
            on_update,
            resolve,
        ));

        tokio::time::advance(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;

        assert_eq!(emit_count.load(Ordering::SeqCst), 1);
        assert_eq!(last_seq.load(Ordering::SeqCst), 9);

        // Once caught up, a further poll with the same sequence must not re-emit.
        tokio::time::advance(Duration::from_millis(150)).await;
        tokio::task::yield_now().await;
        assert_eq!(emit_count.load(Ordering::SeqCst), 1);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn poller_skips_while_stream_connected() {
        use std::sync::atomic::AtomicUsize;

        let connected = Arc::new(AtomicBool::new(true));
        let last_seq = Arc::new(AtomicU64::new(1));
        let emit_count = Arc::new(AtomicUsize::new(0));
        let emit_count2 = emit_count.clone();

        let resolve: ResolveFn =
            Arc::new(|| Box::pin(async { Some(ResolvedRecord { cid: "bafy-x".into(), sequence: 99 }) }));
        let on_update: OnUpdate = Arc::new(move |_| {
            emit_count2.fetch_add(1, Ordering::SeqCst);
        });

        let handle = tokio::spawn(poll_loop(Duration::from_millis(50), connected, last_seq, on_update, resolve));

        tokio::time::advance(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;

        assert_eq!(emit_count.load(Ordering::SeqCst), 0);
        handle.abort();
    }
}
