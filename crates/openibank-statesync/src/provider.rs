//! The top-level state machine (spec §4.7).
//!
//! `StateSyncProvider<T>` ties every other module together: it owns the
//! chain state, drives `_doSave` through `WriteBehind`, and orchestrates
//! `load`/`save`/`sync`/`clear`/`exists` behind the single serial queue
//! `write_behind` provides. Generic over `T: GatewayTransport` the same way
//! `HttpClient<T>` is, so tests substitute an in-memory transport without a
//! mocking crate.
//!
//! `Inner<T>` is built with [`Arc::new_cyclic`] so the `_doSave` closure
//! handed to `WriteBehind::new` at construction time can hold a `Weak`
//! back-reference to the not-yet-finished provider internals — the same
//! "construct the cycle, don't avoid it" approach `SPEC_FULL.md` §9
//! prescribes for this shared graph.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::cache::{Cache, ResolvedRecord};
use crate::config::StateSyncConfig;
use crate::document::TxfData;
use crate::error::{StateSyncError, StateSyncResult};
use crate::events::{EventEmitter, StorageEvent};
use crate::http_client::{GatewayTransport, HttpClient, ReqwestTransport};
use crate::identity::{IpnsIdentity, WalletSecret};
use crate::merge::merge;
use crate::persistence::{PersistedChainState, StatePersistence};
use crate::record_codec::RecordCodec;
use crate::subscription::{derive_ws_url, SubscriptionClient};
use crate::write_behind::{DoSave, WriteBehind};

fn now_millis() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as i64).unwrap_or(0)
}

/// Provider lifecycle states (spec §3.6 / §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Where `load()`'s returned document came from, carried on the
/// `storage:loaded` event (spec §4.7.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Served from the content cache, either via the known-fresh zero-RTT
    /// path, a non-expired IPNS record cache hit, or a stale-cache fallback
    /// after a transport failure. Also used for the synthetic `Loaded`
    /// emitted by `initialize()` when persisted chain state was restored.
    Cache,
    /// Resolved and fetched over the network this call.
    Network,
    /// Fetched directly by a caller-supplied CID, bypassing pointer
    /// resolution entirely.
    RemoteDirect,
}

/// Outcome of `StateSyncProvider::load`.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub success: bool,
    pub data: Option<TxfData>,
    pub source: Option<LoadSource>,
    pub error: Option<String>,
}

/// Outcome of `StateSyncProvider::save`.
#[derive(Debug, Clone, Copy)]
pub struct SaveOutcome {
    pub success: bool,
}

/// Outcome of `StateSyncProvider::sync`.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub success: bool,
    pub added: u64,
    pub removed: u64,
    pub conflicts: u64,
    pub error: Option<String>,
}

/// In-memory chain state (spec §3.3). `remote_cid` is the value the next
/// `_doSave` writes into the outgoing document's `_meta.lastCid`; `None`
/// means bootstrap.
#[derive(Debug, Clone, Default)]
struct ChainState {
    sequence_number: u64,
    last_cid: Option<String>,
    remote_cid: Option<String>,
    data_version: u64,
}

struct Inner<T: GatewayTransport + 'static> {
    config: StateSyncConfig,
    cache: Arc<Cache>,
    http: HttpClient<T>,
    codec: Arc<dyn RecordCodec>,
    persistence: Box<dyn StatePersistence>,
    identity: RwLock<Option<IpnsIdentity>>,
    pending_secret: Mutex<Option<WalletSecret>>,
    chain: Mutex<ChainState>,
    last_address: Mutex<String>,
    last_known_remote_sequence: Arc<AtomicU64>,
    state: Mutex<ProviderState>,
    events: EventEmitter,
    write_behind: Arc<WriteBehind>,
    subscription: Mutex<Option<SubscriptionClient>>,
}

/// The top-level synchronization engine for one wallet identity.
#[derive(Clone)]
pub struct StateSyncProvider<T: GatewayTransport + 'static = ReqwestTransport> {
    inner: Arc<Inner<T>>,
}

impl<T: GatewayTransport + 'static> StateSyncProvider<T> {
    /// Build a provider. `transport` is the `GatewayTransport` impl
    /// (`ReqwestTransport` in production, an in-memory double in tests);
    /// `codec` signs and parses pointer records; `persistence` restores and
    /// commits chain state across restarts.
    pub fn new(
        config: StateSyncConfig,
        transport: Arc<T>,
        codec: Arc<dyn RecordCodec>,
        persistence: Box<dyn StatePersistence>,
    ) -> Self {
        let cache = Arc::new(Cache::new(&config));
        let http = HttpClient::new(transport, cache.clone(), config.clone());
        let debounce = config.flush_debounce;

        let inner = Arc::new_cyclic(|weak: &Weak<Inner<T>>| {
            let weak_for_save = weak.clone();
            let do_save: DoSave = Arc::new(move |doc: TxfData| {
                let weak = weak_for_save.clone();
                Box::pin(async move {
                    match weak.upgrade() {
                        Some(inner) => execute_do_save(inner, doc).await,
                        None => Err(StateSyncError::InvalidInput("provider dropped mid-flush".into())),
                    }
                }) as Pin<Box<dyn Future<Output = StateSyncResult<TxfData>> + Send>>
            });

            Inner {
                config,
                cache,
                http,
                codec,
                persistence,
                identity: RwLock::new(None),
                pending_secret: Mutex::new(None),
                chain: Mutex::new(ChainState::default()),
                last_address: Mutex::new(String::new()),
                last_known_remote_sequence: Arc::new(AtomicU64::new(0)),
                state: Mutex::new(ProviderState::Disconnected),
                events: EventEmitter::new(),
                write_behind: WriteBehind::new(debounce, do_save),
                subscription: Mutex::new(None),
            }
        });

        Self { inner }
    }

    /// Set the wallet secret identity derives from. Must be called exactly
    /// once, before `initialize()`.
    pub fn set_identity(&self, secret: WalletSecret) -> StateSyncResult<()> {
        if self.inner.identity.read().unwrap().is_some() {
            return Err(StateSyncError::InvalidInput("identity already set".into()));
        }
        *self.inner.pending_secret.lock().unwrap() = Some(secret);
        Ok(())
    }

    /// Derive the identity, restore persisted chain state, optionally start
    /// the push-subscription client, and transition to `Connected` (spec
    /// §4.7.1).
    pub async fn initialize(&self) -> StateSyncResult<()> {
        let secret = self
            .inner
            .pending_secret
            .lock()
            .unwrap()
            .take()
            .ok_or(StateSyncError::IdentityNotSet)?;

        *self.inner.state.lock().unwrap() = ProviderState::Connecting;

        let identity = match IpnsIdentity::derive(&secret) {
            Ok(id) => id,
            Err(e) => return self.fail_initialize(e),
        };
        let name = identity.name().as_str().to_string();
        *self.inner.identity.write().unwrap() = Some(identity);

        match self.inner.persistence.load(&name).await {
            Ok(Some(persisted)) => {
                let mut chain = self.inner.chain.lock().unwrap();
                chain.sequence_number = persisted.sequence();
                chain.remote_cid = persisted.last_cid.clone();
                chain.last_cid = persisted.last_cid.clone();
                chain.data_version = persisted.version;
                drop(chain);
                self.inner.last_known_remote_sequence.fetch_max(persisted.sequence(), Ordering::SeqCst);
            }
            Ok(None) => {}
            Err(e) => return self.fail_initialize(e),
        }

        if self.inner.config.enable_subscription {
            self.start_subscription(name);
        }

        let probe = self.inner.clone();
        tokio::spawn(async move {
            let _ = probe.http.find_healthy().await;
        });

        *self.inner.state.lock().unwrap() = ProviderState::Connected;
        let version = self.inner.chain.lock().unwrap().data_version;
        self.inner.events.emit(StorageEvent::Loaded { source: LoadSource::Cache, version });
        Ok(())
    }

    fn fail_initialize(&self, err: StateSyncError) -> StateSyncResult<()> {
        *self.inner.state.lock().unwrap() = ProviderState::Error;
        self.inner.events.emit(StorageEvent::Error { message: err.to_string() });
        Err(err)
    }

    fn start_subscription(&self, name: String) {
        let ws_url = self
            .inner
            .config
            .ws_url
            .clone()
            .or_else(|| self.inner.config.gateways.first().and_then(|gw| derive_ws_url(gw)));
        let Some(ws_url) = ws_url else {
            tracing::debug!("[statesync] subscription enabled but no ws url could be derived");
            return;
        };

        let name_for_update = name.clone();
        let inner_for_update = self.inner.clone();
        let on_update: Arc<dyn Fn(ResolvedRecord) + Send + Sync> = Arc::new(move |record: ResolvedRecord| {
            inner_for_update.cache.ipns_records.put(&name_for_update, record.clone());
            inner_for_update.events.emit(StorageEvent::RemoteUpdated { cid: record.cid, sequence: record.sequence });
        });

        let resolve_inner = self.inner.clone();
        let resolve_name = name.clone();
        let resolve: Arc<dyn Fn() -> Pin<Box<dyn Future<Output = Option<ResolvedRecord>> + Send>> + Send + Sync> =
            Arc::new(move || {
                let inner = resolve_inner.clone();
                let name = resolve_name.clone();
                Box::pin(async move { inner.http.resolve(&name, inner.codec.as_ref()).await.ok() })
            });

        let client = SubscriptionClient::start(
            name,
            ws_url,
            self.inner.config.fallback_poll_interval,
            self.inner.last_known_remote_sequence.clone(),
            on_update,
            resolve,
        );
        *self.inner.subscription.lock().unwrap() = Some(client);
    }

    /// Drain any pending write, stop the subscription client, clear caches,
    /// and transition to `Disconnected`.
    pub async fn shutdown(&self) -> StateSyncResult<()> {
        self.inner.write_behind.shutdown().await;
        if let Some(sub) = self.inner.subscription.lock().unwrap().take() {
            sub.shutdown();
        }
        self.inner.cache.clear();
        *self.inner.state.lock().unwrap() = ProviderState::Disconnected;
        Ok(())
    }

    fn identity_name(&self) -> Option<String> {
        self.inner.identity.read().unwrap().as_ref().map(|id| id.name().as_str().to_string())
    }

    fn current_address(&self) -> String {
        self.inner.last_address.lock().unwrap().clone()
    }

    fn require_connected(&self) -> StateSyncResult<()> {
        let state = *self.inner.state.lock().unwrap();
        if state != ProviderState::Connected {
            return Err(StateSyncError::NotConnected(format!("{state:?}")));
        }
        Ok(())
    }

    /// Stage `doc` for a debounced flush. No network I/O happens on this
    /// path (spec §4.6.3).
    pub async fn save(&self, doc: TxfData) -> StateSyncResult<SaveOutcome> {
        self.require_connected()?;
        if self.identity_name().is_none() {
            return Err(StateSyncError::IdentityNotSet);
        }
        self.inner.write_behind.save(doc).await;
        Ok(SaveOutcome { success: true })
    }

    /// Load the remote document, merge it with `local` if the remote has
    /// moved, and publish the result — all inside the same exclusivity
    /// `_doSave` uses (spec §4.6.3, §4.7.4, §5 "Save→Sync ordering").
    pub async fn sync(&self, local: TxfData) -> SyncOutcome {
        if let Err(e) = self.require_connected() {
            return self.sync_error(e);
        }
        self.inner.events.emit(StorageEvent::SyncStarted);

        let write_behind = self.inner.write_behind.clone();
        let outcome = write_behind.run_exclusive(|| self.run_sync_locked(local)).await;
        outcome
    }

    async fn run_sync_locked(&self, local: TxfData) -> SyncOutcome {
        // Pending local writes are folded in: `local` itself is the source
        // of truth from here on, so whatever was staged is discarded rather
        // than separately flushed (spec §5, Save→Sync ordering).
        let _ = self.inner.write_behind.take_staged().await;

        let remote = match self.load_remote_for_sync().await {
            Ok(remote) => remote,
            Err(e) => return self.sync_error(e),
        };

        let Some(remote_doc) = remote else {
            // Bootstrap: nothing published yet, local becomes the first save.
            return match self.inner.write_behind.call_do_save(local).await {
                Ok(_) => {
                    self.inner.events.emit(StorageEvent::SyncCompleted { added: 0, removed: 0, conflicts: 0 });
                    SyncOutcome { success: true, added: 0, removed: 0, conflicts: 0, error: None }
                }
                Err(e) => self.sync_error(e),
            };
        };

        let already_converged = local.meta.version == remote_doc.meta.version
            && self.inner.chain.lock().unwrap().last_cid.is_some();
        if already_converged {
            self.inner.events.emit(StorageEvent::SyncCompleted { added: 0, removed: 0, conflicts: 0 });
            return SyncOutcome { success: true, added: 0, removed: 0, conflicts: 0, error: None };
        }

        let result = merge(&local, &remote_doc, now_millis());
        match self.inner.write_behind.call_do_save(result.merged).await {
            Ok(_) => {
                if result.stats.conflicts > 0 {
                    self.inner.events.emit(StorageEvent::SyncConflict { conflicts: result.stats.conflicts });
                }
                self.inner.events.emit(StorageEvent::SyncCompleted {
                    added: result.stats.added,
                    removed: result.stats.removed,
                    conflicts: result.stats.conflicts,
                });
                SyncOutcome {
                    success: true,
                    added: result.stats.added,
                    removed: result.stats.removed,
                    conflicts: result.stats.conflicts,
                    error: None,
                }
            }
            Err(e) => self.sync_error(e),
        }
    }

    async fn load_remote_for_sync(&self) -> StateSyncResult<Option<TxfData>> {
        let name = self.identity_name().ok_or(StateSyncError::IdentityNotSet)?;
        let resolved = match self.inner.http.resolve(&name, self.inner.codec.as_ref()).await {
            Ok(r) => r,
            Err(StateSyncError::PointerNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        {
            let mut chain = self.inner.chain.lock().unwrap();
            chain.remote_cid = Some(resolved.cid.clone());
        }
        self.inner.last_known_remote_sequence.fetch_max(resolved.sequence, Ordering::SeqCst);

        let bytes = self.inner.http.fetch(&resolved.cid).await?;
        let doc = parse_document(&bytes)?;
        Ok(Some(doc))
    }

    fn sync_error(&self, err: StateSyncError) -> SyncOutcome {
        self.inner.events.emit(StorageEvent::SyncError { message: err.to_string() });
        SyncOutcome { success: false, added: 0, removed: 0, conflicts: 0, error: Some(err.to_string()) }
    }

    /// Load the current document. With `identifier`, fetches that CID
    /// directly with no pointer-cache side effects. Otherwise consults
    /// caches, then resolves, falling back to stale cached content on
    /// transport failure (spec §4.7.2).
    pub async fn load(&self, identifier: Option<&str>) -> LoadOutcome {
        if let Err(e) = self.require_connected() {
            return self.load_error(e);
        }
        self.inner.events.emit(StorageEvent::Loading);

        if let Some(cid) = identifier {
            return match self.inner.http.fetch(cid).await {
                Ok(bytes) => self.finish_load(bytes, LoadSource::RemoteDirect),
                Err(e) => self.load_error(e),
            };
        }

        let Some(name) = self.identity_name() else {
            return self.load_error(StateSyncError::IdentityNotSet);
        };

        if self.inner.cache.known_fresh.is_fresh() {
            if let Some(record) = self.inner.cache.ipns_records.get(&name) {
                if let Some(bytes) = self.inner.cache.content.get(&record.cid) {
                    return self.finish_load(bytes, LoadSource::Cache);
                }
            }
        }

        if let Some(record) = self.inner.cache.ipns_records.get(&name) {
            if let Some(bytes) = self.inner.cache.content.get(&record.cid) {
                return self.finish_load(bytes, LoadSource::Cache);
            }
            if let Ok(bytes) = self.inner.http.fetch(&record.cid).await {
                return self.finish_load(bytes, LoadSource::Cache);
            }
            // Stale pointer, unreachable content: fall through to a fresh resolve.
        }

        let resolved = match self.inner.http.resolve(&name, self.inner.codec.as_ref()).await {
            Ok(r) => r,
            Err(e) => return self.load_fallback_or_error(&name, e),
        };

        self.inner.last_known_remote_sequence.fetch_max(resolved.sequence, Ordering::SeqCst);
        {
            let mut chain = self.inner.chain.lock().unwrap();
            chain.remote_cid = Some(resolved.cid.clone());
        }

        match self.inner.http.fetch(&resolved.cid).await {
            Ok(bytes) => self.finish_load(bytes, LoadSource::Network),
            Err(e) => self.load_fallback_or_error(&name, e),
        }
    }

    fn finish_load(&self, bytes: Vec<u8>, source: LoadSource) -> LoadOutcome {
        match parse_document(&bytes) {
            Ok(doc) => {
                let version = doc.meta.version;
                {
                    let mut chain = self.inner.chain.lock().unwrap();
                    chain.data_version = chain.data_version.max(version);
                }
                self.inner.events.emit(StorageEvent::Loaded { source, version });
                LoadOutcome { success: true, data: Some(doc), source: Some(source), error: None }
            }
            Err(e) => self.load_error(e),
        }
    }

    fn load_fallback_or_error(&self, name: &str, err: StateSyncError) -> LoadOutcome {
        if let Some(record) = self.inner.cache.ipns_records.get_ignore_ttl(name) {
            if let Some(bytes) = self.inner.cache.content.get(&record.cid) {
                return self.finish_load(bytes, LoadSource::Cache);
            }
        }
        self.load_error(err)
    }

    fn load_error(&self, err: StateSyncError) -> LoadOutcome {
        self.inner.events.emit(StorageEvent::Error { message: err.to_string() });
        LoadOutcome { success: false, data: None, source: None, error: Some(err.to_string()) }
    }

    /// Publish a minimal (`_meta`-only) document, then clear caches and
    /// persisted chain state (spec §4.7.5).
    pub async fn clear(&self) -> StateSyncResult<()> {
        self.require_connected()?;
        let name = self.identity_name().ok_or(StateSyncError::IdentityNotSet)?;

        let write_behind = self.inner.write_behind.clone();
        let address = self.current_address();
        write_behind
            .run_exclusive(|| async move {
                let _ = self.inner.write_behind.take_staged().await;
                self.inner.write_behind.call_do_save(TxfData::new(address)).await
            })
            .await?;

        self.inner.cache.clear();
        self.inner.persistence.clear(&name).await
    }

    /// Cache hit, or a successful resolve (spec §4.7.6).
    pub async fn exists(&self) -> StateSyncResult<bool> {
        self.require_connected()?;
        let name = self.identity_name().ok_or(StateSyncError::IdentityNotSet)?;
        if self.inner.cache.ipns_records.get(&name).is_some() {
            return Ok(true);
        }
        match self.inner.http.resolve(&name, self.inner.codec.as_ref()).await {
            Ok(_) => Ok(true),
            Err(StateSyncError::PointerNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Register an event listener; returns a handle for `off_event`.
    pub fn on_event(&self, listener: impl Fn(&StorageEvent) + Send + Sync + 'static) -> u64 {
        self.inner.events.on(listener)
    }

    /// Remove a previously registered event listener.
    pub fn off_event(&self, id: u64) {
        self.inner.events.off(id)
    }

    /// The provider's current lifecycle state.
    pub fn state(&self) -> ProviderState {
        *self.inner.state.lock().unwrap()
    }
}

/// The blocking save operation (spec §4.6.4). Reconciles the provider's own
/// `dataVersion` counter against the incoming document's `_meta.version` —
/// an ordinary flush carries `dataVersion` forward by exactly one, but a
/// document arriving from `Provider::sync`'s merge already carries
/// `max(local, remote) + 1` (spec P6), which can be more than one past the
/// provider's last committed version. Taking the larger of the two keeps
/// both paths correct through one shared implementation.
async fn execute_do_save<T: GatewayTransport + 'static>(
    inner: Arc<Inner<T>>,
    mut doc: TxfData,
) -> StateSyncResult<TxfData> {
    let identity = inner.identity.read().unwrap().clone().ok_or(StateSyncError::IdentityNotSet)?;
    let name = identity.name().as_str().to_string();

    *inner.last_address.lock().unwrap() = doc.meta.address.clone();

    let (before_version, remote_cid) = {
        let chain = inner.chain.lock().unwrap();
        (chain.data_version, chain.remote_cid.clone())
    };
    let new_version = (before_version + 1).max(doc.meta.version);

    doc.meta.version = new_version;
    doc.meta.ipns_name = Some(name.clone());
    doc.meta.last_cid = remote_cid;
    doc.meta.updated_at = now_millis();
    inner.chain.lock().unwrap().data_version = new_version;

    inner.events.emit(StorageEvent::Saving);

    let rollback = |inner: &Arc<Inner<T>>, err: StateSyncError| {
        inner.chain.lock().unwrap().data_version = before_version;
        inner.events.emit(StorageEvent::Error { message: err.to_string() });
        err
    };

    let body = match serde_json::to_vec(&doc.to_json()) {
        Ok(bytes) => bytes,
        Err(e) => return Err(rollback(&inner, StateSyncError::InvalidInput(format!("failed to encode document: {e}")))),
    };

    let cid = match inner.http.upload(body.clone()).await {
        Ok(cid) => cid,
        Err(e) => return Err(rollback(&inner, e)),
    };

    let new_seq = {
        let chain = inner.chain.lock().unwrap();
        chain.sequence_number.max(inner.last_known_remote_sequence.load(Ordering::SeqCst)) + 1
    };

    let record_bytes = match inner.codec.sign(identity.key_pair(), &cid, new_seq, inner.config.ipns_lifetime) {
        Ok(bytes) => bytes,
        Err(e) => return Err(rollback(&inner, e)),
    };

    if let Err(e) = inner.http.publish(&name, record_bytes).await {
        return Err(rollback(&inner, e));
    }

    {
        let mut chain = inner.chain.lock().unwrap();
        chain.sequence_number = new_seq;
        chain.last_cid = Some(cid.clone());
        chain.remote_cid = Some(cid.clone());
    }
    inner.last_known_remote_sequence.fetch_max(new_seq, Ordering::SeqCst);

    inner.cache.ipns_records.put(&name, ResolvedRecord { cid: cid.clone(), sequence: new_seq });
    inner.cache.content.put(&cid, body);
    inner.cache.known_fresh.mark_fresh();

    let persisted = PersistedChainState::new(new_seq, Some(cid.clone()), new_version);
    if let Err(e) = inner.persistence.save(&name, &persisted).await {
        tracing::warn!(error = %e, "[statesync] persistence write failed, flush still reports success");
    }

    inner.events.emit(StorageEvent::Saved { cid: cid.clone(), sequence: new_seq });
    Ok(doc)
}

fn parse_document(bytes: &[u8]) -> StateSyncResult<TxfData> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| StateSyncError::InvalidInput(format!("malformed document JSON: {e}")))?;
    TxfData::from_json(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TokenEntry;
    use crate::http_client::GatewayResponse;
    use crate::persistence::InMemoryStatePersistence;
    use crate::record_codec::DefaultRecordCodec;
    use async_trait::async_trait;
    use base64::Engine;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryGatewayState {
        content: HashMap<String, Vec<u8>>,
        records: HashMap<String, Vec<u8>>,
        next_cid: u64,
    }

    /// A minimal functional (not scripted) `GatewayTransport`: it actually
    /// stores uploaded content and published records, so two providers
    /// sharing the same `Arc<Mutex<MemoryGatewayState>>` behave like two
    /// clients of the same naming-service deployment (needed for the
    /// cross-provider scenarios S3/S4).
    struct InMemoryTransport {
        state: Arc<Mutex<MemoryGatewayState>>,
    }

    #[async_trait]
    impl GatewayTransport for InMemoryTransport {
        async fn upload(&self, _gateway: &str, bytes: Vec<u8>, _timeout: Duration) -> StateSyncResult<GatewayResponse> {
            let mut state = self.state.lock().unwrap();
            state.next_cid += 1;
            let cid = format!("bafy-test-{}", state.next_cid);
            state.content.insert(cid.clone(), bytes);
            Ok(GatewayResponse { status: 200, body: serde_json::json!({"Hash": cid}).to_string().into_bytes() })
        }

        async fn fetch(&self, _gateway: &str, cid: &str, _timeout: Duration) -> StateSyncResult<GatewayResponse> {
            let state = self.state.lock().unwrap();
            match state.content.get(cid) {
                Some(bytes) => Ok(GatewayResponse { status: 200, body: bytes.clone() }),
                None => Ok(GatewayResponse { status: 404, body: Vec::new() }),
            }
        }

        async fn resolve(&self, _gateway: &str, name: &str, _timeout: Duration) -> StateSyncResult<GatewayResponse> {
            let state = self.state.lock().unwrap();
            match state.records.get(name) {
                Some(bytes) => {
                    let line = serde_json::json!({
                        "Extra": base64::engine::general_purpose::STANDARD.encode(bytes)
                    })
                    .to_string();
                    Ok(GatewayResponse { status: 200, body: line.into_bytes() })
                }
                None => Ok(GatewayResponse { status: 404, body: Vec::new() }),
            }
        }

        async fn publish(
            &self,
            _gateway: &str,
            name: &str,
            record_bytes: Vec<u8>,
            _timeout: Duration,
        ) -> StateSyncResult<GatewayResponse> {
            self.state.lock().unwrap().records.insert(name.to_string(), record_bytes);
            Ok(GatewayResponse { status: 200, body: Vec::new() })
        }

        async fn version(&self, _gateway: &str, _timeout: Duration) -> StateSyncResult<GatewayResponse> {
            Ok(GatewayResponse { status: 200, body: Vec::new() })
        }
    }

    fn test_config() -> StateSyncConfig {
        let mut cfg = StateSyncConfig::with_gateways(["mem://gw1"]);
        cfg.flush_debounce = Duration::from_millis(10);
        cfg
    }

    fn test_secret() -> WalletSecret {
        WalletSecret::new(vec![42u8; 32])
    }

    async fn provider_over(shared: Arc<Mutex<MemoryGatewayState>>) -> StateSyncProvider<InMemoryTransport> {
        let transport = Arc::new(InMemoryTransport { state: shared });
        let provider = StateSyncProvider::new(
            test_config(),
            transport,
            Arc::new(DefaultRecordCodec::new()),
            Box::new(InMemoryStatePersistence::new()),
        );
        provider.set_identity(test_secret()).unwrap();
        provider.initialize().await.unwrap();
        provider
    }

    fn doc_with_token(id: &str) -> TxfData {
        let mut doc = TxfData::new("0xabc");
        doc.tokens.insert(id.to_string(), TokenEntry::new(id, serde_json::json!({"id": id})));
        doc
    }

    #[tokio::test(start_paused = true)]
    async fn s1_bootstrap_save_has_version_one_and_no_last_cid() {
        let shared = Arc::new(Mutex::new(MemoryGatewayState::default()));
        let provider = provider_over(shared.clone()).await;

        provider.save(doc_with_token("t1")).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;

        let state = shared.lock().unwrap();
        assert_eq!(state.content.len(), 1);
        let (_, bytes) = state.content.iter().next().unwrap();
        let value: serde_json::Value = serde_json::from_slice(bytes).unwrap();
        assert_eq!(value["_meta"]["version"], 1);
        assert!(value["_meta"].get("lastCid").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn s2_second_save_chains_from_first() {
        let shared = Arc::new(Mutex::new(MemoryGatewayState::default()));
        let provider = provider_over(shared.clone()).await;

        provider.save(TxfData::new("0xabc")).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        let first_cid = shared.lock().unwrap().content.keys().next().unwrap().clone();

        provider.save(TxfData::new("0xabc")).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;

        let state = shared.lock().unwrap();
        assert_eq!(state.content.len(), 2);
        let (_, second_bytes) = state.content.iter().find(|(cid, _)| **cid != first_cid).unwrap();
        let value: serde_json::Value = serde_json::from_slice(second_bytes).unwrap();
        assert_eq!(value["_meta"]["version"], 2);
        assert_eq!(value["_meta"]["lastCid"], first_cid);
    }

    #[tokio::test(start_paused = true)]
    async fn s3_recovery_after_wipe() {
        let shared = Arc::new(Mutex::new(MemoryGatewayState::default()));
        let provider_a = provider_over(shared.clone()).await;

        let mut doc = TxfData::new("0xabc");
        doc.tokens.insert("a".into(), TokenEntry::new("a", serde_json::json!({"v": 1})));
        doc.tokens.insert("b".into(), TokenEntry::new("b", serde_json::json!({"v": 2})));
        doc.tokens.insert("c".into(), TokenEntry::new("c", serde_json::json!({"v": 3})));
        provider_a.save(doc).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        provider_a.shutdown().await.unwrap();

        let provider_b = provider_over(shared.clone()).await;
        let outcome = provider_b.load(None).await;
        assert!(outcome.success);
        let data = outcome.data.unwrap();
        assert!(data.tokens.contains_key("a"));
        assert!(data.tokens.contains_key("b"));
        assert!(data.tokens.contains_key("c"));
    }

    #[tokio::test(start_paused = true)]
    async fn s4_stale_local_merge_preserves_remote_only_and_bumps_version() {
        let shared = Arc::new(Mutex::new(MemoryGatewayState::default()));
        let provider_a = provider_over(shared.clone()).await;

        for _ in 0..5 {
            let mut doc = TxfData::new("0xabc");
            doc.tokens.insert("a".into(), TokenEntry::new("a", serde_json::json!({"v": 1})));
            doc.tokens.insert("b".into(), TokenEntry::new("b", serde_json::json!({"v": 2})));
            doc.tokens.insert("c".into(), TokenEntry::new("c", serde_json::json!({"v": 3})));
            provider_a.save(doc).await.unwrap();
            tokio::time::advance(Duration::from_secs(1)).await;
            tokio::task::yield_now().await;
        }

        let provider_b = provider_over(shared.clone()).await;
        let mut local = TxfData::new("0xabc");
        local.meta.version = 1;
        local.tokens.insert("a".into(), TokenEntry::new("a", serde_json::json!({"v": 1})));
        local.tokens.insert("b".into(), TokenEntry::new("b", serde_json::json!({"v": 2})));

        let outcome = provider_b.sync(local).await;
        assert!(outcome.success, "{:?}", outcome.error);
        assert!(outcome.added >= 1);

        let loaded = provider_b.load(None).await;
        let data = loaded.data.unwrap();
        assert!(data.tokens.contains_key("c"));
        assert!(data.meta.version > 5);
    }

    #[tokio::test(start_paused = true)]
    async fn s6_write_coalescing_publishes_only_final_write() {
        let shared = Arc::new(Mutex::new(MemoryGatewayState::default()));
        let provider = provider_over(shared.clone()).await;

        provider.save(doc_with_token("x")).await.unwrap();
        tokio::time::advance(Duration::from_millis(5)).await;
        provider.save(doc_with_token("y")).await.unwrap();

        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;

        let state = shared.lock().unwrap();
        assert_eq!(state.content.len(), 1, "only one upload should have happened");
        let (_, bytes) = state.content.iter().next().unwrap();
        let value: serde_json::Value = serde_json::from_slice(bytes).unwrap();
        assert!(value.get("y").is_some());
        assert!(value.get("x").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn s7_shutdown_drains_staged_write() {
        let shared = Arc::new(Mutex::new(MemoryGatewayState::default()));
        let provider = provider_over(shared.clone()).await;

        provider.save(doc_with_token("x")).await.unwrap();
        provider.shutdown().await.unwrap();

        assert_eq!(shared.lock().unwrap().content.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exists_and_clear_round_trip() {
        let shared = Arc::new(Mutex::new(MemoryGatewayState::default()));
        let provider = provider_over(shared.clone()).await;

        assert!(!provider.exists().await.unwrap());

        provider.save(TxfData::new("0xabc")).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        assert!(provider.exists().await.unwrap());

        provider.clear().await.unwrap();
        assert_eq!(shared.lock().unwrap().content.len(), 2, "clear publishes one more minimal document");
    }

    #[tokio::test(start_paused = true)]
    async fn save_before_initialize_is_rejected() {
        let shared = Arc::new(Mutex::new(MemoryGatewayState::default()));
        let transport = Arc::new(InMemoryTransport { state: shared });
        let provider = StateSyncProvider::new(
            test_config(),
            transport,
            Arc::new(DefaultRecordCodec::new()),
            Box::new(InMemoryStatePersistence::new()),
        );
        assert!(provider.save(TxfData::new("0xabc")).await.is_err());
    }
}
