//! OpeniBank StateSync - Content-addressed, signed, eventually-consistent wallet-state sync
//!
//! This crate implements the wallet-state synchronization engine described by
//! the project's state-sync specification:
//! - Dual-primitive transport: immutable content-addressed blobs plus a signed
//!   mutable pointer, raced across multiple gateways with a per-gateway
//!   circuit breaker
//! - Deterministic CRDT merge of two wallet documents with tombstone-aware
//!   conflict resolution
//! - A debounced write-behind buffer with rollback-and-retry on failed flush
//! - Deterministic Ed25519 identity derivation and IPNS record signing
//! - An optional push-subscription client with polling fallback
//!
//! # Architectural Invariants
//!
//! 1. Every save is content-addressed and signed before it is published
//! 2. A flush that fails leaves `dataVersion` exactly where it found it
//! 3. Merge never resurrects a tombstoned token
//! 4. The engine is fully usable with persistence and push subscription absent

pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod http_client;
pub mod identity;
pub mod merge;
pub mod persistence;
pub mod provider;
pub mod record_codec;
pub mod subscription;
pub mod write_behind;

pub use cache::{Cache, ContentCache, GatewayFailureCache, IpnsRecordCache, KnownFreshFlag, ResolvedRecord};
pub use config::StateSyncConfig;
pub use document::{entry_key, KeyedEntry, Meta, TokenEntry, Tombstone, TxfData};
pub use error::{ErrorKind, StateSyncError, StateSyncResult};
pub use events::{EventEmitter, StorageEvent};
pub use http_client::{GatewayTransport, HttpClient, ReqwestTransport};
pub use identity::{IpnsIdentity, PeerId, WalletSecret};
pub use merge::{merge, MergeResult, MergeStats};
pub use persistence::{InMemoryStatePersistence, JsonFileStatePersistence, PersistedChainState, StatePersistence};
pub use provider::{LoadOutcome, LoadSource, ProviderState, SaveOutcome, StateSyncProvider, SyncOutcome};
pub use record_codec::{DefaultRecordCodec, ParsedRecord, RecordCodec};
pub use subscription::{derive_ws_url, SubscriptionClient};
