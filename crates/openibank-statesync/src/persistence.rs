//! `StatePersistence`: the narrow external interface the engine consumes
//! for durable chain-state storage (spec §6.4). Platform-local key-value
//! storage itself is out of scope (spec §1) — only this interface and two
//! implementations adequate for tests and for embedding without a
//! platform store are provided here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{StateSyncError, StateSyncResult};

/// Chain state restored on `Provider::initialize` and written after every
/// successful publish. `sequence_number` travels as a decimal string (spec
/// §6.4: IPNS sequence numbers exceed JSON's 53-bit safe integer range on
/// some platforms, so the wire/storage boundary always carries it as
/// text; `sequence()` parses it back for in-process use).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedChainState {
    #[serde(rename = "sequenceNumber")]
    sequence_number: String,
    #[serde(rename = "lastCid", skip_serializing_if = "Option::is_none")]
    pub last_cid: Option<String>,
    pub version: u64,
}

impl PersistedChainState {
    pub fn new(sequence_number: u64, last_cid: Option<String>, version: u64) -> Self {
        Self { sequence_number: sequence_number.to_string(), last_cid, version }
    }

    /// The sequence number, parsed back from its decimal-string form.
    pub fn sequence(&self) -> u64 {
        self.sequence_number.parse().unwrap_or(0)
    }
}

/// External durable store for [`PersistedChainState`], keyed by IPNS name.
/// Implementations MUST be at-least-once durable across process restarts
/// for whichever backing medium they wrap (spec §6.4); the engine itself
/// treats a persistence write failure as non-fatal (logged, flush still
/// reports success — spec §7).
#[async_trait]
pub trait StatePersistence: Send + Sync {
    async fn load(&self, name: &str) -> StateSyncResult<Option<PersistedChainState>>;
    async fn save(&self, name: &str, state: &PersistedChainState) -> StateSyncResult<()>;
    async fn clear(&self, name: &str) -> StateSyncResult<()>;
}

/// In-process, non-durable [`StatePersistence`]. Used by tests and by
/// embedders that have no platform KV store to wrap (the engine still
/// functions; it simply starts from bootstrap on every process restart).
#[derive(Default)]
pub struct InMemoryStatePersistence {
    entries: Mutex<HashMap<String, PersistedChainState>>,
}

impl InMemoryStatePersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatePersistence for InMemoryStatePersistence {
    async fn load(&self, name: &str) -> StateSyncResult<Option<PersistedChainState>> {
        Ok(self.entries.lock().unwrap().get(name).cloned())
    }

    async fn save(&self, name: &str, state: &PersistedChainState) -> StateSyncResult<()> {
        self.entries.lock().unwrap().insert(name.to_string(), state.clone());
        Ok(())
    }

    async fn clear(&self, name: &str) -> StateSyncResult<()> {
        self.entries.lock().unwrap().remove(name);
        Ok(())
    }
}

/// JSON-file-backed [`StatePersistence`]: one file per IPNS name under
/// `base_dir`, named `<name>.json`. The natural "narrow platform KV
/// store" stand-in for embedding this crate outside of a host that
/// already provides one.
pub struct JsonFileStatePersistence {
    base_dir: PathBuf,
}

impl JsonFileStatePersistence {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl StatePersistence for JsonFileStatePersistence {
    async fn load(&self, name: &str) -> StateSyncResult<Option<PersistedChainState>> {
        let path = self.path_for(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let state = serde_json::from_slice(&bytes)
                    .map_err(|e| StateSyncError::Persistence(format!("malformed state file {path:?}: {e}")))?;
                Ok(Some(state))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StateSyncError::Persistence(format!("reading {path:?}: {e}"))),
        }
    }

    async fn save(&self, name: &str, state: &PersistedChainState) -> StateSyncResult<()> {
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| StateSyncError::Persistence(format!("creating {:?}: {e}", self.base_dir)))?;
        let bytes = serde_json::to_vec(state)
            .map_err(|e| StateSyncError::Persistence(format!("encoding state for {name}: {e}")))?;
        let path = self.path_for(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StateSyncError::Persistence(format!("writing {path:?}: {e}")))
    }

    async fn clear(&self, name: &str) -> StateSyncResult<()> {
        match tokio::fs::remove_file(self.path_for(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateSyncError::Persistence(format!("removing state file: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_round_trips() {
        let store = InMemoryStatePersistence::new();
        assert_eq!(store.load("name1").await.unwrap(), None);

        let state = PersistedChainState::new(5, Some("bafy1".into()), 3);
        store.save("name1", &state).await.unwrap();
        assert_eq!(store.load("name1").await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn in_memory_clear_removes_entry() {
        let store = InMemoryStatePersistence::new();
        let state = PersistedChainState::new(1, None, 1);
        store.save("name1", &state).await.unwrap();
        store.clear("name1").await.unwrap();
        assert_eq!(store.load("name1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn sequence_number_round_trips_through_decimal_string() {
        let state = PersistedChainState::new(9_007_199_254_740_993, None, 1);
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"9007199254740993\""));
        let parsed: PersistedChainState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.sequence(), 9_007_199_254_740_993);
    }

    #[tokio::test]
    async fn json_file_persistence_round_trips() {
        let dir = std::env::temp_dir().join(format!("statesync-test-{}", std::process::id()));
        let store = JsonFileStatePersistence::new(&dir);
        let state = PersistedChainState::new(2, Some("bafy2".into()), 1);

        store.save("peer1", &state).await.unwrap();
        assert_eq!(store.load("peer1").await.unwrap(), Some(state));

        store.clear("peer1").await.unwrap();
        assert_eq!(store.load("peer1").await.unwrap(), None);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
