//! The synchronized document shape (`TxfData`).
//!
//! A `TxfData` is a JSON object with a handful of reserved keys
//! (`_meta`, `_tombstones`, `_outbox`, `_sent`, `_invalid`, `_nametags`) and
//! an open set of token entries. [`TxfData::from_json`]/[`TxfData::to_json`]
//! round-trip a document through the typed shape used by [`crate::merge`]
//! and [`crate::write_behind`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StateSyncError, StateSyncResult};

const KEY_META: &str = "_meta";
const KEY_TOMBSTONES: &str = "_tombstones";
const KEY_OUTBOX: &str = "_outbox";
const KEY_SENT: &str = "_sent";
const KEY_INVALID: &str = "_invalid";
const KEY_NAMETAGS: &str = "_nametags";
const ARCHIVED_PREFIX: &str = "archived-";

/// Document metadata. `version` is the CRDT logical clock advanced by
/// [`crate::merge::merge`]; everything else is provenance for debugging and
/// for `Provider::load`'s staleness checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub version: u64,
    pub address: String,
    #[serde(rename = "formatVersion")]
    pub format_version: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(rename = "ipnsName", skip_serializing_if = "Option::is_none")]
    pub ipns_name: Option<String>,
    #[serde(rename = "lastCid", skip_serializing_if = "Option::is_none")]
    pub last_cid: Option<String>,
}

impl Meta {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            version: 0,
            address: address.into(),
            format_version: "1".to_string(),
            updated_at: 0,
            ipns_name: None,
            last_cid: None,
        }
    }
}

/// A tombstone marking one token state as deleted. Set-semantics under
/// merge: unioned by `(token_id, state_hash)`, larger `timestamp` wins on
/// collision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tombstone {
    #[serde(rename = "tokenId")]
    pub token_id: String,
    #[serde(rename = "stateHash")]
    pub state_hash: String,
    pub timestamp: i64,
}

impl Tombstone {
    fn key(&self) -> (String, String) {
        (self.token_id.clone(), self.state_hash.clone())
    }
}

/// One token entry as stored in a [`TxfData`]. `original_key` preserves the
/// exact key the entry arrived under (e.g. a historical leading-underscore
/// id) so an unmodified document round-trips byte-for-byte through
/// [`TxfData::from_json`]/[`TxfData::to_json`]; newly merged or inserted
/// entries always use the canonical unprefixed form (see
/// `SPEC_FULL.md` §9).
#[derive(Debug, Clone, PartialEq)]
pub struct TokenEntry {
    pub original_key: String,
    pub value: Value,
}

impl TokenEntry {
    pub fn new(canonical_id: impl Into<String>, value: Value) -> Self {
        let id = canonical_id.into();
        Self { original_key: id, value }
    }
}

/// An array entry with unique-key, first-write-wins merge semantics
/// (`_outbox`/`_sent`/`_invalid`/`_nametags`). Entries are kept as opaque
/// JSON; [`crate::merge`] knows which field each array's unique key lives
/// in (`id` for outbox/sent/invalid, `name` for nametags) via
/// [`entry_key`].
pub type KeyedEntry = Value;

/// Extract the unique-key field used to dedup entries of `array_key`
/// (one of the `_outbox`/`_sent`/`_invalid`/`_nametags` reserved keys).
pub fn entry_key(array_key: &str, entry: &Value) -> Option<String> {
    let field = if array_key == KEY_NAMETAGS { "name" } else { "id" };
    entry.get(field)?.as_str().map(str::to_string)
}

/// The full synchronized document.
#[derive(Debug, Clone, PartialEq)]
pub struct TxfData {
    pub meta: Meta,
    pub tombstones: Vec<Tombstone>,
    pub outbox: Vec<KeyedEntry>,
    pub sent: Vec<KeyedEntry>,
    pub invalid: Vec<KeyedEntry>,
    pub nametags: Vec<KeyedEntry>,
    /// Active tokens, keyed by canonical (unprefixed) token id.
    pub tokens: BTreeMap<String, TokenEntry>,
    /// Archived tokens, keyed by token id (without the `archived-` prefix;
    /// the prefix itself is not a historical-variant concern and is always
    /// applied on write).
    pub archived: BTreeMap<String, Value>,
}

impl TxfData {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            meta: Meta::new(address),
            tombstones: Vec::new(),
            outbox: Vec::new(),
            sent: Vec::new(),
            invalid: Vec::new(),
            nametags: Vec::new(),
            tokens: BTreeMap::new(),
            archived: BTreeMap::new(),
        }
    }

    /// Whether a tombstone already covers `(token_id, state_hash)`.
    pub fn is_tombstoned(&self, token_id: &str, state_hash: &str) -> bool {
        self.tombstones
            .iter()
            .any(|t| t.token_id == token_id && t.state_hash == state_hash)
    }

    /// Parse a raw JSON document into the typed shape.
    pub fn from_json(value: Value) -> StateSyncResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(StateSyncError::InvalidInput(
                "document root must be a JSON object".into(),
            ));
        };

        let meta_value = map
            .remove(KEY_META)
            .ok_or_else(|| StateSyncError::InvalidInput("document missing _meta".into()))?;
        let meta: Meta = serde_json::from_value(meta_value)
            .map_err(|e| StateSyncError::InvalidInput(format!("invalid _meta: {e}")))?;

        let tombstones = take_array::<Tombstone>(&mut map, KEY_TOMBSTONES)?;
        let outbox = take_array::<KeyedEntry>(&mut map, KEY_OUTBOX)?;
        let sent = take_array::<KeyedEntry>(&mut map, KEY_SENT)?;
        let invalid = take_array::<KeyedEntry>(&mut map, KEY_INVALID)?;
        let nametags = take_array::<KeyedEntry>(&mut map, KEY_NAMETAGS)?;

        let mut tokens = BTreeMap::new();
        let mut archived = BTreeMap::new();

        for (key, value) in map {
            if let Some(id) = key.strip_prefix(ARCHIVED_PREFIX) {
                archived.insert(id.to_string(), value);
                continue;
            }
            // Historical leading-underscore variant: same token, different key.
            let canonical = key.strip_prefix('_').unwrap_or(&key).to_string();
            tokens.insert(
                canonical,
                TokenEntry { original_key: key, value },
            );
        }

        Ok(Self {
            meta,
            tombstones,
            outbox,
            sent,
            invalid,
            nametags,
            tokens,
            archived,
        })
    }

    /// Serialize back to the raw document shape. Empty reserved array
    /// fields are omitted entirely, matching the original encoder.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(KEY_META.to_string(), serde_json::to_value(&self.meta).unwrap());

        insert_array_if_nonempty(&mut map, KEY_TOMBSTONES, &self.tombstones);
        insert_array_if_nonempty(&mut map, KEY_OUTBOX, &self.outbox);
        insert_array_if_nonempty(&mut map, KEY_SENT, &self.sent);
        insert_array_if_nonempty(&mut map, KEY_INVALID, &self.invalid);
        insert_array_if_nonempty(&mut map, KEY_NAMETAGS, &self.nametags);

        for entry in self.tokens.values() {
            map.insert(entry.original_key.clone(), entry.value.clone());
        }
        for (id, value) in &self.archived {
            map.insert(format!("{ARCHIVED_PREFIX}{id}"), value.clone());
        }

        Value::Object(map)
    }
}

fn take_array<T: for<'de> Deserialize<'de>>(
    map: &mut serde_json::Map<String, Value>,
    key: &str,
) -> StateSyncResult<Vec<T>> {
    match map.remove(key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| StateSyncError::InvalidInput(format!("invalid {key}: {e}"))),
        Some(_) => Err(StateSyncError::InvalidInput(format!("{key} must be an array"))),
    }
}

fn insert_array_if_nonempty<T: Serialize>(
    map: &mut serde_json::Map<String, Value>,
    key: &str,
    items: &[T],
) {
    if !items.is_empty() {
        map.insert(key.to_string(), serde_json::to_value(items).unwrap());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_minimal_document() {
        let doc = TxfData::new("0xabc");
        let json = doc.to_json();
        let parsed = TxfData::from_json(json).unwrap();
        assert_eq!(parsed.meta.address, "0xabc");
        assert!(parsed.tokens.is_empty());
    }

    #[test]
    fn classifies_archived_and_active_tokens() {
        let raw = json!({
            "_meta": {"version": 1, "address": "0xabc", "formatVersion": "1", "updatedAt": 0},
            "token-1": {"balance": "10"},
            "archived-token-2": {"balance": "0"},
        });
        let doc = TxfData::from_json(raw).unwrap();
        assert!(doc.tokens.contains_key("token-1"));
        assert!(doc.archived.contains_key("token-2"));
    }

    #[test]
    fn strips_leading_underscore_historical_variant() {
        let raw = json!({
            "_meta": {"version": 1, "address": "0xabc", "formatVersion": "1", "updatedAt": 0},
            "_token-1": {"balance": "10"},
        });
        let doc = TxfData::from_json(raw).unwrap();
        assert!(doc.tokens.contains_key("token-1"));
        assert_eq!(doc.tokens["token-1"].original_key, "_token-1");
    }

    #[test]
    fn unmodified_document_round_trips_original_key_form() {
        let raw = json!({
            "_meta": {"version": 1, "address": "0xabc", "formatVersion": "1", "updatedAt": 0},
            "_token-1": {"balance": "10"},
        });
        let doc = TxfData::from_json(raw.clone()).unwrap();
        assert_eq!(doc.to_json(), raw);
    }

    #[test]
    fn empty_reserved_arrays_are_omitted() {
        let doc = TxfData::new("0xabc");
        let json = doc.to_json();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key(KEY_TOMBSTONES));
        assert!(!obj.contains_key(KEY_OUTBOX));
    }

    #[test]
    fn tombstone_lookup_by_composite_key() {
        let mut doc = TxfData::new("0xabc");
        doc.tombstones.push(Tombstone {
            token_id: "t1".into(),
            state_hash: "h1".into(),
            timestamp: 100,
        });
        assert!(doc.is_tombstoned("t1", "h1"));
        assert!(!doc.is_tombstoned("t1", "h2"));
    }

    #[test]
    fn tombstone_key_matches_expected_composite() {
        let t = Tombstone { token_id: "t1".into(), state_hash: "h1".into(), timestamp: 1 };
        assert_eq!(t.key(), ("t1".to_string(), "h1".to_string()));
    }
}
