//! Deterministic CRDT merge of two [`TxfData`] documents.
//!
//! A pure function, independent of any I/O or clock — the only ambient
//! input besides the two documents is `now_millis`, which the caller
//! supplies so the merge stays testable. Used by `Provider::sync` when the
//! remote pointer has advanced past the locally buffered state, and by
//! `WriteBehind::sync` when a flush discovers the remote has moved since
//! the last `_doSave`.

use std::collections::BTreeMap;

use crate::document::{entry_key, KeyedEntry, Meta, TokenEntry, Tombstone, TxfData};

/// Outcome counters from one merge, surfaced on `sync:completed`/
/// `sync:conflict` events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Entries present only on the remote side and adopted into the merge.
    pub added: u64,
    /// Entries dropped because a tombstone covers them.
    pub removed: u64,
    /// Entries present on both sides with differing values (local wins).
    pub conflicts: u64,
}

/// Result of merging two documents.
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub merged: TxfData,
    pub stats: MergeStats,
}

/// Merge `local` and `remote` into a single document.
///
/// - `_meta.version` becomes `max(local, remote) + 1`.
/// - Tombstones are unioned by `(tokenId, stateHash)`; the entry with the
///   larger `timestamp` wins on collision.
/// - An active token present in both sides is a conflict: the local value
///   wins, but the conflict is counted. Present in only one side, that
///   side's value is taken as-is. Tombstoned in the merged set, the token
///   is dropped from both.
/// - `_outbox`/`_sent`/`_invalid`/`_nametags` are unioned by their unique
///   key field, first-write-wins (local entries take priority over a
///   remote entry with the same key).
/// - Archived tokens pass through unmodified; on a same-id collision the
///   local entry wins, matching the bias used for active-token conflicts.
pub fn merge(local: &TxfData, remote: &TxfData, now_millis: i64) -> MergeResult {
    let mut stats = MergeStats::default();

    let meta = merge_meta(&local.meta, &remote.meta, now_millis);
    let tombstones = merge_tombstones(&local.tombstones, &remote.tombstones);

    let tokens = merge_tokens(&local.tokens, &remote.tokens, &tombstones, &mut stats);
    let archived = merge_archived(&local.archived, &remote.archived);

    let outbox = merge_keyed_array("_outbox", &local.outbox, &remote.outbox);
    let sent = merge_keyed_array("_sent", &local.sent, &remote.sent);
    let invalid = merge_keyed_array("_invalid", &local.invalid, &remote.invalid);
    let nametags = merge_keyed_array("_nametags", &local.nametags, &remote.nametags);

    let merged = TxfData {
        meta,
        tombstones,
        outbox,
        sent,
        invalid,
        nametags,
        tokens,
        archived,
    };

    MergeResult { merged, stats }
}

fn merge_meta(local: &Meta, remote: &Meta, now_millis: i64) -> Meta {
    // Base is whichever side carries the higher version (spec §4.5 step 1);
    // only `version`/`updatedAt` are overridden on top of it.
    let base = if local.version >= remote.version { local } else { remote };
    Meta {
        version: local.version.max(remote.version) + 1,
        updated_at: now_millis,
        ..base.clone()
    }
}

fn merge_tombstones(local: &[Tombstone], remote: &[Tombstone]) -> Vec<Tombstone> {
    let mut by_key: BTreeMap<(String, String), Tombstone> = BTreeMap::new();
    for t in local.iter().chain(remote.iter()) {
        let key = (t.token_id.clone(), t.state_hash.clone());
        match by_key.get(&key) {
            Some(existing) if existing.timestamp >= t.timestamp => {}
            _ => {
                by_key.insert(key, t.clone());
            }
        }
    }
    by_key.into_values().collect()
}

fn merge_tokens(
    local: &BTreeMap<String, TokenEntry>,
    remote: &BTreeMap<String, TokenEntry>,
    tombstones: &[Tombstone],
    stats: &mut MergeStats,
) -> BTreeMap<String, TokenEntry> {
    let mut merged = BTreeMap::new();
    let ids: std::collections::BTreeSet<&String> = local.keys().chain(remote.keys()).collect();

    for id in ids {
        let on_local = local.get(id);
        let on_remote = remote.get(id);

        // A tombstone covers `(tokenId, stateHash)`. Without a first-class
        // state hash on the token entry itself, a token is dropped when any
        // tombstone names its id — the conservative reading of "drop if
        // tombstoned" that never resurrects a deleted token.
        if tombstones.iter().any(|t| &t.token_id == id) {
            if on_local.is_some() {
                stats.removed += 1;
            }
            continue;
        }

        match (on_local, on_remote) {
            (Some(l), Some(_)) => {
                stats.conflicts += 1;
                merged.insert(id.clone(), l.clone());
            }
            (Some(l), None) => {
                merged.insert(id.clone(), l.clone());
            }
            (None, Some(r)) => {
                stats.added += 1;
                merged.insert(id.clone(), r.clone());
            }
            (None, None) => unreachable!("id came from one of the two maps"),
        }
    }

    merged
}

fn merge_archived(
    local: &BTreeMap<String, serde_json::Value>,
    remote: &BTreeMap<String, serde_json::Value>,
) -> BTreeMap<String, serde_json::Value> {
    let mut merged = remote.clone();
    merged.extend(local.clone());
    merged
}

fn merge_keyed_array(array_key: &str, local: &[KeyedEntry], remote: &[KeyedEntry]) -> Vec<KeyedEntry> {
    let mut seen_keys = std::collections::HashSet::new();
    let mut merged = Vec::new();

    for entry in local.iter().chain(remote.iter()) {
        match entry_key(array_key, entry) {
            Some(key) => {
                if seen_keys.insert(key) {
                    merged.push(entry.clone());
                }
            }
            None => merged.push(entry.clone()),
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc_with_version(v: u64) -> TxfData {
        let mut doc = TxfData::new("0xabc");
        doc.meta.version = v;
        doc
    }

    #[test]
    fn merged_version_is_max_plus_one() {
        let local = doc_with_version(3);
        let remote = doc_with_version(7);
        let result = merge(&local, &remote, 1000);
        assert_eq!(result.merged.meta.version, 8);
    }

    #[test]
    fn remote_only_token_is_added() {
        let local = doc_with_version(1);
        let mut remote = doc_with_version(1);
        remote.tokens.insert("t1".into(), TokenEntry::new("t1", json!({"balance": "5"})));

        let result = merge(&local, &remote, 1000);
        assert!(result.merged.tokens.contains_key("t1"));
        assert_eq!(result.stats.added, 1);
        assert_eq!(result.stats.conflicts, 0);
    }

    #[test]
    fn conflicting_token_prefers_local_and_counts_conflict() {
        let mut local = doc_with_version(1);
        local.tokens.insert("t1".into(), TokenEntry::new("t1", json!({"balance": "local"})));
        let mut remote = doc_with_version(1);
        remote.tokens.insert("t1".into(), TokenEntry::new("t1", json!({"balance": "remote"})));

        let result = merge(&local, &remote, 1000);
        assert_eq!(result.merged.tokens["t1"].value, json!({"balance": "local"}));
        assert_eq!(result.stats.conflicts, 1);
        assert_eq!(result.stats.added, 0);
    }

    #[test]
    fn token_present_on_both_sides_is_a_conflict_even_with_equal_values() {
        let mut local = doc_with_version(1);
        local.tokens.insert("t1".into(), TokenEntry::new("t1", json!({"balance": "5"})));
        let mut remote = doc_with_version(1);
        remote.tokens.insert("t1".into(), TokenEntry::new("t1", json!({"balance": "5"})));

        let result = merge(&local, &remote, 1000);
        assert_eq!(result.stats.conflicts, 1);
        assert_eq!(result.merged.tokens["t1"].value, json!({"balance": "5"}));
    }

    #[test]
    fn tombstoned_token_is_dropped_from_merge() {
        let mut local = doc_with_version(1);
        local.tokens.insert("t1".into(), TokenEntry::new("t1", json!({"balance": "5"})));
        local.tombstones.push(Tombstone { token_id: "t1".into(), state_hash: "h1".into(), timestamp: 1 });

        let remote = doc_with_version(1);
        let result = merge(&local, &remote, 1000);
        assert!(!result.merged.tokens.contains_key("t1"));
        assert_eq!(result.stats.removed, 1);
    }

    #[test]
    fn tombstones_union_and_larger_timestamp_wins() {
        let mut local = doc_with_version(1);
        local.tombstones.push(Tombstone { token_id: "t1".into(), state_hash: "h1".into(), timestamp: 5 });
        let mut remote = doc_with_version(1);
        remote.tombstones.push(Tombstone { token_id: "t1".into(), state_hash: "h1".into(), timestamp: 9 });
        remote.tombstones.push(Tombstone { token_id: "t2".into(), state_hash: "h2".into(), timestamp: 1 });

        let result = merge(&local, &remote, 1000);
        assert_eq!(result.merged.tombstones.len(), 2);
        let t1 = result.merged.tombstones.iter().find(|t| t.token_id == "t1").unwrap();
        assert_eq!(t1.timestamp, 9);
    }

    #[test]
    fn outbox_union_deduplicates_by_id_local_first() {
        let mut local = doc_with_version(1);
        local.outbox.push(json!({"id": "a", "payload": "local"}));
        let mut remote = doc_with_version(1);
        remote.outbox.push(json!({"id": "a", "payload": "remote"}));
        remote.outbox.push(json!({"id": "b", "payload": "remote-only"}));

        let result = merge(&local, &remote, 1000);
        assert_eq!(result.merged.outbox.len(), 2);
        let a = result.merged.outbox.iter().find(|e| e["id"] == "a").unwrap();
        assert_eq!(a["payload"], "local");
    }

    #[test]
    fn nametags_union_by_name() {
        let mut local = doc_with_version(1);
        local.nametags.push(json!({"name": "alice", "address": "0x1"}));
        let mut remote = doc_with_version(1);
        remote.nametags.push(json!({"name": "bob", "address": "0x2"}));

        let result = merge(&local, &remote, 1000);
        assert_eq!(result.merged.nametags.len(), 2);
    }

    #[test]
    fn archived_entries_union_local_wins_on_collision() {
        let mut local = doc_with_version(1);
        local.archived.insert("t1".into(), json!({"balance": "local"}));
        let mut remote = doc_with_version(1);
        remote.archived.insert("t1".into(), json!({"balance": "remote"}));
        remote.archived.insert("t2".into(), json!({"balance": "remote-only"}));

        let result = merge(&local, &remote, 1000);
        assert_eq!(result.merged.archived.len(), 2);
        assert_eq!(result.merged.archived["t1"], json!({"balance": "local"}));
    }
}
