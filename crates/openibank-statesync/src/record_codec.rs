//! Signed IPNS record encoding.
//!
//! The wire format used by real naming-service nodes is a binary protobuf
//! envelope; reproducing it is out of scope (SPEC_FULL.md §1, Non-goals).
//! [`DefaultRecordCodec`] is a self-consistent JSON substitute: it signs
//! and parses its own record shape, which is all [`crate::http_client`]
//! needs to publish and resolve pointers end to end.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{Signer, SigningKey};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{StateSyncError, StateSyncResult};

/// A parsed signed record extracted from one line of a resolve response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub cid: String,
    pub sequence: u64,
    pub record_bytes: Vec<u8>,
}

/// Signs and parses IPNS-style records. A trait seam so tests (and future
/// wire-compatible implementations) can substitute a different codec
/// without touching [`crate::http_client`].
pub trait RecordCodec: Send + Sync {
    /// Produce signed record bytes pointing at `cid`, at `sequence`, valid
    /// for `lifetime` from now.
    fn sign(
        &self,
        key_pair: &SigningKey,
        cid: &str,
        sequence: u64,
        lifetime: Duration,
    ) -> StateSyncResult<Vec<u8>>;

    /// Parse one NDJSON line from a resolve response. Returns `None` for
    /// lines that aren't a record (e.g. routing progress events), and an
    /// error only for lines that look like a record but are malformed.
    fn parse(&self, ndjson_line: &str) -> StateSyncResult<Option<ParsedRecord>>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SignedRecord {
    value: String,
    sequence: u64,
    validity: i64,
    signature: String,
}

/// Default [`RecordCodec`]: the signed payload is JSON, base64-embedded in
/// an `Extra` field the way a routing/get NDJSON line carries its record.
pub struct DefaultRecordCodec;

impl DefaultRecordCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DefaultRecordCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordCodec for DefaultRecordCodec {
    fn sign(
        &self,
        key_pair: &SigningKey,
        cid: &str,
        sequence: u64,
        lifetime: Duration,
    ) -> StateSyncResult<Vec<u8>> {
        let value = format!("/ipfs/{cid}");
        let validity = expiry_millis(lifetime)?;

        let mut to_sign = Vec::new();
        to_sign.extend_from_slice(value.as_bytes());
        to_sign.extend_from_slice(&sequence.to_be_bytes());
        to_sign.extend_from_slice(&validity.to_be_bytes());
        let signature = key_pair.sign(&to_sign);

        let record = SignedRecord {
            value,
            sequence,
            validity,
            signature: BASE64.encode(signature.to_bytes()),
        };
        serde_json::to_vec(&record)
            .map_err(|e| StateSyncError::Codec(format!("failed to encode signed record: {e}")))
    }

    fn parse(&self, ndjson_line: &str) -> StateSyncResult<Option<ParsedRecord>> {
        let line = ndjson_line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let envelope: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| StateSyncError::Codec(format!("malformed routing/get line: {e}")))?;

        let Some(extra) = envelope.get("Extra").and_then(|v| v.as_str()) else {
            return Ok(None);
        };
        if extra.is_empty() {
            return Ok(None);
        }

        let record_bytes = BASE64
            .decode(extra)
            .map_err(|e| StateSyncError::Codec(format!("invalid base64 Extra field: {e}")))?;
        let record: SignedRecord = serde_json::from_slice(&record_bytes)
            .map_err(|e| StateSyncError::Codec(format!("malformed signed record: {e}")))?;

        let cid = extract_cid(&record.value).ok_or_else(|| {
            StateSyncError::Codec(format!("record value has no /ipfs/ path: {}", record.value))
        })?;

        Ok(Some(ParsedRecord { cid, sequence: record.sequence, record_bytes }))
    }
}

fn expiry_millis(lifetime: Duration) -> StateSyncResult<i64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| StateSyncError::Codec(format!("system clock before epoch: {e}")))?;
    i64::try_from((now + lifetime).as_millis())
        .map_err(|_| StateSyncError::Codec("record validity overflowed i64 millis".into()))
}

fn extract_cid(value: &str) -> Option<String> {
    value.strip_prefix("/ipfs/").map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;

    fn key_pair() -> SigningKey {
        SigningKey::generate(&mut OsRng)
    }

    #[test]
    fn sign_then_wrap_then_parse_round_trips() {
        let codec = DefaultRecordCodec::new();
        let key = key_pair();
        let bytes = codec.sign(&key, "bafybeigexample", 5, Duration::from_secs(60)).unwrap();

        let line = serde_json::json!({
            "Extra": BASE64.encode(&bytes),
            "ID": "12D3KooWexample",
            "Type": 3,
        })
        .to_string();

        let parsed = codec.parse(&line).unwrap().unwrap();
        assert_eq!(parsed.cid, "bafybeigexample");
        assert_eq!(parsed.sequence, 5);
        assert_eq!(parsed.record_bytes, bytes);
    }

    #[test]
    fn parse_returns_none_for_non_record_lines() {
        let codec = DefaultRecordCodec::new();
        let line = serde_json::json!({"ID": "12D3KooWexample", "Type": 0}).to_string();
        assert_eq!(codec.parse(&line).unwrap(), None);
    }

    #[test]
    fn parse_returns_none_for_blank_lines() {
        let codec = DefaultRecordCodec::new();
        assert_eq!(codec.parse("").unwrap(), None);
        assert_eq!(codec.parse("   \n").unwrap(), None);
    }

    #[test]
    fn parse_errors_on_malformed_json() {
        let codec = DefaultRecordCodec::new();
        assert!(codec.parse("not json").is_err());
    }

    #[test]
    fn parse_errors_on_invalid_base64() {
        let codec = DefaultRecordCodec::new();
        let line = serde_json::json!({"Extra": "not-valid-base64!!"}).to_string();
        assert!(codec.parse(&line).is_err());
    }

    #[test]
    fn extract_cid_requires_ipfs_prefix() {
        assert_eq!(extract_cid("/ipfs/bafyfoo"), Some("bafyfoo".to_string()));
        assert_eq!(extract_cid("/ipns/somethingelse"), None);
    }
}
