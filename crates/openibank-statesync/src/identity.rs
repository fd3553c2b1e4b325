//! Deterministic Ed25519 identity derivation.
//!
//! Mirrors `openibank_crypto::vault::Vault::from_seed`'s deterministic-seed
//! style (there: `blake3::derive_key` feeding a secp256k1/ed25519 dual key;
//! here: HKDF-SHA256 feeding a single Ed25519 seed, per the engine's
//! normative derivation).

use ed25519_dalek::{SigningKey, VerifyingKey};
use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::{StateSyncError, StateSyncResult};

/// Normative HKDF `info` string. Changing this would silently re-key every
/// existing wallet identity, so it is fixed across platforms.
const HKDF_INFO: &[u8] = b"ipfs-storage-ed25519-v1";

/// Opaque high-entropy secret the caller derives identity from (e.g. a
/// 32-byte secp256k1 private key). The engine never interprets these bytes
/// beyond feeding them to HKDF; seed-phrase-to-secret derivation is the
/// caller's responsibility (out of scope, spec §1).
#[derive(Clone)]
pub struct WalletSecret(Vec<u8>);

impl WalletSecret {
    /// Wrap raw secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for WalletSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSecret").field("bytes", &"<redacted>").finish()
    }
}

/// A deterministic Ed25519 identity for one wallet.
#[derive(Clone)]
pub struct IpnsIdentity {
    key_pair: SigningKey,
    name: PeerId,
}

impl IpnsIdentity {
    /// Derive an identity from a [`WalletSecret`].
    ///
    /// `HKDF-SHA256(ikm = secret, salt = empty, info = "ipfs-storage-ed25519-v1", L = 32)`
    /// is used directly as the Ed25519 seed. Deterministic: the same secret
    /// always yields the same key pair and peer identifier, on every
    /// platform.
    pub fn derive(secret: &WalletSecret) -> StateSyncResult<Self> {
        let hk = Hkdf::<Sha256>::new(None, secret.as_bytes());
        let mut seed = [0u8; 32];
        hk.expand(HKDF_INFO, &mut seed).map_err(|e| {
            StateSyncError::InvalidInput(format!("HKDF expand failed: {e}"))
        })?;
        let key_pair = SigningKey::from_bytes(&seed);
        let name = PeerId::from_ed25519_public_key(&key_pair.verifying_key());
        Ok(Self { key_pair, name })
    }

    /// The derived Ed25519 key pair.
    pub fn key_pair(&self) -> &SigningKey {
        &self.key_pair
    }

    /// The canonical peer identifier derived from the public key.
    pub fn name(&self) -> &PeerId {
        &self.name
    }
}

/// Canonical peer-identifier string derived from an Ed25519 public key.
///
/// Follows the libp2p convention for "inline" (identity-multihash) peer
/// IDs: the public key is wrapped in a minimal two-field protobuf envelope
/// (`key_type = Ed25519`, `data = raw 32 bytes`), hashed with the identity
/// multihash (code `0x00`, i.e. "hash" = the bytes themselves), and the
/// resulting multihash bytes are base58btc-encoded with no multibase
/// prefix — the legacy `Qm.../12D3KooW...`-style representation most
/// gateways and naming services still expect on the wire. This crate
/// reimplements just enough of that encoding to be deterministic and
/// stable; it intentionally does not depend on a full multihash/CID crate
/// (none of the other codecs that format provides are used here).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PeerId(String);

impl PeerId {
    /// Derive the canonical peer-id string for an Ed25519 public key.
    pub fn from_ed25519_public_key(key: &VerifyingKey) -> Self {
        let mut protobuf = Vec::with_capacity(4 + 32);
        protobuf.push(0x08); // field 1 (key_type), varint wire type
        protobuf.push(0x01); // Ed25519 = 1
        protobuf.push(0x12); // field 2 (data), length-delimited wire type
        protobuf.push(0x20); // length 32
        protobuf.extend_from_slice(key.as_bytes());

        let mut multihash = Vec::with_capacity(2 + protobuf.len());
        multihash.push(0x00); // identity hash function code
        multihash.push(protobuf.len() as u8); // digest length (36, fits in one varint byte)
        multihash.extend_from_slice(&protobuf);

        Self(base58::encode(&multihash))
    }

    /// Borrow the peer-id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimal Bitcoin-alphabet base58 encoder (no checksum — peer IDs don't
/// carry one). Self-contained rather than pulling in a crate for one
/// direction of one alphabet.
mod base58 {
    const ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

    pub fn encode(input: &[u8]) -> String {
        let leading_zeros = input.iter().take_while(|&&b| b == 0).count();

        // Big-endian base-256 to base-58 conversion via repeated division.
        let mut digits: Vec<u8> = vec![0];
        for &byte in input {
            let mut carry = byte as u32;
            for digit in digits.iter_mut() {
                carry += (*digit as u32) << 8;
                *digit = (carry % 58) as u8;
                carry /= 58;
            }
            while carry > 0 {
                digits.push((carry % 58) as u8);
                carry /= 58;
            }
        }

        let mut out = String::with_capacity(leading_zeros + digits.len());
        out.extend(std::iter::repeat('1').take(leading_zeros));
        out.extend(digits.iter().rev().map(|&d| ALPHABET[d as usize] as char));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let secret = WalletSecret::new(vec![7u8; 32]);
        let id1 = IpnsIdentity::derive(&secret).unwrap();
        let id2 = IpnsIdentity::derive(&secret).unwrap();
        assert_eq!(id1.name(), id2.name());
        assert_eq!(
            id1.key_pair().verifying_key().as_bytes(),
            id2.key_pair().verifying_key().as_bytes()
        );
    }

    #[test]
    fn different_secrets_yield_different_identities() {
        let a = IpnsIdentity::derive(&WalletSecret::new(vec![1u8; 32])).unwrap();
        let b = IpnsIdentity::derive(&WalletSecret::new(vec![2u8; 32])).unwrap();
        assert_ne!(a.name(), b.name());
    }

    #[test]
    fn peer_id_starts_with_expected_prefix() {
        // Identity-multihash ed25519 peer IDs conventionally start "12D3KooW".
        let secret = WalletSecret::new(b"a totally arbitrary wallet secret".to_vec());
        let id = IpnsIdentity::derive(&secret).unwrap();
        assert!(id.name().as_str().starts_with("12D3KooW"));
    }

    #[test]
    fn base58_encode_empty() {
        assert_eq!(base58::encode(&[]), "");
    }

    #[test]
    fn base58_encode_known_vector() {
        // "Hello World" -> base58btc is a commonly cited test vector.
        assert_eq!(base58::encode(b"Hello World"), "JxF12TrwUP45BMd");
    }
}
