use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction amount in minor units (display value × 10^DECIMAL_PLACES).
pub type Amount = u64;

/// Per-sender transaction counter (replay protection).
pub type Nonce = u64;

// ── WalletId ─────────────────────────────────────────────────────────────────

/// Base64-encoded Dilithium2 public key. Wallets are addressed by their
/// full encoded key; there is no separate account-id derivation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletId(pub String);

impl WalletId {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Encoded Dilithium2 keys run to ~1.7 KB; show a prefix only.
        let head = self.0.get(..12).unwrap_or(&self.0);
        write!(f, "WalletId({head}…)")
    }
}

// ── SignatureB64 ─────────────────────────────────────────────────────────────

/// Base64-encoded detached Dilithium2 signature.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureB64(pub String);

impl SignatureB64 {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SignatureB64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = self.0.get(..12).unwrap_or(&self.0);
        write!(f, "SignatureB64({head}…)")
    }
}

// ── BlockHash ────────────────────────────────────────────────────────────────

/// Hex-encoded SHA-256 digest of a block's canonical serialization.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHash(pub String);

impl BlockHash {
    pub fn new(hex_digest: impl Into<String>) -> Self {
        Self(hex_digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = self.0.get(..16).unwrap_or(&self.0);
        write!(f, "BlockHash({head}…)")
    }
}

// ── Timestamp ────────────────────────────────────────────────────────────────

/// UTC wall-clock time, second + microsecond precision.
pub type Timestamp = chrono::NaiveDateTime;

/// ISO-8601 rendering used on the wire, in snapshots, and inside block
/// hashes. Fixed microsecond precision so the string form is stable.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Parse an ISO-8601 timestamp. A trailing `Z` or offset is tolerated on
/// input; the naive UTC value is kept.
pub fn parse_timestamp(s: &str) -> Result<Timestamp, chrono::ParseError> {
    let trimmed = s.strip_suffix('Z').unwrap_or(s);
    trimmed.parse::<Timestamp>()
}

/// Current UTC wall-clock time.
pub fn now() -> Timestamp {
    chrono::Utc::now().naive_utc()
}

/// Serde adapter for the ISO-8601 timestamp rendering above.
pub mod timestamp_format {
    use super::{format_timestamp, parse_timestamp, Timestamp};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Timestamp, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(d)?;
        parse_timestamp(&raw).map_err(de::Error::custom)
    }

    /// Same adapter for `Option<Timestamp>` fields.
    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            ts: &Option<Timestamp>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(t) => s.serialize_some(&format_timestamp(t)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<Timestamp>, D::Error> {
            let raw: Option<String> = Option::deserialize(d)?;
            raw.map(|r| parse_timestamp(&r).map_err(de::Error::custom))
                .transpose()
        }
    }
}
