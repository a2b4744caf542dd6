use serde::{Deserialize, Serialize};

use crate::types::{
    timestamp_format, Amount, Nonce, SignatureB64, Timestamp, WalletId,
};

// ── TransactionCreate ────────────────────────────────────────────────────────

/// A signed transfer as submitted by a wallet. The node attaches the
/// timestamp at admission, turning this into a [`Transaction`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionCreate {
    pub sender: WalletId,
    pub recipient: WalletId,
    /// Amount in minor units.
    pub amount: Amount,
    /// Must extend the sender's nonce sequence by exactly one.
    pub nonce: Nonce,
    /// Detached signature over [`Transaction::signing_preimage`].
    pub signature: SignatureB64,
    /// Present when relayed by a peer; absent on first submission.
    #[serde(
        default,
        with = "timestamp_format::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<Timestamp>,
}

impl TransactionCreate {
    /// Promote to a full transaction, stamping `now` unless a peer already
    /// attached a timestamp.
    pub fn into_transaction(self, now: Timestamp) -> Transaction {
        Transaction {
            timestamp: self.timestamp.unwrap_or(now),
            sender: self.sender,
            recipient: self.recipient,
            amount: self.amount,
            nonce: self.nonce,
            signature: self.signature,
        }
    }
}

// ── Transaction ──────────────────────────────────────────────────────────────

/// A timestamped signed transfer, as held in the pool and inside blocks.
///
/// The timestamp is informational only: it is not covered by the signature
/// and does not enter the block hash.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub sender: WalletId,
    pub recipient: WalletId,
    pub amount: Amount,
    pub nonce: Nonce,
    pub signature: SignatureB64,
    #[serde(with = "timestamp_format")]
    pub timestamp: Timestamp,
}

impl Transaction {
    /// The bytes a wallet signs: `sender ++ recipient ++ amount ++ nonce`
    /// with decimal integers and no separators.
    pub fn signing_preimage(&self) -> Vec<u8> {
        signing_preimage(&self.sender, &self.recipient, self.amount, self.nonce)
    }

    /// The canonical form hashed inside a block: the five signed fields with
    /// keys sorted, no timestamp.
    pub fn canonical_value(&self) -> serde_json::Value {
        serde_json::json!({
            "amount": self.amount,
            "nonce": self.nonce,
            "recipient": self.recipient,
            "sender": self.sender,
            "signature": self.signature,
        })
    }

    /// Approximate in-memory footprint, used for the pool's block-cut
    /// trigger and hard cap. Key and signature strings dominate.
    pub fn approx_size(&self) -> usize {
        self.sender.as_str().len()
            + self.recipient.as_str().len()
            + self.signature.as_str().len()
            + 2 * std::mem::size_of::<u64>()
            + 26 // rendered timestamp
    }
}

/// Preimage builder shared with the wallet CLI, which signs before a
/// `Transaction` value exists.
pub fn signing_preimage(
    sender: &WalletId,
    recipient: &WalletId,
    amount: Amount,
    nonce: Nonce,
) -> Vec<u8> {
    format!("{}{}{}{}", sender, recipient, amount, nonce).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_timestamp;

    fn sample() -> Transaction {
        Transaction {
            sender: WalletId::new("alice-key"),
            recipient: WalletId::new("bob-key"),
            amount: 1000,
            nonce: 1,
            signature: SignatureB64("c2ln".into()),
            timestamp: parse_timestamp("2024-05-01T00:00:00").unwrap(),
        }
    }

    #[test]
    fn preimage_concatenates_without_separators() {
        assert_eq!(sample().signing_preimage(), b"alice-keybob-key10001".to_vec());
    }

    #[test]
    fn preimage_zero_values_render_as_zero() {
        let pre = signing_preimage(
            &WalletId::new("a"),
            &WalletId::new("b"),
            0,
            0,
        );
        assert_eq!(pre, b"ab00".to_vec());
    }

    #[test]
    fn canonical_value_sorts_keys_and_drops_timestamp() {
        let text = serde_json::to_string(&sample().canonical_value()).unwrap();
        assert_eq!(
            text,
            r#"{"amount":1000,"nonce":1,"recipient":"bob-key","sender":"alice-key","signature":"c2ln"}"#
        );
    }

    #[test]
    fn create_without_timestamp_is_stamped_at_admission() {
        let create = TransactionCreate {
            sender: WalletId::new("a"),
            recipient: WalletId::new("b"),
            amount: 5,
            nonce: 1,
            signature: SignatureB64("sig".into()),
            timestamp: None,
        };
        let now = parse_timestamp("2024-06-01T10:00:00").unwrap();
        assert_eq!(create.into_transaction(now).timestamp, now);
    }

    #[test]
    fn relayed_timestamp_is_preserved() {
        let stamped = parse_timestamp("2024-06-01T09:00:00").unwrap();
        let create = TransactionCreate {
            sender: WalletId::new("a"),
            recipient: WalletId::new("b"),
            amount: 5,
            nonce: 1,
            signature: SignatureB64("sig".into()),
            timestamp: Some(stamped),
        };
        let now = parse_timestamp("2024-06-01T10:00:00").unwrap();
        assert_eq!(create.into_transaction(now).timestamp, stamped);
    }
}
