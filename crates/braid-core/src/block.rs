use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;
use crate::types::{format_timestamp, timestamp_format, BlockHash, Timestamp};

/// A batch of transactions plus DAG metadata, identified by the SHA-256 of
/// its canonical serialization.
///
/// `parent_hashes` lists the prior blocks this block extends; edges in the
/// DAG run from this block to each parent. Older snapshots used the field
/// name `children_hashes` for the same list, accepted here as an alias.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// Insertion ordinal at creation time. Informational, not a consensus
    /// field.
    pub index: u64,
    pub transactions: Vec<Transaction>,
    /// Reserved; always 0.
    pub nonce: u64,
    #[serde(alias = "children_hashes")]
    pub parent_hashes: Vec<BlockHash>,
    #[serde(with = "timestamp_format")]
    pub timestamp: Timestamp,
}

impl Block {
    /// Canonical JSON bytes hashed to form the block id.
    ///
    /// Keys are sorted lexicographically (`serde_json` object maps are
    /// B-tree backed), parent order is preserved as given, the timestamp is
    /// the fixed-precision ISO-8601 rendering, and each transaction appears
    /// in its five-field canonical form.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let value = serde_json::json!({
            "index": self.index,
            "nonce": self.nonce,
            "parent_hashes": self.parent_hashes,
            "timestamp": format_timestamp(&self.timestamp),
            "transactions": self
                .transactions
                .iter()
                .map(Transaction::canonical_value)
                .collect::<Vec<_>>(),
        });
        serde_json::to_vec(&value).expect("canonical JSON serialization is infallible")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{parse_timestamp, SignatureB64, WalletId};

    fn tx(nonce: u64) -> Transaction {
        Transaction {
            sender: WalletId::new("sender-key"),
            recipient: WalletId::new("recipient-key"),
            amount: 250,
            nonce,
            signature: SignatureB64("c2lnbmF0dXJl".into()),
            timestamp: parse_timestamp("2024-05-01T00:00:00").unwrap(),
        }
    }

    fn block() -> Block {
        Block {
            index: 3,
            transactions: vec![tx(1), tx(2)],
            nonce: 0,
            parent_hashes: vec![BlockHash::new("bb"), BlockHash::new("aa")],
            timestamp: parse_timestamp("2024-05-02T08:30:00.000001").unwrap(),
        }
    }

    #[test]
    fn canonical_bytes_sort_top_level_keys() {
        let text = String::from_utf8(block().canonical_bytes()).unwrap();
        let idx_index = text.find("\"index\"").unwrap();
        let idx_nonce = text.find("\"nonce\"").unwrap();
        let idx_parents = text.find("\"parent_hashes\"").unwrap();
        let idx_ts = text.find("\"timestamp\"").unwrap();
        let idx_txs = text.find("\"transactions\"").unwrap();
        assert!(idx_index < idx_nonce);
        assert!(idx_nonce < idx_parents);
        assert!(idx_parents < idx_ts);
        assert!(idx_ts < idx_txs);
    }

    #[test]
    fn parent_order_is_preserved_in_canonical_form() {
        let text = String::from_utf8(block().canonical_bytes()).unwrap();
        assert!(text.contains(r#"["bb","aa"]"#));
    }

    #[test]
    fn canonical_bytes_exclude_transaction_timestamps() {
        let text = String::from_utf8(block().canonical_bytes()).unwrap();
        // One timestamp key for the block itself, none per transaction.
        assert_eq!(text.matches("\"timestamp\"").count(), 1);
    }

    #[test]
    fn legacy_children_hashes_field_deserializes() {
        let json = r#"{
            "index": 0,
            "transactions": [],
            "nonce": 0,
            "children_hashes": ["abc"],
            "timestamp": "2024-05-02T08:30:00.000000"
        }"#;
        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.parent_hashes, vec![BlockHash::new("abc")]);
    }
}
