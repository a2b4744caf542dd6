use braid_core::block::Block;
use braid_core::types::BlockHash;
use sha2::{Digest, Sha256};

/// SHA-256 of arbitrary bytes, hex-encoded.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Derive a block's identifier from its canonical serialization.
///
/// Deterministic: two blocks with identical content collide by design and
/// are deduplicated at insertion.
pub fn block_hash(block: &Block) -> BlockHash {
    BlockHash::new(sha256_hex(&block.canonical_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_core::types::parse_timestamp;

    fn block(index: u64) -> Block {
        Block {
            index,
            transactions: vec![],
            nonce: 0,
            parent_hashes: vec![],
            timestamp: parse_timestamp("2024-05-02T08:30:00").unwrap(),
        }
    }

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn identical_content_hashes_identically() {
        assert_eq!(block_hash(&block(1)), block_hash(&block(1)));
    }

    #[test]
    fn any_field_change_changes_the_hash() {
        let base = block(1);
        let other_index = block(2);
        let mut other_ts = block(1);
        other_ts.timestamp = parse_timestamp("2024-05-02T08:30:01").unwrap();
        let mut other_parent = block(1);
        other_parent.parent_hashes = vec![BlockHash::new("aa")];

        assert_ne!(block_hash(&base), block_hash(&other_index));
        assert_ne!(block_hash(&base), block_hash(&other_ts));
        assert_ne!(block_hash(&base), block_hash(&other_parent));
    }
}
