use std::collections::BTreeMap;

use braid_core::error::ChainError;
use braid_core::transaction::Transaction;
use braid_core::types::{Nonce, WalletId};

/// Unconfirmed transactions buffered for the next block.
///
/// Size is measured in approximate bytes; crossing the block limit is the
/// builder's cue to cut a block, and the hard cap bounds the buffer when
/// block creation stalls.
///
/// The pool keeps its own `pending_nonces` view so pipelined submissions
/// from one wallet form a contiguous chain without touching the ledger's
/// confirmed nonces.
#[derive(Clone, Debug)]
pub struct TxPool {
    entries: Vec<Transaction>,
    bytes: usize,
    pending_nonces: BTreeMap<WalletId, Nonce>,
    capacity_bytes: usize,
}

impl TxPool {
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            entries: Vec::new(),
            bytes: 0,
            pending_nonces: BTreeMap::new(),
            capacity_bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn byte_size(&self) -> usize {
        self.bytes
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.entries
    }

    /// Highest admitted (not necessarily confirmed) nonce for `wallet`.
    pub fn pending_nonce(&self, wallet: &WalletId) -> Option<Nonce> {
        self.pending_nonces.get(wallet).copied()
    }

    /// Append an admitted transaction, recording its pending nonce.
    pub fn push(&mut self, tx: Transaction) -> Result<(), ChainError> {
        let size = tx.approx_size();
        if self.bytes + size > self.capacity_bytes {
            return Err(ChainError::PoolFull {
                capacity_bytes: self.capacity_bytes,
            });
        }
        self.bytes += size;
        let pending = self.pending_nonces.entry(tx.sender.clone()).or_insert(0);
        if tx.nonce > *pending {
            *pending = tx.nonce;
        }
        self.entries.push(tx);
        Ok(())
    }

    /// Contents in admission order, for inclusion in a block.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.entries.clone()
    }

    /// Remove exactly the transactions that entered a block.
    pub fn drain(&mut self, included: &[Transaction]) {
        self.entries.retain(|tx| !included.contains(tx));
        self.bytes = self.entries.iter().map(Transaction::approx_size).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_core::now;
    use braid_core::types::SignatureB64;

    fn tx(sender: &str, nonce: u64) -> Transaction {
        Transaction {
            sender: WalletId::new(sender),
            recipient: WalletId::new("recipient"),
            amount: 10,
            nonce,
            signature: SignatureB64("sig".into()),
            timestamp: now(),
        }
    }

    #[test]
    fn push_tracks_bytes_and_pending_nonce() {
        let mut pool = TxPool::new(1024 * 1024);
        pool.push(tx("a", 1)).unwrap();
        pool.push(tx("a", 2)).unwrap();
        assert_eq!(pool.len(), 2);
        assert!(pool.byte_size() > 0);
        assert_eq!(pool.pending_nonce(&WalletId::new("a")), Some(2));
        assert_eq!(pool.pending_nonce(&WalletId::new("b")), None);
    }

    #[test]
    fn capacity_is_a_hard_cap() {
        let mut pool = TxPool::new(10);
        let err = pool.push(tx("a", 1)).unwrap_err();
        assert!(matches!(err, ChainError::PoolFull { .. }));
        assert!(pool.is_empty());
    }

    #[test]
    fn drain_removes_exactly_the_included() {
        let mut pool = TxPool::new(1024 * 1024);
        let first = tx("a", 1);
        let second = tx("a", 2);
        pool.push(first.clone()).unwrap();
        pool.push(second.clone()).unwrap();

        pool.drain(&[first]);
        assert_eq!(pool.transactions(), &[second]);
        assert_eq!(
            pool.byte_size(),
            pool.transactions()[0].approx_size()
        );
    }
}
