use std::collections::BTreeMap;

use braid_core::error::ChainError;
use braid_core::transaction::Transaction;
use braid_core::types::{Amount, Nonce, WalletId};
use braid_crypto::verify;

/// Confirmed balances and nonces.
///
/// Balances are integers in minor units. Nonces record the last applied
/// transaction per sender; an absent entry means zero, so the first valid
/// nonce for any wallet is 1. State mutates only through confirmation
/// (`apply_batch`) and replay (`apply_transaction`).
#[derive(Clone, Debug)]
pub struct LedgerState {
    balances: BTreeMap<WalletId, Amount>,
    nonces: BTreeMap<WalletId, Nonce>,
    decimal_places: u32,
}

impl LedgerState {
    /// Cold-start state: the genesis wallet holds the entire endowment.
    pub fn genesis(genesis_wallet: WalletId, endowment: Amount, decimal_places: u32) -> Self {
        let mut balances = BTreeMap::new();
        balances.insert(genesis_wallet, endowment);
        Self {
            balances,
            nonces: BTreeMap::new(),
            decimal_places,
        }
    }

    pub fn has_wallet(&self, wallet: &WalletId) -> bool {
        self.balances.contains_key(wallet)
    }

    pub fn balance_minor(&self, wallet: &WalletId) -> Amount {
        self.balances.get(wallet).copied().unwrap_or(0)
    }

    /// Display balance: minor units over 10^decimal_places.
    pub fn balance(&self, wallet: &WalletId) -> f64 {
        self.balance_minor(wallet) as f64 / 10f64.powi(self.decimal_places as i32)
    }

    /// Last applied nonce for `wallet`, zero when unseen.
    pub fn last_nonce(&self, wallet: &WalletId) -> Nonce {
        self.nonces.get(wallet).copied().unwrap_or(0)
    }

    pub fn balances(&self) -> &BTreeMap<WalletId, Amount> {
        &self.balances
    }

    pub fn nonces(&self) -> &BTreeMap<WalletId, Nonce> {
        &self.nonces
    }

    /// Sum of all balances. Constant after genesis: transfers only.
    pub fn total_minor(&self) -> u64 {
        self.balances.values().sum()
    }

    /// Full validation of a single transaction against current state:
    /// signature, nonce continuity, funds.
    pub fn validate(&self, tx: &Transaction) -> Result<(), ChainError> {
        if !verify(&tx.signing_preimage(), &tx.signature, &tx.sender) {
            return Err(ChainError::InvalidSignature);
        }
        let expected = self.last_nonce(&tx.sender) + 1;
        if tx.nonce != expected {
            return Err(ChainError::BadNonce {
                expected,
                got: tx.nonce,
            });
        }
        let have = self.balance_minor(&tx.sender);
        if have < tx.amount {
            return Err(ChainError::InsufficientFunds {
                need: tx.amount,
                have,
            });
        }
        Ok(())
    }

    /// Apply a confirmed block's transactions atomically.
    ///
    /// Works on a copy: each transaction's nonce and funds are checked
    /// against the evolving copy, and the copy replaces live state only if
    /// every transaction passes. On any failure nothing changes.
    ///
    /// Signatures are not re-checked here; the confirmation path verifies
    /// the whole batch before calling in, which keeps the CPU-heavy work
    /// hoistable out of the write lock.
    pub fn apply_batch(&mut self, txs: &[Transaction]) -> Result<(), ChainError> {
        let mut balances = self.balances.clone();
        let mut nonces = self.nonces.clone();

        for tx in txs {
            let expected = nonces.get(&tx.sender).copied().unwrap_or(0) + 1;
            if tx.nonce != expected {
                return Err(ChainError::BadNonce {
                    expected,
                    got: tx.nonce,
                });
            }
            let have = balances.get(&tx.sender).copied().unwrap_or(0);
            if have < tx.amount {
                return Err(ChainError::InsufficientFunds {
                    need: tx.amount,
                    have,
                });
            }
            *balances.entry(tx.sender.clone()).or_insert(0) -= tx.amount;
            *balances.entry(tx.recipient.clone()).or_insert(0) += tx.amount;
            nonces.insert(tx.sender.clone(), tx.nonce);
        }

        self.balances = balances;
        self.nonces = nonces;
        Ok(())
    }

    /// Apply one already-validated transaction. Replay path only.
    pub fn apply_transaction(&mut self, tx: &Transaction) {
        let sender_balance = self.balances.entry(tx.sender.clone()).or_insert(0);
        *sender_balance = sender_balance.saturating_sub(tx.amount);
        *self.balances.entry(tx.recipient.clone()).or_insert(0) += tx.amount;
        self.nonces.insert(tx.sender.clone(), tx.nonce);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_core::now;
    use braid_core::types::SignatureB64;

    fn wallet(tag: &str) -> WalletId {
        WalletId::new(format!("wallet-{tag}"))
    }

    fn unsigned_tx(sender: &WalletId, recipient: &WalletId, amount: u64, nonce: u64) -> Transaction {
        Transaction {
            sender: sender.clone(),
            recipient: recipient.clone(),
            amount,
            nonce,
            signature: SignatureB64("unchecked".into()),
            timestamp: now(),
        }
    }

    fn ledger() -> LedgerState {
        LedgerState::genesis(wallet("genesis"), 100_000, 2)
    }

    #[test]
    fn genesis_endowment_and_display_balance() {
        let l = ledger();
        assert_eq!(l.balance_minor(&wallet("genesis")), 100_000);
        assert_eq!(l.balance(&wallet("genesis")), 1000.0);
        assert_eq!(l.balance(&wallet("nobody")), 0.0);
        assert_eq!(l.last_nonce(&wallet("genesis")), 0);
    }

    #[test]
    fn apply_batch_transfers_and_records_nonces() {
        let mut l = ledger();
        let txs = vec![
            unsigned_tx(&wallet("genesis"), &wallet("a"), 1_000, 1),
            unsigned_tx(&wallet("genesis"), &wallet("b"), 500, 2),
        ];
        l.apply_batch(&txs).unwrap();
        assert_eq!(l.balance_minor(&wallet("genesis")), 98_500);
        assert_eq!(l.balance_minor(&wallet("a")), 1_000);
        assert_eq!(l.balance_minor(&wallet("b")), 500);
        assert_eq!(l.last_nonce(&wallet("genesis")), 2);
    }

    #[test]
    fn apply_batch_is_all_or_nothing() {
        let mut l = ledger();
        let txs = vec![
            unsigned_tx(&wallet("genesis"), &wallet("a"), 1_000, 1),
            // Overdraws the evolving copy.
            unsigned_tx(&wallet("genesis"), &wallet("b"), 1_000_000, 2),
        ];
        let err = l.apply_batch(&txs).unwrap_err();
        assert!(matches!(err, ChainError::InsufficientFunds { .. }));
        assert_eq!(l.balance_minor(&wallet("genesis")), 100_000);
        assert_eq!(l.balance_minor(&wallet("a")), 0);
        assert_eq!(l.last_nonce(&wallet("genesis")), 0);
    }

    #[test]
    fn apply_batch_rejects_nonce_gap_and_reuse() {
        let mut l = ledger();
        let gap = vec![unsigned_tx(&wallet("genesis"), &wallet("a"), 10, 2)];
        assert!(matches!(
            l.apply_batch(&gap).unwrap_err(),
            ChainError::BadNonce { expected: 1, got: 2 }
        ));

        l.apply_batch(&[unsigned_tx(&wallet("genesis"), &wallet("a"), 10, 1)])
            .unwrap();
        let reuse = vec![unsigned_tx(&wallet("genesis"), &wallet("a"), 10, 1)];
        assert!(matches!(
            l.apply_batch(&reuse).unwrap_err(),
            ChainError::BadNonce { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn batch_evolving_copy_funds_pipelined_recipient() {
        let mut l = ledger();
        // `a` is funded mid-batch and spends in the same batch.
        let txs = vec![
            unsigned_tx(&wallet("genesis"), &wallet("a"), 1_000, 1),
            unsigned_tx(&wallet("a"), &wallet("b"), 400, 1),
        ];
        l.apply_batch(&txs).unwrap();
        assert_eq!(l.balance_minor(&wallet("a")), 600);
        assert_eq!(l.balance_minor(&wallet("b")), 400);
    }

    #[test]
    fn total_supply_is_conserved() {
        let mut l = ledger();
        l.apply_batch(&[
            unsigned_tx(&wallet("genesis"), &wallet("a"), 1_000, 1),
            unsigned_tx(&wallet("a"), &wallet("b"), 999, 1),
        ])
        .unwrap();
        assert_eq!(l.total_minor(), 100_000);
    }

    #[test]
    fn validate_checks_signature_first() {
        let l = ledger();
        let tx = unsigned_tx(&wallet("genesis"), &wallet("a"), 10, 1);
        // The placeholder signature cannot verify.
        assert!(matches!(
            l.validate(&tx).unwrap_err(),
            ChainError::InvalidSignature
        ));
    }
}
