use braid_core::block::Block;
use braid_core::constants::{BLOCK_NONCE, UNCONFIRMED_VIEW_DEGREE};
use braid_core::error::ChainError;
use braid_core::transaction::Transaction;
use braid_core::types::{now, BlockHash, Nonce, WalletId};
use braid_crypto::verify;
use braid_dag::{BlockStatus, DagStore, InsertOutcome, NodeLinkDocument};
use tracing::{info, warn};

use crate::config::ChainConfig;
use crate::ledger::LedgerState;
use crate::pool::TxPool;
use crate::snapshot;

// ── Events ───────────────────────────────────────────────────────────────────

/// What happened when a block entered the DAG.
#[derive(Debug)]
pub struct BlockEvent {
    pub hash: BlockHash,
    pub block: Block,
    /// Parents confirmed by this insertion, in threshold-crossing order.
    /// These are the blocks to gossip to neighbors.
    pub confirmed: Vec<Block>,
    /// Pending parents removed because their transactions failed
    /// validation at confirmation time.
    pub abandoned: Vec<BlockHash>,
}

#[derive(Debug)]
pub enum AddBlockOutcome {
    Added(BlockEvent),
    /// Identical content already present; nothing changed.
    AlreadyKnown(BlockHash),
}

/// What happened when a transaction was admitted.
#[derive(Debug)]
pub struct SubmitReceipt {
    /// The admitted transaction, timestamp attached.
    pub transaction: Transaction,
    /// Set when this admission pushed the pool over the block limit and a
    /// block was cut.
    pub block_event: Option<BlockEvent>,
}

// ── ChainEngine ──────────────────────────────────────────────────────────────

/// One node's replica: the DAG, the confirmed ledger, the transaction pool,
/// and the neighbor list.
///
/// The engine is synchronous and single-writer by construction; the serving
/// layer wraps it in one coarse read-write lock and keeps all peer I/O
/// outside the critical section.
pub struct ChainEngine {
    config: ChainConfig,
    dag: DagStore,
    ledger: LedgerState,
    pool: TxPool,
    neighbors: Vec<String>,
}

impl ChainEngine {
    /// Fresh replica: empty DAG, genesis endowment, empty pool.
    pub fn new(config: ChainConfig) -> Self {
        let ledger = LedgerState::genesis(
            config.genesis_wallet.clone(),
            config.genesis_endowment,
            config.decimal_places,
        );
        let pool = TxPool::new(config.pool_cap_bytes);
        Self {
            config,
            dag: DagStore::new(),
            ledger,
            pool,
            neighbors: Vec::new(),
        }
    }

    /// Start from the configured snapshot when one exists. Any problem
    /// (missing file, parse failure, cyclic graph) logs and falls back to
    /// a fresh replica.
    pub fn open(config: ChainConfig) -> Self {
        let mut engine = Self::new(config);
        let Some(path) = engine.config.snapshot_path.clone() else {
            return engine;
        };
        match snapshot::load(&path) {
            Ok(Some(doc)) => match replay_document(&engine.config, &doc) {
                Ok((dag, ledger)) => {
                    info!(blocks = dag.len(), "replica restored from snapshot");
                    engine.dag = dag;
                    engine.ledger = ledger;
                }
                Err(e) => {
                    warn!(error = %e, "snapshot replay failed; starting empty");
                }
            },
            Ok(None) => {
                info!("no snapshot found; starting a new replica");
            }
            Err(e) => {
                warn!(error = %e, "snapshot unreadable; starting empty");
            }
        }
        engine
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    // ── Read-only views ──────────────────────────────────────────────────────

    pub fn dag(&self) -> &DagStore {
        &self.dag
    }

    pub fn ledger(&self) -> &LedgerState {
        &self.ledger
    }

    pub fn block_count(&self) -> usize {
        self.dag.len()
    }

    pub fn get_block(&self, hash: &BlockHash) -> Option<&Block> {
        self.dag.get(hash).map(|e| &e.block)
    }

    /// Blocks still short of two confirmations.
    pub fn unconfirmed_blocks(&self) -> Vec<&Block> {
        self.dag.blocks_below_degree(UNCONFIRMED_VIEW_DEGREE)
    }

    pub fn unconfirmed_transactions(&self) -> &[Transaction] {
        self.pool.transactions()
    }

    pub fn export_dag(&self) -> NodeLinkDocument {
        NodeLinkDocument::from_store(&self.dag)
    }

    /// Display balance for `wallet` (confirmed state).
    pub fn balance(&self, wallet: &WalletId) -> f64 {
        self.ledger.balance(wallet)
    }

    /// Nonce a wallet should build on: the pending pool view when it has
    /// in-flight transactions, otherwise the confirmed nonce. This is what
    /// lets a wallet pipeline submissions without waiting for confirmation.
    pub fn wallet_nonce(&self, wallet: &WalletId) -> Nonce {
        self.pool
            .pending_nonce(wallet)
            .unwrap_or_else(|| self.ledger.last_nonce(wallet))
    }

    pub fn neighbors(&self) -> &[String] {
        &self.neighbors
    }

    // ── Neighbor management ──────────────────────────────────────────────────

    pub fn has_neighbor(&self, url: &str) -> bool {
        self.neighbors.iter().any(|n| n == url)
    }

    /// Add a neighbor URL if new. Returns whether it was added.
    pub fn add_neighbor(&mut self, url: String) -> bool {
        if self.has_neighbor(&url) {
            return false;
        }
        info!(neighbor = %url, "neighbor added");
        self.neighbors.push(url);
        true
    }

    pub fn merge_neighbors(&mut self, urls: impl IntoIterator<Item = String>) {
        for url in urls {
            self.add_neighbor(url);
        }
    }

    // ── Transaction admission ────────────────────────────────────────────────

    /// Admit a transaction into the pool, possibly cutting a block.
    ///
    /// Admission checks, in order: the signature verifies under the sender
    /// key; the sender is known to the ledger; the confirmed balance covers
    /// the amount; the nonce extends the sender's pending sequence by one
    /// (first-ever nonce must be 1). Confirmation re-validates everything
    /// against confirmed state later.
    pub fn submit_transaction(&mut self, tx: Transaction) -> Result<SubmitReceipt, ChainError> {
        if !verify(&tx.signing_preimage(), &tx.signature, &tx.sender) {
            return Err(ChainError::InvalidSignature);
        }
        if !self.ledger.has_wallet(&tx.sender) {
            return Err(ChainError::UnknownWallet(tx.sender.to_string()));
        }
        let have = self.ledger.balance_minor(&tx.sender);
        if have < tx.amount {
            return Err(ChainError::InsufficientFunds {
                need: tx.amount,
                have,
            });
        }
        let expected = self
            .pool
            .pending_nonce(&tx.sender)
            .unwrap_or_else(|| self.ledger.last_nonce(&tx.sender))
            + 1;
        if tx.nonce != expected {
            return Err(ChainError::BadNonce {
                expected,
                got: tx.nonce,
            });
        }

        self.pool.push(tx.clone())?;
        let block_event = self.maybe_create_block()?;

        Ok(SubmitReceipt {
            transaction: tx,
            block_event,
        })
    }

    // ── Block building ───────────────────────────────────────────────────────

    /// Cut a block when the pool has crossed the size limit.
    ///
    /// Parents are the frontier: every block still short of the
    /// confirmation threshold. A nonempty DAG always yields at least one
    /// parent; the very first block has none.
    fn maybe_create_block(&mut self) -> Result<Option<BlockEvent>, ChainError> {
        if self.pool.byte_size() < self.config.block_size_limit_bytes {
            return Ok(None);
        }

        let block = Block {
            index: self.dag.len() as u64,
            transactions: self.pool.snapshot(),
            nonce: BLOCK_NONCE,
            parent_hashes: self.dag.frontier(self.config.minimal_degree),
            timestamp: now(),
        };

        match self.add_block(block)? {
            AddBlockOutcome::Added(event) => {
                self.pool.drain(&event.block.transactions);
                info!(
                    hash = %event.hash,
                    transactions = event.block.transactions.len(),
                    "block created"
                );
                Ok(Some(event))
            }
            // Content collision with an existing block; leave the pool for
            // the next trigger.
            AddBlockOutcome::AlreadyKnown(_) => Ok(None),
        }
    }

    // ── Block insertion & confirmation ───────────────────────────────────────

    /// Insert a block and run lazy confirmation on its parents.
    ///
    /// Any parent whose in-degree has reached the threshold and is still
    /// pending gets its transactions validated and applied exactly once; a
    /// parent that fails is abandoned (removed from the DAG) and reported
    /// in the event. The snapshot is rewritten whenever a confirmation or
    /// abandonment changed state.
    pub fn add_block(&mut self, block: Block) -> Result<AddBlockOutcome, ChainError> {
        let incoming = block.clone();
        let (hash, outcome) = self.dag.insert(block)?;
        if outcome == InsertOutcome::Exists {
            return Ok(AddBlockOutcome::AlreadyKnown(hash));
        }

        let mut confirmed = Vec::new();
        let mut abandoned = Vec::new();

        let mut seen = Vec::new();
        for parent in &incoming.parent_hashes {
            if seen.contains(parent) {
                continue;
            }
            seen.push(parent.clone());

            let crossed = self.dag.status(parent) == Some(&BlockStatus::Pending)
                && self.dag.in_degree(parent) >= self.config.minimal_degree;
            if !crossed {
                continue;
            }

            let txs = match self.dag.get(parent) {
                Some(entry) => entry.block.transactions.clone(),
                None => continue,
            };

            // Signature verification for the whole batch, hoisted ahead of
            // the atomic ledger application.
            let signatures_ok = txs
                .iter()
                .all(|tx| verify(&tx.signing_preimage(), &tx.signature, &tx.sender));

            let applied = if signatures_ok {
                self.ledger.apply_batch(&txs)
            } else {
                Err(ChainError::InvalidSignature)
            };

            match applied {
                Ok(()) => {
                    self.dag.mark_confirmed(parent);
                    if let Some(entry) = self.dag.get(parent) {
                        info!(block = %parent, transactions = txs.len(), "block confirmed");
                        confirmed.push(entry.block.clone());
                    }
                }
                Err(e) => {
                    warn!(block = %parent, error = %e, "confirmation failed; block abandoned");
                    self.dag.remove_pending(parent);
                    abandoned.push(parent.clone());
                }
            }
        }

        if !confirmed.is_empty() || !abandoned.is_empty() {
            self.save_snapshot();
        }

        Ok(AddBlockOutcome::Added(BlockEvent {
            hash,
            block: incoming,
            confirmed,
            abandoned,
        }))
    }

    // ── Adoption ─────────────────────────────────────────────────────────────

    /// Adopt a peer's DAG when it holds strictly more blocks than ours.
    /// Ledger state is rebuilt by full replay. Returns whether adoption
    /// happened.
    pub fn adopt(&mut self, doc: &NodeLinkDocument) -> Result<bool, ChainError> {
        if doc.node_count() <= self.dag.len() {
            return Ok(false);
        }
        let (dag, ledger) = replay_document(&self.config, doc)?;
        info!(
            ours = self.dag.len(),
            theirs = dag.len(),
            "adopting larger peer DAG"
        );
        self.dag = dag;
        self.ledger = ledger;
        self.save_snapshot();
        Ok(true)
    }

    // ── Persistence ──────────────────────────────────────────────────────────

    /// Best-effort snapshot write; failures are logged, never fatal.
    fn save_snapshot(&self) {
        let Some(path) = &self.config.snapshot_path else {
            return;
        };
        if let Err(e) = snapshot::save(path, &self.dag) {
            warn!(error = %e, path = %path.display(), "snapshot save failed");
        }
    }
}

// ── Replay ───────────────────────────────────────────────────────────────────

/// Rebuild a DAG and ledger from a node-link document.
///
/// Blocks are processed ancestors first (a cyclic document is rejected
/// outright). The graph is rebuilt from block content, so in-degrees come
/// out exactly as live insertion would produce them; blocks whose parents
/// are missing from the document are skipped with a warning.
///
/// The ledger starts from genesis and applies only blocks that meet the
/// confirmation threshold in the rebuilt graph. Within a block,
/// transactions are validated one at a time; the first invalid transaction
/// skips the remainder of that block.
pub fn replay_document(
    config: &ChainConfig,
    doc: &NodeLinkDocument,
) -> Result<(DagStore, LedgerState), ChainError> {
    let ordered = doc.topological_blocks()?;

    let mut dag = DagStore::new();
    for block in ordered {
        if let Err(e) = dag.insert(block.clone()) {
            warn!(index = block.index, error = %e, "skipping block during replay");
        }
    }

    let mut ledger = LedgerState::genesis(
        config.genesis_wallet.clone(),
        config.genesis_endowment,
        config.decimal_places,
    );

    for hash in dag.topological_order()? {
        if dag.in_degree(&hash) < config.minimal_degree {
            continue;
        }
        let txs = match dag.get(&hash) {
            Some(entry) => entry.block.transactions.clone(),
            None => continue,
        };
        for tx in &txs {
            match ledger.validate(tx) {
                Ok(()) => ledger.apply_transaction(tx),
                Err(e) => {
                    warn!(block = %hash, error = %e, "invalid transaction during replay; rest of block skipped");
                    break;
                }
            }
        }
        dag.mark_confirmed(&hash);
    }

    Ok((dag, ledger))
}
