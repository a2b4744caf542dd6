use std::collections::{HashMap, HashSet, VecDeque};

use braid_core::block::Block;
use braid_core::error::ChainError;
use braid_core::types::BlockHash;
use braid_crypto::block_hash;

/// Confirmation status of a block in the DAG.
///
/// `Pending → Confirmed` is the only transition. A block may be removed
/// only while `Pending`, and only when its transactions prove invalid
/// during its first confirmation attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockStatus {
    /// Inserted; fewer than the confirmation threshold of children so far.
    Pending,
    /// Threshold reached; transactions applied to the ledger exactly once.
    Confirmed,
}

/// A stored block plus its status.
#[derive(Clone, Debug)]
pub struct BlockEntry {
    pub block: Block,
    pub status: BlockStatus,
}

/// Result of inserting a block.
#[derive(Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Node and edges added.
    Inserted,
    /// Identical content already present; insertion is a no-op.
    Exists,
}

/// The block DAG, keyed by content hash.
///
/// Edges run child → parent: a new block points at the prior blocks it
/// extends. A block's in-degree is therefore its confirmation count: the
/// number of later blocks naming it as a parent.
#[derive(Default, Clone)]
pub struct DagStore {
    nodes: HashMap<BlockHash, BlockEntry>,
    /// child → parents it names (deduplicated edge list).
    parents: HashMap<BlockHash, Vec<BlockHash>>,
    /// parent → children naming it.
    children: HashMap<BlockHash, Vec<BlockHash>>,
    /// Hashes in local arrival order; drives snapshot layout and the
    /// `index` of newly built blocks.
    order: Vec<BlockHash>,
}

impl DagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, hash: &BlockHash) -> bool {
        self.nodes.contains_key(hash)
    }

    pub fn get(&self, hash: &BlockHash) -> Option<&BlockEntry> {
        self.nodes.get(hash)
    }

    /// Number of children naming `hash` as a parent.
    pub fn in_degree(&self, hash: &BlockHash) -> usize {
        self.children.get(hash).map_or(0, Vec::len)
    }

    /// Number of parents `hash` names.
    pub fn out_degree(&self, hash: &BlockHash) -> usize {
        self.parents.get(hash).map_or(0, Vec::len)
    }

    pub fn status(&self, hash: &BlockHash) -> Option<&BlockStatus> {
        self.nodes.get(hash).map(|e| &e.status)
    }

    /// Blocks eligible to be extended: everything still short of
    /// `threshold` confirmations, in arrival order. Never empty for a
    /// nonempty DAG, because a freshly inserted block starts at in-degree
    /// zero.
    pub fn frontier(&self, threshold: usize) -> Vec<BlockHash> {
        self.order
            .iter()
            .filter(|h| self.in_degree(h) < threshold)
            .cloned()
            .collect()
    }

    /// Blocks with in-degree below `threshold`, in arrival order. Backs the
    /// `unconfirmed_blocks` view.
    pub fn blocks_below_degree(&self, threshold: usize) -> Vec<&Block> {
        self.order
            .iter()
            .filter(|h| self.in_degree(h) < threshold)
            .filter_map(|h| self.nodes.get(h))
            .map(|e| &e.block)
            .collect()
    }

    /// Iterate entries in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&BlockHash, &BlockEntry)> {
        self.order
            .iter()
            .filter_map(move |h| self.nodes.get(h).map(|e| (h, e)))
    }

    /// Insert a block, keyed by its content hash. Returns the hash together
    /// with the outcome.
    ///
    /// Every named parent must already exist, and the graph must remain
    /// acyclic; on a cycle the tentative node and edges are rolled back and
    /// the store is exactly as before the call.
    pub fn insert(&mut self, block: Block) -> Result<(BlockHash, InsertOutcome), ChainError> {
        let hash = block_hash(&block);

        if self.nodes.contains_key(&hash) {
            return Ok((hash, InsertOutcome::Exists));
        }

        // Deduplicate the parent list; the graph is simple, one edge per
        // (child, parent) pair.
        let mut parent_edges: Vec<BlockHash> = Vec::new();
        for parent in &block.parent_hashes {
            if !self.nodes.contains_key(parent) {
                return Err(ChainError::UnknownParent(parent.to_string()));
            }
            if !parent_edges.contains(parent) {
                parent_edges.push(parent.clone());
            }
        }

        // Tentative add.
        self.nodes.insert(
            hash.clone(),
            BlockEntry {
                block,
                status: BlockStatus::Pending,
            },
        );
        for parent in &parent_edges {
            self.children
                .entry(parent.clone())
                .or_default()
                .push(hash.clone());
        }
        self.parents.insert(hash.clone(), parent_edges.clone());
        self.order.push(hash.clone());

        if !self.is_acyclic() {
            self.detach(&hash);
            return Err(ChainError::CycleRejected);
        }

        Ok((hash, InsertOutcome::Inserted))
    }

    /// Promote a pending block to confirmed.
    pub fn mark_confirmed(&mut self, hash: &BlockHash) {
        if let Some(entry) = self.nodes.get_mut(hash) {
            entry.status = BlockStatus::Confirmed;
        }
    }

    /// Remove a pending block proven invalid at confirmation time, together
    /// with its incident edges. Confirmed blocks are never removed.
    pub fn remove_pending(&mut self, hash: &BlockHash) -> bool {
        match self.nodes.get(hash) {
            Some(entry) if entry.status == BlockStatus::Pending => {}
            _ => return false,
        }
        self.detach(hash);
        true
    }

    fn detach(&mut self, hash: &BlockHash) {
        self.nodes.remove(hash);
        self.order.retain(|h| h != hash);

        // Edges out of `hash` (to its parents).
        if let Some(parents) = self.parents.remove(hash) {
            for parent in parents {
                if let Some(kids) = self.children.get_mut(&parent) {
                    kids.retain(|c| c != hash);
                }
            }
        }
        // Edges into `hash` (from its children). The children's block
        // content still names the removed hash; only the live adjacency is
        // dropped.
        if let Some(kids) = self.children.remove(hash) {
            for child in kids {
                if let Some(ps) = self.parents.get_mut(&child) {
                    ps.retain(|p| p != hash);
                }
            }
        }
    }

    /// Kahn's algorithm over the child → parent edges.
    pub fn is_acyclic(&self) -> bool {
        self.topological_order().is_ok()
    }

    /// Hashes ordered ancestors first: every block appears after all the
    /// parents it has live edges to. Fails on a cycle.
    pub fn topological_order(&self) -> Result<Vec<BlockHash>, ChainError> {
        let mut remaining: HashMap<&BlockHash, usize> = self
            .nodes
            .keys()
            .map(|h| (h, self.out_degree(h)))
            .collect();

        let mut ready: VecDeque<&BlockHash> = self
            .order
            .iter()
            .filter(|h| remaining.get(h) == Some(&0))
            .collect();

        let mut sorted = Vec::with_capacity(self.nodes.len());
        let mut seen: HashSet<&BlockHash> = HashSet::new();

        while let Some(hash) = ready.pop_front() {
            if !seen.insert(hash) {
                continue;
            }
            sorted.push(hash.clone());
            for child in self.children.get(hash).into_iter().flatten() {
                if let Some(count) = remaining.get_mut(child) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push_back(child);
                    }
                }
            }
        }

        if sorted.len() != self.nodes.len() {
            return Err(ChainError::CycleRejected);
        }
        Ok(sorted)
    }
}
