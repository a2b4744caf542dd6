//! Node-link (de)serialization of the DAG.
//!
//! The snapshot file and the `dag/` endpoint both carry the graph as
//! `{directed, multigraph, graph, nodes: [{id, block}], links:
//! [{source, target}]}`. Each link runs from child (`source`) to parent
//! (`target`), the same direction as live edges.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use braid_core::block::Block;
use braid_core::error::ChainError;
use braid_core::types::BlockHash;

use crate::store::DagStore;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeLinkNode {
    pub id: BlockHash,
    pub block: Block,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeLinkEdge {
    pub source: BlockHash,
    pub target: BlockHash,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeLinkDocument {
    pub directed: bool,
    pub multigraph: bool,
    #[serde(default)]
    pub graph: serde_json::Value,
    pub nodes: Vec<NodeLinkNode>,
    pub links: Vec<NodeLinkEdge>,
}

impl NodeLinkDocument {
    /// Export a store in arrival order. The graph is simple: repeated
    /// parent references collapse to one link.
    pub fn from_store(store: &DagStore) -> Self {
        let mut nodes = Vec::with_capacity(store.len());
        let mut links = Vec::new();
        for (hash, entry) in store.iter() {
            nodes.push(NodeLinkNode {
                id: hash.clone(),
                block: entry.block.clone(),
            });
            let mut seen: Vec<&BlockHash> = Vec::new();
            for parent in &entry.block.parent_hashes {
                if seen.contains(&parent) {
                    continue;
                }
                seen.push(parent);
                links.push(NodeLinkEdge {
                    source: hash.clone(),
                    target: parent.clone(),
                });
            }
        }
        Self {
            directed: true,
            multigraph: false,
            graph: serde_json::json!({}),
            nodes,
            links,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Blocks ordered ancestors first according to the stored links.
    ///
    /// Used to decide the replay order when rebuilding state; a cyclic
    /// document is rejected outright. Links whose endpoints are not in the
    /// node list are ignored.
    pub fn topological_blocks(&self) -> Result<Vec<&Block>, ChainError> {
        let index: HashMap<&BlockHash, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (&n.id, i))
            .collect();

        // remaining[i] = parents of node i not yet emitted. Duplicate
        // links (a peer's document is untrusted) count once.
        let mut remaining = vec![0usize; self.nodes.len()];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        let mut seen_edges = std::collections::HashSet::new();
        for link in &self.links {
            let (Some(&child), Some(&parent)) = (index.get(&link.source), index.get(&link.target))
            else {
                continue;
            };
            if !seen_edges.insert((child, parent)) {
                continue;
            }
            remaining[child] += 1;
            children[parent].push(child);
        }

        let mut ready: VecDeque<usize> = (0..self.nodes.len())
            .filter(|&i| remaining[i] == 0)
            .collect();
        let mut sorted = Vec::with_capacity(self.nodes.len());

        while let Some(i) = ready.pop_front() {
            sorted.push(&self.nodes[i].block);
            for &child in &children[i] {
                remaining[child] -= 1;
                if remaining[child] == 0 {
                    ready.push_back(child);
                }
            }
        }

        if sorted.len() != self.nodes.len() {
            return Err(ChainError::CycleRejected);
        }
        Ok(sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_core::types::parse_timestamp;

    fn block(index: u64, parents: Vec<BlockHash>) -> Block {
        Block {
            index,
            transactions: vec![],
            nonce: 0,
            parent_hashes: parents,
            timestamp: parse_timestamp("2024-05-02T08:30:00").unwrap(),
        }
    }

    #[test]
    fn export_carries_one_link_per_parent() {
        let mut dag = DagStore::new();
        let (a, _) = dag.insert(block(0, vec![])).unwrap();
        let (b, _) = dag.insert(block(1, vec![a.clone()])).unwrap();
        dag.insert(block(2, vec![a.clone(), b.clone()])).unwrap();

        let doc = NodeLinkDocument::from_store(&dag);
        assert!(doc.directed);
        assert!(!doc.multigraph);
        assert_eq!(doc.node_count(), 3);
        assert_eq!(doc.links.len(), 3);
    }

    #[test]
    fn document_round_trips_through_json() {
        let mut dag = DagStore::new();
        let (a, _) = dag.insert(block(0, vec![])).unwrap();
        dag.insert(block(1, vec![a])).unwrap();

        let doc = NodeLinkDocument::from_store(&dag);
        let text = serde_json::to_string(&doc).unwrap();
        let back: NodeLinkDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(back.node_count(), 2);
        assert_eq!(back.links.len(), 1);
    }

    #[test]
    fn topological_blocks_orders_ancestors_first() {
        let mut dag = DagStore::new();
        let (a, _) = dag.insert(block(0, vec![])).unwrap();
        let (b, _) = dag.insert(block(1, vec![a.clone()])).unwrap();
        dag.insert(block(2, vec![b])).unwrap();

        let doc = NodeLinkDocument::from_store(&dag);
        let order = doc.topological_blocks().unwrap();
        let indices: Vec<u64> = order.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn cyclic_document_is_rejected() {
        let b0 = block(0, vec![]);
        let b1 = block(1, vec![]);
        let doc = NodeLinkDocument {
            directed: true,
            multigraph: false,
            graph: serde_json::json!({}),
            nodes: vec![
                NodeLinkNode { id: BlockHash::new("x"), block: b0 },
                NodeLinkNode { id: BlockHash::new("y"), block: b1 },
            ],
            links: vec![
                NodeLinkEdge { source: BlockHash::new("x"), target: BlockHash::new("y") },
                NodeLinkEdge { source: BlockHash::new("y"), target: BlockHash::new("x") },
            ],
        };
        assert!(matches!(
            doc.topological_blocks().unwrap_err(),
            ChainError::CycleRejected
        ));
    }

    #[test]
    fn dangling_links_are_ignored() {
        let doc = NodeLinkDocument {
            directed: true,
            multigraph: false,
            graph: serde_json::json!({}),
            nodes: vec![NodeLinkNode {
                id: BlockHash::new("x"),
                block: block(0, vec![]),
            }],
            links: vec![NodeLinkEdge {
                source: BlockHash::new("x"),
                target: BlockHash::new("ghost"),
            }],
        };
        assert_eq!(doc.topological_blocks().unwrap().len(), 1);
    }
}
