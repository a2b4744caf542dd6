//! Disk snapshots of the DAG.
//!
//! A snapshot is the node-link JSON document, written pretty-printed after
//! each block confirmation. Loading never brings ledger state with it —
//! balances and nonces are always rebuilt by replay, so the file carries
//! only the graph.

use std::fs;
use std::path::Path;

use braid_core::error::ChainError;
use braid_dag::{DagStore, NodeLinkDocument};

/// Write the DAG to `path`. Written to a sibling temp file first, then
/// renamed, so a crash mid-write cannot leave a truncated snapshot.
pub fn save(path: &Path, dag: &DagStore) -> Result<(), ChainError> {
    let doc = NodeLinkDocument::from_store(dag);
    let json = serde_json::to_vec_pretty(&doc)
        .map_err(|e| ChainError::Serialization(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &json).map_err(|e| ChainError::Snapshot(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| ChainError::Snapshot(e.to_string()))?;
    Ok(())
}

/// Read a snapshot document, `Ok(None)` when no file exists yet.
pub fn load(path: &Path) -> Result<Option<NodeLinkDocument>, ChainError> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(|e| ChainError::Snapshot(e.to_string()))?;
    let doc = serde_json::from_slice(&bytes)
        .map_err(|e| ChainError::Serialization(e.to_string()))?;
    Ok(Some(doc))
}
