use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    // ── Transaction errors ───────────────────────────────────────────────────
    #[error("insufficient funds: need {need} minor units, have {have}")]
    InsufficientFunds { need: u64, have: u64 },

    #[error("invalid nonce: expected {expected}, got {got}")]
    BadNonce { expected: u64, got: u64 },

    #[error("invalid signature")]
    InvalidSignature,

    #[error("unknown wallet: {0}")]
    UnknownWallet(String),

    #[error("transaction pool is full ({capacity_bytes} bytes)")]
    PoolFull { capacity_bytes: usize },

    // ── DAG errors ───────────────────────────────────────────────────────────
    #[error("unknown parent block: {0}")]
    UnknownParent(String),

    #[error("block would introduce a cycle")]
    CycleRejected,

    #[error("parent block {0} failed confirmation and was abandoned")]
    ParentInvalid(String),

    #[error("block not found: {0}")]
    BlockNotFound(String),

    // ── Peers ────────────────────────────────────────────────────────────────
    #[error("invalid neighbor URL: {0}")]
    InvalidNeighborUrl(String),

    // ── Persistence ──────────────────────────────────────────────────────────
    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
