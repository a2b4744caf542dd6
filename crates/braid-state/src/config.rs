use std::path::PathBuf;

use braid_core::constants::{
    BLOCK_SIZE_LIMIT_BYTES, DECIMAL_PLACES, GENESIS_ENDOWMENT_MINOR, MINIMAL_DEGREE,
    POOL_CAP_BYTES,
};
use braid_core::types::WalletId;

/// Tunables for one chain replica.
#[derive(Clone, Debug)]
pub struct ChainConfig {
    /// Wallet credited with the genesis endowment at cold start.
    pub genesis_wallet: WalletId,
    /// Minor units seeded to the genesis wallet.
    pub genesis_endowment: u64,
    pub decimal_places: u32,
    /// Confirmation threshold: in-degree at which a block's transactions
    /// are applied.
    pub minimal_degree: usize,
    /// Pooled bytes that trigger cutting a block.
    pub block_size_limit_bytes: usize,
    /// Hard cap on pooled bytes.
    pub pool_cap_bytes: usize,
    /// Snapshot file; `None` disables persistence (tests).
    pub snapshot_path: Option<PathBuf>,
}

impl ChainConfig {
    pub fn new(genesis_wallet: WalletId) -> Self {
        Self {
            genesis_wallet,
            genesis_endowment: GENESIS_ENDOWMENT_MINOR,
            decimal_places: DECIMAL_PLACES,
            minimal_degree: MINIMAL_DEGREE,
            block_size_limit_bytes: BLOCK_SIZE_LIMIT_BYTES,
            pool_cap_bytes: POOL_CAP_BYTES,
            snapshot_path: None,
        }
    }

    pub fn with_snapshot_path(mut self, path: PathBuf) -> Self {
        self.snapshot_path = Some(path);
        self
    }
}
