//! ─── Braidnet protocol constants ────────────────────────────────────────────
//!
//! Balances are integers in minor units; the display value divides by
//! 10^DECIMAL_PLACES. The genesis endowment is the only source of funds —
//! every later balance change is a transfer.

/// Minor units credited to the genesis wallet at cold start (1000.00 at the
/// default two decimal places). Never minted again.
pub const GENESIS_ENDOWMENT_MINOR: u64 = 100_000;

/// Decimal places between minor units and display units.
pub const DECIMAL_PLACES: u32 = 2;

/// In-degree at which a block's transactions are applied to the ledger.
/// A block is confirmed the first time this many later blocks name it as a
/// parent.
pub const MINIMAL_DEGREE: usize = 3;

/// Pool size (approximate in-memory bytes) that triggers cutting a block.
pub const BLOCK_SIZE_LIMIT_BYTES: usize = 1024 * 1024;

/// Hard cap on pooled transaction bytes. Admission fails once reached, so a
/// stalled block builder cannot grow the pool without bound.
pub const POOL_CAP_BYTES: usize = 8 * 1024 * 1024;

/// In-degree below which a block shows up in the `unconfirmed_blocks` view.
pub const UNCONFIRMED_VIEW_DEGREE: usize = 2;

/// Timeout for any single HTTP call to a neighbor.
pub const PEER_TIMEOUT_SECS: u64 = 5;

/// Reserved block field; always zero (no proof-of-work in this protocol).
pub const BLOCK_NONCE: u64 = 0;
