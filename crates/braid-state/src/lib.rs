pub mod config;
pub mod engine;
pub mod ledger;
pub mod pool;
pub mod snapshot;

pub use config::ChainConfig;
pub use engine::{replay_document, AddBlockOutcome, BlockEvent, ChainEngine, SubmitReceipt};
pub use ledger::LedgerState;
pub use pool::TxPool;
