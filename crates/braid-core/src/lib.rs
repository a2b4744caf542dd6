pub mod block;
pub mod constants;
pub mod error;
pub mod transaction;
pub mod types;

pub use block::Block;
pub use constants::*;
pub use error::ChainError;
pub use transaction::{signing_preimage, Transaction, TransactionCreate};
pub use types::{
    format_timestamp, now, parse_timestamp, Amount, BlockHash, Nonce, SignatureB64, Timestamp,
    WalletId,
};
