pub mod client;

pub use client::{PeerClient, SyncError};
