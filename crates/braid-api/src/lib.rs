//! HTTP surface for a braidnet node.
//!
//! All routes live under `/api/v1/<api_name>/`. The chain engine sits
//! behind one coarse read-write lock; handlers capture whatever they need
//! to send to peers while holding the lock, then gossip after releasing it.

pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use braid_state::ChainEngine;
use braid_sync::PeerClient;

pub use response::{ApiError, ApiResponse};

/// Shared state behind every handler.
pub struct ApiContext {
    pub chain: RwLock<ChainEngine>,
    pub peers: PeerClient,
    /// URL peers should use to reach this node; sent in reciprocal
    /// connects.
    pub own_url: String,
}

pub type SharedContext = Arc<ApiContext>;

/// Build the full router for `api_name`.
pub fn router(context: SharedContext, api_name: &str) -> Router {
    let prefix = format!("/api/v1/{api_name}");

    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        // Blockchain
        .route(
            &format!("{prefix}/unconfirmed_blocks/"),
            get(routes::blockchain::get_unconfirmed_blocks),
        )
        .route(
            &format!("{prefix}/block/{{block_hash}}/"),
            get(routes::blockchain::get_block_by_hash),
        )
        .route(&format!("{prefix}/dag/"), get(routes::blockchain::get_dag))
        // Transactions
        .route(
            &format!("{prefix}/transactions/post/"),
            post(routes::transactions::post_transaction),
        )
        .route(
            &format!("{prefix}/transactions/unconfirmed/"),
            get(routes::transactions::get_unconfirmed_transactions),
        )
        // Wallets
        .route(
            &format!("{prefix}/wallets/nonce/"),
            post(routes::wallets::get_wallet_nonce),
        )
        .route(
            &format!("{prefix}/wallets/balance/"),
            post(routes::wallets::get_wallet_balance),
        )
        // Nodes
        .route(
            &format!("{prefix}/nodes/neighbors/"),
            get(routes::nodes::get_neighbors),
        )
        .route(
            &format!("{prefix}/nodes/connect/"),
            post(routes::nodes::connect_to_neighbor),
        )
        .route(
            &format!("{prefix}/nodes/transaction/"),
            post(routes::nodes::receive_neighbor_transaction),
        )
        .route(
            &format!("{prefix}/nodes/block/"),
            post(routes::nodes::receive_neighbor_block),
        )
        .layer(cors)
        .with_state(context)
}
