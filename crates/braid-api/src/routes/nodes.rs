use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use braid_core::block::Block;
use braid_core::transaction::{Transaction, TransactionCreate};
use braid_core::types::now;
use braid_state::AddBlockOutcome;

use crate::response::{ApiError, ApiResponse};
use crate::routes::gossip_confirmed;
use crate::SharedContext;

#[derive(Debug, Serialize, Deserialize)]
pub struct Neighbor {
    pub address_url: String,
}

/// GET `nodes/neighbors/`
pub async fn get_neighbors(
    State(context): State<SharedContext>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let chain = context.chain.read().await;
    let neighbors = chain.neighbors().to_vec();
    Ok(Json(ApiResponse::new(
        format!("{} Neighbors.", neighbors.len()),
        neighbors,
    )))
}

/// POST `nodes/connect/` — the bootstrap handshake.
pub async fn connect_to_neighbor(
    State(context): State<SharedContext>,
    Json(neighbor): Json<Neighbor>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let address_url = perform_connect(&context, neighbor.address_url).await?;
    Ok(Json(ApiResponse::new(
        format!("Connected to neighbor {address_url}."),
        address_url,
    )))
}

/// The connect handshake, shared by the route above and startup
/// bootstrapping.
///
/// Fetch the peer's DAG and adopt it if strictly larger, union the peer's
/// neighbor list into ours, and if the peer is new, ask it to connect back
/// to us before recording it. Each peer HTTP call runs with the chain lock
/// released.
pub async fn perform_connect(
    context: &SharedContext,
    address_url: String,
) -> Result<String, ApiError> {
    if !address_url.starts_with("http") {
        return Err(ApiError::bad_request("Invalid neighbor URL."));
    }

    let peer_dag = context
        .peers
        .fetch_dag(&address_url)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    {
        let mut chain = context.chain.write().await;
        match chain.adopt(&peer_dag) {
            Ok(_) => {}
            // A malformed peer graph must not poison the handshake.
            Err(e) => warn!(neighbor = %address_url, error = %e, "peer DAG rejected"),
        }
    }

    match context.peers.fetch_neighbors(&address_url).await {
        Ok(their_neighbors) => {
            let mut chain = context.chain.write().await;
            chain.merge_neighbors(their_neighbors);
        }
        Err(e) => warn!(neighbor = %address_url, error = %e, "neighbor list fetch failed"),
    }

    let already_known = {
        let chain = context.chain.read().await;
        chain.has_neighbor(&address_url)
    };
    if !already_known {
        if let Err(e) = context
            .peers
            .send_connect(&address_url, &context.own_url)
            .await
        {
            warn!(neighbor = %address_url, error = %e, "reciprocal connect failed");
        }
        let mut chain = context.chain.write().await;
        chain.add_neighbor(address_url.clone());
    }

    Ok(address_url)
}

/// POST `nodes/transaction/` — inbound gossip.
///
/// Admission failures are logged, never surfaced: a peer relaying a
/// transaction we reject must not see an error.
pub async fn receive_neighbor_transaction(
    State(context): State<SharedContext>,
    Json(body): Json<TransactionCreate>,
) -> Result<Json<ApiResponse<Transaction>>, ApiError> {
    let tx = body.into_transaction(now());

    let outcome = {
        let mut chain = context.chain.write().await;
        let result = chain.submit_transaction(tx.clone());
        let neighbors = chain.neighbors().to_vec();
        (result, neighbors)
    };

    match outcome.0 {
        Ok(receipt) => {
            if let Some(event) = &receipt.block_event {
                gossip_confirmed(&context, outcome.1, event);
            }
        }
        Err(e) => warn!(error = %e, "neighbor transaction dropped"),
    }

    Ok(Json(ApiResponse::new(
        "Received neighbor transaction.",
        tx,
    )))
}

/// POST `nodes/block/` — inbound gossip.
///
/// Rejections (unknown parents, cycles) are logged and dropped. Blocks
/// that this insertion confirms are relayed onward.
pub async fn receive_neighbor_block(
    State(context): State<SharedContext>,
    Json(block): Json<Block>,
) -> Result<Json<ApiResponse<Block>>, ApiError> {
    let outcome = {
        let mut chain = context.chain.write().await;
        let result = chain.add_block(block.clone());
        let neighbors = chain.neighbors().to_vec();
        (result, neighbors)
    };

    match outcome.0 {
        Ok(AddBlockOutcome::Added(event)) => {
            if !event.abandoned.is_empty() {
                warn!(
                    abandoned = event.abandoned.len(),
                    "invalid parent blocks abandoned during confirmation"
                );
            }
            gossip_confirmed(&context, outcome.1, &event);
        }
        Ok(AddBlockOutcome::AlreadyKnown(_)) => {}
        Err(e) => warn!(error = %e, "neighbor block dropped"),
    }

    Ok(Json(ApiResponse::new("Received neighbor block.", block)))
}
