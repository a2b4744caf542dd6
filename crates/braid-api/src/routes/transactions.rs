use axum::extract::State;
use axum::Json;

use braid_core::transaction::{Transaction, TransactionCreate};
use braid_core::types::now;

use crate::response::{ApiError, ApiResponse};
use crate::routes::gossip_confirmed;
use crate::SharedContext;

/// POST `transactions/post/` — wallet-originated submission.
///
/// The transaction is stamped, admitted, and then relayed to every
/// neighbor. Admission may cut a block; any blocks that confirms are
/// gossiped as well. All peer traffic happens after the lock is released.
pub async fn post_transaction(
    State(context): State<SharedContext>,
    Json(body): Json<TransactionCreate>,
) -> Result<Json<ApiResponse<Transaction>>, ApiError> {
    let tx = body.into_transaction(now());

    let (receipt, neighbors) = {
        let mut chain = context.chain.write().await;
        let receipt = chain.submit_transaction(tx)?;
        (receipt, chain.neighbors().to_vec())
    };

    if let Some(event) = &receipt.block_event {
        gossip_confirmed(&context, neighbors.clone(), event);
    }
    if !neighbors.is_empty() {
        let tx = receipt.transaction.clone();
        let context = context.clone();
        tokio::spawn(async move {
            context.peers.broadcast_transaction(&neighbors, &tx).await;
        });
    }

    Ok(Json(ApiResponse::new(
        "Transaction posted.",
        receipt.transaction,
    )))
}

/// GET `transactions/unconfirmed/` — current pool contents.
pub async fn get_unconfirmed_transactions(
    State(context): State<SharedContext>,
) -> Result<Json<ApiResponse<Vec<Transaction>>>, ApiError> {
    let chain = context.chain.read().await;
    let txs = chain.unconfirmed_transactions().to_vec();
    Ok(Json(ApiResponse::new(
        format!("{} Unconfirmed transactions.", txs.len()),
        txs,
    )))
}
