use axum::extract::{Path, State};
use axum::Json;

use braid_core::block::Block;
use braid_core::types::BlockHash;
use braid_dag::NodeLinkDocument;

use crate::response::{ApiError, ApiResponse};
use crate::SharedContext;

/// GET `unconfirmed_blocks/` — blocks with fewer than two confirmations.
pub async fn get_unconfirmed_blocks(
    State(context): State<SharedContext>,
) -> Result<Json<ApiResponse<Vec<Block>>>, ApiError> {
    let chain = context.chain.read().await;
    let blocks: Vec<Block> = chain.unconfirmed_blocks().into_iter().cloned().collect();
    Ok(Json(ApiResponse::new(
        format!("{} Unconfirmed blocks.", blocks.len()),
        blocks,
    )))
}

/// GET `block/{block_hash}/`
pub async fn get_block_by_hash(
    State(context): State<SharedContext>,
    Path(block_hash): Path<String>,
) -> Result<Json<ApiResponse<Block>>, ApiError> {
    let chain = context.chain.read().await;
    let block = chain
        .get_block(&BlockHash::new(block_hash))
        .cloned()
        .ok_or_else(|| ApiError::not_found("Block not found."))?;
    Ok(Json(ApiResponse::new("Block.", block)))
}

/// GET `dag/` — the whole DAG in node-link form.
pub async fn get_dag(
    State(context): State<SharedContext>,
) -> Result<Json<ApiResponse<NodeLinkDocument>>, ApiError> {
    let chain = context.chain.read().await;
    Ok(Json(ApiResponse::new("DAG.", chain.export_dag())))
}
