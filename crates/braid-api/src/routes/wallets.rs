use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use braid_core::types::WalletId;

use crate::response::{ApiError, ApiResponse};
use crate::SharedContext;

#[derive(Debug, Deserialize)]
pub struct PublicKeyBody {
    pub public_key: WalletId,
}

/// POST `wallets/nonce/` — the nonce a wallet should build on next
/// (pending pool view, falling back to the confirmed nonce; 0 when
/// unseen).
pub async fn get_wallet_nonce(
    State(context): State<SharedContext>,
    Json(body): Json<PublicKeyBody>,
) -> Result<Json<ApiResponse<u64>>, ApiError> {
    let chain = context.chain.read().await;
    let nonce = chain.wallet_nonce(&body.public_key);
    Ok(Json(ApiResponse::new("Wallet nonce.", nonce)))
}

/// POST `wallets/balance/` — confirmed display balance, 0 when unseen.
pub async fn get_wallet_balance(
    State(context): State<SharedContext>,
    Json(body): Json<PublicKeyBody>,
) -> Result<Json<ApiResponse<f64>>, ApiError> {
    let chain = context.chain.read().await;
    let balance = chain.balance(&body.public_key);
    Ok(Json(ApiResponse::new("Wallet balance.", balance)))
}
