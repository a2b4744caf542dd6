use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use braid_core::error::ChainError;

/// Every success body: `{message, data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// Every error body: `{detail}` with the mapped HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl From<ChainError> for ApiError {
    fn from(e: ChainError) -> Self {
        let status = match &e {
            ChainError::InsufficientFunds { .. }
            | ChainError::BadNonce { .. }
            | ChainError::InvalidSignature
            | ChainError::UnknownWallet(_)
            | ChainError::PoolFull { .. }
            | ChainError::UnknownParent(_)
            | ChainError::CycleRejected
            | ChainError::InvalidNeighborUrl(_) => StatusCode::BAD_REQUEST,
            ChainError::BlockNotFound(_) => StatusCode::NOT_FOUND,
            ChainError::ParentInvalid(_)
            | ChainError::Snapshot(_)
            | ChainError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "detail": self.detail });
        (self.status, Json(body)).into_response()
    }
}
