//! Transaction API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::Transaction;

use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/transactions - 交易记录 (最新在前)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Transaction>>> {
    Ok(Json(state.ledger.list().await?))
}

/// GET /api/transactions/:id - 单笔交易
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Transaction>> {
    Ok(Json(state.ledger.get(id).await?))
}
