//! Kitchen Queue API Handlers
//!
//! A stale action (table already served, paid or reset) is not an error:
//! it answers 200 with code `TableStale` and the table's current record.

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{ApiResponse, ErrorCode};
use shared::models::TableRecord;
use shared::order::TransitionOutcome;

use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/kitchen/queue - 后厨队列 (按下单时间升序)
pub async fn queue(State(state): State<ServerState>) -> AppResult<Json<Vec<TableRecord>>> {
    Ok(Json(state.kitchen().queue().await?))
}

/// POST /api/kitchen/:id/accept - 接单 (pending -> in_progress)
pub async fn accept(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Option<TableRecord>>> {
    let outcome = state.kitchen().accept_order(id).await?;
    into_response(&state, outcome).await
}

/// POST /api/kitchen/:id/prepared - 出餐 (serving -> order_ready)
pub async fn prepared(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<Option<TableRecord>>> {
    let outcome = state.kitchen().mark_prepared(id).await?;
    into_response(&state, outcome).await
}

async fn into_response(
    state: &ServerState,
    outcome: TransitionOutcome,
) -> AppResult<ApiResponse<Option<TableRecord>>> {
    match outcome {
        TransitionOutcome::Applied(record) => Ok(ApiResponse::success(Some(record))),
        TransitionOutcome::Stale { table_id, .. } => {
            let current = state.store.read(table_id).await?;
            Ok(ApiResponse::warning(ErrorCode::TableStale, current))
        }
    }
}
