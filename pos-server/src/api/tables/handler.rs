//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::models::{DiningTableCreate, DiningTableUpdate, TableRecord};

use crate::core::ServerState;
use crate::pending::{PendingDisplay, PendingOrderTracker, TrackerView};
use crate::utils::{AppError, AppResult};

/// GET /api/tables - 获取所有桌台
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<TableRecord>>> {
    Ok(Json(state.tables().list_tables().await?))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<TableRecord>> {
    Ok(Json(state.tables().create_table(&payload.name).await?))
}

/// PUT /api/tables/:id - 重命名桌台
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<TableRecord>> {
    let tables = state.tables();
    let record = match payload.name {
        Some(name) => tables.rename_table(id, &name).await?,
        None => tables.get_table(id).await?,
    };
    Ok(Json(record))
}

/// DELETE /api/tables/:id - 删除桌台 (占用中的桌台不可删除)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.tables().delete_table(id).await?;
    Ok(Json(true))
}

/// POST /api/tables/:id/reset - 清台 (任意状态)
pub async fn reset(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TableRecord>> {
    Ok(Json(state.tables().reset_table(id).await?))
}

/// 取餐跟踪状态
#[derive(Debug, Serialize)]
pub struct PendingStatusResponse {
    pub table_id: i64,
    /// 桌台已清空 (前端应跳转离开)
    pub cleared: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<PendingDisplay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableRecord>,
}

/// GET /api/tables/:id/status - 取餐跟踪显示状态
pub async fn status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PendingStatusResponse>> {
    let mut tracker = PendingOrderTracker::new(id, state.store.clone());
    let response = match tracker.refresh().await? {
        TrackerView::Tracking { record, display } => PendingStatusResponse {
            table_id: id,
            cleared: false,
            display: Some(display),
            table: Some(record),
        },
        TrackerView::AlreadyCleared => PendingStatusResponse {
            table_id: id,
            cleared: true,
            display: None,
            table: None,
        },
        TrackerView::Disconnected => {
            return Err(AppError::store_unavailable("Table store disconnected"));
        }
    };
    Ok(Json(response))
}

/// POST /api/tables/:id/served - 出餐完成 (order_ready -> available)
pub async fn served(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TableRecord>> {
    let mut tracker = PendingOrderTracker::new(id, state.store.clone());
    let served = tracker.mark_as_served().await?;
    Ok(Json(served.record))
}
