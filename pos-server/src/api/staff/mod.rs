//! Staff API 模块 (只读)

use axum::{Json, Router, extract::State, routing::get};
use shared::models::StaffMember;

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/staff", get(list))
}

/// GET /api/staff - 员工列表 (不含 PIN)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<StaffMember>>> {
    Ok(Json(state.roster.list_staff().await?))
}
