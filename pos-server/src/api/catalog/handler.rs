//! Catalog API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{Category, Discount, Food};
use shared::util::now_millis;

use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/catalog/categories - 菜品分类
pub async fn list_categories(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(state.catalog.list_categories().await?))
}

/// GET /api/catalog/categories/:id/foods - 分类下的菜品
pub async fn list_foods(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Food>>> {
    Ok(Json(state.catalog.list_foods_by_category(id).await?))
}

/// GET /api/catalog/discounts - 当前可用的整单折扣
pub async fn list_discounts(State(state): State<ServerState>) -> AppResult<Json<Vec<Discount>>> {
    Ok(Json(state.catalog.list_active_discounts(now_millis()).await?))
}
