//! Transaction API 模块 (只读)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/transactions", get(handler::list))
        .route("/api/transactions/{id}", get(handler::get_by_id))
}
