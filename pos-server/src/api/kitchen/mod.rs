//! Kitchen Queue API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/kitchen", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/queue", get(handler::queue))
        .route("/{id}/accept", post(handler::accept))
        .route("/{id}/prepared", post(handler::prepared))
}
