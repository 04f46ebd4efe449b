//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`tables`] - 桌台管理 + 取餐跟踪
//! - [`kitchen`] - 后厨队列
//! - [`transactions`] - 交易记录查询
//! - [`catalog`] - 菜品目录 (只读)
//! - [`staff`] - 员工列表 (只读)

pub mod catalog;
pub mod health;
pub mod kitchen;
pub mod staff;
pub mod tables;
pub mod transactions;

use std::time::Duration;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());

    response
}

/// 所有 API 路由 (未绑定 state)
pub fn routes() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(tables::router())
        .merge(kitchen::router())
        .merge(transactions::router())
        .merge(catalog::router())
        .merge(staff::router())
}

/// 完整应用: 路由 + state + 中间件
pub fn build_app(state: ServerState, request_timeout: Duration) -> Router {
    routes()
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
}
