//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单耦合接口（状态推进 / 当前单 / 加客人 / 结账清场）

pub mod health;
pub mod orders;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Build the full router with state and middleware
pub fn create_router(state: ServerState) -> Router {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(orders::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
