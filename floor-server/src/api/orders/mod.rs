//! Order API Module
//!
//! 持久订单面向外部的耦合接口。`status-changed` 与实时路径调用同
//! 一个生命周期协调器，效果必须一致。

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // 状态推进（REST 侧入口，与实时 sendOrder 同一协调器）
        .route("/status-changed", post(handler::status_changed))
        // 桌面当前视图
        .route("/current-order", post(handler::current_order))
        // 加客人（按座位数校验）
        .route("/add-customer", post(handler::add_customer))
        // 结账清场
        .route("/handle-order-completed", post(handler::handle_order_completed))
}
