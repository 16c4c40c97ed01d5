//! Order API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use shared::order::{Customer, Order, OrderOrigin};
use validator::Validate;

use crate::core::ServerState;
use crate::orders::TableDetail;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// 状态推进请求
///
/// `tableNumber` 与 `customerName` 二选一，对应堂食与线上两类数据集
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangedRequest {
    #[serde(default)]
    pub table_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[validate(length(min = 1))]
    pub order_id: String,
    #[validate(length(min = 1))]
    pub status: String,
    #[validate(length(min = 1))]
    pub session_key: String,
    #[serde(default)]
    pub batch_id: Option<i64>,
}

/// 推进订单状态
///
/// 与实时路径的 `sendOrder` 走同一个协调器
pub async fn status_changed(
    State(state): State<ServerState>,
    Json(payload): Json<StatusChangedRequest>,
) -> AppResult<Json<AppResponse<()>>> {
    payload.validate()?;
    let origin = match (&payload.table_number, &payload.customer_name) {
        (Some(n), _) => OrderOrigin::table(n.clone()),
        (None, Some(name)) => OrderOrigin::online(name.clone()),
        (None, None) => {
            return Err(AppError::validation(
                "Either tableNumber or customerName is required",
            ));
        }
    };

    state
        .lifecycle
        .changed_status(
            &origin,
            &payload.order_id,
            &payload.status,
            &payload.session_key,
            payload.batch_id,
        )
        .await?;
    Ok(ok(()))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CurrentOrderRequest {
    #[validate(length(min = 1))]
    pub table_number: String,
}

/// 桌面当前聚合视图（草稿、首单、批次、已完成）
pub async fn current_order(
    State(state): State<ServerState>,
    Json(payload): Json<CurrentOrderRequest>,
) -> AppResult<Json<AppResponse<TableDetail>>> {
    payload.validate()?;
    let progress = state
        .lifecycle
        .find_table_order(&payload.table_number)
        .await?
        .map(|o| o.progress_status);
    let detail = state.lifecycle.table_detail(&payload.table_number, progress);
    Ok(ok(detail))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCustomerRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    pub customer: Customer,
}

/// 加客人；超出座位数返回 CapacityExceeded
pub async fn add_customer(
    State(state): State<ServerState>,
    Json(payload): Json<AddCustomerRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    payload.validate()?;
    let order = state
        .lifecycle
        .add_customer(&payload.order_id, payload.customer)
        .await?;
    Ok(ok(order))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HandleOrderCompletedRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
}

/// 结账清场：删除该桌全部临时键，桌台回 empty
pub async fn handle_order_completed(
    State(state): State<ServerState>,
    Json(payload): Json<HandleOrderCompletedRequest>,
) -> AppResult<Json<AppResponse<()>>> {
    payload.validate()?;
    state.lifecycle.settle_order(&payload.order_id).await?;
    Ok(ok(()))
}
