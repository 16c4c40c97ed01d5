//! Durable order store seam
//!
//! 持久层是外部协作者，这里只定义协议（findOrder / updateOrder /
//! createOrder 加一个按桌查询）。内存实现用于测试与单机运行。

use async_trait::async_trait;
use dashmap::DashMap;
use shared::order::{Order, OrderPatch, PaymentStatus};
use uuid::Uuid;

use crate::utils::{AppError, AppResult, now_millis};

/// Durable order persistence contract
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// 按 id 查询
    async fn find_order(&self, id: &str) -> AppResult<Option<Order>>;

    /// 按桌查询最近一笔未支付订单
    async fn find_unpaid_by_table(&self, table_id: &str) -> AppResult<Option<Order>>;

    /// 部分更新；订单不存在返回 NotFound
    async fn update_order(&self, id: &str, patch: OrderPatch) -> AppResult<Order>;

    /// 创建
    async fn create_order(&self, doc: Order) -> AppResult<Order>;
}

/// In-memory durable store (tests / single-node runs)
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: DashMap<String, Order>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 测试便捷构造：预置一笔订单并返回其 id
    pub fn seed(&self, mut order: Order) -> String {
        if order.id.is_empty() {
            order.id = Uuid::new_v4().to_string();
        }
        let id = order.id.clone();
        self.orders.insert(id.clone(), order);
        id
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn find_order(&self, id: &str) -> AppResult<Option<Order>> {
        Ok(self.orders.get(id).map(|o| o.clone()))
    }

    async fn find_unpaid_by_table(&self, table_id: &str) -> AppResult<Option<Order>> {
        let mut latest: Option<Order> = None;
        for entry in self.orders.iter() {
            let order = entry.value();
            if order.table_id == table_id && order.payment_status == PaymentStatus::Unpaid {
                match &latest {
                    Some(cur) if cur.created_at >= order.created_at => {}
                    _ => latest = Some(order.clone()),
                }
            }
        }
        Ok(latest)
    }

    async fn update_order(&self, id: &str, patch: OrderPatch) -> AppResult<Order> {
        let mut order = self
            .orders
            .get_mut(id)
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

        if let Some(items) = patch.order_items {
            order.order_items = items;
        }
        if let Some(total) = patch.total_price {
            order.total_price = total;
        }
        if let Some(status) = patch.progress_status {
            order.progress_status = status;
        }
        if let Some(status) = patch.payment_status {
            order.payment_status = status;
        }
        if let Some(customers) = patch.customers {
            order.customers = customers;
        }
        order.updated_at = now_millis();
        Ok(order.clone())
    }

    async fn create_order(&self, mut doc: Order) -> AppResult<Order> {
        if doc.id.is_empty() {
            doc.id = Uuid::new_v4().to_string();
        }
        self.orders.insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }
}
