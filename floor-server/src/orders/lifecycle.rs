//! Order lifecycle coordinator
//!
//! progressStatus 状态机的唯一入口，也是唯一写持久层的组件。
//! 实时分发器与 REST 接口都调到这里，效果必须一致。
//!
//! | target | 效果 |
//! |--------|------|
//! | `draft` | 清空首单快照与持久单的 items/total，回到 draft |
//! | `only-processing` | 仅持久状态 → processing，不路由 |
//! | `pending_confirmation` | 仅持久状态 → pending_confirmation |
//! | `processing` | 路由首单/批次/线上记录的 items，持久状态 → processing |
//! | `completed` | no-op；真正的完成只由厨房路由的 all-done 信号驱动 |

use std::sync::Arc;

use serde_json::json;
use shared::message::ServerEvent;
use shared::order::{
    Batch, Customer, OrderDraft, OrderItem, OrderOrigin, OrderPatch, PaymentStatus,
    ProgressStatus, StatusTarget, TableStatus, sanitize_items,
};
use tracing::{info, warn};

use super::kitchen::{CompletionOutcome, KitchenRouter};
use super::registry::TableRegistry;
use super::store::OrderStore;
use super::TableDetail;
use crate::hub::{BroadcastHub, groups::STAFF_GROUP, table_group};
use crate::session::{Keys, SessionStore};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct LifecycleCoordinator {
    sessions: Arc<SessionStore>,
    keys: Keys,
    hub: Arc<BroadcastHub>,
    orders: Arc<dyn OrderStore>,
    tables: Arc<dyn TableRegistry>,
    router: KitchenRouter,
}

impl LifecycleCoordinator {
    pub fn new(
        sessions: Arc<SessionStore>,
        keys: Keys,
        hub: Arc<BroadcastHub>,
        orders: Arc<dyn OrderStore>,
        tables: Arc<dyn TableRegistry>,
    ) -> Self {
        let router = KitchenRouter::new(sessions.clone(), keys, hub.clone());
        Self {
            sessions,
            keys,
            hub,
            orders,
            tables,
            router,
        }
    }

    /// 推进订单状态
    ///
    /// 未知 target 在任何副作用之前以 InvalidStatus 拒绝；
    /// `processing` 时派生键上没有会话则以 OrderNotFound 拒绝。
    pub async fn changed_status(
        &self,
        origin: &OrderOrigin,
        order_id: &str,
        target: &str,
        session_key: &str,
        batch_id: Option<i64>,
    ) -> AppResult<()> {
        let target = StatusTarget::parse(target)
            .ok_or_else(|| AppError::invalid_status(format!("Unknown status '{}'", target)))?;
        info!(order_id, target = %target, session_key, ?batch_id, "Status change");

        match target {
            StatusTarget::Draft => self.back_to_draft(origin, order_id, session_key).await,
            StatusTarget::OnlyProcessing => {
                self.write_progress(order_id, ProgressStatus::Processing)
                    .await?;
                self.notify_status(origin, order_id, ProgressStatus::Processing);
                Ok(())
            }
            StatusTarget::PendingConfirmation => {
                self.write_progress(order_id, ProgressStatus::PendingConfirmation)
                    .await
            }
            StatusTarget::Processing => {
                self.into_processing(origin, order_id, session_key, batch_id)
                    .await
            }
            // 完成只由厨房的 all-done 信号驱动
            StatusTarget::Completed => Ok(()),
        }
    }

    /// 完成一条工单；全部做完时落库并广播，恰好一次
    pub async fn complete_item(
        &self,
        area: &str,
        menu_item_id: &str,
        origin: &OrderOrigin,
        batch_id: Option<i64>,
        data_key: &str,
    ) -> AppResult<CompletionOutcome> {
        let outcome = self
            .router
            .complete_item(area, menu_item_id, origin, batch_id, data_key);

        if let OrderOrigin::Table { table_number } = origin {
            let detail = self.table_detail(table_number, None);
            self.hub.publish(STAFF_GROUP, ServerEvent::DataTable, &detail);
        }

        // removed 守卫避免对已清空的范围重复触发完成
        if outcome.all_done && outcome.removed.is_some() {
            self.complete_origin(origin).await?;
        }
        Ok(outcome)
    }

    /// 支付完成：持久单 → paid，桌台 → cleaning
    pub async fn order_paid(&self, order_id: &str) -> AppResult<()> {
        let patch = OrderPatch {
            payment_status: Some(PaymentStatus::Paid),
            ..Default::default()
        };
        let order = self.orders.update_order(order_id, patch).await?;

        let table = self
            .tables
            .set_status(&order.table_id, TableStatus::Cleaning)
            .await?;
        info!(order_id, table = %table.table_number, "Order paid, table awaiting cleanup");

        let payload = json!({ "orderId": order.id, "paymentStatus": order.payment_status });
        self.hub.publish(
            &table_group(&table.table_number),
            ServerEvent::OrderStatusChanged,
            &payload,
        );
        self.hub.publish(
            STAFF_GROUP,
            ServerEvent::TableStatusChanged,
            &json!({ "tableNumber": table.table_number, "status": table.status }),
        );
        Ok(())
    }

    /// 结账清场：删光该桌的临时键，桌台回 empty
    pub async fn settle_order(&self, order_id: &str) -> AppResult<()> {
        let order = self
            .orders
            .find_order(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;
        let table = self
            .tables
            .find_by_id(&order.table_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Table {} not found", order.table_id)))?;

        let n = &table.table_number;
        self.sessions.delete(&self.keys.table_session(n));
        self.sessions.delete(&self.keys.first_order(n));
        self.sessions.delete(&self.keys.batch_orders(n));
        self.sessions
            .delete(&self.keys.completion(&OrderOrigin::table(n.clone())));

        self.tables.set_current_order(&table.id, None).await?;
        let table = self.tables.set_status(&table.id, TableStatus::Empty).await?;
        info!(order_id, table = %table.table_number, "Order settled, table cleared");

        self.hub.publish(
            STAFF_GROUP,
            ServerEvent::TableStatusChanged,
            &json!({ "tableNumber": table.table_number, "status": table.status }),
        );
        self.hub.publish(
            STAFF_GROUP,
            ServerEvent::DataTableUpdated,
            &self.table_detail(&table.table_number, None),
        );
        Ok(())
    }

    /// 加客人，按座位数校验
    pub async fn add_customer(
        &self,
        order_id: &str,
        customer: Customer,
    ) -> AppResult<shared::order::Order> {
        let order = self
            .orders
            .find_order(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;
        let table = self
            .tables
            .find_by_id(&order.table_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Table {} not found", order.table_id)))?;

        // 已在桌上的注册用户直接返回
        if let Some(user_id) = &customer.user_id
            && order
                .customers
                .iter()
                .any(|c| c.user_id.as_deref() == Some(user_id))
        {
            return Ok(order);
        }

        if order.customers.len() >= table.seats as usize {
            return Err(AppError::CapacityExceeded { seats: table.seats });
        }

        let mut customers = order.customers.clone();
        customers.push(customer);
        let updated = self
            .orders
            .update_order(
                order_id,
                OrderPatch {
                    customers: Some(customers),
                    ..Default::default()
                },
            )
            .await?;

        self.hub.publish(
            &table_group(&table.table_number),
            ServerEvent::OrderUpdated,
            &updated,
        );
        Ok(updated)
    }

    /// staff 确认：把待确认的 items/total 并入持久单
    pub async fn confirm_items(
        &self,
        key: &str,
        items: Vec<OrderItem>,
        price: i64,
    ) -> AppResult<()> {
        let items = sanitize_items(items);
        // 首单和加单批次两种 pending 键都指向同一张桌的持久单
        let table_number = key
            .strip_prefix("first_order_")
            .or_else(|| key.strip_prefix("batch_orders_"));
        let Some(table_number) = table_number else {
            // 线上单无持久 merge 目标，确认只摘账本
            return Ok(());
        };

        let Some(order) = self.find_table_order(table_number).await? else {
            warn!(key, "No open order to merge confirmed items into");
            return Ok(());
        };

        let mut order_items = order.order_items.clone();
        order_items.extend(items);
        let updated = self
            .orders
            .update_order(
                &order.id,
                OrderPatch {
                    order_items: Some(order_items),
                    total_price: Some(order.total_price + price),
                    ..Default::default()
                },
            )
            .await?;

        self.hub.publish(
            &table_group(table_number),
            ServerEvent::OrderUpdated,
            &updated,
        );
        self.hub.publish(
            STAFF_GROUP,
            ServerEvent::DataTableUpdated,
            &self.table_detail(table_number, Some(updated.progress_status)),
        );
        Ok(())
    }

    /// staff 取消：带批次删该批，否则把首单范围打回 draft
    pub async fn cancel_pending(
        &self,
        key: &str,
        batch_id: Option<i64>,
        key_tb: &str,
    ) -> AppResult<()> {
        let table_number = key_tb.strip_prefix("table_").unwrap_or(key_tb);

        if let Some(batch_id) = batch_id {
            let (batches, _) = self.sessions.update(
                &self.keys.batch_orders(table_number),
                |batches: &mut Vec<Batch>| batches.retain(|b| b.batch_id != batch_id),
            );
            self.hub.publish(
                &table_group(table_number),
                ServerEvent::AddOrders,
                &batches,
            );
        } else if let Some(order) = self.find_table_order(table_number).await? {
            self.back_to_draft(&OrderOrigin::table(table_number), &order.id, key)
                .await?;
        } else {
            self.sessions
                .set(&self.keys.pending_scope(key), &OrderDraft::empty());
        }

        self.hub.publish(
            STAFF_GROUP,
            ServerEvent::DataTableUpdated,
            &self.table_detail(table_number, None),
        );
        Ok(())
    }

    /// staff 聚合视图
    pub fn table_detail(
        &self,
        table_number: &str,
        progress_status: Option<ProgressStatus>,
    ) -> TableDetail {
        TableDetail {
            table_number: table_number.to_string(),
            current_order: self
                .sessions
                .get(&self.keys.table_session(table_number))
                .unwrap_or_default(),
            first_order: self
                .sessions
                .get(&self.keys.first_order(table_number))
                .unwrap_or_default(),
            batches: self
                .sessions
                .get(&self.keys.batch_orders(table_number))
                .unwrap_or_default(),
            completed_items: self
                .sessions
                .get(&self.keys.completion(&OrderOrigin::table(table_number)))
                .unwrap_or_default(),
            progress_status,
        }
    }

    /// 该桌当前未支付的持久单
    pub async fn find_table_order(
        &self,
        table_number: &str,
    ) -> AppResult<Option<shared::order::Order>> {
        let Some(table) = self.tables.find_by_number(table_number).await? else {
            return Ok(None);
        };
        self.orders.find_unpaid_by_table(&table.id).await
    }

    // ========== 内部流转 ==========

    async fn back_to_draft(
        &self,
        origin: &OrderOrigin,
        order_id: &str,
        session_key: &str,
    ) -> AppResult<()> {
        self.sessions
            .set(&self.keys.pending_scope(session_key), &OrderDraft::empty());
        self.orders
            .update_order(
                order_id,
                OrderPatch {
                    order_items: Some(vec![]),
                    total_price: Some(0),
                    progress_status: Some(ProgressStatus::Draft),
                    ..Default::default()
                },
            )
            .await?;

        if let Some(table_number) = origin.table_number() {
            self.hub.publish(
                &table_group(table_number),
                ServerEvent::FirstOrder,
                &OrderDraft::empty(),
            );
        }
        self.notify_status(origin, order_id, ProgressStatus::Draft);
        Ok(())
    }

    /// 桌面源的状态变更播给全桌
    fn notify_status(&self, origin: &OrderOrigin, order_id: &str, status: ProgressStatus) {
        if let Some(table_number) = origin.table_number() {
            self.hub.publish(
                &table_group(table_number),
                ServerEvent::OrderStatusChanged,
                &json!({ "orderId": order_id, "progressStatus": status }),
            );
        }
    }

    async fn into_processing(
        &self,
        origin: &OrderOrigin,
        order_id: &str,
        session_key: &str,
        batch_id: Option<i64>,
    ) -> AppResult<()> {
        match origin {
            OrderOrigin::Table { table_number } => {
                let items = if let Some(batch_id) = batch_id {
                    let batches: Vec<Batch> = self
                        .sessions
                        .get(&self.keys.batch_orders(table_number))
                        .ok_or_else(|| {
                            AppError::not_found(format!("No batches for key {}", session_key))
                        })?;
                    batches
                        .into_iter()
                        .find(|b| b.batch_id == batch_id)
                        .ok_or_else(|| {
                            AppError::not_found(format!("Batch {} not found", batch_id))
                        })?
                        .order_items
                } else {
                    let first: OrderDraft = self
                        .sessions
                        .get(&self.keys.pending_scope(session_key))
                        .ok_or_else(|| {
                            AppError::not_found(format!("No session at key {}", session_key))
                        })?;
                    first.order_items
                };

                self.router.route_items(items, origin, session_key, batch_id);
                self.write_progress(order_id, ProgressStatus::Processing)
                    .await?;
                self.hub.publish(
                    &table_group(table_number),
                    ServerEvent::CurrentOrderProcessing,
                    &json!({ "orderId": order_id, "progressStatus": ProgressStatus::Processing }),
                );
                self.notify_status(origin, order_id, ProgressStatus::Processing);
                self.hub.publish(
                    STAFF_GROUP,
                    ServerEvent::DataTableUpdated,
                    &self.table_detail(table_number, Some(ProgressStatus::Processing)),
                );
                Ok(())
            }
            OrderOrigin::Online { customer_name } => {
                let pre_order_id = session_key
                    .strip_prefix("pre-order:")
                    .unwrap_or(session_key);
                let record = self
                    .sessions
                    .get(&self.keys.pre_order(pre_order_id))
                    .ok_or_else(|| {
                        AppError::not_found(format!("No session at key {}", session_key))
                    })?;

                self.router
                    .route_items(record.order_items.clone(), origin, session_key, batch_id);
                self.hub.publish(
                    STAFF_GROUP,
                    ServerEvent::DataTableUpdated,
                    &json!({ "customerName": customer_name, "preOrder": record }),
                );
                Ok(())
            }
        }
    }

    async fn complete_origin(&self, origin: &OrderOrigin) -> AppResult<()> {
        match origin {
            OrderOrigin::Table { table_number } => {
                let Some(order) = self.find_table_order(table_number).await? else {
                    warn!(table = %table_number, "All items done but no open order found");
                    return Ok(());
                };
                if order.progress_status == ProgressStatus::Completed {
                    return Ok(());
                }
                self.write_progress(&order.id, ProgressStatus::Completed)
                    .await?;

                let payload =
                    json!({ "orderId": order.id, "progressStatus": ProgressStatus::Completed });
                self.hub.publish(
                    &table_group(table_number),
                    ServerEvent::OrderStatusChanged,
                    &payload,
                );
                self.hub
                    .publish(STAFF_GROUP, ServerEvent::OrderStatusChanged, &payload);
            }
            OrderOrigin::Online { customer_name } => {
                self.hub.publish(
                    STAFF_GROUP,
                    ServerEvent::OrderStatusChanged,
                    &json!({ "customerName": customer_name, "progressStatus": ProgressStatus::Completed }),
                );
            }
        }
        Ok(())
    }

    async fn write_progress(&self, order_id: &str, status: ProgressStatus) -> AppResult<()> {
        self.orders
            .update_order(order_id, OrderPatch::progress(status))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::orders::registry::InMemoryTableRegistry;
    use crate::orders::store::InMemoryOrderStore;
    use shared::order::Order;

    pub(crate) struct Fixture {
        pub coordinator: LifecycleCoordinator,
        pub sessions: Arc<SessionStore>,
        pub keys: Keys,
        pub hub: Arc<BroadcastHub>,
        pub orders: Arc<InMemoryOrderStore>,
        pub tables: Arc<InMemoryTableRegistry>,
    }

    pub(crate) fn fixture() -> Fixture {
        let sessions = Arc::new(SessionStore::new());
        let keys = Keys::default();
        let hub = Arc::new(BroadcastHub::new());
        let orders = Arc::new(InMemoryOrderStore::new());
        let tables = Arc::new(InMemoryTableRegistry::new());
        let coordinator = LifecycleCoordinator::new(
            sessions.clone(),
            keys,
            hub.clone(),
            orders.clone(),
            tables.clone(),
        );
        Fixture {
            coordinator,
            sessions,
            keys,
            hub,
            orders,
            tables,
        }
    }

    pub(crate) fn item(id: &str, area: &str, quantity: i64) -> OrderItem {
        OrderItem {
            menu_item_id: id.to_string(),
            name: id.to_string(),
            quantity,
            variant: None,
            toppings: vec![],
            note: None,
            kitchen_area: Some(area.to_string()),
        }
    }

    #[tokio::test]
    async fn test_unknown_status_rejected_before_any_mutation() {
        let fx = fixture();
        fx.tables.seed("t1", "12", 4);
        let order_id = fx.orders.seed(Order::new("", "t1"));

        let err = fx
            .coordinator
            .changed_status(
                &OrderOrigin::table("12"),
                &order_id,
                "unknown",
                "first_order_12",
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStatus(_)));

        let order = fx.orders.find_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.progress_status, ProgressStatus::Draft);
        assert!(!fx.sessions.exists(&fx.keys.first_order("12")));
    }

    #[tokio::test]
    async fn test_processing_without_session_is_not_found() {
        let fx = fixture();
        fx.tables.seed("t1", "12", 4);
        let order_id = fx.orders.seed(Order::new("", "t1"));

        let err = fx
            .coordinator
            .changed_status(
                &OrderOrigin::table("12"),
                &order_id,
                "processing",
                "first_order_12",
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_processing_routes_first_order_and_writes_status() {
        let fx = fixture();
        fx.tables.seed("t1", "12", 4);
        let order_id = fx.orders.seed(Order::new("", "t1"));
        fx.sessions.set(
            &fx.keys.first_order("12"),
            &OrderDraft::new(vec![item("m1", "grill", 2)], 20000),
        );

        fx.coordinator
            .changed_status(
                &OrderOrigin::table("12"),
                &order_id,
                "processing",
                "first_order_12",
                None,
            )
            .await
            .unwrap();

        let order = fx.orders.find_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.progress_status, ProgressStatus::Processing);
        let queue: Vec<shared::order::KitchenTicket> =
            fx.sessions.get(&fx.keys.kitchen_queue("grill")).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].origin_key, "first_order_12");
    }

    #[tokio::test]
    async fn test_completing_last_item_marks_durable_order_once() {
        let fx = fixture();
        fx.tables.seed("t1", "12", 4);
        let mut order = Order::new("", "t1");
        order.progress_status = ProgressStatus::Processing;
        let order_id = fx.orders.seed(order);
        let origin = OrderOrigin::table("12");
        fx.sessions.set(
            &fx.keys.first_order("12"),
            &OrderDraft::new(vec![item("m1", "grill", 1)], 100),
        );
        fx.coordinator
            .changed_status(&origin, &order_id, "processing", "first_order_12", None)
            .await
            .unwrap();

        let outcome = fx
            .coordinator
            .complete_item("grill", "m1", &origin, None, "first_order_12")
            .await
            .unwrap();
        assert!(outcome.all_done);
        let order = fx.orders.find_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.progress_status, ProgressStatus::Completed);

        // 对已空范围重复完成不会再次触发
        let updated_at = order.updated_at;
        let outcome = fx
            .coordinator
            .complete_item("grill", "m1", &origin, None, "first_order_12")
            .await
            .unwrap();
        assert!(outcome.removed.is_none());
        let order = fx.orders.find_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.updated_at, updated_at);
    }

    #[tokio::test]
    async fn test_only_processing_skips_routing() {
        let fx = fixture();
        fx.tables.seed("t1", "12", 4);
        let order_id = fx.orders.seed(Order::new("", "t1"));

        fx.coordinator
            .changed_status(
                &OrderOrigin::table("12"),
                &order_id,
                "only-processing",
                "first_order_12",
                None,
            )
            .await
            .unwrap();

        let order = fx.orders.find_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.progress_status, ProgressStatus::Processing);
        assert!(!fx.sessions.exists(&fx.keys.kitchen_queue("grill")));
    }

    #[tokio::test]
    async fn test_order_paid_moves_table_to_cleaning() {
        let fx = fixture();
        fx.tables.seed("t1", "12", 4);
        let order_id = fx.orders.seed(Order::new("", "t1"));

        fx.coordinator.order_paid(&order_id).await.unwrap();

        let order = fx.orders.find_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        let table = fx.tables.find_by_id("t1").await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Cleaning);
    }

    #[tokio::test]
    async fn test_settle_clears_ephemeral_keys() {
        let fx = fixture();
        fx.tables.seed("t1", "12", 4);
        let order_id = fx.orders.seed(Order::new("", "t1"));
        fx.sessions
            .set(&fx.keys.table_session("12"), &OrderDraft::empty());
        fx.sessions
            .set(&fx.keys.first_order("12"), &OrderDraft::empty());

        fx.coordinator.settle_order(&order_id).await.unwrap();

        assert!(!fx.sessions.exists(&fx.keys.table_session("12")));
        assert!(!fx.sessions.exists(&fx.keys.first_order("12")));
        let table = fx.tables.find_by_id("t1").await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Empty);
    }

    #[tokio::test]
    async fn test_add_customer_rejects_over_capacity() {
        let fx = fixture();
        fx.tables.seed("t1", "12", 1);
        let order_id = fx.orders.seed(Order::new("", "t1"));

        let guest = |name: &str| Customer {
            user_id: None,
            name: name.to_string(),
            is_guest: true,
        };
        fx.coordinator
            .add_customer(&order_id, guest("An"))
            .await
            .unwrap();
        let err = fx
            .coordinator
            .add_customer(&order_id, guest("Binh"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded { seats: 1 }));
    }

    #[tokio::test]
    async fn test_add_customer_is_idempotent_per_user_id() {
        let fx = fixture();
        fx.tables.seed("t1", "12", 2);
        let order_id = fx.orders.seed(Order::new("", "t1"));

        let member = Customer {
            user_id: Some("u1".to_string()),
            name: "An".to_string(),
            is_guest: false,
        };
        fx.coordinator
            .add_customer(&order_id, member.clone())
            .await
            .unwrap();
        let order = fx.coordinator.add_customer(&order_id, member).await.unwrap();
        assert_eq!(order.customers.len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_merges_items_into_durable_order() {
        let fx = fixture();
        fx.tables.seed("t1", "12", 4);
        let order_id = fx.orders.seed(Order::new("", "t1"));

        fx.coordinator
            .confirm_items("first_order_12", vec![item("m1", "grill", 2)], 20000)
            .await
            .unwrap();

        let order = fx.orders.find_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.order_items.len(), 1);
        assert_eq!(order.total_price, 20000);
    }

    #[tokio::test]
    async fn test_confirm_batch_notification_merges_into_durable_order() {
        let fx = fixture();
        fx.tables.seed("t1", "12", 4);
        let mut order = Order::new("", "t1");
        order.order_items = vec![item("m1", "grill", 1)];
        order.total_price = 100;
        let order_id = fx.orders.seed(order);

        // 加单批次的通知带 batch_orders_ 键
        fx.coordinator
            .confirm_items("batch_orders_12", vec![item("m2", "wok", 1)], 50)
            .await
            .unwrap();

        let order = fx.orders.find_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.order_items.len(), 2);
        assert_eq!(order.total_price, 150);
    }

    #[tokio::test]
    async fn test_only_processing_broadcasts_status_to_table() {
        let fx = fixture();
        fx.tables.seed("t1", "12", 4);
        let order_id = fx.orders.seed(Order::new("", "t1"));
        let (conn, mut rx) = fx.hub.register();
        fx.hub.join(&conn, &table_group("12"));

        fx.coordinator
            .changed_status(
                &OrderOrigin::table("12"),
                &order_id,
                "only-processing",
                "first_order_12",
                None,
            )
            .await
            .unwrap();

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.event, "orderStatusChanged");
        assert_eq!(
            envelope.data["progressStatus"],
            serde_json::json!(ProgressStatus::Processing)
        );
    }

    #[tokio::test]
    async fn test_cancel_with_batch_id_drops_that_batch() {
        let fx = fixture();
        fx.tables.seed("t1", "12", 4);
        let keep = Batch::new(vec![item("m1", "grill", 1)], 100);
        let drop = Batch {
            batch_id: keep.batch_id + 1,
            order_items: vec![item("m2", "wok", 1)],
            total_price: 50,
            timestamp: keep.timestamp,
        };
        let drop_id = drop.batch_id;
        fx.sessions
            .set(&fx.keys.batch_orders("12"), &vec![keep.clone(), drop]);

        fx.coordinator
            .cancel_pending("first_order_12", Some(drop_id), "table_12")
            .await
            .unwrap();

        let batches: Vec<Batch> = fx.sessions.get(&fx.keys.batch_orders("12")).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].batch_id, keep.batch_id);
    }
}
