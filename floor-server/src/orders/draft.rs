//! Order draft manager
//!
//! 每桌"正在点的单"与"首单快照"的归属方。提交前的编辑只动临时
//! 状态；提交时记账本、广播，然后把状态推进交给生命周期协调器。

use std::sync::Arc;

use serde_json::json;
use shared::message::ServerEvent;
use shared::order::{
    Batch, OnlineOrderRecord, OrderDraft, OrderItem, OrderOrigin, ProgressStatus,
    StaffNotification, TableStatus, sanitize_items,
};
use tracing::{debug, info};

use super::ledger::StaffLedger;
use super::lifecycle::LifecycleCoordinator;
use super::registry::TableRegistry;
use crate::hub::{BroadcastHub, ConnectionHandle, groups::STAFF_GROUP, table_group};
use crate::session::{Keys, SessionStore};
use crate::utils::AppResult;

#[derive(Clone)]
pub struct DraftManager {
    sessions: Arc<SessionStore>,
    keys: Keys,
    hub: Arc<BroadcastHub>,
    tables: Arc<dyn TableRegistry>,
    lifecycle: LifecycleCoordinator,
    ledger: StaffLedger,
}

impl DraftManager {
    pub fn new(
        sessions: Arc<SessionStore>,
        keys: Keys,
        hub: Arc<BroadcastHub>,
        tables: Arc<dyn TableRegistry>,
        lifecycle: LifecycleCoordinator,
        ledger: StaffLedger,
    ) -> Self {
        Self {
            sessions,
            keys,
            hub,
            tables,
            lifecycle,
            ledger,
        }
    }

    /// 入桌：确保临时状态存在（缺失时从持久单重建），把当前视图
    /// 整体回放给这个连接
    pub async fn join_table(
        &self,
        conn: &ConnectionHandle,
        table_id: &str,
        table_number: &str,
    ) -> AppResult<()> {
        info!(conn = conn.id(), table = table_number, "Join table");
        self.hub.join(conn, &table_group(table_number));

        let order = self.lifecycle.find_table_order(table_number).await?;

        if let Some(table) = self.tables.find_by_number(table_number).await?
            && table.status == TableStatus::Empty
        {
            self.tables.set_status(&table.id, TableStatus::Occupied).await?;
        }

        let session_key = self.keys.table_session(table_number);
        let session = match self.sessions.get(&session_key) {
            Some(draft) => draft,
            None => {
                let draft = OrderDraft::empty();
                self.sessions.set(&session_key, &draft);
                draft
            }
        };

        // 首单快照缺失时以持久单为准重建
        let first_key = self.keys.first_order(table_number);
        let first = match self.sessions.get(&first_key) {
            Some(draft) => draft,
            None => match &order {
                Some(order) if !order.order_items.is_empty() => {
                    let draft = OrderDraft::new(order.order_items.clone(), order.total_price);
                    self.sessions.set(&first_key, &draft);
                    draft
                }
                _ => OrderDraft::empty(),
            },
        };

        let batches: Vec<Batch> = self
            .sessions
            .get(&self.keys.batch_orders(table_number))
            .unwrap_or_default();
        let completed: Vec<shared::order::KitchenTicket> = self
            .sessions
            .get(&self.keys.completion(&OrderOrigin::table(table_number)))
            .unwrap_or_default();
        let progress = order
            .as_ref()
            .map(|o| o.progress_status)
            .unwrap_or(ProgressStatus::Draft);

        self.hub.reply(conn, ServerEvent::CurrentOrder, &session);
        self.hub.reply(conn, ServerEvent::FirstOrder, &first);
        self.hub.reply(conn, ServerEvent::AddOrders, &batches);
        self.hub.reply(
            conn,
            ServerEvent::CurrentOrderProcessing,
            &json!({
                "orderId": order.map(|o| o.id),
                "progressStatus": progress,
                "tableId": table_id,
            }),
        );
        self.hub.reply(conn, ServerEvent::CompletedOrders, &completed);
        Ok(())
    }

    /// 离桌
    pub async fn leave_table(&self, conn: &ConnectionHandle, table_id: &str) -> AppResult<()> {
        if let Some(table) = self.tables.find_by_id(table_id).await? {
            debug!(conn = conn.id(), table = %table.table_number, "Leave table");
            self.hub.leave(conn, &table_group(&table.table_number));
        }
        Ok(())
    }

    /// 编辑草稿：替换 TableSession 并向全桌重播，不碰持久层
    pub fn update_draft(&self, table_number: &str, items: Vec<OrderItem>, total_price: i64) {
        let items = sanitize_items(items);
        // 全部行被剔除时总价归零
        let total_price = if items.is_empty() { 0 } else { total_price };
        let draft = OrderDraft::new(items, total_price);
        self.sessions
            .set(&self.keys.table_session(table_number), &draft);
        self.hub
            .publish(&table_group(table_number), ServerEvent::OrderUpdated, &draft);
    }

    /// 提交订单
    ///
    /// 首单：items 进首单快照并记账本；加单：作为新批次追加。两条
    /// 路都重置草稿、广播，然后以请求的状态委托生命周期协调器。
    pub async fn submit_order(
        &self,
        table_number: &str,
        current_order_id: &str,
        items: Vec<OrderItem>,
        total_price: i64,
        status_changed: &str,
        is_add_items: bool,
    ) -> AppResult<()> {
        let items = sanitize_items(items);
        let origin = OrderOrigin::table(table_number);
        let first_key = self.keys.first_order(table_number);
        info!(
            table = table_number,
            order_id = current_order_id,
            count = items.len(),
            is_add_items,
            "Submit order"
        );

        let batch_id = if is_add_items {
            // 批次 id 取毫秒时钟，同毫秒内递增保证同桌唯一
            let (_, batch_id) = self.sessions.update(
                &self.keys.batch_orders(table_number),
                |batches: &mut Vec<Batch>| {
                    let mut batch = Batch::new(items.clone(), total_price);
                    if let Some(last) = batches.last()
                        && batch.batch_id <= last.batch_id
                    {
                        batch.batch_id = last.batch_id + 1;
                    }
                    let id = batch.batch_id;
                    batches.push(batch);
                    id
                },
            );

            self.ledger.append(StaffNotification::for_table(
                table_number,
                self.keys.batch_orders(table_number).as_str(),
                items.clone(),
                total_price,
                Some(batch_id),
            ))?;
            self.hub.publish(
                &table_group(table_number),
                ServerEvent::AddItemsOrder,
                &json!({ "batchId": batch_id, "orderItems": items, "totalPrice": total_price }),
            );
            Some(batch_id)
        } else {
            let first = OrderDraft::new(items.clone(), total_price);
            self.sessions.set(&first_key, &first);

            self.ledger.append(StaffNotification::for_table(
                table_number,
                first_key.as_str(),
                items.clone(),
                total_price,
                None,
            ))?;
            self.hub
                .publish(&table_group(table_number), ServerEvent::FirstOrder, &first);
            None
        };

        self.hub.publish(
            STAFF_GROUP,
            ServerEvent::NewOrderTable,
            &json!({
                "tableNumber": table_number,
                "orderItems": items,
                "totalPrice": total_price,
                "batchId": batch_id,
            }),
        );

        // 提交后客户端的编辑缓冲清零
        let empty = OrderDraft::empty();
        self.sessions
            .set(&self.keys.table_session(table_number), &empty);
        self.hub
            .publish(&table_group(table_number), ServerEvent::OrderUpdated, &empty);

        self.lifecycle
            .changed_status(
                &origin,
                current_order_id,
                status_changed,
                first_key.as_str(),
                batch_id,
            )
            .await
    }

    /// 线上预订单提交：落 `pre-order:{id}` 记录并向 staff 入账
    pub fn submit_pre_order(&self, id: &str, mut record: OnlineOrderRecord) -> AppResult<()> {
        record.order_items = sanitize_items(record.order_items);
        let key = self.keys.pre_order(id);
        info!(
            id,
            customer = %record.customer_name,
            count = record.order_items.len(),
            "Submit pre-order"
        );
        self.sessions.set(&key, &record);

        let notification = StaffNotification::for_online(
            record.customer_name.clone(),
            key.as_str(),
            record.order_items.clone(),
            record.total_payment,
        );
        self.hub
            .publish(STAFF_GROUP, ServerEvent::NewOrderPreOrder, &notification);
        self.ledger.append(notification)
    }
}
