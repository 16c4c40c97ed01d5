//! Inbound event dispatch
//!
//! 每条入站事件在边界上已由 [`ClientEvent`] 反序列化校验过；这里
//! 只负责路由到对应服务。单条事件处理到底（最后一次 publish）后
//! 才处理该连接的下一帧。

use std::sync::Arc;

use shared::message::{ClientEvent, ServerEvent};
use shared::order::{OrderOrigin, normalize_area};
use tracing::{debug, info};

use crate::hub::{BroadcastHub, ConnectionHandle, groups::STAFF_GROUP, kitchen_group};
use crate::orders::{DraftManager, LifecycleCoordinator, StaffLedger};
use crate::session::{Keys, SessionStore};
use crate::utils::{AppError, AppResult};

pub struct EventDispatcher {
    sessions: Arc<SessionStore>,
    keys: Keys,
    hub: Arc<BroadcastHub>,
    drafts: DraftManager,
    lifecycle: LifecycleCoordinator,
    ledger: StaffLedger,
}

impl EventDispatcher {
    pub fn new(
        sessions: Arc<SessionStore>,
        keys: Keys,
        hub: Arc<BroadcastHub>,
        drafts: DraftManager,
        lifecycle: LifecycleCoordinator,
        ledger: StaffLedger,
    ) -> Self {
        Self {
            sessions,
            keys,
            hub,
            drafts,
            lifecycle,
            ledger,
        }
    }

    pub async fn dispatch(&self, conn: &ConnectionHandle, event: ClientEvent) -> AppResult<()> {
        debug!(conn = conn.id(), event = event.name(), "Dispatch");
        match event {
            ClientEvent::JoinTable {
                table_id,
                table_number,
            } => self.drafts.join_table(conn, &table_id, &table_number).await,
            ClientEvent::LeaveTable { table_id } => {
                self.drafts.leave_table(conn, &table_id).await
            }
            ClientEvent::UpdateOrder {
                update_order,
                total_price,
                table_number,
            } => {
                self.drafts
                    .update_draft(&table_number, update_order, total_price);
                Ok(())
            }
            ClientEvent::SendOrder {
                current_order_id,
                order_items,
                total_price,
                table_number,
                status_changed,
                is_add_items,
            } => {
                self.drafts
                    .submit_order(
                        &table_number,
                        &current_order_id,
                        order_items,
                        total_price,
                        &status_changed,
                        is_add_items,
                    )
                    .await
            }
            ClientEvent::SendPreOrder { id, record } => self.drafts.submit_pre_order(&id, record),
            ClientEvent::OrderPaid { order_id } => self.lifecycle.order_paid(&order_id).await,
            ClientEvent::GetDetailTable { table_number } => {
                let progress = self
                    .lifecycle
                    .find_table_order(&table_number)
                    .await?
                    .map(|o| o.progress_status);
                let detail = self.lifecycle.table_detail(&table_number, progress);
                self.hub.reply(conn, ServerEvent::DataTable, &detail);
                Ok(())
            }
            ClientEvent::HandleCompletedItem {
                kitchen_area,
                table_number,
                customer_name,
                batch_id,
                data_key,
                menu_item_id,
            } => {
                let origin = match (table_number, customer_name) {
                    (Some(n), _) => OrderOrigin::table(n),
                    (None, Some(name)) => OrderOrigin::online(name),
                    (None, None) => {
                        return Err(AppError::validation(
                            "handleCompletedItem needs tableNumber or customerName",
                        ));
                    }
                };
                self.lifecycle
                    .complete_item(&kitchen_area, &menu_item_id, &origin, batch_id, &data_key)
                    .await?;
                Ok(())
            }
            ClientEvent::HandleConfirmNotifyTable {
                id,
                key,
                order_items,
                price_order,
            } => {
                self.ledger.remove(&id)?;
                self.lifecycle
                    .confirm_items(&key, order_items, price_order)
                    .await
            }
            ClientEvent::HandleCancelNotifyTable {
                id,
                key,
                batch_id,
                key_tb,
            } => {
                self.ledger.remove(&id)?;
                self.lifecycle.cancel_pending(&key, batch_id, &key_tb).await
            }
            ClientEvent::JoinStaff => {
                info!(conn = conn.id(), "Join staff");
                self.hub.join(conn, STAFF_GROUP);
                self.ledger.sync_to(conn);
                Ok(())
            }
            ClientEvent::LeaveStaff => {
                self.hub.leave(conn, STAFF_GROUP);
                Ok(())
            }
            ClientEvent::JoinChefArea { area } => {
                let area = normalize_area(Some(&area));
                info!(conn = conn.id(), area = %area, "Join chef area");
                self.hub.join_exclusive(conn, &kitchen_group(&area));
                let queue: Vec<shared::order::KitchenTicket> = self
                    .sessions
                    .get(&self.keys.kitchen_queue(&area))
                    .unwrap_or_default();
                self.hub.reply(conn, ServerEvent::CurrentOrderItems, &queue);
                Ok(())
            }
            ClientEvent::LeaveChefArea { area } => {
                let area = normalize_area(Some(&area));
                self.hub.leave(conn, &kitchen_group(&area));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{InMemoryOrderStore, InMemoryTableRegistry};
    use shared::order::KitchenTicket;

    fn dispatcher() -> (Arc<EventDispatcher>, Arc<BroadcastHub>) {
        let sessions = Arc::new(SessionStore::new());
        let keys = Keys::default();
        let hub = Arc::new(BroadcastHub::new());
        let orders = Arc::new(InMemoryOrderStore::new());
        let tables = Arc::new(InMemoryTableRegistry::new());
        tables.seed("t1", "12", 4);
        let lifecycle = LifecycleCoordinator::new(
            sessions.clone(),
            keys,
            hub.clone(),
            orders,
            tables.clone(),
        );
        let ledger = StaffLedger::new(sessions.clone(), keys, hub.clone());
        let drafts = DraftManager::new(
            sessions.clone(),
            keys,
            hub.clone(),
            tables,
            lifecycle.clone(),
            ledger.clone(),
        );
        let dispatcher = Arc::new(EventDispatcher::new(
            sessions, keys, hub.clone(), drafts, lifecycle, ledger,
        ));
        (dispatcher, hub)
    }

    #[tokio::test]
    async fn test_join_staff_replies_ledger_snapshot() {
        let (dispatcher, hub) = dispatcher();
        let (conn, mut rx) = hub.register();

        dispatcher
            .dispatch(&conn, ClientEvent::JoinStaff)
            .await
            .unwrap();

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.event, "staffTableNotificationSync");
    }

    #[tokio::test]
    async fn test_join_chef_area_replies_area_queue() {
        let (dispatcher, hub) = dispatcher();
        let (conn, mut rx) = hub.register();

        dispatcher
            .dispatch(
                &conn,
                ClientEvent::JoinChefArea {
                    area: "Grill".to_string(),
                },
            )
            .await
            .unwrap();

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.event, "currentOrderItems");
        let queue: Vec<KitchenTicket> = envelope.parse_data().unwrap();
        assert!(queue.is_empty());
        assert_eq!(hub.group_size(&kitchen_group("grill")), 1);
    }

    #[tokio::test]
    async fn test_send_pre_order_notifies_staff_room() {
        let (dispatcher, hub) = dispatcher();
        let (staff, mut rx) = hub.register();
        dispatcher
            .dispatch(&staff, ClientEvent::JoinStaff)
            .await
            .unwrap();
        rx.recv().await.unwrap(); // 入组时的账本同步

        let record = shared::order::OnlineOrderRecord {
            customer_name: "An".to_string(),
            order_items: vec![],
            delivery_address: None,
            pickup_time: Some("18:30".to_string()),
            note: None,
            method: Some("pickup".to_string()),
            total_payment: 15000,
        };
        dispatcher
            .dispatch(
                &staff,
                ClientEvent::SendPreOrder {
                    id: "ord-1".to_string(),
                    record,
                },
            )
            .await
            .unwrap();

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.event, "newOrderPreOrder");
        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.event, "staffTableNotificationSync");
    }

    #[tokio::test]
    async fn test_completed_item_without_origin_is_rejected() {
        let (dispatcher, hub) = dispatcher();
        let (conn, _rx) = hub.register();

        let err = dispatcher
            .dispatch(
                &conn,
                ClientEvent::HandleCompletedItem {
                    kitchen_area: "grill".to_string(),
                    table_number: None,
                    customer_name: None,
                    batch_id: None,
                    data_key: "first_order_12".to_string(),
                    menu_item_id: "m1".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
