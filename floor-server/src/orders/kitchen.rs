//! Batch & kitchen router
//!
//! 把已提交的订单按厨房区域拆成工单并跟踪逐项完成。完成判定只看
//! 待做范围（首单快照 + 全部批次，线上单看 pre-order 记录），全部
//! 清空即向生命周期协调器发出 all-done 信号；持久层的写入不在本
//! 模块发生。

use std::collections::BTreeMap;
use std::sync::Arc;

use shared::message::ServerEvent;
use shared::order::{
    Batch, DeliveryEntry, KitchenTicket, OrderDraft, OrderItem, OrderOrigin, TrackingEvent,
    normalize_area, sanitize_items,
};
use tracing::{debug, info, warn};

use crate::hub::{BroadcastHub, groups::STAFF_GROUP, kitchen_group, table_group};
use crate::session::{Keys, SessionStore};

/// Result of a single ticket completion
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    /// The ticket actually taken off the area queue, if any
    pub removed: Option<KitchenTicket>,
    /// Every outstanding line of the origin is now done
    pub all_done: bool,
}

#[derive(Clone)]
pub struct KitchenRouter {
    sessions: Arc<SessionStore>,
    keys: Keys,
    hub: Arc<BroadcastHub>,
}

impl KitchenRouter {
    pub fn new(sessions: Arc<SessionStore>, keys: Keys, hub: Arc<BroadcastHub>) -> Self {
        Self {
            sessions,
            keys,
            hub,
        }
    }

    /// 按区域拆单并入队
    ///
    /// 空输入是 no-op。每个涉及的区域收到新工单（`newOrderItems`）
    /// 与该区域的完整队列（`currentOrderItems`）。
    pub fn route_items(
        &self,
        items: Vec<OrderItem>,
        origin: &OrderOrigin,
        origin_key: &str,
        batch_id: Option<i64>,
    ) {
        let items = sanitize_items(items);
        if items.is_empty() {
            debug!(origin_key, "No routable items, skipping");
            return;
        }

        let mut by_area: BTreeMap<String, Vec<KitchenTicket>> = BTreeMap::new();
        for item in items {
            let area = normalize_area(item.kitchen_area.as_deref());
            by_area
                .entry(area)
                .or_default()
                .push(KitchenTicket::new(item, origin, origin_key, batch_id));
        }

        for (area, tickets) in by_area {
            info!(area = %area, count = tickets.len(), origin_key, "Routing kitchen tickets");
            let (queue, _) = self
                .sessions
                .update(&self.keys.kitchen_queue(&area), |q: &mut Vec<KitchenTicket>| {
                    q.extend(tickets.iter().cloned());
                });
            let group = kitchen_group(&area);
            self.hub.publish(&group, ServerEvent::NewOrderItems, &tickets);
            self.hub.publish(&group, ServerEvent::CurrentOrderItems, &queue);
        }
    }

    /// 完成一条工单
    ///
    /// 从待做范围（批次或首单/线上记录）与区域队列中移除该行，记入
    /// 完成记录，并重播受影响视图。行身份是
    /// `(menu_item_id, origin_key, batch_id)`，同一范围内重复菜品
    /// 无法区分。
    pub fn complete_item(
        &self,
        area: &str,
        menu_item_id: &str,
        origin: &OrderOrigin,
        batch_id: Option<i64>,
        data_key: &str,
    ) -> CompletionOutcome {
        let area = normalize_area(Some(area));

        let all_done = self.clear_pending_line(menu_item_id, origin, batch_id, data_key);

        // 区域队列移除
        let (queue, removed) = self.sessions.update(
            &self.keys.kitchen_queue(&area),
            |q: &mut Vec<KitchenTicket>| {
                q.iter()
                    .position(|t| t.matches(menu_item_id, data_key, batch_id))
                    .map(|i| q.remove(i))
            },
        );
        if removed.is_none() {
            warn!(area = %area, menu_item_id, data_key, "Completed ticket not found in area queue");
        }

        // 完成记录
        let completed = match &removed {
            Some(ticket) => {
                let (completed, _) = self.sessions.update(
                    &self.keys.completion(origin),
                    |c: &mut Vec<KitchenTicket>| c.push(ticket.clone()),
                );
                completed
            }
            None => self
                .sessions
                .get(&self.keys.completion(origin))
                .unwrap_or_default(),
        };

        let group = kitchen_group(&area);
        self.hub
            .publish(&group, ServerEvent::CurrentOrderItems, &queue);
        match origin {
            OrderOrigin::Table { table_number } => {
                self.hub.publish(
                    &table_group(table_number),
                    ServerEvent::CompletedOrders,
                    &completed,
                );
            }
            OrderOrigin::Online { .. } => {
                self.hub
                    .publish(STAFF_GROUP, ServerEvent::CompletedOrders, &completed);
            }
        }

        if all_done && removed.is_some() {
            info!(origin = %origin.completion_key(), "All outstanding items completed");
            if let OrderOrigin::Online { customer_name } = origin {
                self.record_online_ready(customer_name, data_key);
            }
        }

        CompletionOutcome { removed, all_done }
    }

    /// 从待做范围移除一行，返回该来源是否已全部做完
    fn clear_pending_line(
        &self,
        menu_item_id: &str,
        origin: &OrderOrigin,
        batch_id: Option<i64>,
        data_key: &str,
    ) -> bool {
        match origin {
            OrderOrigin::Table { table_number } => {
                if let Some(batch_id) = batch_id {
                    // 批次范围：移除该行，清掉做完的批次
                    self.sessions.update(
                        &self.keys.batch_orders(table_number),
                        |batches: &mut Vec<Batch>| {
                            if let Some(batch) =
                                batches.iter_mut().find(|b| b.batch_id == batch_id)
                                && let Some(i) = batch
                                    .order_items
                                    .iter()
                                    .position(|it| it.menu_item_id == menu_item_id)
                            {
                                batch.order_items.remove(i);
                            }
                            batches.retain(|b| !b.order_items.is_empty());
                        },
                    );
                } else {
                    self.sessions.update(
                        &self.keys.pending_scope(data_key),
                        |draft: &mut OrderDraft| {
                            if let Some(i) = draft
                                .order_items
                                .iter()
                                .position(|it| it.menu_item_id == menu_item_id)
                            {
                                draft.order_items.remove(i);
                            }
                        },
                    );
                }

                let first: OrderDraft = self
                    .sessions
                    .get(&self.keys.first_order(table_number))
                    .unwrap_or_default();
                let batches: Vec<Batch> = self
                    .sessions
                    .get(&self.keys.batch_orders(table_number))
                    .unwrap_or_default();
                first.is_empty() && batches.is_empty()
            }
            OrderOrigin::Online { .. } => {
                let order_id = data_key.strip_prefix("pre-order:").unwrap_or(data_key);
                let key = self.keys.pre_order(order_id);
                match self.sessions.get(&key) {
                    Some(mut record) => {
                        if let Some(i) = record
                            .order_items
                            .iter()
                            .position(|it| it.menu_item_id == menu_item_id)
                        {
                            record.order_items.remove(i);
                        }
                        let done = record.order_items.is_empty();
                        self.sessions.set(&key, &record);
                        done
                    }
                    None => true,
                }
            }
        }
    }

    /// 线上单全部做完：记 ready 跟踪事件，有配送地址时入配送队列
    fn record_online_ready(&self, customer_name: &str, data_key: &str) {
        let order_id = data_key.strip_prefix("pre-order:").unwrap_or(data_key);
        self.sessions
            .update(&self.keys.tracking(order_id), |t: &mut Vec<TrackingEvent>| {
                t.push(TrackingEvent::ready());
            });

        if let Some(record) = self.sessions.get(&self.keys.pre_order(order_id))
            && let Some(address) = record.delivery_address
        {
            self.sessions
                .update(&self.keys.delivery_queue(), |q: &mut Vec<DeliveryEntry>| {
                    q.push(DeliveryEntry {
                        order_id: order_id.to_string(),
                        customer_name: customer_name.to_string(),
                        delivery_address: address,
                        timestamp: crate::utils::now_millis(),
                    });
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> (KitchenRouter, Arc<SessionStore>, Keys) {
        let sessions = Arc::new(SessionStore::new());
        let keys = Keys::default();
        let router = KitchenRouter::new(sessions.clone(), keys, Arc::new(BroadcastHub::new()));
        (router, sessions, keys)
    }

    fn item(id: &str, area: Option<&str>) -> OrderItem {
        OrderItem {
            menu_item_id: id.to_string(),
            name: id.to_string(),
            quantity: 1,
            variant: None,
            toppings: vec![],
            note: None,
            kitchen_area: area.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_route_groups_by_normalized_area() {
        let (router, sessions, keys) = router();
        let origin = OrderOrigin::table("12");
        router.route_items(
            vec![
                item("a", Some("Grill")),
                item("b", Some("grill")),
                item("c", None),
            ],
            &origin,
            "first_order_12",
            None,
        );

        let grill: Vec<KitchenTicket> = sessions.get(&keys.kitchen_queue("grill")).unwrap();
        assert_eq!(grill.len(), 2);
        let unknown: Vec<KitchenTicket> =
            sessions.get(&keys.kitchen_queue("UNKNOWN")).unwrap();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].table_number.as_deref(), Some("12"));
    }

    #[tokio::test]
    async fn test_route_drops_non_positive_quantities() {
        let (router, sessions, keys) = router();
        let mut bad = item("a", Some("wok"));
        bad.quantity = 0;
        router.route_items(vec![bad], &OrderOrigin::table("1"), "first_order_1", None);
        assert!(sessions.get(&keys.kitchen_queue("wok")).is_none());
    }

    #[tokio::test]
    async fn test_complete_last_item_signals_all_done() {
        let (router, sessions, keys) = router();
        let origin = OrderOrigin::table("7");
        let first = OrderDraft::new(vec![item("a", Some("grill"))], 100);
        sessions.set(&keys.first_order("7"), &first);
        router.route_items(first.order_items.clone(), &origin, "first_order_7", None);

        let outcome = router.complete_item("grill", "a", &origin, None, "first_order_7");
        assert!(outcome.removed.is_some());
        assert!(outcome.all_done);

        let completed: Vec<KitchenTicket> = sessions.get(&keys.completion(&origin)).unwrap();
        assert_eq!(completed.len(), 1);
    }

    #[tokio::test]
    async fn test_not_done_while_a_batch_is_outstanding() {
        let (router, sessions, keys) = router();
        let origin = OrderOrigin::table("7");
        sessions.set(&keys.first_order("7"), &OrderDraft::new(vec![item("a", Some("grill"))], 100));
        sessions.set(
            &keys.batch_orders("7"),
            &vec![Batch::new(vec![item("b", Some("wok"))], 50)],
        );
        router.route_items(vec![item("a", Some("grill"))], &origin, "first_order_7", None);

        let outcome = router.complete_item("grill", "a", &origin, None, "first_order_7");
        assert!(!outcome.all_done);
    }

    #[tokio::test]
    async fn test_completing_a_batch_line_prunes_empty_batch() {
        let (router, sessions, keys) = router();
        let origin = OrderOrigin::table("3");
        sessions.set(&keys.first_order("3"), &OrderDraft::empty());
        let batch = Batch::new(vec![item("b", Some("wok"))], 50);
        let batch_id = batch.batch_id;
        sessions.set(&keys.batch_orders("3"), &vec![batch]);
        router.route_items(
            vec![item("b", Some("wok"))],
            &origin,
            "first_order_3",
            Some(batch_id),
        );

        let outcome =
            router.complete_item("wok", "b", &origin, Some(batch_id), "first_order_3");
        assert!(outcome.all_done);
        let batches: Vec<Batch> = sessions.get(&keys.batch_orders("3")).unwrap();
        assert!(batches.is_empty());
    }

    #[tokio::test]
    async fn test_online_completion_records_ready_tracking() {
        let (router, sessions, keys) = router();
        let origin = OrderOrigin::online("An");
        let record = shared::order::OnlineOrderRecord {
            customer_name: "An".to_string(),
            order_items: vec![item("a", Some("grill"))],
            delivery_address: Some("12 Elm St".to_string()),
            pickup_time: None,
            note: None,
            method: None,
            total_payment: 100,
        };
        sessions.set(&keys.pre_order("o1"), &record);
        router.route_items(record.order_items.clone(), &origin, "pre-order:o1", None);

        let outcome = router.complete_item("grill", "a", &origin, None, "pre-order:o1");
        assert!(outcome.all_done);

        let tracking: Vec<TrackingEvent> = sessions.get(&keys.tracking("o1")).unwrap();
        assert_eq!(tracking[0].status, "ready");
        let deliveries: Vec<DeliveryEntry> = sessions.get(&keys.delivery_queue()).unwrap();
        assert_eq!(deliveries[0].delivery_address, "12 Elm St");
    }
}
