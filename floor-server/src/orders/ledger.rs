//! Staff notification ledger
//!
//! 待确认通知的单一账本（无 TTL）。每次变更后把完整列表重播给
//! staff 群组，客户端以收到的列表整体替换本地状态。

use std::sync::Arc;

use shared::message::ServerEvent;
use shared::order::StaffNotification;
use tracing::info;

use crate::hub::{BroadcastHub, ConnectionHandle, groups::STAFF_GROUP};
use crate::session::{Keys, SessionStore};
use crate::utils::AppResult;

#[derive(Clone)]
pub struct StaffLedger {
    sessions: Arc<SessionStore>,
    keys: Keys,
    hub: Arc<BroadcastHub>,
}

impl StaffLedger {
    pub fn new(sessions: Arc<SessionStore>, keys: Keys, hub: Arc<BroadcastHub>) -> Self {
        Self {
            sessions,
            keys,
            hub,
        }
    }

    /// 当前账本快照
    pub fn snapshot(&self) -> Vec<StaffNotification> {
        self.sessions
            .get(&self.keys.staff_ledger())
            .unwrap_or_default()
    }

    /// 追加一条通知并重播账本
    pub fn append(&self, notification: StaffNotification) -> AppResult<()> {
        info!(id = %notification.id, key = %notification.key_redis, "staff notification append");
        let (ledger, _) = self
            .sessions
            .update(&self.keys.staff_ledger(), |list: &mut Vec<StaffNotification>| {
                list.push(notification);
            });
        self.sync(&ledger);
        Ok(())
    }

    /// 按 id 删除（确认或取消后调用）并重播账本
    pub fn remove(&self, id: &str) -> AppResult<()> {
        info!(id = %id, "staff notification remove");
        let (ledger, _) = self
            .sessions
            .update(&self.keys.staff_ledger(), |list: &mut Vec<StaffNotification>| {
                list.retain(|n| n.id != id);
            });
        self.sync(&ledger);
        Ok(())
    }

    fn sync(&self, ledger: &[StaffNotification]) {
        self.hub
            .publish(STAFF_GROUP, ServerEvent::StaffTableNotificationSync, &ledger);
    }

    /// 对单个连接重播账本（加入 staff 群组时）
    pub fn sync_to(&self, conn: &ConnectionHandle) {
        let ledger = self.snapshot();
        self.hub
            .reply(conn, ServerEvent::StaffTableNotificationSync, &ledger);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderItem;

    fn ledger() -> StaffLedger {
        StaffLedger::new(
            Arc::new(SessionStore::new()),
            Keys::default(),
            Arc::new(BroadcastHub::new()),
        )
    }

    fn item(id: &str) -> OrderItem {
        OrderItem {
            menu_item_id: id.to_string(),
            name: id.to_string(),
            quantity: 1,
            variant: None,
            toppings: vec![],
            note: None,
            kitchen_area: None,
        }
    }

    #[tokio::test]
    async fn test_append_then_remove() {
        let ledger = ledger();
        let n = StaffNotification::for_table("5", "table_5", vec![item("a")], 100, Some(1));
        let id = n.id.clone();

        ledger.append(n).unwrap();
        assert_eq!(ledger.snapshot().len(), 1);

        ledger.remove(&id).unwrap();
        assert!(ledger.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_a_no_op() {
        let ledger = ledger();
        ledger
            .append(StaffNotification::for_table("5", "table_5", vec![], 0, None))
            .unwrap();
        ledger.remove("missing").unwrap();
        assert_eq!(ledger.snapshot().len(), 1);
    }
}
