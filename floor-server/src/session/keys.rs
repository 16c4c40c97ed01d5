//! Typed session-key builders
//!
//! One constructor per key family; every store access is forced
//! through a [`TypedKey`] carrying the value type and the family's
//! TTL, so ad hoc string keys cannot appear at call sites.
//!
//! 键名沿用线上既有格式，便于与旧客户端/运维工具互认：
//!
//! | 键族 | 格式 | TTL |
//! |------|------|-----|
//! | 桌面草稿 | `table_{n}` | 2h |
//! | 首单快照 | `first_order_{n}` | 2h |
//! | 加单批次 | `batch_orders_{n}` | 2h |
//! | 厨房队列 | `kitchen_{area}` | 2h |
//! | 完成记录 | `completed_{origin}` | 2h / 24h |
//! | staff 通知 | `notification_table` | 无 |
//! | 线上订单 | `pre-order:{id}` | 24h |
//! | 订单跟踪 | `tracking_order_{id}` | 24h |
//! | 配送队列 | `delivery_queue` | 24h |

use std::marker::PhantomData;
use std::time::Duration;

use shared::order::{
    Batch, DeliveryEntry, KitchenTicket, OnlineOrderRecord, OrderDraft, OrderOrigin,
    StaffNotification, TrackingEvent,
};

use crate::core::Config;

/// A session-store key bound to its value type and TTL
#[derive(Debug, Clone)]
pub struct TypedKey<T> {
    key: String,
    ttl: Option<Duration>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedKey<T> {
    pub fn new(key: impl Into<String>, ttl: Option<Duration>) -> Self {
        Self {
            key: key.into(),
            ttl,
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}

/// Key-builder for all session key families
#[derive(Debug, Clone, Copy)]
pub struct Keys {
    /// Table-scoped keys (~2h)
    table_ttl: Duration,
    /// Online pre-order tracking keys (~24h)
    online_ttl: Duration,
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            table_ttl: Duration::from_secs(7200),
            online_ttl: Duration::from_secs(86400),
        }
    }
}

impl Keys {
    pub fn from_config(config: &Config) -> Self {
        Self {
            table_ttl: Duration::from_secs(config.session_ttl_secs),
            online_ttl: Duration::from_secs(config.pre_order_ttl_secs),
        }
    }

    /// 桌面草稿 `table_{n}`
    pub fn table_session(&self, table_number: &str) -> TypedKey<OrderDraft> {
        TypedKey::new(format!("table_{}", table_number), Some(self.table_ttl))
    }

    /// 首单快照 `first_order_{n}`
    pub fn first_order(&self, table_number: &str) -> TypedKey<OrderDraft> {
        TypedKey::new(format!("first_order_{}", table_number), Some(self.table_ttl))
    }

    /// 加单批次列表 `batch_orders_{n}`
    pub fn batch_orders(&self, table_number: &str) -> TypedKey<Vec<Batch>> {
        TypedKey::new(
            format!("batch_orders_{}", table_number),
            Some(self.table_ttl),
        )
    }

    /// 厨房区域队列 `kitchen_{area}`（area 已规范化）
    pub fn kitchen_queue(&self, area: &str) -> TypedKey<Vec<KitchenTicket>> {
        TypedKey::new(format!("kitchen_{}", area), Some(self.table_ttl))
    }

    /// 完成记录 `completed_{origin}`
    pub fn completion(&self, origin: &OrderOrigin) -> TypedKey<Vec<KitchenTicket>> {
        let ttl = match origin {
            OrderOrigin::Table { .. } => self.table_ttl,
            OrderOrigin::Online { .. } => self.online_ttl,
        };
        TypedKey::new(
            format!("completed_{}", origin.completion_key()),
            Some(ttl),
        )
    }

    /// staff 通知列表 `notification_table`
    ///
    /// 刻意无 TTL：静默过期会向 staff 隐藏真实订单。
    pub fn staff_ledger(&self) -> TypedKey<Vec<StaffNotification>> {
        TypedKey::new("notification_table", None)
    }

    /// 线上订单记录 `pre-order:{id}`
    pub fn pre_order(&self, order_id: &str) -> TypedKey<OnlineOrderRecord> {
        TypedKey::new(format!("pre-order:{}", order_id), Some(self.online_ttl))
    }

    /// 线上订单跟踪 `tracking_order_{id}`
    pub fn tracking(&self, order_id: &str) -> TypedKey<Vec<TrackingEvent>> {
        TypedKey::new(format!("tracking_order_{}", order_id), Some(self.online_ttl))
    }

    /// 配送队列 `delivery_queue`
    pub fn delivery_queue(&self) -> TypedKey<Vec<DeliveryEntry>> {
        TypedKey::new("delivery_queue", Some(self.online_ttl))
    }

    /// 由已知的 pending 键（`first_order_{n}` / `pre-order:{id}`）还原
    /// 草稿类型的键，用于按 dataKey 操作 pending scope
    pub fn pending_scope(&self, data_key: &str) -> TypedKey<OrderDraft> {
        let ttl = if data_key.starts_with("pre-order:") {
            self.online_ttl
        } else {
            self.table_ttl
        };
        TypedKey::new(data_key, Some(ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats_preserved() {
        let keys = Keys::default();
        assert_eq!(keys.table_session("12").as_str(), "table_12");
        assert_eq!(keys.first_order("12").as_str(), "first_order_12");
        assert_eq!(keys.batch_orders("12").as_str(), "batch_orders_12");
        assert_eq!(keys.kitchen_queue("grill").as_str(), "kitchen_grill");
        assert_eq!(keys.staff_ledger().as_str(), "notification_table");
        assert_eq!(keys.pre_order("abc").as_str(), "pre-order:abc");
    }

    #[test]
    fn test_ledger_has_no_ttl() {
        let keys = Keys::default();
        assert!(keys.staff_ledger().ttl().is_none());
    }

    #[test]
    fn test_completion_ttl_by_origin() {
        let keys = Keys::default();
        let table = keys.completion(&OrderOrigin::table("1"));
        let online = keys.completion(&OrderOrigin::online("An"));
        assert!(table.ttl().unwrap() < online.ttl().unwrap());
    }
}
