//! Ephemeral table state: the live draft and add-on batches

use serde::{Deserialize, Serialize};

use super::OrderItem;

/// The not-yet-submitted working order of a table
///
/// Doubles as the first-order snapshot (same shape, different key).
/// Absence in the session store always reads as the empty draft.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default)]
    pub total_price: i64,
}

impl OrderDraft {
    pub fn new(order_items: Vec<OrderItem>, total_price: i64) -> Self {
        Self {
            order_items,
            total_price,
        }
    }

    /// The `{orderItems:[],totalPrice:0}` value clients receive after
    /// a reset or on first join
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.order_items.is_empty()
    }
}

/// One add-on submission made after the table's first order
///
/// Immutable once appended; batches accumulate in submission order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// Millisecond timestamp at submission, unique per table in practice
    pub batch_id: i64,
    pub order_items: Vec<OrderItem>,
    pub total_price: i64,
    pub timestamp: i64,
}

impl Batch {
    pub fn new(order_items: Vec<OrderItem>, total_price: i64) -> Self {
        let now = crate::util::now_millis();
        Self {
            batch_id: now,
            order_items,
            total_price,
            timestamp: now,
        }
    }
}
