//! Staff inbox entries and online-order tracking records

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::OrderItem;

/// One pending order awaiting staff confirmation or cancellation
///
/// Lives in the single shared inbox list consumed by the staff
/// dashboard. Never expires: losing a pending order notification would
/// hide a real order from staff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffNotification {
    pub id: String,
    /// Session-store key of the pending scope (first order or batch list)
    pub key_redis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<i64>,
    pub order_items: Vec<OrderItem>,
    pub total_price: i64,
    /// ISO-8601 submission time
    pub timestamp: String,
}

impl StaffNotification {
    pub fn for_table(
        table_number: impl Into<String>,
        key_redis: impl Into<String>,
        order_items: Vec<OrderItem>,
        total_price: i64,
        batch_id: Option<i64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            key_redis: key_redis.into(),
            table_number: Some(table_number.into()),
            customer_name: None,
            batch_id,
            order_items,
            total_price,
            timestamp: crate::util::now_iso(),
        }
    }

    pub fn for_online(
        customer_name: impl Into<String>,
        key_redis: impl Into<String>,
        order_items: Vec<OrderItem>,
        total_price: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            key_redis: key_redis.into(),
            table_number: None,
            customer_name: Some(customer_name.into()),
            batch_id: None,
            order_items,
            total_price,
            timestamp: crate::util::now_iso(),
        }
    }
}

/// Submitted online pre-order, keyed `pre-order:{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OnlineOrderRecord {
    pub customer_name: String,
    pub order_items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub total_payment: i64,
}

/// One entry of an online order's tracking timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub status: String,
    pub timestamp: i64,
}

impl TrackingEvent {
    pub fn ready() -> Self {
        Self {
            status: "ready".to_string(),
            timestamp: crate::util::now_millis(),
        }
    }
}

/// Delivery-queue entry appended when a ready order has an address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEntry {
    pub order_id: String,
    pub customer_name: String,
    pub delivery_address: String,
    pub timestamp: i64,
}
