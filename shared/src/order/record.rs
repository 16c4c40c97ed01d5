//! Durable order document and patch shape
//!
//! The durable store is an external collaborator; these types define
//! the contract the lifecycle coordinator writes through.

use serde::{Deserialize, Serialize};

use super::{OrderItem, PaymentStatus, ProgressStatus};

/// A customer seated on an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// User id, or a temporary uuid for walk-in guests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_guest: bool,
}

/// Durable order document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub table_id: String,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default)]
    pub total_price: i64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub progress_status: ProgressStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn new(id: impl Into<String>, table_id: impl Into<String>) -> Self {
        let now = crate::util::now_millis();
        Self {
            id: id.into(),
            table_id: table_id.into(),
            customers: vec![],
            order_items: vec![],
            total_price: 0,
            payment_status: PaymentStatus::Unpaid,
            progress_status: ProgressStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update applied by `updateOrder(id, patch)`
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_items: Option<Vec<OrderItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_status: Option<ProgressStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers: Option<Vec<Customer>>,
}

impl OrderPatch {
    pub fn progress(status: ProgressStatus) -> Self {
        Self {
            progress_status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order_items.is_none()
            && self.total_price.is_none()
            && self.progress_status.is_none()
            && self.payment_status.is_none()
            && self.customers.is_none()
    }
}
