//! Inbound event union
//!
//! One variant per inbound event name; payloads are strongly typed so
//! malformed frames are rejected at the boundary, before any handler
//! touches shared state.

use serde::{Deserialize, Serialize};

use crate::order::{OnlineOrderRecord, OrderItem};

/// Client -> server events, tagged by wire event name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    JoinTable {
        table_id: String,
        table_number: String,
    },
    #[serde(rename_all = "camelCase")]
    LeaveTable { table_id: String },
    #[serde(rename_all = "camelCase")]
    UpdateOrder {
        update_order: Vec<OrderItem>,
        total_price: i64,
        table_number: String,
    },
    #[serde(rename_all = "camelCase")]
    SendOrder {
        current_order_id: String,
        order_items: Vec<OrderItem>,
        total_price: i64,
        table_number: String,
        /// Requested progress-status target (validated by the coordinator)
        status_changed: String,
        is_add_items: bool,
    },
    /// Online pre-order submission; fields beyond `id` follow
    /// [`OnlineOrderRecord`]
    #[serde(rename_all = "camelCase")]
    SendPreOrder {
        id: String,
        #[serde(flatten)]
        record: OnlineOrderRecord,
    },
    #[serde(rename_all = "camelCase")]
    OrderPaid { order_id: String },
    #[serde(rename_all = "camelCase")]
    GetDetailTable { table_number: String },
    #[serde(rename_all = "camelCase")]
    HandleCompletedItem {
        kitchen_area: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table_number: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        customer_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        batch_id: Option<i64>,
        /// Session key of the pending scope the line came from
        data_key: String,
        menu_item_id: String,
    },
    #[serde(rename_all = "camelCase")]
    HandleConfirmNotifyTable {
        id: String,
        key: String,
        order_items: Vec<OrderItem>,
        price_order: i64,
    },
    #[serde(rename_all = "camelCase")]
    HandleCancelNotifyTable {
        id: String,
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        batch_id: Option<i64>,
        /// Table-session key, cleared alongside the cancelled scope
        key_tb: String,
    },
    JoinStaff,
    LeaveStaff,
    JoinChefArea { area: String },
    LeaveChefArea { area: String },
}

impl ClientEvent {
    /// Wire event name (for logging)
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinTable { .. } => "joinTable",
            Self::LeaveTable { .. } => "leaveTable",
            Self::UpdateOrder { .. } => "updateOrder",
            Self::SendOrder { .. } => "sendOrder",
            Self::SendPreOrder { .. } => "sendPreOrder",
            Self::OrderPaid { .. } => "orderPaid",
            Self::GetDetailTable { .. } => "getDetailTable",
            Self::HandleCompletedItem { .. } => "handleCompletedItem",
            Self::HandleConfirmNotifyTable { .. } => "handleConfirmNotifyTable",
            Self::HandleCancelNotifyTable { .. } => "handleCancelNotifyTable",
            Self::JoinStaff => "joinStaff",
            Self::LeaveStaff => "leaveStaff",
            Self::JoinChefArea { .. } => "joinChefArea",
            Self::LeaveChefArea { .. } => "leaveChefArea",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_deserialization() {
        let json = r#"{"event":"joinTable","data":{"tableId":"t1","tableNumber":"12"}}"#;
        let ev: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            ev,
            ClientEvent::JoinTable {
                table_id: "t1".to_string(),
                table_number: "12".to_string(),
            }
        );
        assert_eq!(ev.name(), "joinTable");
    }

    #[test]
    fn test_unit_variant_without_data() {
        let json = r#"{"event":"joinStaff"}"#;
        let ev: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev, ClientEvent::JoinStaff);
    }

    #[test]
    fn test_unknown_event_rejected() {
        let json = r#"{"event":"dropTables","data":{}}"#;
        assert!(serde_json::from_str::<ClientEvent>(json).is_err());
    }

    #[test]
    fn test_send_pre_order_payload() {
        let json = r#"{
            "event": "sendPreOrder",
            "data": {
                "id": "ord-1",
                "customerName": "An",
                "orderItems": [{"menuItemId":"m1","name":"Pho","quantity":1}],
                "deliveryAddress": "12 Hang Bong",
                "method": "delivery",
                "totalPayment": 30000
            }
        }"#;
        let ev: ClientEvent = serde_json::from_str(json).unwrap();
        match ev {
            ClientEvent::SendPreOrder { id, record } => {
                assert_eq!(id, "ord-1");
                assert_eq!(record.customer_name, "An");
                assert_eq!(record.total_payment, 30000);
                assert_eq!(record.delivery_address.as_deref(), Some("12 Hang Bong"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_send_order_payload() {
        let json = r#"{
            "event": "sendOrder",
            "data": {
                "currentOrderId": "o1",
                "orderItems": [{"menuItemId":"m1","name":"Pho","quantity":2}],
                "totalPrice": 20000,
                "tableNumber": "12",
                "statusChanged": "pending_confirmation",
                "isAddItems": false
            }
        }"#;
        let ev: ClientEvent = serde_json::from_str(json).unwrap();
        match ev {
            ClientEvent::SendOrder {
                total_price,
                is_add_items,
                ..
            } => {
                assert_eq!(total_price, 20000);
                assert!(!is_add_items);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
