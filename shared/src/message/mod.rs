//! Realtime wire types
//!
//! Every frame on the wire is an [`Envelope`]: a named event plus a
//! JSON payload. Inbound frames deserialize into the [`ClientEvent`]
//! discriminated union and are validated before dispatch; outbound
//! frames carry a [`ServerEvent`] name.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod client;
pub use client::*;

/// Outbound event names (server -> group/connection)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServerEvent {
    /// 当前草稿（加入餐桌时回复）
    CurrentOrder,
    /// 当前订单的进度状态
    CurrentOrderProcessing,
    /// 首单快照
    FirstOrder,
    /// 加单批次列表
    AddOrders,
    /// 已完成的菜品
    CompletedOrders,
    /// 草稿已更新
    OrderUpdated,
    /// 订单状态变更
    OrderStatusChanged,
    /// 餐桌状态变更
    TableStatusChanged,
    /// 加单提交
    AddItemsOrder,
    /// 新订单通知（staff）
    NewOrderTable,
    /// 新线上预订单通知（staff）
    NewOrderPreOrder,
    /// 新菜品进入厨房队列
    NewOrderItems,
    /// 厨房队列全量
    CurrentOrderItems,
    /// 餐桌聚合视图（staff）
    DataTable,
    /// 餐桌聚合视图更新（staff）
    DataTableUpdated,
    /// staff 通知列表全量同步
    StaffTableNotificationSync,
}

impl ServerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentOrder => "currentOrder",
            Self::CurrentOrderProcessing => "currentOrderProcessing",
            Self::FirstOrder => "firstOrder",
            Self::AddOrders => "addOrders",
            Self::CompletedOrders => "completedOrders",
            Self::OrderUpdated => "orderUpdated",
            Self::OrderStatusChanged => "orderStatusChanged",
            Self::TableStatusChanged => "tableStatusChanged",
            Self::AddItemsOrder => "addItemsOrder",
            Self::NewOrderTable => "newOrderTable",
            Self::NewOrderPreOrder => "newOrderPreOrder",
            Self::NewOrderItems => "newOrderItems",
            Self::CurrentOrderItems => "currentOrderItems",
            Self::DataTable => "dataTable",
            Self::DataTableUpdated => "dataTableUpdated",
            Self::StaffTableNotificationSync => "staffTableNotificationSync",
        }
    }
}

impl fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One realtime frame: event name + JSON payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    /// Build an outbound frame
    pub fn new<T: Serialize>(event: ServerEvent, data: &T) -> Self {
        Self {
            event: event.as_str().to_string(),
            data: serde_json::to_value(data).expect("Failed to serialize envelope payload"),
        }
    }

    /// 解析载荷为指定类型
    pub fn parse_data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }

    /// 序列化为二进制（帧体）
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// 从二进制解析
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderDraft;

    #[test]
    fn test_envelope_roundtrip() {
        let env = Envelope::new(ServerEvent::CurrentOrder, &OrderDraft::empty());
        let bytes = env.to_bytes().unwrap();
        let back = Envelope::from_bytes(&bytes).unwrap();
        assert_eq!(back.event, "currentOrder");
        let draft: OrderDraft = back.parse_data().unwrap();
        assert!(draft.is_empty());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(ServerEvent::NewOrderTable.as_str(), "newOrderTable");
        assert_eq!(
            ServerEvent::StaffTableNotificationSync.to_string(),
            "staffTableNotificationSync"
        );
    }
}
