//! Kitchen tickets and routing origins

use serde::{Deserialize, Serialize};

use super::OrderItem;

/// Sentinel area for lines without a kitchen area
///
/// Uppercase on purpose: a normalized (lowercased) real area can never
/// collide with it.
pub const UNKNOWN_AREA: &str = "UNKNOWN";

/// Case-normalize a kitchen area name
pub fn normalize_area(area: Option<&str>) -> String {
    match area.map(str::trim) {
        Some(a) if !a.is_empty() => a.to_lowercase(),
        _ => UNKNOWN_AREA.to_string(),
    }
}

/// Who a routed line belongs to: a dine-in table or an online pre-order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOrigin {
    Table { table_number: String },
    Online { customer_name: String },
}

impl OrderOrigin {
    pub fn table(number: impl Into<String>) -> Self {
        Self::Table {
            table_number: number.into(),
        }
    }

    pub fn online(name: impl Into<String>) -> Self {
        Self::Online {
            customer_name: name.into(),
        }
    }

    pub fn table_number(&self) -> Option<&str> {
        match self {
            Self::Table { table_number } => Some(table_number),
            Self::Online { .. } => None,
        }
    }

    pub fn customer_name(&self) -> Option<&str> {
        match self {
            Self::Online { customer_name } => Some(customer_name),
            Self::Table { .. } => None,
        }
    }

    /// Stable key used for completion records
    pub fn completion_key(&self) -> String {
        match self {
            Self::Table { table_number } => format!("table_{}", table_number),
            Self::Online { customer_name } => format!("online_{}", customer_name),
        }
    }
}

/// An order line enriched with its origin, queued for one kitchen area
///
/// Tickets are matched by `(menu_item_id, origin_key, batch_id)`;
/// duplicate menu items within one scope are indistinguishable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KitchenTicket {
    #[serde(flatten)]
    pub item: OrderItem,
    /// Session-store key of the pending scope this line came from
    pub origin_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub timestamp: i64,
}

impl KitchenTicket {
    pub fn new(
        item: OrderItem,
        origin: &OrderOrigin,
        origin_key: impl Into<String>,
        batch_id: Option<i64>,
    ) -> Self {
        Self {
            item,
            origin_key: origin_key.into(),
            batch_id,
            table_number: origin.table_number().map(String::from),
            customer_name: origin.customer_name().map(String::from),
            timestamp: crate::util::now_millis(),
        }
    }

    /// Ticket identity within its queue
    pub fn matches(&self, menu_item_id: &str, origin_key: &str, batch_id: Option<i64>) -> bool {
        self.item.menu_item_id == menu_item_id
            && self.origin_key == origin_key
            && self.batch_id == batch_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_area() {
        assert_eq!(normalize_area(Some("Grill")), "grill");
        assert_eq!(normalize_area(Some("  WOK  ")), "wok");
        assert_eq!(normalize_area(Some("")), UNKNOWN_AREA);
        assert_eq!(normalize_area(None), UNKNOWN_AREA);
    }

    #[test]
    fn test_completion_key() {
        assert_eq!(OrderOrigin::table("12").completion_key(), "table_12");
        assert_eq!(OrderOrigin::online("An").completion_key(), "online_An");
    }
}
