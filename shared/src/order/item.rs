//! Order line items and boundary sanitization

use serde::{Deserialize, Deserializer, Serialize};

/// 菜品规格（份量）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemVariant {
    pub size: String,
    /// Price in minor units
    pub price: i64,
}

/// 加料
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Topping {
    pub name: String,
    /// Price in minor units
    pub price: i64,
}

/// One order line as edited by the customer and routed to the kitchen
///
/// Wire quantity may arrive as a JSON number or a numeric string;
/// it is coerced to an integer on deserialization. Lines with
/// `quantity <= 0` are dropped by [`sanitize_items`] before they can
/// reach a session, batch or ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub menu_item_id: String,
    pub name: String,
    #[serde(deserialize_with = "coerce_quantity")]
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<ItemVariant>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub toppings: Vec<Topping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Kitchen area this line is prepared by (missing -> UNKNOWN)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kitchen_area: Option<String>,
}

/// Accept `3`, `3.0` or `"3"`; anything unparseable becomes 0 and is
/// filtered out by sanitization.
fn coerce_quantity<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }
    Ok(match Raw::deserialize(de)? {
        Raw::Int(n) => n,
        Raw::Float(f) => f as i64,
        Raw::Text(s) => s.trim().parse().unwrap_or(0),
    })
}

/// Drop lines with non-positive quantity
///
/// Every state transition runs its input through this filter, so an
/// invalid line never enters a session, batch or kitchen queue.
pub fn sanitize_items(items: Vec<OrderItem>) -> Vec<OrderItem> {
    items.into_iter().filter(|i| i.quantity > 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, quantity: i64) -> OrderItem {
        OrderItem {
            menu_item_id: id.to_string(),
            name: format!("Item {}", id),
            quantity,
            variant: None,
            toppings: vec![],
            note: None,
            kitchen_area: None,
        }
    }

    #[test]
    fn test_sanitize_drops_non_positive() {
        let items = vec![item("m1", 2), item("m2", 0), item("m3", -1)];
        let clean = sanitize_items(items);
        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].menu_item_id, "m1");
        assert!(clean.iter().all(|i| i.quantity > 0));
    }

    #[test]
    fn test_quantity_coercion_from_string() {
        let json = r#"{"menuItemId":"m1","name":"Pho","quantity":"2"}"#;
        let item: OrderItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.quantity, 2);

        let json = r#"{"menuItemId":"m1","name":"Pho","quantity":"abc"}"#;
        let item: OrderItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.quantity, 0);
        assert!(sanitize_items(vec![item]).is_empty());
    }
}
