//! Order Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartItem;
use super::location::{Coordinates, LocationSnapshot};

/// Ordered line (no price: the order carries its own total)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub title: String,
    pub quantity: u32,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            quantity: item.quantity,
        }
    }
}

/// Delivery address captured at checkout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Older snapshots wrote this field as `location`
    #[serde(default, alias = "location", skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl OrderAddress {
    /// Placeholder used when checkout has no address at all
    pub fn unknown() -> Self {
        Self {
            street: Some("Unknown".to_string()),
            city: Some("Unknown".to_string()),
            coordinates: Some(Coordinates::new(0.0, 0.0)),
        }
    }
}

impl From<&LocationSnapshot> for OrderAddress {
    fn from(snapshot: &LocationSnapshot) -> Self {
        let non_blank = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        Self {
            street: non_blank(&snapshot.street),
            city: non_blank(&snapshot.city),
            coordinates: Some(snapshot.coordinates),
        }
    }
}

/// The single in-flight order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Client-generated random token
    pub id: String,
    pub items: Vec<OrderLine>,
    /// Grand total in currency unit
    pub total: f64,
    /// Set when the order is saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_address: Option<OrderAddress>,
}

impl Order {
    /// Copy of this order stamped with `at`
    pub fn stamped(&self, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(at),
            ..self.clone()
        }
    }

    /// Sum of ordered quantities
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_iso8601() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T12:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let order = Order {
            id: "abc123".to_string(),
            items: vec![],
            total: 0.0,
            timestamp: None,
            order_address: None,
        }
        .stamped(at);

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["timestamp"], "2026-03-01T12:30:00Z");
        assert!(json.get("orderAddress").is_none());
    }

    #[test]
    fn test_address_accepts_legacy_location_key() {
        let json = r#"{"street":"Main","city":"Tbilisi","location":{"latitude":41.7,"longitude":44.8}}"#;
        let address: OrderAddress = serde_json::from_str(json).unwrap();
        assert_eq!(address.coordinates, Some(Coordinates::new(41.7, 44.8)));
    }

    #[test]
    fn test_order_line_from_cart_item() {
        let item = CartItem {
            id: "7".to_string(),
            title: "Soup".to_string(),
            price: 4.0,
            quantity: 3,
            thumbnail_url: String::new(),
        };
        let line = OrderLine::from(&item);
        assert_eq!(line.id, "7");
        assert_eq!(line.quantity, 3);
    }

    #[test]
    fn test_address_from_snapshot_drops_blanks() {
        let snapshot = LocationSnapshot {
            coordinates: Coordinates::new(1.5, 2.5),
            city: "Batumi".to_string(),
            street: String::new(),
        };
        let address = OrderAddress::from(&snapshot);
        assert_eq!(address.city.as_deref(), Some("Batumi"));
        assert_eq!(address.street, None);
        assert_eq!(address.coordinates, Some(Coordinates::new(1.5, 2.5)));
    }
}
