//! Order records and dashboard statistics.
//!
//! The backend is not consistent about field names across its order
//! endpoints (`items` vs `orderItems`, `totalAmount` vs `totalPrice`), so
//! the aliases below accept every spelling seen in the wild.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{OrderId, OrderStatus, Price, ProductId};

/// An order as returned by `/orders/my`, `/orders/:id` and `/admin/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, alias = "totalPrice")]
    pub total_amount: Option<Price>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default, alias = "deliveryAddress", alias = "address")]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default, alias = "orderItems")]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_username: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub user: Option<OrderCustomer>,
}

impl Order {
    /// Total reported by the backend, or the sum of the lines when absent.
    #[must_use]
    pub fn total(&self) -> Price {
        self.total_amount
            .unwrap_or_else(|| self.items.iter().map(OrderLine::line_total).sum())
    }

    /// Best known customer name for admin tables.
    #[must_use]
    pub fn customer_display_name(&self) -> Option<&str> {
        self.customer_name
            .as_deref()
            .or_else(|| self.user.as_ref().and_then(|u| u.full_name.as_deref()))
            .or(self.customer_username.as_deref())
    }

    /// Delivery address, falling back to the customer's profile address.
    #[must_use]
    pub fn delivery_address(&self) -> Option<&str> {
        self.shipping_address
            .as_deref()
            .or(self.customer_address.as_deref())
    }
}

/// Customer block embedded in admin order details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    #[serde(default, alias = "price")]
    pub unit_price: Option<Price>,
    #[serde(default)]
    pub product: Option<OrderLineProduct>,
}

impl OrderLine {
    /// Product name from the line or its embedded product.
    #[must_use]
    pub fn name(&self) -> &str {
        self.product_name
            .as_deref()
            .or_else(|| self.product.as_ref().and_then(|p| p.name.as_deref()))
            .unwrap_or("Sản phẩm")
    }

    /// `unit price × quantity`, zero when the backend omitted the price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price
            .or_else(|| self.product.as_ref().and_then(|p| p.price))
            .unwrap_or(Price::ZERO)
            .times(self.quantity)
    }
}

/// Product summary embedded in an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineProduct {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Counters for the admin dashboard (`GET /admin/dashboard/stats`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_customers: i64,
    pub total_revenue: Price,
    pub pending_orders: i64,
    pub completed_orders: i64,
}

/// Accept RFC 3339 timestamps as well as the zone-less `LocalDateTime`
/// format the backend emits; anything unparseable becomes `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_accepts_alias_fields() {
        let order: Order = serde_json::from_str(
            r#"{
                "id": 12,
                "status": "SHIPPED",
                "totalPrice": 300000,
                "createdAt": "2025-03-01T09:15:00",
                "orderItems": [{"productName": "Phấn Master", "quantity": 3, "price": 100000}]
            }"#,
        )
        .unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.total(), Price::from_dong(300_000));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].name(), "Phấn Master");
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_total_falls_back_to_lines() {
        let order: Order = serde_json::from_str(
            r#"{"id": 1, "items": [
                {"quantity": 2, "unitPrice": 100},
                {"quantity": 1, "product": {"name": "Bi Aramith", "price": 50}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(order.total(), Price::from_dong(250));
        assert_eq!(order.items[1].name(), "Bi Aramith");
    }

    #[test]
    fn test_rfc3339_and_garbage_timestamps() {
        assert!(parse_timestamp("2025-03-01T09:15:00+07:00").is_some());
        assert!(parse_timestamp("2025-03-01T09:15:00.123456").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_dashboard_stats_defaults_missing_counters() {
        let stats: DashboardStats = serde_json::from_str(r#"{"totalOrders": 4}"#).unwrap();
        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.total_revenue, Price::ZERO);
    }
}
