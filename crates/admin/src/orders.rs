//! Order management: list, detail, status changes and table filters.

use std::cmp::Reverse;
use std::str::FromStr;

use chrono::{Months, NaiveDateTime, TimeDelta};
use reqwest::Method;
use tracing::{info, instrument, warn};

use cue_shop_core::{Order, OrderId, OrderStatus, ParseEnumError};

use crate::client::AdminClient;
use crate::error::{AdminError, Result};

/// Newest first; orders without a timestamp go last.
pub fn newest_first(orders: &mut [Order]) {
    orders.sort_by_key(|o| (Reverse(o.created_at), Reverse(o.id.as_i64())));
}

/// Date window of the order table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateWindow {
    #[default]
    All,
    /// Same calendar day as now.
    Today,
    /// The last seven days.
    Week,
    /// The last calendar month.
    Month,
}

impl DateWindow {
    /// Whether an order placed at `created_at` falls in the window ending at
    /// `now`. Orders without a timestamp only match [`DateWindow::All`].
    #[must_use]
    pub fn contains(self, created_at: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
        let Some(created_at) = created_at else {
            return self == Self::All;
        };
        match self {
            Self::All => true,
            Self::Today => created_at.date() == now.date(),
            Self::Week => created_at >= now - TimeDelta::days(7),
            Self::Month => now
                .checked_sub_months(Months::new(1))
                .is_some_and(|start| created_at >= start),
        }
    }
}

impl FromStr for DateWindow {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(ParseEnumError::new("date window", s)),
        }
    }
}

/// Filters of the admin order table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Matches the order id, customer name or username.
    pub search: String,
    pub status: Option<OrderStatus>,
    pub window: DateWindow,
}

impl OrderFilter {
    #[must_use]
    pub fn matches(&self, order: &Order, now: NaiveDateTime) -> bool {
        let needle = self.search.trim().to_lowercase();
        let contains = |field: Option<&str>| field.is_some_and(|v| v.to_lowercase().contains(&needle));

        let matches_search = order.id.to_string().contains(&needle)
            || contains(order.customer_name.as_deref())
            || contains(order.customer_username.as_deref());

        matches_search
            && self.status.is_none_or(|s| s == order.status)
            && self.window.contains(order.created_at, now)
    }

    /// Orders passing the filter, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, orders: &'a [Order], now: NaiveDateTime) -> Vec<&'a Order> {
        orders.iter().filter(|o| self.matches(o, now)).collect()
    }
}

impl AdminClient {
    /// Every order in the shop (`GET /admin/orders`).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>> {
        self.get("/admin/orders").await
    }

    /// One order with customer details.
    ///
    /// Tries `/admin/orders/:id` first and falls back to `/orders/:id`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] when neither endpoint returns the order.
    #[instrument(skip(self))]
    pub async fn order(&self, id: OrderId) -> Result<Order> {
        match self.get(&format!("/admin/orders/{id}")).await {
            Ok(order) => return Ok(order),
            Err(e) => warn!(order_id = %id, error = %e, "Admin order detail failed, trying /orders"),
        }

        self.get(&format!("/orders/{id}"))
            .await
            .map_err(|e| match e {
                AdminError::Api(api) if api.status() == Some(404) => {
                    AdminError::NotFound(format!("đơn hàng #{id}"))
                }
                other => other,
            })
    }

    /// Move an order to `status` (`PUT /orders/:id/status?status=`).
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the change.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        if status == OrderStatus::Unknown {
            return Err(AdminError::BadRequest("Trạng thái không hợp lệ".to_string()));
        }
        let mut url = self.endpoint(&format!("/orders/{id}/status"))?;
        url.query_pairs_mut().append_pair("status", status.as_str());
        self.send(self.request(Method::PUT, url)).await?;
        info!(order_id = %id, status = %status, "Order status updated");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 15)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    fn orders() -> Vec<Order> {
        serde_json::from_str(
            r#"[
                {"id": 101, "status": "PENDING", "customerName": "Nguyễn Văn An",
                 "customerUsername": "an", "createdAt": "2025-03-15T08:30:00"},
                {"id": 102, "status": "SHIPPED", "customerName": "Trần Thị Bình",
                 "customerUsername": "binh", "createdAt": "2025-03-10T09:00:00"},
                {"id": 203, "status": "PENDING", "customerUsername": "cuong",
                 "createdAt": "2025-02-20T10:00:00"},
                {"id": 204, "status": "CANCELLED"}
            ]"#,
        )
        .unwrap()
    }

    fn ids(found: &[&Order]) -> Vec<i64> {
        found.iter().map(|o| o.id.as_i64()).collect()
    }

    #[test]
    fn test_search_by_id_and_names() {
        let orders = orders();
        let by = |search: &str| OrderFilter {
            search: search.to_string(),
            ..OrderFilter::default()
        };
        assert_eq!(ids(&by("10").apply(&orders, now())), [101, 102]);
        assert_eq!(ids(&by("BÌNH").apply(&orders, now())), [102]);
        assert_eq!(ids(&by("cuong").apply(&orders, now())), [203]);
        assert_eq!(by("").apply(&orders, now()).len(), 4);
    }

    #[test]
    fn test_status_filter() {
        let filter = OrderFilter {
            status: Some(OrderStatus::Pending),
            ..OrderFilter::default()
        };
        assert_eq!(ids(&filter.apply(&orders(), now())), [101, 203]);
    }

    #[test]
    fn test_date_windows() {
        let orders = orders();
        let within = |window: DateWindow| {
            let filter = OrderFilter {
                window,
                ..OrderFilter::default()
            };
            ids(&filter.apply(&orders, now()))
        };
        assert_eq!(within(DateWindow::Today), [101]);
        assert_eq!(within(DateWindow::Week), [101, 102]);
        assert_eq!(within(DateWindow::Month), [101, 102, 203]);
        assert_eq!(within(DateWindow::All), [101, 102, 203, 204]);
    }

    #[test]
    fn test_date_window_parse() {
        assert_eq!("Week".parse::<DateWindow>().unwrap(), DateWindow::Week);
        assert!("year".parse::<DateWindow>().is_err());
    }

    #[test]
    fn test_newest_first() {
        let mut orders = orders();
        newest_first(&mut orders);
        let ids: Vec<i64> = orders.iter().map(|o| o.id.as_i64()).collect();
        assert_eq!(ids, [101, 102, 203, 204]);
    }
}
