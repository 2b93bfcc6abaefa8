//! Shopper order views: history, detail with progress, cancellation.

use std::cmp::Reverse;

use tracing::{debug, info, instrument, warn};

use cue_shop_core::{Order, OrderId, OrderStatus};

use crate::api::ApiError;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::notify::Notifier;
use crate::session::SessionStore;

/// One step of the delivery progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStep {
    pub status: OrderStatus,
    pub label: &'static str,
    /// The order reached this step.
    pub completed: bool,
    /// The order is at this step right now.
    pub active: bool,
}

const PROGRESS: [(OrderStatus, &str); 4] = [
    (OrderStatus::Pending, "Đặt hàng"),
    (OrderStatus::Confirmed, "Xác nhận"),
    (OrderStatus::Shipped, "Đang giao"),
    (OrderStatus::Delivered, "Hoàn thành"),
];

/// Progress of an order along pending → confirmed → shipped → delivered.
///
/// Statuses off that path (cancelled, processing, ...) complete no step.
#[must_use]
pub fn progress(status: OrderStatus) -> [ProgressStep; 4] {
    let current = PROGRESS.iter().position(|(s, _)| *s == status);
    let mut index = 0;
    PROGRESS.map(|(step, label)| {
        let reached = current.is_some_and(|c| index <= c);
        let active = current == Some(index);
        index += 1;
        ProgressStep {
            status: step,
            label,
            completed: reached,
            active,
        }
    })
}

/// Newest first; orders without a timestamp go last, higher ids first.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by_key(|o| (Reverse(o.created_at), Reverse(o.id.as_i64())));
}

/// Orders of the signed-in shopper, newest first.
///
/// # Errors
///
/// Returns [`AppError::NotAuthenticated`] without a session, or the request
/// error.
#[instrument(skip_all)]
pub async fn my_orders(session: &SessionStore) -> Result<Vec<Order>> {
    let token = session.require_token()?;
    let mut orders = session.api().my_orders(&token).await?;
    sort_newest_first(&mut orders);
    debug!(count = orders.len(), "Loaded order history");
    Ok(orders)
}

/// One order of the signed-in shopper.
///
/// When `/orders/:id` fails, the shopper's history is searched instead.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] when neither lookup finds the order.
#[instrument(skip(session))]
pub async fn order_detail(session: &SessionStore, id: OrderId) -> Result<Order> {
    let token = session.require_token()?;
    let api = session.api();

    let err = match api.order(&token, id).await {
        Ok(order) => return Ok(order),
        Err(err) => err,
    };
    warn!(order_id = %id, error = %err, "Order lookup failed, searching history");

    if let Ok(orders) = api.my_orders(&token).await
        && let Some(order) = orders.into_iter().find(|o| o.id == id)
    {
        return Ok(order);
    }

    Err(AppError::NotFound(match err.status() {
        Some(status) => format!("Không thể tải thông tin đơn hàng ({status})"),
        None => "Không thể tải thông tin đơn hàng".to_string(),
    }))
}

/// Message shown when cancelling fails.
#[must_use]
pub fn cancel_error_message(err: &ApiError) -> String {
    if let Some(message) = err.backend_message() {
        return message.to_owned();
    }
    match err.status() {
        Some(403) => "Bạn không có quyền hủy đơn hàng này",
        Some(404) => "Không tìm thấy đơn hàng",
        Some(400) => "Đơn hàng không thể hủy (có thể đã được xử lý)",
        Some(_) => "Không thể hủy đơn hàng",
        None => "Có lỗi xảy ra khi hủy đơn hàng",
    }
    .to_string()
}

/// Cancel one of the shopper's orders.
///
/// # Errors
///
/// Returns [`AppError::Rejected`] with the message from
/// [`cancel_error_message`] when the backend refuses. The outcome is also
/// sent to `notifier`.
#[instrument(skip(session, notifier))]
pub async fn cancel_order(
    session: &SessionStore,
    notifier: &dyn Notifier,
    id: OrderId,
) -> Result<()> {
    let token = session.require_token()?;

    if let Err(err) = session.api().cancel_order(&token, id).await {
        let message = cancel_error_message(&err);
        warn!(order_id = %id, error = %err, "Cancel refused");
        notifier.error(&message);
        return Err(AppError::Rejected(message));
    }

    let id_text = id.to_string();
    add_breadcrumb("orders", "Cancelled order", Some(&[("order_id", id_text.as_str())]));
    info!(order_id = %id, "Order cancelled");
    notifier.success("Đơn hàng đã được hủy thành công");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(id: i64, created_at: Option<&str>) -> Order {
        let json = serde_json::json!({ "id": id, "createdAt": created_at });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_progress_shipped() {
        let steps = progress(OrderStatus::Shipped);
        let completed: Vec<bool> = steps.iter().map(|s| s.completed).collect();
        assert_eq!(completed, [true, true, true, false]);
        assert!(steps[2].active);
        assert!(!steps[1].active);
    }

    #[test]
    fn test_progress_off_path() {
        assert!(progress(OrderStatus::Cancelled).iter().all(|s| !s.completed && !s.active));
    }

    #[test]
    fn test_newest_first() {
        let mut orders = vec![
            order(1, Some("2025-01-02T10:00:00")),
            order(2, None),
            order(3, Some("2025-03-01T08:00:00")),
            order(4, Some("2025-01-02T10:00:00")),
        ];
        sort_newest_first(&mut orders);
        let ids: Vec<i64> = orders.iter().map(|o| o.id.as_i64()).collect();
        assert_eq!(ids, [3, 4, 1, 2]);
    }

    #[test]
    fn test_cancel_messages() {
        let with_body = ApiError::Status {
            status: 400,
            message: Some("Order already shipped".to_string()),
        };
        assert_eq!(cancel_error_message(&with_body), "Order already shipped");

        let forbidden = ApiError::Status {
            status: 403,
            message: None,
        };
        assert_eq!(
            cancel_error_message(&forbidden),
            "Bạn không có quyền hủy đơn hàng này"
        );

        let conflict = ApiError::Status {
            status: 409,
            message: None,
        };
        assert_eq!(cancel_error_message(&conflict), "Không thể hủy đơn hàng");

        let parse = ApiError::Parse("eof".to_string());
        assert_eq!(
            cancel_error_message(&parse),
            "Có lỗi xảy ra khi hủy đơn hàng"
        );
    }
}
