//! Checkout: turn the cart into an order.

use tracing::{info, instrument};

use cue_shop_core::{Order, PaymentMethod, User};

use crate::api::{NewOrder, NewOrderLine};
use crate::cart::CartStore;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::notify::Notifier;
use crate::session::SessionStore;

/// Where the shopper lands after a successful checkout.
pub const ORDERS_PATH: &str = "/my-orders";

/// Delivery details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub address: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    /// Start from the shopper's saved address and phone number.
    #[must_use]
    pub fn prefill(user: Option<&User>) -> Self {
        Self {
            address: user.and_then(|u| u.address.clone()).unwrap_or_default(),
            phone: user.and_then(|u| u.phone_number.clone()).unwrap_or_default(),
            payment_method: PaymentMethod::default(),
        }
    }

    /// Whether the form came with delivery details from the profile.
    #[must_use]
    pub fn is_prefilled(&self) -> bool {
        !self.address.is_empty() || !self.phone.is_empty()
    }
}

/// Place an order for everything in the cart.
///
/// On success the cart is emptied; the caller should then navigate to
/// [`ORDERS_PATH`]. Returns the created order when the backend echoes it.
///
/// # Errors
///
/// Returns [`AppError::NotAuthenticated`] without a signed-in user,
/// [`AppError::Rejected`] for missing delivery details or an empty cart and
/// [`AppError::RequestFailed`] when the backend refuses the order. Every
/// failure is also sent to `notifier`.
#[instrument(skip_all, fields(payment = %form.payment_method))]
pub async fn checkout(
    session: &SessionStore,
    cart: &CartStore,
    notifier: &dyn Notifier,
    form: &CheckoutForm,
) -> Result<Option<Order>> {
    let token = match (session.user(), session.token()) {
        (Some(_), Some(token)) => token,
        _ => {
            notifier.error("Vui lòng đăng nhập để tiếp tục thanh toán");
            return Err(AppError::NotAuthenticated);
        }
    };

    if form.address.trim().is_empty() || form.phone.trim().is_empty() {
        let message = "Vui lòng nhập đầy đủ thông tin giao hàng";
        notifier.error(message);
        return Err(AppError::Rejected(message.to_string()));
    }

    let items = cart.items();
    if items.is_empty() {
        let message = "Giỏ hàng của bạn đang trống";
        notifier.error(message);
        return Err(AppError::Rejected(message.to_string()));
    }

    let order = NewOrder {
        address: form.address.trim().to_owned(),
        phone: form.phone.trim().to_owned(),
        payment_method: form.payment_method,
        items: items.iter().map(NewOrderLine::from).collect(),
    };

    let created = match session.api().place_order(&token, &order).await {
        Ok(created) => created,
        Err(e) => {
            notifier.error("Có lỗi khi đặt hàng");
            let err = AppError::RequestFailed(e);
            err.report();
            return Err(err);
        }
    };

    cart.clear_cart();
    add_breadcrumb("checkout", "Placed order", None);
    info!(
        order_id = ?created.as_ref().map(|o| o.id),
        lines = order.items.len(),
        "Order placed"
    );
    notifier.success("Đặt hàng thành công");
    Ok(created)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use url::Url;

    use super::*;
    use crate::api::ApiClient;
    use crate::notify::RecordingNotifier;
    use crate::storage::{MemoryStorage, Storage};

    #[test]
    fn test_prefill_from_profile() {
        let user = User {
            id: None,
            username: "hoa".to_string(),
            role: None,
            full_name: None,
            email: None,
            phone_number: Some("0912345678".to_string()),
            address: Some("5 Nguyễn Huệ, TP.HCM".to_string()),
        };
        let form = CheckoutForm::prefill(Some(&user));
        assert_eq!(form.address, "5 Nguyễn Huệ, TP.HCM");
        assert_eq!(form.phone, "0912345678");
        assert_eq!(form.payment_method, PaymentMethod::Cod);
        assert!(form.is_prefilled());

        assert!(!CheckoutForm::prefill(None).is_prefilled());
    }

    #[tokio::test]
    async fn test_checkout_requires_user() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let api = ApiClient::with_base_url(Url::parse("http://127.0.0.1:9/api").unwrap());
        let session = SessionStore::new(api, Arc::clone(&storage));
        let notifier = Arc::new(RecordingNotifier::new());
        let cart = CartStore::load(storage, notifier.clone());

        let result = checkout(&session, &cart, notifier.as_ref(), &CheckoutForm::default()).await;

        assert!(matches!(result, Err(AppError::NotAuthenticated)));
        assert_eq!(
            notifier.messages(),
            ["Vui lòng đăng nhập để tiếp tục thanh toán"]
        );
    }
}
