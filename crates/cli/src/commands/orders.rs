//! Checkout and order history screens.

use cue_shop_core::{OrderId, PaymentMethod};
use cue_shop_storefront::checkout::{self, CheckoutForm, ORDERS_PATH};
use cue_shop_storefront::orders;
use cue_shop_storefront::state::AppState;

use super::{Result, open};
use crate::output;

/// Checkout fields given on the command line; missing ones come from the
/// profile.
#[derive(Debug, Default)]
pub struct CheckoutArgs {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub payment: Option<PaymentMethod>,
}

pub async fn checkout(state: &AppState, args: CheckoutArgs) -> Result<()> {
    open(state, "/checkout")?;

    let prefilled = CheckoutForm::prefill(state.session().user().as_ref());
    let form = CheckoutForm {
        address: args.address.unwrap_or(prefilled.address),
        phone: args.phone.unwrap_or(prefilled.phone),
        payment_method: args.payment.unwrap_or(prefilled.payment_method),
    };

    let cart = state.cart();
    output::cart(&cart.items(), cart.total_amount());
    output::line(&format!(
        "Giao tới: {} | {} | {}",
        form.address,
        form.phone,
        form.payment_method.label()
    ));

    let created = checkout::checkout(state.session(), cart, state.notifier(), &form).await?;
    if let Some(order) = created {
        output::line(&format!("Mã đơn hàng: #{}", order.id));
    }

    let landing = open(state, ORDERS_PATH)?;
    output::line(&format!("→ {}", landing.location));
    list(state).await
}

pub async fn list(state: &AppState) -> Result<()> {
    open(state, ORDERS_PATH)?;
    let orders = orders::my_orders(state.session()).await?;
    output::orders(&orders.iter().collect::<Vec<_>>());
    Ok(())
}

pub async fn show(state: &AppState, id: OrderId) -> Result<()> {
    open(state, &format!("/orders/{id}"))?;
    let order = orders::order_detail(state.session(), id).await?;
    let progress = orders::progress(order.status);
    output::order(&order, Some(&progress));
    if order.status.is_cancellable() {
        output::line(&format!("Có thể hủy: cue-shop orders cancel {id}"));
    }
    Ok(())
}

pub async fn cancel(state: &AppState, id: OrderId) -> Result<()> {
    open(state, &format!("/orders/{id}"))?;
    orders::cancel_order(state.session(), state.notifier(), id).await?;
    Ok(())
}
