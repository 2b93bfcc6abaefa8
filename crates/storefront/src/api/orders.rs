//! `/orders` endpoints used by shoppers.

use reqwest::Method;
use secrecy::SecretString;
use serde::Serialize;
use tracing::instrument;

use cue_shop_core::{CartItem, Order, OrderId, PaymentMethod, ProductId};

use super::{ApiClient, ApiError};

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub address: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<NewOrderLine>,
}

/// One ordered product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl From<&CartItem> for NewOrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

impl ApiClient {
    /// Place an order.
    ///
    /// The created order is returned when the backend echoes it back in a
    /// shape this client understands.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the order.
    #[instrument(skip(self, token, order), fields(lines = order.items.len()))]
    pub async fn place_order(
        &self,
        token: &SecretString,
        order: &NewOrder,
    ) -> Result<Option<Order>, ApiError> {
        let url = self.endpoint("/orders")?;
        let response = self
            .execute(self.request(Method::POST, url, Some(token)).json(order))
            .await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes).ok())
    }

    /// Orders of the signed-in shopper (`GET /orders/my`).
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip_all)]
    pub async fn my_orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        self.get_json("/orders/my", Some(token)).await
    }

    /// One order (`GET /orders/:id`).
    ///
    /// # Errors
    ///
    /// Returns error if the order is missing or not visible to the shopper.
    #[instrument(skip(self, token))]
    pub async fn order(&self, token: &SecretString, id: OrderId) -> Result<Order, ApiError> {
        self.get_json(&format!("/orders/{id}"), Some(token)).await
    }

    /// Cancel a pending order (`PUT /orders/:id/cancel`).
    ///
    /// # Errors
    ///
    /// Returns error if the backend refuses the cancellation.
    #[instrument(skip(self, token))]
    pub async fn cancel_order(&self, token: &SecretString, id: OrderId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/orders/{id}/cancel"))?;
        self.execute_empty(self.request(Method::PUT, url, Some(token)))
            .await
    }
}
