//! Cart line record.

use serde::{Deserialize, Serialize};

use crate::types::{Price, Product, ProductId};

/// One line of the shopping cart.
///
/// This is also the persisted shape: the cart is stored as a JSON array of
/// these records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CartItem {
    /// A line for `quantity` units of `product` at its current price.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity,
            image_url: product.image_url.clone(),
        }
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}
