//! Catalog records.

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId, SupplierId};

/// A product as returned by the `/products` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub quantity_in_stock: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<i64>,
}

impl Product {
    /// Category name used for grouping; products without one fall under "Other".
    #[must_use]
    pub fn category_name(&self) -> &str {
        self.category.as_deref().unwrap_or("Other")
    }

    /// Whether at least one unit is in stock.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity_in_stock > 0
    }
}

/// Create/update payload for the admin product table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub quantity_in_stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<SupplierId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price,
            quantity_in_stock: product.quantity_in_stock,
            supplier_id: product.supplier_id,
            category_id: product.category_id,
            image_url: product.image_url.clone(),
        }
    }
}
