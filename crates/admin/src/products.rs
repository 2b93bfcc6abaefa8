//! Product CRUD (`/products`).

use reqwest::Method;
use tracing::{info, instrument};

use cue_shop_core::{Price, Product, ProductForm, ProductId};

use crate::client::AdminClient;
use crate::error::{AdminError, Result};

/// Check a product form before sending it.
///
/// # Errors
///
/// Returns [`AdminError::BadRequest`] naming the first problem.
pub fn validate_product(form: &ProductForm) -> Result<()> {
    if form.name.trim().is_empty() {
        return Err(AdminError::BadRequest("Tên sản phẩm không được để trống".to_string()));
    }
    if form.price < Price::ZERO {
        return Err(AdminError::BadRequest("Giá không hợp lệ".to_string()));
    }
    if form.quantity_in_stock < 0 {
        return Err(AdminError::BadRequest("Số lượng không hợp lệ".to_string()));
    }
    Ok(())
}

/// Products whose name contains `search` (case-insensitive) and, when
/// given, whose category is `category`.
#[must_use]
pub fn filter_products<'a>(
    products: &'a [Product],
    search: &str,
    category: Option<&str>,
) -> Vec<&'a Product> {
    let needle = search.trim().to_lowercase();
    products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .filter(|p| category.is_none_or(|c| p.category_name() == c))
        .collect()
}

impl AdminClient {
    /// All products, bypassing the storefront catalog cache.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>> {
        self.get("/products").await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns error if the form is invalid or the backend rejects it.
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create_product(&self, form: &ProductForm) -> Result<()> {
        validate_product(form)?;
        let url = self.endpoint("/products")?;
        self.send(self.request(Method::POST, url).json(form)).await?;
        self.api().invalidate_catalog();
        info!("Product created");
        Ok(())
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns error if the form is invalid or the backend rejects it.
    #[instrument(skip(self, form))]
    pub async fn update_product(&self, id: ProductId, form: &ProductForm) -> Result<()> {
        validate_product(form)?;
        let url = self.endpoint(&format!("/products/{id}"))?;
        self.send(self.request(Method::PUT, url).json(form)).await?;
        self.api().invalidate_catalog();
        info!("Product updated");
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the deletion.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        let url = self.endpoint(&format!("/products/{id}"))?;
        self.send(self.request(Method::DELETE, url)).await?;
        self.api().invalidate_catalog();
        info!("Product deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, price: i64, stock: i64) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            description: String::new(),
            price: Price::from_dong(price),
            quantity_in_stock: stock,
            supplier_id: None,
            category_id: None,
            image_url: None,
        }
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&form("Cơ Fury", 3_000_000, 4)).is_ok());
        assert!(matches!(
            validate_product(&form("  ", 3_000_000, 4)),
            Err(AdminError::BadRequest(_))
        ));
        assert!(validate_product(&form("Cơ Fury", -1, 4)).is_err());
        assert!(validate_product(&form("Cơ Fury", 10, -2)).is_err());
    }

    #[test]
    fn test_filter_products() {
        let products: Vec<Product> = serde_json::from_str(
            r#"[
                {"id": 1, "name": "Cơ Predator", "price": 9000000, "category": "Cơ"},
                {"id": 2, "name": "Bao cơ da", "price": 700000, "category": "Phụ kiện"},
                {"id": 3, "name": "Bi Aramith", "price": 3500000}
            ]"#,
        )
        .unwrap();

        let ids = |found: Vec<&Product>| found.iter().map(|p| p.id.as_i64()).collect::<Vec<_>>();
        assert_eq!(ids(filter_products(&products, "CƠ", None)), [1, 2]);
        assert_eq!(ids(filter_products(&products, "cơ", Some("Cơ"))), [1]);
        assert_eq!(ids(filter_products(&products, "", Some("Other"))), [3]);
    }
}
