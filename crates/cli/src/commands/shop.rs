//! Catalog, cart and wishlist screens.

use cue_shop_core::ProductId;
use cue_shop_storefront::catalog::{self, CatalogQuery};
use cue_shop_storefront::error::AppError;
use cue_shop_storefront::state::AppState;

use super::{Result, open};
use crate::output;

pub async fn home(state: &AppState) -> Result<()> {
    open(state, "/")?;
    let sections = state.api().home_sections().await;
    for (section, products) in sections.iter() {
        output::heading(section.title());
        output::products(products);
    }
    Ok(())
}

pub async fn list_products(state: &AppState, query: &CatalogQuery) -> Result<()> {
    let mut location = format!("/products?sort={}&page={}", query.sort.as_str(), query.page);
    if let Some(search) = &query.search {
        location.push_str("&q=");
        location.push_str(search);
    }
    open(state, &location)?;

    let page = catalog::browse(state.api(), query).await?;
    output::products(&page.products);
    output::line(&format!(
        "Trang {}/{} ({} sản phẩm) | Danh mục: {}",
        page.page,
        page.total_pages.max(1),
        page.total,
        page.categories.join(", ")
    ));
    Ok(())
}

pub async fn show_product(state: &AppState, id: ProductId) -> Result<()> {
    open(state, &format!("/products/{id}"))?;
    let product = state
        .api()
        .product(id)
        .await
        .map_err(|e| match e.status() {
            Some(404) => AppError::NotFound(format!("sản phẩm #{id}")),
            _ => AppError::from(e),
        })?;
    output::product(&product);
    if state.wishlist().contains(id) {
        output::line("♥ Trong danh sách yêu thích");
    }
    Ok(())
}

pub fn show_cart(state: &AppState) -> Result<()> {
    open(state, "/cart")?;
    let cart = state.cart();
    output::cart(&cart.items(), cart.total_amount());
    Ok(())
}

/// Add to cart from the product page, with its login and stock checks.
pub async fn add_to_cart(state: &AppState, id: ProductId, quantity: u32) -> Result<()> {
    open(state, &format!("/products/{id}"))?;
    let product = state.api().product(id).await.map_err(AppError::from)?;
    catalog::add_product_to_cart(state.session(), state.cart(), state.notifier(), &product, quantity)?;
    Ok(())
}

pub fn remove_from_cart(state: &AppState, id: ProductId) -> Result<()> {
    open(state, "/cart")?;
    state.cart().remove_from_cart(id);
    Ok(())
}

pub fn update_cart(state: &AppState, id: ProductId, quantity: u32) -> Result<()> {
    open(state, "/cart")?;
    state.cart().update_quantity(id, quantity)?;
    let cart = state.cart();
    output::cart(&cart.items(), cart.total_amount());
    Ok(())
}

pub fn clear_cart(state: &AppState) -> Result<()> {
    open(state, "/cart")?;
    state.cart().clear_cart();
    state.notifier().success("Đã xóa toàn bộ giỏ hàng");
    Ok(())
}

pub async fn show_wishlist(state: &AppState) -> Result<()> {
    open(state, "/wishlist")?;
    let products = state.wishlist().products(state.api()).await?;
    output::products(&products);
    Ok(())
}

pub async fn add_to_wishlist(state: &AppState, id: ProductId) -> Result<()> {
    open(state, "/wishlist")?;
    // Only real products go on the list
    let product = state.api().product(id).await.map_err(AppError::from)?;
    if state.wishlist().add(id)? {
        state
            .notifier()
            .success(&format!("Đã thêm {} vào danh sách yêu thích", product.name));
    } else {
        state.notifier().info("Sản phẩm đã có trong danh sách yêu thích");
    }
    Ok(())
}

pub fn remove_from_wishlist(state: &AppState, id: ProductId) -> Result<()> {
    open(state, "/wishlist")?;
    if state.wishlist().remove(id)? {
        state.notifier().success("Đã xóa khỏi danh sách yêu thích");
    }
    Ok(())
}
