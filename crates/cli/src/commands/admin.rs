//! Admin panel screens.
//!
//! # Usage
//!
//! ```bash
//! cue-shop admin stats
//! cue-shop admin products create --name "Cơ Predator" --price 9000000 --stock 3
//! cue-shop admin orders list --status pending --since week
//! cue-shop admin orders status 42 shipped
//! ```

use chrono::Local;

use cue_shop_admin::{AdminClient, OrderFilter};
use cue_shop_admin::products::filter_products;
use cue_shop_core::{
    CategoryId, OrderId, OrderStatus, Price, ProductForm, ProductId, SupplierForm, SupplierId,
};
use cue_shop_storefront::state::AppState;

use super::{Result, open};
use crate::output;

/// Product form fields; on update `None` keeps the current value.
#[derive(Debug, Default)]
pub struct ProductArgs {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i64>,
    pub supplier: Option<SupplierId>,
    pub category: Option<CategoryId>,
    pub image_url: Option<String>,
}

impl ProductArgs {
    fn apply(self, mut form: ProductForm) -> ProductForm {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(price) = self.price {
            form.price = Price::from_dong(price);
        }
        if let Some(stock) = self.stock {
            form.quantity_in_stock = stock;
        }
        form.supplier_id = self.supplier.or(form.supplier_id);
        form.category_id = self.category.or(form.category_id);
        form.image_url = self.image_url.or(form.image_url);
        form
    }
}

fn client(state: &AppState, location: &str) -> Result<AdminClient> {
    open(state, location)?;
    Ok(AdminClient::from_session(state.session())?)
}

pub async fn stats(state: &AppState) -> Result<()> {
    let admin = client(state, "/admin")?;
    let dashboard = admin.dashboard().await;
    let s = &dashboard.stats;

    output::heading("Tổng quan");
    output::line(&format!("Tổng sản phẩm:   {}", s.total_products));
    output::line(&format!("Tổng đơn hàng:   {}", s.total_orders));
    output::line(&format!("Khách hàng:      {}", s.total_customers));
    output::line(&format!("Doanh thu:       {}", s.total_revenue));
    output::line(&format!("Chờ xử lý:       {}", s.pending_orders));
    output::line(&format!("Hoàn thành:      {}", s.completed_orders));

    output::heading("Đơn hàng gần đây");
    output::orders(&dashboard.recent_orders.iter().collect::<Vec<_>>());
    Ok(())
}

// =============================================================================
// Products
// =============================================================================

pub async fn list_products(state: &AppState, search: &str, category: Option<&str>) -> Result<()> {
    let admin = client(state, "/admin/products")?;
    let products = admin.products().await?;
    let shown: Vec<_> = filter_products(&products, search, category)
        .into_iter()
        .cloned()
        .collect();
    output::products(&shown);
    Ok(())
}

pub async fn create_product(state: &AppState, args: ProductArgs) -> Result<()> {
    let admin = client(state, "/admin/products")?;
    let form = ProductForm {
        name: String::new(),
        description: String::new(),
        price: Price::ZERO,
        quantity_in_stock: 0,
        supplier_id: None,
        category_id: None,
        image_url: None,
    };
    admin.create_product(&args.apply(form)).await?;
    state.notifier().success("Thêm sản phẩm thành công!");
    Ok(())
}

pub async fn update_product(state: &AppState, id: ProductId, args: ProductArgs) -> Result<()> {
    let admin = client(state, "/admin/products")?;
    let current = admin
        .api()
        .product(id)
        .await
        .map_err(cue_shop_admin::AdminError::from)?;
    admin
        .update_product(id, &args.apply(ProductForm::from(&current)))
        .await?;
    state.notifier().success("Cập nhật sản phẩm thành công!");
    Ok(())
}

pub async fn delete_product(state: &AppState, id: ProductId) -> Result<()> {
    let admin = client(state, "/admin/products")?;
    admin.delete_product(id).await?;
    state.notifier().success("Xóa sản phẩm thành công!");
    Ok(())
}

// =============================================================================
// Suppliers
// =============================================================================

pub async fn list_suppliers(state: &AppState) -> Result<()> {
    let admin = client(state, "/admin/suppliers")?;
    output::suppliers(&admin.suppliers().await?);
    Ok(())
}

pub async fn create_supplier(state: &AppState, form: SupplierForm) -> Result<()> {
    let admin = client(state, "/admin/suppliers")?;
    admin.create_supplier(&form).await?;
    state.notifier().success("Đã thêm NCC");
    Ok(())
}

pub async fn update_supplier(
    state: &AppState,
    id: SupplierId,
    name: Option<String>,
    contact_info: Option<String>,
) -> Result<()> {
    let admin = client(state, "/admin/suppliers")?;
    let current = admin
        .suppliers()
        .await?
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| cue_shop_admin::AdminError::NotFound(format!("nhà cung cấp #{id}")))?;

    let form = SupplierForm {
        name: name.unwrap_or(current.name),
        contact_info: contact_info.or(current.contact_info).unwrap_or_default(),
    };
    admin.update_supplier(id, &form).await?;
    state.notifier().success("Đã cập nhật NCC");
    Ok(())
}

pub async fn delete_supplier(state: &AppState, id: SupplierId) -> Result<()> {
    let admin = client(state, "/admin/suppliers")?;
    admin.delete_supplier(id).await?;
    state.notifier().success("Đã xóa NCC");
    Ok(())
}

// =============================================================================
// Orders
// =============================================================================

pub async fn list_orders(state: &AppState, filter: &OrderFilter) -> Result<()> {
    let admin = client(state, "/admin/orders")?;
    let mut orders = admin.orders().await?;
    cue_shop_admin::orders::newest_first(&mut orders);

    let now = Local::now().naive_local();
    let shown = filter.apply(&orders, now);
    output::orders(&shown);
    output::line(&format!("{} / {} đơn hàng", shown.len(), orders.len()));
    Ok(())
}

pub async fn show_order(state: &AppState, id: OrderId) -> Result<()> {
    let admin = client(state, "/admin/orders")?;
    let order = admin.order(id).await?;
    output::order(&order, None);
    Ok(())
}

pub async fn set_order_status(state: &AppState, id: OrderId, status: OrderStatus) -> Result<()> {
    let admin = client(state, "/admin/orders")?;
    admin.update_order_status(id, status).await?;
    state.notifier().success("Đã cập nhật trạng thái đơn hàng");
    Ok(())
}
