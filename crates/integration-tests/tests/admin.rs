//! Admin panel operations against the mock backend.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;

use cue_shop_admin::{AdminClient, AdminError};
use cue_shop_core::{OrderId, OrderStatus, Price, ProductForm, ProductId, SupplierForm, SupplierId};
use cue_shop_integration_tests::{MockBackend, PASSWORD};
use cue_shop_storefront::state::AppState;

async fn sign_in(backend: &MockBackend, dir: &std::path::Path, role: &str) -> AppState {
    backend.state().set_login_role(role);
    let (app, _) = backend.app(dir);
    app.session()
        .login("boss", &SecretString::from(PASSWORD))
        .await
        .unwrap();
    app
}

async fn admin(backend: &MockBackend, dir: &std::path::Path) -> AdminClient {
    let app = sign_in(backend, dir, "ADMIN").await;
    AdminClient::from_session(app.session()).unwrap()
}

#[tokio::test]
async fn test_customer_cannot_open_admin_client() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let app = sign_in(&backend, dir.path(), "CUSTOMER").await;

    let err = AdminClient::from_session(app.session()).unwrap_err();
    assert!(matches!(err, AdminError::Forbidden(_)));
    assert_eq!(err.user_message(), "Bạn không có quyền truy cập");
}

#[tokio::test]
async fn test_signed_out_cannot_open_admin_client() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = backend.app(dir.path());

    let err = AdminClient::from_session(app.session()).unwrap_err();
    assert!(matches!(err, AdminError::NotAuthenticated));
}

#[tokio::test]
async fn test_dashboard_shows_stats_and_recent_orders() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let admin = admin(&backend, dir.path()).await;

    let dashboard = admin.dashboard().await;

    assert_eq!(dashboard.stats.total_products, 4);
    assert_eq!(dashboard.stats.total_revenue, Price::from_dong(9_000_250));
    let ids: Vec<_> = dashboard.recent_orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![OrderId::new(12), OrderId::new(11)]);
}

#[tokio::test]
async fn test_order_detail_falls_back_to_shop_endpoint() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let admin = admin(&backend, dir.path()).await;

    let order = admin.order(OrderId::new(12)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);

    let err = admin.order(OrderId::new(999)).await.unwrap_err();
    assert!(matches!(err, AdminError::NotFound(_)));
}

#[tokio::test]
async fn test_update_order_status() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let admin = admin(&backend, dir.path()).await;

    admin
        .update_order_status(OrderId::new(11), OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(backend.state().order_status(11).as_deref(), Some("SHIPPED"));

    let err = admin
        .update_order_status(OrderId::new(11), OrderStatus::Unknown)
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::BadRequest(_)));
}

#[tokio::test]
async fn test_product_crud_refreshes_catalog() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let admin = admin(&backend, dir.path()).await;

    let form = ProductForm {
        name: "Lơ Kamui".to_string(),
        description: "Lơ cao cấp".to_string(),
        price: Price::from_dong(300_000),
        quantity_in_stock: 20,
        supplier_id: Some(SupplierId::new(1)),
        category_id: None,
        image_url: None,
    };
    admin.create_product(&form).await.unwrap();
    let products = admin.products().await.unwrap();
    assert_eq!(products.len(), 5);
    let created = products.iter().find(|p| p.name == "Lơ Kamui").unwrap();

    let renamed = ProductForm {
        name: "Lơ Kamui Black".to_string(),
        ..form
    };
    admin.update_product(created.id, &renamed).await.unwrap();
    let fetched = admin.api().product(created.id).await.unwrap();
    assert_eq!(fetched.name, "Lơ Kamui Black");

    admin.delete_product(ProductId::new(2)).await.unwrap();
    assert_eq!(admin.products().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_invalid_product_is_not_sent() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let admin = admin(&backend, dir.path()).await;

    let form = ProductForm {
        name: String::new(),
        description: String::new(),
        price: Price::from_dong(-1),
        quantity_in_stock: 0,
        supplier_id: None,
        category_id: None,
        image_url: None,
    };
    let err = admin.create_product(&form).await.unwrap_err();

    assert!(matches!(err, AdminError::BadRequest(_)));
    assert_eq!(admin.products().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_supplier_crud() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let admin = admin(&backend, dir.path()).await;

    admin
        .create_supplier(&SupplierForm {
            name: "Mezz Việt Nam".to_string(),
            contact_info: "mezz@example.com".to_string(),
        })
        .await
        .unwrap();
    let suppliers = admin.suppliers().await.unwrap();
    assert_eq!(suppliers.len(), 2);
    let mezz = suppliers.iter().find(|s| s.name == "Mezz Việt Nam").unwrap();

    admin
        .update_supplier(
            mezz.id,
            &SupplierForm {
                name: "Mezz VN".to_string(),
                contact_info: "0908111222".to_string(),
            },
        )
        .await
        .unwrap();
    let suppliers = admin.suppliers().await.unwrap();
    let updated = suppliers.iter().find(|s| s.id == mezz.id).unwrap();
    assert_eq!(updated.name, "Mezz VN");
    assert_eq!(updated.contact_info.as_deref(), Some("0908111222"));

    admin.delete_supplier(SupplierId::new(1)).await.unwrap();
    assert_eq!(admin.suppliers().await.unwrap().len(), 1);

    let err = admin.delete_supplier(SupplierId::new(1)).await.unwrap_err();
    assert!(matches!(err, AdminError::Api(_)));
}
