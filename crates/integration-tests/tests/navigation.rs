//! Route guards and the return-after-login flow.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;

use cue_shop_integration_tests::{MockBackend, PASSWORD};
use cue_shop_storefront::routes::Page;

#[tokio::test]
async fn test_protected_page_returns_after_login() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = backend.app(dir.path());

    let nav = app.navigator().navigate("/account");
    assert!(nav.was_redirected());
    assert_eq!(nav.page, Page::Login);
    assert_eq!(app.navigator().return_to().as_deref(), Some("/account"));

    app.session()
        .login("hoa", &SecretString::from(PASSWORD))
        .await
        .unwrap();
    let nav = app.navigator().after_login();

    assert_eq!(nav.page, Page::Account);
    assert_eq!(nav.location, "/account");
    assert!(app.navigator().return_to().is_none());
}

#[tokio::test]
async fn test_return_location_survives_restart() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();

    {
        let (app, _) = backend.app(dir.path());
        app.navigator().navigate("/my-orders");
    }

    let (app, _) = backend.app(dir.path());
    app.session()
        .login("hoa", &SecretString::from(PASSWORD))
        .await
        .unwrap();
    assert_eq!(app.navigator().after_login().page, Page::MyOrders);
}

#[tokio::test]
async fn test_admin_lands_on_dashboard() {
    let backend = MockBackend::start().await;
    backend.state().set_login_role("ADMIN");
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = backend.app(dir.path());

    app.navigator().navigate("/account");
    app.session()
        .login("boss", &SecretString::from(PASSWORD))
        .await
        .unwrap();

    assert_eq!(app.navigator().after_login().page, Page::AdminDashboard);
    // Shop pages send admins back to the panel
    assert_eq!(app.navigator().navigate("/cart").page, Page::AdminDashboard);
}

#[tokio::test]
async fn test_customer_is_kept_out_of_admin() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = backend.app(dir.path());

    app.session()
        .login("hoa", &SecretString::from(PASSWORD))
        .await
        .unwrap();

    let nav = app.navigator().navigate("/admin/orders");
    assert!(nav.was_redirected());
    assert_eq!(nav.page, Page::Home);
}
