//! Integration tests for Cue Shop.
//!
//! The tests drive the real stores and endpoint modules against
//! [`MockBackend`], an in-process axum server on an ephemeral port that
//! speaks the shop REST API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cue-shop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session` - Login, logout, profile fetch and its races
//! - `cart` - Cart merge, totals and persistence
//! - `navigation` - Guards and the return-after-login flow
//! - `checkout` - Checkout and order views
//! - `admin` - Admin panel operations

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use cue_shop_storefront::api::ApiClient;
use cue_shop_storefront::config::StorefrontConfig;
use cue_shop_storefront::notify::RecordingNotifier;
use cue_shop_storefront::state::AppState;
use cue_shop_storefront::storage::{FileStorage, Storage};

/// Password every mock account accepts.
pub const PASSWORD: &str = "secret123";

/// Token the mock backend issues to `username`.
#[must_use]
pub fn token_for(username: &str) -> String {
    format!("tok-{username}")
}

/// Knobs and recordings of the mock backend.
#[derive(Debug, Default)]
pub struct MockState {
    /// `GET /users/me` calls served.
    pub me_hits: AtomicUsize,
    /// Delay before `GET /users/me` answers, in milliseconds.
    pub me_delay_ms: AtomicU64,
    /// Make `GET /users/me` answer 401.
    pub me_unauthorized: AtomicBool,
    /// Role reported by `GET /users/me`.
    pub me_role: Mutex<String>,
    /// Role reported by `POST /auth/login`.
    pub login_role: Mutex<String>,
    /// Make `GET /orders/:id` fail with 500.
    pub order_detail_broken: AtomicBool,
    pub products: Mutex<Vec<Value>>,
    pub orders: Mutex<Vec<Value>>,
    pub suppliers: Mutex<Vec<Value>>,
    /// Bodies received by `POST /orders`.
    pub placed: Mutex<Vec<Value>>,
    next_id: AtomicI64,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockState {
    fn seeded() -> Self {
        let state = Self {
            next_id: AtomicI64::new(1000),
            ..Self::default()
        };
        *lock(&state.me_role) = "CUSTOMER".to_string();
        *lock(&state.login_role) = "CUSTOMER".to_string();
        *lock(&state.products) = vec![
            json!({"id": 1, "name": "Cơ Predator Revo", "price": 9_000_000, "quantityInStock": 3,
                   "category": "Cơ", "description": "Ngọn carbon"}),
            json!({"id": 2, "name": "Bi Aramith Tournament", "price": 3_500_000, "quantityInStock": 10,
                   "category": "Bi"}),
            json!({"id": 3, "name": "Phấn Master", "price": 100, "quantityInStock": 0,
                   "category": "Phụ kiện"}),
            json!({"id": 4, "name": "Găng tay Mezz", "price": 50, "quantityInStock": 40}),
        ];
        *lock(&state.orders) = vec![
            json!({"id": 11, "status": "PENDING", "totalAmount": 250, "createdAt": "2025-03-01T10:00:00",
                   "customerName": "Lê Hoa", "customerUsername": "hoa",
                   "items": [{"productName": "Găng tay Mezz", "quantity": 5, "price": 50}]}),
            json!({"id": 12, "status": "SHIPPED", "totalAmount": 9_000_000, "createdAt": "2025-03-05T10:00:00",
                   "customerName": "Lê Hoa", "customerUsername": "hoa"}),
        ];
        *lock(&state.suppliers) = vec![json!({"id": 1, "name": "Predator VN", "contactInfo": "0909000000"})];
        state
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Set the role `GET /users/me` reports.
    pub fn set_me_role(&self, role: &str) {
        *lock(&self.me_role) = role.to_string();
    }

    /// Set the role `POST /auth/login` reports.
    pub fn set_login_role(&self, role: &str) {
        *lock(&self.login_role) = role.to_string();
    }

    pub fn set_me_delay(&self, delay: Duration) {
        self.me_delay_ms
            .store(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX), Ordering::SeqCst);
    }

    #[must_use]
    pub fn me_hits(&self) -> usize {
        self.me_hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn placed_orders(&self) -> Vec<Value> {
        lock(&self.placed).clone()
    }

    #[must_use]
    pub fn order_status(&self, id: i64) -> Option<String> {
        lock(&self.orders)
            .iter()
            .find(|o| o["id"] == id)
            .and_then(|o| o["status"].as_str().map(str::to_owned))
    }
}

type Shared = Arc<MockState>;

/// Shop REST backend served from the test process.
pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
    task: JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(MockState::seeded());
        let app = Router::new()
            .nest("/api", routes())
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state, task }
    }

    /// Base URL of the API, e.g. `http://127.0.0.1:41234/api`.
    ///
    /// # Panics
    ///
    /// Never in practice; the address is always a valid URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/api", self.addr)).expect("Invalid mock URL")
    }

    #[must_use]
    pub fn state(&self) -> &MockState {
        &self.state
    }

    /// A client without catalog cache.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::with_base_url(self.base_url())
    }

    /// Configuration pointing at this backend and `data_dir`.
    #[must_use]
    pub fn config(&self, data_dir: &std::path::Path) -> StorefrontConfig {
        StorefrontConfig::for_api(self.base_url(), data_dir)
    }

    /// Application state on file storage in `data_dir`, recording notices.
    ///
    /// # Panics
    ///
    /// Panics if the state cannot be built.
    #[must_use]
    pub fn app(&self, data_dir: &std::path::Path) -> (AppState, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(data_dir));
        let state = AppState::with_parts(self.config(data_dir), self.client(), storage, notifier.clone())
            .expect("Failed to build app state");
        (state, notifier)
    }
}

// =============================================================================
// Routes
// =============================================================================

fn routes() -> Router<Shared> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/users/me", get(me).put(update_me))
        .route("/products", get(products).post(create_product))
        .route("/products/search", get(search_products))
        .route("/products/flash-sales", get(products))
        .route("/products/best-selling", get(products))
        .route("/products/new-arrivals", get(products))
        .route("/products/explore", get(products))
        .route(
            "/products/{id}",
            get(product).put(update_product).delete(delete_product),
        )
        .route("/orders", post(place_order))
        .route("/orders/my", get(my_orders))
        .route("/orders/{id}", get(order))
        .route("/orders/{id}/cancel", put(cancel_order))
        .route("/orders/{id}/status", put(set_status))
        .route("/admin/orders", get(my_orders))
        .route("/admin/orders/{id}", get(admin_order))
        .route("/admin/dashboard/stats", get(stats))
        .route("/suppliers", get(suppliers).post(create_supplier))
        .route("/suppliers/{id}", put(update_supplier).delete(delete_supplier))
        .route("/contact", post(contact))
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Username behind the bearer token, if any.
fn bearer_user(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer tok-")
        .map(str::to_owned)
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<Credentials>) -> Response {
    if body.password != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Bad credentials");
    }
    let role = lock(&state.login_role).clone();
    Json(json!({
        "token": token_for(&body.username),
        "username": body.username,
        "role": role,
        "fullName": format!("Người dùng {}", body.username),
    }))
    .into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    match body["username"].as_str() {
        Some("taken") => error(StatusCode::BAD_REQUEST, "Username already exists"),
        Some("proxied") => (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            "<html><body><h1>400 Bad Request</h1></body></html>",
        )
            .into_response(),
        Some(_) if body["email"] == "used@example.com" => {
            error(StatusCode::BAD_REQUEST, "Email đã tồn tại")
        }
        Some(_) => "Đăng ký thành công".into_response(),
        None => error(StatusCode::BAD_REQUEST, "username is required"),
    }
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    state.me_hits.fetch_add(1, Ordering::SeqCst);
    let delay = state.me_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let Some(username) = bearer_user(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    if state.me_unauthorized.load(Ordering::SeqCst) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let role = lock(&state.me_role).clone();
    Json(json!({
        "id": 7,
        "username": username,
        "role": role,
        "fullName": "Lê Thị Hoa",
        "email": format!("{username}@example.com"),
        "phoneNumber": "0912345678",
        "address": "5 Nguyễn Huệ, Quận 1",
    }))
    .into_response()
}

async fn update_me(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let Some(username) = bearer_user(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let mut user = body;
    user["username"] = json!(username);
    user["role"] = json!("CUSTOMER");
    Json(user).into_response()
}

async fn products(State(state): State<Shared>) -> Json<Vec<Value>> {
    Json(lock(&state.products).clone())
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
}

async fn search_products(
    State(state): State<Shared>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Value>> {
    let needle = params.q.to_lowercase();
    let found = lock(&state.products)
        .iter()
        .filter(|p| {
            p["name"]
                .as_str()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();
    Json(found)
}

async fn product(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    lock(&state.products)
        .iter()
        .find(|p| p["id"] == id)
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Product not found"),
            |p| Json(p.clone()).into_response(),
        )
}

async fn create_product(State(state): State<Shared>, Json(mut body): Json<Value>) -> Response {
    body["id"] = json!(state.next_id());
    lock(&state.products).push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_product(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut products = lock(&state.products);
    let Some(slot) = products.iter_mut().find(|p| p["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };
    body["id"] = json!(id);
    *slot = body.clone();
    Json(body).into_response()
}

async fn delete_product(State(state): State<Shared>, Path(id): Path<i64>) -> StatusCode {
    lock(&state.products).retain(|p| p["id"] != id);
    StatusCode::NO_CONTENT
}

async fn place_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(username) = bearer_user(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let lines = body["items"].as_array().map_or(0, Vec::len);
    if lines == 0 {
        return error(StatusCode::BAD_REQUEST, "Order has no items");
    }

    lock(&state.placed).push(body.clone());
    let order = json!({
        "id": state.next_id(),
        "status": "PENDING",
        "paymentMethod": body["paymentMethod"],
        "shippingAddress": body["address"],
        "phone": body["phone"],
        "customerUsername": username,
        "createdAt": "2025-04-01T09:00:00",
    });
    lock(&state.orders).push(order.clone());
    Json(order).into_response()
}

async fn my_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if bearer_user(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(lock(&state.orders).clone()).into_response()
}

async fn order(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if bearer_user(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if state.order_detail_broken.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    lock(&state.orders)
        .iter()
        .find(|o| o["id"] == id)
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Order not found"),
            |o| Json(o.clone()).into_response(),
        )
}

async fn admin_order() -> StatusCode {
    // Older backends have no admin detail endpoint
    StatusCode::NOT_FOUND
}

async fn cancel_order(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut orders = lock(&state.orders);
    let Some(order) = orders.iter_mut().find(|o| o["id"] == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if order["status"] != "PENDING" {
        return error(StatusCode::BAD_REQUEST, "Chỉ có thể hủy đơn hàng đang chờ xử lý");
    }
    order["status"] = json!("CANCELLED");
    Json(order.clone()).into_response()
}

async fn set_status(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(status) = params.get("status") else {
        return error(StatusCode::BAD_REQUEST, "status is required");
    };
    let mut orders = lock(&state.orders);
    let Some(order) = orders.iter_mut().find(|o| o["id"] == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    order["status"] = json!(status);
    Json(order.clone()).into_response()
}

async fn stats(State(state): State<Shared>) -> Json<Value> {
    let products = lock(&state.products).len();
    let orders = lock(&state.orders).len();
    Json(json!({
        "totalProducts": products,
        "totalOrders": orders,
        "totalCustomers": 1,
        "totalRevenue": 9_000_250,
        "pendingOrders": 1,
    }))
}

async fn suppliers(State(state): State<Shared>) -> Json<Vec<Value>> {
    Json(lock(&state.suppliers).clone())
}

async fn create_supplier(State(state): State<Shared>, Json(mut body): Json<Value>) -> Response {
    body["id"] = json!(state.next_id());
    lock(&state.suppliers).push(body.clone());
    Json(body).into_response()
}

async fn update_supplier(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut suppliers = lock(&state.suppliers);
    let Some(slot) = suppliers.iter_mut().find(|s| s["id"] == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    body["id"] = json!(id);
    *slot = body.clone();
    Json(body).into_response()
}

async fn delete_supplier(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut suppliers = lock(&state.suppliers);
    let before = suppliers.len();
    suppliers.retain(|s| s["id"] != id);
    if suppliers.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn contact(Json(body): Json<Value>) -> Response {
    if body["message"].as_str().is_none_or(str::is_empty) {
        return error(StatusCode::BAD_REQUEST, "message is required");
    }
    "Cảm ơn bạn đã liên hệ! Chúng tôi sẽ phản hồi sớm nhất.".into_response()
}
