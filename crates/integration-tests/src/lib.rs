//! Integration test harness for Haberdash.
//!
//! [`MockShop`] is an in-process imitation of the backend: the full REST
//! surface the client talks to, backed by in-memory state, bound to an
//! ephemeral localhost port. It also counts requests and can be told to
//! fail specific endpoints, which is how the tests pin down the client's
//! offline and error behavior.
//!
//! [`TestContext`] wires a [`MockShop`] to a real `ApiClient`, session
//! store, and cart store.
//!
//! Run with: `cargo test -p haberdash-integration-tests`

#![allow(clippy::missing_panics_doc, clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use haberdash_client::{
    ApiClient, CartStore, ClientConfig, MemoryTokenStore, SessionStore, TokenStore,
};

const FIXED_TIMESTAMP: &str = "2026-08-01T12:00:00Z";

// =============================================================================
// In-memory state
// =============================================================================

#[derive(Clone)]
struct MockUser {
    id: i64,
    username: String,
    email: String,
    password: String,
    is_staff: bool,
}

#[derive(Clone)]
struct MockCategory {
    id: i64,
    name: String,
}

#[derive(Clone)]
struct MockProduct {
    id: i64,
    name: String,
    price: Decimal,
    category: i64,
    stock: i64,
    is_featured: bool,
}

#[derive(Clone)]
struct MockLine {
    id: i64,
    product: i64,
    quantity: u32,
}

#[derive(Clone)]
struct MockOrder {
    id: i64,
    user: i64,
    status: String,
    total: Decimal,
    address: String,
    phone: String,
    items: Vec<MockLine>,
}

struct ShopState {
    next_id: i64,
    users: Vec<MockUser>,
    tokens: HashMap<String, i64>,
    categories: Vec<MockCategory>,
    products: Vec<MockProduct>,
    carts: HashMap<i64, Vec<MockLine>>,
    orders: Vec<MockOrder>,
    // Request counters and failure switches, poked by tests.
    cart_fetches: usize,
    cart_mutations: usize,
    logout_calls: usize,
    logout_fails: bool,
    cart_fetch_fails: bool,
}

impl ShopState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<ShopState>>;

// =============================================================================
// MockShop
// =============================================================================

/// An in-process mock of the Haberdash backend.
pub struct MockShop {
    addr: SocketAddr,
    state: Shared,
}

impl MockShop {
    /// Start a mock backend on an ephemeral port, seeded with a small
    /// catalog: categories 1 (Shirts) and 2 (Suits); products 1 (Oxford
    /// Shirt, featured, stock 10), 2 (Wool Suit, stock 4), and 3 (Silk
    /// Tie, out of stock).
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(ShopState {
            next_id: 100,
            users: Vec::new(),
            tokens: HashMap::new(),
            categories: vec![
                MockCategory { id: 1, name: "Shirts".to_owned() },
                MockCategory { id: 2, name: "Suits".to_owned() },
            ],
            products: vec![
                MockProduct {
                    id: 1,
                    name: "Oxford Shirt".to_owned(),
                    price: Decimal::new(7999, 2),
                    category: 1,
                    stock: 10,
                    is_featured: true,
                },
                MockProduct {
                    id: 2,
                    name: "Wool Suit".to_owned(),
                    price: Decimal::new(45000, 2),
                    category: 2,
                    stock: 4,
                    is_featured: false,
                },
                MockProduct {
                    id: 3,
                    name: "Silk Tie".to_owned(),
                    price: Decimal::new(3550, 2),
                    category: 2,
                    stock: 0,
                    is_featured: false,
                },
            ],
            carts: HashMap::new(),
            orders: Vec::new(),
            cart_fetches: 0,
            cart_mutations: 0,
            logout_calls: 0,
            logout_fails: false,
            cart_fetch_fails: false,
        }));

        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend serve");
        });

        Self { addr, state }
    }

    /// Base URL clients should point at.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn lock(&self) -> MutexGuard<'_, ShopState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a user account directly in the backend state.
    pub fn seed_user(&self, username: &str, password: &str, is_staff: bool) {
        let mut state = self.lock();
        let id = state.next_id();
        state.users.push(MockUser {
            id,
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            password: password.to_owned(),
            is_staff,
        });
    }

    /// Issue a valid token for a seeded user, bypassing the login endpoint.
    #[must_use]
    pub fn issue_token(&self, username: &str) -> String {
        let mut state = self.lock();
        let user_id = state
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.id)
            .expect("issue_token: unknown user");
        let token = format!("tok-{user_id}-{}", state.next_id());
        state.tokens.insert(token.clone(), user_id);
        token
    }

    /// Whether the given token is still accepted.
    #[must_use]
    pub fn token_is_valid(&self, token: &str) -> bool {
        self.lock().tokens.contains_key(token)
    }

    /// How many times `GET /cart/` has been hit.
    #[must_use]
    pub fn cart_fetch_count(&self) -> usize {
        self.lock().cart_fetches
    }

    /// How many cart mutation endpoints have been hit.
    #[must_use]
    pub fn cart_mutation_count(&self) -> usize {
        self.lock().cart_mutations
    }

    /// How many times `POST /auth/logout/` has been hit.
    #[must_use]
    pub fn logout_call_count(&self) -> usize {
        self.lock().logout_calls
    }

    /// Make `POST /auth/logout/` return 500.
    pub fn set_logout_fails(&self, fails: bool) {
        self.lock().logout_fails = fails;
    }

    /// Make `GET /cart/` return 500.
    pub fn set_cart_fetch_fails(&self, fails: bool) {
        self.lock().cart_fetch_fails = fails;
    }

    /// Set a product's stock level directly.
    pub fn set_stock(&self, product_id: i64, stock: i64) {
        let mut state = self.lock();
        if let Some(product) = state.products.iter_mut().find(|p| p.id == product_id) {
            product.stock = stock;
        }
    }
}

// =============================================================================
// TestContext
// =============================================================================

/// A mock backend wired to real client stores.
pub struct TestContext {
    pub shop: MockShop,
    pub api: ApiClient,
    pub tokens: Arc<MemoryTokenStore>,
    pub session: SessionStore,
    pub cart: CartStore,
}

impl TestContext {
    /// Fresh context with an empty token store and a signed-out session.
    pub async fn new() -> Self {
        let shop = MockShop::spawn().await;
        let config = ClientConfig::new(shop.base_url(), "/tmp/unused-haberdash-token");
        let api = ApiClient::new(&config).expect("build api client");
        let tokens = Arc::new(MemoryTokenStore::new());
        let session = SessionStore::new(api.clone(), tokens.clone() as Arc<dyn TokenStore>);
        let cart = CartStore::new(api.clone(), session.clone());
        Self { shop, api, tokens, session, cart }
    }

    /// Context with `alice`/`hunter2` seeded and logged in.
    pub async fn logged_in() -> Self {
        let ctx = Self::new().await;
        ctx.shop.seed_user("alice", "hunter2", false);
        ctx.session
            .login(&haberdash_client::types::Credentials::new("alice", "hunter2"))
            .await
            .expect("login seeded user");
        ctx
    }

    /// Context with staff user `quinn`/`topsecret` seeded and logged in.
    pub async fn staff() -> Self {
        let ctx = Self::new().await;
        ctx.shop.seed_user("quinn", "topsecret", true);
        ctx.session
            .login(&haberdash_client::types::Credentials::new("quinn", "topsecret"))
            .await
            .expect("login staff user");
        ctx
    }
}

// =============================================================================
// Router
// =============================================================================

fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/login/", post(login))
        .route("/auth/register/", post(register))
        .route("/auth/logout/", post(logout))
        .route("/auth/user/", get(current_user))
        .route("/products/", get(list_products))
        .route("/products/featured/", get(featured_products))
        .route("/products/{id}/", get(get_product))
        .route("/categories/", get(list_categories))
        .route("/categories/{id}/", get(get_category))
        .route("/cart/", get(fetch_cart))
        .route("/cart/add_item/", post(add_cart_item))
        .route("/cart/update_item/", patch(update_cart_item))
        .route("/cart/remove_item/", delete(remove_cart_item))
        .route("/cart/clear/", delete(clear_cart))
        .route("/orders/", get(list_orders).post(create_order))
        .route("/orders/{id}/", get(get_order))
        .route("/admin/products/", get(admin_list_products).post(admin_create_product))
        .route("/admin/products/stats/", get(admin_product_stats))
        .route(
            "/admin/products/{id}/",
            get(admin_get_product)
                .put(admin_replace_product)
                .patch(admin_patch_product)
                .delete(admin_delete_product),
        )
        .route("/admin/categories/", get(admin_list_categories).post(admin_create_category))
        .route(
            "/admin/categories/{id}/",
            axum::routing::put(admin_update_category).delete(admin_delete_category),
        )
        .route("/admin/orders/", get(admin_list_orders))
        .route("/admin/orders/stats/", get(admin_order_stats))
        .route("/admin/orders/{id}/", get(admin_get_order))
        .route("/admin/orders/{id}/update_status/", patch(admin_update_order_status))
        .route("/admin/users/", get(admin_list_users))
        .route("/admin/users/{id}/", get(admin_get_user))
        .route("/admin/users/stats/", get(admin_user_stats))
        .with_state(state)
}

// =============================================================================
// Shared handler plumbing
// =============================================================================

fn lock(state: &Shared) -> MutexGuard<'_, ShopState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Resolve the `Authorization: Token <key>` header to a user id.
fn authenticate(state: &ShopState, headers: &HeaderMap) -> Result<i64, Response> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let Some(token) = header.and_then(|v| v.strip_prefix("Token ")) else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Authentication credentials were not provided." })),
        )
            .into_response());
    };
    state.tokens.get(token).copied().ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid token." })),
        )
            .into_response()
    })
}

fn authenticate_staff(state: &ShopState, headers: &HeaderMap) -> Result<i64, Response> {
    let user_id = authenticate(state, headers)?;
    let is_staff = state
        .users
        .iter()
        .any(|u| u.id == user_id && u.is_staff);
    if is_staff {
        Ok(user_id)
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "detail": "You do not have permission to perform this action." })),
        )
            .into_response())
    }
}

fn user_json(user: &MockUser) -> Value {
    json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "first_name": "",
        "last_name": "",
        "is_staff": user.is_staff,
    })
}

fn product_json(state: &ShopState, product: &MockProduct) -> Value {
    let category_name = state
        .categories
        .iter()
        .find(|c| c.id == product.category)
        .map_or("", |c| c.name.as_str());
    json!({
        "id": product.id,
        "name": product.name,
        "description": "",
        "price": product.price.to_string(),
        "category": product.category,
        "category_name": category_name,
        "image_url": null,
        "stock": product.stock,
        "size": null,
        "brand": null,
        "is_featured": product.is_featured,
        "created_at": FIXED_TIMESTAMP,
        "updated_at": FIXED_TIMESTAMP,
    })
}

fn category_json(category: &MockCategory) -> Value {
    json!({
        "id": category.id,
        "name": category.name,
        "description": "",
        "created_at": FIXED_TIMESTAMP,
    })
}

fn cart_json(state: &ShopState, user_id: i64) -> Value {
    let empty = Vec::new();
    let lines = state.carts.get(&user_id).unwrap_or(&empty);
    let mut total = Decimal::ZERO;
    let mut items = Vec::new();
    for line in lines {
        if let Some(product) = state.products.iter().find(|p| p.id == line.product) {
            let subtotal = product.price * Decimal::from(line.quantity);
            total += subtotal;
            items.push(json!({
                "id": line.id,
                "product": product_json(state, product),
                "quantity": line.quantity,
                "subtotal": subtotal.to_string(),
                "added_at": FIXED_TIMESTAMP,
            }));
        }
    }
    json!({
        "id": user_id + 1000,
        "user": user_id,
        "items": items,
        "total_price": total.to_string(),
        "created_at": FIXED_TIMESTAMP,
        "updated_at": FIXED_TIMESTAMP,
    })
}

fn order_json(state: &ShopState, order: &MockOrder) -> Value {
    let user_name = state
        .users
        .iter()
        .find(|u| u.id == order.user)
        .map_or("", |u| u.username.as_str());
    let items: Vec<Value> = order
        .items
        .iter()
        .map(|line| {
            let (name, price) = state
                .products
                .iter()
                .find(|p| p.id == line.product)
                .map_or(("", Decimal::ZERO), |p| (p.name.as_str(), p.price));
            let subtotal = price * Decimal::from(line.quantity);
            json!({
                "id": line.id,
                "product": line.product,
                "product_name": name,
                "product_image": null,
                "quantity": line.quantity,
                "price": price.to_string(),
                "subtotal": subtotal.to_string(),
            })
        })
        .collect();
    json!({
        "id": order.id,
        "user": order.user,
        "user_name": user_name,
        "total_amount": order.total.to_string(),
        "status": order.status,
        "shipping_address": order.address,
        "phone_number": order.phone,
        "items": items,
        "created_at": FIXED_TIMESTAMP,
        "updated_at": FIXED_TIMESTAMP,
    })
}

// =============================================================================
// Auth handlers
// =============================================================================

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = lock(&state);
    let username = body["username"].as_str().unwrap_or_default().to_owned();
    let password = body["password"].as_str().unwrap_or_default();

    let Some(user) = state
        .users
        .iter()
        .find(|u| u.username == username && u.password == password)
        .cloned()
    else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid username or password");
    };

    let token = format!("tok-{}-{}", user.id, state.next_id());
    state.tokens.insert(token.clone(), user.id);
    Json(json!({ "token": token, "user": user_json(&user) })).into_response()
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = lock(&state);
    let username = body["username"].as_str().unwrap_or_default().to_owned();
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    let password = body["password"].as_str().unwrap_or_default().to_owned();

    if state.users.iter().any(|u| u.username == username) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "username": ["A user with that username already exists."] })),
        )
            .into_response();
    }

    let id = state.next_id();
    let user = MockUser {
        id,
        username,
        email,
        password,
        is_staff: false,
    };
    state.users.push(user.clone());

    let token = format!("tok-{id}-{}", state.next_id());
    state.tokens.insert(token.clone(), id);
    (
        StatusCode::CREATED,
        Json(json!({ "token": token, "user": user_json(&user) })),
    )
        .into_response()
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    state.logout_calls += 1;
    if state.logout_fails {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
    }
    let user_id = match authenticate(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    state.tokens.retain(|_, id| *id != user_id);
    Json(json!({ "message": "Logged out successfully" })).into_response()
}

async fn current_user(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    state
        .users
        .iter()
        .find(|u| u.id == user_id)
        .map_or_else(
            || error_response(StatusCode::NOT_FOUND, "User not found"),
            |user| Json(user_json(user)).into_response(),
        )
}

// =============================================================================
// Catalog handlers
// =============================================================================

async fn list_products(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let state = lock(&state);
    let category = params.get("category").and_then(|v| v.parse::<i64>().ok());
    let featured = params.get("featured").is_some_and(|v| v == "true");
    let products: Vec<Value> = state
        .products
        .iter()
        .filter(|p| category.is_none_or(|c| p.category == c))
        .filter(|p| !featured || p.is_featured)
        .map(|p| product_json(&state, p))
        .collect();
    Json(Value::Array(products)).into_response()
}

async fn featured_products(State(state): State<Shared>) -> Response {
    let state = lock(&state);
    let products: Vec<Value> = state
        .products
        .iter()
        .filter(|p| p.is_featured)
        .map(|p| product_json(&state, p))
        .collect();
    Json(Value::Array(products)).into_response()
}

async fn get_product(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let state = lock(&state);
    state.products.iter().find(|p| p.id == id).map_or_else(
        || error_response(StatusCode::NOT_FOUND, "Product not found"),
        |p| Json(product_json(&state, p)).into_response(),
    )
}

async fn list_categories(State(state): State<Shared>) -> Response {
    let state = lock(&state);
    let categories: Vec<Value> = state.categories.iter().map(category_json).collect();
    Json(Value::Array(categories)).into_response()
}

async fn get_category(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let state = lock(&state);
    state.categories.iter().find(|c| c.id == id).map_or_else(
        || error_response(StatusCode::NOT_FOUND, "Category not found"),
        |c| Json(category_json(c)).into_response(),
    )
}

// =============================================================================
// Cart handlers
// =============================================================================

async fn fetch_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    state.cart_fetches += 1;
    if state.cart_fetch_fails {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
    }
    let user_id = match authenticate(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    Json(cart_json(&state, user_id)).into_response()
}

async fn add_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    state.cart_mutations += 1;
    let user_id = match authenticate(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    let product_id = body["product_id"].as_i64().unwrap_or_default();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let quantity = body["quantity"].as_u64().unwrap_or(1) as u32;

    let Some(product) = state.products.iter().find(|p| p.id == product_id).cloned() else {
        return error_response(StatusCode::NOT_FOUND, "Product not found");
    };

    let existing: u32 = state
        .carts
        .get(&user_id)
        .and_then(|lines| lines.iter().find(|l| l.product == product_id))
        .map_or(0, |l| l.quantity);
    if i64::from(existing + quantity) > product.stock {
        return error_response(
            StatusCode::BAD_REQUEST,
            &format!("Insufficient stock. Only {} items available", product.stock),
        );
    }

    let line_id = state.next_id();
    let lines = state.carts.entry(user_id).or_default();
    if let Some(line) = lines.iter_mut().find(|l| l.product == product_id) {
        line.quantity += quantity;
    } else {
        lines.push(MockLine { id: line_id, product: product_id, quantity });
    }
    Json(cart_json(&state, user_id)).into_response()
}

async fn update_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    state.cart_mutations += 1;
    let user_id = match authenticate(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    let line_id = body["cart_item_id"].as_i64().unwrap_or_default();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let quantity = body["quantity"].as_u64().unwrap_or_default() as u32;

    let Some(product_id) = state
        .carts
        .get(&user_id)
        .and_then(|lines| lines.iter().find(|l| l.id == line_id))
        .map(|l| l.product)
    else {
        return error_response(StatusCode::NOT_FOUND, "Cart item not found");
    };

    let stock = state
        .products
        .iter()
        .find(|p| p.id == product_id)
        .map_or(0, |p| p.stock);
    if i64::from(quantity) > stock {
        return error_response(
            StatusCode::BAD_REQUEST,
            &format!("Insufficient stock. Only {stock} items available"),
        );
    }

    if let Some(lines) = state.carts.get_mut(&user_id) {
        if quantity == 0 {
            lines.retain(|l| l.id != line_id);
        } else if let Some(line) = lines.iter_mut().find(|l| l.id == line_id) {
            line.quantity = quantity;
        }
    }
    Json(cart_json(&state, user_id)).into_response()
}

async fn remove_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    state.cart_mutations += 1;
    let user_id = match authenticate(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    let line_id = body["cart_item_id"].as_i64().unwrap_or_default();
    let existed = state
        .carts
        .get(&user_id)
        .is_some_and(|lines| lines.iter().any(|l| l.id == line_id));
    if !existed {
        return error_response(StatusCode::NOT_FOUND, "Cart item not found");
    }
    if let Some(lines) = state.carts.get_mut(&user_id) {
        lines.retain(|l| l.id != line_id);
    }
    Json(cart_json(&state, user_id)).into_response()
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    state.cart_mutations += 1;
    let user_id = match authenticate(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    state.carts.remove(&user_id);
    Json(json!({ "message": "Cart cleared" })).into_response()
}

// =============================================================================
// Order handlers
// =============================================================================

async fn list_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    let orders: Vec<Value> = state
        .orders
        .iter()
        .filter(|o| o.user == user_id)
        .rev()
        .map(|o| order_json(&state, o))
        .collect();
    Json(Value::Array(orders)).into_response()
}

async fn get_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    state
        .orders
        .iter()
        .find(|o| o.id == id && o.user == user_id)
        .map_or_else(
            || error_response(StatusCode::NOT_FOUND, "Order not found"),
            |o| Json(order_json(&state, o)).into_response(),
        )
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    let user_id = match authenticate(&state, &headers) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    let lines = state.carts.get(&user_id).cloned().unwrap_or_default();
    if lines.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Cart is empty");
    }

    let total: Decimal = lines
        .iter()
        .map(|line| {
            state
                .products
                .iter()
                .find(|p| p.id == line.product)
                .map_or(Decimal::ZERO, |p| p.price * Decimal::from(line.quantity))
        })
        .sum();

    let id = state.next_id();
    let order = MockOrder {
        id,
        user: user_id,
        status: "pending".to_owned(),
        total,
        address: body["shipping_address"].as_str().unwrap_or_default().to_owned(),
        phone: body["phone_number"].as_str().unwrap_or_default().to_owned(),
        items: lines,
    };
    state.carts.remove(&user_id);
    let rendered = order_json(&state, &order);
    state.orders.push(order);
    (StatusCode::CREATED, Json(rendered)).into_response()
}

// =============================================================================
// Admin handlers
// =============================================================================

async fn admin_list_products(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    let category = params.get("category").and_then(|v| v.parse::<i64>().ok());
    let search = params.get("search").map(|s| s.to_lowercase());
    let products: Vec<Value> = state
        .products
        .iter()
        .filter(|p| category.is_none_or(|c| p.category == c))
        .filter(|p| {
            search
                .as_ref()
                .is_none_or(|needle| p.name.to_lowercase().contains(needle))
        })
        .map(|p| product_json(&state, p))
        .collect();
    Json(Value::Array(products)).into_response()
}

async fn admin_get_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    state.products.iter().find(|p| p.id == id).map_or_else(
        || error_response(StatusCode::NOT_FOUND, "Product not found"),
        |p| Json(product_json(&state, p)).into_response(),
    )
}

fn product_from_value(id: i64, body: &Value) -> MockProduct {
    MockProduct {
        id,
        name: body["name"].as_str().unwrap_or_default().to_owned(),
        price: body["price"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default(),
        category: body["category"].as_i64().unwrap_or_default(),
        stock: body["stock"].as_i64().unwrap_or_default(),
        is_featured: body["is_featured"].as_bool().unwrap_or_default(),
    }
}

async fn admin_create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    let id = state.next_id();
    let product = product_from_value(id, &body);
    state.products.push(product.clone());
    (StatusCode::CREATED, Json(product_json(&state, &product))).into_response()
}

async fn admin_replace_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    if !state.products.iter().any(|p| p.id == id) {
        return error_response(StatusCode::NOT_FOUND, "Product not found");
    }
    let product = product_from_value(id, &body);
    if let Some(slot) = state.products.iter_mut().find(|p| p.id == id) {
        *slot = product.clone();
    }
    Json(product_json(&state, &product)).into_response()
}

async fn admin_patch_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    let Some(product) = state.products.iter_mut().find(|p| p.id == id) else {
        return error_response(StatusCode::NOT_FOUND, "Product not found");
    };
    if let Some(name) = body["name"].as_str() {
        product.name = name.to_owned();
    }
    if let Some(price) = body["price"].as_str().and_then(|s| s.parse().ok()) {
        product.price = price;
    }
    if let Some(category) = body["category"].as_i64() {
        product.category = category;
    }
    if let Some(stock) = body["stock"].as_i64() {
        product.stock = stock;
    }
    if let Some(is_featured) = body["is_featured"].as_bool() {
        product.is_featured = is_featured;
    }
    let product = product.clone();
    Json(product_json(&state, &product)).into_response()
}

async fn admin_delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    if !state.products.iter().any(|p| p.id == id) {
        return error_response(StatusCode::NOT_FOUND, "Product not found");
    }
    state.products.retain(|p| p.id != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn admin_product_stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    Json(json!({
        "total_products": state.products.len(),
        "low_stock": state.products.iter().filter(|p| p.stock > 0 && p.stock < 5).count(),
        "out_of_stock": state.products.iter().filter(|p| p.stock == 0).count(),
        "featured_products": state.products.iter().filter(|p| p.is_featured).count(),
    }))
    .into_response()
}

async fn admin_list_categories(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    let categories: Vec<Value> = state.categories.iter().map(category_json).collect();
    Json(Value::Array(categories)).into_response()
}

async fn admin_create_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    let id = state.next_id();
    let category = MockCategory {
        id,
        name: body["name"].as_str().unwrap_or_default().to_owned(),
    };
    state.categories.push(category.clone());
    (StatusCode::CREATED, Json(category_json(&category))).into_response()
}

async fn admin_update_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    let Some(category) = state.categories.iter_mut().find(|c| c.id == id) else {
        return error_response(StatusCode::NOT_FOUND, "Category not found");
    };
    if let Some(name) = body["name"].as_str() {
        category.name = name.to_owned();
    }
    let category = category.clone();
    Json(category_json(&category)).into_response()
}

async fn admin_delete_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    if !state.categories.iter().any(|c| c.id == id) {
        return error_response(StatusCode::NOT_FOUND, "Category not found");
    }
    state.categories.retain(|c| c.id != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn admin_list_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    let status = params.get("status");
    let user = params.get("user").and_then(|v| v.parse::<i64>().ok());
    let orders: Vec<Value> = state
        .orders
        .iter()
        .filter(|o| status.is_none_or(|s| &o.status == s))
        .filter(|o| user.is_none_or(|u| o.user == u))
        .rev()
        .map(|o| order_json(&state, o))
        .collect();
    Json(Value::Array(orders)).into_response()
}

async fn admin_get_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    state.orders.iter().find(|o| o.id == id).map_or_else(
        || error_response(StatusCode::NOT_FOUND, "Order not found"),
        |o| Json(order_json(&state, o)).into_response(),
    )
}

async fn admin_update_order_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    let status = body["status"].as_str().unwrap_or_default().to_owned();
    let valid = ["pending", "processing", "shipped", "delivered", "cancelled"];
    if !valid.contains(&status.as_str()) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid status");
    }
    let Some(order) = state.orders.iter_mut().find(|o| o.id == id) else {
        return error_response(StatusCode::NOT_FOUND, "Order not found");
    };
    order.status = status;
    let order = order.clone();
    Json(order_json(&state, &order)).into_response()
}

async fn admin_order_stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    let total_revenue: Decimal = state
        .orders
        .iter()
        .filter(|o| o.status != "cancelled")
        .map(|o| o.total)
        .sum();
    Json(json!({
        "total_orders": state.orders.len(),
        "pending_orders": state.orders.iter().filter(|o| o.status == "pending").count(),
        "processing_orders": state.orders.iter().filter(|o| o.status == "processing").count(),
        "completed_orders": state.orders.iter().filter(|o| o.status == "delivered").count(),
        "total_revenue": total_revenue.to_string().parse::<f64>().unwrap_or_default(),
    }))
    .into_response()
}

async fn admin_list_users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    let users: Vec<Value> = state.users.iter().map(user_json).collect();
    Json(Value::Array(users)).into_response()
}

async fn admin_get_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    state.users.iter().find(|u| u.id == id).map_or_else(
        || error_response(StatusCode::NOT_FOUND, "User not found"),
        |u| Json(user_json(u)).into_response(),
    )
}

async fn admin_user_stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    if let Err(response) = authenticate_staff(&state, &headers) {
        return response;
    }
    let staff = state.users.iter().filter(|u| u.is_staff).count();
    Json(json!({
        "total_users": state.users.len(),
        "admin_users": staff,
        "active_users": state.users.len(),
        "regular_users": state.users.len() - staff,
    }))
    .into_response()
}
