//! Shared helpers for handler tests.
//!
//! Tests drive the full [`Router`](axum::Router) in memory with
//! `tower::ServiceExt::oneshot`: real extractors, real state, an
//! in-memory SQLite database, no sockets.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use almacen_core::{Presentation, Product, User, UserRole};
use almacen_db::{Database, DbConfig};

use crate::{auth, router, AppState, ServerConfig};

pub(crate) fn test_config() -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        db_path: ":memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_lifetime_secs: 3600,
        store_name: "Almacén Test".to_string(),
        pos_code: "0001".to_string(),
        admin_username: "admin".to_string(),
        admin_password: "admin1234".to_string(),
    }
}

/// Fresh state over an in-memory database with migrations applied.
pub(crate) async fn test_state() -> AppState {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");
    AppState::new(db, test_config())
}

/// App router over fresh test state. Returns the state too so tests can
/// seed and inspect the database directly.
pub(crate) async fn test_app() -> (Router, AppState) {
    let state = test_state().await;
    (router(state.clone()), state)
}

/// Inserts a user and returns it together with a valid token.
pub(crate) async fn seed_user(state: &AppState, username: &str, role: UserRole) -> (User, String) {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        display_name: username.to_string(),
        password_hash: auth::hash_password("clave12345").expect("hash"),
        role,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state.db.users().insert(&user).await.expect("insert user");

    let token = state.jwt.generate_token(&user).expect("token");
    (user, token)
}

/// Inserts an active product with the given stock level.
pub(crate) async fn seed_product(
    state: &AppState,
    sku: &str,
    name: &str,
    price_centavos: i64,
    stock: i64,
) -> Product {
    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        sku: sku.to_string(),
        name: name.to_string(),
        description: None,
        price_centavos,
        cost_centavos: None,
        current_stock: stock,
        min_stock: 5,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state
        .db
        .products()
        .insert(&product)
        .await
        .expect("insert product");
    product
}

/// Inserts a presentation for a product.
pub(crate) async fn seed_presentation(
    state: &AppState,
    product_id: &str,
    name: &str,
    units: i64,
    price_centavos: i64,
) -> Presentation {
    let presentation = Presentation {
        id: Uuid::new_v4().to_string(),
        product_id: product_id.to_string(),
        name: name.to_string(),
        units_per_presentation: units,
        price_centavos,
        is_active: true,
        created_at: Utc::now(),
    };
    state
        .db
        .presentations()
        .insert(&presentation)
        .await
        .expect("insert presentation");
    presentation
}

// =============================================================================
// Request builders
// =============================================================================

pub(crate) fn get(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

pub(crate) fn delete(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

pub(crate) fn post_json(path: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub(crate) fn put_json(path: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// POST without a token (login, unauthorized checks).
pub(crate) fn post_json_anon(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

// =============================================================================
// Response helpers
// =============================================================================

/// Collects the response body and parses it as JSON.
pub(crate) async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

/// Collects the raw response body bytes (PDF endpoints).
pub(crate) async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes()
        .to_vec()
}

/// Sends a request through the router and asserts the status.
pub(crate) async fn send(router: &Router, request: Request<Body>, expected: StatusCode) -> Value {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router response");
    let status = response.status();
    let body = body_json(response).await;
    assert_eq!(status, expected, "unexpected status, body: {body}");
    body
}
