//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::util::ServiceExt;
use uuid::Uuid;

use coin_market::domain::default_catalog;
use coin_market::store::MemoryStore;
use coin_market::{api, AppState, MarketSettings};

pub const TEST_SECRET: &str = "integration-test-secret";

/// App backed by a fresh in-memory store holding the default catalog
pub fn memory_app() -> (Router, MemoryStore) {
    let store = MemoryStore::with_catalog(default_catalog());
    let state = AppState::new(
        Arc::new(store.clone()),
        &MarketSettings::with_secret(TEST_SECRET),
    )
    .expect("Failed to build state");
    (api::build_app(state), store)
}

/// Connect to DATABASE_URL and make sure the catalog is seeded.
/// Returns `None` (and the test should return early) when no database is configured.
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    for item in default_catalog() {
        sqlx::query("INSERT INTO items (name, price) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
            .bind(&item.name)
            .bind(item.price.value())
            .execute(&pool)
            .await
            .expect("Failed to seed items");
    }

    Some(pool)
}

/// Username that no other test run uses
pub fn unique_username(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Send a request and decode the JSON body (`Value::Null` for non-JSON bodies)
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Log in (registering on first use) and return the bearer token
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth",
            None,
            serde_json::json!({ "username": username, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().expect("token missing").to_string()
}
