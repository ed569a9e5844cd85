// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request},
};
use serde_json::{json, Value};
use skylog::config::Config;
use skylog::db::{FirestoreDb, MemoryDb, Store};
use skylog::graphql::build_schema;
use skylog::routes::create_router;
use skylog::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Shared state over a fresh in-memory store.
/// Returns the state and the store so tests can inject failures.
#[allow(dead_code)]
pub fn test_state_with(config: Config) -> (Arc<AppState>, Arc<MemoryDb>) {
    let db = Arc::new(MemoryDb::new());
    let store: Arc<dyn Store> = db.clone();
    (Arc::new(AppState::new(config, store)), db)
}

#[allow(dead_code)]
pub fn test_state() -> (Arc<AppState>, Arc<MemoryDb>) {
    test_state_with(Config::default())
}

/// Create a test app backed by the in-memory store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryDb>) {
    create_test_app_with(Config::default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>, Arc<MemoryDb>) {
    let (state, db) = test_state_with(config);
    let schema = build_schema(state.clone());
    (create_router(state.clone(), schema), state, db)
}

/// POST a GraphQL operation, optionally as a bearer, and return the JSON body.
#[allow(dead_code)]
pub async fn graphql(app: &axum::Router, query: &str, variables: Value, token: Option<&str>) -> Value {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let body = json!({ "query": query, "variables": variables });
    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("GraphQL response should be JSON")
}

/// Register a user through the API.
#[allow(dead_code)]
pub async fn register(app: &axum::Router, username: &str, password: &str) -> Value {
    graphql(
        app,
        "mutation($options: UsernamePasswordInput!) {
            createUser(options: $options) { errors { type message } user { id username } }
        }",
        json!({ "options": { "username": username, "password": password } }),
        None,
    )
    .await
}

/// Log in through the API and return the token.
#[allow(dead_code)]
pub async fn login(app: &axum::Router, username: &str, password: &str) -> String {
    let body = graphql(
        app,
        "mutation($options: UsernamePasswordInput!) {
            loginUser(options: $options) { errors { type message } token }
        }",
        json!({ "options": { "username": username, "password": password } }),
        None,
    )
    .await;

    body["data"]["loginUser"]["token"]
        .as_str()
        .unwrap_or_else(|| panic!("login failed: {}", body))
        .to_string()
}
