#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use gonasi_api::auth::jwt::JwtConfig;
use gonasi_api::config::{ServerConfig, StorageConfig};
use gonasi_api::router::build_app_router;
use gonasi_api::state::AppState;
use gonasi_core::plugins::PluginRegistry;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults and fixed secrets.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        max_body_bytes: 64 * 1024,
        jwt: JwtConfig {
            secret: "test-jwt-secret-that-is-long-enough".to_string(),
            access_token_expiry_mins: 60,
        },
        storage: StorageConfig {
            base_url: "http://storage.test".to_string(),
            bucket: "course-images".to_string(),
            signing_secret: "test-storage-secret".to_string(),
            signed_url_ttl_secs: 600,
        },
    }
}

/// Full application router over `pool`, with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        registry: Arc::new(PluginRegistry::with_builtin_plugins()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Sign up `username` through the API and return `(user_id, access_token)`.
pub async fn signup(app: Router, username: &str) -> (i64, String) {
    let response = post_json(
        app,
        "/api/v1/auth/signup",
        json!({
            "email": format!("{username}@example.com"),
            "username": username,
            "password": TEST_PASSWORD,
        }),
    )
    .await;
    assert_eq!(response.status(), 201, "signup of {username} failed");
    let json = body_json(response).await;
    (
        json["data"]["user"]["id"].as_i64().unwrap(),
        json["data"]["access_token"].as_str().unwrap().to_string(),
    )
}

/// Create an organization owned by the token's user; returns its id.
pub async fn create_organization(app: Router, token: &str, handle: &str) -> i64 {
    let response = post_json_auth(
        app,
        "/api/v1/organizations",
        json!({ "name": format!("Org {handle}"), "handle": handle }),
        token,
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a course, one chapter and one lesson; returns `(course_id, lesson_id)`.
pub async fn create_lesson(app: Router, token: &str, organization_id: i64) -> (i64, i64) {
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/organizations/{organization_id}/courses"),
        json!({ "name": "Intro to Rivers" }),
        token,
    )
    .await;
    assert_eq!(response.status(), 201);
    let course_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/courses/{course_id}/chapters"),
        json!({ "name": "Chapter 1" }),
        token,
    )
    .await;
    assert_eq!(response.status(), 201);
    let chapter_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json_auth(
        app,
        &format!("/api/v1/chapters/{chapter_id}/lessons"),
        json!({ "name": "Lesson 1" }),
        token,
    )
    .await;
    assert_eq!(response.status(), 201);
    let lesson_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    (course_id, lesson_id)
}

/// Add a block to a lesson; returns the block id.
pub async fn create_block(
    app: Router,
    token: &str,
    lesson_id: i64,
    plugin_type: &str,
    content: Value,
) -> i64 {
    let response = post_json_auth(
        app,
        &format!("/api/v1/lessons/{lesson_id}/blocks"),
        json!({ "plugin_type": plugin_type, "content": content }),
        token,
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
