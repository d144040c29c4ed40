#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use sessiongate::{ServerConfig, create_app, db::Database, session::SessionConfig};
use tower::ServiceExt;

pub const ACCESS_SECRET: &[u8] = b"test-access-secret-for-integration";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-for-integration";

/// Create a test app with an in-memory database and the given session config.
pub async fn create_test_app_with(session: SessionConfig, auth_rate_limit: u32) -> (Router, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        session,
        secure_cookies: false,
        auth_rate_limit,
    };
    (create_app(&config), db)
}

/// Create a test app with default secrets and a generous rate limit.
pub async fn create_test_app() -> (Router, Database) {
    create_test_app_with(test_session_config(), 1000).await
}

pub fn test_session_config() -> SessionConfig {
    SessionConfig::new(ACCESS_SECRET, REFRESH_SECRET)
}

pub fn session_cookies(access_token: &str, refresh_token: &str) -> String {
    format!("authToken={}; refreshToken={}", access_token, refresh_token)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Value of the named cookie in a list of Set-Cookie headers.
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    cookies.iter().find_map(|c| {
        c.strip_prefix(&prefix)
            .and_then(|rest| rest.split(';').next())
            .map(|v| v.to_string())
    })
}

/// Check if cookies contain a token being cleared (Max-Age=0)
pub fn has_cleared_cookie(cookies: &[String], cookie_name: &str) -> bool {
    cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=", cookie_name)) && c.contains("Max-Age=0"))
}

/// Register a user through the API and return the login response body's tokens.
pub async fn register_and_login(app: &Router, email: &str, password: &str) -> (String, String) {
    let response = send(
        app,
        post_json(
            "/auth/register",
            serde_json::json!({ "name": "Test", "email": email, "password": password }),
        ),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let response = send(
        app,
        post_json(
            "/auth/login",
            serde_json::json!({ "email": email, "password": password }),
        ),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let json = body_json(response).await;
    (
        json["data"]["authToken"].as_str().unwrap().to_string(),
        json["data"]["refreshToken"].as_str().unwrap().to_string(),
    )
}
