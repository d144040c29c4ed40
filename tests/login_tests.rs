//! Tests for registration, login and logout.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use sessiongate::session::{SessionConfig, SessionGate};

#[tokio::test]
async fn test_register_success() {
    let (app, db) = create_test_app().await;

    let response = send(
        &app,
        post_json(
            "/auth/register",
            json!({ "name": "Alice", "email": "alice@example.com", "password": "hunter22" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({ "ok": true, "message": "User registered successfully" })
    );

    let user = db
        .users()
        .get_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.name, "Alice");
    assert_ne!(user.password_hash, "hunter22");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (app, _db) = create_test_app().await;
    let payload = json!({ "name": "Alice", "email": "alice@example.com", "password": "pw" });

    let response = send(&app, post_json("/auth/register", payload.clone())).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, post_json("/auth/register", payload)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
async fn test_register_missing_fields() {
    let (app, _db) = create_test_app().await;

    let response = send(
        &app,
        post_json(
            "/auth/register",
            json!({ "name": "", "email": "a@example.com", "password": "pw" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_sets_cookies_and_echoes_tokens() {
    let (app, _db) = create_test_app().await;

    send(
        &app,
        post_json(
            "/auth/register",
            json!({ "name": "Alice", "email": "alice@example.com", "password": "hunter22" }),
        ),
    )
    .await;

    let response = send(
        &app,
        post_json(
            "/auth/login",
            json!({ "email": "alice@example.com", "password": "hunter22" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let cookies = extract_set_cookies(&response);
    let access_cookie = cookie_value(&cookies, "authToken").expect("authToken cookie");
    let refresh_cookie = cookie_value(&cookies, "refreshToken").expect("refreshToken cookie");
    assert!(cookies.iter().all(|c| c.contains("HttpOnly")));

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["data"]["authToken"], access_cookie.as_str());
    assert_eq!(body["data"]["refreshToken"], refresh_cookie.as_str());
}

#[tokio::test]
async fn test_login_then_check_login() {
    let (app, db) = create_test_app().await;
    let (access, refresh) = register_and_login(&app, "bob@example.com", "s3cret").await;

    let user = db
        .users()
        .get_by_email("bob@example.com")
        .await
        .unwrap()
        .unwrap();

    let response = send(
        &app,
        get_with_cookie("/auth/checklogin", Some(&session_cookies(&access, &refresh))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["userId"], user.id.as_str());
}

#[tokio::test]
async fn test_login_refresh_token_renews_session() {
    let (app, db) = create_test_app().await;
    let (_access, refresh) = register_and_login(&app, "carol@example.com", "pw").await;

    let user = db
        .users()
        .get_by_email("carol@example.com")
        .await
        .unwrap()
        .unwrap();

    let response = send(
        &app,
        get_with_cookie(
            "/auth/checklogin",
            Some(&session_cookies("garbage", &refresh)),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_set_cookies(&response).len(), 2);
    let body = body_json(response).await;
    assert_eq!(body["data"]["userId"], user.id.as_str());
}

#[tokio::test]
async fn test_login_refresh_token_with_mismatched_secret_cannot_renew() {
    let session = SessionConfig::new(ACCESS_SECRET, REFRESH_SECRET)
        .with_login_refresh_secret(b"a-different-login-refresh-secret".to_vec());
    let (app, _db) = create_test_app_with(session, 1000).await;
    let (_access, refresh) = register_and_login(&app, "dave@example.com", "pw").await;

    // Not valid under the renewal secret
    assert!(
        SessionGate::new(&test_session_config())
            .verify_refresh(&refresh)
            .is_err()
    );

    let response = send(
        &app,
        get_with_cookie(
            "/auth/checklogin",
            Some(&session_cookies("garbage", &refresh)),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unknown_email() {
    let (app, _db) = create_test_app().await;

    let response = send(
        &app,
        post_json(
            "/auth/login",
            json!({ "email": "nobody@example.com", "password": "pw" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(extract_set_cookies(&response).is_empty());
    let body = body_json(response).await;
    assert_eq!(body, json!({ "ok": false, "message": "Invalid credentials" }));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (app, _db) = create_test_app().await;
    register_and_login(&app, "erin@example.com", "right").await;

    let response = send(
        &app,
        post_json(
            "/auth/login",
            json!({ "email": "erin@example.com", "password": "wrong" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_logout_clears_cookies() {
    let (app, _db) = create_test_app().await;
    let (access, refresh) = register_and_login(&app, "frank@example.com", "pw").await;

    let response = send(
        &app,
        get_with_cookie("/auth/logout", Some(&session_cookies(&access, &refresh))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = extract_set_cookies(&response);
    assert!(has_cleared_cookie(&cookies, "authToken"));
    assert!(has_cleared_cookie(&cookies, "refreshToken"));

    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({ "ok": true, "message": "User logged out successfully" })
    );
}

#[tokio::test]
async fn test_login_rate_limited() {
    let (app, _db) = create_test_app_with(test_session_config(), 2).await;
    let payload = json!({ "email": "nobody@example.com", "password": "pw" });

    for _ in 0..2 {
        let response = send(&app, post_json("/auth/login", payload.clone())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = send(&app, post_json("/auth/login", payload)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
}
