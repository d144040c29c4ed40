//! Account and session endpoints.
//!
//! - POST `/register` - Create an account
//! - POST `/login` - Check password, issue the token pair as cookies
//! - GET `/checklogin` - Session-protected identity check
//! - GET `/logout` - Clear both session cookies

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    middleware,
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, ResultExt};
use super::response::ApiResponse;
use crate::db::{Database, NewUser, is_unique_violation};
use crate::password::{hash_password, verify_password};
use crate::rate_limit::{RateLimitConfig, rate_limit_login, rate_limit_register};
use crate::session::{
    GateState, Session, SessionGate, cleared_cookies, pair_cookies, require_session,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const EMAIL_TAKEN: &str = "Email already exists";

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub gate: Arc<SessionGate>,
    pub secure_cookies: bool,
    pub rate_limit_config: Arc<RateLimitConfig>,
}

pub fn router(state: AuthState) -> Router {
    let gate_state = GateState {
        gate: state.gate.clone(),
        secure_cookies: state.secure_cookies,
    };

    let register_router = Router::new()
        .route("/register", post(register))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit_config.clone(),
            rate_limit_register,
        ));

    let login_router = Router::new()
        .route("/login", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit_config.clone(),
            rate_limit_login,
        ));

    // route_layer only wraps routes added above it: /logout stays public.
    let session_router = Router::new()
        .route("/checklogin", get(check_login))
        .route_layer(middleware::from_fn_with_state(gate_state, require_session))
        .route("/logout", get(logout))
        .with_state(state);

    Router::new()
        .merge(register_router)
        .merge(login_router)
        .merge(session_router)
}

#[derive(Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    let email = payload.email.trim();

    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request(
            "Name, email and password are required",
        ));
    }

    if state
        .db
        .users()
        .email_exists(email)
        .await
        .db_err("Failed to check email")?
    {
        return Err(ApiError::conflict(EMAIL_TAKEN));
    }

    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .internal_err("Password hashing task failed")?
        .internal_err("Failed to hash password")?;

    let id = uuid::Uuid::new_v4().to_string();
    let new_user = NewUser {
        id: &id,
        name,
        email,
        password_hash: &password_hash,
    };

    match state.db.users().create(&new_user).await {
        Ok(()) => {}
        // Lost a race with a concurrent registration for the same email
        Err(e) if is_unique_violation(&e) => return Err(ApiError::conflict(EMAIL_TAKEN)),
        Err(e) => return Err(ApiError::db_error("Failed to create user", e)),
    }

    info!(user_id = %id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User registered successfully")),
    ))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    auth_token: String,
    refresh_token: String,
}

async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users()
        .get_by_email(payload.email.trim())
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::bad_request(INVALID_CREDENTIALS))?;

    let password = payload.password;
    let stored_hash = user.password_hash.clone();
    let is_match = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .internal_err("Password verification task failed")?
        .internal_err("Failed to verify password")?;

    if !is_match {
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    }

    let pair = state
        .gate
        .issue_login_pair(&user.id)
        .internal_err("Failed to generate tokens")?;

    let [access_cookie, refresh_cookie] = pair_cookies(&pair, state.secure_cookies);

    info!(user_id = %user.id, "User logged in");

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(ApiResponse::with_data(
            "Login successful",
            LoginData {
                auth_token: pair.access.token,
                refresh_token: pair.refresh.token,
            },
        )),
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckLoginData {
    user_id: String,
}

async fn check_login(Session(session): Session) -> impl IntoResponse {
    Json(ApiResponse::with_data(
        "User authenticated successfully",
        CheckLoginData {
            user_id: session.user_id,
        },
    ))
}

async fn logout(State(state): State<AuthState>) -> impl IntoResponse {
    let [clear_access, clear_refresh] = cleared_cookies(state.secure_cookies);

    (
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, clear_access), (SET_COOKIE, clear_refresh)]),
        Json(ApiResponse::success("User logged out successfully")),
    )
}
