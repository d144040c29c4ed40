mod auth;
mod error;
mod response;

use axum::{Json, Router, routing::get};
use serde_json::json;
use std::sync::Arc;

use crate::db::Database;
use crate::rate_limit::RateLimitConfig;
use crate::session::SessionGate;

pub use auth::AuthState;
pub use error::{ApiError, ResultExt};
pub use response::ApiResponse;

/// Create the API router.
pub fn create_api_router(
    db: Database,
    gate: Arc<SessionGate>,
    secure_cookies: bool,
    rate_limit_config: Arc<RateLimitConfig>,
) -> Router {
    let auth_state = AuthState {
        db,
        gate,
        secure_cookies,
        rate_limit_config,
    };

    Router::new()
        .route("/", get(|| async { Json(json!({ "message": "The API is working" })) }))
        .nest("/auth", auth::router(auth_state))
}
