//! Rate limiting for login and registration.
//!
//! Uses a token bucket algorithm with per-IP tracking to slow down password
//! guessing. Requests without a resolvable client IP share one bucket.
//! Buckets that have fully refilled are pruned periodically so the per-IP
//! maps do not grow without bound.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tracing::debug;

use crate::api::ApiError;
use crate::session::extract_client_ip;

/// Per-IP rate limiter.
pub type IpLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Default number of login or registration attempts per IP per minute.
pub const DEFAULT_ATTEMPTS_PER_MINUTE: u32 = 10;

const UNKNOWN_CLIENT: &str = "unknown";

/// How often idle buckets are dropped.
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Rate limiting configuration for authentication endpoints.
#[derive(Clone)]
pub struct RateLimitConfig {
    pub login: Arc<IpLimiter>,
    pub register: Arc<IpLimiter>,
}

impl RateLimitConfig {
    /// Create limiters allowing `per_minute` attempts per IP on each endpoint.
    pub fn new(per_minute: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
        Self {
            login: Arc::new(RateLimiter::keyed(quota)),
            register: Arc::new(RateLimiter::keyed(quota)),
        }
    }
}

impl RateLimitConfig {
    /// Drop the buckets of clients that are no longer limited.
    pub fn prune(&self) {
        for limiter in [&self.login, &self.register] {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
    }

    /// Number of tracked client buckets across both endpoints.
    pub fn tracked_clients(&self) -> usize {
        self.login.len() + self.register.len()
    }
}

/// Spawn a background task that prunes the limiters periodically.
/// Returns a handle that can be used to abort the task.
pub fn spawn_prune_scheduler(config: Arc<RateLimitConfig>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);

        loop {
            interval.tick().await;
            config.prune();
            debug!(tracked = config.tracked_clients(), "Pruned rate limiter buckets");
        }
    })
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS_PER_MINUTE)
    }
}

fn client_key(request: &Request) -> String {
    extract_client_ip(request.headers(), request.extensions())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Middleware for rate limiting login attempts.
pub async fn rate_limit_login(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    match config.login.check_key(&client_key(&request)) {
        Ok(_) => next.run(request).await,
        Err(_) => ApiError::too_many_requests(
            "Too many login attempts. Please wait before trying again.",
        )
        .into_response(),
    }
}

/// Middleware for rate limiting registration.
pub async fn rate_limit_register(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    match config.register.check_key(&client_key(&request)) {
        Ok(_) => next.run(request).await,
        Err(_) => ApiError::too_many_requests(
            "Too many signup attempts. Please wait before trying again.",
        )
        .into_response(),
    }
}
