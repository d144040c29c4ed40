pub mod api;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod password;
pub mod rate_limit;
pub mod session;

use api::create_api_router;
use axum::Router;
use db::Database;
use rate_limit::{RateLimitConfig, spawn_prune_scheduler};
use session::{SessionConfig, SessionGate};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Secrets and validity windows for session tokens
    pub session: SessionConfig,
    /// Whether to set Secure flag on cookies (should be true in production with HTTPS)
    pub secure_cookies: bool,
    /// Login and signup attempts allowed per client IP per minute
    pub auth_rate_limit: u32,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let rate_limit_config = Arc::new(RateLimitConfig::new(config.auth_rate_limit));
    build_router(config, rate_limit_config)
}

fn build_router(config: &ServerConfig, rate_limit_config: Arc<RateLimitConfig>) -> Router {
    let gate = Arc::new(SessionGate::new(&config.session));

    create_api_router(
        config.db.clone(),
        gate,
        config.secure_cookies,
        rate_limit_config,
    )
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let rate_limit_config = Arc::new(RateLimitConfig::new(config.auth_rate_limit));
    let pruner = spawn_prune_scheduler(rate_limit_config.clone());

    let app = build_router(&config, rate_limit_config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let result = axum::serve(listener, make_service).await;

    pruner.abort();
    result
}
