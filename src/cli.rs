//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use crate::rate_limit::DEFAULT_ATTEMPTS_PER_MINUTE;
use crate::session::SessionConfig;
use clap::Parser;
use tracing::{error, info, warn};

const MIN_SECRET_LENGTH: usize = 32;

/// Secret for access tokens.
pub const ACCESS_SECRET_ENV: &str = "JWT_SECRET_KEY";
/// Secret for verifying and renewing refresh tokens.
pub const REFRESH_SECRET_ENV: &str = "REFRESH_TOKEN_SECRET";
/// Secret for refresh tokens issued at login. Defaults to `REFRESH_TOKEN_SECRET`.
pub const LOGIN_REFRESH_SECRET_ENV: &str = "JWT_REFRESH_SECRET_KEY";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "sessiongate",
    about = "Cookie session API with transparent access token renewal"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "sessiongate.db")]
    pub database: String,

    /// Path to file containing the access token secret. Prefer JWT_SECRET_KEY
    #[arg(long)]
    pub access_secret_file: Option<String>,

    /// Path to file containing the refresh token secret. Prefer REFRESH_TOKEN_SECRET
    #[arg(long)]
    pub refresh_secret_file: Option<String>,

    /// Path to file containing the login refresh token secret. Prefer JWT_REFRESH_SECRET_KEY
    #[arg(long)]
    pub login_refresh_secret_file: Option<String>,

    /// Set the Secure flag on session cookies (enable when served over HTTPS)
    #[arg(long)]
    pub secure_cookies: bool,

    /// Login and signup attempts allowed per client IP per minute
    #[arg(long, default_value_t = DEFAULT_ATTEMPTS_PER_MINUTE)]
    pub auth_rate_limit: u32,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Read a secret from the environment variable `var`, or from `file`.
/// The variable is removed from the environment once read.
fn read_secret(var: &str, file: Option<&str>) -> Result<Option<String>, String> {
    if let Ok(secret) = std::env::var(var) {
        // SAFETY: Called from main before the server starts. The runtime's
        // worker threads are idle and nothing else touches the environment
        // until startup finishes.
        unsafe { std::env::remove_var(var) };
        return Ok(Some(secret));
    }

    match file {
        Some(path) => std::fs::read_to_string(path)
            .map(|content| Some(content.trim().to_string()))
            .map_err(|e| format!("Failed to read {} from {}: {}", var, path, e)),
        None => Ok(None),
    }
}

fn check_secret(var: &str, secret: Option<String>) -> Result<String, String> {
    let secret = secret.ok_or_else(|| {
        format!(
            "{} is required. Set the environment variable (recommended) or use the matching --*-secret-file option",
            var
        )
    })?;

    if secret.len() < MIN_SECRET_LENGTH {
        return Err(format!(
            "{} is shorter than {} characters. Use a longer secret",
            var, MIN_SECRET_LENGTH
        ));
    }

    Ok(secret)
}

/// Load the session secrets. Returns None and logs an error if any required
/// secret is missing or too short.
pub fn load_session_config(args: &Args) -> Option<SessionConfig> {
    let load = || -> Result<SessionConfig, String> {
        let access = check_secret(
            ACCESS_SECRET_ENV,
            read_secret(ACCESS_SECRET_ENV, args.access_secret_file.as_deref())?,
        )?;
        let refresh = check_secret(
            REFRESH_SECRET_ENV,
            read_secret(REFRESH_SECRET_ENV, args.refresh_secret_file.as_deref())?,
        )?;

        let mut config = SessionConfig::new(access, refresh);
        if let Some(login_refresh) = read_secret(
            LOGIN_REFRESH_SECRET_ENV,
            args.login_refresh_secret_file.as_deref(),
        )? {
            config = config.with_login_refresh_secret(check_secret(
                LOGIN_REFRESH_SECRET_ENV,
                Some(login_refresh),
            )?);
        }
        Ok(config)
    };

    match load() {
        Ok(config) => {
            if config.login_refresh_secret_differs() {
                warn!(
                    "{} differs from {}: refresh tokens issued at login will fail renewal",
                    LOGIN_REFRESH_SECRET_ENV, REFRESH_SECRET_ENV
                );
            }
            Some(config)
        }
        Err(message) => {
            error!("{}", message);
            None
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(args: &Args, db: Database, session: SessionConfig) -> ServerConfig {
    ServerConfig {
        db,
        session,
        secure_cookies: args.secure_cookies,
        auth_rate_limit: args.auth_rate_limit,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
