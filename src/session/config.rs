//! Immutable session configuration built once at startup.

use std::time::Duration;

use crate::jwt::{ACCESS_TOKEN_DURATION_SECS, REFRESH_TOKEN_DURATION_SECS};

/// Secrets and validity windows for both credential classes.
///
/// `login_refresh_secret` signs the refresh token handed out by the login
/// route, while `refresh_secret` verifies refresh tokens and signs the ones
/// minted on renewal. They are configured separately (`JWT_REFRESH_SECRET_KEY`
/// and `REFRESH_TOKEN_SECRET`) and default to the same value.
#[derive(Clone)]
pub struct SessionConfig {
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
    pub login_refresh_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl SessionConfig {
    /// Create a configuration with the default validity windows. The login
    /// refresh secret starts out equal to `refresh_secret`.
    pub fn new(access_secret: impl Into<Vec<u8>>, refresh_secret: impl Into<Vec<u8>>) -> Self {
        let refresh_secret = refresh_secret.into();
        Self {
            access_secret: access_secret.into(),
            login_refresh_secret: refresh_secret.clone(),
            refresh_secret,
            access_ttl: Duration::from_secs(ACCESS_TOKEN_DURATION_SECS),
            refresh_ttl: Duration::from_secs(REFRESH_TOKEN_DURATION_SECS),
        }
    }

    pub fn with_login_refresh_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.login_refresh_secret = secret.into();
        self
    }

    pub fn with_ttls(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    /// True when login-issued refresh tokens cannot pass renewal.
    pub fn login_refresh_secret_differs(&self) -> bool {
        self.login_refresh_secret != self.refresh_secret
    }
}
