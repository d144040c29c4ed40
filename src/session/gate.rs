//! The session gate decision logic.
//!
//! `evaluate` walks a small state machine:
//!
//! ```text
//! START -> ACCESS_VALID   -> AUTHORIZED
//!       -> ACCESS_INVALID -> REFRESH_VALID   -> RENEWED
//!                         -> REFRESH_INVALID -> REJECTED
//! ```
//!
//! A missing cookie rejects immediately, before either token is looked at.
//! The refresh token is only consulted after the access token has failed.

use std::time::Duration;

use tracing::{debug, info};

use super::config::SessionConfig;
use super::types::{CredentialPair, SessionContext};
use crate::jwt::{JwtConfig, JwtError, SessionClaims};

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// One or both cookies absent
    MissingCredentials,
    /// Neither token verifies
    BothCredentialsInvalid,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::MissingCredentials => {
                "Authentication failed: No authToken or refreshToken provided"
            }
            Rejection::BothCredentialsInvalid => "Authentication failed: Both tokens are invalid",
        }
    }
}

/// Terminal state of a gate evaluation.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Access token verified; nothing to write back.
    Authorized(SessionContext),
    /// Access token failed but the refresh token verified; the new pair must
    /// replace both stored cookies.
    Renewed(SessionContext, CredentialPair),
    Rejected(Rejection),
}

/// Verifies and renews session credentials. Holds only immutable keys, so a
/// single instance is shared by every request.
#[derive(Clone)]
pub struct SessionGate {
    access: JwtConfig,
    refresh: JwtConfig,
    login_refresh: JwtConfig,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionGate {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            access: JwtConfig::new(&config.access_secret),
            refresh: JwtConfig::new(&config.refresh_secret),
            login_refresh: JwtConfig::new(&config.login_refresh_secret),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    /// Decide whether a request carrying these cookie values may proceed.
    ///
    /// Empty values count as absent. The only error is a failure to mint the
    /// renewed pair.
    pub fn evaluate(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<Outcome, JwtError> {
        let (Some(access_token), Some(refresh_token)) = (
            access_token.filter(|t| !t.is_empty()),
            refresh_token.filter(|t| !t.is_empty()),
        ) else {
            debug!("Session rejected: missing credentials");
            return Ok(Outcome::Rejected(Rejection::MissingCredentials));
        };

        if let Ok(claims) = self.access.verify(access_token) {
            debug!(user_id = %claims.user_id, "Session authorized");
            return Ok(Outcome::Authorized(SessionContext {
                user_id: claims.user_id,
                renewed: false,
            }));
        }

        let Ok(claims) = self.refresh.verify(refresh_token) else {
            debug!("Session rejected: both credentials invalid");
            return Ok(Outcome::Rejected(Rejection::BothCredentialsInvalid));
        };

        let pair = self.mint_pair(&claims.user_id)?;
        info!(user_id = %claims.user_id, "Session renewed");

        Ok(Outcome::Renewed(
            SessionContext {
                user_id: claims.user_id,
                renewed: true,
            },
            pair,
        ))
    }

    /// Mint a fresh pair signed with the renewal secrets.
    pub fn mint_pair(&self, user_id: &str) -> Result<CredentialPair, JwtError> {
        Ok(CredentialPair {
            access: self.access.sign(user_id, self.access_ttl)?,
            refresh: self.refresh.sign(user_id, self.refresh_ttl)?,
        })
    }

    /// Mint the pair handed out by the login route. The refresh token is
    /// signed with the login refresh secret.
    pub fn issue_login_pair(&self, user_id: &str) -> Result<CredentialPair, JwtError> {
        Ok(CredentialPair {
            access: self.access.sign(user_id, self.access_ttl)?,
            refresh: self.login_refresh.sign(user_id, self.refresh_ttl)?,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.access.verify(token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.refresh.verify(token)
    }
}
