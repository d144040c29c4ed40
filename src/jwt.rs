//! JWT token generation and validation.
//!
//! One `JwtConfig` exists per credential class (access, refresh), each with its
//! own secret. Validation fails closed: a malformed token, a bad signature and
//! an expired token all produce the same `JwtError::Decoding` from the caller's
//! point of view, and the session gate never looks further than `is_err()`.
//! Keeping the failures indistinguishable avoids handing clients an oracle.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// JWT claims shared by both credential classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity reference (user id)
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Access token duration: 50 minutes
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 50 * 60;

/// Refresh token duration: 120 minutes
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 120 * 60;

/// Signing and verification keys for one credential class.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// Result of signing a token.
#[derive(Debug, Clone)]
pub struct SignedToken {
    /// The JWT token string
    pub token: String,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
    /// Token duration in seconds
    pub duration: u64,
}

pub(crate) fn unix_now() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| JwtError::TimeError)
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Sign a token for `user_id` that expires `ttl` from now.
    pub fn sign(&self, user_id: &str, ttl: Duration) -> Result<SignedToken, JwtError> {
        let now = unix_now()?;
        let duration = ttl.as_secs();
        let exp = now + duration;

        let claims = SessionClaims {
            user_id: user_id.to_string(),
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(SignedToken {
            token,
            expires_at: exp,
            duration,
        })
    }

    /// Validate and decode a token signed with this configuration's secret.
    ///
    /// A token is valid strictly before its `exp` second.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(JwtError::Decoding)?;

        // jsonwebtoken still accepts exp == now
        if token_data.claims.exp <= unix_now()? {
            return Err(JwtError::Decoding(ErrorKind::ExpiredSignature.into()));
        }

        Ok(token_data.claims)
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Error decoding the token (bad signature, malformed or expired)
    Decoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for JwtError {}
