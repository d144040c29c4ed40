//! Session user types.

use crate::jwt::SignedToken;

/// Request-scoped identity attached by the session middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Identity reference resolved for this request
    pub user_id: String,
    /// Whether the credential pair was renewed while handling this request
    pub renewed: bool,
}

/// Access and refresh tokens issued together for the same user.
#[derive(Debug, Clone)]
pub struct CredentialPair {
    pub access: SignedToken,
    pub refresh: SignedToken,
}
