//! Cookie-based session authentication.
//!
//! Dual-token system: a short-lived access token (50 min) and a longer-lived
//! refresh token (120 min), each signed with its own secret. Protected routes
//! sit behind [`require_session`], which passes valid access tokens through,
//! silently renews both cookies when only the refresh token is still valid,
//! and rejects everything else with a 401.

mod config;
mod cookie;
mod errors;
mod gate;
mod ip;
mod middleware;
mod types;

pub use config::SessionConfig;
pub use cookie::{
    AUTH_COOKIE_NAME, REFRESH_COOKIE_NAME, cleared_cookies, get_cookie, pair_cookies,
    session_cookie,
};
pub use errors::SessionRejection;
pub use gate::{Outcome, Rejection, SessionGate};
pub use ip::extract_client_ip;
pub use middleware::{GateState, Session, require_session};
pub use types::{CredentialPair, SessionContext};
