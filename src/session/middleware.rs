//! Axum middleware and extractor for session-protected routes.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::error;

use super::cookie::{AUTH_COOKIE_NAME, REFRESH_COOKIE_NAME, get_cookie, pair_cookies};
use super::errors::SessionRejection;
use super::gate::{Outcome, Rejection, SessionGate};
use super::types::SessionContext;

/// State for [`require_session`].
#[derive(Clone)]
pub struct GateState {
    pub gate: Arc<SessionGate>,
    pub secure_cookies: bool,
}

/// Run the session gate before the inner handler.
///
/// On success the resolved [`SessionContext`] is inserted into the request
/// extensions. On renewal both cookies are overwritten on the response. On
/// rejection the inner handler is never called.
pub async fn require_session(
    State(state): State<GateState>,
    mut request: Request,
    next: Next,
) -> Result<Response, SessionRejection> {
    let outcome = {
        let headers = request.headers();
        state.gate.evaluate(
            get_cookie(headers, AUTH_COOKIE_NAME),
            get_cookie(headers, REFRESH_COOKIE_NAME),
        )
    }
    .map_err(|e| {
        error!("Failed to mint renewed credentials: {}", e);
        SessionRejection::StorageUnavailable
    })?;

    match outcome {
        Outcome::Authorized(context) => {
            request.extensions_mut().insert(context);
            Ok(next.run(request).await)
        }
        Outcome::Renewed(context, pair) => {
            // Encode before the handler runs; it must not run if write-back fails.
            let cookies = pair_cookies(&pair, state.secure_cookies)
                .into_iter()
                .map(|cookie| HeaderValue::from_str(&cookie))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| {
                    error!("Failed to encode renewed cookies: {}", e);
                    SessionRejection::StorageUnavailable
                })?;

            request.extensions_mut().insert(context);
            let mut response = next.run(request).await;

            let headers = response.headers_mut();
            for cookie in cookies {
                headers.append(SET_COOKIE, cookie);
            }
            Ok(response)
        }
        Outcome::Rejected(rejection) => Err(rejection.into()),
    }
}

/// Extractor for handlers behind [`require_session`].
/// Rejects as unauthenticated if the middleware did not run.
pub struct Session(pub SessionContext);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .map(Session)
            .ok_or(SessionRejection::Rejected(Rejection::MissingCredentials))
    }
}
