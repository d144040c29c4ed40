//! Session gate error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::gate::Rejection;

/// Errors produced by the session middleware and extractor.
#[derive(Debug)]
pub enum SessionRejection {
    /// Credentials missing or invalid (401)
    Rejected(Rejection),
    /// Renewed credentials could not be minted or written back (500)
    StorageUnavailable,
}

impl SessionRejection {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Rejected(_) => StatusCode::UNAUTHORIZED,
            Self::StorageUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::Rejected(rejection) => rejection.message(),
            Self::StorageUnavailable => "Failed to renew session",
        }
    }
}

impl From<Rejection> for SessionRejection {
    fn from(rejection: Rejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            message: &'static str,
            ok: bool,
        }

        (
            self.status_code(),
            Json(ErrorResponse {
                message: self.message(),
                ok: false,
            }),
        )
            .into_response()
    }
}
