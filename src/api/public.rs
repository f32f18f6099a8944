//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;

// Errors

pub struct ApiError {
    status: StatusCode,
    err: anyhow::Error,
}

impl ApiError {
    pub fn bad_request(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            err,
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        if self.status.is_server_error() {
            tracing::error!("{}", self.err);
        } else {
            tracing::warn!("{}", self.err);
        }

        (self.status, self.err.to_string()).into_response()
    }
}

// Re-export public types from each route

pub mod webhook {
    pub use crate::api::routes::webhook::public::*;
    pub use crate::api::routes::webhook::signature::{SIGNATURE_HEADER, sign, verify_signature};
}
