//! HTTP error mapping.

use std::time::Duration;

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::ErrorKind;
use crate::config::Environment;
use crate::storage::StorageError;

/// Message shown in place of validation details outside development.
pub const GENERIC_VALIDATION_MESSAGE: &str = "Invalid input provided";

/// Message attached to every 429 response.
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

/// Errors returned by API handlers and middleware.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A store operation failed.
    #[error("{source}")]
    Storage {
        source: StorageError,
        /// Echo validation details to the caller.
        verbose: bool,
    },

    /// The request body exceeds the configured limit.
    #[error("request entity too large")]
    PayloadTooLarge,

    /// No route matches the request path.
    #[error("route not found")]
    RouteNotFound,

    /// The client used up its request budget.
    #[error("rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },
}

impl ApiError {
    /// Wrap a store failure, exposing validation details only in development.
    pub fn storage(source: impl Into<StorageError>, environment: Environment) -> Self {
        Self::Storage {
            source: source.into(),
            verbose: environment.is_development(),
        }
    }

    /// Map to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage { source, .. } => match source.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::CapacityExceeded => StatusCode::FORBIDDEN,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Error classification, if this error came from the store.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Storage { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");

        match self {
            Self::Storage { source, verbose } => {
                let kind = source.kind();
                let body = match kind {
                    ErrorKind::NotFound => json!({ "error": "Entry not found" }),
                    ErrorKind::CapacityExceeded => json!({
                        "error": "Capacity Exceeded",
                        "message": source.to_string(),
                        "kind": kind,
                    }),
                    _ => json!({
                        "error": "Validation Error",
                        "message": if verbose {
                            source.to_string()
                        } else {
                            GENERIC_VALIDATION_MESSAGE.to_string()
                        },
                        "kind": kind,
                    }),
                };
                (status, Json(body)).into_response()
            }
            Self::PayloadTooLarge => {
                (status, Json(json!({ "error": "Request entity too large" }))).into_response()
            }
            Self::RouteNotFound => (status, Json(json!({ "error": "Not Found" }))).into_response(),
            Self::RateLimited { retry_after } => {
                let seconds = retry_after.as_secs_f64().ceil().max(1.0) as u64;
                let mut response = (
                    status,
                    Json(json!({
                        "error": "Too Many Requests",
                        "message": RATE_LIMIT_MESSAGE,
                    })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
                response
            }
        }
    }
}
