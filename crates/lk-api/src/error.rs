//! Structured backend operation errors.
//!
//! Every failure mode of a backend call (validation, authorization,
//! transport) surfaces as one [`FetchError`]. The distinction between
//! causes lives in the error payload's shape, defined by the backend;
//! the client passes it through unmodified.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for backend operations.
pub type ApiResult<T> = std::result::Result<T, FetchError>;

/// Well-known error codes produced on the client side.
pub mod error_codes {
    /// The request never produced a backend response.
    pub const NETWORK: &str = "network_error";
    /// A privileged call could not elevate the session first.
    pub const ELEVATION: &str = "elevation_failed";
}

/// Error body returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,

    /// Human-readable detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.error)
    }
}

/// A failed backend request.
///
/// `status` is the HTTP status of the response, or `0` when the
/// failure happened before a response existed (transport errors,
/// client-side refusals).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("backend request failed with status {status}: {body}")]
pub struct FetchError {
    /// HTTP status code, or 0 for client-side failures.
    pub status: u16,
    /// Structured error body.
    pub body: ErrorResponse,
}

impl FetchError {
    /// Creates a new error with a status and error code.
    #[must_use]
    pub fn new(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                message: None,
            },
        }
    }

    /// Attaches a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.body.message = Some(message.into());
        self
    }

    /// Creates a transport-level error (no backend response).
    #[must_use]
    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(0, error_codes::NETWORK).with_message(detail)
    }

    /// Checks whether the request failed before reaching the backend.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        self.status == 0
    }

    /// Checks whether the backend rejected the request (4xx).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Checks whether the backend itself failed (5xx).
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}
