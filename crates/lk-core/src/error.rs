//! Error handling for the Latchkey client SDK.
//!
//! ## NIST 800-53 Rev5: SI-11 (Error Handling)
//!
//! Backend operation failures carry their own structured error type in
//! `lk-api`; this module covers the SDK's own failure modes, most of
//! which indicate a misconfigured or misused client.

use thiserror::Error;

/// Result type alias using the Latchkey error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for SDK-level failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A session handle was read after its owning client was dropped.
    ///
    /// This is thrown loudly rather than returning an empty context so
    /// that wiring mistakes surface during development.
    #[error("session context must be used within a provider scope")]
    OutsideProviderScope,

    /// Internal error.
    #[error("internal error")]
    Internal,
}

impl Error {
    /// Returns whether this error indicates incorrect use of the SDK
    /// rather than a runtime failure.
    #[must_use]
    pub const fn is_usage_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::OutsideProviderScope)
    }
}
