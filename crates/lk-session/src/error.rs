//! Session synchronization error types.

use thiserror::Error;

use lk_api::FetchError;

/// Errors from the synchronizer's imperative actions.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No session with a refresh credential is available.
    #[error("no session available to refresh")]
    NoSession,

    /// The backend rejected the call.
    #[error(transparent)]
    Backend(#[from] FetchError),
}

/// Result type for synchronizer actions.
pub type SyncResult<T> = std::result::Result<T, SyncError>;
