//! Operation lifecycle state.

use lk_api::FetchError;

/// Lifecycle of one invoker's visible call state.
///
/// Reset at the start of every invocation, finalized at settlement.
/// The state belongs to one invoker instance and is not shared across
/// instances.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallState {
    /// A call is in flight.
    pub is_loading: bool,
    /// The most recently settled call succeeded.
    pub is_success: bool,
    /// The most recently settled call's error, if it failed.
    pub error: Option<FetchError>,
}

impl CallState {
    /// The state before any call has been made.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            is_loading: false,
            is_success: false,
            error: None,
        }
    }

    /// Re-arms the state for a new call.
    pub(crate) fn arm(&mut self) {
        *self = Self {
            is_loading: true,
            is_success: false,
            error: None,
        };
    }

    /// Finalizes the state after a successful call.
    pub(crate) fn settle_success(&mut self) {
        *self = Self {
            is_loading: false,
            is_success: true,
            error: None,
        };
    }

    /// Finalizes the state after a failed call.
    pub(crate) fn settle_failure(&mut self, error: FetchError) {
        *self = Self {
            is_loading: false,
            is_success: false,
            error: Some(error),
        };
    }
}
