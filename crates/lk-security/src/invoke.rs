//! Elevation-gated operation invoker.

use std::future::Future;
use std::sync::Arc;

use lk_api::error::error_codes;
use lk_api::FetchError;
use lk_invoke::invoker::{ErrorPayload, SuccessPayload};
use lk_invoke::{CallOutcome, CallState, Invoker};

use crate::elevation::{ElevationController, ElevationError};

impl From<ElevationError> for FetchError {
    fn from(error: ElevationError) -> Self {
        Self::new(0, error_codes::ELEVATION).with_message(error.to_string())
    }
}

/// An [`Invoker`] that elevates the session before each call.
///
/// `requires_elevation` is re-checked inside every call, never cached
/// across calls, and the whole check runs within the call's
/// lifecycle, so an elevation failure settles the state and reaches
/// the error callback exactly like a backend failure would.
pub struct ElevatedInvoker<C, P, D> {
    inner: Invoker<C, P, D>,
    elevation: Arc<ElevationController>,
}

impl<C, P, D> ElevatedInvoker<C, P, D>
where
    C: Clone,
    P: Clone,
{
    /// Creates an elevation-gated invoker.
    #[must_use]
    pub fn new(context: C, elevation: Arc<ElevationController>) -> Self {
        Self {
            inner: Invoker::new(context),
            elevation,
        }
    }

    /// Replaces the success callback.
    pub fn set_on_success(
        &self,
        handler: impl for<'a> Fn(SuccessPayload<'a, C, P, D>) + Send + Sync + 'static,
    ) {
        self.inner.set_on_success(handler);
    }

    /// Replaces the error callback.
    pub fn set_on_error(
        &self,
        handler: impl for<'a> Fn(ErrorPayload<'a, C, P>) + Send + Sync + 'static,
    ) {
        self.inner.set_on_error(handler);
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CallState {
        self.inner.state()
    }

    /// Whether a call is currently in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    /// Invokes a backend operation, elevating first when required.
    pub async fn call_async<F, Fut>(&self, operation: F, params: P) -> CallOutcome<D>
    where
        F: FnOnce(C, P) -> Fut,
        Fut: Future<Output = Result<D, FetchError>>,
    {
        let elevation = Arc::clone(&self.elevation);
        self.inner
            .call_async(
                move |context, params| async move {
                    if elevation.requires_elevation() {
                        elevation.check_elevation().await.map_err(FetchError::from)?;
                    }
                    operation(context, params).await
                },
                params,
            )
            .await
    }
}
