//! The operation invoker.

use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;

use lk_api::FetchError;

use crate::callback::CallbackCell;
use crate::state::CallState;

/// Payload delivered to the success callback.
pub struct SuccessPayload<'a, C, P, D> {
    /// The invoker's context (the backend namespace handle).
    pub context: &'a C,
    /// The operation's result.
    pub data: &'a D,
    /// The request object the operation was called with.
    pub params: &'a P,
}

/// Payload delivered to the error callback.
pub struct ErrorPayload<'a, C, P> {
    /// The invoker's context (the backend namespace handle).
    pub context: &'a C,
    /// The error the operation settled with.
    pub error: &'a FetchError,
    /// The request object the operation was called with.
    pub params: &'a P,
}

/// Success handler signature.
pub type SuccessHandler<C, P, D> = dyn for<'a> Fn(SuccessPayload<'a, C, P, D>) + Send + Sync;

/// Error handler signature.
pub type ErrorHandler<C, P> = dyn for<'a> Fn(ErrorPayload<'a, C, P>) + Send + Sync;

/// Settled outcome of [`Invoker::call_async`].
///
/// Failures are returned as a value rather than propagated, so a
/// caller not relying on the callbacks distinguishes success from
/// failure by matching on the outcome's shape.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum CallOutcome<D> {
    /// The operation resolved with its result.
    Success(D),
    /// The operation failed with a backend error.
    Failure(FetchError),
}

impl<D> CallOutcome<D> {
    /// Checks whether the call succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Checks whether the call failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns the result, if the call succeeded.
    #[must_use]
    pub const fn data(&self) -> Option<&D> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }

    /// Returns the error, if the call failed.
    #[must_use]
    pub const fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Converts the outcome into a standard `Result`.
    ///
    /// ## Errors
    ///
    /// Returns the operation's error when the call failed.
    pub fn into_result(self) -> Result<D, FetchError> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure(error) => Err(error),
        }
    }
}

/// Invoker for one family of backend operations.
///
/// `C` is the context handed to operations and callbacks (typically a
/// backend namespace handle), `P` the request type, `D` the result
/// type. Each instance owns one visible [`CallState`]; overlapping
/// calls on the same instance re-arm it and race on settlement, with
/// the last call to settle determining the visible state. There is no
/// queuing or cancellation; callers needing private lifecycles use
/// [`Invoker::isolated`].
pub struct Invoker<C, P, D> {
    context: C,
    state: Arc<RwLock<CallState>>,
    on_success: Arc<CallbackCell<SuccessHandler<C, P, D>>>,
    on_error: Arc<CallbackCell<ErrorHandler<C, P>>>,
}

impl<C, P, D> Invoker<C, P, D>
where
    C: Clone,
    P: Clone,
{
    /// Creates an invoker with no callbacks configured.
    #[must_use]
    pub fn new(context: C) -> Self {
        Self {
            context,
            state: Arc::new(RwLock::new(CallState::idle())),
            on_success: Arc::new(CallbackCell::empty()),
            on_error: Arc::new(CallbackCell::empty()),
        }
    }

    /// Sets the success callback at construction time.
    #[must_use]
    pub fn with_on_success(
        self,
        handler: impl for<'a> Fn(SuccessPayload<'a, C, P, D>) + Send + Sync + 'static,
    ) -> Self {
        self.set_on_success(handler);
        self
    }

    /// Sets the error callback at construction time.
    #[must_use]
    pub fn with_on_error(
        self,
        handler: impl for<'a> Fn(ErrorPayload<'a, C, P>) + Send + Sync + 'static,
    ) -> Self {
        self.set_on_error(handler);
        self
    }

    /// Replaces the success callback.
    ///
    /// Takes effect immediately, including for calls already in
    /// flight: the handler read at settlement is whichever is current
    /// then.
    pub fn set_on_success(
        &self,
        handler: impl for<'a> Fn(SuccessPayload<'a, C, P, D>) + Send + Sync + 'static,
    ) {
        self.on_success.set(Arc::new(handler));
    }

    /// Replaces the error callback.
    pub fn set_on_error(
        &self,
        handler: impl for<'a> Fn(ErrorPayload<'a, C, P>) + Send + Sync + 'static,
    ) {
        self.on_error.set(Arc::new(handler));
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CallState {
        self.state.read().clone()
    }

    /// Whether a call is currently in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    /// Returns a sibling invoker with a private lifecycle.
    ///
    /// The sibling shares this invoker's context and callback cells
    /// but owns fresh state, so its calls never race with calls made
    /// on the original instance.
    #[must_use]
    pub fn isolated(&self) -> Self {
        Self {
            context: self.context.clone(),
            state: Arc::new(RwLock::new(CallState::idle())),
            on_success: Arc::clone(&self.on_success),
            on_error: Arc::clone(&self.on_error),
        }
    }

    /// Invokes a backend operation, tracking its lifecycle.
    ///
    /// Arms the state synchronously, awaits the operation, finalizes
    /// the state, invokes the currently configured callback, and
    /// returns the settled outcome.
    pub async fn call_async<F, Fut>(&self, operation: F, params: P) -> CallOutcome<D>
    where
        F: FnOnce(C, P) -> Fut,
        Fut: Future<Output = Result<D, FetchError>>,
    {
        self.state.write().arm();

        match operation(self.context.clone(), params.clone()).await {
            Ok(data) => {
                self.state.write().settle_success();
                if let Some(handler) = self.on_success.current() {
                    handler(SuccessPayload {
                        context: &self.context,
                        data: &data,
                        params: &params,
                    });
                }
                CallOutcome::Success(data)
            }
            Err(error) => {
                self.state.write().settle_failure(error.clone());
                if let Some(handler) = self.on_error.current() {
                    handler(ErrorPayload {
                        context: &self.context,
                        error: &error,
                        params: &params,
                    });
                }
                CallOutcome::Failure(error)
            }
        }
    }
}
