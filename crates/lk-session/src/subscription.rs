//! Change-notification subscriptions.
//!
//! Both the session store and the synchronizer hand out RAII
//! [`Subscription`] guards; dropping the guard detaches the handler.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

/// A live change-notification subscription.
///
/// The handler stays attached until this guard is dropped or
/// [`Subscription::cancel`] is called.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub(crate) fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detaches the handler immediately.
    pub fn cancel(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.detach.is_some())
            .finish()
    }
}

/// Registry of live notification handlers.
pub(crate) struct HandlerRegistry<F: ?Sized> {
    handlers: Arc<DashMap<u64, Arc<F>>>,
    next_id: AtomicU64,
}

impl<F: ?Sized + Send + Sync + 'static> HandlerRegistry<F> {
    pub(crate) fn new() -> Self {
        Self {
            handlers: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Attaches a handler, returning the guard that detaches it.
    pub(crate) fn insert(&self, handler: Arc<F>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.handlers.insert(id, handler);

        let handlers = Arc::clone(&self.handlers);
        Subscription::new(move || {
            handlers.remove(&id);
        })
    }

    /// Invokes `notify` for every attached handler.
    pub(crate) fn for_each(&self, mut notify: impl FnMut(&F)) {
        for entry in self.handlers.iter() {
            notify(entry.value());
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }
}
