//! Session store adapter.
//!
//! The store is the single owner of the persisted session record.
//! Everything else (the synchronizer, the elevation controller, the
//! HTTP client's bearer credential) reads through it, and every
//! mutation flows back out through its change notifications.

use std::sync::Arc;

use parking_lot::RwLock;

use lk_api::TokenSource;
use lk_model::Session;

use crate::subscription::{HandlerRegistry, Subscription};

/// Handler invoked with the new session (or `None` after a clear).
pub type ChangeHandler = dyn Fn(Option<&Session>) + Send + Sync;

/// Observable holder of the one current session record.
pub trait SessionStore: Send + Sync {
    /// Reads the current session.
    fn read(&self) -> Option<Session>;

    /// Replaces the current session and notifies subscribers.
    fn write(&self, session: Session);

    /// Removes the current session and notifies subscribers.
    fn clear(&self);

    /// Subscribes to session changes.
    fn on_change(&self, handler: Box<ChangeHandler>) -> Subscription;
}

/// In-memory [`SessionStore`] implementation.
///
/// Embedders persisting the session elsewhere (a keychain, browser
/// storage behind FFI) implement the trait themselves; this is the
/// default used by tests and ephemeral clients.
pub struct MemorySessionStore {
    current: RwLock<Option<Session>>,
    handlers: HandlerRegistry<ChangeHandler>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            handlers: HandlerRegistry::new(),
        }
    }

    /// Creates a store seeded with a session.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        let store = Self::new();
        *store.current.write() = Some(session);
        store
    }

    fn notify(&self, session: Option<&Session>) {
        self.handlers.for_each(|handler| handler(session));
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self) -> Option<Session> {
        self.current.read().clone()
    }

    fn write(&self, session: Session) {
        *self.current.write() = Some(session.clone());
        self.notify(Some(&session));
    }

    fn clear(&self) {
        *self.current.write() = None;
        self.notify(None);
    }

    fn on_change(&self, handler: Box<ChangeHandler>) -> Subscription {
        self.handlers.insert(Arc::from(handler))
    }
}

/// Adapter exposing a store's current access token as a
/// [`TokenSource`] for the HTTP client.
pub struct StoreTokenSource {
    store: Arc<dyn SessionStore>,
}

impl StoreTokenSource {
    /// Creates a token source over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

impl TokenSource for StoreTokenSource {
    fn access_token(&self) -> Option<String> {
        self.store.read().map(|session| session.access_token)
    }
}
