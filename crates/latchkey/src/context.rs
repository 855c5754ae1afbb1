//! Context distribution.
//!
//! Consumers anywhere in the embedding application read session state
//! through a [`SessionHandle`] instead of having the tuple threaded to
//! them. The handle holds a weak reference to the owning client:
//! reading it after the client is gone fails loudly with
//! [`Error::OutsideProviderScope`] rather than silently yielding an
//! empty context.

use std::sync::Weak;

use uuid::Uuid;

use lk_core::{Error, Result};
use lk_model::{Session, User};
use lk_session::synchronizer::SnapshotHandler;
use lk_session::{Subscription, SyncResult};

use crate::client::{Client, ClientInner};

/// Read handle onto a client's session state.
pub struct SessionHandle {
    inner: Weak<ClientInner>,
}

impl SessionHandle {
    pub(crate) fn new(inner: Weak<ClientInner>) -> Self {
        Self { inner }
    }

    /// Whether the owning client is still alive.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Returns the current session context.
    ///
    /// ## Errors
    ///
    /// [`Error::OutsideProviderScope`] once the owning client has been
    /// dropped.
    pub fn current(&self) -> Result<SessionContext> {
        let inner = self.inner.upgrade().ok_or(Error::OutsideProviderScope)?;
        let snapshot = inner.sync.snapshot();

        Ok(SessionContext {
            user_id: snapshot.user.as_ref().map(|user| user.id),
            user: snapshot.user,
            session: snapshot.session,
            is_authenticated: snapshot.is_authenticated,
            is_loading: snapshot.is_loading,
            client: Client { inner },
        })
    }

    /// Subscribes to session state changes.
    ///
    /// The handler fires only when a constituent value actually
    /// changed, so consumers can memoize on every notification.
    ///
    /// ## Errors
    ///
    /// [`Error::OutsideProviderScope`] once the owning client has been
    /// dropped.
    pub fn subscribe(&self, handler: Box<SnapshotHandler>) -> Result<Subscription> {
        let inner = self.inner.upgrade().ok_or(Error::OutsideProviderScope)?;
        Ok(inner.sync.subscribe(handler))
    }
}

/// A point-in-time view of session state plus the exposed actions.
///
/// Two contexts compare equal exactly when every constituent value is
/// equal and they come from the same client.
#[derive(Clone)]
pub struct SessionContext {
    /// The authenticated user.
    pub user: Option<User>,
    /// The current session record.
    pub session: Option<Session>,
    /// Whether a session exists.
    pub is_authenticated: bool,
    /// Whether the synchronizer is initializing or mid-action.
    pub is_loading: bool,
    /// The authenticated user's id.
    pub user_id: Option<Uuid>,
    client: Client,
}

impl SessionContext {
    /// The backend handle.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Signs the user out. See [`lk_session::SessionSync::sign_out`].
    pub async fn sign_out(&self) {
        self.client.inner.sync.sign_out().await;
    }

    /// Forces a fresh session. See
    /// [`lk_session::SessionSync::refresh_session`].
    ///
    /// ## Errors
    ///
    /// [`lk_session::SyncError`] when no session exists or the backend
    /// rejects the refresh.
    pub async fn refresh_session(&self) -> SyncResult<Session> {
        self.client.inner.sync.refresh_session().await
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id)
            .field("is_authenticated", &self.is_authenticated)
            .field("is_loading", &self.is_loading)
            .finish_non_exhaustive()
    }
}

impl PartialEq for SessionContext {
    fn eq(&self, other: &Self) -> bool {
        self.user == other.user
            && self.session == other.session
            && self.is_authenticated == other.is_authenticated
            && self.is_loading == other.is_loading
            && self.user_id == other.user_id
            && std::sync::Arc::ptr_eq(&self.client.inner, &other.client.inner)
    }
}
