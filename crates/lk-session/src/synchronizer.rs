//! Session synchronization state machine.
//!
//! [`SessionSync`] owns the authoritative `{user, session,
//! is_authenticated, is_loading}` view. It is the only writer; every
//! mutation happens inside its reconciliation routine or its two
//! imperative actions. Reads go through [`SessionSync::snapshot`] and
//! change notifications through [`SessionSync::subscribe`].
//!
//! Four signal sources trigger reconciliation: the store's own change
//! notifications (wired in [`SessionSync::start`]), cross-context
//! storage broadcasts, regained visibility, and regained focus. The
//! embedder forwards the latter three from its environment to the
//! `handle_*` entry points. All four share the pure [`reconcile`]
//! function, so a duplicate notification for the same refresh-token id
//! never re-notifies consumers.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use lk_api::auth::{RefreshTokenRequest, SignOutRequest};
use lk_api::AuthApi;
use lk_core::config::SessionConfig;
use lk_core::event::{Event, EventType};
use lk_model::Session;

use crate::error::{SyncError, SyncResult};
use crate::location::Location;
use crate::reconcile::{reconcile, AuthSnapshot, Reconciled};
use crate::store::SessionStore;
use crate::subscription::{HandlerRegistry, Subscription};

/// Handler invoked with the snapshot after each observable change.
pub type SnapshotHandler = dyn Fn(&AuthSnapshot) + Send + Sync;

/// The session synchronization state machine.
pub struct SessionSync {
    auth: Arc<dyn AuthApi>,
    store: Arc<dyn SessionStore>,
    location: Arc<dyn Location>,
    storage_key: String,
    refresh_param: String,
    state: RwLock<AuthSnapshot>,
    last_seen: Mutex<Option<String>>,
    observers: HandlerRegistry<SnapshotHandler>,
    store_subscription: Mutex<Option<Subscription>>,
    this: Weak<SessionSync>,
}

impl SessionSync {
    /// Creates a synchronizer over the given collaborators.
    ///
    /// The synchronizer starts in the initializing state; call
    /// [`SessionSync::start`] to redeem any pending startup credential
    /// and establish the first settled snapshot.
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthApi>,
        store: Arc<dyn SessionStore>,
        location: Arc<dyn Location>,
        config: &SessionConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            auth,
            store,
            location,
            storage_key: config.storage_key.clone(),
            refresh_param: config.refresh_param.clone(),
            state: RwLock::new(AuthSnapshot::initializing()),
            last_seen: Mutex::new(None),
            observers: HandlerRegistry::new(),
            store_subscription: Mutex::new(None),
            this: this.clone(),
        })
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.read().clone()
    }

    /// Subscribes to snapshot changes.
    ///
    /// Handlers fire only when the snapshot actually changed, compared
    /// field by field.
    pub fn subscribe(&self, handler: Box<SnapshotHandler>) -> Subscription {
        self.observers.insert(Arc::from(handler))
    }

    /// Starts the synchronizer.
    ///
    /// Subscribes to store change notifications, redeems a pending
    /// one-time refresh credential from the location (removing it from
    /// the query string exactly once, whatever the outcome), then
    /// applies the first reconciliation unconditionally and leaves the
    /// initializing state.
    ///
    /// A failed redemption is not surfaced to any caller: the cleaned
    /// location is asked to reload and startup continues without a
    /// session.
    pub async fn start(&self) {
        let weak = self.this.clone();
        let subscription = self.store.on_change(Box::new(move |session| {
            if let Some(sync) = weak.upgrade() {
                sync.reconcile_candidate(session);
            }
        }));
        *self.store_subscription.lock() = Some(subscription);

        self.mutate(|snapshot| snapshot.is_loading = true);

        if let Some(pending) = self.location.query_param(&self.refresh_param) {
            let redeemed = self
                .auth
                .refresh_token(RefreshTokenRequest {
                    refresh_token: pending,
                })
                .await;

            // One-time credential: never leave it redeemable twice.
            self.location.remove_query_param(&self.refresh_param);

            match redeemed {
                Ok(session) => {
                    Event::builder(EventType::TokenRedeemed)
                        .user_opt(session.user_id())
                        .session_ref(session.refresh_token_id.clone())
                        .emit();
                    self.store.write(session);
                }
                Err(error) => {
                    Event::builder(EventType::TokenRedeemedError)
                        .failure(error.to_string())
                        .emit();
                    self.location.request_reload();
                }
            }
        }

        let current = self.store.read();
        self.apply_unconditional(current, false);
    }

    /// Cross-context broadcast: the persisted session key changed in
    /// another execution context.
    ///
    /// Broadcasts for other keys are ignored. An absent or unparsable
    /// payload reconciles as a signed-out state.
    pub fn handle_storage_event(&self, key: &str, raw: Option<&str>) {
        if key != self.storage_key {
            return;
        }

        let candidate = raw.and_then(|value| match serde_json::from_str::<Session>(value) {
            Ok(session) => Some(ensure_decoded(session)),
            Err(error) => {
                tracing::warn!(%error, "discarding unparsable session broadcast");
                None
            }
        });

        self.reconcile_candidate(candidate.as_ref());
    }

    /// The context became visible again; resynchronize from the store.
    pub fn handle_visibility_change(&self, visible: bool) {
        if !visible {
            return;
        }
        self.reconcile_from_store();
    }

    /// The context regained focus; resynchronize from the store.
    pub fn handle_focus(&self) {
        self.reconcile_from_store();
    }

    /// Signs the user out.
    ///
    /// A no-op when the current session holds no refresh credential.
    /// Otherwise calls the backend sign-out and clears the store and
    /// the snapshot regardless of the backend outcome: the intent is
    /// a local logout, and a backend failure is only recorded as an
    /// event.
    pub async fn sign_out(&self) {
        let snapshot = self.snapshot();
        let Some(refresh_token) = snapshot
            .session
            .as_ref()
            .and_then(|session| session.refresh_token.clone())
        else {
            return;
        };
        let user_id = snapshot.session.as_ref().and_then(Session::user_id);

        self.mutate(|snapshot| snapshot.is_loading = true);

        match self
            .auth
            .sign_out(SignOutRequest {
                refresh_token,
                all: false,
            })
            .await
        {
            Ok(()) => Event::builder(EventType::SignOut).user_opt(user_id).emit(),
            Err(error) => Event::builder(EventType::SignOutError)
                .user_opt(user_id)
                .failure(error.to_string())
                .emit(),
        }

        self.store.clear();
        self.apply_unconditional(None, false);
    }

    /// Forces the backend to mint a new session immediately.
    ///
    /// The fresh session is written to the store (so sibling contexts
    /// converge through the normal change channel) and applied to the
    /// snapshot without the de-duplication check: an explicit refresh
    /// always takes effect.
    ///
    /// ## Errors
    ///
    /// [`SyncError::NoSession`] when no refresh credential exists,
    /// or the backend error from the refresh call.
    pub async fn refresh_session(&self) -> SyncResult<Session> {
        let refresh_token = self
            .store
            .read()
            .and_then(|session| session.refresh_token)
            .ok_or(SyncError::NoSession)?;

        self.mutate(|snapshot| snapshot.is_loading = true);

        let session = match self
            .auth
            .refresh_token(RefreshTokenRequest { refresh_token })
            .await
        {
            Ok(session) => session,
            Err(error) => {
                Event::builder(EventType::RefreshTokenError)
                    .failure(error.to_string())
                    .emit();
                self.mutate(|snapshot| snapshot.is_loading = false);
                return Err(error.into());
            }
        };

        Event::builder(EventType::RefreshToken)
            .user_opt(session.user_id())
            .session_ref(session.refresh_token_id.clone())
            .emit();

        self.store.write(session.clone());
        self.apply_unconditional(Some(session.clone()), false);
        Ok(session)
    }

    fn reconcile_from_store(&self) {
        let current = self.store.read();
        self.reconcile_candidate(current.as_ref());
    }

    /// The deduplicating reconciliation path shared by all triggers.
    fn reconcile_candidate(&self, candidate: Option<&Session>) {
        let mut last_seen = self.last_seen.lock();
        match reconcile(candidate, last_seen.as_deref()) {
            Reconciled::Unchanged => {}
            Reconciled::Updated {
                user,
                session,
                is_authenticated,
                last_seen: next,
            } => {
                *last_seen = next;
                drop(last_seen);
                self.mutate(|snapshot| {
                    snapshot.user = user;
                    snapshot.session = session;
                    snapshot.is_authenticated = is_authenticated;
                });
            }
        }
    }

    /// Overwrites the snapshot bypassing the de-duplication check.
    fn apply_unconditional(&self, candidate: Option<Session>, is_loading: bool) {
        *self.last_seen.lock() = candidate
            .as_ref()
            .map(|session| session.refresh_token_id.clone());

        Event::builder(EventType::SessionReconciled)
            .user_opt(candidate.as_ref().and_then(Session::user_id))
            .emit();

        self.mutate(|snapshot| {
            snapshot.user = candidate.as_ref().and_then(|session| session.user.clone());
            snapshot.is_authenticated = candidate.is_some();
            snapshot.session = candidate;
            snapshot.is_loading = is_loading;
        });
    }

    /// Applies a mutation and notifies observers when it changed the
    /// snapshot. Observers run outside the state lock.
    fn mutate(&self, apply: impl FnOnce(&mut AuthSnapshot)) {
        let after = {
            let mut state = self.state.write();
            let before = state.clone();
            apply(&mut state);
            if *state == before {
                return;
            }
            state.clone()
        };

        self.observers.for_each(|handler| handler(&after));
    }
}

/// Decodes the access token's claims when the serialized session did
/// not carry them.
fn ensure_decoded(session: Session) -> Session {
    if session.decoded_token.is_none() {
        session.with_decoded_token()
    } else {
        session
    }
}
