//! The elevation controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use lk_api::auth::VerifyElevateRequest;
use lk_api::{AuthApi, FetchError};
use lk_core::event::{Event, EventType};
use lk_model::{SecurityKey, Session};
use lk_session::SessionStore;

use crate::ceremony::{CeremonyError, CeremonyProvider};

/// Errors from an elevation attempt, tagged by the step that failed.
///
/// Callers see two normalized messages: every failure on the way to an
/// elevated session renders as "Could not elevate permissions", except
/// a verification response that lacked a session, which keeps its own
/// "Failed to get elevated session". The step and source remain
/// available for diagnostics.
#[derive(Debug, Error)]
pub enum ElevationError {
    /// Requesting the challenge from the backend failed.
    #[error("Could not elevate permissions")]
    Challenge(#[source] FetchError),

    /// The external credential ceremony failed or was cancelled.
    #[error("Could not elevate permissions")]
    Ceremony(#[source] CeremonyError),

    /// The backend rejected the assertion.
    #[error("Could not elevate permissions")]
    Verification(#[source] FetchError),

    /// Verification succeeded but returned no session.
    #[error("Failed to get elevated session")]
    MissingSession,
}

/// Drives the step-up elevation protocol.
///
/// Elevation state is derived, never stored: `is_elevated` comes from
/// the current session's claims on every read, and
/// `requires_elevation` must be re-checked immediately before each
/// privileged call because a session replaced elsewhere can lose its
/// elevation between calls.
pub struct ElevationController {
    auth: Arc<dyn AuthApi>,
    store: Arc<dyn SessionStore>,
    ceremony: Arc<dyn CeremonyProvider>,
    keys: RwLock<Vec<SecurityKey>>,
    keys_loading: AtomicBool,
}

impl ElevationController {
    /// Creates a controller over the given collaborators.
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthApi>,
        store: Arc<dyn SessionStore>,
        ceremony: Arc<dyn CeremonyProvider>,
    ) -> Self {
        Self {
            auth,
            store,
            ceremony,
            keys: RwLock::new(Vec::new()),
            keys_loading: AtomicBool::new(false),
        }
    }

    /// Whether the current session carries the elevation marker.
    #[must_use]
    pub fn is_elevated(&self) -> bool {
        self.store
            .read()
            .is_some_and(|session| session.is_elevated())
    }

    /// The cached set of registered security keys.
    #[must_use]
    pub fn security_keys(&self) -> Vec<SecurityKey> {
        self.keys.read().clone()
    }

    /// Whether the current user has registered security keys.
    #[must_use]
    pub fn has_security_keys(&self) -> bool {
        !self.keys.read().is_empty()
    }

    /// Whether a key-set refresh is in flight.
    #[must_use]
    pub fn is_loading_keys(&self) -> bool {
        self.keys_loading.load(Ordering::SeqCst)
    }

    /// Whether the next privileged call must elevate first.
    ///
    /// False whenever no security keys are registered, regardless of
    /// the session's elevation marker.
    #[must_use]
    pub fn requires_elevation(&self) -> bool {
        !self.is_elevated() && self.has_security_keys()
    }

    /// Refreshes the security-key set for the current user.
    ///
    /// Best-effort: the set only gates the elevation prompt, so
    /// failures are logged and swallowed and the previous set is kept.
    /// A signed-out store leaves the set untouched.
    pub async fn refresh_security_keys(&self) {
        let Some(user_id) = self.store.read().and_then(|session| session.user_id()) else {
            return;
        };

        self.keys_loading.store(true, Ordering::SeqCst);
        match self.auth.security_keys(user_id).await {
            Ok(keys) => *self.keys.write() = keys,
            Err(error) => {
                tracing::warn!(%user_id, %error, "failed to fetch security keys");
            }
        }
        self.keys_loading.store(false, Ordering::SeqCst);
    }

    /// Elevates the current session when required.
    ///
    /// A no-op when elevation is not required. Otherwise runs the
    /// three-step protocol (challenge, external ceremony, verify)
    /// and writes the elevated session into the store, which is what
    /// later drives the synchronizer's reconciliation. No step failure
    /// ever mutates the store.
    ///
    /// ## Errors
    ///
    /// One [`ElevationError`] variant per failing step.
    pub async fn check_elevation(&self) -> Result<(), ElevationError> {
        if !self.requires_elevation() {
            return Ok(());
        }

        let user_id = self.store.read().and_then(|session| session.user_id());
        match self.run_protocol().await {
            Ok(session) => {
                Event::builder(EventType::Elevate)
                    .user_opt(user_id)
                    .session_ref(session.refresh_token_id.clone())
                    .emit();
                self.store.write(session);
                Ok(())
            }
            Err(error) => {
                Event::builder(EventType::ElevateError)
                    .user_opt(user_id)
                    .failure(error.to_string())
                    .emit();
                Err(error)
            }
        }
    }

    async fn run_protocol(&self) -> Result<Session, ElevationError> {
        let challenge = self
            .auth
            .elevate_webauthn()
            .await
            .map_err(ElevationError::Challenge)?;

        let assertion = self
            .ceremony
            .authenticate(challenge)
            .await
            .map_err(ElevationError::Ceremony)?;

        let email = self
            .store
            .read()
            .and_then(|session| session.user)
            .and_then(|user| user.email)
            .unwrap_or_default();

        let payload = self
            .auth
            .verify_elevate_webauthn(VerifyElevateRequest {
                email,
                credential: assertion,
            })
            .await
            .map_err(ElevationError::Verification)?;

        payload.session.ok_or(ElevationError::MissingSession)
    }
}
