//! Pure session reconciliation.
//!
//! Every signal source (store change, cross-context broadcast,
//! regained visibility, regained focus) funnels into the same
//! decision: given a candidate session and the last refresh-token id
//! we acted on, does the authoritative view change? Keeping that
//! decision a pure function keeps it testable apart from the signal
//! wiring.

use lk_model::{Session, User};

/// The authoritative in-memory view of the current session.
///
/// Invariants maintained by the synchronizer: `is_authenticated ==
/// session.is_some()` and `user` mirrors `session.user`. All fields
/// are written together; consumers never observe a partial update.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSnapshot {
    /// The authenticated user, when a session exists.
    pub user: Option<User>,
    /// Cached copy of the current session record.
    pub session: Option<Session>,
    /// Whether a session exists.
    pub is_authenticated: bool,
    /// Whether the synchronizer is initializing or mid-action.
    pub is_loading: bool,
}

impl AuthSnapshot {
    /// The state before the first reconciliation has settled.
    #[must_use]
    pub const fn initializing() -> Self {
        Self {
            user: None,
            session: None,
            is_authenticated: false,
            is_loading: true,
        }
    }
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    /// The candidate matches the last-seen id; nothing changes.
    Unchanged,
    /// The view must be overwritten with the candidate's fields.
    Updated {
        /// New user field.
        user: Option<User>,
        /// New session field.
        session: Option<Session>,
        /// New authentication flag.
        is_authenticated: bool,
        /// New last-seen refresh-token id.
        last_seen: Option<String>,
    },
}

/// Decides whether a candidate session changes the authoritative view.
///
/// A candidate whose refresh-token id equals `last_seen` is a
/// duplicate notification of a change already applied and produces
/// [`Reconciled::Unchanged`]; anything else overwrites the whole view
/// and advances the last-seen id.
#[must_use]
pub fn reconcile(candidate: Option<&Session>, last_seen: Option<&str>) -> Reconciled {
    let candidate_id = candidate.map(|session| session.refresh_token_id.as_str());
    if candidate_id == last_seen {
        return Reconciled::Unchanged;
    }

    Reconciled::Updated {
        user: candidate.and_then(|session| session.user.clone()),
        session: candidate.cloned(),
        is_authenticated: candidate.is_some(),
        last_seen: candidate_id.map(str::to_owned),
    }
}
