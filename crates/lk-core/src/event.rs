//! Event logging for the Latchkey client SDK.
//!
//! ## NIST 800-53 Rev5: AU-2 (Event Logging)
//!
//! The session synchronizer and the elevation controller record
//! security-relevant lifecycle events (sign-out, token refresh,
//! startup redemption, elevation) as structured records emitted
//! through `tracing`. Events carry the acting user and the session
//! reference when available.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// User signed out.
    SignOut,
    /// Backend sign-out call failed (local logout still happened).
    SignOutError,
    /// Session refreshed on explicit request.
    RefreshToken,
    /// Session refresh failed.
    RefreshTokenError,
    /// One-time startup credential redeemed.
    TokenRedeemed,
    /// One-time startup credential redemption failed.
    TokenRedeemedError,
    /// Session upgraded to an elevated privilege tier.
    Elevate,
    /// Elevation attempt failed.
    ElevateError,
    /// Authoritative session state reconciled with the store.
    SessionReconciled,
}

/// Outcome of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failure,
}

/// A client lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,

    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Type of event.
    pub event_type: EventType,

    /// Outcome of the event.
    pub outcome: EventOutcome,

    /// User associated with the event.
    pub user_id: Option<Uuid>,

    /// Refresh-token id of the session involved, when one exists.
    pub session_ref: Option<String>,

    /// Error message (for failure events).
    pub error: Option<String>,
}

impl Event {
    /// Creates a new event builder.
    #[must_use]
    pub const fn builder(event_type: EventType) -> EventBuilder {
        EventBuilder::new(event_type)
    }

    /// Emits the event through `tracing`.
    ///
    /// Successful events log at info level, failures at warn level.
    pub fn emit(&self) {
        match self.outcome {
            EventOutcome::Success => tracing::info!(
                event = ?self.event_type,
                user_id = ?self.user_id,
                session_ref = ?self.session_ref,
                "client event"
            ),
            EventOutcome::Failure => tracing::warn!(
                event = ?self.event_type,
                user_id = ?self.user_id,
                session_ref = ?self.session_ref,
                error = ?self.error,
                "client event failed"
            ),
        }
    }
}

/// Builder for creating events.
pub struct EventBuilder {
    event_type: EventType,
    outcome: EventOutcome,
    user_id: Option<Uuid>,
    session_ref: Option<String>,
    error: Option<String>,
}

impl EventBuilder {
    /// Creates a new event builder.
    #[must_use]
    pub const fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            outcome: EventOutcome::Success,
            user_id: None,
            session_ref: None,
            error: None,
        }
    }

    /// Sets the outcome to failure with an error message.
    #[must_use]
    pub fn failure(mut self, error: impl Into<String>) -> Self {
        self.outcome = EventOutcome::Failure;
        self.error = Some(error.into());
        self
    }

    /// Sets the user ID.
    #[must_use]
    pub const fn user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Sets the user ID if one is known.
    #[must_use]
    pub fn user_opt(mut self, user_id: Option<Uuid>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Sets the session reference (refresh-token id).
    #[must_use]
    pub fn session_ref(mut self, session_ref: impl Into<String>) -> Self {
        self.session_ref = Some(session_ref.into());
        self
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            outcome: self.outcome,
            user_id: self.user_id,
            session_ref: self.session_ref,
            error: self.error,
        }
    }

    /// Builds the event and emits it through `tracing`.
    pub fn emit(self) {
        self.build().emit();
    }
}
