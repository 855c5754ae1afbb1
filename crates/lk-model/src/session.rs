//! Session record model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::claims::{decode_access_token, DecodedToken};
use crate::user::User;

/// An authenticated session as persisted by the session store.
///
/// Sessions are created and replaced by the backend on sign-in,
/// refresh, and elevation, and destroyed on sign-out. The client holds
/// read-derived copies only; the store owns the record.
///
/// `refresh_token_id` is stable across token rotation within one
/// session and changes only when the session is materially replaced.
/// The synchronizer uses it as its de-duplication key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The authenticated user, when the backend includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    /// Bearer credential for backend calls.
    pub access_token: String,

    /// Seconds until the access token expires.
    pub access_token_expires_in: i64,

    /// Credential used to obtain new access tokens. Absent on
    /// sessions that cannot be renewed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Stable identifier of the refresh credential.
    pub refresh_token_id: String,

    /// Decoded access-token claims, when already computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoded_token: Option<DecodedToken>,
}

impl Session {
    /// Creates a new session record.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        refresh_token_id: impl Into<String>,
    ) -> Self {
        Self {
            user: None,
            access_token: access_token.into(),
            access_token_expires_in: 900,
            refresh_token: Some(refresh_token.into()),
            refresh_token_id: refresh_token_id.into(),
            decoded_token: None,
        }
    }

    /// Attaches the user record.
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    /// Decodes the access token's claims into `decoded_token`.
    ///
    /// A token that cannot be decoded leaves the field unset.
    #[must_use]
    pub fn with_decoded_token(mut self) -> Self {
        self.decoded_token = decode_access_token(&self.access_token);
        self
    }

    /// Returns the authenticated user's id.
    #[must_use]
    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|user| user.id)
    }

    /// Checks whether the session carries the elevation marker.
    #[must_use]
    pub fn is_elevated(&self) -> bool {
        self.decoded_token
            .as_ref()
            .is_some_and(DecodedToken::is_elevated)
    }
}
