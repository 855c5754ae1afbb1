//! Registered security key model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A security key registered for a user.
///
/// The presence of at least one registered key is what makes
/// elevation mandatory before privileged operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityKey {
    /// Unique key identifier.
    pub id: Uuid,
    /// User-chosen label (e.g. "work yubikey").
    pub nickname: String,
}

impl SecurityKey {
    /// Creates a new security key record.
    #[must_use]
    pub fn new(id: Uuid, nickname: impl Into<String>) -> Self {
        Self {
            id,
            nickname: nickname.into(),
        }
    }
}
