//! Decoded access-token claims.
//!
//! The client never validates token signatures; it only decodes the
//! payload segment to read privilege markers (most importantly the
//! elevation marker consulted before privileged operations).

use std::collections::HashMap;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

/// Well-known claim keys.
pub mod claim_keys {
    /// Key under which the backend namespaces its custom claims.
    pub const NAMESPACE: &str = "https://latchkey.io/jwt/claims";
    /// Marker claim present on sessions with elevated privileges.
    pub const ELEVATED: &str = "x-latchkey-auth-elevated";
    /// The authenticated user id.
    pub const USER_ID: &str = "x-latchkey-user-id";
    /// Roles the token may assume.
    pub const ALLOWED_ROLES: &str = "x-latchkey-allowed-roles";
}

/// Decoded payload of an access token.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecodedToken {
    /// Subject (the user id as issued).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issued-at time (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Remaining claims, including the backend's namespaced map.
    #[serde(flatten)]
    pub claims: HashMap<String, serde_json::Value>,
}

impl DecodedToken {
    /// Returns a custom claim from the backend's namespaced claim map.
    #[must_use]
    pub fn namespaced_claim(&self, key: &str) -> Option<&serde_json::Value> {
        self.claims
            .get(claim_keys::NAMESPACE)
            .and_then(|namespace| namespace.as_object())
            .and_then(|namespace| namespace.get(key))
    }

    /// Checks whether the elevation marker is present and truthy.
    ///
    /// The backend sets the marker either as a boolean or as the
    /// string `"true"` depending on the claim serializer in use; both
    /// forms count.
    #[must_use]
    pub fn is_elevated(&self) -> bool {
        match self.namespaced_claim(claim_keys::ELEVATED) {
            Some(serde_json::Value::Bool(value)) => *value,
            Some(serde_json::Value::String(value)) => value == "true",
            _ => false,
        }
    }
}

/// Decodes the payload segment of an access token.
///
/// Returns `None` when the token is not a three-segment JWT or the
/// payload is not valid base64url JSON. No signature verification is
/// performed; the claims gate client-side UX decisions only.
#[must_use]
pub fn decode_access_token(access_token: &str) -> Option<DecodedToken> {
    let payload = access_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}
