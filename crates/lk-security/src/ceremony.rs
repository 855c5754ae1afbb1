//! External credential ceremony seam.
//!
//! The authenticator interaction itself, prompting for a security key
//! and collecting the signed assertion, happens outside this crate.
//! Embedders implement [`CeremonyProvider`] over their platform's
//! authenticator API.

use async_trait::async_trait;
use thiserror::Error;

use lk_api::auth::{CeremonyChallenge, CredentialAssertion};

/// Errors from the external credential ceremony.
#[derive(Debug, Clone, Error)]
pub enum CeremonyError {
    /// The user dismissed or abandoned the ceremony.
    #[error("ceremony was cancelled")]
    Cancelled,

    /// The authenticator failed to produce an assertion.
    #[error("authenticator failure: {0}")]
    Authenticator(String),
}

/// Produces a credential assertion for a challenge.
#[async_trait]
pub trait CeremonyProvider: Send + Sync {
    /// Runs the ceremony for the given challenge.
    async fn authenticate(
        &self,
        challenge: CeremonyChallenge,
    ) -> Result<CredentialAssertion, CeremonyError>;
}

/// Ceremony provider for environments without an authenticator.
///
/// Every ceremony fails, which in turn fails any elevation attempt.
/// Clients that never see security-key users can run with this
/// default; anything else must supply a real provider.
pub struct UnsupportedCeremony;

#[async_trait]
impl CeremonyProvider for UnsupportedCeremony {
    async fn authenticate(
        &self,
        _challenge: CeremonyChallenge,
    ) -> Result<CredentialAssertion, CeremonyError> {
        Err(CeremonyError::Authenticator(
            "no ceremony provider configured".to_string(),
        ))
    }
}
