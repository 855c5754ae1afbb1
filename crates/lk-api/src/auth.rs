//! Authentication operations of the backend client.
//!
//! Covers credential-based sign-up/sign-in, session lifecycle
//! (sign-out, refresh), and the step-up elevation protocol
//! (challenge issuance and assertion verification).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lk_model::{SecurityKey, Session};

use crate::error::ApiResult;

/// Request to create an account with email and password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpEmailPasswordRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Optional display name recorded at sign-up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Request to authenticate with email and password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInEmailPasswordRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Request to terminate a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOutRequest {
    /// The refresh credential of the session being terminated.
    pub refresh_token: String,
    /// Terminate every session of the user, not just this one.
    #[serde(default)]
    pub all: bool,
}

/// Request to exchange a refresh credential for a new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// The refresh credential to redeem.
    pub refresh_token: String,
}

/// Response envelope for operations that may mint a session.
///
/// Sign-up without email verification and sign-in both return a
/// session; flows that need a follow-up step return none.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    /// The minted session, when the flow completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

/// Challenge payload handed to the external credential ceremony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CeremonyChallenge {
    /// Base64url-encoded challenge bytes.
    pub challenge: String,
    /// Relying-party identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,
    /// Credentials the authenticator may use.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow_credentials: Vec<AllowCredential>,
    /// Ceremony timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Requested user-verification level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
}

/// A credential the authenticator is allowed to respond with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowCredential {
    /// Base64url-encoded credential id.
    pub id: String,
    /// Credential type, normally `public-key`.
    #[serde(rename = "type")]
    pub credential_type: String,
}

/// Assertion produced by the external credential ceremony.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialAssertion {
    /// Base64url-encoded credential id.
    pub id: String,
    /// Raw credential id.
    pub raw_id: String,
    /// Credential type, normally `public-key`.
    #[serde(rename = "type")]
    pub credential_type: String,
    /// The authenticator's signed response.
    pub response: AssertionResponse,
}

/// Signed response fields of a credential assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionResponse {
    /// Base64url-encoded client data.
    pub client_data_json: String,
    /// Base64url-encoded authenticator data.
    pub authenticator_data: String,
    /// Base64url-encoded signature over the challenge.
    pub signature: String,
    /// Base64url-encoded user handle, when the authenticator knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}

/// Request to verify an elevation assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyElevateRequest {
    /// Email of the user being elevated.
    pub email: String,
    /// The assertion produced by the ceremony.
    pub credential: CredentialAssertion,
}

/// Authentication operations.
///
/// Implementations may talk HTTP to a real backend or be scripted in
/// tests; callers only depend on this trait.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Creates an account and, when possible, a first session.
    async fn sign_up_email_password(
        &self,
        request: SignUpEmailPasswordRequest,
    ) -> ApiResult<SessionPayload>;

    /// Authenticates with email and password.
    async fn sign_in_email_password(
        &self,
        request: SignInEmailPasswordRequest,
    ) -> ApiResult<SessionPayload>;

    /// Terminates the session owning the given refresh credential.
    async fn sign_out(&self, request: SignOutRequest) -> ApiResult<()>;

    /// Exchanges a refresh credential for a fresh session.
    async fn refresh_token(&self, request: RefreshTokenRequest) -> ApiResult<Session>;

    /// Requests an elevation challenge for the current session.
    async fn elevate_webauthn(&self) -> ApiResult<CeremonyChallenge>;

    /// Verifies an elevation assertion and mints the elevated session.
    async fn verify_elevate_webauthn(
        &self,
        request: VerifyElevateRequest,
    ) -> ApiResult<SessionPayload>;

    /// Lists the security keys registered for a user.
    async fn security_keys(&self, user_id: Uuid) -> ApiResult<Vec<SecurityKey>>;
}

/// Source of the bearer credential attached to authorized requests.
///
/// An adapter over the session store implements this so the HTTP
/// client always sends the access token of whatever session is
/// current.
pub trait TokenSource: Send + Sync {
    /// Returns the current access token, if a session exists.
    fn access_token(&self) -> Option<String>;
}
