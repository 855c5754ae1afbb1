//! Common test fixtures: a scriptable mock backend, a scripted
//! ceremony provider, and a fully wired client.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use latchkey::{Client, Config};
use lk_api::auth::{
    AssertionResponse, AuthApi, CeremonyChallenge, CredentialAssertion, RefreshTokenRequest,
    SessionPayload, SignInEmailPasswordRequest, SignOutRequest, SignUpEmailPasswordRequest,
    VerifyElevateRequest,
};
use lk_api::storage::{
    DeleteFileRequest, DownloadFileRequest, FileMetadata, StorageApi, UploadFileRequest,
};
use lk_api::{ApiResult, FetchError};
use lk_model::claims::claim_keys;
use lk_model::{DecodedToken, SecurityKey, Session, User};
use lk_security::{CeremonyError, CeremonyProvider};
use lk_session::{MemorySessionStore, UrlLocation};

/// Initializes tracing for tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("lk_session=debug,lk_security=debug")
        .try_init();
}

/// A user fixture.
pub fn test_user() -> User {
    User::new(Uuid::now_v7())
        .with_email("jo@example.com")
        .with_display_name("Jo")
}

/// A session fixture with the given refresh-token id.
pub fn session(id: &str) -> Session {
    Session::new(format!("at-{id}"), format!("rt-{id}"), id).with_user(test_user())
}

/// A session fixture carrying the elevation marker.
pub fn elevated_session(id: &str) -> Session {
    let mut decoded = DecodedToken::default();
    decoded.claims.insert(
        claim_keys::NAMESPACE.to_string(),
        serde_json::json!({ claim_keys::ELEVATED: true }),
    );
    let mut session = session(id);
    session.decoded_token = Some(decoded);
    session
}

/// A ceremony challenge fixture.
pub fn challenge() -> CeremonyChallenge {
    CeremonyChallenge {
        challenge: "Y2hhbGxlbmdl".to_string(),
        rp_id: Some("app.example.com".to_string()),
        allow_credentials: Vec::new(),
        timeout: Some(60_000),
        user_verification: Some("preferred".to_string()),
    }
}

/// A credential assertion fixture.
pub fn assertion() -> CredentialAssertion {
    CredentialAssertion {
        id: "Y3JlZC0x".to_string(),
        raw_id: "Y3JlZC0x".to_string(),
        credential_type: "public-key".to_string(),
        response: AssertionResponse {
            client_data_json: "e30".to_string(),
            authenticator_data: "e30".to_string(),
            signature: "c2ln".to_string(),
            user_handle: None,
        },
    }
}

fn unexpected_call() -> FetchError {
    FetchError::new(500, "unexpected_call")
}

/// Scriptable authentication backend.
pub struct MockAuthApi {
    /// Response for the next sign-in call.
    pub sign_in_result: Mutex<Option<ApiResult<SessionPayload>>>,
    /// Responses for refresh calls, consumed front to back.
    pub refresh_results: Mutex<VecDeque<ApiResult<Session>>>,
    /// Refresh tokens the backend has seen.
    pub refresh_calls: Mutex<Vec<String>>,
    /// Result of sign-out calls.
    pub sign_out_result: Mutex<ApiResult<()>>,
    /// Number of sign-out calls made.
    pub sign_out_calls: AtomicUsize,
    /// Result of elevation challenge requests.
    pub challenge_result: Mutex<ApiResult<CeremonyChallenge>>,
    /// Response for the next elevation verify call.
    pub verify_result: Mutex<Option<ApiResult<SessionPayload>>>,
    /// Number of verify calls made.
    pub verify_calls: AtomicUsize,
    /// Result of security-key listing.
    pub keys_result: Mutex<ApiResult<Vec<SecurityKey>>>,
}

impl Default for MockAuthApi {
    fn default() -> Self {
        Self {
            sign_in_result: Mutex::new(None),
            refresh_results: Mutex::new(VecDeque::new()),
            refresh_calls: Mutex::new(Vec::new()),
            sign_out_result: Mutex::new(Ok(())),
            sign_out_calls: AtomicUsize::new(0),
            challenge_result: Mutex::new(Ok(challenge())),
            verify_result: Mutex::new(None),
            verify_calls: AtomicUsize::new(0),
            keys_result: Mutex::new(Ok(Vec::new())),
        }
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn sign_up_email_password(
        &self,
        _request: SignUpEmailPasswordRequest,
    ) -> ApiResult<SessionPayload> {
        Err(unexpected_call())
    }

    async fn sign_in_email_password(
        &self,
        _request: SignInEmailPasswordRequest,
    ) -> ApiResult<SessionPayload> {
        self.sign_in_result
            .lock()
            .take()
            .unwrap_or_else(|| Err(unexpected_call()))
    }

    async fn sign_out(&self, _request: SignOutRequest) -> ApiResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.sign_out_result.lock().clone()
    }

    async fn refresh_token(&self, request: RefreshTokenRequest) -> ApiResult<Session> {
        self.refresh_calls.lock().push(request.refresh_token);
        self.refresh_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(unexpected_call()))
    }

    async fn elevate_webauthn(&self) -> ApiResult<CeremonyChallenge> {
        self.challenge_result.lock().clone()
    }

    async fn verify_elevate_webauthn(
        &self,
        _request: VerifyElevateRequest,
    ) -> ApiResult<SessionPayload> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.verify_result
            .lock()
            .take()
            .unwrap_or_else(|| Err(unexpected_call()))
    }

    async fn security_keys(&self, _user_id: Uuid) -> ApiResult<Vec<SecurityKey>> {
        self.keys_result.lock().clone()
    }
}

/// Scriptable storage backend.
#[derive(Default)]
pub struct MockStorageApi {
    /// Response for the next upload call.
    pub upload_result: Mutex<Option<ApiResult<FileMetadata>>>,
}

#[async_trait]
impl StorageApi for MockStorageApi {
    async fn upload_file(&self, _request: UploadFileRequest) -> ApiResult<FileMetadata> {
        self.upload_result
            .lock()
            .take()
            .unwrap_or_else(|| Err(unexpected_call()))
    }

    async fn download_file(&self, _request: DownloadFileRequest) -> ApiResult<Vec<u8>> {
        Err(unexpected_call())
    }

    async fn delete_file(&self, _request: DeleteFileRequest) -> ApiResult<()> {
        Ok(())
    }
}

/// Scripted credential ceremony.
#[derive(Default)]
pub struct MockCeremony {
    /// Result of the next ceremony run.
    pub result: Mutex<Option<Result<CredentialAssertion, CeremonyError>>>,
    /// Number of ceremonies run.
    pub calls: AtomicUsize,
}

#[async_trait]
impl CeremonyProvider for MockCeremony {
    async fn authenticate(
        &self,
        _challenge: CeremonyChallenge,
    ) -> Result<CredentialAssertion, CeremonyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .lock()
            .take()
            .unwrap_or_else(|| Err(CeremonyError::Cancelled))
    }
}

/// A fully wired client over mock collaborators.
pub struct TestEnv {
    /// The mock authentication backend.
    pub auth: Arc<MockAuthApi>,
    /// The mock storage backend.
    pub storage: Arc<MockStorageApi>,
    /// The in-memory session store.
    pub store: Arc<MemorySessionStore>,
    /// The in-memory location.
    pub location: Arc<UrlLocation>,
    /// The scripted ceremony provider.
    pub ceremony: Arc<MockCeremony>,
    /// The client under test.
    pub client: Client,
}

impl TestEnv {
    /// Creates an environment with a clean location.
    pub fn new() -> Self {
        Self::with_location("https://app.example.com/")
    }

    /// Creates an environment whose location is the given URL.
    pub fn with_location(url: &str) -> Self {
        init_tracing();

        let auth = Arc::new(MockAuthApi::default());
        let storage = Arc::new(MockStorageApi::default());
        let store = Arc::new(MemorySessionStore::new());
        let location = Arc::new(UrlLocation::parse(url).expect("test URL parses"));
        let ceremony = Arc::new(MockCeremony::default());

        let client = Client::builder(Config::default())
            .auth(auth.clone())
            .storage(storage.clone())
            .session_store(store.clone())
            .location(location.clone())
            .ceremony(ceremony.clone())
            .build()
            .expect("client builds");

        Self {
            auth,
            storage,
            store,
            location,
            ceremony,
            client,
        }
    }

    /// The configured persisted-session key.
    pub fn storage_key(&self) -> String {
        self.client.config().session.storage_key.clone()
    }
}
