//! HTTP implementations of the backend client traits.
//!
//! Transport-level failures never produce a structured backend error
//! body, so they normalize to a [`FetchError`] with status 0 and the
//! `network_error` code.

use std::sync::Arc;

use reqwest::multipart;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use lk_model::{SecurityKey, Session};

use crate::auth::{
    AuthApi, CeremonyChallenge, RefreshTokenRequest, SessionPayload, SignInEmailPasswordRequest,
    SignOutRequest, SignUpEmailPasswordRequest, TokenSource, VerifyElevateRequest,
};
use crate::error::{ApiResult, ErrorResponse, FetchError};
use crate::storage::{
    DeleteFileRequest, DownloadFileRequest, FileMetadata, StorageApi, UploadFileRequest,
};

/// HTTP implementation of [`AuthApi`].
pub struct HttpAuthApi {
    base_url: Url,
    http: reqwest::Client,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl HttpAuthApi {
    /// Creates a client against the given base URL.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Creates a client reusing an existing `reqwest` client.
    #[must_use]
    pub fn with_client(base_url: Url, http: reqwest::Client) -> Self {
        Self {
            base_url,
            http,
            tokens: None,
        }
    }

    /// Attaches the source of bearer credentials for authorized calls.
    #[must_use]
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = endpoint(&self.base_url, path)?;
        let request = authorize(self.http.post(url).json(body), self.tokens.as_deref());
        let response = request
            .send()
            .await
            .map_err(|err| FetchError::network(err.to_string()))?;
        read_json(response).await
    }

    async fn get_json<R>(&self, path: &str) -> ApiResult<R>
    where
        R: DeserializeOwned,
    {
        let url = endpoint(&self.base_url, path)?;
        let request = authorize(self.http.get(url), self.tokens.as_deref());
        let response = request
            .send()
            .await
            .map_err(|err| FetchError::network(err.to_string()))?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthApi {
    async fn sign_up_email_password(
        &self,
        request: SignUpEmailPasswordRequest,
    ) -> ApiResult<SessionPayload> {
        let payload: SessionPayload = self.post_json("signup/email-password", &request).await?;
        Ok(decode_payload(payload))
    }

    async fn sign_in_email_password(
        &self,
        request: SignInEmailPasswordRequest,
    ) -> ApiResult<SessionPayload> {
        let payload: SessionPayload = self.post_json("signin/email-password", &request).await?;
        Ok(decode_payload(payload))
    }

    async fn sign_out(&self, request: SignOutRequest) -> ApiResult<()> {
        let url = endpoint(&self.base_url, "signout")?;
        let builder = authorize(self.http.post(url).json(&request), self.tokens.as_deref());
        let response = builder
            .send()
            .await
            .map_err(|err| FetchError::network(err.to_string()))?;
        read_unit(response).await
    }

    async fn refresh_token(&self, request: RefreshTokenRequest) -> ApiResult<Session> {
        let session: Session = self.post_json("token", &request).await?;
        Ok(session.with_decoded_token())
    }

    async fn elevate_webauthn(&self) -> ApiResult<CeremonyChallenge> {
        self.post_json("elevate/webauthn", &serde_json::json!({}))
            .await
    }

    async fn verify_elevate_webauthn(
        &self,
        request: VerifyElevateRequest,
    ) -> ApiResult<SessionPayload> {
        let payload: SessionPayload = self.post_json("elevate/webauthn/verify", &request).await?;
        Ok(decode_payload(payload))
    }

    async fn security_keys(&self, user_id: Uuid) -> ApiResult<Vec<SecurityKey>> {
        self.get_json(&format!("users/{user_id}/security-keys"))
            .await
    }
}

/// HTTP implementation of [`StorageApi`].
pub struct HttpStorageApi {
    base_url: Url,
    http: reqwest::Client,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl HttpStorageApi {
    /// Creates a client against the given base URL.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Creates a client reusing an existing `reqwest` client.
    #[must_use]
    pub fn with_client(base_url: Url, http: reqwest::Client) -> Self {
        Self {
            base_url,
            http,
            tokens: None,
        }
    }

    /// Attaches the source of bearer credentials for authorized calls.
    #[must_use]
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }
}

#[async_trait::async_trait]
impl StorageApi for HttpStorageApi {
    async fn upload_file(&self, request: UploadFileRequest) -> ApiResult<FileMetadata> {
        let url = endpoint(&self.base_url, "files")?;

        let part = multipart::Part::bytes(request.content)
            .file_name(request.file_name)
            .mime_str(&request.mime_type)
            .map_err(|err| FetchError::network(err.to_string()))?;
        let mut form = multipart::Form::new().part("file", part);
        if let Some(bucket_id) = request.bucket_id {
            form = form.text("bucketId", bucket_id);
        }

        let builder = authorize(self.http.post(url).multipart(form), self.tokens.as_deref());
        let response = builder
            .send()
            .await
            .map_err(|err| FetchError::network(err.to_string()))?;
        read_json(response).await
    }

    async fn download_file(&self, request: DownloadFileRequest) -> ApiResult<Vec<u8>> {
        let url = endpoint(&self.base_url, &format!("files/{}", request.file_id))?;
        let builder = authorize(self.http.get(url), self.tokens.as_deref());
        let response = builder
            .send()
            .await
            .map_err(|err| FetchError::network(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let bytes = response
                .bytes()
                .await
                .map_err(|err| FetchError::network(err.to_string()))?;
            Ok(bytes.to_vec())
        } else {
            Err(read_error(status, response).await)
        }
    }

    async fn delete_file(&self, request: DeleteFileRequest) -> ApiResult<()> {
        let url = endpoint(&self.base_url, &format!("files/{}", request.file_id))?;
        let builder = authorize(self.http.delete(url), self.tokens.as_deref());
        let response = builder
            .send()
            .await
            .map_err(|err| FetchError::network(err.to_string()))?;
        read_unit(response).await
    }
}

/// Joins a relative operation path onto the base URL.
fn endpoint(base_url: &Url, path: &str) -> ApiResult<Url> {
    let mut url = base_url.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| FetchError::network("backend base URL cannot be a base"))?;
        segments.pop_if_empty();
        for segment in path.split('/') {
            segments.push(segment);
        }
    }
    Ok(url)
}

/// Attaches the current bearer credential when one exists.
fn authorize(
    builder: reqwest::RequestBuilder,
    tokens: Option<&dyn TokenSource>,
) -> reqwest::RequestBuilder {
    match tokens.and_then(TokenSource::access_token) {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

/// Decodes access-token claims on any session in the payload.
fn decode_payload(payload: SessionPayload) -> SessionPayload {
    SessionPayload {
        session: payload.session.map(Session::with_decoded_token),
    }
}

async fn read_json<R>(response: Response) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    let status = response.status();
    if status.is_success() {
        response
            .json()
            .await
            .map_err(|err| FetchError::network(err.to_string()))
    } else {
        Err(read_error(status, response).await)
    }
}

async fn read_unit(response: Response) -> ApiResult<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(read_error(status, response).await)
    }
}

async fn read_error(status: StatusCode, response: Response) -> FetchError {
    let code = status.as_u16();
    match response.json::<ErrorResponse>().await {
        Ok(body) => FetchError { status: code, body },
        Err(_) => FetchError::new(code, status.canonical_reason().unwrap_or("request_failed")),
    }
}
