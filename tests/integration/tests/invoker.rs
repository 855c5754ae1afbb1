//! Operation invoker integration tests over the client's per-family
//! factories.

use std::sync::Arc;

use parking_lot::Mutex;

use lk_api::auth::{AuthApi, SessionPayload, SignInEmailPasswordRequest};
use lk_api::storage::{FileMetadata, StorageApi, UploadFileRequest};
use lk_api::FetchError;
use lk_session::SessionStore;

use crate::common::{session, TestEnv};

fn sign_in_request() -> SignInEmailPasswordRequest {
    SignInEmailPasswordRequest {
        email: "jo@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

#[tokio::test]
async fn auth_invoker_success_flow() {
    let env = TestEnv::new();
    env.client.start().await;
    *env.auth.sign_in_result.lock() = Some(Ok(SessionPayload {
        session: Some(session("a")),
    }));

    let invoker = env
        .client
        .auth_invoker::<SignInEmailPasswordRequest, SessionPayload>();

    let seen: Arc<Mutex<Vec<SessionPayload>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_in_handler = Arc::clone(&seen);
    invoker.set_on_success(move |payload| {
        seen_in_handler.lock().push(payload.data.clone());
    });

    let outcome = invoker
        .call_async(
            |auth, params| async move { auth.sign_in_email_password(params).await },
            sign_in_request(),
        )
        .await;

    assert!(outcome.is_success());
    assert_eq!(
        outcome
            .data()
            .and_then(|payload| payload.session.as_ref())
            .map(|s| s.refresh_token_id.as_str()),
        Some("a")
    );
    assert_eq!(seen.lock().len(), 1);

    let state = invoker.state();
    assert!(!state.is_loading);
    assert!(state.is_success);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn auth_invoker_failure_returns_the_error_value() {
    let env = TestEnv::new();
    env.client.start().await;
    let rejection = FetchError::new(400, "bad_request");
    *env.auth.sign_in_result.lock() = Some(Err(rejection.clone()));

    let invoker = env
        .client
        .auth_invoker::<SignInEmailPasswordRequest, SessionPayload>();

    let seen: Arc<Mutex<Vec<FetchError>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_in_handler = Arc::clone(&seen);
    invoker.set_on_error(move |payload| {
        seen_in_handler.lock().push(payload.error.clone());
    });

    let outcome = invoker
        .call_async(
            |auth, params| async move { auth.sign_in_email_password(params).await },
            sign_in_request(),
        )
        .await;

    assert!(outcome.is_failure());
    assert_eq!(outcome.error(), Some(&rejection));
    assert_eq!(*seen.lock(), vec![rejection.clone()]);

    let state = invoker.state();
    assert!(!state.is_success);
    assert_eq!(state.error, Some(rejection));
}

#[tokio::test]
async fn sign_in_success_feeds_the_synchronizer_through_the_store() {
    let env = TestEnv::new();
    env.client.start().await;
    *env.auth.sign_in_result.lock() = Some(Ok(SessionPayload {
        session: Some(session("a")),
    }));

    let invoker = env
        .client
        .auth_invoker::<SignInEmailPasswordRequest, SessionPayload>();

    // The usual embedder wiring: persist the minted session, letting
    // the store-change channel update the authoritative tuple.
    let store = env.client.session_store();
    invoker.set_on_success(move |payload| {
        if let Some(session) = payload.data.session.clone() {
            store.write(session);
        }
    });

    let outcome = invoker
        .call_async(
            |auth, params| async move { auth.sign_in_email_password(params).await },
            sign_in_request(),
        )
        .await;

    assert!(outcome.is_success());
    let snapshot = env.client.synchronizer().snapshot();
    assert!(snapshot.is_authenticated);
    assert_eq!(
        snapshot.session.map(|s| s.refresh_token_id),
        Some("a".to_string())
    );
}

#[tokio::test]
async fn storage_invoker_uploads_through_the_storage_namespace() {
    let env = TestEnv::new();
    env.client.start().await;

    let metadata = FileMetadata {
        id: uuid::Uuid::now_v7(),
        name: "notes.txt".to_string(),
        size: 5,
        mime_type: "text/plain".to_string(),
        bucket_id: "default".to_string(),
        etag: None,
        created_at: None,
    };
    *env.storage.upload_result.lock() = Some(Ok(metadata.clone()));

    let invoker = env
        .client
        .storage_invoker::<UploadFileRequest, FileMetadata>();

    let outcome = invoker
        .call_async(
            |storage, params| async move { storage.upload_file(params).await },
            UploadFileRequest {
                file_name: "notes.txt".to_string(),
                content: b"hello".to_vec(),
                mime_type: "text/plain".to_string(),
                bucket_id: None,
            },
        )
        .await;

    assert_eq!(outcome.data(), Some(&metadata));
}
