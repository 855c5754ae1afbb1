//! Step-up elevation integration tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lk_api::auth::{AuthApi, SessionPayload, SignInEmailPasswordRequest};
use lk_model::SecurityKey;
use lk_security::CeremonyError;
use lk_session::SessionStore;

use crate::common::{assertion, elevated_session, session, TestEnv};

async fn signed_in_env_with_keys() -> TestEnv {
    let env = TestEnv::new();
    env.store.write(session("a"));
    *env.auth.keys_result.lock() = Ok(vec![SecurityKey::new(uuid::Uuid::now_v7(), "work yubikey")]);
    env.client.start().await;
    env
}

#[tokio::test]
async fn ceremony_failure_rejects_without_touching_the_store() {
    let env = signed_in_env_with_keys().await;
    *env.ceremony.result.lock() = Some(Err(CeremonyError::Cancelled));

    let before = env.store.read();
    let error = env
        .client
        .elevation()
        .check_elevation()
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "Could not elevate permissions");
    assert_eq!(env.store.read(), before);
    assert_eq!(env.auth.verify_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn verify_response_without_a_session_fails_distinctly() {
    let env = signed_in_env_with_keys().await;
    *env.ceremony.result.lock() = Some(Ok(assertion()));
    *env.auth.verify_result.lock() = Some(Ok(SessionPayload { session: None }));

    let error = env
        .client
        .elevation()
        .check_elevation()
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "Failed to get elevated session");
    assert_eq!(
        env.store.read().map(|s| s.refresh_token_id),
        Some("a".to_string())
    );
}

#[tokio::test]
async fn successful_elevation_reaches_the_snapshot_through_the_store() {
    let env = signed_in_env_with_keys().await;
    *env.ceremony.result.lock() = Some(Ok(assertion()));
    *env.auth.verify_result.lock() = Some(Ok(SessionPayload {
        session: Some(elevated_session("b")),
    }));

    assert!(env.client.elevation().requires_elevation());
    env.client
        .elevation()
        .check_elevation()
        .await
        .expect("elevation succeeds");

    // The verified session was written to the store, which drove the
    // synchronizer's reconciliation.
    let snapshot = env.client.synchronizer().snapshot();
    assert!(snapshot.is_authenticated);
    assert_eq!(
        snapshot.session.as_ref().map(|s| s.refresh_token_id.as_str()),
        Some("b")
    );
    assert!(snapshot.session.is_some_and(|s| s.is_elevated()));
    assert!(!env.client.elevation().requires_elevation());
}

#[tokio::test]
async fn requires_elevation_is_false_with_an_empty_key_set() {
    let env = TestEnv::new();
    env.store.write(session("a"));
    env.client.start().await;

    assert!(!env.client.elevation().is_elevated());
    assert!(!env.client.elevation().requires_elevation());
}

#[tokio::test]
async fn elevated_invoker_surfaces_elevation_failure_as_an_operation_error() {
    let env = signed_in_env_with_keys().await;
    *env.ceremony.result.lock() = Some(Err(CeremonyError::Cancelled));

    let invoker = env
        .client
        .elevated_auth_invoker::<SignInEmailPasswordRequest, SessionPayload>();

    let operation_ran = Arc::new(AtomicBool::new(false));
    let operation_ran_inner = Arc::clone(&operation_ran);
    let outcome = invoker
        .call_async(
            move |auth, params| {
                let operation_ran = operation_ran_inner;
                async move {
                    operation_ran.store(true, Ordering::SeqCst);
                    auth.sign_in_email_password(params).await
                }
            },
            SignInEmailPasswordRequest {
                email: "jo@example.com".to_string(),
                password: "hunter2".to_string(),
            },
        )
        .await;

    assert!(outcome.is_failure());
    let error = outcome.error().unwrap();
    assert_eq!(error.body.error, "elevation_failed");
    assert_eq!(
        error.body.message.as_deref(),
        Some("Could not elevate permissions")
    );
    assert!(!operation_ran.load(Ordering::SeqCst));

    let state = invoker.state();
    assert!(!state.is_success);
    assert!(state.error.is_some());
}

#[tokio::test]
async fn elevated_invoker_calls_straight_through_when_not_required() {
    let env = TestEnv::new();
    env.store.write(session("a"));
    env.client.start().await;
    *env.auth.sign_in_result.lock() = Some(Ok(SessionPayload {
        session: Some(session("b")),
    }));

    let invoker = env
        .client
        .elevated_auth_invoker::<SignInEmailPasswordRequest, SessionPayload>();

    let outcome = invoker
        .call_async(
            |auth, params| async move { auth.sign_in_email_password(params).await },
            SignInEmailPasswordRequest {
                email: "jo@example.com".to_string(),
                password: "hunter2".to_string(),
            },
        )
        .await;

    assert!(outcome.is_success());
    assert_eq!(env.ceremony.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn key_fetch_failure_is_swallowed_and_keeps_the_previous_set() {
    let env = TestEnv::new();
    env.store.write(session("a"));
    *env.auth.keys_result.lock() = Ok(vec![SecurityKey::new(uuid::Uuid::now_v7(), "work yubikey")]);
    env.client.start().await;
    assert!(env.client.elevation().has_security_keys());

    *env.auth.keys_result.lock() = Err(lk_api::FetchError::new(503, "unavailable"));
    env.client.elevation().refresh_security_keys().await;

    assert!(env.client.elevation().has_security_keys());
}
