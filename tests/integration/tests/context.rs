//! Context distribution integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lk_core::Error;
use lk_session::SessionStore;

use crate::common::{session, TestEnv};

#[tokio::test]
async fn context_mirrors_the_snapshot() {
    let env = TestEnv::new();
    env.store.write(session("a"));
    env.client.start().await;

    let context = env.client.handle().current().expect("provider is alive");

    assert!(context.is_authenticated);
    assert!(!context.is_loading);
    assert_eq!(context.user_id, context.user.as_ref().map(|user| user.id));
    assert_eq!(
        context.session.as_ref().map(|s| s.refresh_token_id.as_str()),
        Some("a")
    );
    assert!(context
        .client()
        .user_session()
        .is_some_and(|s| s.refresh_token_id == "a"));
}

#[tokio::test]
async fn handle_fails_loudly_outside_the_provider_scope() {
    let handle = {
        let env = TestEnv::new();
        env.client.handle()
        // client (and every other strong reference) dropped here
    };

    let error = handle.current().unwrap_err();
    assert!(matches!(error, Error::OutsideProviderScope));
    assert!(handle.subscribe(Box::new(|_| {})).is_err());
}

#[tokio::test]
async fn subscribers_are_notified_only_on_actual_change() {
    let env = TestEnv::new();
    env.client.start().await;

    let notifications = Arc::new(AtomicUsize::new(0));
    let notifications_in_handler = Arc::clone(&notifications);
    let _subscription = env
        .client
        .handle()
        .subscribe(Box::new(move |_| {
            notifications_in_handler.fetch_add(1, Ordering::SeqCst);
        }))
        .expect("provider is alive");

    env.store.write(session("a"));
    env.store.write(session("a"));
    env.store.write(session("b"));

    assert_eq!(notifications.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn sign_out_through_the_context_clears_the_session() {
    let env = TestEnv::new();
    env.store.write(session("a"));
    env.client.start().await;

    let context = env.client.handle().current().expect("provider is alive");
    context.sign_out().await;

    let after = env.client.handle().current().expect("provider is alive");
    assert!(!after.is_authenticated);
    assert!(after.user.is_none());
    assert_ne!(context, after);
}
