//! # latchkey
//!
//! Client-side session synchronizer and authenticated-call SDK.
//!
//! A [`Client`] owns the session store, the synchronization state
//! machine, and the elevation controller over a typed backend.
//! Consumers read session state through a [`SessionHandle`] and invoke
//! backend operations through per-family invokers that track each
//! call's lifecycle.
//!
//! ```no_run
//! use latchkey::{Client, Config};
//!
//! # async fn run() -> latchkey::Result<()> {
//! let client = Client::new(Config::default())?;
//! client.start().await;
//!
//! let handle = client.handle();
//! let context = handle.current()?;
//! if context.is_authenticated {
//!     context.sign_out().await;
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod client;
pub mod context;

pub use client::{Client, ClientBuilder};
pub use context::{SessionContext, SessionHandle};

pub use lk_api::{
    ApiResult, AuthApi, ErrorResponse, FetchError, HttpAuthApi, HttpStorageApi, StorageApi,
    TokenSource,
};
pub use lk_core::{Config, Error, Result};
pub use lk_invoke::{CallOutcome, CallState, Invoker};
pub use lk_model::{DecodedToken, SecurityKey, Session, User};
pub use lk_security::{
    CeremonyError, CeremonyProvider, ElevatedInvoker, ElevationController, ElevationError,
    UnsupportedCeremony,
};
pub use lk_session::{
    AuthSnapshot, Location, MemorySessionStore, SessionStore, SessionSync, Subscription,
    SyncError, UrlLocation,
};
