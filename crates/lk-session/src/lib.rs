//! # lk-session
//!
//! Session persistence and synchronization for the Latchkey client
//! SDK.
//!
//! The [`SessionStore`] owns the single persisted session record and
//! notifies subscribers of changes. The [`SessionSync`] state machine
//! reconciles the authoritative in-memory view with the store across
//! every signal source (store writes, cross-context broadcasts,
//! regained visibility and focus), deduplicating redundant passes by
//! refresh-token id.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod error;
pub mod location;
pub mod reconcile;
pub mod store;
pub mod subscription;
pub mod synchronizer;

pub use error::{SyncError, SyncResult};
pub use location::{Location, UrlLocation};
pub use reconcile::{reconcile, AuthSnapshot, Reconciled};
pub use store::{MemorySessionStore, SessionStore, StoreTokenSource};
pub use subscription::Subscription;
pub use synchronizer::{SessionSync, SnapshotHandler};
