//! # lk-model
//!
//! Domain models for the Latchkey client SDK.
//!
//! This crate defines the session record, the user identity attached
//! to it, the decoded access-token claims, and registered security
//! keys. Models are wire-compatible with the backend (camelCase JSON).

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod claims;
pub mod security_key;
pub mod session;
pub mod user;

pub use claims::{decode_access_token, DecodedToken};
pub use security_key::SecurityKey;
pub use session::Session;
pub use user::User;
