//! # lk-api
//!
//! Typed backend client interface for the Latchkey client SDK.
//!
//! The backend exposes two operation namespaces, authentication and
//! storage, consumed through the [`AuthApi`] and [`StorageApi`]
//! traits. Every operation takes one request object and either returns
//! its result or fails with the structured [`FetchError`]. HTTP
//! implementations over `reqwest` are provided; tests and embedders
//! may substitute their own.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod auth;
pub mod error;
pub mod http;
pub mod storage;

pub use auth::{AuthApi, TokenSource};
pub use error::{ApiResult, ErrorResponse, FetchError};
pub use http::{HttpAuthApi, HttpStorageApi};
pub use storage::StorageApi;
