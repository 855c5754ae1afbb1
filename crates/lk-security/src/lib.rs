//! # lk-security
//!
//! Step-up elevation for the Latchkey client SDK.
//!
//! A session whose user has registered security keys must be elevated
//! (upgraded through a challenge/ceremony/verify protocol) before
//! privileged operations. The [`ElevationController`] owns that
//! decision and the protocol; the [`ElevatedInvoker`] wraps an
//! ordinary invoker so the check runs inside every call's lifecycle.
//!
//! ## NIST 800-53 Rev5 Controls
//!
//! - IA-11: Re-authentication before privileged operations
//! - IA-2(1): Multi-factor authentication via registered security keys

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod ceremony;
pub mod elevation;
pub mod invoke;

pub use ceremony::{CeremonyError, CeremonyProvider, UnsupportedCeremony};
pub use elevation::{ElevationController, ElevationError};
pub use invoke::ElevatedInvoker;
