//! # lk-core
//!
//! Core utilities, configuration, and error handling for the Latchkey
//! client SDK.
//!
//! This crate provides foundational types used across all other
//! Latchkey crates.
//!
//! ## NIST 800-53 Rev5 Controls
//!
//! - AU-2: Event logging framework
//! - SI-11: Error handling

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::Config;
pub use error::{Error, Result};
