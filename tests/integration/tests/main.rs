//! End-to-end integration tests.
//!
//! These tests drive a full client (mock backend, in-memory store,
//! scripted ceremony) through the session lifecycle: startup
//! redemption, reconciliation from every trigger, operation
//! invocation, and step-up elevation.

mod common;
mod context;
mod elevation;
mod invoker;
