//! # lk-invoke
//!
//! Backend operation invoker for the Latchkey client SDK.
//!
//! An [`Invoker`] calls one family of asynchronous backend operations
//! while tracking a three-state lifecycle (idle/loading, then success
//! or error) and delivering outcomes to caller-supplied callbacks held
//! in single-slot, latest-wins cells. Reconfiguring a callback never
//! re-arms anything, and the handler current at settlement time is the
//! one invoked.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod callback;
pub mod invoker;
pub mod state;

pub use callback::CallbackCell;
pub use invoker::{CallOutcome, ErrorPayload, Invoker, SuccessPayload};
pub use state::CallState;
