//! # In-Process Host Runtime
//!
//! Reference implementation of the host capability contract for native
//! targets.
//!
//! ## Overview
//!
//! A real deployment pairs the bridge with an engine embedding that owns the
//! asynchronous values. This crate supplies the same contract in-process: a
//! JS-like value model, a promise registry with single-settlement slots, one
//! dispatch thread running every callback in FIFO order, and the four native
//! combinators with their standard edge cases (empty fail-fast and
//! collect-all inputs fulfill with an empty array, empty first-fulfillment
//! rejects with an empty aggregate, empty first-settlement stays pending
//! forever).
//!
//! That makes the whole bridge exercisable natively, and gives downstream
//! code a drop-in test double.
//!
//! ## Examples
//!
//! ```
//! use host_traits::PromiseHost;
//! use host_inproc::{InprocHost, Value};
//!
//! let host = InprocHost::new();
//! let promise = host.resolved(Value::from(42));
//! assert!(host.is_thenable(&promise));
//! ```

mod combine;
mod engine;
mod host;
mod value;

pub use host::InprocHost;
pub use value::{ErrorValue, PromiseId, Value, AGGREGATE_ERROR_NAME};
