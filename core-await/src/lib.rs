//! Blocking interop with a host runtime's single-settlement asynchronous
//! values.
//!
//! The host's asynchronous primitive is callback-driven: a value starts
//! pending and transitions exactly once to fulfilled or rejected. Embedded
//! code, by contrast, runs on threads that can block. This crate is the
//! adapter between the two models: it converts a one-time host callback
//! invocation into an event a blocking wait can consume, without losing
//! settlements or leaking callback registrations. On top of that sit the
//! four combination policies (fail-fast, collect-all-outcomes,
//! first-fulfillment, first-settlement) and the typed error model for
//! carrying host rejection values through embedded error handling.
//!
//! The host is injected as a [`host_traits::PromiseHost`] implementation;
//! nothing here reaches a global runtime. Combinators delegate to the host's
//! native combinator entry points, so settlement ordering and concurrency
//! stay exactly what the host guarantees.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use core_await::PromiseBridge;
//! use host_inproc::{InprocHost, Value};
//! use host_traits::PendingPromise;
//!
//! let bridge = PromiseBridge::new(Arc::new(InprocHost::new()));
//!
//! let PendingPromise { promise, resolve, .. } = bridge.pending();
//! thread::spawn(move || resolve.settle(Value::from("done")));
//!
//! assert_eq!(bridge.wait(promise).unwrap(), Value::from("done"));
//! ```

pub mod bridge;
pub mod error;
pub mod outcome;
mod settle;

pub use bridge::PromiseBridge;
pub use error::{AggregateError, AnyError, Reason};
pub use outcome::Outcome;
