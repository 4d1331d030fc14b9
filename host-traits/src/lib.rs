//! # Host Runtime Capability Traits
//!
//! Contract between the promise bridge core and the host runtime that owns
//! the asynchronous values being awaited.
//!
//! ## Overview
//!
//! This crate defines the capabilities the core requires but that must be
//! implemented differently per host runtime: testing whether a handle is
//! awaitable, registering one-shot settlement callbacks, constructing pending
//! or already-settled values, the host's native combinator entry points, and
//! the value introspection needed by the error model.
//!
//! The core takes a [`PromiseHost`] implementation at construction time
//! instead of reaching a global host singleton; any environment that can
//! satisfy the trait (a real engine embedding or an in-process test double)
//! plugs in without changes to the core.
//!
//! ## Thread Safety
//!
//! Trait bounds are conditional on the target: `Send + Sync` where the
//! embedded side has real threads, relaxed on single-threaded targets. See
//! [`platform`].

pub mod host;
pub mod platform;
pub mod settle;

pub use host::{HostValue, PromiseHost, STATUS_FULFILLED, STATUS_REJECTED};
pub use platform::{PlatformSend, PlatformSendSync};
pub use settle::{PendingPromise, SettlementFn, Settler};
