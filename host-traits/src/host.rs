//! The host runtime capability contract.
//!
//! The core never reaches into a global host registry; everything it needs
//! from the host runtime is expressed here and injected at construction time,
//! which also makes the contract implementable by test doubles.

use std::fmt;

use crate::platform::PlatformSendSync;
use crate::settle::{PendingPromise, Settler};

/// Status tag of a fulfilled record in a collect-all-outcomes aggregate.
pub const STATUS_FULFILLED: &str = "fulfilled";

/// Status tag of a rejected record in a collect-all-outcomes aggregate.
pub const STATUS_REJECTED: &str = "rejected";

/// An opaque, cloneable handle to a host-owned value.
///
/// The host owns the value and its state transitions; the embedded side only
/// holds references and attaches callbacks. Cloning a handle never clones the
/// underlying host object.
pub trait HostValue: Clone + fmt::Debug + PlatformSendSync + 'static {}

impl<T> HostValue for T where T: Clone + fmt::Debug + PlatformSendSync + 'static {}

/// Capabilities a host runtime must provide for the promise bridge.
///
/// A host's asynchronous primitive is callback-driven and single-settlement: a
/// value starts pending and transitions exactly once to fulfilled or rejected,
/// after which it never changes again. Callbacks for a given value fire on the
/// host's own event-processing turn, never concurrently with each other.
///
/// Implementations exist per host runtime (an in-process engine ships in
/// `host-inproc`; a JS engine embedding would implement this over its FFI
/// layer). Registration methods must not block; the blocking happens on the
/// embedded side.
pub trait PromiseHost: PlatformSendSync + 'static {
    /// Opaque handle type for host-side values.
    type Value: HostValue;

    /// Whether the handle exposes a callable settlement-registration surface.
    ///
    /// This is the only way to distinguish an asynchronous value from an
    /// ordinary one; there is no static type tag on the host side.
    fn is_thenable(&self, value: &Self::Value) -> bool;

    /// Register one-shot fulfillment and rejection callbacks on a thenable.
    ///
    /// The host guarantees exactly one of the two fires, at most once. The
    /// unfired callback must be released when the pair is discarded.
    fn on_settle(
        &self,
        value: &Self::Value,
        on_fulfilled: Settler<Self::Value>,
        on_rejected: Settler<Self::Value>,
    );

    /// Allocate a pending value plus externally invokable settlement triggers.
    fn pending(&self) -> PendingPromise<Self::Value>;

    /// Synchronously produce a value already fulfilled with `value`.
    fn resolved(&self, value: Self::Value) -> Self::Value;

    /// Synchronously produce a value already rejected with `reason`.
    fn rejected(&self, reason: Self::Value) -> Self::Value;

    /// Native fail-fast combinator over an ordered collection.
    fn all(&self, values: &[Self::Value]) -> Self::Value;

    /// Native collect-all-outcomes combinator; the aggregate never rejects.
    fn all_settled(&self, values: &[Self::Value]) -> Self::Value;

    /// Native first-fulfillment combinator; rejects with an aggregate-shaped
    /// reason only when every input rejects.
    fn any(&self, values: &[Self::Value]) -> Self::Value;

    /// Native first-settlement combinator, in either direction.
    fn race(&self, values: &[Self::Value]) -> Self::Value;

    /// The host's undefined/unit value.
    fn undefined(&self) -> Self::Value;

    /// Element `index` of an array-shaped value, `None` when out of range or
    /// not an array.
    fn element(&self, value: &Self::Value, index: usize) -> Option<Self::Value>;

    /// Property `key` of an object-shaped value, `None` when absent.
    fn member(&self, value: &Self::Value, key: &str) -> Option<Self::Value>;

    /// The string-typed `message` field of a structured error object, `None`
    /// for anything else (including structured objects whose `message` is not
    /// a string).
    fn error_message(&self, value: &Self::Value) -> Option<String>;

    /// The host's generic string coercion of a value.
    fn coerce_string(&self, value: &Self::Value) -> String;

    /// The nested error list of an aggregate-shaped error value, in the
    /// host's stored order; `None` when the value does not have that shape.
    fn aggregate_errors(&self, value: &Self::Value) -> Option<Vec<Self::Value>>;
}
