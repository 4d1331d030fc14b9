//! One-shot settlement callbacks and the pending-value handle bundle.

use std::fmt;

/// Boxed one-shot settlement callback.
///
/// Created immediately before a wait (or inside a host combinator), invoked at
/// most once by the host when the value settles. `Send` when the target has
/// real threads; relaxed on single-threaded targets where host handles cannot
/// cross threads anyway.
#[cfg(not(target_arch = "wasm32"))]
pub type SettlementFn<V> = Box<dyn FnOnce(V) + Send + 'static>;

/// Boxed one-shot settlement callback (single-threaded targets).
#[cfg(target_arch = "wasm32")]
pub type SettlementFn<V> = Box<dyn FnOnce(V) + 'static>;

/// A one-shot callback registered with the host for one side of a settlement.
///
/// Invoking it consumes it, so any resources it holds are released after the
/// first invocation; dropping it unfired releases them on the early-return
/// path. There is no way to fire a `Settler` twice.
pub struct Settler<V> {
    deliver: SettlementFn<V>,
}

impl<V> Settler<V> {
    /// Wrap a callback for one-shot delivery.
    pub fn new(deliver: SettlementFn<V>) -> Self {
        Self { deliver }
    }

    /// Convenience constructor taking an unboxed closure.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_fn(deliver: impl FnOnce(V) + Send + 'static) -> Self {
        Self::new(Box::new(deliver))
    }

    /// Convenience constructor taking an unboxed closure.
    #[cfg(target_arch = "wasm32")]
    pub fn from_fn(deliver: impl FnOnce(V) + 'static) -> Self {
        Self::new(Box::new(deliver))
    }

    /// Deliver the settlement payload, consuming the callback.
    pub fn settle(self, value: V) {
        (self.deliver)(value)
    }
}

impl<V> fmt::Debug for Settler<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settler").finish_non_exhaustive()
    }
}

/// A freshly constructed pending value together with its settlement triggers.
///
/// Returned by [`PromiseHost::pending`](crate::PromiseHost::pending). Each
/// trigger fires the underlying host settlement mechanism exactly once;
/// whether a trigger fired after the value already settled is a no-op is
/// host-defined (for every host modeled here it is).
#[derive(Debug)]
pub struct PendingPromise<V> {
    /// The pending host value.
    pub promise: V,
    /// Fulfills the value with a result.
    pub resolve: Settler<V>,
    /// Rejects the value with a reason.
    pub reject: Settler<V>,
}
