//! Per-input settlement outcomes for the collect-all-outcomes combinator.

use host_traits::PromiseHost;

use crate::error::Reason;

/// The terminal state of one input, reported without short-circuiting.
pub enum Outcome<H: PromiseHost> {
    /// The input fulfilled with a value.
    Fulfilled(H::Value),
    /// The input rejected with a reason.
    Rejected(Reason<H>),
}

impl<H: PromiseHost> Outcome<H> {
    /// Whether this input fulfilled.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    /// Whether this input rejected.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// The fulfillment value, if this input fulfilled.
    pub fn value(&self) -> Option<&H::Value> {
        match self {
            Self::Fulfilled(value) => Some(value),
            Self::Rejected(_) => None,
        }
    }

    /// The rejection reason, if this input rejected.
    pub fn reason(&self) -> Option<&Reason<H>> {
        match self {
            Self::Fulfilled(_) => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

impl<H: PromiseHost> Clone for Outcome<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Fulfilled(value) => Self::Fulfilled(value.clone()),
            Self::Rejected(reason) => Self::Rejected(reason.clone()),
        }
    }
}

impl<H: PromiseHost> std::fmt::Debug for Outcome<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fulfilled(value) => f.debug_tuple("Fulfilled").field(value).finish(),
            Self::Rejected(reason) => f.debug_tuple("Rejected").field(reason).finish(),
        }
    }
}
