//! Typed wrappers that carry host rejection values through the embedded
//! error-handling path while staying convertible back to the host form.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use host_traits::PromiseHost;
use thiserror::Error;

/// A host value a promise was rejected with.
///
/// Satisfies the embedded error contract: the message is the value's
/// string-typed `message` field when it is a structured error object, and the
/// host's generic string coercion otherwise, since rejection values are
/// frequently plain strings rather than structured errors.
pub struct Reason<H: PromiseHost> {
    host: Arc<H>,
    value: H::Value,
}

impl<H: PromiseHost> Reason<H> {
    pub(crate) fn new(host: Arc<H>, value: H::Value) -> Self {
        Self { host, value }
    }

    /// The wrapped host value.
    pub fn as_value(&self) -> &H::Value {
        &self.value
    }

    /// Convert back to the host representation.
    pub fn into_value(self) -> H::Value {
        self.value
    }
}

impl<H: PromiseHost> Clone for Reason<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            value: self.value.clone(),
        }
    }
}

impl<H: PromiseHost> fmt::Debug for Reason<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reason").field(&self.value).finish()
    }
}

impl<H: PromiseHost> fmt::Display for Reason<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.host.error_message(&self.value) {
            Some(message) => f.write_str(&message),
            None => f.write_str(&self.host.coerce_string(&self.value)),
        }
    }
}

impl<H: PromiseHost> StdError for Reason<H> {}

/// A host aggregate error wrapping several rejection reasons in one error.
///
/// Surfaced only by the first-fulfillment combinator, when every input
/// rejects.
pub struct AggregateError<H: PromiseHost> {
    host: Arc<H>,
    value: H::Value,
}

impl<H: PromiseHost> AggregateError<H> {
    /// Wrap a rejection after verifying it actually has the host's aggregate
    /// shape; hands the reason back unchanged when it does not.
    pub(crate) fn try_from_reason(reason: Reason<H>) -> Result<Self, Reason<H>> {
        if reason.host.aggregate_errors(&reason.value).is_some() {
            Ok(Self {
                host: reason.host,
                value: reason.value,
            })
        } else {
            Err(reason)
        }
    }

    /// The per-input rejection reasons, reconstructed from the host aggregate
    /// on each call, in original input order.
    pub fn errors(&self) -> Vec<Reason<H>> {
        self.host
            .aggregate_errors(&self.value)
            .unwrap_or_default()
            .into_iter()
            .map(|value| Reason::new(Arc::clone(&self.host), value))
            .collect()
    }

    /// The wrapped host value.
    pub fn as_value(&self) -> &H::Value {
        &self.value
    }

    /// Convert back to the host representation.
    pub fn into_value(self) -> H::Value {
        self.value
    }
}

impl<H: PromiseHost> Clone for AggregateError<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            value: self.value.clone(),
        }
    }
}

impl<H: PromiseHost> fmt::Debug for AggregateError<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AggregateError").field(&self.value).finish()
    }
}

impl<H: PromiseHost> fmt::Display for AggregateError<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The host's own string form for its aggregate error object.
        match self.host.error_message(&self.value) {
            Some(message) => f.write_str(&message),
            None => f.write_str(&self.host.coerce_string(&self.value)),
        }
    }
}

impl<H: PromiseHost> StdError for AggregateError<H> {}

/// Rejection surfaced by the first-fulfillment combinator.
///
/// The native combinator rejects with an aggregate-shaped reason when every
/// input rejects; that shape is verified rather than assumed, so a host that
/// rejects the aggregate with something else surfaces as [`AnyError::Rejection`]
/// instead of a silent wrong-type cast.
#[derive(Error)]
pub enum AnyError<H: PromiseHost> {
    /// Every input rejected; one reason per input, in original input order.
    #[error(transparent)]
    Aggregate(AggregateError<H>),
    /// The aggregate rejected with a value that is not aggregate-shaped.
    #[error(transparent)]
    Rejection(Reason<H>),
}

impl<H: PromiseHost> AnyError<H> {
    /// The wrapped host value, whichever shape it has.
    pub fn as_value(&self) -> &H::Value {
        match self {
            Self::Aggregate(aggregate) => aggregate.as_value(),
            Self::Rejection(reason) => reason.as_value(),
        }
    }

    /// Convert back to the host representation.
    pub fn into_value(self) -> H::Value {
        match self {
            Self::Aggregate(aggregate) => aggregate.into_value(),
            Self::Rejection(reason) => reason.into_value(),
        }
    }
}

impl<H: PromiseHost> fmt::Debug for AnyError<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggregate(aggregate) => f.debug_tuple("Aggregate").field(aggregate).finish(),
            Self::Rejection(reason) => f.debug_tuple("Rejection").field(reason).finish(),
        }
    }
}
