//! Blocking await and the combinator surface over an injected host runtime.

use std::sync::Arc;

use host_traits::{PendingPromise, PromiseHost, STATUS_FULFILLED};
use tracing::{error, trace, warn};

use crate::error::{AggregateError, AnyError, Reason};
use crate::outcome::Outcome;
use crate::settle::{subscribe, Settlement};

/// Entry point for embedded code: blocking await plus the combination
/// policies, bound to one injected host runtime.
///
/// Cloning is cheap and shares the host handle.
pub struct PromiseBridge<H: PromiseHost> {
    host: Arc<H>,
}

impl<H: PromiseHost> Clone for PromiseBridge<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
        }
    }
}

impl<H: PromiseHost> std::fmt::Debug for PromiseBridge<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromiseBridge").finish_non_exhaustive()
    }
}

impl<H: PromiseHost> PromiseBridge<H> {
    /// Bind the bridge to a host runtime.
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    /// The injected host runtime.
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Block the calling thread until `value` settles.
    ///
    /// A non-thenable input is returned unchanged with no error, mirroring
    /// `await` on a plain value. Blocking is unbounded: settlement is the only
    /// way out, and cancellation is unsupported. Must not be called from the
    /// host's own event-dispatch thread; the settlement that would wake the
    /// wait could then never run.
    pub fn wait(&self, value: H::Value) -> Result<H::Value, Reason<H>> {
        if !self.host.is_thenable(&value) {
            return Ok(value);
        }

        trace!("blocking on host value settlement");
        let rx = subscribe(self.host.as_ref(), &value);
        match rx.blocking_recv() {
            Ok(Settlement::Fulfilled(result)) => Ok(result),
            Ok(Settlement::Rejected(reason)) => Err(self.reason(reason)),
            Err(_) => {
                // The host dropped both callbacks without firing either,
                // which the single-settlement contract forbids (e.g. the
                // host was torn down mid-wait). Report a rejection instead
                // of hanging or panicking.
                error!("host released settlement callbacks without settling");
                Err(self.reason(self.host.undefined()))
            }
        }
    }

    /// Allocate a pending host value together with its settlement triggers.
    pub fn pending(&self) -> PendingPromise<H::Value> {
        self.host.pending()
    }

    /// An already-fulfilled host value. No blocking occurs.
    pub fn resolved(&self, value: H::Value) -> H::Value {
        self.host.resolved(value)
    }

    /// An already-rejected host value. No blocking occurs.
    pub fn rejected(&self, reason: H::Value) -> H::Value {
        self.host.rejected(reason)
    }

    /// Wait for every input to fulfill; fail fast on the first rejection.
    ///
    /// On success the fulfillment values come back in input order. On failure
    /// the reason is whichever rejection settled first, which the host
    /// decides; it is not necessarily the first by index.
    pub fn all(&self, values: &[H::Value]) -> Result<Vec<H::Value>, Reason<H>> {
        let aggregate = self.wait(self.host.all(values))?;
        Ok(self.elements(&aggregate, values.len()))
    }

    /// Wait for every input to settle and report each terminal outcome, in
    /// input order.
    ///
    /// Never fails: the native aggregate cannot reject, so there is no error
    /// channel here at all.
    pub fn all_settled(&self, values: &[H::Value]) -> Vec<Outcome<H>> {
        let aggregate = match self.wait(self.host.all_settled(values)) {
            Ok(aggregate) => aggregate,
            Err(reason) => {
                // Unreachable with a contract-abiding host.
                error!(reason = %reason, "collect-all-outcomes aggregate rejected");
                return Vec::new();
            }
        };
        (0..values.len())
            .map(|index| self.decode_outcome(&aggregate, index))
            .collect()
    }

    /// Wait for the first input to fulfill, in settlement order.
    ///
    /// Fails only when every input rejects; the aggregate then carries one
    /// reason per input in original input order, not settlement order.
    pub fn any(&self, values: &[H::Value]) -> Result<H::Value, AnyError<H>> {
        match self.wait(self.host.any(values)) {
            Ok(result) => Ok(result),
            Err(reason) => match AggregateError::try_from_reason(reason) {
                Ok(aggregate) => Err(AnyError::Aggregate(aggregate)),
                Err(other) => {
                    warn!("native first-fulfillment aggregate rejected with a non-aggregate reason");
                    Err(AnyError::Rejection(other))
                }
            },
        }
    }

    /// Wait for the first input to settle, in either direction.
    pub fn race(&self, values: &[H::Value]) -> Result<H::Value, Reason<H>> {
        self.wait(self.host.race(values))
    }

    fn reason(&self, value: H::Value) -> Reason<H> {
        Reason::new(Arc::clone(&self.host), value)
    }

    fn elements(&self, aggregate: &H::Value, len: usize) -> Vec<H::Value> {
        (0..len)
            .map(|index| {
                self.host
                    .element(aggregate, index)
                    .unwrap_or_else(|| self.host.undefined())
            })
            .collect()
    }

    fn decode_outcome(&self, aggregate: &H::Value, index: usize) -> Outcome<H> {
        let record = self
            .host
            .element(aggregate, index)
            .unwrap_or_else(|| self.host.undefined());
        let status = self
            .host
            .member(&record, "status")
            .map(|tag| self.host.coerce_string(&tag));

        if status.as_deref() == Some(STATUS_FULFILLED) {
            let value = self
                .host
                .member(&record, "value")
                .unwrap_or_else(|| self.host.undefined());
            Outcome::Fulfilled(value)
        } else {
            let reason = self
                .host
                .member(&record, "reason")
                .unwrap_or_else(|| self.host.undefined());
            Outcome::Rejected(self.reason(reason))
        }
    }
}
