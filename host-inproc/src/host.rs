//! The in-process host runtime.

use std::fmt;
use std::sync::Arc;

use host_traits::{PendingPromise, PromiseHost, Settler};

use crate::combine;
use crate::engine::{Engine, Reaction, SettleKind};
use crate::value::{Value, AGGREGATE_ERROR_NAME};

/// An in-process host runtime with single-settlement promise semantics.
///
/// Owns a registry of promise slots and one dispatch thread that runs every
/// callback in FIFO order, reproducing the cooperative single-threaded model
/// of a real host. Serves as the reference [`PromiseHost`] implementation on
/// native targets and as the test double for anything built on the bridge.
///
/// Cloning shares the same engine.
#[derive(Clone)]
pub struct InprocHost {
    engine: Arc<Engine>,
}

impl InprocHost {
    /// Start a host together with its dispatch thread.
    pub fn new() -> Self {
        Self {
            engine: Engine::start(),
        }
    }

    /// Block until every host turn queued so far has been processed.
    ///
    /// Deterministic-test aid; must not be called from a settlement callback.
    pub fn drain(&self) {
        self.engine.flush();
    }
}

impl Default for InprocHost {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InprocHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InprocHost").finish_non_exhaustive()
    }
}

impl PromiseHost for InprocHost {
    type Value = Value;

    fn is_thenable(&self, value: &Value) -> bool {
        value.is_thenable()
    }

    fn on_settle(&self, value: &Value, on_fulfilled: Settler<Value>, on_rejected: Settler<Value>) {
        // A plain value counts as already fulfilled; not reachable through
        // the bridge, which checks the thenable predicate first.
        combine::observe(
            &self.engine,
            value,
            Reaction {
                on_fulfilled,
                on_rejected,
            },
        );
    }

    fn pending(&self) -> PendingPromise<Value> {
        let id = self.engine.new_pending();
        let resolve_engine = Arc::clone(&self.engine);
        let reject_engine = Arc::clone(&self.engine);
        PendingPromise {
            promise: Value::Promise(id),
            resolve: Settler::from_fn(move |value| {
                resolve_engine.settle(id, SettleKind::Fulfill, value)
            }),
            reject: Settler::from_fn(move |reason| {
                reject_engine.settle(id, SettleKind::Reject, reason)
            }),
        }
    }

    fn resolved(&self, value: Value) -> Value {
        // Resolving with a promise adopts it: the result is that promise.
        if let Value::Promise(_) = value {
            return value;
        }
        Value::Promise(self.engine.new_settled(SettleKind::Fulfill, value))
    }

    fn rejected(&self, reason: Value) -> Value {
        Value::Promise(self.engine.new_settled(SettleKind::Reject, reason))
    }

    fn all(&self, values: &[Value]) -> Value {
        combine::all(&self.engine, values)
    }

    fn all_settled(&self, values: &[Value]) -> Value {
        combine::all_settled(&self.engine, values)
    }

    fn any(&self, values: &[Value]) -> Value {
        combine::any(&self.engine, values)
    }

    fn race(&self, values: &[Value]) -> Value {
        combine::race(&self.engine, values)
    }

    fn undefined(&self) -> Value {
        Value::Undefined
    }

    fn element(&self, value: &Value, index: usize) -> Option<Value> {
        value.element(index)
    }

    fn member(&self, value: &Value, key: &str) -> Option<Value> {
        value.member(key)
    }

    fn error_message(&self, value: &Value) -> Option<String> {
        match value {
            Value::Error(error) => Some(error.message.clone()),
            Value::Object(_) => match value.member("message") {
                Some(Value::Text(message)) => Some(message.to_string()),
                _ => None,
            },
            _ => None,
        }
    }

    fn coerce_string(&self, value: &Value) -> String {
        value.to_string()
    }

    fn aggregate_errors(&self, value: &Value) -> Option<Vec<Value>> {
        match value {
            Value::Error(error) if error.name == AGGREGATE_ERROR_NAME => {
                Some(error.errors.clone())
            }
            _ => None,
        }
    }
}
