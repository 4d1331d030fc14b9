//! Combinator policies against the in-process host: fail-fast ordering,
//! collect-all outcomes, first-fulfillment with input-order aggregation, and
//! first-settlement races.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use core_await::{AnyError, PromiseBridge};
use host_inproc::{InprocHost, Value};
use host_traits::{PendingPromise, PromiseHost, Settler};

fn bridge() -> PromiseBridge<InprocHost> {
    PromiseBridge::new(Arc::new(InprocHost::new()))
}

fn settle_later(settler: Settler<Value>, delay: Duration, value: Value) {
    thread::spawn(move || {
        thread::sleep(delay);
        settler.settle(value);
    });
}

#[test]
fn test_all_returns_values_in_input_order() {
    let bridge = bridge();
    let inputs = [
        bridge.resolved(Value::from(1)),
        bridge.resolved(Value::from(2)),
        bridge.resolved(Value::from(3)),
    ];

    let values = bridge.all(&inputs).expect("every input fulfills");

    assert_eq!(values, vec![Value::from(1), Value::from(2), Value::from(3)]);
}

#[test]
fn test_all_fails_fast_on_rejection() {
    let bridge = bridge();
    let inputs = [
        bridge.resolved(Value::from(1)),
        bridge.resolved(Value::from(2)),
        bridge.rejected(Value::from("x")),
    ];

    let reason = bridge.all(&inputs).expect_err("one input rejects");

    assert_eq!(reason.to_string(), "x");
}

#[test]
fn test_all_reports_first_rejection_to_settle() {
    let bridge = bridge();
    let slow = bridge.pending();
    let fast = bridge.pending();
    let inputs = [slow.promise.clone(), fast.promise.clone()];

    // The later input by index rejects well before the earlier one.
    settle_later(
        slow.reject,
        Duration::from_millis(400),
        Value::from("slow"),
    );
    settle_later(fast.reject, Duration::from_millis(20), Value::from("fast"));

    let reason = bridge.all(&inputs).expect_err("inputs reject");
    assert_eq!(reason.to_string(), "fast");
}

#[test]
fn test_all_empty_input_yields_empty_vec() {
    let bridge = bridge();
    let values = bridge.all(&[]).expect("empty aggregate fulfills");
    assert!(values.is_empty());
}

#[test]
fn test_all_settled_reports_each_outcome() {
    let bridge = bridge();
    let inputs = [
        bridge.resolved(Value::from(1)),
        bridge.rejected(Value::from(2)),
        bridge.resolved(Value::from(3)),
    ];

    let outcomes = bridge.all_settled(&inputs);

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_fulfilled());
    assert_eq!(outcomes[0].value(), Some(&Value::from(1)));
    assert!(outcomes[1].is_rejected());
    assert_eq!(outcomes[1].reason().expect("rejected").to_string(), "2");
    assert!(outcomes[2].is_fulfilled());
    assert_eq!(outcomes[2].value(), Some(&Value::from(3)));
}

#[test]
fn test_all_settled_empty_input() {
    let bridge = bridge();
    assert!(bridge.all_settled(&[]).is_empty());
}

#[test]
fn test_any_returns_first_fulfillment_in_settlement_order() {
    let bridge = bridge();
    let slow = bridge.pending();
    let rejected = bridge.rejected(Value::from("early rejection"));
    let fast = bridge.pending();
    let inputs = [slow.promise.clone(), rejected, fast.promise.clone()];

    settle_later(
        slow.resolve,
        Duration::from_millis(800),
        Value::from("slow"),
    );
    settle_later(fast.resolve, Duration::from_millis(40), Value::from("fast"));

    let value = bridge.any(&inputs).expect("a fulfillment exists");
    assert_eq!(value, Value::from("fast"));
}

#[test]
fn test_any_collects_rejections_in_input_order() {
    let bridge = bridge();
    let first = bridge.pending();
    let second = bridge.pending();
    let third = bridge.pending();
    let inputs = [
        first.promise.clone(),
        second.promise.clone(),
        third.promise.clone(),
    ];

    // Settlement order (c, a, b) differs from input order (a, b, c); the
    // aggregate must still report input order.
    third.reject.settle(Value::from("c"));
    settle_later(first.reject, Duration::from_millis(40), Value::from("a"));
    settle_later(second.reject, Duration::from_millis(80), Value::from("b"));

    let error = bridge.any(&inputs).expect_err("every input rejects");
    match error {
        AnyError::Aggregate(aggregate) => {
            let messages: Vec<String> = aggregate
                .errors()
                .iter()
                .map(|reason| reason.to_string())
                .collect();
            assert_eq!(messages, ["a", "b", "c"]);
            assert_eq!(aggregate.to_string(), "All promises were rejected");
        }
        AnyError::Rejection(reason) => panic!("expected aggregate, got {reason}"),
    }
}

#[test]
fn test_race_first_settlement_wins() {
    let bridge = bridge();
    let first = bridge.pending();
    let second = bridge.pending();
    let inputs = [first.promise.clone(), second.promise.clone()];

    settle_later(
        first.resolve,
        Duration::from_millis(400),
        Value::from("second place"),
    );
    settle_later(
        second.resolve,
        Duration::from_millis(40),
        Value::from("first place"),
    );

    let value = bridge.race(&inputs).expect("winner fulfills");
    assert_eq!(value, Value::from("first place"));
}

#[test]
fn test_race_rejection_wins_when_first() {
    let bridge = bridge();
    let loser = bridge.pending();
    let winner = bridge.pending();
    let inputs = [loser.promise.clone(), winner.promise.clone()];

    settle_later(
        loser.resolve,
        Duration::from_millis(400),
        Value::from("too late"),
    );
    settle_later(
        winner.reject,
        Duration::from_millis(40),
        Value::error("lost anyway"),
    );

    let reason = bridge.race(&inputs).expect_err("winner rejects");
    assert_eq!(reason.to_string(), "lost anyway");
}

/// Host whose first-fulfillment aggregate rejects with a plain value instead
/// of an aggregate-shaped one; everything else delegates.
struct NonAggregateAnyHost {
    inner: InprocHost,
}

impl PromiseHost for NonAggregateAnyHost {
    type Value = Value;

    fn is_thenable(&self, value: &Value) -> bool {
        self.inner.is_thenable(value)
    }

    fn on_settle(&self, value: &Value, on_fulfilled: Settler<Value>, on_rejected: Settler<Value>) {
        self.inner.on_settle(value, on_fulfilled, on_rejected)
    }

    fn pending(&self) -> PendingPromise<Value> {
        self.inner.pending()
    }

    fn resolved(&self, value: Value) -> Value {
        self.inner.resolved(value)
    }

    fn rejected(&self, reason: Value) -> Value {
        self.inner.rejected(reason)
    }

    fn all(&self, values: &[Value]) -> Value {
        self.inner.all(values)
    }

    fn all_settled(&self, values: &[Value]) -> Value {
        self.inner.all_settled(values)
    }

    fn any(&self, _values: &[Value]) -> Value {
        self.inner.rejected(Value::from("broken aggregate"))
    }

    fn race(&self, values: &[Value]) -> Value {
        self.inner.race(values)
    }

    fn undefined(&self) -> Value {
        self.inner.undefined()
    }

    fn element(&self, value: &Value, index: usize) -> Option<Value> {
        self.inner.element(value, index)
    }

    fn member(&self, value: &Value, key: &str) -> Option<Value> {
        self.inner.member(value, key)
    }

    fn error_message(&self, value: &Value) -> Option<String> {
        self.inner.error_message(value)
    }

    fn coerce_string(&self, value: &Value) -> String {
        self.inner.coerce_string(value)
    }

    fn aggregate_errors(&self, value: &Value) -> Option<Vec<Value>> {
        self.inner.aggregate_errors(value)
    }
}

#[test]
fn test_any_verifies_aggregate_shape_before_wrapping() {
    let bridge = PromiseBridge::new(Arc::new(NonAggregateAnyHost {
        inner: InprocHost::new(),
    }));
    let inputs = [bridge.rejected(Value::from("a"))];

    let error = bridge.any(&inputs).expect_err("aggregate rejects");
    match error {
        AnyError::Rejection(reason) => assert_eq!(reason.to_string(), "broken aggregate"),
        AnyError::Aggregate(aggregate) => {
            panic!("expected shape mismatch, got aggregate {aggregate}")
        }
    }
}
