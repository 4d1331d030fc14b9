//! Native combinators: fail-fast, collect-all-outcomes, first-fulfillment,
//! first-settlement.
//!
//! Each combinator allocates a dependent slot and settles it from the inputs'
//! reactions, so settlement order is decided purely by dispatch-queue order.

use std::sync::{Arc, Mutex, PoisonError};

use host_traits::{Settler, STATUS_FULFILLED, STATUS_REJECTED};

use crate::engine::{Engine, Reaction, SettleKind};
use crate::value::Value;

/// Message carried by the aggregate error when every input rejects.
pub(crate) const ALL_REJECTED_MESSAGE: &str = "All promises were rejected";

/// Observe one input: promises are subscribed, plain values count as already
/// fulfilled, dispatched on a fresh turn to preserve event order.
pub(crate) fn observe(engine: &Arc<Engine>, input: &Value, reaction: Reaction) {
    match input {
        Value::Promise(id) => engine.subscribe(*id, reaction),
        plain => {
            let value = plain.clone();
            let Reaction { on_fulfilled, .. } = reaction;
            engine.enqueue(Box::new(move || on_fulfilled.settle(value)));
        }
    }
}

/// Per-input collection state shared by a combinator's reactions.
struct Gather {
    slots: Vec<Option<Value>>,
    remaining: usize,
}

impl Gather {
    fn shared(len: usize) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self {
            slots: vec![None; len],
            remaining: len,
        }))
    }
}

/// Record slot `index`; returns the full set, in input order, once every
/// slot has reported.
fn record(gather: &Mutex<Gather>, index: usize, value: Value) -> Option<Vec<Value>> {
    let mut gather = gather.lock().unwrap_or_else(PoisonError::into_inner);
    if gather.slots[index].is_none() {
        gather.remaining -= 1;
    }
    gather.slots[index] = Some(value);
    if gather.remaining == 0 {
        Some(
            gather
                .slots
                .iter_mut()
                .map(|slot| slot.take().unwrap_or(Value::Undefined))
                .collect(),
        )
    } else {
        None
    }
}

/// Fail-fast combination: fulfills with every value in input order, rejects
/// with the first rejection to settle.
pub(crate) fn all(engine: &Arc<Engine>, inputs: &[Value]) -> Value {
    let out = engine.new_pending();
    if inputs.is_empty() {
        engine.settle(out, SettleKind::Fulfill, Value::array(Vec::new()));
        return Value::Promise(out);
    }

    let gather = Gather::shared(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let fulfill_gather = Arc::clone(&gather);
        let fulfill_engine = Arc::clone(engine);
        let reject_engine = Arc::clone(engine);
        observe(
            engine,
            input,
            Reaction {
                on_fulfilled: Settler::from_fn(move |value| {
                    if let Some(values) = record(&fulfill_gather, index, value) {
                        fulfill_engine.settle_now(out, SettleKind::Fulfill, Value::array(values));
                    }
                }),
                on_rejected: Settler::from_fn(move |reason| {
                    reject_engine.settle_now(out, SettleKind::Reject, reason);
                }),
            },
        );
    }
    Value::Promise(out)
}

/// Collect-all-outcomes combination: never rejects; fulfills with one status
/// record per input, in input order.
pub(crate) fn all_settled(engine: &Arc<Engine>, inputs: &[Value]) -> Value {
    let out = engine.new_pending();
    if inputs.is_empty() {
        engine.settle(out, SettleKind::Fulfill, Value::array(Vec::new()));
        return Value::Promise(out);
    }

    let gather = Gather::shared(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let fulfill_gather = Arc::clone(&gather);
        let reject_gather = Arc::clone(&gather);
        let fulfill_engine = Arc::clone(engine);
        let reject_engine = Arc::clone(engine);
        observe(
            engine,
            input,
            Reaction {
                on_fulfilled: Settler::from_fn(move |value| {
                    let outcome = fulfilled_record(value);
                    if let Some(outcomes) = record(&fulfill_gather, index, outcome) {
                        fulfill_engine.settle_now(out, SettleKind::Fulfill, Value::array(outcomes));
                    }
                }),
                on_rejected: Settler::from_fn(move |reason| {
                    let outcome = rejected_record(reason);
                    if let Some(outcomes) = record(&reject_gather, index, outcome) {
                        reject_engine.settle_now(out, SettleKind::Fulfill, Value::array(outcomes));
                    }
                }),
            },
        );
    }
    Value::Promise(out)
}

/// First-fulfillment combination: fulfills with the first fulfillment to
/// settle; rejects with an aggregate of every reason, in input order, only
/// when all inputs reject.
pub(crate) fn any(engine: &Arc<Engine>, inputs: &[Value]) -> Value {
    let out = engine.new_pending();
    if inputs.is_empty() {
        engine.settle(
            out,
            SettleKind::Reject,
            Value::aggregate(ALL_REJECTED_MESSAGE, Vec::new()),
        );
        return Value::Promise(out);
    }

    let gather = Gather::shared(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let reject_gather = Arc::clone(&gather);
        let fulfill_engine = Arc::clone(engine);
        let reject_engine = Arc::clone(engine);
        observe(
            engine,
            input,
            Reaction {
                on_fulfilled: Settler::from_fn(move |value| {
                    fulfill_engine.settle_now(out, SettleKind::Fulfill, value);
                }),
                on_rejected: Settler::from_fn(move |reason| {
                    if let Some(reasons) = record(&reject_gather, index, reason) {
                        reject_engine.settle_now(
                            out,
                            SettleKind::Reject,
                            Value::aggregate(ALL_REJECTED_MESSAGE, reasons),
                        );
                    }
                }),
            },
        );
    }
    Value::Promise(out)
}

/// First-settlement combination: adopts the first settlement in either
/// direction; stays pending forever on empty input.
pub(crate) fn race(engine: &Arc<Engine>, inputs: &[Value]) -> Value {
    let out = engine.new_pending();
    for input in inputs {
        let fulfill_engine = Arc::clone(engine);
        let reject_engine = Arc::clone(engine);
        observe(
            engine,
            input,
            Reaction {
                on_fulfilled: Settler::from_fn(move |value| {
                    fulfill_engine.settle_now(out, SettleKind::Fulfill, value);
                }),
                on_rejected: Settler::from_fn(move |reason| {
                    reject_engine.settle_now(out, SettleKind::Reject, reason);
                }),
            },
        );
    }
    Value::Promise(out)
}

fn fulfilled_record(value: Value) -> Value {
    Value::object([
        ("status", Value::from(STATUS_FULFILLED)),
        ("value", value),
    ])
}

fn rejected_record(reason: Value) -> Value {
    Value::object([
        ("status", Value::from(STATUS_REJECTED)),
        ("reason", reason),
    ])
}
