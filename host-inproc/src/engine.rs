//! Promise registry and the single-threaded dispatch loop.
//!
//! All callbacks run on one dedicated loop thread in FIFO enqueue order, so
//! no two callbacks ever run concurrently, matching the cooperative single-threaded
//! model embedded code expects from a host runtime. State transitions are
//! irreversible: a slot settles at most once and later settle requests are
//! ignored.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use host_traits::Settler;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::value::{PromiseId, Value};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Which side of a settlement fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SettleKind {
    Fulfill,
    Reject,
}

/// A registered fulfillment/rejection callback pair.
///
/// Exactly one side fires when the slot settles; the other side is released
/// by dropping it.
pub(crate) struct Reaction {
    pub(crate) on_fulfilled: Settler<Value>,
    pub(crate) on_rejected: Settler<Value>,
}

enum Slot {
    Pending { reactions: Vec<Reaction> },
    Fulfilled(Value),
    Rejected(Value),
}

/// The host engine: promise slots plus the dispatch queue.
pub(crate) struct Engine {
    slots: Mutex<HashMap<u64, Slot>>,
    next_id: AtomicU64,
    queue: mpsc::UnboundedSender<Job>,
}

impl Engine {
    /// Start an engine with its dispatch thread.
    pub(crate) fn start() -> Arc<Self> {
        let (queue, mut jobs) = mpsc::unbounded_channel::<Job>();

        // The loop thread owns only the receiver; it exits once every sender
        // (engine handles and queued jobs) is gone.
        thread::Builder::new()
            .name("inproc-host-dispatch".into())
            .spawn(move || {
                debug!("host dispatch loop started");
                while let Some(job) = jobs.blocking_recv() {
                    job();
                }
                debug!("host dispatch loop stopped");
            })
            .expect("failed to spawn host dispatch thread");

        Arc::new(Self {
            slots: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            queue,
        })
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<u64, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a job for the dispatch thread.
    pub(crate) fn enqueue(&self, job: Job) {
        // A send only fails once the loop is gone (a callback panicked and
        // took the thread down); settlement work is discarded at that point.
        if self.queue.send(job).is_err() {
            trace!("dispatch queue closed; job dropped");
        }
    }

    /// Block until every job enqueued so far has run.
    ///
    /// Must not be called from the dispatch thread itself.
    pub(crate) fn flush(&self) {
        let (done, rx) = oneshot::channel();
        self.enqueue(Box::new(move || {
            let _ = done.send(());
        }));
        let _ = rx.blocking_recv();
    }

    /// Allocate a pending slot.
    pub(crate) fn new_pending(&self) -> PromiseId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock_slots()
            .insert(id, Slot::Pending { reactions: Vec::new() });
        PromiseId(id)
    }

    /// Allocate an already-settled slot.
    pub(crate) fn new_settled(&self, kind: SettleKind, value: Value) -> PromiseId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let slot = match kind {
            SettleKind::Fulfill => Slot::Fulfilled(value),
            SettleKind::Reject => Slot::Rejected(value),
        };
        self.lock_slots().insert(id, slot);
        PromiseId(id)
    }

    /// Register a callback pair on a slot.
    ///
    /// Late subscribers on an already-settled slot are still dispatched, on a
    /// fresh queue turn, never inline from the registering thread.
    pub(crate) fn subscribe(&self, id: PromiseId, reaction: Reaction) {
        let settled = {
            let mut slots = self.lock_slots();
            match slots.get_mut(&id.0) {
                Some(Slot::Pending { reactions }) => {
                    reactions.push(reaction);
                    return;
                }
                Some(Slot::Fulfilled(value)) => Some((SettleKind::Fulfill, value.clone())),
                Some(Slot::Rejected(reason)) => Some((SettleKind::Reject, reason.clone())),
                None => None,
            }
        };

        match settled {
            Some((kind, value)) => self.dispatch(reaction, kind, value),
            None => {
                // Unknown handle: nothing will ever fire. Dropping the pair
                // releases both callbacks.
                trace!(promise = id.0, "subscribe on unknown promise handle");
            }
        }
    }

    /// Request settlement of a slot, processed on the dispatch loop in
    /// enqueue order.
    pub(crate) fn settle(self: &Arc<Self>, id: PromiseId, kind: SettleKind, value: Value) {
        let engine = Arc::clone(self);
        self.enqueue(Box::new(move || engine.settle_now(id, kind, value)));
    }

    /// Transition a slot and dispatch its reactions.
    ///
    /// Fulfilling with a promise does not settle the slot directly: the inner
    /// promise is adopted and the slot follows its eventual state. Rejecting
    /// with a promise keeps the promise itself as the reason. Settling an
    /// already-settled slot is ignored.
    pub(crate) fn settle_now(self: &Arc<Self>, id: PromiseId, kind: SettleKind, value: Value) {
        if kind == SettleKind::Fulfill {
            if let Value::Promise(inner) = value {
                self.adopt(id, inner);
                return;
            }
        }

        let reactions = {
            let mut slots = self.lock_slots();
            match slots.get_mut(&id.0) {
                Some(slot) => {
                    if let Slot::Pending { reactions } = slot {
                        let pending = std::mem::take(reactions);
                        *slot = match kind {
                            SettleKind::Fulfill => Slot::Fulfilled(value.clone()),
                            SettleKind::Reject => Slot::Rejected(value.clone()),
                        };
                        pending
                    } else {
                        trace!(promise = id.0, "settle on settled promise ignored");
                        return;
                    }
                }
                None => {
                    trace!(promise = id.0, "settle on unknown promise handle");
                    return;
                }
            }
        };

        for reaction in reactions {
            self.dispatch(reaction, kind, value.clone());
        }
    }

    /// Make slot `outer` follow the eventual state of slot `inner`.
    fn adopt(self: &Arc<Self>, outer: PromiseId, inner: PromiseId) {
        if inner == outer {
            // A slot cannot follow itself; it would stay pending forever.
            self.settle_now(
                outer,
                SettleKind::Reject,
                Value::error_named("TypeError", "chaining cycle detected"),
            );
            return;
        }

        let fulfill_engine = Arc::clone(self);
        let reject_engine = Arc::clone(self);
        self.subscribe(
            inner,
            Reaction {
                on_fulfilled: Settler::from_fn(move |value| {
                    fulfill_engine.settle_now(outer, SettleKind::Fulfill, value)
                }),
                on_rejected: Settler::from_fn(move |reason| {
                    reject_engine.settle_now(outer, SettleKind::Reject, reason)
                }),
            },
        );
    }

    /// Queue one side of a reaction; the other side is released by drop.
    fn dispatch(&self, reaction: Reaction, kind: SettleKind, value: Value) {
        let Reaction {
            on_fulfilled,
            on_rejected,
        } = reaction;
        match kind {
            SettleKind::Fulfill => self.enqueue(Box::new(move || on_fulfilled.settle(value))),
            SettleKind::Reject => self.enqueue(Box::new(move || on_rejected.settle(value))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc as std_mpsc;
    use std::time::Duration;

    fn watching_reaction(events: std_mpsc::Sender<(SettleKind, Value)>) -> Reaction {
        let fulfil_events = events.clone();
        Reaction {
            on_fulfilled: Settler::from_fn(move |value| {
                let _ = fulfil_events.send((SettleKind::Fulfill, value));
            }),
            on_rejected: Settler::from_fn(move |reason| {
                let _ = events.send((SettleKind::Reject, reason));
            }),
        }
    }

    #[test]
    fn test_first_settlement_wins() {
        let engine = Engine::start();
        let id = engine.new_pending();
        let (tx, rx) = std_mpsc::channel();
        engine.subscribe(id, watching_reaction(tx));

        engine.settle(id, SettleKind::Fulfill, Value::from(1));
        engine.settle(id, SettleKind::Reject, Value::from(2));
        engine.flush();

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            (SettleKind::Fulfill, Value::from(1))
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_late_subscriber_still_delivered() {
        let engine = Engine::start();
        let id = engine.new_pending();
        engine.settle(id, SettleKind::Reject, Value::from("late"));
        engine.flush();

        let (tx, rx) = std_mpsc::channel();
        engine.subscribe(id, watching_reaction(tx));
        engine.flush();

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            (SettleKind::Reject, Value::from("late"))
        );
    }

    #[test]
    fn test_jobs_run_in_fifo_order() {
        let engine = Engine::start();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for index in 0..4 {
            let seen = Arc::clone(&seen);
            engine.enqueue(Box::new(move || seen.lock().unwrap().push(index)));
        }
        engine.flush();

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_fulfilling_with_promise_adopts_it() {
        let engine = Engine::start();
        let outer = engine.new_pending();
        let inner = engine.new_pending();
        let (tx, rx) = std_mpsc::channel();
        engine.subscribe(outer, watching_reaction(tx));

        engine.settle(outer, SettleKind::Fulfill, Value::Promise(inner));
        engine.flush();
        // Outer must still be pending until the inner promise settles.
        assert!(rx.try_recv().is_err());

        engine.settle(inner, SettleKind::Fulfill, Value::from(5));
        engine.flush();
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            (SettleKind::Fulfill, Value::from(5))
        );
    }

    #[test]
    fn test_rejecting_with_promise_keeps_the_handle() {
        let engine = Engine::start();
        let id = engine.new_pending();
        let inner = engine.new_pending();
        let (tx, rx) = std_mpsc::channel();
        engine.subscribe(id, watching_reaction(tx));

        engine.settle(id, SettleKind::Reject, Value::Promise(inner));
        engine.flush();

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            (SettleKind::Reject, Value::Promise(inner))
        );
    }

    #[test]
    fn test_self_adoption_rejects() {
        let engine = Engine::start();
        let id = engine.new_pending();
        let (tx, rx) = std_mpsc::channel();
        engine.subscribe(id, watching_reaction(tx));

        engine.settle(id, SettleKind::Fulfill, Value::Promise(id));
        engine.flush();

        let (kind, reason) = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(kind, SettleKind::Reject);
        assert_eq!(reason.member("name"), Some(Value::from("TypeError")));
    }
}
