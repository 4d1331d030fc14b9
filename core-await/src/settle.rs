//! Settlement events and the callback-to-blocking-wait handoff.
//!
//! Each wait gets a dedicated single-use channel: the host callback writes
//! exactly one event, the waiter reads exactly one event, and the channel is
//! discarded afterward. No pooling, no reuse.

use std::sync::{Arc, Mutex, PoisonError};

use host_traits::{PromiseHost, Settler};
use tokio::sync::oneshot;

/// A single settlement observed from a host value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<V> {
    /// The value fulfilled with a result.
    Fulfilled(V),
    /// The value rejected with a reason.
    Rejected(V),
}

type EventSender<V> = oneshot::Sender<Settlement<V>>;
type SenderSlot<V> = Arc<Mutex<Option<EventSender<V>>>>;

/// Bridge one host value into a settlement channel.
///
/// Registers the fulfillment/rejection callback pair on the value; whichever
/// fires writes its event into the channel and releases itself, and the other
/// callback is released by the host once the pair is discarded.
pub(crate) fn subscribe<H: PromiseHost>(
    host: &H,
    value: &H::Value,
) -> oneshot::Receiver<Settlement<H::Value>> {
    let (tx, rx) = oneshot::channel();
    let slot: SenderSlot<H::Value> = Arc::new(Mutex::new(Some(tx)));
    let fulfill_slot = Arc::clone(&slot);

    host.on_settle(
        value,
        Settler::from_fn(move |v| deliver(&fulfill_slot, Settlement::Fulfilled(v))),
        Settler::from_fn(move |r| deliver(&slot, Settlement::Rejected(r))),
    );

    rx
}

/// Hand the event to the waiter; the first write wins.
///
/// The two callbacks are mutually exclusive by host contract, so the
/// take-once slot never actually races; it also keeps a misbehaving host
/// from delivering twice.
fn deliver<V>(slot: &Mutex<Option<EventSender<V>>>, event: Settlement<V>) {
    let sender = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(tx) = sender {
        // The waiter may be gone (its thread unwound); the event is dropped
        // with the channel in that case.
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_delivery_wins() {
        let (tx, rx) = oneshot::channel();
        let slot: SenderSlot<u32> = Arc::new(Mutex::new(Some(tx)));

        deliver(&slot, Settlement::Fulfilled(1));
        deliver(&slot, Settlement::Rejected(2));

        assert_eq!(rx.blocking_recv().unwrap(), Settlement::Fulfilled(1));
    }

    #[test]
    fn test_delivery_without_waiter_is_dropped() {
        let (tx, rx) = oneshot::channel::<Settlement<u32>>();
        let slot: SenderSlot<u32> = Arc::new(Mutex::new(Some(tx)));
        drop(rx);

        deliver(&slot, Settlement::Fulfilled(1));

        assert!(slot.lock().unwrap().is_none());
    }
}
