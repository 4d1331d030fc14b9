//! End-to-end demo: create a pending host value, settle it from another
//! thread, and block on it from the embedded side.
//!
//! Run with `RUST_LOG=trace` to watch the bridge's internals.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use core_await::PromiseBridge;
use host_inproc::{InprocHost, Value};
use host_traits::PendingPromise;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let bridge = PromiseBridge::new(Arc::new(InprocHost::new()));

    // Dropping the unused reject trigger releases it; only resolve fires.
    let PendingPromise {
        promise, resolve, ..
    } = bridge.pending();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        resolve.settle(Value::from("asynchronous job is done!"));
    });

    match bridge.wait(promise) {
        Ok(value) => println!("{value}"),
        Err(reason) => eprintln!("error: {reason}"),
    }

    let values = bridge
        .all(&[
            bridge.resolved(Value::from(1)),
            bridge.resolved(Value::from(2)),
            bridge.resolved(Value::from(3)),
        ])
        .expect("no input rejects");
    for value in values {
        println!("{value}");
    }
}
