//! # Non-blocking signal fan-out to multiple subscribers.
//!
//! ```text
//! emit(signal)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_signal()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_signal()
//!     └──► [queue N] ──► worker N ──► subscriberN.on_signal()
//! ```
//!
//! ## Rules
//! - `emit()` returns immediately (`try_send`)
//! - per-subscriber FIFO, no ordering across subscribers
//! - overflow drops the signal for that subscriber only and publishes
//!   `SubscriberOverflow` (never for an overflow signal itself)
//! - a panicking subscriber is reported as `SubscriberPanicked` and keeps
//!   receiving signals
//!
//! `AssertUnwindSafe` is used, so a subscriber panicking while holding a lock
//! may leave its own state inconsistent.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use super::Subscribe;
use crate::signals::{Bus, Signal, SignalKind};

struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Signal>>,
}

/// Fan-out coordinator with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates the set and spawns one worker per subscriber.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Signal>>(cap);
            let bus_for_worker = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(sig) = rx.recv().await {
                    let fut = sub.on_signal(sig.as_ref());
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        let info = if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
                            (*msg).to_string()
                        } else if let Some(msg) = panic_err.downcast_ref::<String>() {
                            msg.clone()
                        } else {
                            "unknown panic".to_string()
                        };
                        bus_for_worker.publish(Signal::subscriber_panicked(sub.name(), info));
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Sends `signal` to every subscriber queue.
    pub fn emit(&self, signal: &Signal) {
        self.emit_arc(Arc::new(signal.clone()));
    }

    /// Same as [`emit`](Self::emit) without cloning the signal.
    pub fn emit_arc(&self, signal: Arc<Signal>) {
        let is_overflow = signal.kind == SignalKind::SubscriberOverflow;

        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&signal)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow {
                self.bus
                    .publish(Signal::subscriber_overflow(channel.name, reason));
            }
        }
    }

    /// Closes all queues and waits for the workers to drain them.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        kinds: Mutex<Vec<SignalKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_signal(&self, signal: &Signal) {
            self.kinds.lock().unwrap().push(signal.kind);
        }
    }

    struct Exploding;

    #[async_trait]
    impl Subscribe for Exploding {
        async fn on_signal(&self, _signal: &Signal) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "exploding"
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_drains_on_shutdown() {
        let rec = Arc::new(Recorder::default());
        let set = SubscriberSet::new(vec![rec.clone() as Arc<dyn Subscribe>], Bus::new(8));
        assert_eq!(set.len(), 1);

        set.emit(&Signal::new(SignalKind::Ready));
        set.emit(&Signal::new(SignalKind::ShutdownRequested));
        set.shutdown().await;

        assert_eq!(
            *rec.kinds.lock().unwrap(),
            vec![SignalKind::Ready, SignalKind::ShutdownRequested]
        );
    }

    #[tokio::test]
    async fn panics_are_published_on_the_bus() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Exploding) as Arc<dyn Subscribe>], bus.clone());

        set.emit(&Signal::new(SignalKind::Ready));
        let sig = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sig.kind, SignalKind::SubscriberPanicked);
        assert_eq!(sig.component.as_deref(), Some("exploding"));
        assert_eq!(sig.reason.as_deref(), Some("boom"));
    }
}
