//! # Signal bus for broadcasting runtime notifications.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking publishing from many sources (monitor, dispatcher, launch
//! backend, bridge workers).
//!
//! ## Architecture
//! ```text
//! Publishers (many):                    Receivers (several):
//!   Monitor     ──┐                ┌──► launch backend (internal event handlers)
//!   Dispatcher  ──┤                ├──► Monitor (health snapshot)
//!   Launch      ──┼──► Bus ────────┼──► fallback listener
//!   Components  ──┤  (broadcast)   └──► subscriber listener ──► SubscriberSet
//!   Bridge      ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: one ring buffer shared by all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: a signal sent with no receivers is lost.

use tokio::sync::broadcast;

use super::signal::Signal;

/// Broadcast channel for runtime signals.
///
/// Cheap to clone: every clone publishes into the same channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Signal>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Signal>(capacity);
        Self { tx }
    }

    /// Publishes a signal to all active receivers.
    ///
    /// If there are no receivers the signal is dropped.
    pub fn publish(&self, signal: Signal) {
        let _ = self.tx.send(signal);
    }

    /// Creates a new receiver that observes signals sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.tx.subscribe()
    }

    /// Number of receivers currently attached.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
