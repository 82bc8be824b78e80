//! Launch backends.
//!
//! The orchestrator never starts processes or drives lifecycle hooks itself;
//! it asks a [`Launch`] backend to. [`LocalLaunch`] is the single-host
//! implementation shipped with the crate; tests and embedders can plug in
//! their own.
//!
//! ## Contract
//! - `spawn_process` / `spawn_colocated` hand a unit to the backend (not started yet)
//! - `spawn_executable` starts a plain program right away; it has no lifecycle
//!   and is stopped when the backend finalizes
//! - `request_transitions` applies a sequence in order, stopping at the first failure
//! - `register_event_handler` binds an internal event name to a callback
//! - `run` routes `EventTriggered` signals to handlers until the token is
//!   cancelled, then finalizes every unit

mod local;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::components::{ComponentRef, Transition};
use crate::error::LaunchError;
use crate::signals::{Bus, Signal, SignalKind};

pub use local::{CommandFactory, LocalLaunch};

/// Callback bound to an internal event name.
pub type EventHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// How to start a separate-process component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessSpec {
    /// Component name.
    pub name: String,
    /// Package providing the entry point.
    pub package: String,
    /// Executable inside the package.
    pub entry_point: String,
    /// Command line arguments.
    pub args: Vec<String>,
}

/// A plain program run next to the components, without lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutableSpec {
    /// Name used in logs and signals.
    pub name: String,
    /// Program to run.
    pub program: String,
    /// Command line arguments.
    pub args: Vec<String>,
}

/// Launch/lifecycle backend.
#[async_trait]
pub trait Launch: Send + Sync + 'static {
    /// Gives the backend the signal bus before any unit is handed over.
    fn attach(&self, _bus: Bus) {}

    /// Hands over a separate-process unit.
    async fn spawn_process(&self, spec: ProcessSpec) -> Result<(), LaunchError>;

    /// Hands over a co-located unit.
    async fn spawn_colocated(&self, component: ComponentRef) -> Result<(), LaunchError>;

    /// Starts a plain program. It runs until it exits or the backend finalizes.
    async fn spawn_executable(&self, spec: ExecutableSpec) -> Result<(), LaunchError>;

    /// Applies `transitions` to `component` in order.
    async fn request_transitions(
        &self,
        component: &str,
        transitions: &[Transition],
    ) -> Result<(), LaunchError>;

    /// Binds `handler` to the internal event `event`.
    fn register_event_handler(&self, event: &str, handler: EventHandler);

    /// Serves until `token` is cancelled.
    async fn run(
        &self,
        signals: broadcast::Receiver<Signal>,
        token: CancellationToken,
    ) -> Result<(), LaunchError>;
}

/// Internal event name → handlers table shared by backends.
#[derive(Default)]
pub struct EventRouter {
    handlers: RwLock<HashMap<String, Vec<EventHandler>>>,
}

impl EventRouter {
    /// Empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler for `event`.
    pub fn register(&self, event: &str, handler: EventHandler) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    /// Calls the handlers of a trigger signal. Returns how many ran.
    pub fn route(&self, signal: &Signal) -> usize {
        if signal.kind != SignalKind::EventTriggered {
            return 0;
        }
        let Some(event) = signal.event.as_deref() else {
            return 0;
        };
        let handlers: Vec<EventHandler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .cloned()
            .unwrap_or_default();
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    /// Routes signals from `rx` until `token` is cancelled or the bus closes.
    pub async fn serve(&self, mut rx: broadcast::Receiver<Signal>, token: CancellationToken) {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(sig) => {
                        self.route(&sig);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "event router lagged behind the bus");
                    }
                }
            }
        }
    }
}

impl fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("EventRouter").field("events", &events).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn routes_only_matching_triggers() {
        let router = EventRouter::new();
        let hits = Arc::new(AtomicU32::new(0));
        let h = Arc::clone(&hits);
        router.register(
            "e1",
            Arc::new(move |name: &str| {
                assert_eq!(name, "e1");
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(router.route(&Signal::triggered("e1")), 1);
        assert_eq!(router.route(&Signal::triggered("e2")), 0);
        assert_eq!(
            router.route(&Signal::new(SignalKind::EventDispatched).with_event("e1")),
            0
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
