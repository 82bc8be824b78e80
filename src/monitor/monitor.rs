//! # Supervisor: watches component health and fires events.
//!
//! ```text
//! run():
//!   publish EventTriggered(activate_all)
//!   every health_interval tick (cancellable):
//!     Idle ──► Watching ── snapshot = HealthTracker::snapshot()
//!                 for each event (registration order):
//!                   condition true and armed ──► EventTriggered
//!                       ├─ disarm
//!                       ├─ run monitor actions in order
//!                       └─ publish EventTriggered(name) if the event has orchestrator actions
//!                   condition false ──► re-arm
//!             ◄── Idle
//!   on a manual EventTriggered(name) from the bus:
//!     run monitor actions of `name` in order (orchestrator actions are the dispatcher's)
//! ```
//!
//! Component-local, lifecycle and passthrough actions are never run here;
//! the dispatcher picks them up from the internal notification.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::health::{HealthSnapshot, HealthTracker};
use crate::actions::{ACTIVATE_ALL, Action, Event, EventRegistry, MonitorContext};
use crate::error::ConfigError;
use crate::signals::{Bus, Signal, SignalKind};

/// Monitor state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    /// Between ticks.
    #[default]
    Idle,
    /// Evaluating conditions.
    Watching,
    /// At least one event fired during the current tick.
    EventTriggered,
}

/// What the monitor knows about the managed fleet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorView {
    /// Every component name.
    pub components: Vec<String>,
    /// Components serving requests.
    pub servers: Vec<String>,
    /// Components serving long-running actions.
    pub action_servers: Vec<String>,
    /// Components activated by `activate_all`.
    pub activate_on_start: Vec<String>,
}

struct Watched {
    event: Event,
    actions: Vec<Action>,
    notify: bool,
    armed: bool,
}

/// Health watcher evaluating event conditions.
pub struct Monitor {
    view: MonitorView,
    watched: Vec<Watched>,
    health: Arc<HealthTracker>,
    bus: Bus,
    state: MonitorState,
    health_checks: bool,
}

impl Monitor {
    /// Builds the monitor, validating unique component and event names.
    ///
    /// With `health_checks = false` conditions are never evaluated; the
    /// monitor still emits `activate_all` at start.
    pub fn new(
        view: MonitorView,
        events: &EventRegistry,
        health: Arc<HealthTracker>,
        bus: Bus,
        health_checks: bool,
    ) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for name in &view.components {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateComponent { name: name.clone() });
            }
        }
        events.validate()?;

        let watched = events
            .entries()
            .iter()
            .map(|e| Watched {
                event: e.event().clone(),
                actions: e.monitor_actions().to_vec(),
                notify: !e.orchestrator_actions().is_empty(),
                armed: true,
            })
            .collect();

        Ok(Self {
            view,
            watched,
            health,
            bus,
            state: MonitorState::Idle,
            health_checks,
        })
    }

    /// Fleet view.
    pub fn view(&self) -> &MonitorView {
        &self.view
    }

    /// Current state.
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Evaluates every condition once. Returns the names of events that fired.
    pub async fn evaluate(&mut self) -> Vec<String> {
        if !self.health_checks || self.watched.is_empty() {
            return Vec::new();
        }
        self.state = MonitorState::Watching;
        let snapshot = self.health.snapshot().await;
        let mut fired = Vec::new();

        for w in &mut self.watched {
            if !w.event.is_met(&snapshot) {
                w.armed = true;
                continue;
            }
            if !w.armed {
                continue;
            }
            w.armed = false;
            self.state = MonitorState::EventTriggered;
            info!(event = %w.event.name(), "event condition met");

            run_supervisor_actions(&w.event, &w.actions, &snapshot, &self.bus).await;
            if w.notify {
                self.bus.publish(Signal::triggered(w.event.name_arc()));
            }
            fired.push(w.event.name().to_string());
        }

        self.state = MonitorState::Idle;
        fired
    }

    /// Runs the monitor actions of `event` for a trigger requested by hand.
    ///
    /// Returns `false` for events the monitor does not know.
    pub async fn run_manual(&mut self, event: &str) -> bool {
        let Some(w) = self.watched.iter().find(|w| w.event.name() == event) else {
            return false;
        };
        self.state = MonitorState::EventTriggered;
        let snapshot = self.health.snapshot().await;
        run_supervisor_actions(&w.event, &w.actions, &snapshot, &self.bus).await;
        self.state = MonitorState::Idle;
        true
    }

    /// Emits `activate_all`, then evaluates on every tick until `token` is cancelled.
    ///
    /// Manual triggers seen on the bus run their monitor actions in between.
    /// `interval = None` disables periodic evaluation.
    pub async fn run(mut self, interval: Option<Duration>, token: CancellationToken) {
        debug!(components = self.view.components.len(), "monitor started");
        let mut rx = self.bus.subscribe();
        self.bus.publish(Signal::triggered(ACTIVATE_ALL));

        let mut ticker = interval.map(|period| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = next_tick(&mut ticker) => {
                    self.evaluate().await;
                }
                msg = rx.recv() => match msg {
                    Ok(sig) if sig.is_manual_trigger() => {
                        if let Some(event) = sig.event.as_deref() {
                            if !self.run_manual(event).await {
                                debug!(event, "manual trigger for an unknown event");
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "monitor lagged behind the bus");
                    }
                }
            }
        }
        debug!("monitor stopped");
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn run_supervisor_actions(
    event: &Event,
    actions: &[Action],
    snapshot: &HealthSnapshot,
    bus: &Bus,
) {
    for action in actions {
        let Action::Supervisor { name, run } = action else {
            continue;
        };
        let ctx = MonitorContext {
            event: event.name_arc(),
            snapshot: snapshot.clone(),
            bus: bus.clone(),
        };
        if let Err(e) = run(ctx).await {
            warn!(event = %event.name(), action = %name, error = %e, "monitor action failed");
            bus.publish(
                Signal::new(SignalKind::ActionFailed)
                    .with_event(event.name_arc())
                    .with_reason(e.to_string()),
            );
        }
    }
}
