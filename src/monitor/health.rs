//! # Component health tracker with sequence-based ordering.
//!
//! Maintains the latest health status and lifecycle state of every
//! component, using signal sequence numbers to handle out-of-order delivery.
//!
//! ## Architecture
//! ```text
//! Components / Launch ──► Bus ──► health listener ──► HealthTracker::update()
//!                                                            │
//!                                                            ▼
//!                                            HashMap<String, ComponentHealth>
//!                                             (name → {seq, status, state})
//! ```
//!
//! ## Rules
//! - Only `HealthReported` and `TransitionApplied` change the tracked entry
//! - Signals with `seq <= last_seq` for a component are **rejected** (stale)
//! - Reads go through [`HealthSnapshot`], a detached copy

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::components::LifecycleState;
use crate::signals::{Signal, SignalKind};

/// Health status reported by a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HealthStatus {
    /// Working normally.
    #[default]
    Healthy,
    /// The component's algorithm failed (bad input, no solution, ...).
    AlgorithmFailure,
    /// The component itself failed.
    ComponentFailure,
    /// Something outside the component failed (dependency, hardware, ...).
    SystemFailure,
    /// Unclassified failure.
    GeneralFailure,
}

impl HealthStatus {
    /// Every status other than [`HealthStatus::Healthy`] is a failure.
    #[inline]
    pub fn is_failure(self) -> bool {
        !matches!(self, HealthStatus::Healthy)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::AlgorithmFailure => "algorithm_failure",
            HealthStatus::ComponentFailure => "component_failure",
            HealthStatus::SystemFailure => "system_failure",
            HealthStatus::GeneralFailure => "general_failure",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Latest known health of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentHealth {
    /// Sequence number of the last applied signal.
    pub last_seq: u64,
    /// Last reported status.
    pub status: HealthStatus,
    /// Last applied lifecycle state.
    pub state: LifecycleState,
    /// Reason attached to the last report.
    pub reason: Option<Arc<str>>,
}

impl Default for ComponentHealth {
    fn default() -> Self {
        Self {
            last_seq: 0,
            status: HealthStatus::Healthy,
            state: LifecycleState::Unconfigured,
            reason: None,
        }
    }
}

/// Thread-safe tracker of component health and lifecycle state.
#[derive(Debug, Default)]
pub struct HealthTracker {
    state: RwLock<HashMap<String, ComponentHealth>>,
}

impl HealthTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker pre-seeded with healthy, unconfigured components.
    pub fn with_components<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = names
            .into_iter()
            .map(|n| (n.into(), ComponentHealth::default()))
            .collect();
        Self {
            state: RwLock::new(state),
        }
    }

    /// Applies `sig` if it is newer than the last signal seen for its component.
    ///
    /// ```text
    /// update(HealthReported{failure}, seq=100) → status=failure, last_seq=100
    /// update(HealthReported{healthy}, seq=99)  → rejected (stale)
    /// ```
    ///
    /// Returns true if the entry changed.
    pub async fn update(&self, sig: &Signal) -> bool {
        let Some(name) = sig.component.as_deref() else {
            return false;
        };
        if !matches!(
            sig.kind,
            SignalKind::HealthReported | SignalKind::TransitionApplied
        ) {
            return false;
        }

        let mut state = self.state.write().await;
        let entry = state.entry(name.to_string()).or_default();
        if sig.seq <= entry.last_seq {
            return false;
        }
        entry.last_seq = sig.seq;

        match sig.kind {
            SignalKind::HealthReported => {
                if let Some(status) = sig.status {
                    entry.status = status;
                    entry.reason = sig.reason.clone();
                }
            }
            SignalKind::TransitionApplied => {
                if let Some(next) = sig.state {
                    entry.state = next;
                }
            }
            _ => {}
        }
        true
    }

    /// Detached copy of the current state.
    pub async fn snapshot(&self) -> HealthSnapshot {
        let state = self.state.read().await;
        HealthSnapshot {
            entries: state
                .iter()
                .map(|(name, h)| (name.clone(), h.clone()))
                .collect(),
        }
    }

    /// Sorted names of components currently active.
    ///
    /// Used at shutdown to report components that did not stop within grace.
    pub async fn active(&self) -> Vec<String> {
        self.snapshot().await.active()
    }
}

/// Point-in-time view of component health, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthSnapshot {
    entries: BTreeMap<String, ComponentHealth>,
}

impl HealthSnapshot {
    /// Entry for `component`.
    pub fn get(&self, component: &str) -> Option<&ComponentHealth> {
        self.entries.get(component)
    }

    /// Last reported status of `component`.
    pub fn status(&self, component: &str) -> Option<HealthStatus> {
        self.get(component).map(|h| h.status)
    }

    /// Lifecycle state of `component`.
    pub fn state(&self, component: &str) -> Option<LifecycleState> {
        self.get(component).map(|h| h.state)
    }

    /// True if `component` last reported a failure.
    pub fn is_failed(&self, component: &str) -> bool {
        self.status(component).is_some_and(HealthStatus::is_failure)
    }

    /// Sorted names of active components.
    pub fn active(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, h)| h.state.is_active())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Sorted names of components whose last report is a failure.
    pub fn failed(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, h)| h.status.is_failure())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Iterates entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentHealth)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Transition;

    #[tokio::test]
    async fn stale_signals_are_rejected() {
        let tracker = HealthTracker::new();
        let older = Signal::health("a", HealthStatus::Healthy);
        let newer = Signal::health("a", HealthStatus::SystemFailure);

        assert!(tracker.update(&newer).await);
        assert!(!tracker.update(&older).await);

        let snap = tracker.snapshot().await;
        assert_eq!(snap.status("a"), Some(HealthStatus::SystemFailure));
        assert!(snap.is_failed("a"));
        assert_eq!(snap.failed(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn transitions_update_lifecycle_state() {
        let tracker = HealthTracker::with_components(["a", "b"]);
        let sig = Signal::new(SignalKind::TransitionApplied)
            .with_component("b")
            .with_transition(Transition::Activate)
            .with_state(LifecycleState::Active);
        assert!(tracker.update(&sig).await);

        assert_eq!(tracker.active().await, vec!["b".to_string()]);
        let snap = tracker.snapshot().await;
        assert_eq!(snap.state("a"), Some(LifecycleState::Unconfigured));
        assert!(!snap.is_failed("a"));
    }

    #[tokio::test]
    async fn unrelated_signals_are_ignored() {
        let tracker = HealthTracker::new();
        let sig = Signal::subscriber_overflow("audit", "full");
        assert!(!tracker.update(&sig).await);
        assert!(tracker.snapshot().await.get("audit").is_none());
    }

    #[test]
    fn only_healthy_is_not_a_failure() {
        assert!(!HealthStatus::Healthy.is_failure());
        assert!(HealthStatus::GeneralFailure.is_failure());
        assert_eq!(HealthStatus::AlgorithmFailure.to_string(), "algorithm_failure");
    }
}
