//! # Runtime signals emitted by the orchestrator, monitor and launch backend.
//!
//! The [`SignalKind`] enum classifies notifications across five groups:
//! - **Lifecycle**: launches and transition requests/outcomes
//! - **Health**: status reports from components
//! - **Events**: internal event triggers and their dispatch
//! - **Fallback**: recovery invocations and exhaustion
//! - **Bridge / runtime**: IPC endpoint activity, shutdown progress, subscriber faults
//!
//! ## Ordering guarantees
//! Each signal has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore order when signals are observed out of order.
//!
//! ## Example
//! ```rust
//! use nodevisor::{HealthStatus, Signal, SignalKind};
//!
//! let sig = Signal::new(SignalKind::HealthReported)
//!     .with_component("planner")
//!     .with_status(HealthStatus::ComponentFailure)
//!     .with_reason("map server unreachable");
//!
//! assert_eq!(sig.component.as_deref(), Some("planner"));
//! assert!(sig.is_failure_report());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::components::{LifecycleState, Transition};
use crate::monitor::HealthStatus;

/// Reason carried by notifications requested through the launcher handle.
const MANUAL_TRIGGER: &str = "manual";

/// Global sequence counter for signal ordering.
static SIGNAL_SEQ: AtomicU64 = AtomicU64::new(1);

/// Classification of runtime signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    // === Subscriber faults ===
    /// Subscriber panicked while handling a signal.
    ///
    /// Sets: `component` (subscriber name), `reason` (panic message).
    SubscriberPanicked,

    /// Subscriber dropped a signal (queue full or worker closed).
    ///
    /// Sets: `component` (subscriber name), `reason`.
    SubscriberOverflow,

    // === Runtime ===
    /// Bringup finished wiring every listener; the run loop is about to start.
    Ready,

    /// Shutdown requested (OS signal or handle).
    ShutdownRequested,

    /// Every unit stopped within the configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some components did not stop in time.
    GraceExceeded,

    // === Lifecycle ===
    /// A unit was handed to the launch backend.
    ///
    /// Sets: `component`, `reason` (`"process"` or `"colocated"`).
    ComponentLaunched,

    /// A lifecycle transition was requested for a component.
    ///
    /// Sets: `component`, `transition`.
    TransitionRequested,

    /// A lifecycle transition completed.
    ///
    /// Sets: `component`, `transition`, `state` (state after the transition).
    TransitionApplied,

    /// A lifecycle transition was rejected or failed.
    ///
    /// Sets: `component`, `transition`, `reason`.
    TransitionFailed,

    // === Health ===
    /// A component reported its health status.
    ///
    /// Sets: `component`, `status`, optionally `reason`.
    HealthReported,

    // === Events ===
    /// Internal event notification: the named event fired.
    ///
    /// Sets: `event`.
    EventTriggered,

    /// All orchestrator-side actions of one trigger finished.
    ///
    /// Sets: `event`, `reason` when an action failed.
    EventDispatched,

    /// A trigger arrived while the event was still dispatching and was discarded.
    ///
    /// Sets: `event`.
    TriggerDropped,

    /// An action failed during dispatch.
    ///
    /// Sets: `event`, `component` (if targeted), `reason`.
    ActionFailed,

    // === Fallback ===
    /// A fallback action ran for a failed component.
    ///
    /// Sets: `component`, `attempt` (1-based invocation count), `reason` on action error.
    FallbackInvoked,

    /// A failure arrived after the retry budget was spent (unrecovered failure).
    ///
    /// Sets: `component`, `attempt` (the configured budget).
    FallbackExhausted,

    // === Bridge ===
    /// An external processor endpoint is listening.
    ///
    /// Sets: `component`, `address`.
    BridgeListening,

    /// A peer connected to an endpoint.
    ///
    /// Sets: `component`, `address`.
    BridgeConnected,

    /// The peer disconnected; the endpoint resets and accepts again.
    ///
    /// Sets: `component`, `address`.
    BridgeDisconnected,

    /// An endpoint hit an I/O, framing or processor error.
    ///
    /// Sets: `component`, `address`, `reason`.
    BridgeError,
}

/// Runtime signal with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other fields are set depending on the [`SignalKind`]
#[derive(Clone, Debug)]
pub struct Signal {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Signal classification.
    pub kind: SignalKind,

    /// Component (or subscriber) name, if applicable.
    pub component: Option<Arc<str>>,
    /// Event name, if applicable.
    pub event: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Attempt or invocation count.
    pub attempt: Option<u32>,
    /// Lifecycle transition, if applicable.
    pub transition: Option<Transition>,
    /// Lifecycle state after a transition.
    pub state: Option<LifecycleState>,
    /// Reported health status.
    pub status: Option<HealthStatus>,
    /// Bridge endpoint address.
    pub address: Option<Arc<str>>,
}

impl Signal {
    /// Creates a new signal of the given kind with current timestamp and next sequence number.
    pub fn new(kind: SignalKind) -> Self {
        Self {
            seq: SIGNAL_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            component: None,
            event: None,
            reason: None,
            attempt: None,
            transition: None,
            state: None,
            status: None,
            address: None,
        }
    }

    /// Attaches a component name.
    #[inline]
    pub fn with_component(mut self, component: impl Into<Arc<str>>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Attaches an event name.
    #[inline]
    pub fn with_event(mut self, event: impl Into<Arc<str>>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a lifecycle transition.
    #[inline]
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Attaches the lifecycle state reached by a transition.
    #[inline]
    pub fn with_state(mut self, state: LifecycleState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a health status.
    #[inline]
    pub fn with_status(mut self, status: HealthStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches a bridge endpoint address.
    #[inline]
    pub fn with_address(mut self, address: impl Into<Arc<str>>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Creates a health report signal.
    #[inline]
    pub fn health(component: impl Into<Arc<str>>, status: HealthStatus) -> Self {
        Signal::new(SignalKind::HealthReported)
            .with_component(component)
            .with_status(status)
    }

    /// Creates an internal event notification.
    #[inline]
    pub fn triggered(event: impl Into<Arc<str>>) -> Self {
        Signal::new(SignalKind::EventTriggered).with_event(event)
    }

    /// Creates an internal event notification requested by hand rather than
    /// by a met condition. The monitor runs the event's monitor actions for it.
    #[inline]
    pub fn manual_trigger(event: impl Into<Arc<str>>) -> Self {
        Signal::triggered(event).with_reason(MANUAL_TRIGGER)
    }

    /// Creates a subscriber overflow signal.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Signal::new(SignalKind::SubscriberOverflow)
            .with_component(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic signal.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Signal::new(SignalKind::SubscriberPanicked)
            .with_component(subscriber)
            .with_reason(info)
    }

    /// True for health reports carrying a failure status.
    #[inline]
    pub fn is_failure_report(&self) -> bool {
        self.kind == SignalKind::HealthReported && self.status.is_some_and(|s| s.is_failure())
    }

    /// True for notifications created by [`Signal::manual_trigger`].
    #[inline]
    pub fn is_manual_trigger(&self) -> bool {
        self.kind == SignalKind::EventTriggered && self.reason.as_deref() == Some(MANUAL_TRIGGER)
    }

    /// True if this is the internal notification for `event`.
    #[inline]
    pub fn is_trigger_for(&self, event: &str) -> bool {
        self.kind == SignalKind::EventTriggered && self.event.as_deref() == Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Signal::new(SignalKind::Ready);
        let b = Signal::new(SignalKind::Ready);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn healthy_report_is_not_a_failure() {
        assert!(!Signal::health("a", HealthStatus::Healthy).is_failure_report());
        assert!(Signal::health("a", HealthStatus::SystemFailure).is_failure_report());
        assert!(!Signal::triggered("e").is_failure_report());
    }

    #[test]
    fn trigger_matches_event_name() {
        let sig = Signal::triggered("low_battery");
        assert!(sig.is_trigger_for("low_battery"));
        assert!(!sig.is_trigger_for("other"));
        assert!(!sig.is_manual_trigger());

        let manual = Signal::manual_trigger("low_battery");
        assert!(manual.is_trigger_for("low_battery"));
        assert!(manual.is_manual_trigger());
    }
}
