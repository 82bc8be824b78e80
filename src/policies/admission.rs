//! # Trigger admission policy.
//!
//! An event is a **slot**: at most one dispatch of its actions runs at a
//! time. When the event fires again while its actions are still running,
//! the policy decides what happens to the new trigger.
//!
//! ## Invariants
//! - Dispatches of the same event never run in parallel.
//! - Queued triggers run strictly in arrival order.

/// What to do with a trigger that arrives while the event is dispatching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TriggerPolicy {
    /// Run the actions again once the current dispatch finishes (FIFO).
    ///
    /// Use when every occurrence matters, e.g. counting failures.
    #[default]
    Queue,

    /// Discard the trigger and publish `TriggerDropped`.
    ///
    /// Use when only the latest state matters, e.g. a restart already in progress.
    DropIfRunning,
}

impl TriggerPolicy {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            TriggerPolicy::Queue => "queue",
            TriggerPolicy::DropIfRunning => "drop_if_running",
        }
    }
}
