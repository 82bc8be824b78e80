//! # Events: named trigger conditions over component health.
//!
//! An [`Event`] has an identity independent of its name. Clones share the
//! identity, so registering the same event value twice appends actions to
//! it, while two separately built events with the same name are duplicates.
//!
//! Triggers are edge-sensitive: the monitor fires an event when its
//! condition turns true and re-arms it once the condition turns false.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::components::LifecycleState;
use crate::monitor::{HealthSnapshot, HealthStatus};
use crate::policies::TriggerPolicy;

static EVENT_ID: AtomicU64 = AtomicU64::new(1);

/// Condition evaluated over a health snapshot.
pub type TriggerFn = Arc<dyn Fn(&HealthSnapshot) -> bool + Send + Sync>;

/// A named event with an optional trigger condition.
#[derive(Clone)]
pub struct Event {
    id: u64,
    name: Arc<str>,
    trigger: Option<TriggerFn>,
    policy: Option<TriggerPolicy>,
}

impl Event {
    /// Event without a condition; it fires only when triggered explicitly.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            id: EVENT_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            trigger: None,
            policy: None,
        }
    }

    /// Sets the trigger condition.
    pub fn when<F>(mut self, condition: F) -> Self
    where
        F: Fn(&HealthSnapshot) -> bool + Send + Sync + 'static,
    {
        self.trigger = Some(Arc::new(condition));
        self
    }

    /// Fires when `component` reports any failure status.
    pub fn on_failure(name: impl Into<Arc<str>>, component: impl Into<String>) -> Self {
        let component = component.into();
        Self::new(name).when(move |snap| snap.is_failed(&component))
    }

    /// Fires when `component` reports exactly `status`.
    pub fn on_status(
        name: impl Into<Arc<str>>,
        component: impl Into<String>,
        status: HealthStatus,
    ) -> Self {
        let component = component.into();
        Self::new(name).when(move |snap| snap.status(&component) == Some(status))
    }

    /// Fires when `component` reaches lifecycle `state`.
    pub fn on_state(
        name: impl Into<Arc<str>>,
        component: impl Into<String>,
        state: LifecycleState,
    ) -> Self {
        let component = component.into();
        Self::new(name).when(move |snap| snap.state(&component) == Some(state))
    }

    /// Overrides the admission policy for concurrent triggers.
    pub fn with_policy(mut self, policy: TriggerPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Identity shared by clones.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Event name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared event name.
    pub fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Admission policy, if set on the event.
    pub fn policy(&self) -> Option<TriggerPolicy> {
        self.policy
    }

    /// True if the event has a condition.
    pub fn has_trigger(&self) -> bool {
        self.trigger.is_some()
    }

    /// Evaluates the condition; events without one never fire on their own.
    pub fn is_met(&self, snapshot: &HealthSnapshot) -> bool {
        self.trigger.as_ref().is_some_and(|t| t(snapshot))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Event {}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("has_trigger", &self.trigger.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}
