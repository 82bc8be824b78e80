//! # Per-component fallback budget.
//!
//! Each component may carry a [`FallbackPolicy`]: an action to run when the
//! component reports a failure, and an optional retry budget.
//!
//! ```text
//! failure reported for C
//!   ├─ no policy for C            → Unset
//!   ├─ budget None (unlimited)    → Invoke{action, attempt}
//!   ├─ budget n > 0               → budget = n-1, Invoke{action, attempt}
//!   └─ budget 0                   → Exhausted (inert, failure goes upward)
//! ```
//!
//! Budgets are independent per component; every counter sits behind its own
//! lock, so failures of one component never contend with another.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::actions::Action;

/// Fallback action and retry budget for one component.
#[derive(Clone, Debug)]
pub struct FallbackPolicy {
    /// Action run on each failure while budget remains.
    pub action: Action,
    /// Maximum number of runs; `None` = unlimited.
    pub max_retries: Option<u32>,
}

impl FallbackPolicy {
    /// Creates a policy.
    pub fn new(action: Action, max_retries: Option<u32>) -> Self {
        Self {
            action,
            max_retries,
        }
    }
}

/// Decision for one reported failure.
#[derive(Clone, Debug)]
pub enum FallbackOutcome {
    /// Run `action`; `attempt` counts runs for this component, starting at 1.
    Invoke {
        /// Action to run.
        action: Action,
        /// 1-based run count.
        attempt: u32,
    },
    /// Budget spent; the failure stays unrecovered.
    Exhausted {
        /// Configured budget.
        max_retries: u32,
    },
    /// Component has no fallback.
    Unset,
}

#[derive(Debug)]
struct FallbackState {
    policy: FallbackPolicy,
    remaining: Option<u32>,
    invoked: u32,
}

/// Frozen set of per-component fallback policies with live counters.
#[derive(Debug, Default)]
pub struct FallbackEngine {
    states: HashMap<String, Mutex<FallbackState>>,
}

impl FallbackEngine {
    /// Builds the engine from the configured policies.
    pub fn new(policies: HashMap<String, FallbackPolicy>) -> Self {
        let states = policies
            .into_iter()
            .map(|(name, policy)| {
                let state = FallbackState {
                    remaining: policy.max_retries,
                    invoked: 0,
                    policy,
                };
                (name, Mutex::new(state))
            })
            .collect();
        Self { states }
    }

    /// Consumes one unit of `component`'s budget.
    pub fn on_failure(&self, component: &str) -> FallbackOutcome {
        let Some(slot) = self.states.get(component) else {
            return FallbackOutcome::Unset;
        };
        let mut state = slot.lock().unwrap_or_else(PoisonError::into_inner);

        match state.remaining {
            Some(0) => FallbackOutcome::Exhausted {
                max_retries: state.policy.max_retries.unwrap_or(0),
            },
            Some(n) => {
                state.remaining = Some(n - 1);
                state.invoked += 1;
                FallbackOutcome::Invoke {
                    action: state.policy.action.clone(),
                    attempt: state.invoked,
                }
            }
            None => {
                state.invoked = state.invoked.saturating_add(1);
                FallbackOutcome::Invoke {
                    action: state.policy.action.clone(),
                    attempt: state.invoked,
                }
            }
        }
    }

    /// Number of fallback runs granted to `component` so far.
    pub fn invoked(&self, component: &str) -> u32 {
        self.states
            .get(component)
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).invoked)
            .unwrap_or(0)
    }

    /// True if `component` has a policy.
    pub fn has_policy(&self, component: &str) -> bool {
        self.states.contains_key(component)
    }
}
