//! # Managed lifecycle state machine.
//!
//! ```text
//!               configure            activate
//! Unconfigured ───────────► Inactive ─────────► Active
//!      │                      ▲   │   deactivate  │
//!      │                      │   └───────────────┘ (back to Inactive)
//!      │                      └──────────────────────┘
//!      └──── shutdown (from any non-finalized state) ───► Finalized
//! ```
//!
//! Lifecycle handlers are orchestrator-level actions that expand into a
//! transition sequence executed by the launch backend:
//! - `start`   → configure, activate
//! - `stop`    → deactivate
//! - `restart` → deactivate, activate

use std::fmt;

/// Lifecycle state of a managed component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// Created, not configured yet.
    #[default]
    Unconfigured,
    /// Configured, not running.
    Inactive,
    /// Running.
    Active,
    /// Terminal state.
    Finalized,
}

impl LifecycleState {
    /// Returns the state reached by applying `transition`, or `None` if the
    /// transition is not allowed from this state.
    pub fn next(self, transition: Transition) -> Option<Self> {
        use LifecycleState::*;
        match (self, transition) {
            (Unconfigured, Transition::Configure) => Some(Inactive),
            (Inactive, Transition::Activate) => Some(Active),
            (Active, Transition::Deactivate) => Some(Inactive),
            (Finalized, Transition::Shutdown) => None,
            (_, Transition::Shutdown) => Some(Finalized),
            _ => None,
        }
    }

    /// True for [`LifecycleState::Active`].
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, LifecycleState::Active)
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Unconfigured => "unconfigured",
            LifecycleState::Inactive => "inactive",
            LifecycleState::Active => "active",
            LifecycleState::Finalized => "finalized",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// `Unconfigured → Inactive`.
    Configure,
    /// `Inactive → Active`.
    Activate,
    /// `Active → Inactive`.
    Deactivate,
    /// any non-finalized state `→ Finalized`.
    Shutdown,
}

impl Transition {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Transition::Configure => "configure",
            Transition::Activate => "activate",
            Transition::Deactivate => "deactivate",
            Transition::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orchestrator-level lifecycle handlers available to actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleHandler {
    /// configure, then activate.
    Start,
    /// deactivate.
    Stop,
    /// deactivate, then activate.
    Restart,
}

impl LifecycleHandler {
    /// Every declared handler.
    pub const ALL: [LifecycleHandler; 3] = [
        LifecycleHandler::Start,
        LifecycleHandler::Stop,
        LifecycleHandler::Restart,
    ];

    /// Looks up a handler by its action name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    /// Action name of the handler.
    pub fn name(self) -> &'static str {
        match self {
            LifecycleHandler::Start => "start",
            LifecycleHandler::Stop => "stop",
            LifecycleHandler::Restart => "restart",
        }
    }

    /// Transition sequence requested from the launch backend.
    pub fn transitions(self) -> &'static [Transition] {
        match self {
            LifecycleHandler::Start => &[Transition::Configure, Transition::Activate],
            LifecycleHandler::Stop => &[Transition::Deactivate],
            LifecycleHandler::Restart => &[Transition::Deactivate, Transition::Activate],
        }
    }
}

impl fmt::Display for LifecycleHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
