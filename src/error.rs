//! Error types used by the orchestrator, its registries and backends.
//!
//! - [`ConfigError`]: setup-time configuration mistakes (fatal, never retried).
//! - [`InvalidAction`]: action targets or operations that cannot be resolved.
//! - [`ActionError`]: failures while running an action.
//! - [`ComponentError`]: failures raised by component hooks and handlers.
//! - [`DependencyError`]: an optional capability is not compiled in.
//! - [`LaunchError`]: failures of the launch backend.
//! - [`BridgeError`]: external processor bridge failures.
//! - [`RuntimeError`]: shutdown failures of the run loop.
//! - [`OrchestratorError`]: umbrella returned by setup and bringup.
//!
//! Every enum provides `as_label` (stable snake_case label for logs).

use std::time::Duration;

use thiserror::Error;

use crate::components::{LifecycleState, Transition};

/// # Configuration errors detected during setup.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two components share a name.
    #[error(
        "duplicate component name '{name}': provide unique names for all components"
    )]
    DuplicateComponent {
        /// The repeated name.
        name: String,
    },

    /// Two distinct events share a name.
    #[error("duplicate event name '{name}': provide unique names for all events")]
    DuplicateEvent {
        /// The repeated name.
        name: String,
    },

    /// An event uses a name reserved by the orchestrator.
    #[error("event name '{name}' is reserved by the orchestrator")]
    ReservedEvent {
        /// The reserved name.
        name: String,
    },

    /// Process topology requested without a package or entry point.
    #[error(
        "cannot run {components:?} in separate processes without a package name and an entry point"
    )]
    MissingProcessIdentity {
        /// Components of the rejected batch.
        components: Vec<String>,
    },

    /// Named component is not registered.
    #[error("component '{name}' is unknown or was not added to the launcher")]
    UnknownComponent {
        /// The missing name.
        name: String,
    },

    /// Operation is not a declared fallback of the component.
    #[error(
        "'{operation}' is not a fallback of component '{component}'; available fallbacks: {available:?}"
    )]
    FallbackUnavailable {
        /// Component name.
        component: String,
        /// Requested operation.
        operation: String,
        /// Fallback operations the component declares.
        available: Vec<String>,
    },

    /// Fallback operation declares required parameters.
    #[error(
        "fallback '{component}.{operation}' requires {required:?}; only operations without required arguments can be set from the launcher"
    )]
    FallbackSignature {
        /// Component name.
        component: String,
        /// Requested operation.
        operation: String,
        /// Required parameter names.
        required: Vec<String>,
    },

    /// Bringup was requested with no components.
    #[error("cannot bring up without components; add at least one component first")]
    NoComponents,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::DuplicateComponent { .. } => "config_duplicate_component",
            ConfigError::DuplicateEvent { .. } => "config_duplicate_event",
            ConfigError::ReservedEvent { .. } => "config_reserved_event",
            ConfigError::MissingProcessIdentity { .. } => "config_missing_process_identity",
            ConfigError::UnknownComponent { .. } => "config_unknown_component",
            ConfigError::FallbackUnavailable { .. } => "config_fallback_unavailable",
            ConfigError::FallbackSignature { .. } => "config_fallback_signature",
            ConfigError::NoComponents => "config_no_components",
        }
    }
}

/// # Action targets or operations that cannot be resolved.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidAction {
    /// Registration referenced a component the registry does not hold.
    #[error(
        "invalid action for event '{event}': component '{component}' is unknown or not added to the launcher"
    )]
    UnknownTarget {
        /// Event being registered.
        event: String,
        /// Missing component.
        component: String,
    },

    /// Operation is not a registered handler.
    #[error("requested action method '{operation}' on '{component}' is not a valid event handler")]
    NotAHandler {
        /// Target component.
        component: String,
        /// Requested operation.
        operation: String,
    },

    /// Dispatch could not find the live component.
    #[error("requested action component '{component}' is unknown")]
    UnknownComponent {
        /// Declared component name.
        component: String,
    },
}

impl InvalidAction {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            InvalidAction::UnknownTarget { .. } => "invalid_action_unknown_target",
            InvalidAction::NotAHandler { .. } => "invalid_action_not_a_handler",
            InvalidAction::UnknownComponent { .. } => "invalid_action_unknown_component",
        }
    }
}

/// # Errors raised by component hooks and operation handlers.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// Execution failed.
    #[error("component failed: {reason}")]
    Failed {
        /// Failure message.
        reason: String,
    },

    /// Applying a configuration file failed.
    #[error("configuration failed: {reason}")]
    Config {
        /// Failure message.
        reason: String,
    },

    /// A required argument was not supplied.
    #[error("missing required argument '{name}'")]
    MissingArgument {
        /// Parameter name.
        name: String,
    },

    /// A handler was invoked on a component of another type.
    #[error("handler expects component type {expected}")]
    TypeMismatch {
        /// Expected Rust type name.
        expected: &'static str,
    },
}

impl ComponentError {
    /// Shorthand for [`ComponentError::Failed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        ComponentError::Failed {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ComponentError::Failed { .. } => "component_failed",
            ComponentError::Config { .. } => "component_config",
            ComponentError::MissingArgument { .. } => "component_missing_argument",
            ComponentError::TypeMismatch { .. } => "component_type_mismatch",
        }
    }
}

/// # Failures while running an action.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ActionError {
    /// Target or operation could not be resolved.
    #[error(transparent)]
    Invalid(#[from] InvalidAction),

    /// The component handler returned an error.
    #[error("action '{operation}' on '{component}' failed: {source}")]
    Component {
        /// Target component.
        component: String,
        /// Operation name.
        operation: String,
        /// Underlying error.
        #[source]
        source: ComponentError,
    },

    /// The launch backend rejected a transition request.
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// A supervisor-level or passthrough action failed.
    #[error("action '{action}' failed: {reason}")]
    Failed {
        /// Action label.
        action: String,
        /// Failure message.
        reason: String,
    },
}

impl ActionError {
    /// Shorthand for [`ActionError::Failed`].
    pub fn failed(action: impl Into<String>, reason: impl Into<String>) -> Self {
        ActionError::Failed {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ActionError::Invalid(e) => e.as_label(),
            ActionError::Component { .. } => "action_component_failed",
            ActionError::Launch(e) => e.as_label(),
            ActionError::Failed { .. } => "action_failed",
        }
    }
}

/// # An optional capability is not available.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    /// Capability not compiled in.
    #[error("{capability} is not available: {remedy}")]
    Unavailable {
        /// Missing capability.
        capability: &'static str,
        /// How to fix it.
        remedy: &'static str,
    },
}

impl DependencyError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DependencyError::Unavailable { .. } => "dependency_unavailable",
        }
    }
}

/// # Launch backend failures.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The backend holds no unit with this name.
    #[error("launch backend has no unit named '{name}'")]
    UnknownUnit {
        /// Unit name.
        name: String,
    },

    /// A unit with this name was already handed to the backend.
    #[error("unit '{name}' was already launched")]
    AlreadyLaunched {
        /// Unit name.
        name: String,
    },

    /// Transition not allowed from the current state.
    #[error("cannot {transition} '{component}' while {from}")]
    InvalidTransition {
        /// Component name.
        component: String,
        /// State before the transition.
        from: LifecycleState,
        /// Rejected transition.
        transition: Transition,
    },

    /// A lifecycle hook failed.
    #[error("'{component}' failed to {transition}: {source}")]
    Hook {
        /// Component name.
        component: String,
        /// Transition being applied.
        transition: Transition,
        /// Underlying error.
        #[source]
        source: ComponentError,
    },

    /// Spawning a process failed.
    #[error("failed to spawn process for '{component}': {source}")]
    Spawn {
        /// Component name.
        component: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl LaunchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LaunchError::UnknownUnit { .. } => "launch_unknown_unit",
            LaunchError::AlreadyLaunched { .. } => "launch_already_launched",
            LaunchError::InvalidTransition { .. } => "launch_invalid_transition",
            LaunchError::Hook { .. } => "launch_hook_failed",
            LaunchError::Spawn { .. } => "launch_spawn_failed",
        }
    }
}

/// # External processor bridge failures.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Socket I/O failed.
    #[error("bridge i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization capability missing.
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    /// Value could not be encoded.
    #[error("failed to encode payload: {reason}")]
    Encode {
        /// Encoder message.
        reason: String,
    },

    /// Payload could not be decoded.
    #[error("failed to decode payload: {reason}")]
    Decode {
        /// Decoder message.
        reason: String,
    },

    /// Array shape does not match its element count.
    #[error("array shape {shape:?} needs {expected} elements, got {actual}")]
    Shape {
        /// Declared shape.
        shape: Vec<usize>,
        /// Elements implied by the shape.
        expected: usize,
        /// Elements supplied.
        actual: usize,
    },

    /// Element count implied by the shape does not fit in `usize`.
    #[error("array shape {shape:?} overflows the element count")]
    ShapeOverflow {
        /// Declared shape.
        shape: Vec<usize>,
    },

    /// Peer closed the connection before replying.
    #[error("bridge connection closed")]
    Closed,
}

impl BridgeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BridgeError::Io(_) => "bridge_io",
            BridgeError::Dependency(e) => e.as_label(),
            BridgeError::Encode { .. } => "bridge_encode",
            BridgeError::Decode { .. } => "bridge_decode",
            BridgeError::Shape { .. } => "bridge_shape",
            BridgeError::ShapeOverflow { .. } => "bridge_shape_overflow",
            BridgeError::Closed => "bridge_closed",
        }
    }
}

/// # Errors produced by the run loop itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some components were still active.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Components still active when the grace period ran out.
        stuck: Vec<String>,
    },

    /// The launch backend's run task panicked or was aborted.
    #[error("launch backend crashed: {reason}")]
    BackendCrashed {
        /// Join failure message.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::BackendCrashed { .. } => "runtime_backend_crashed",
        }
    }
}

/// # Umbrella error for setup and bringup.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Configuration mistake.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unresolvable action.
    #[error(transparent)]
    InvalidAction(#[from] InvalidAction),

    /// Action failure.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Component hook failure (e.g. configuration file rejected).
    #[error("component '{component}': {source}")]
    Component {
        /// Component name.
        component: String,
        /// Underlying error.
        #[source]
        source: ComponentError,
    },

    /// Missing optional capability.
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    /// Launch backend failure.
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// Bridge failure.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// Run loop failure.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl OrchestratorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            OrchestratorError::Config(e) => e.as_label(),
            OrchestratorError::InvalidAction(e) => e.as_label(),
            OrchestratorError::Action(e) => e.as_label(),
            OrchestratorError::Component { source, .. } => source.as_label(),
            OrchestratorError::Dependency(e) => e.as_label(),
            OrchestratorError::Launch(e) => e.as_label(),
            OrchestratorError::Bridge(e) => e.as_label(),
            OrchestratorError::Runtime(e) => e.as_label(),
        }
    }
}
