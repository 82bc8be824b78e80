//! # Deferred invocations attached to events.
//!
//! | kind           | target                       | executed by    |
//! |----------------|------------------------------|----------------|
//! | `Orchestrator` | lifecycle handler of a component (`start`/`stop`/`restart`) | dispatcher |
//! | `Component`    | named operation of a component | dispatcher   |
//! | `Supervisor`   | closure over the health snapshot | monitor    |
//! | `Passthrough`  | opaque external closure      | dispatcher     |
//!
//! Targets are names, resolved again at every dispatch.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::info;

use super::args::Args;
use crate::components::LifecycleHandler;
use crate::error::ActionError;
use crate::monitor::HealthSnapshot;
use crate::signals::Bus;

/// Boxed future of a closure-backed action.
pub type ActionFuture = BoxFuture<'static, Result<(), ActionError>>;

/// Supervisor-level action body.
pub type MonitorFn = Arc<dyn Fn(MonitorContext) -> ActionFuture + Send + Sync>;

/// Passthrough action body.
pub type ExternalFn = Arc<dyn Fn() -> ActionFuture + Send + Sync>;

/// What a supervisor-level action can see.
#[derive(Clone, Debug)]
pub struct MonitorContext {
    /// Event that fired.
    pub event: Arc<str>,
    /// Health at the time the event fired.
    pub snapshot: HealthSnapshot,
    /// Signal bus.
    pub bus: Bus,
}

/// Classification of an [`Action`] by target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Lifecycle handler executed through the launch backend.
    Orchestrator,
    /// Operation of a component.
    Component,
    /// Executed by the monitor.
    Supervisor,
    /// Opaque closure handed through as-is.
    Passthrough,
}

/// A deferred invocation.
#[derive(Clone)]
pub enum Action {
    /// Orchestrator-level lifecycle handler.
    Lifecycle {
        /// Target component name.
        component: String,
        /// Handler name (`start`, `stop`, `restart`).
        handler: String,
    },
    /// Component-local operation.
    Component {
        /// Target component name.
        component: String,
        /// Operation name in the handler table.
        operation: String,
        /// Call arguments.
        args: Args,
    },
    /// Supervisor-level closure.
    Supervisor {
        /// Label for logs.
        name: String,
        /// Body.
        run: MonitorFn,
    },
    /// Passthrough closure.
    External {
        /// Label for logs.
        name: String,
        /// Body.
        run: ExternalFn,
    },
}

impl Action {
    /// `start`: configure then activate `component`.
    pub fn start(component: impl Into<String>) -> Self {
        Self::lifecycle(component, LifecycleHandler::Start)
    }

    /// `stop`: deactivate `component`.
    pub fn stop(component: impl Into<String>) -> Self {
        Self::lifecycle(component, LifecycleHandler::Stop)
    }

    /// `restart`: deactivate then activate `component`.
    pub fn restart(component: impl Into<String>) -> Self {
        Self::lifecycle(component, LifecycleHandler::Restart)
    }

    fn lifecycle(component: impl Into<String>, handler: LifecycleHandler) -> Self {
        Action::Lifecycle {
            component: component.into(),
            handler: handler.name().to_string(),
        }
    }

    /// Orchestrator-level handler by name. Unknown names are rejected at registration.
    pub fn orchestrator(component: impl Into<String>, handler: impl Into<String>) -> Self {
        Action::Lifecycle {
            component: component.into(),
            handler: handler.into(),
        }
    }

    /// Component operation without arguments.
    pub fn component(component: impl Into<String>, operation: impl Into<String>) -> Self {
        Action::Component {
            component: component.into(),
            operation: operation.into(),
            args: Args::new(),
        }
    }

    /// Replaces the arguments of a component operation. Other kinds are unchanged.
    pub fn with_args(mut self, new_args: Args) -> Self {
        if let Action::Component { args, .. } = &mut self {
            *args = new_args;
        }
        self
    }

    /// Supervisor-level action.
    pub fn supervisor<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(MonitorContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        Action::Supervisor {
            name: name.into(),
            run: Arc::new(move |ctx| f(ctx).boxed()),
        }
    }

    /// Supervisor-level action that logs `message` with the event name.
    pub fn log(message: impl Into<String>) -> Self {
        let message: Arc<str> = Arc::from(message.into());
        Action::supervisor("log", move |ctx: MonitorContext| {
            let message = Arc::clone(&message);
            async move {
                info!(event = %ctx.event, "{message}");
                Ok(())
            }
        })
    }

    /// Passthrough action.
    pub fn external<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        Action::External {
            name: name.into(),
            run: Arc::new(move || f().boxed()),
        }
    }

    /// Classification by target.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Lifecycle { .. } => ActionKind::Orchestrator,
            Action::Component { .. } => ActionKind::Component,
            Action::Supervisor { .. } => ActionKind::Supervisor,
            Action::External { .. } => ActionKind::Passthrough,
        }
    }

    /// Target component, for orchestrator and component actions.
    pub fn target(&self) -> Option<&str> {
        match self {
            Action::Lifecycle { component, .. } | Action::Component { component, .. } => {
                Some(component.as_str())
            }
            Action::Supervisor { .. } | Action::External { .. } => None,
        }
    }

    /// True if the monitor executes this action.
    pub fn is_monitor_action(&self) -> bool {
        matches!(self, Action::Supervisor { .. })
    }

    /// Short description for logs, e.g. `restart(planner)`.
    pub fn label(&self) -> String {
        match self {
            Action::Lifecycle { component, handler } => format!("{handler}({component})"),
            Action::Component {
                component,
                operation,
                ..
            } => format!("{component}.{operation}"),
            Action::Supervisor { name, .. } | Action::External { name, .. } => name.clone(),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Lifecycle { component, handler } => f
                .debug_struct("Lifecycle")
                .field("component", component)
                .field("handler", handler)
                .finish(),
            Action::Component {
                component,
                operation,
                args,
            } => f
                .debug_struct("Component")
                .field("component", component)
                .field("operation", operation)
                .field("args", args)
                .finish(),
            Action::Supervisor { name, .. } => f
                .debug_struct("Supervisor")
                .field("name", name)
                .finish_non_exhaustive(),
            Action::External { name, .. } => f
                .debug_struct("External")
                .field("name", name)
                .finish_non_exhaustive(),
        }
    }
}
