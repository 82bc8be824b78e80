//! # Managed component trait.
//!
//! A [`Component`] is a long-running worker supervised by the orchestrator.
//! It declares its name, how it serves ([`RunType`]), the operations actions
//! may invoke on it, and the hooks the launch backend calls on lifecycle
//! transitions.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use nodevisor::{Component, ComponentContext, ComponentError, Operation, Operations};
//!
//! struct Planner;
//!
//! #[async_trait]
//! impl Component for Planner {
//!     fn name(&self) -> &str { "planner" }
//!
//!     fn operations(&self) -> Vec<Operation> {
//!         Operations::<Self>::new()
//!             .fallback("reset", |_me, _inv| async move { Ok(()) })
//!             .build()
//!     }
//!
//!     async fn run(&self, ctx: ComponentContext) -> Result<(), ComponentError> {
//!         while !ctx.is_cancelled() {
//!             tokio::time::sleep(Duration::from_millis(50)).await;
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::operations::Operation;
use crate::error::ComponentError;
use crate::monitor::HealthStatus;
use crate::signals::{Bus, Signal};

/// Shared handle to a component.
pub type ComponentRef = Arc<dyn Component>;

/// Converts a shared component into `Arc<dyn Any>` so typed handlers can downcast it.
///
/// Implemented for every sized `Send + Sync + 'static` type.
pub trait AsAny: Any + Send + Sync {
    /// Erases the concrete type.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// How a component serves its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunType {
    /// Runs on a fixed timer.
    #[default]
    Timed,
    /// Runs when its inputs arrive.
    Event,
    /// Answers requests.
    Server,
    /// Executes long-running goals with feedback.
    ActionServer,
}

/// Where a component runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Topology {
    /// Inside the orchestrator process, driven as an async task.
    #[default]
    Colocated,
    /// In its own process, started from a package entry point.
    Process {
        /// Package providing the executable.
        package: String,
        /// Entry point (executable) inside the package.
        entry_point: String,
    },
}

impl Topology {
    /// Default entry point name.
    pub const DEFAULT_ENTRY_POINT: &'static str = "executable";

    /// Separate process using the default entry point.
    pub fn process(package: impl Into<String>) -> Self {
        Self::process_with_entry(package, Self::DEFAULT_ENTRY_POINT)
    }

    /// Separate process with an explicit entry point.
    pub fn process_with_entry(package: impl Into<String>, entry_point: impl Into<String>) -> Self {
        Topology::Process {
            package: package.into(),
            entry_point: entry_point.into(),
        }
    }

    /// True for [`Topology::Process`].
    #[inline]
    pub fn is_process(&self) -> bool {
        matches!(self, Topology::Process { .. })
    }

    /// False when a process topology lacks its package or entry point.
    pub fn is_complete(&self) -> bool {
        match self {
            Topology::Colocated => true,
            Topology::Process {
                package,
                entry_point,
            } => !package.trim().is_empty() && !entry_point.trim().is_empty(),
        }
    }
}

/// Handle given to a running component.
///
/// Carries the component identity, the signal bus (for health reports) and
/// the cancellation token of the current activation.
#[derive(Clone, Debug)]
pub struct ComponentContext {
    name: Arc<str>,
    bus: Bus,
    token: CancellationToken,
}

impl ComponentContext {
    /// Creates a context for one activation.
    pub fn new(name: impl Into<Arc<str>>, bus: Bus, token: CancellationToken) -> Self {
        Self {
            name: name.into(),
            bus,
            token,
        }
    }

    /// Component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Publishes a health status for this component.
    pub fn report(&self, status: HealthStatus) {
        self.bus.publish(Signal::health(Arc::clone(&self.name), status));
    }

    /// Publishes a failure status with a reason.
    pub fn report_failure(&self, status: HealthStatus, reason: impl Into<Arc<str>>) {
        self.bus
            .publish(Signal::health(Arc::clone(&self.name), status).with_reason(reason));
    }

    /// Cancellation token of this activation.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// True once the component is being deactivated or shut down.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the activation is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// A long-running managed worker.
///
/// Only [`Component::name`] and [`Component::run`] are required. Hooks
/// default to no-ops; `run` is driven between activate and deactivate when
/// the component is co-located.
#[async_trait]
pub trait Component: AsAny + 'static {
    /// Unique name across the orchestrator.
    fn name(&self) -> &str;

    /// Type identity used to key the operation handler table.
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// How the component serves its work.
    fn run_type(&self) -> RunType {
        RunType::Timed
    }

    /// Operations actions may invoke on this component type.
    fn operations(&self) -> Vec<Operation> {
        Vec::new()
    }

    /// Extra arguments passed to the entry point when run as a separate process.
    fn launch_args(&self) -> Vec<String> {
        vec!["--name".to_string(), self.name().to_string()]
    }

    /// Applies a configuration file. The path is not interpreted by the orchestrator.
    async fn configure(&self, _path: &Path) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Hook for `Unconfigured → Inactive`.
    async fn on_configure(&self) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Hook for `Inactive → Active`, called before `run` is started.
    async fn on_activate(&self) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Hook for `Active → Inactive`, called after `run` stopped.
    async fn on_deactivate(&self) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Hook for `→ Finalized`.
    async fn on_shutdown(&self) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Main loop while active. Should return promptly once `ctx` is cancelled.
    async fn run(&self, ctx: ComponentContext) -> Result<(), ComponentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_topology_needs_identity() {
        assert!(Topology::Colocated.is_complete());
        assert!(Topology::process("nav").is_complete());
        assert!(!Topology::process("").is_complete());
        assert!(!Topology::process_with_entry("nav", " ").is_complete());
        assert_eq!(
            Topology::process("nav"),
            Topology::process_with_entry("nav", "executable")
        );
    }

    #[tokio::test]
    async fn context_reports_health_on_bus() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let ctx = ComponentContext::new("lidar", bus.clone(), CancellationToken::new());

        ctx.report_failure(HealthStatus::AlgorithmFailure, "no returns");

        let sig = rx.recv().await.expect("signal");
        assert!(sig.is_failure_report());
        assert_eq!(sig.component.as_deref(), Some("lidar"));
        assert_eq!(sig.reason.as_deref(), Some("no returns"));
    }
}
