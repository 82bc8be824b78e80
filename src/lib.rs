//! # nodevisor
//!
//! **Nodevisor** orchestrates a fleet of long-running worker components:
//! it drives their lifecycle, watches their health, reacts to events with
//! validated actions, retries failures within a budget, and can expose
//! processing functions over local sockets.
//!
//! ## Architecture
//! ```text
//!   add_components / add_event / set_fallback / add_external_processor
//!                                 │
//!                                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Launcher (facade)                                                │
//! │  - ComponentRegistry (unique names, topology, handler table)      │
//! │  - EventRegistry (event → ordered actions, validated targets)     │
//! │  - fallback policies, activation set                              │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼ bringup()        ▼                  ▼               ▼
//!  ┌────────────┐   ┌──────────────┐   ┌──────────────┐  ┌─────────────┐
//!  │  Monitor   │   │  Dispatcher  │   │    Launch    │  │ BridgePool  │
//!  │ (health,   │   │ (actions,    │   │  (lifecycle  │  │ (one socket │
//!  │  triggers) │   │  fallbacks)  │   │   backend)   │  │  per func)  │
//!  └─────┬──────┘   └──────┬───────┘   └──────┬───────┘  └──────┬──────┘
//!        │ publish         │ publish          │ publish         │ publish
//!        ▼                 ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                    Bus (broadcast of Signal)                      │
//! └─────┬──────────────────┬──────────────────┬───────────────────────┘
//!       ▼                  ▼                  ▼
//!  HealthTracker     EventRouter        SubscriberSet ──► Subscribe impls
//!  (seq-ordered)   (EventTriggered ──►
//!                   Dispatcher::trigger)
//! ```
//!
//! ### Event flow
//! ```text
//! component ── ComponentContext::report(failure) ──► Bus
//!   ├─► HealthTracker ──► Monitor tick: condition met (edge)
//!   │                        ├─ run supervisor actions
//!   │                        └─ publish EventTriggered(event)
//!   │                              └─► Launch backend ──► Dispatcher::trigger(event)
//!   │                                    └─ actions in order: restart(A), A.reset, ...
//!   └─► fallback listener ──► FallbackEngine::on_failure(A)
//!          ├─ Invoke    ──► run fallback, FallbackInvoked{attempt}
//!          └─ Exhausted ──► FallbackExhausted
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                         |
//! |-------------------|-------------------------------------------------------------|--------------------------------------------|
//! | **Components**    | Worker contract, lifecycle hooks, typed operations          | [`Component`], [`Operations`]              |
//! | **Events**        | Trigger conditions and ordered action lists                 | [`Event`], [`Action`]                      |
//! | **Policies**      | Fallback budgets, trigger admission, backoff                | [`FallbackPolicy`], [`TriggerPolicy`]      |
//! | **Launch**        | Pluggable lifecycle backend                                 | [`Launch`], [`LocalLaunch`]                |
//! | **Bridge**        | Processing functions over local sockets                     | [`Processor`], [`Value`], [`NdArray`]      |
//! | **Observability** | Runtime signals and subscribers                             | [`Signal`], [`Subscribe`]                  |
//! | **Errors**        | Typed errors for setup, dispatch and runtime                | [`ConfigError`], [`OrchestratorError`]     |
//!
//! ## Optional features
//! - `bridge` (default): `postcard` payload serialization for the external processor bridge.
//! - `logging`: exports [`LogWriter`], a subscriber rendering signals with `tracing`.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use nodevisor::{
//!     Action, AddOptions, Component, ComponentContext, ComponentError, Config, Event,
//!     Launcher, Operations, Operation, Topology,
//! };
//!
//! struct Camera;
//!
//! #[async_trait::async_trait]
//! impl Component for Camera {
//!     fn name(&self) -> &str { "camera" }
//!
//!     fn operations(&self) -> Vec<Operation> {
//!         Operations::<Camera>::new()
//!             .fallback("reset", |_cam, _inv| async { Ok(()) })
//!             .build()
//!     }
//!
//!     async fn run(&self, ctx: ComponentContext) -> Result<(), ComponentError> {
//!         ctx.cancelled().await;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut launcher = Launcher::new(Config::default());
//!     launcher
//!         .add_components(
//!             vec![Arc::new(Camera) as _],
//!             Topology::Colocated,
//!             AddOptions::new().event(
//!                 Event::on_failure("camera_down", "camera"),
//!                 [Action::restart("camera")],
//!             ),
//!         )
//!         .await?;
//!     launcher.set_fallback("camera", "reset", Some(3))?;
//!
//!     // Runs until SIGINT/SIGTERM or LauncherHandle::shutdown.
//!     launcher.bringup().await?;
//!     Ok(())
//! }
//! ```

mod actions;
mod bridge;
mod components;
mod core;
mod error;
mod launch;
mod monitor;
mod policies;
mod signals;
mod subscribers;

// ---- Public re-exports ----

pub use actions::{
    ACTIVATE_ALL, Action, ActionFuture, ActionKind, Args, Event, EventEntry, EventRegistry,
    ExternalFn, MonitorContext, MonitorFn, TriggerFn,
};
pub use bridge::{ArrayData, NdArray, Processor, Value, codec};
#[cfg(unix)]
pub use bridge::{BridgeClient, BridgePool, Endpoint, EndpointSpec, endpoint_address};
pub use components::{
    AsAny, Component, ComponentContext, ComponentRef, HandlerTable, Invocation,
    LifecycleHandler, LifecycleState, Operation, OperationFuture, Operations, Param, RunType,
    Signature, Topology, Transition,
};
pub use crate::core::{
    Activation, AddOptions, ComponentRegistry, Config, Dispatcher, DispatcherParams, LaunchEntry,
    Launcher, LauncherBuilder, LauncherHandle, ProcessorTable, TriggerOutcome,
};
pub use error::{
    ActionError, BridgeError, ComponentError, ConfigError, DependencyError, InvalidAction,
    LaunchError, OrchestratorError, RuntimeError,
};
pub use launch::{
    CommandFactory, EventHandler, EventRouter, ExecutableSpec, Launch, LocalLaunch, ProcessSpec,
};
pub use monitor::{
    ComponentHealth, HealthSnapshot, HealthStatus, HealthTracker, Monitor, MonitorState,
    MonitorView,
};
pub use policies::{
    BackoffPolicy, FallbackEngine, FallbackOutcome, FallbackPolicy, JitterPolicy, TriggerPolicy,
};
pub use signals::{Bus, Signal, SignalKind};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: a subscriber rendering signals through `tracing`.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
