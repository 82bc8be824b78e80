//! # Launcher: composes the registries and drives bringup.
//!
//! The [`Launcher`] is the public facade. Setup is single-threaded and
//! validates everything before anything runs; bringup freezes the
//! registries and hands them to the runtime units.
//!
//! ## Setup
//! ```text
//! add_components(batch, topology, opts)
//!   ├─ ComponentRegistry::register   (unique names, complete topology)
//!   ├─ configure(config_file)        (if Config::config_file is set)
//!   ├─ activation set += opts.activation
//!   └─ EventRegistry::register       (only with Config::enable_monitoring)
//! set_fallback / set_fallback_action / on_fail  → fallback policies
//! set_fallback_interval                         → spacing of fallback attempts
//! add_external_processor                        → bridge endpoints (process components)
//! add_executable                                → plain programs started at bringup
//! add_task                                      → async tasks started at bringup
//! ```
//!
//! ## Bringup
//! ```text
//! bringup():
//!   no components?                  → ConfigError::NoComponents
//!   Monitor::new(view, events)      → duplicate/reserved event names fail here
//!   bridge: ensure_available → bind every endpoint → BridgePool
//!   Dispatcher + one event handler per event (and activate_all) on the backend
//!   listeners: health tracker, fallback, subscribers
//!   backend.spawn_* for the launch group and the executables
//!     └─ failure → backend finalizes what it holds, listeners and bridge stopped, Err
//!   publish Ready, spawn the tasks
//!   spawn Monitor::run (emits activate_all)
//!   select:
//!     backend.run() returns           → tear down
//!     OS signal | LauncherHandle::shutdown
//!         └─► ShutdownRequested, cancel runtime token
//!             wait for the backend up to Config::grace:
//!               ├─ stopped in time → AllStoppedWithin
//!               └─ timeout         → GraceExceeded, RuntimeError::GraceExceeded{stuck}
//!   tasks joined (aborted after Config::grace), bridge pool drained, subscribers drained
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::broadcast;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::builder::LauncherBuilder;
use super::config::Config;
use super::dispatch::{Dispatcher, DispatcherParams};
use super::registry::{ComponentRegistry, LaunchEntry};
use super::shutdown;
use crate::actions::{Action, Event, EventRegistry};
use crate::bridge::Processor;
use crate::components::{ComponentRef, OperationFuture, Topology};
use crate::error::{ComponentError, ConfigError, LaunchError, OrchestratorError, RuntimeError};
use crate::launch::{ExecutableSpec, Launch};
use crate::monitor::{HealthStatus, HealthTracker, Monitor};
use crate::policies::{FallbackEngine, FallbackPolicy};
use crate::signals::{Bus, Signal, SignalKind};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Which members of an added batch `activate_all` starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Activation {
    /// Every member.
    #[default]
    All,
    /// None; they stay unconfigured until an action starts them.
    None,
    /// Only the named members.
    Only(Vec<String>),
}

/// Options for [`Launcher::add_components`].
#[derive(Debug, Default)]
pub struct AddOptions {
    /// Members started on bringup.
    pub activation: Activation,
    /// Events registered together with the batch.
    pub events: Vec<(Event, Vec<Action>)>,
}

impl AddOptions {
    /// Default options: activate every member, no events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the activation of the batch.
    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Adds an event with its actions.
    pub fn event(mut self, event: Event, actions: impl IntoIterator<Item = Action>) -> Self {
        self.events.push((event, actions.into_iter().collect()));
        self
    }
}

/// Cloneable handle to a launcher, usable before and during bringup.
#[derive(Clone, Debug)]
pub struct LauncherHandle {
    bus: Bus,
    token: CancellationToken,
}

impl LauncherHandle {
    /// Fires the internal event `event` by hand.
    ///
    /// The monitor runs the event's monitor actions and the dispatcher its
    /// orchestrator actions, as when its condition is met.
    pub fn trigger(&self, event: &str) {
        self.bus.publish(Signal::manual_trigger(event));
    }

    /// Publishes a health report for `component`.
    pub fn report(&self, component: &str, status: HealthStatus) {
        self.bus.publish(Signal::health(component, status));
    }

    /// Publishes a failure report with a reason.
    pub fn report_failure(&self, component: &str, status: HealthStatus, reason: &str) {
        self.bus
            .publish(Signal::health(component, status).with_reason(reason));
    }

    /// Subscribes to the signal bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.bus.subscribe()
    }

    /// Requests a graceful shutdown of a running bringup.
    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

/// Deferred async task started at bringup.
type Task = Box<dyn FnOnce(CancellationToken) -> OperationFuture + Send>;

/// Orchestrator facade.
pub struct Launcher {
    cfg: Config,
    bus: Bus,
    launch: Arc<dyn Launch>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    shutdown: CancellationToken,

    components: ComponentRegistry,
    events: EventRegistry,
    activation: Vec<String>,
    fallbacks: HashMap<String, FallbackPolicy>,
    executables: Vec<ExecutableSpec>,
    tasks: Vec<(String, Task)>,
}

impl Launcher {
    /// Launcher with the local launch backend and no subscribers.
    pub fn new(cfg: Config) -> Self {
        LauncherBuilder::new(cfg).build()
    }

    /// Returns a builder for a launcher with custom collaborators.
    pub fn builder(cfg: Config) -> LauncherBuilder {
        LauncherBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: Config,
        bus: Bus,
        launch: Arc<dyn Launch>,
        subscribers: Vec<Arc<dyn Subscribe>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            bus,
            launch,
            subscribers,
            shutdown,
            components: ComponentRegistry::new(),
            events: EventRegistry::new(),
            activation: Vec::new(),
            fallbacks: HashMap::new(),
            executables: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Registered components.
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Registered events.
    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// Members of the activation set, in order.
    pub fn activation(&self) -> &[String] {
        &self.activation
    }

    /// Executables started at bringup, in order.
    pub fn executables(&self) -> &[ExecutableSpec] {
        &self.executables
    }

    /// Minimum spacing between fallback attempts of one component.
    pub fn fallback_interval(&self) -> Duration {
        self.cfg.fallback_interval
    }

    /// Handle for triggering events, reporting health and stopping the run.
    pub fn handle(&self) -> LauncherHandle {
        LauncherHandle {
            bus: self.bus.clone(),
            token: self.shutdown.clone(),
        }
    }

    /// Adds a batch of components sharing one topology.
    ///
    /// With a configuration file set, every member is configured with it
    /// immediately. Events in `opts` are ignored when monitoring is disabled.
    pub async fn add_components(
        &mut self,
        components: Vec<ComponentRef>,
        topology: Topology,
        opts: AddOptions,
    ) -> Result<(), OrchestratorError> {
        let names: Vec<String> = components.iter().map(|c| c.name().to_string()).collect();
        let activate = match opts.activation {
            Activation::All => names.clone(),
            Activation::None => Vec::new(),
            Activation::Only(only) => {
                if let Some(missing) = only.iter().find(|n| !names.contains(*n)) {
                    return Err(ConfigError::UnknownComponent {
                        name: missing.clone(),
                    }
                    .into());
                }
                only
            }
        };

        self.components.register(components.clone(), topology)?;
        debug!(components = ?names, "components added");

        if let Some(path) = self.cfg.config_file.clone() {
            for c in &components {
                configure_one(c, &path).await?;
            }
        }

        for name in activate {
            if !self.activation.contains(&name) {
                self.activation.push(name);
            }
        }

        for (event, actions) in opts.events {
            self.add_event(&event, actions)?;
        }
        Ok(())
    }

    /// Registers `actions` for `event`.
    ///
    /// Ignored (with a warning) when monitoring is disabled.
    pub fn add_event(
        &mut self,
        event: &Event,
        actions: impl IntoIterator<Item = Action>,
    ) -> Result<(), OrchestratorError> {
        if !self.cfg.enable_monitoring {
            warn!(event = %event.name(), "monitoring disabled, event ignored");
            return Ok(());
        }
        self.events.register(event, actions, &self.components)?;
        Ok(())
    }

    /// Exposes `processor` of `component` under `key` over the bridge.
    pub fn add_external_processor(
        &mut self,
        component: &str,
        key: &str,
        processor: Processor,
    ) -> Result<(), ConfigError> {
        self.components.add_processor(component, key, processor)
    }

    /// Runs `program` with `args` as a separate process at bringup.
    ///
    /// Executables have no lifecycle: they are not part of the activation
    /// set, take no actions and are stopped when the backend finalizes.
    pub fn add_executable<I, S>(
        &mut self,
        name: &str,
        program: &str,
        args: I,
    ) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.components.resolve(name).is_ok() || self.executables.iter().any(|e| e.name == name)
        {
            return Err(ConfigError::DuplicateComponent {
                name: name.to_string(),
            });
        }
        self.executables.push(ExecutableSpec {
            name: name.to_string(),
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        });
        debug!(executable = name, program, "executable added");
        Ok(())
    }

    /// Spawns `task` at bringup, once the launch group is handed over.
    ///
    /// The token is cancelled on shutdown; tasks still running after
    /// [`Config::grace`] are aborted. A task returning `Err` is reported as
    /// `ActionFailed` with the task name as event.
    pub fn add_task<F, Fut>(&mut self, name: &str, task: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), ComponentError>> + Send + 'static,
    {
        let task: Task = Box::new(move |token| task(token).boxed());
        self.tasks.push((name.to_string(), task));
    }

    /// Spaces fallback attempts of each component by at least `interval`.
    ///
    /// Failure reports arriving sooner after an attempt are ignored.
    /// `Duration::ZERO` handles every report.
    pub fn set_fallback_interval(&mut self, interval: Duration) {
        self.cfg.fallback_interval = interval;
    }

    /// Uses the fallback operation `operation` of `component` on failures.
    ///
    /// The operation must be declared fallback-eligible and take no required
    /// arguments. `max_retries = None` means unlimited.
    pub fn set_fallback(
        &mut self,
        component: &str,
        operation: &str,
        max_retries: Option<u32>,
    ) -> Result<(), ConfigError> {
        let kind = self.components.resolve(component)?.kind();
        let handlers = self.components.handlers();
        let op = handlers
            .get(kind, operation)
            .filter(|op| op.is_fallback())
            .ok_or_else(|| ConfigError::FallbackUnavailable {
                component: component.to_string(),
                operation: operation.to_string(),
                available: handlers.fallbacks(kind),
            })?;

        let required = op.signature().required();
        if !required.is_empty() {
            return Err(ConfigError::FallbackSignature {
                component: component.to_string(),
                operation: operation.to_string(),
                required,
            });
        }

        self.fallbacks.insert(
            component.to_string(),
            FallbackPolicy::new(Action::component(component, operation), max_retries),
        );
        Ok(())
    }

    /// Uses an arbitrary pre-built action as the fallback of `component`.
    pub fn set_fallback_action(
        &mut self,
        component: &str,
        action: Action,
        max_retries: Option<u32>,
    ) -> Result<(), ConfigError> {
        self.components.resolve(component)?;
        if let Some(target) = action.target() {
            self.components.resolve(target)?;
        }
        self.fallbacks.insert(
            component.to_string(),
            FallbackPolicy::new(action, max_retries),
        );
        Ok(())
    }

    /// Applies [`set_fallback`](Self::set_fallback) to every registered component.
    ///
    /// Stops at the first component lacking the operation.
    pub fn on_fail(&mut self, operation: &str, max_retries: Option<u32>) -> Result<(), ConfigError> {
        for name in self.components.names() {
            self.set_fallback(&name, operation, max_retries)?;
        }
        Ok(())
    }

    /// Configures the component `name`, or every component, with `path`.
    pub async fn configure(&self, path: &Path, name: Option<&str>) -> Result<(), OrchestratorError> {
        match name {
            Some(name) => configure_one(self.components.resolve(name)?, path).await,
            None => {
                for c in self.components.components() {
                    configure_one(c, path).await?;
                }
                Ok(())
            }
        }
    }

    /// Brings every component up and runs until shutdown.
    ///
    /// Returns once the launch backend stopped and the bridge and subscribers
    /// are drained.
    pub async fn bringup(self) -> Result<(), OrchestratorError> {
        if self.components.is_empty() {
            return Err(ConfigError::NoComponents.into());
        }

        let Launcher {
            cfg,
            bus,
            launch,
            subscribers,
            shutdown: shutdown_token,
            components,
            events,
            activation,
            fallbacks,
            executables,
            tasks,
        } = self;

        let health = Arc::new(HealthTracker::with_components(components.names()));
        let monitor = Monitor::new(
            components.monitor_view(activation.clone()),
            &events,
            Arc::clone(&health),
            bus.clone(),
            cfg.enable_monitoring,
        )?;

        let runtime = CancellationToken::new();
        let observers = CancellationToken::new();
        let bridge = bridge::start(&cfg, &components, &bus, &runtime)?;

        let dispatcher = Arc::new(Dispatcher::new(
            DispatcherParams {
                components: components.components().cloned().collect(),
                handlers: components.handlers().clone(),
                events,
                activation,
                default_policy: cfg.trigger_policy,
                fallback: FallbackEngine::new(fallbacks),
                fallback_interval: cfg.fallback_interval,
            },
            Arc::clone(&launch),
            bus.clone(),
            Arc::clone(&health),
        ));
        for event in dispatcher.events() {
            let d = Arc::clone(&dispatcher);
            launch.register_event_handler(
                &event,
                Arc::new(move |name: &str| {
                    d.trigger(name);
                }),
            );
        }
        launch.attach(bus.clone());

        let launch_rx = bus.subscribe();
        let background = Background {
            health_listener: spawn_health_listener(
                bus.subscribe(),
                Arc::clone(&health),
                observers.clone(),
            ),
            subscriber_listener: spawn_subscriber_listener(
                bus.subscribe(),
                SubscriberSet::new(subscribers, bus.clone()),
                observers.clone(),
            ),
            fallback_listener: dispatcher.spawn_fallback_listener(bus.subscribe(), runtime.clone()),
            bridge,
            runtime: runtime.clone(),
            observers,
        };

        if let Err(e) = hand_over(&*launch, &components, executables, &cfg.log_level).await {
            warn!(error = %e, "launch group rejected, tearing down");
            runtime.cancel();
            if let Err(err) = launch.run(launch_rx, runtime.clone()).await {
                warn!(error = %err, "launch backend failed to finalize");
            }
            background.stop().await;
            return Err(e);
        }
        bus.publish(Signal::new(SignalKind::Ready));

        let mut task_set = JoinSet::new();
        for (name, task) in tasks {
            let fut = task(runtime.child_token());
            let bus = bus.clone();
            task_set.spawn(async move {
                match fut.await {
                    Ok(()) => debug!(task = %name, "task finished"),
                    Err(e) => {
                        warn!(task = %name, error = %e, "task failed");
                        bus.publish(
                            Signal::new(SignalKind::ActionFailed)
                                .with_event(name)
                                .with_reason(e.to_string()),
                        );
                    }
                }
            });
        }

        let monitor_task = tokio::spawn(monitor.run(cfg.health_interval_opt(), runtime.child_token()));

        let mut run: JoinHandle<Result<(), LaunchError>> = {
            let launch = Arc::clone(&launch);
            let token = runtime.clone();
            tokio::spawn(async move { launch.run(launch_rx, token).await })
        };

        let result = tokio::select! {
            res = &mut run => {
                runtime.cancel();
                backend_result(res)
            }
            _ = shutdown_requested(&shutdown_token) => {
                bus.publish(Signal::new(SignalKind::ShutdownRequested));
                runtime.cancel();
                wait_all_with_grace(&cfg, &bus, &health, &mut run).await
            }
        };

        if let Err(e) = monitor_task.await {
            warn!("monitor ended abnormally: {e}");
        }
        join_tasks(task_set, cfg.grace).await;
        background.stop().await;
        info!("all components ended");
        result
    }
}

/// Runtime units started before the launch group is handed over.
struct Background {
    health_listener: JoinHandle<()>,
    subscriber_listener: JoinHandle<()>,
    fallback_listener: JoinHandle<()>,
    bridge: Option<bridge::Pool>,
    runtime: CancellationToken,
    observers: CancellationToken,
}

impl Background {
    /// Stops the fallback listener and the bridge, then drains the observers.
    async fn stop(self) {
        self.runtime.cancel();
        if let Err(e) = self.fallback_listener.await {
            warn!("fallback listener ended abnormally: {e}");
        }
        if let Some(pool) = self.bridge {
            pool.shutdown().await;
        }

        self.observers.cancel();
        let _ = self.health_listener.await;
        let _ = self.subscriber_listener.await;
    }
}

/// Hands the launch group, then the executables, to the backend.
async fn hand_over(
    launch: &dyn Launch,
    components: &ComponentRegistry,
    executables: Vec<ExecutableSpec>,
    log_level: &str,
) -> Result<(), OrchestratorError> {
    for entry in components.launch_group(log_level) {
        match entry {
            LaunchEntry::Process(spec) => launch.spawn_process(spec).await?,
            LaunchEntry::Colocated(c) => launch.spawn_colocated(c).await?,
        }
    }
    let count = executables.len();
    for spec in executables {
        launch.spawn_executable(spec).await?;
    }
    info!(
        components = components.len(),
        executables = count,
        "launch group handed to the backend"
    );
    Ok(())
}

/// Waits for the tasks, aborting those still running after `grace`.
async fn join_tasks(mut tasks: JoinSet<()>, grace: Duration) {
    let joined = tokio::time::timeout(grace, async {
        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                warn!("task ended abnormally: {e}");
            }
        }
    })
    .await;
    if joined.is_err() {
        warn!(remaining = tasks.len(), "tasks still running after grace, aborting");
        tasks.shutdown().await;
    }
}

async fn configure_one(c: &ComponentRef, path: &Path) -> Result<(), OrchestratorError> {
    c.configure(path)
        .await
        .map_err(|source| OrchestratorError::Component {
            component: c.name().to_string(),
            source,
        })
}

/// Completes on an OS termination signal or an explicit shutdown request.
async fn shutdown_requested(token: &CancellationToken) {
    tokio::select! {
        _ = token.cancelled() => {}
        res = shutdown::wait_for_shutdown_signal() => match res {
            Ok(signal) => info!(signal, "termination signal received"),
            Err(e) => {
                warn!(error = %e, "cannot listen for OS signals, waiting for an explicit shutdown");
                token.cancelled().await;
            }
        }
    }
}

async fn wait_all_with_grace(
    cfg: &Config,
    bus: &Bus,
    health: &HealthTracker,
    run: &mut JoinHandle<Result<(), LaunchError>>,
) -> Result<(), OrchestratorError> {
    let grace = cfg.grace;
    match tokio::time::timeout(grace, run).await {
        Ok(res) => {
            bus.publish(Signal::new(SignalKind::AllStoppedWithin));
            backend_result(res)
        }
        Err(_) => {
            let stuck = health.active().await;
            bus.publish(
                Signal::new(SignalKind::GraceExceeded).with_reason(format!("stuck: {stuck:?}")),
            );
            Err(RuntimeError::GraceExceeded { grace, stuck }.into())
        }
    }
}

fn backend_result(
    res: Result<Result<(), LaunchError>, tokio::task::JoinError>,
) -> Result<(), OrchestratorError> {
    match res {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => {
            warn!("launch backend ended abnormally: {e}");
            Err(RuntimeError::BackendCrashed {
                reason: e.to_string(),
            }
            .into())
        }
    }
}

fn spawn_health_listener(
    mut rx: broadcast::Receiver<Signal>,
    health: Arc<HealthTracker>,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(sig) => {
                        health.update(&sig).await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "health tracker lagged behind the bus");
                    }
                }
            }
        }
    })
}

/// Forwards bus signals to the subscribers; on cancel drains what is
/// already buffered, then waits for the subscriber queues.
fn spawn_subscriber_listener(
    mut rx: broadcast::Receiver<Signal>,
    set: SubscriberSet,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Ok(sig) => set.emit(&sig),
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "subscriber listener lagged behind the bus");
                    }
                },
                _ = token.cancelled() => {
                    loop {
                        match rx.try_recv() {
                            Ok(sig) => set.emit(&sig),
                            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                            Err(_) => break,
                        }
                    }
                    break;
                }
            }
        }
        set.shutdown().await;
    })
}

#[cfg(unix)]
mod bridge {
    use tokio_util::sync::CancellationToken;
    use tracing::{debug, info};

    use super::{ComponentRegistry, Config, OrchestratorError};
    pub(super) use crate::bridge::BridgePool as Pool;
    use crate::bridge::{Endpoint, EndpointSpec, codec};
    use crate::components::Topology;
    use crate::signals::Bus;

    /// Binds one endpoint per processor of every separate-process component.
    ///
    /// Fails before binding anything when payload serialization is not
    /// compiled in.
    pub(super) fn start(
        cfg: &Config,
        components: &ComponentRegistry,
        bus: &Bus,
        runtime: &CancellationToken,
    ) -> Result<Option<Pool>, OrchestratorError> {
        let mut specs = Vec::new();
        for name in components.names() {
            let Some(table) = components.processors(&name) else {
                continue;
            };
            if !components.topology(&name).is_some_and(Topology::is_process) {
                debug!(component = %name, "co-located component, processors not exposed");
                continue;
            }
            for (key, processors) in table {
                for processor in processors {
                    specs.push(EndpointSpec {
                        component: name.clone(),
                        key: key.clone(),
                        processor: processor.clone(),
                        dir: cfg.bridge_socket_dir.clone(),
                        max_frame: cfg.bridge_max_frame,
                        backoff: cfg.bridge_backoff,
                    });
                }
            }
        }
        if specs.is_empty() {
            return Ok(None);
        }
        codec::ensure_available()?;

        let mut pool = Pool::new(cfg.bridge_worker_limit(), runtime.child_token());
        for spec in specs {
            pool.submit(Endpoint::bind(spec, bus.clone())?);
        }
        info!(endpoints = pool.len(), "bridge endpoints started");
        Ok(Some(pool))
    }
}

#[cfg(not(unix))]
mod bridge {
    use tokio_util::sync::CancellationToken;
    use tracing::warn;

    use super::{ComponentRegistry, Config, OrchestratorError};
    use crate::signals::Bus;

    /// Stands in for the pool where no endpoint can be served.
    pub(super) struct Pool;

    impl Pool {
        pub(super) async fn shutdown(self) {}
    }

    /// Local sockets are unix-only; processors are not exposed here.
    pub(super) fn start(
        _cfg: &Config,
        components: &ComponentRegistry,
        _bus: &Bus,
        _runtime: &CancellationToken,
    ) -> Result<Option<Pool>, OrchestratorError> {
        if components
            .names()
            .iter()
            .any(|n| components.processors(n).is_some())
        {
            warn!("external processors need unix sockets and are not exposed on this platform");
        }
        Ok(None)
    }
}
