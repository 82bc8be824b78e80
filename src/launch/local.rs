//! # Single-host launch backend.
//!
//! [`LocalLaunch`] keeps one lifecycle machine per unit and executes
//! transitions itself:
//!
//! ```text
//!              co-located unit                    process unit
//! configure    on_configure()                     -
//! activate     on_activate(), spawn run(ctx)      spawn command (kill_on_drop)
//! deactivate   cancel ctx, join, on_deactivate()  cancel watcher → kill, join
//! shutdown     stop if running, on_shutdown()     stop if running
//! ```
//!
//! Executables start as soon as they are handed over and are killed when the
//! backend finalizes.
//!
//! Each activation gets a child token of the backend's root token. A run
//! task returning `Err`, or a process or executable exiting unsuccessfully,
//! is reported as a `ComponentFailure` health signal so the fallback engine
//! can react.
//!
//! Transitions of one unit are serialized by its own lock; different units
//! transition independently.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex as StdMutex, OnceLock, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{EventHandler, EventRouter, ExecutableSpec, Launch, ProcessSpec};
use crate::components::{ComponentContext, ComponentRef, LifecycleState, Transition};
use crate::error::LaunchError;
use crate::monitor::HealthStatus;
use crate::signals::{Bus, Signal, SignalKind};

/// Builds the command for a process unit.
pub type CommandFactory = Arc<dyn Fn(&ProcessSpec) -> Command + Send + Sync>;

enum Unit {
    Colocated(ComponentRef),
    Process(ProcessSpec),
}

struct Running {
    token: CancellationToken,
    join: JoinHandle<()>,
}

struct Managed {
    name: Arc<str>,
    unit: Unit,
    state: LifecycleState,
    running: Option<Running>,
}

/// Launch backend running co-located units as tokio tasks and process
/// units as child processes.
pub struct LocalLaunch {
    bus: OnceLock<Bus>,
    router: EventRouter,
    units: RwLock<HashMap<String, Arc<Mutex<Managed>>>>,
    executables: StdMutex<Vec<(Arc<str>, Running)>>,
    root: CancellationToken,
    command: CommandFactory,
}

impl Default for LocalLaunch {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalLaunch {
    /// Creates a backend that runs `entry_point` directly for process units,
    /// with the package name in `NODEVISOR_PACKAGE`.
    pub fn new() -> Self {
        Self {
            bus: OnceLock::new(),
            router: EventRouter::new(),
            units: RwLock::new(HashMap::new()),
            executables: StdMutex::new(Vec::new()),
            root: CancellationToken::new(),
            command: Arc::new(|spec: &ProcessSpec| {
                let mut cmd = Command::new(&spec.entry_point);
                cmd.args(&spec.args).env("NODEVISOR_PACKAGE", &spec.package);
                cmd
            }),
        }
    }

    /// Overrides how process units are started.
    pub fn with_command<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ProcessSpec) -> Command + Send + Sync + 'static,
    {
        self.command = Arc::new(factory);
        self
    }

    /// Current lifecycle state of `name`.
    pub async fn state(&self, name: &str) -> Option<LifecycleState> {
        let unit = self.unit(name).ok()?;
        let state = unit.lock().await.state;
        Some(state)
    }

    /// Names of the executables started so far.
    pub fn executables(&self) -> Vec<String> {
        self.executables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Sorted unit names.
    pub fn units(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort_unstable();
        names
    }

    fn publish(&self, signal: Signal) {
        if let Some(bus) = self.bus.get() {
            bus.publish(signal);
        }
    }

    fn unit(&self, name: &str) -> Result<Arc<Mutex<Managed>>, LaunchError> {
        self.units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| LaunchError::UnknownUnit {
                name: name.to_string(),
            })
    }

    fn insert(&self, name: &str, unit: Unit) -> Result<(), LaunchError> {
        let mut units = self.units.write().unwrap_or_else(PoisonError::into_inner);
        if units.contains_key(name) {
            return Err(LaunchError::AlreadyLaunched {
                name: name.to_string(),
            });
        }
        let managed = Managed {
            name: Arc::from(name),
            unit,
            state: LifecycleState::Unconfigured,
            running: None,
        };
        units.insert(name.to_string(), Arc::new(Mutex::new(managed)));
        Ok(())
    }

    async fn apply(&self, m: &mut Managed, t: Transition) -> Result<LifecycleState, LaunchError> {
        let next = m
            .state
            .next(t)
            .ok_or_else(|| LaunchError::InvalidTransition {
                component: m.name.to_string(),
                from: m.state,
                transition: t,
            })?;
        let hook_failed = |source| LaunchError::Hook {
            component: m.name.to_string(),
            transition: t,
            source,
        };

        match t {
            Transition::Configure => {
                if let Unit::Colocated(comp) = &m.unit {
                    comp.on_configure().await.map_err(hook_failed)?;
                }
            }
            Transition::Activate => match &m.unit {
                Unit::Colocated(comp) => {
                    comp.on_activate().await.map_err(hook_failed)?;
                    m.running = Some(self.start_colocated(Arc::clone(comp), Arc::clone(&m.name)));
                }
                Unit::Process(spec) => {
                    m.running = Some(self.start_process(spec, Arc::clone(&m.name))?);
                }
            },
            Transition::Deactivate => {
                stop(&m.name, m.running.take()).await;
                if let Unit::Colocated(comp) = &m.unit {
                    comp.on_deactivate().await.map_err(hook_failed)?;
                }
            }
            Transition::Shutdown => {
                stop(&m.name, m.running.take()).await;
                if let Unit::Colocated(comp) = &m.unit {
                    comp.on_shutdown().await.map_err(hook_failed)?;
                }
            }
        }

        m.state = next;
        Ok(next)
    }

    fn start_colocated(&self, comp: ComponentRef, name: Arc<str>) -> Running {
        let token = self.root.child_token();
        let bus = self.bus.get().cloned();
        let ctx = ComponentContext::new(
            Arc::clone(&name),
            bus.clone().unwrap_or_else(|| Bus::new(1)),
            token.clone(),
        );

        let join = tokio::spawn(async move {
            if let Err(e) = comp.run(ctx).await {
                warn!(component = %name, error = %e, "component run failed");
                if let Some(bus) = bus {
                    bus.publish(
                        Signal::health(name, HealthStatus::ComponentFailure)
                            .with_reason(e.to_string()),
                    );
                }
            }
        });
        Running { token, join }
    }

    fn start_process(&self, spec: &ProcessSpec, name: Arc<str>) -> Result<Running, LaunchError> {
        let mut cmd = (self.command)(spec);
        cmd.kill_on_drop(true);
        let child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            component: spec.name.clone(),
            source,
        })?;
        info!(component = %name, pid = ?child.id(), entry_point = %spec.entry_point, "process started");
        Ok(self.watch(child, name))
    }

    /// Waits on `child` until it exits or its token is cancelled, killing it
    /// on cancel and reporting unsuccessful exits.
    fn watch(&self, mut child: Child, name: Arc<str>) -> Running {
        let token = self.root.child_token();
        let cancel = token.clone();
        let bus = self.bus.get().cloned();

        let join = tokio::spawn(async move {
            let exited = tokio::select! {
                _ = cancel.cancelled() => None,
                status = child.wait() => Some(status),
            };
            let reason = match exited {
                None => {
                    if let Err(e) = child.kill().await {
                        warn!(component = %name, error = %e, "failed to kill process");
                    }
                    return;
                }
                Some(Ok(status)) if status.success() => {
                    debug!(component = %name, "process exited");
                    return;
                }
                Some(Ok(status)) => format!("process exited with {status}"),
                Some(Err(e)) => format!("failed to wait for process: {e}"),
            };
            warn!(component = %name, %reason, "process failed");
            if let Some(bus) = bus {
                bus.publish(Signal::health(name, HealthStatus::ComponentFailure).with_reason(reason));
            }
        });
        Running { token, join }
    }

    async fn finalize_all(&self) {
        let units: Vec<Arc<Mutex<Managed>>> = self
            .units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for unit in units {
            let mut m = unit.lock().await;
            if m.state == LifecycleState::Finalized {
                continue;
            }
            let name = Arc::clone(&m.name);
            match self.apply(&mut m, Transition::Shutdown).await {
                Ok(state) => self.publish(applied(name, Transition::Shutdown, state)),
                Err(e) => self.publish(failed(name, Transition::Shutdown, &e)),
            }
        }

        let executables: Vec<(Arc<str>, Running)> = self
            .executables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for (name, running) in executables {
            stop(&name, Some(running)).await;
            debug!(executable = %name, "executable stopped");
        }
        self.root.cancel();
    }
}

async fn stop(name: &str, running: Option<Running>) {
    let Some(running) = running else {
        return;
    };
    running.token.cancel();
    if let Err(e) = running.join.await {
        warn!(component = %name, "run task ended abnormally: {e}");
    }
}

fn applied(name: Arc<str>, t: Transition, state: LifecycleState) -> Signal {
    Signal::new(SignalKind::TransitionApplied)
        .with_component(name)
        .with_transition(t)
        .with_state(state)
}

fn failed(name: Arc<str>, t: Transition, err: &LaunchError) -> Signal {
    Signal::new(SignalKind::TransitionFailed)
        .with_component(name)
        .with_transition(t)
        .with_reason(err.to_string())
}

#[async_trait]
impl Launch for LocalLaunch {
    fn attach(&self, bus: Bus) {
        if self.bus.set(bus).is_err() {
            debug!("launch backend already attached to a bus");
        }
    }

    async fn spawn_process(&self, spec: ProcessSpec) -> Result<(), LaunchError> {
        let name = spec.name.clone();
        self.insert(&name, Unit::Process(spec))?;
        self.publish(
            Signal::new(SignalKind::ComponentLaunched)
                .with_component(name)
                .with_reason("process"),
        );
        Ok(())
    }

    async fn spawn_colocated(&self, component: ComponentRef) -> Result<(), LaunchError> {
        let name = component.name().to_string();
        self.insert(&name, Unit::Colocated(component))?;
        self.publish(
            Signal::new(SignalKind::ComponentLaunched)
                .with_component(name)
                .with_reason("colocated"),
        );
        Ok(())
    }

    async fn spawn_executable(&self, spec: ExecutableSpec) -> Result<(), LaunchError> {
        let taken = self
            .units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&spec.name)
            || self.executables().contains(&spec.name);
        if taken {
            return Err(LaunchError::AlreadyLaunched { name: spec.name });
        }

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).kill_on_drop(true);
        let child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            component: spec.name.clone(),
            source,
        })?;
        info!(executable = %spec.name, pid = ?child.id(), program = %spec.program, "executable started");

        let name: Arc<str> = Arc::from(spec.name.as_str());
        let running = self.watch(child, Arc::clone(&name));
        self.executables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((Arc::clone(&name), running));
        self.publish(
            Signal::new(SignalKind::ComponentLaunched)
                .with_component(name)
                .with_reason("executable"),
        );
        Ok(())
    }

    async fn request_transitions(
        &self,
        component: &str,
        transitions: &[Transition],
    ) -> Result<(), LaunchError> {
        let unit = self.unit(component)?;
        let mut m = unit.lock().await;
        for &t in transitions {
            let name = Arc::clone(&m.name);
            match self.apply(&mut m, t).await {
                Ok(state) => self.publish(applied(name, t, state)),
                Err(e) => {
                    self.publish(failed(name, t, &e));
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn register_event_handler(&self, event: &str, handler: EventHandler) {
        self.router.register(event, handler);
    }

    async fn run(
        &self,
        signals: broadcast::Receiver<Signal>,
        token: CancellationToken,
    ) -> Result<(), LaunchError> {
        self.router.serve(signals, token).await;
        self.finalize_all().await;
        Ok(())
    }
}

impl fmt::Debug for LocalLaunch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalLaunch")
            .field("units", &self.units())
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}
