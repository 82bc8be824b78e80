//! End-to-end scenarios driven through the public launcher API.
//!
//! A recording backend stands in for the real launch layer so that lifecycle
//! requests can be asserted without spawning processes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use nodevisor::{
    Action, Activation, AddOptions, Component, ComponentContext, ComponentError, ComponentRef,
    ConfigError, Config, Event, EventHandler, EventRouter, ExecutableSpec, HealthStatus,
    InvalidAction, Launch, LaunchError, Launcher, Operation, Operations, OrchestratorError, Param,
    ProcessSpec, RuntimeError, Signal, SignalKind, Signature, Topology, Transition, TriggerPolicy,
};

#[derive(Default)]
struct RecordingLaunch {
    router: EventRouter,
    units: Mutex<Vec<String>>,
    executables: Mutex<Vec<ExecutableSpec>>,
    transitions: Mutex<Vec<(String, Transition)>>,
    refused: Mutex<Option<String>>,
    crash_on_run: AtomicBool,
    finalized: AtomicBool,
}

impl RecordingLaunch {
    fn refusing(name: &str) -> Arc<Self> {
        let backend = Self::default();
        *backend.refused.lock().unwrap() = Some(name.to_string());
        Arc::new(backend)
    }

    fn crashing() -> Arc<Self> {
        let backend = Self::default();
        backend.crash_on_run.store(true, Ordering::SeqCst);
        Arc::new(backend)
    }

    fn units(&self) -> Vec<String> {
        self.units.lock().unwrap().clone()
    }

    fn transitions_of(&self, component: &str) -> Vec<Transition> {
        self.transitions
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == component)
            .map(|(_, t)| *t)
            .collect()
    }
}

#[async_trait]
impl Launch for RecordingLaunch {
    async fn spawn_process(&self, spec: ProcessSpec) -> Result<(), LaunchError> {
        self.units.lock().unwrap().push(spec.name);
        Ok(())
    }

    async fn spawn_colocated(&self, component: ComponentRef) -> Result<(), LaunchError> {
        let name = component.name().to_string();
        if self.refused.lock().unwrap().as_deref() == Some(name.as_str()) {
            return Err(LaunchError::AlreadyLaunched { name });
        }
        self.units.lock().unwrap().push(name);
        Ok(())
    }

    async fn spawn_executable(&self, spec: ExecutableSpec) -> Result<(), LaunchError> {
        self.executables.lock().unwrap().push(spec);
        Ok(())
    }

    async fn request_transitions(
        &self,
        component: &str,
        transitions: &[Transition],
    ) -> Result<(), LaunchError> {
        let mut log = self.transitions.lock().unwrap();
        for t in transitions {
            log.push((component.to_string(), *t));
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
        if self.crash_on_run.load(Ordering::SeqCst) {
            panic!("transport to the launch daemon lost");
        }
        self.router.serve(signals, token).await;
        self.finalized.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct Worker {
    name: &'static str,
    resets: AtomicU32,
    slow_runs: AtomicU32,
    configured: Mutex<Vec<PathBuf>>,
}

impl Worker {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            resets: AtomicU32::new(0),
            slow_runs: AtomicU32::new(0),
            configured: Mutex::new(Vec::new()),
        })
    }

    fn configured(&self) -> Vec<PathBuf> {
        self.configured.lock().unwrap().clone()
    }
}

#[async_trait]
impl Component for Worker {
    fn name(&self) -> &str {
        self.name
    }

    fn operations(&self) -> Vec<Operation> {
        Operations::<Worker>::new()
            .fallback("reset", |w, _inv| async move {
                w.resets.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .fallback_with(
                "calibrate",
                Signature::new([Param::required("target")]),
                |_w, _inv| async { Ok(()) },
            )
            .handler("slow", |w, _inv| async move {
                w.slow_runs.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(150)).await;
                Ok(())
            })
            .build()
    }

    async fn configure(&self, path: &Path) -> Result<(), ComponentError> {
        self.configured.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    async fn run(&self, ctx: ComponentContext) -> Result<(), ComponentError> {
        ctx.cancelled().await;
        Ok(())
    }
}

fn fast_config() -> Config {
    Config {
        grace: Duration::from_secs(2),
        health_interval: Duration::from_millis(20),
        ..Config::default()
    }
}

fn launcher_with(backend: &Arc<RecordingLaunch>) -> Launcher {
    Launcher::builder(fast_config())
        .with_launch(Arc::clone(backend) as Arc<dyn Launch>)
        .build()
}

async fn next_where(
    rx: &mut broadcast::Receiver<Signal>,
    pred: impl Fn(&Signal) -> bool,
) -> Signal {
    timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(sig) if pred(&sig) => return sig,
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => panic!("bus closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for signal")
}

#[tokio::test]
async fn restart_event_cycles_only_its_target() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);
    let (a, b) = (Worker::new("a"), Worker::new("b"));

    launcher
        .add_components(
            vec![a as ComponentRef, b as ComponentRef],
            Topology::Colocated,
            AddOptions::new()
                .activation(Activation::None)
                .event(Event::new("e1"), [Action::restart("a")]),
        )
        .await
        .unwrap();

    let handle = launcher.handle();
    let mut rx = handle.subscribe();
    let run = tokio::spawn(launcher.bringup());

    next_where(&mut rx, |s| s.kind == SignalKind::Ready).await;
    handle.trigger("e1");
    let done = next_where(&mut rx, |s| {
        s.kind == SignalKind::EventDispatched && s.event.as_deref() == Some("e1")
    })
    .await;
    assert!(done.reason.is_none());

    assert_eq!(
        backend.transitions_of("a"),
        vec![Transition::Deactivate, Transition::Activate]
    );
    assert!(backend.transitions_of("b").is_empty());
    assert_eq!(backend.units(), vec!["a".to_string(), "b".to_string()]);

    handle.shutdown();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn activation_set_is_started_at_bringup() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);

    launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef, Worker::new("b") as _],
            Topology::Colocated,
            AddOptions::new().activation(Activation::Only(vec!["b".into()])),
        )
        .await
        .unwrap();

    let handle = launcher.handle();
    let mut rx = handle.subscribe();
    let run = tokio::spawn(launcher.bringup());

    next_where(&mut rx, |s| {
        s.kind == SignalKind::EventDispatched && s.event.as_deref() == Some(nodevisor::ACTIVATE_ALL)
    })
    .await;
    assert_eq!(
        backend.transitions_of("b"),
        vec![Transition::Configure, Transition::Activate]
    );
    assert!(backend.transitions_of("a").is_empty());

    handle.shutdown();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn failure_report_fires_monitored_event() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);

    launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef],
            Topology::Colocated,
            AddOptions::new()
                .activation(Activation::None)
                .event(Event::on_failure("a_down", "a"), [Action::restart("a")]),
        )
        .await
        .unwrap();

    let handle = launcher.handle();
    let mut rx = handle.subscribe();
    let run = tokio::spawn(launcher.bringup());

    next_where(&mut rx, |s| s.kind == SignalKind::Ready).await;
    handle.report_failure("a", HealthStatus::SystemFailure, "lost bus");
    next_where(&mut rx, |s| {
        s.kind == SignalKind::EventDispatched && s.event.as_deref() == Some("a_down")
    })
    .await;

    assert_eq!(
        backend.transitions_of("a"),
        vec![Transition::Deactivate, Transition::Activate]
    );

    handle.shutdown();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn fallback_budget_is_spent_then_exhausted() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);
    let a = Worker::new("a");

    launcher
        .add_components(
            vec![Arc::clone(&a) as ComponentRef],
            Topology::Colocated,
            AddOptions::new().activation(Activation::None),
        )
        .await
        .unwrap();
    launcher.set_fallback("a", "reset", Some(2)).unwrap();

    let handle = launcher.handle();
    let mut rx = handle.subscribe();
    let run = tokio::spawn(launcher.bringup());

    next_where(&mut rx, |s| s.kind == SignalKind::Ready).await;
    for _ in 0..3 {
        handle.report("a", HealthStatus::ComponentFailure);
    }

    for attempt in 1..=2 {
        let sig = next_where(&mut rx, |s| s.kind == SignalKind::FallbackInvoked).await;
        assert_eq!(sig.attempt, Some(attempt));
        assert_eq!(sig.component.as_deref(), Some("a"));
        assert!(sig.reason.is_none());
    }
    let exhausted = next_where(&mut rx, |s| s.kind == SignalKind::FallbackExhausted).await;
    assert_eq!(exhausted.attempt, Some(2));
    assert_eq!(a.resets.load(Ordering::SeqCst), 2);

    handle.shutdown();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn busy_event_drops_overlapping_trigger() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);
    let a = Worker::new("a");

    launcher
        .add_components(
            vec![Arc::clone(&a) as ComponentRef],
            Topology::Colocated,
            AddOptions::new().activation(Activation::None).event(
                Event::new("slow").with_policy(TriggerPolicy::DropIfRunning),
                [Action::component("a", "slow")],
            ),
        )
        .await
        .unwrap();

    let handle = launcher.handle();
    let mut rx = handle.subscribe();
    let run = tokio::spawn(launcher.bringup());

    next_where(&mut rx, |s| s.kind == SignalKind::Ready).await;
    handle.trigger("slow");
    handle.trigger("slow");

    next_where(&mut rx, |s| s.kind == SignalKind::TriggerDropped).await;
    next_where(&mut rx, |s| {
        s.kind == SignalKind::EventDispatched && s.event.as_deref() == Some("slow")
    })
    .await;
    assert_eq!(a.slow_runs.load(Ordering::SeqCst), 1);

    handle.shutdown();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn duplicate_component_names_are_rejected() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);

    launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef],
            Topology::Colocated,
            AddOptions::new(),
        )
        .await
        .unwrap();
    let err = launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef],
            Topology::Colocated,
            AddOptions::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrchestratorError::Config(ConfigError::DuplicateComponent { ref name }) if name == "a"
    ));
    assert_eq!(launcher.components().len(), 1);
}

#[tokio::test]
async fn process_topology_needs_a_package() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);

    let err = launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef],
            Topology::process(""),
            AddOptions::new(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.as_label(), "config_missing_process_identity");
}

#[tokio::test]
async fn actions_on_unknown_components_are_rejected() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);

    let err = launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef],
            Topology::Colocated,
            AddOptions::new().event(Event::new("e1"), [Action::restart("ghost")]),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrchestratorError::InvalidAction(InvalidAction::UnknownTarget { ref component, .. })
            if component == "ghost"
    ));
}

#[tokio::test]
async fn fallbacks_must_be_declared_and_argument_free() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);
    launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef],
            Topology::Colocated,
            AddOptions::new(),
        )
        .await
        .unwrap();

    let err = launcher.set_fallback("a", "calibrate", None).unwrap_err();
    assert_eq!(
        err,
        ConfigError::FallbackSignature {
            component: "a".into(),
            operation: "calibrate".into(),
            required: vec!["target".into()],
        }
    );

    let err = launcher.set_fallback("a", "slow", None).unwrap_err();
    assert!(matches!(err, ConfigError::FallbackUnavailable { .. }));

    let err = launcher.set_fallback("ghost", "reset", None).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownComponent { .. }));

    launcher.on_fail("reset", Some(1)).unwrap();
}

#[tokio::test]
async fn bringup_without_components_fails() {
    let backend = Arc::new(RecordingLaunch::default());
    let launcher = launcher_with(&backend);

    let err = launcher.bringup().await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Config(ConfigError::NoComponents)));
    assert!(backend.units().is_empty());
}

#[tokio::test]
async fn duplicate_event_names_fail_before_launch() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);

    launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef],
            Topology::Colocated,
            AddOptions::new()
                .event(Event::new("dup"), [Action::restart("a")])
                .event(Event::new("dup"), [Action::stop("a")]),
        )
        .await
        .unwrap();

    let err = launcher.bringup().await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Config(ConfigError::DuplicateEvent { ref name }) if name == "dup"
    ));
    assert!(backend.units().is_empty());
}

#[tokio::test]
async fn disabled_monitoring_ignores_events() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = Launcher::builder(Config {
        enable_monitoring: false,
        ..fast_config()
    })
    .with_launch(Arc::clone(&backend) as Arc<dyn Launch>)
    .build();

    launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef],
            Topology::Colocated,
            AddOptions::new().event(Event::new("e1"), [Action::restart("a")]),
        )
        .await
        .unwrap();

    assert!(launcher.events().is_empty());
}

#[tokio::test]
async fn shutdown_reports_stop_within_grace() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);
    launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef],
            Topology::Colocated,
            AddOptions::new(),
        )
        .await
        .unwrap();

    let handle = launcher.handle();
    let mut rx = handle.subscribe();
    let run = tokio::spawn(launcher.bringup());

    next_where(&mut rx, |s| s.kind == SignalKind::Ready).await;
    handle.shutdown();
    next_where(&mut rx, |s| s.kind == SignalKind::ShutdownRequested).await;
    next_where(&mut rx, |s| s.kind == SignalKind::AllStoppedWithin).await;
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn rejected_launch_group_tears_everything_down() {
    let backend = RecordingLaunch::refusing("b");
    let mut launcher = launcher_with(&backend);
    launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef, Worker::new("b") as _],
            Topology::Colocated,
            AddOptions::new().activation(Activation::None),
        )
        .await
        .unwrap();
    launcher.set_fallback("a", "reset", None).unwrap();

    let handle = launcher.handle();
    let mut rx = handle.subscribe();
    let err = launcher.bringup().await.unwrap_err();
    assert_eq!(err.as_label(), "launch_already_launched");
    assert!(backend.finalized.load(Ordering::SeqCst), "backend finalized what it held");

    // Nobody is left listening: a failure report no longer invokes the fallback.
    handle.report("a", HealthStatus::ComponentFailure);
    let late = timeout(Duration::from_millis(300), async {
        loop {
            match rx.recv().await {
                Ok(sig) if sig.kind == SignalKind::FallbackInvoked => return sig,
                Ok(sig) => assert_ne!(sig.kind, SignalKind::Ready),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => panic!("bus closed"),
            }
        }
    })
    .await;
    assert!(late.is_err(), "fallback listener outlived a failed bringup");
}

#[tokio::test]
async fn crashed_backend_is_an_error() {
    let backend = RecordingLaunch::crashing();
    let mut launcher = launcher_with(&backend);
    launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef],
            Topology::Colocated,
            AddOptions::new(),
        )
        .await
        .unwrap();

    let err = timeout(Duration::from_secs(5), launcher.bringup())
        .await
        .expect("bringup returns")
        .unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Runtime(RuntimeError::BackendCrashed { .. })
    ));
    assert_eq!(err.as_label(), "runtime_backend_crashed");
}

#[tokio::test]
async fn manual_trigger_runs_supervisor_only_events() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);
    let snapshots = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&snapshots);

    launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef],
            Topology::Colocated,
            AddOptions::new().activation(Activation::None).event(
                Event::new("audit"),
                [Action::supervisor("count", move |ctx| {
                    let seen = Arc::clone(&seen);
                    async move {
                        assert_eq!(&*ctx.event, "audit");
                        seen.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                })],
            ),
        )
        .await
        .unwrap();

    let handle = launcher.handle();
    let mut rx = handle.subscribe();
    let run = tokio::spawn(launcher.bringup());

    next_where(&mut rx, |s| s.kind == SignalKind::Ready).await;
    handle.trigger("audit");
    timeout(Duration::from_secs(5), async {
        while snapshots.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("supervisor action ran");
    assert_eq!(snapshots.load(Ordering::SeqCst), 1);
    assert!(backend.transitions_of("a").is_empty());

    handle.shutdown();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn executables_and_tasks_start_with_the_launch_group() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);
    launcher
        .add_components(
            vec![Worker::new("a") as ComponentRef],
            Topology::Colocated,
            AddOptions::new(),
        )
        .await
        .unwrap();

    launcher
        .add_executable("recorder", "rosbag", ["record", "-a"])
        .unwrap();
    let err = launcher.add_executable("a", "true", Vec::<String>::new()).unwrap_err();
    assert_eq!(err.as_label(), "config_duplicate_component");

    let ticks = Arc::new(AtomicU32::new(0));
    let stopped = Arc::new(AtomicBool::new(false));
    {
        let (ticks, stopped) = (Arc::clone(&ticks), Arc::clone(&stopped));
        launcher.add_task("heartbeat", move |token| async move {
            ticks.fetch_add(1, Ordering::SeqCst);
            token.cancelled().await;
            stopped.store(true, Ordering::SeqCst);
            Ok(())
        });
    }
    launcher.add_task("broken", |_token| async {
        Err(ComponentError::failed("no uplink"))
    });

    let handle = launcher.handle();
    let mut rx = handle.subscribe();
    let run = tokio::spawn(launcher.bringup());

    let failed = next_where(&mut rx, |s| {
        s.kind == SignalKind::ActionFailed && s.event.as_deref() == Some("broken")
    })
    .await;
    assert_eq!(failed.reason.as_deref(), Some("component failed: no uplink"));
    assert_eq!(
        *backend.executables.lock().unwrap(),
        vec![ExecutableSpec {
            name: "recorder".into(),
            program: "rosbag".into(),
            args: vec!["record".into(), "-a".into()],
        }]
    );
    assert_eq!(ticks.load(Ordering::SeqCst), 1);

    handle.shutdown();
    run.await.unwrap().unwrap();
    assert!(stopped.load(Ordering::SeqCst), "task saw the cancellation");
}

#[tokio::test]
async fn fallback_interval_spaces_attempts() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = launcher_with(&backend);
    let a = Worker::new("a");
    launcher
        .add_components(
            vec![Arc::clone(&a) as ComponentRef],
            Topology::Colocated,
            AddOptions::new().activation(Activation::None),
        )
        .await
        .unwrap();
    launcher.set_fallback("a", "reset", None).unwrap();
    launcher.set_fallback_interval(Duration::from_millis(250));
    assert_eq!(launcher.fallback_interval(), Duration::from_millis(250));

    let handle = launcher.handle();
    let mut rx = handle.subscribe();
    let run = tokio::spawn(launcher.bringup());

    next_where(&mut rx, |s| s.kind == SignalKind::Ready).await;
    for _ in 0..3 {
        handle.report("a", HealthStatus::ComponentFailure);
    }
    let first = next_where(&mut rx, |s| s.kind == SignalKind::FallbackInvoked).await;
    assert_eq!(first.attempt, Some(1));

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(a.resets.load(Ordering::SeqCst), 1, "burst coalesced into one attempt");

    handle.report("a", HealthStatus::ComponentFailure);
    let second = next_where(&mut rx, |s| s.kind == SignalKind::FallbackInvoked).await;
    assert_eq!(second.attempt, Some(2));

    handle.shutdown();
    run.await.unwrap().unwrap();
}

#[tokio::test]
async fn config_file_reaches_every_added_component() {
    let backend = Arc::new(RecordingLaunch::default());
    let mut launcher = Launcher::builder(Config {
        config_file: Some(PathBuf::from("/etc/robot/params.toml")),
        ..fast_config()
    })
    .with_launch(Arc::clone(&backend) as Arc<dyn Launch>)
    .build();

    let (a, b) = (Worker::new("a"), Worker::new("b"));
    launcher
        .add_components(
            vec![Arc::clone(&a) as ComponentRef, Arc::clone(&b) as _],
            Topology::Colocated,
            AddOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(a.configured(), vec![PathBuf::from("/etc/robot/params.toml")]);
    assert_eq!(b.configured(), vec![PathBuf::from("/etc/robot/params.toml")]);

    let tuned = Path::new("/etc/robot/tuned.toml");
    launcher.configure(tuned, Some("b")).await.unwrap();
    assert_eq!(a.configured().len(), 1);
    assert_eq!(b.configured().last().map(PathBuf::as_path), Some(tuned));

    launcher.configure(tuned, None).await.unwrap();
    assert_eq!(a.configured().len(), 2);
    assert_eq!(b.configured().len(), 3);

    let err = launcher.configure(tuned, Some("ghost")).await.unwrap_err();
    assert_eq!(err.as_label(), "config_unknown_component");
}
