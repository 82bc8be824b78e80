//! # Dispatcher: runs the actions of triggered events.
//!
//! The launch backend calls the handler registered for an internal event;
//! the handler calls [`Dispatcher::trigger`], which admits the trigger into
//! the event's slot:
//!
//! ```text
//! trigger(event)
//!   ├─ unknown event          → Unknown
//!   ├─ slot idle              → Started, spawn drain loop
//!   └─ slot running
//!        ├─ policy Queue         → Queued (pending += 1)
//!        └─ policy DropIfRunning → Dropped, publish TriggerDropped
//!
//! drain loop:
//!   resolve_and_run(event)  (actions in registration order, stop at first error)
//!   publish EventDispatched
//!   pending > 0 ? pending -= 1, run again : slot idle
//! ```
//!
//! `activate_all` is an ordinary slot whose actions are `start` for every
//! member of the activation set; unlike user events it keeps going when one
//! member fails.
//!
//! The fallback listener turns failure health reports into fallback
//! invocations (`FallbackInvoked`) until the budget is spent
//! (`FallbackExhausted`). With a fallback interval, reports arriving within
//! the interval after a component's last attempt are ignored.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::actions::{ACTIVATE_ALL, Action, EventRegistry, MonitorContext};
use crate::components::{ComponentRef, HandlerTable, Invocation, LifecycleHandler};
use crate::error::{ActionError, InvalidAction};
use crate::launch::Launch;
use crate::monitor::HealthTracker;
use crate::policies::{FallbackEngine, FallbackOutcome, TriggerPolicy};
use crate::signals::{Bus, Signal, SignalKind};

/// Label used as the event name of fallback invocations.
const FALLBACK: &str = "fallback";

/// What happened to a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A dispatch was started.
    Started,
    /// A dispatch is running; this one runs after it.
    Queued,
    /// A dispatch is running; this one was discarded.
    Dropped,
    /// No such event.
    Unknown,
}

struct Plan {
    actions: Vec<Action>,
    policy: TriggerPolicy,
    keep_going: bool,
}

#[derive(Default)]
struct Slot {
    running: bool,
    pending: usize,
}

/// Everything the dispatcher needs, frozen at bringup.
pub struct DispatcherParams {
    /// Live components by name.
    pub components: Vec<ComponentRef>,
    /// Operation handler table.
    pub handlers: HandlerTable,
    /// Registered events.
    pub events: EventRegistry,
    /// Members of the activation set, in order.
    pub activation: Vec<String>,
    /// Admission policy for events without one.
    pub default_policy: TriggerPolicy,
    /// Fallback budgets.
    pub fallback: FallbackEngine,
    /// Minimum spacing between fallback attempts of one component.
    pub fallback_interval: Duration,
}

/// Executes orchestrator-level, component-local and passthrough actions.
pub struct Dispatcher {
    components: HashMap<String, ComponentRef>,
    handlers: HandlerTable,
    plans: HashMap<String, Plan>,
    fallback: FallbackEngine,
    fallback_interval: Duration,
    last_fallback: Mutex<HashMap<String, Instant>>,
    launch: Arc<dyn Launch>,
    bus: Bus,
    health: Arc<HealthTracker>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl Dispatcher {
    /// Builds the dispatcher and the `activate_all` plan.
    pub fn new(
        params: DispatcherParams,
        launch: Arc<dyn Launch>,
        bus: Bus,
        health: Arc<HealthTracker>,
    ) -> Self {
        let mut plans: HashMap<String, Plan> = params
            .events
            .entries()
            .iter()
            .map(|e| {
                let plan = Plan {
                    actions: e.orchestrator_actions().to_vec(),
                    policy: e.policy_or(params.default_policy),
                    keep_going: false,
                };
                (e.name().to_string(), plan)
            })
            .collect();
        plans.insert(
            ACTIVATE_ALL.to_string(),
            Plan {
                actions: params.activation.iter().map(Action::start).collect(),
                policy: TriggerPolicy::Queue,
                keep_going: true,
            },
        );

        Self {
            components: params
                .components
                .into_iter()
                .map(|c| (c.name().to_string(), c))
                .collect(),
            handlers: params.handlers,
            plans,
            fallback: params.fallback,
            fallback_interval: params.fallback_interval,
            last_fallback: Mutex::new(HashMap::new()),
            launch,
            bus,
            health,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Names of dispatchable events, `activate_all` included.
    pub fn events(&self) -> Vec<String> {
        let mut names: Vec<String> = self.plans.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Fallback budgets.
    pub fn fallback(&self) -> &FallbackEngine {
        &self.fallback
    }

    /// Admits a trigger of `event` according to its policy.
    ///
    /// Must be called inside a tokio runtime.
    pub fn trigger(self: &Arc<Self>, event: &str) -> TriggerOutcome {
        let Some(plan) = self.plans.get(event) else {
            warn!(event, "trigger for unknown event ignored");
            return TriggerOutcome::Unknown;
        };

        {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = slots.entry(event.to_string()).or_default();
            if slot.running {
                match plan.policy {
                    TriggerPolicy::Queue => {
                        slot.pending += 1;
                        debug!(event, pending = slot.pending, "trigger queued");
                        return TriggerOutcome::Queued;
                    }
                    TriggerPolicy::DropIfRunning => {
                        drop(slots);
                        self.bus
                            .publish(Signal::new(SignalKind::TriggerDropped).with_event(event));
                        return TriggerOutcome::Dropped;
                    }
                }
            }
            slot.running = true;
        }

        let me = Arc::clone(self);
        let event = event.to_string();
        tokio::spawn(async move { me.drain(event).await });
        TriggerOutcome::Started
    }

    async fn drain(&self, event: String) {
        loop {
            let result = self.resolve_and_run(&event).await;
            let mut done = Signal::new(SignalKind::EventDispatched).with_event(event.as_str());
            if let Err(e) = &result {
                done = done.with_reason(e.to_string());
            }
            self.bus.publish(done);

            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(slot) = slots.get_mut(&event) else {
                break;
            };
            if slot.pending > 0 {
                slot.pending -= 1;
                continue;
            }
            slot.running = false;
            break;
        }
    }

    /// Runs the orchestrator actions of `event` in registration order.
    ///
    /// Stops at the first failing action (publishing `ActionFailed`) except
    /// for `activate_all`, which reports every failure and returns the first.
    pub async fn resolve_and_run(&self, event: &str) -> Result<(), ActionError> {
        let plan = self
            .plans
            .get(event)
            .ok_or_else(|| ActionError::failed(event, "no such event"))?;

        let mut first_err = None;
        for action in &plan.actions {
            if let Err(e) = self.run_action(event, action).await {
                warn!(event, action = %action.label(), error = %e, "action failed");
                let mut sig = Signal::new(SignalKind::ActionFailed)
                    .with_event(event)
                    .with_reason(e.to_string());
                if let Some(component) = action.target() {
                    sig = sig.with_component(component);
                }
                self.bus.publish(sig);

                if !plan.keep_going {
                    return Err(e);
                }
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Runs one action on behalf of `event`.
    pub async fn run_action(&self, event: &str, action: &Action) -> Result<(), ActionError> {
        match action {
            Action::Lifecycle { component, handler } => {
                let handler =
                    LifecycleHandler::from_name(handler).ok_or_else(|| InvalidAction::NotAHandler {
                        component: component.clone(),
                        operation: handler.clone(),
                    })?;
                if !self.components.contains_key(component) {
                    return Err(InvalidAction::UnknownComponent {
                        component: component.clone(),
                    }
                    .into());
                }
                for &t in handler.transitions() {
                    self.bus.publish(
                        Signal::new(SignalKind::TransitionRequested)
                            .with_component(component.as_str())
                            .with_event(event)
                            .with_transition(t),
                    );
                }
                self.launch
                    .request_transitions(component, handler.transitions())
                    .await?;
            }
            Action::Component {
                component,
                operation,
                args,
            } => {
                let live =
                    self.components
                        .get(component)
                        .ok_or_else(|| InvalidAction::UnknownComponent {
                            component: component.clone(),
                        })?;
                let op = self.handlers.get(live.kind(), operation).ok_or_else(|| {
                    InvalidAction::NotAHandler {
                        component: component.clone(),
                        operation: operation.clone(),
                    }
                })?;
                op.invoke(
                    Arc::clone(live),
                    Invocation::new(component.as_str(), args.clone()),
                )
                .await
                .map_err(|source| ActionError::Component {
                    component: component.clone(),
                    operation: operation.clone(),
                    source,
                })?;
            }
            Action::Supervisor { run, .. } => {
                let ctx = MonitorContext {
                    event: Arc::from(event),
                    snapshot: self.health.snapshot().await,
                    bus: self.bus.clone(),
                };
                run(ctx).await?;
            }
            Action::External { run, .. } => run().await?,
        }
        Ok(())
    }

    /// Applies fallback policies to failure reports until `token` is cancelled.
    pub fn spawn_fallback_listener(
        self: &Arc<Self>,
        mut rx: broadcast::Receiver<Signal>,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        let me = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(sig) if sig.is_failure_report() => me.on_failure(&sig).await,
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "fallback listener lagged behind the bus");
                        }
                    }
                }
            }
        })
    }

    async fn on_failure(&self, sig: &Signal) {
        let Some(component) = sig.component.as_deref() else {
            return;
        };
        if self.within_fallback_interval(component) {
            debug!(component, "failure report within the fallback interval ignored");
            return;
        }
        match self.fallback.on_failure(component) {
            FallbackOutcome::Invoke { action, attempt } => {
                info!(component, attempt, action = %action.label(), "invoking fallback");
                let mut out = Signal::new(SignalKind::FallbackInvoked)
                    .with_component(component)
                    .with_attempt(attempt);
                if let Err(e) = self.run_action(FALLBACK, &action).await {
                    warn!(component, attempt, error = %e, "fallback failed");
                    out = out.with_reason(e.to_string());
                }
                self.bus.publish(out);
            }
            FallbackOutcome::Exhausted { max_retries } => {
                warn!(component, max_retries, "fallback budget exhausted, failure unrecovered");
                self.bus.publish(
                    Signal::new(SignalKind::FallbackExhausted)
                        .with_component(component)
                        .with_attempt(max_retries)
                        .with_reason(sig.reason.as_deref().unwrap_or("failure reported")),
                );
            }
            FallbackOutcome::Unset => {
                debug!(component, "failure reported without fallback policy");
            }
        }
    }

    /// True if the last attempt for `component` is more recent than the
    /// fallback interval; otherwise records now as the last attempt.
    fn within_fallback_interval(&self, component: &str) -> bool {
        if self.fallback_interval.is_zero() {
            return false;
        }
        let now = Instant::now();
        let mut last = self.last_fallback.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = last.get(component) {
            if now.duration_since(*prev) < self.fallback_interval {
                return true;
            }
        }
        last.insert(component.to_string(), now);
        false
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("events", &self.events())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap as Map;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::actions::{Args, Event};
    use crate::components::{Component, ComponentContext, Operations, Topology, Transition};
    use crate::core::ComponentRegistry;
    use crate::error::{ComponentError, LaunchError};
    use crate::launch::{EventHandler, ExecutableSpec, ProcessSpec};
    use crate::policies::FallbackPolicy;

    #[derive(Default)]
    struct Calls {
        transitions: Mutex<Vec<(String, Vec<Transition>)>>,
    }

    #[async_trait]
    impl Launch for Calls {
        async fn spawn_process(&self, _spec: ProcessSpec) -> Result<(), LaunchError> {
            Ok(())
        }

        async fn spawn_colocated(&self, _c: ComponentRef) -> Result<(), LaunchError> {
            Ok(())
        }

        async fn spawn_executable(&self, _spec: ExecutableSpec) -> Result<(), LaunchError> {
            Ok(())
        }

        async fn request_transitions(
            &self,
            component: &str,
            transitions: &[Transition],
        ) -> Result<(), LaunchError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.transitions
                .lock()
                .unwrap()
                .push((component.to_string(), transitions.to_vec()));
            Ok(())
        }

        fn register_event_handler(&self, _event: &str, _handler: EventHandler) {}

        async fn run(
            &self,
            _signals: broadcast::Receiver<Signal>,
            token: CancellationToken,
        ) -> Result<(), LaunchError> {
            token.cancelled().await;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Camera {
        resets: AtomicU32,
    }

    #[async_trait]
    impl Component for Camera {
        fn name(&self) -> &str {
            "cam"
        }

        fn operations(&self) -> Vec<crate::components::Operation> {
            Operations::<Camera>::new()
                .fallback("reset", |cam, _inv| async move {
                    cam.resets.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build()
        }

        async fn run(&self, _ctx: ComponentContext) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    fn build(
        events: Vec<(Event, Vec<Action>)>,
        fallback: Map<String, FallbackPolicy>,
    ) -> (Arc<Dispatcher>, Arc<Calls>, Arc<Camera>, Bus) {
        let cam = Arc::new(Camera::default());
        let mut comps = ComponentRegistry::new();
        comps
            .register(vec![cam.clone() as ComponentRef], Topology::Colocated)
            .unwrap();

        let mut registry = EventRegistry::new();
        for (event, actions) in events {
            registry.register(&event, actions, &comps).unwrap();
        }

        let calls = Arc::new(Calls::default());
        let bus = Bus::new(256);
        let dispatcher = Dispatcher::new(
            DispatcherParams {
                components: comps.components().cloned().collect(),
                handlers: comps.handlers().clone(),
                events: registry,
                activation: vec!["cam".into()],
                default_policy: TriggerPolicy::Queue,
                fallback: FallbackEngine::new(fallback),
                fallback_interval: Duration::ZERO,
            },
            calls.clone(),
            bus.clone(),
            Arc::new(HealthTracker::new()),
        );
        (Arc::new(dispatcher), calls, cam, bus)
    }

    async fn dispatched(rx: &mut broadcast::Receiver<Signal>, event: &str, n: usize) {
        let mut seen = 0;
        tokio::time::timeout(Duration::from_secs(2), async {
            while seen < n {
                let sig = rx.recv().await.unwrap();
                if sig.kind == SignalKind::EventDispatched && sig.event.as_deref() == Some(event) {
                    seen += 1;
                }
            }
        })
        .await
        .expect("dispatches completed");
    }

    #[tokio::test]
    async fn actions_run_in_registration_order() {
        let ev = Event::new("recover");
        let (d, calls, cam, bus) = build(
            vec![(ev, vec![Action::stop("cam"), Action::component("cam", "reset"), Action::start("cam")])],
            Map::new(),
        );
        let mut rx = bus.subscribe();

        assert_eq!(d.trigger("recover"), TriggerOutcome::Started);
        dispatched(&mut rx, "recover", 1).await;

        let calls = calls.transitions.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                ("cam".to_string(), vec![Transition::Deactivate]),
                ("cam".to_string(), vec![Transition::Configure, Transition::Activate]),
            ]
        );
        assert_eq!(cam.resets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn queue_policy_runs_every_trigger_once() {
        let ev = Event::new("kick").with_policy(TriggerPolicy::Queue);
        let (d, calls, _cam, bus) = build(vec![(ev, vec![Action::restart("cam")])], Map::new());
        let mut rx = bus.subscribe();

        assert_eq!(d.trigger("kick"), TriggerOutcome::Started);
        assert_eq!(d.trigger("kick"), TriggerOutcome::Queued);
        assert_eq!(d.trigger("kick"), TriggerOutcome::Queued);
        dispatched(&mut rx, "kick", 3).await;
        assert_eq!(calls.transitions.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn drop_policy_discards_overlapping_triggers() {
        let ev = Event::new("kick").with_policy(TriggerPolicy::DropIfRunning);
        let (d, calls, _cam, bus) = build(vec![(ev, vec![Action::restart("cam")])], Map::new());
        let mut rx = bus.subscribe();

        assert_eq!(d.trigger("kick"), TriggerOutcome::Started);
        assert_eq!(d.trigger("kick"), TriggerOutcome::Dropped);
        dispatched(&mut rx, "kick", 1).await;
        assert_eq!(calls.transitions.lock().unwrap().len(), 1);

        assert_eq!(d.trigger("nope"), TriggerOutcome::Unknown);
    }

    #[tokio::test]
    async fn unknown_operation_is_invalid_at_dispatch() {
        let (d, _calls, _cam, _bus) = build(Vec::new(), Map::new());
        let err = d
            .run_action("manual", &Action::component("cam", "explode").with_args(Args::new()))
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "invalid_action_not_a_handler");

        let err = d
            .run_action("manual", &Action::restart("ghost"))
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "invalid_action_unknown_component");
    }

    #[tokio::test]
    async fn activate_all_starts_the_activation_set() {
        let (d, calls, _cam, bus) = build(Vec::new(), Map::new());
        let mut rx = bus.subscribe();
        assert_eq!(d.trigger(ACTIVATE_ALL), TriggerOutcome::Started);
        dispatched(&mut rx, ACTIVATE_ALL, 1).await;
        assert_eq!(
            calls.transitions.lock().unwrap()[0].1,
            vec![Transition::Configure, Transition::Activate]
        );
    }

    #[tokio::test]
    async fn fallback_listener_honours_the_budget() {
        let mut policies = Map::new();
        policies.insert(
            "cam".to_string(),
            FallbackPolicy::new(Action::component("cam", "reset"), Some(1)),
        );
        let (d, _calls, cam, bus) = build(Vec::new(), policies);
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();
        let listener = d.spawn_fallback_listener(bus.subscribe(), token.clone());

        bus.publish(Signal::health("cam", crate::monitor::HealthStatus::ComponentFailure));
        bus.publish(Signal::health("cam", crate::monitor::HealthStatus::SystemFailure));

        let mut kinds = Vec::new();
        tokio::time::timeout(Duration::from_secs(2), async {
            while kinds.len() < 2 {
                let sig = rx.recv().await.unwrap();
                if matches!(sig.kind, SignalKind::FallbackInvoked | SignalKind::FallbackExhausted) {
                    kinds.push(sig.kind);
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(kinds, vec![SignalKind::FallbackInvoked, SignalKind::FallbackExhausted]);
        assert_eq!(cam.resets.load(Ordering::SeqCst), 1);
        token.cancel();
        listener.await.unwrap();
    }
}
