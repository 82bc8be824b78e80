//! # Event → action registry.
//!
//! ```text
//! register(event, [a1, a2, a3])
//!   ├─ validate every action first (nothing is stored on failure)
//!   │     Lifecycle / Component → target must be a registered component
//!   │     Lifecycle             → handler must be start / stop / restart
//!   ├─ find the entry with the same event identity, or append a new one
//!   └─ split by executor, keeping registration order:
//!         Supervisor             → monitor actions
//!         Lifecycle / Component / External → orchestrator actions
//! ```
//!
//! Name uniqueness is checked separately by [`EventRegistry::validate`]
//! before bringup, so the same event value can be registered in several
//! batches.

use std::collections::HashSet;

use super::action::Action;
use super::event::Event;
use crate::components::LifecycleHandler;
use crate::core::ComponentRegistry;
use crate::error::{ConfigError, InvalidAction};
use crate::policies::TriggerPolicy;

/// Internal event emitted by the monitor at start to activate the activation set.
pub const ACTIVATE_ALL: &str = "activate_all";

/// Actions registered for one event.
#[derive(Clone, Debug)]
pub struct EventEntry {
    event: Event,
    orchestrator: Vec<Action>,
    monitor: Vec<Action>,
}

impl EventEntry {
    /// The event.
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Event name.
    pub fn name(&self) -> &str {
        self.event.name()
    }

    /// Actions executed by the dispatcher, in registration order.
    pub fn orchestrator_actions(&self) -> &[Action] {
        &self.orchestrator
    }

    /// Actions executed by the monitor, in registration order.
    pub fn monitor_actions(&self) -> &[Action] {
        &self.monitor
    }

    /// Admission policy, falling back to `default` when the event sets none.
    pub fn policy_or(&self, default: TriggerPolicy) -> TriggerPolicy {
        self.event.policy().unwrap_or(default)
    }
}

/// Registry of events and their action lists.
#[derive(Clone, Debug, Default)]
pub struct EventRegistry {
    entries: Vec<EventEntry>,
}

impl EventRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends `actions` to `event`.
    pub fn register<I>(
        &mut self,
        event: &Event,
        actions: I,
        components: &ComponentRegistry,
    ) -> Result<(), InvalidAction>
    where
        I: IntoIterator<Item = Action>,
    {
        let actions: Vec<Action> = actions.into_iter().collect();
        for action in &actions {
            check_target(event, action, components)?;
        }

        let idx = match self.entries.iter().position(|e| e.event == *event) {
            Some(idx) => idx,
            None => {
                self.entries.push(EventEntry {
                    event: event.clone(),
                    orchestrator: Vec::new(),
                    monitor: Vec::new(),
                });
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[idx];
        for action in actions {
            if action.is_monitor_action() {
                entry.monitor.push(action);
            } else {
                entry.orchestrator.push(action);
            }
        }
        Ok(())
    }

    /// Fails if two distinct events share a name or an event uses a reserved name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            let name = entry.name();
            if name == ACTIVATE_ALL {
                return Err(ConfigError::ReservedEvent {
                    name: name.to_string(),
                });
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateEvent {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Entry registered under `name`.
    pub fn get(&self, name: &str) -> Option<&EventEntry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    /// All entries in first-registration order.
    pub fn entries(&self) -> &[EventEntry] {
        &self.entries
    }

    /// Event names in first-registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(EventEntry::name).collect()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no event was registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn check_target(
    event: &Event,
    action: &Action,
    components: &ComponentRegistry,
) -> Result<(), InvalidAction> {
    let Some(component) = action.target() else {
        return Ok(());
    };
    if !components.contains(component) {
        return Err(InvalidAction::UnknownTarget {
            event: event.name().to_string(),
            component: component.to_string(),
        });
    }
    if let Action::Lifecycle { handler, .. } = action {
        if LifecycleHandler::from_name(handler).is_none() {
            return Err(InvalidAction::NotAHandler {
                component: component.to_string(),
                operation: handler.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::components::{Component, ComponentContext, Topology};
    use crate::error::ComponentError;

    struct Dummy(&'static str);

    #[async_trait]
    impl Component for Dummy {
        fn name(&self) -> &str {
            self.0
        }

        async fn run(&self, _ctx: ComponentContext) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    fn components() -> ComponentRegistry {
        let mut reg = ComponentRegistry::new();
        reg.register(vec![Arc::new(Dummy("a")) as _, Arc::new(Dummy("b")) as _], Topology::Colocated)
            .unwrap();
        reg
    }

    #[test]
    fn same_event_appends_in_order() {
        let comps = components();
        let mut reg = EventRegistry::new();
        let ev = Event::new("e1");

        reg.register(&ev, [Action::restart("a"), Action::log("m1")], &comps)
            .unwrap();
        reg.register(&ev, [Action::component("b", "reset")], &comps)
            .unwrap();

        assert_eq!(reg.len(), 1);
        let entry = reg.get("e1").unwrap();
        let labels: Vec<String> = entry.orchestrator_actions().iter().map(Action::label).collect();
        assert_eq!(labels, vec!["restart(a)".to_string(), "b.reset".to_string()]);
        assert_eq!(entry.monitor_actions().len(), 1);
        assert!(reg.validate().is_ok());
    }

    #[test]
    fn distinct_events_with_one_name_are_duplicates() {
        let comps = components();
        let mut reg = EventRegistry::new();
        reg.register(&Event::new("e1"), [Action::stop("a")], &comps).unwrap();
        reg.register(&Event::new("e1"), [Action::stop("b")], &comps).unwrap();

        assert_eq!(
            reg.validate(),
            Err(ConfigError::DuplicateEvent { name: "e1".into() })
        );
    }

    #[test]
    fn unknown_target_is_rejected_and_nothing_stored() {
        let comps = components();
        let mut reg = EventRegistry::new();
        let err = reg
            .register(&Event::new("e1"), [Action::stop("a"), Action::restart("ghost")], &comps)
            .unwrap_err();

        assert_eq!(
            err,
            InvalidAction::UnknownTarget {
                event: "e1".into(),
                component: "ghost".into()
            }
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn unknown_lifecycle_handler_is_rejected() {
        let comps = components();
        let mut reg = EventRegistry::new();
        let err = reg
            .register(&Event::new("e1"), [Action::orchestrator("a", "reboot")], &comps)
            .unwrap_err();
        assert_eq!(err.as_label(), "invalid_action_not_a_handler");
    }

    #[test]
    fn reserved_name_is_rejected() {
        let comps = components();
        let mut reg = EventRegistry::new();
        reg.register(&Event::new(ACTIVATE_ALL), [Action::log("x")], &comps)
            .unwrap();
        assert_eq!(reg.validate().unwrap_err().as_label(), "config_reserved_event");
    }
}
