//! # Component registry.
//!
//! Owns every managed component with its topology, the closed operation
//! handler table, and the external processors attached to components.
//!
//! ## Rules
//! - names are unique across the registry; a batch is checked as a whole
//!   (within itself and against earlier batches) before anything is stored
//! - a process topology needs a package and an entry point
//! - the handler table is filled while registering and never changes afterwards
//! - the launch group keeps registration order

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::bridge::Processor;
use crate::components::{ComponentRef, HandlerTable, RunType, Topology};
use crate::error::ConfigError;
use crate::launch::ProcessSpec;
use crate::monitor::MonitorView;

/// One unit handed to the launch backend at bringup.
#[derive(Clone)]
pub enum LaunchEntry {
    /// Started as a separate process.
    Process(ProcessSpec),
    /// Driven inside the orchestrator.
    Colocated(ComponentRef),
}

impl LaunchEntry {
    /// Component name.
    pub fn name(&self) -> &str {
        match self {
            LaunchEntry::Process(spec) => &spec.name,
            LaunchEntry::Colocated(c) => c.name(),
        }
    }
}

impl fmt::Debug for LaunchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchEntry::Process(spec) => f.debug_tuple("Process").field(spec).finish(),
            LaunchEntry::Colocated(c) => f.debug_tuple("Colocated").field(&c.name()).finish(),
        }
    }
}

struct Registered {
    component: ComponentRef,
    topology: Topology,
}

/// Registered processors of one component: key → functions.
pub type ProcessorTable = BTreeMap<String, Vec<Processor>>;

/// Managed components in registration order.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: Vec<Registered>,
    handlers: HandlerTable,
    processors: BTreeMap<String, ProcessorTable>,
}

impl ComponentRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a batch of components sharing one topology.
    ///
    /// Nothing is stored if any name is duplicated or the topology is incomplete.
    pub fn register(
        &mut self,
        components: Vec<ComponentRef>,
        topology: Topology,
    ) -> Result<(), ConfigError> {
        {
            let mut batch = HashSet::new();
            for c in &components {
                let name = c.name();
                if !batch.insert(name) || self.contains(name) {
                    return Err(ConfigError::DuplicateComponent {
                        name: name.to_string(),
                    });
                }
            }
        }
        if !topology.is_complete() {
            return Err(ConfigError::MissingProcessIdentity {
                components: components.iter().map(|c| c.name().to_string()).collect(),
            });
        }

        for component in components {
            self.handlers.register(component.as_ref());
            self.entries.push(Registered {
                component,
                topology: topology.clone(),
            });
        }
        Ok(())
    }

    /// True if a component named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.component.name() == name)
    }

    /// Component named `name`.
    pub fn resolve(&self, name: &str) -> Result<&ComponentRef, ConfigError> {
        self.entries
            .iter()
            .find(|e| e.component.name() == name)
            .map(|e| &e.component)
            .ok_or_else(|| ConfigError::UnknownComponent {
                name: name.to_string(),
            })
    }

    /// Topology of `name`.
    pub fn topology(&self, name: &str) -> Option<&Topology> {
        self.entries
            .iter()
            .find(|e| e.component.name() == name)
            .map(|e| &e.topology)
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.component.name().to_string())
            .collect()
    }

    /// Components in registration order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentRef> {
        self.entries.iter().map(|e| &e.component)
    }

    /// Operation handler table.
    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attaches `processor` under `key` to `component`.
    pub fn add_processor(
        &mut self,
        component: &str,
        key: &str,
        processor: Processor,
    ) -> Result<(), ConfigError> {
        if !self.contains(component) {
            return Err(ConfigError::UnknownComponent {
                name: component.to_string(),
            });
        }
        self.processors
            .entry(component.to_string())
            .or_default()
            .entry(key.to_string())
            .or_default()
            .push(processor);
        Ok(())
    }

    /// Processors of `component`.
    pub fn processors(&self, component: &str) -> Option<&ProcessorTable> {
        self.processors.get(component)
    }

    /// Launch units in registration order.
    ///
    /// Process units get the component's launch arguments followed by
    /// `--log-level <log_level>`.
    pub fn launch_group(&self, log_level: &str) -> Vec<LaunchEntry> {
        self.entries
            .iter()
            .map(|e| match &e.topology {
                Topology::Colocated => LaunchEntry::Colocated(e.component.clone()),
                Topology::Process {
                    package,
                    entry_point,
                } => {
                    let mut args = e.component.launch_args();
                    args.push("--log-level".to_string());
                    args.push(log_level.to_string());
                    LaunchEntry::Process(ProcessSpec {
                        name: e.component.name().to_string(),
                        package: package.clone(),
                        entry_point: entry_point.clone(),
                        args,
                    })
                }
            })
            .collect()
    }

    /// Fleet view for the monitor.
    pub fn monitor_view(&self, activate_on_start: Vec<String>) -> MonitorView {
        let with_run_type = |rt: RunType| -> Vec<String> {
            self.entries
                .iter()
                .filter(|e| e.component.run_type() == rt)
                .map(|e| e.component.name().to_string())
                .collect()
        };
        MonitorView {
            components: self.names(),
            servers: with_run_type(RunType::Server),
            action_servers: with_run_type(RunType::ActionServer),
            activate_on_start,
        }
    }
}
