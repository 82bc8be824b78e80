//! Orchestrator core: setup, dispatch and bringup.
//!
//! The only entry points most users need are [`Launcher`] and [`Config`].
//!
//! Internal modules:
//! - [`registry`]: component registry and launch group;
//! - [`dispatch`]: runs event actions under trigger admission, applies fallbacks;
//! - [`launcher`]: the facade, bringup and graceful shutdown;
//! - [`shutdown`]: cross-platform OS termination signals.

mod builder;
mod config;
mod dispatch;
mod launcher;
mod registry;
mod shutdown;

pub use builder::LauncherBuilder;
pub use config::Config;
pub use dispatch::{Dispatcher, DispatcherParams, TriggerOutcome};
pub use launcher::{Activation, AddOptions, Launcher, LauncherHandle};
pub use registry::{ComponentRegistry, LaunchEntry, ProcessorTable};
