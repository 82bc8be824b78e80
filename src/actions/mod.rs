//! Events, actions and the registry binding them.
//!
//! ## Contents
//! - [`Event`] named trigger condition with identity and admission policy
//! - [`Action`], [`ActionKind`], [`Args`] deferred invocations and their arguments
//! - [`EventRegistry`], [`EventEntry`] validated event → actions table

mod action;
mod args;
mod event;
mod registry;

pub use action::{Action, ActionFuture, ActionKind, ExternalFn, MonitorContext, MonitorFn};
pub use args::Args;
pub use event::{Event, TriggerFn};
pub use registry::{ACTIVATE_ALL, EventEntry, EventRegistry};
