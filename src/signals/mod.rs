//! Runtime signals: types and broadcast bus.
//!
//! Every notification the orchestrator produces at runtime travels over one
//! [`Bus`] as a [`Signal`]: health reports, lifecycle transitions, event
//! triggers, fallback outcomes, bridge activity and shutdown progress.
//!
//! ## Contents
//! - [`SignalKind`], [`Signal`] classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Launcher`, `Dispatcher`, `Monitor`, the launch backend,
//!   component run tasks (through `ComponentContext`), bridge workers.
//! - **Consumers**: the launch backend (internal event handlers), the monitor
//!   (health snapshot), the fallback listener, and the `SubscriberSet`.

mod bus;
mod signal;

pub use bus::Bus;
pub use signal::{Signal, SignalKind};
