//! Health tracking and the supervising monitor.
//!
//! ## Contents
//! - [`HealthStatus`], [`HealthTracker`], [`HealthSnapshot`] seq-ordered health state
//! - [`Monitor`], [`MonitorView`], [`MonitorState`] evaluates event conditions on a tick

mod health;
#[allow(clippy::module_inception)]
mod monitor;

pub use health::{ComponentHealth, HealthSnapshot, HealthStatus, HealthTracker};
pub use monitor::{Monitor, MonitorState, MonitorView};
