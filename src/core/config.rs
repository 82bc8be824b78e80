//! # Orchestrator configuration.
//!
//! Provides [`Config`], the centralized settings for a [`Launcher`](crate::Launcher).
//!
//! ## Sentinel values
//! - `health_interval = 0s` → no periodic health evaluation (the monitor still emits `activate_all`)
//! - `bridge_workers = 0` → unlimited bridge workers (no semaphore created)
//! - `grace = 0s` → do not wait for components after cancellation
//! - `fallback_interval = 0s` → every failure report is handled

use std::path::PathBuf;
use std::time::Duration;

use crate::bridge::codec::DEFAULT_MAX_FRAME;
use crate::policies::{BackoffPolicy, TriggerPolicy};

/// Global configuration for the orchestrator.
///
/// ## Field semantics
/// - `grace`: maximum wait for components to stop after shutdown is requested
/// - `bus_capacity`: signal bus ring buffer size (min 1; clamped)
/// - `health_interval`: monitor tick period (`0s` = off)
/// - `enable_monitoring`: registers events and evaluates their conditions
/// - `log_level`: passed to components as a launch argument, not applied by the core
/// - `config_file`: given to every component's `configure` when it is added
/// - `trigger_policy`: default admission policy for events that set none
/// - `fallback_interval`: minimum spacing between fallback attempts of one component
/// - `bridge_*`: external processor endpoints
///
/// All fields are public. Prefer the helper accessors over sentinel checks.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for components after shutdown is requested.
    ///
    /// If exceeded, bringup returns `RuntimeError::GraceExceeded` listing the
    /// components still active.
    pub grace: Duration,

    /// Capacity of the signal bus.
    ///
    /// Slow receivers lagging behind by more than `bus_capacity` signals skip
    /// the older ones.
    pub bus_capacity: usize,

    /// Period of the monitor's health evaluation. `Duration::ZERO` disables it.
    pub health_interval: Duration,

    /// When false, events passed to the launcher are ignored and conditions
    /// are never evaluated.
    pub enable_monitoring: bool,

    /// Log level forwarded to separate-process components (`--log-level`).
    pub log_level: String,

    /// Configuration file applied to components as they are added.
    pub config_file: Option<PathBuf>,

    /// Admission policy for events without their own.
    pub trigger_policy: TriggerPolicy,

    /// Failure reports of a component arriving within this interval after
    /// its last fallback attempt are ignored. `Duration::ZERO` disables it.
    pub fallback_interval: Duration,

    /// Maximum concurrently served bridge endpoints (`0` = unlimited).
    pub bridge_workers: usize,

    /// Directory holding bridge sockets.
    pub bridge_socket_dir: PathBuf,

    /// Largest accepted bridge frame in bytes.
    pub bridge_max_frame: usize,

    /// Delay policy for bridge accept retries.
    pub bridge_backoff: BackoffPolicy,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the monitor tick period as an `Option`.
    ///
    /// - `None` → health evaluation disabled
    /// - `Some(d)` → evaluate every `d`
    #[inline]
    pub fn health_interval_opt(&self) -> Option<Duration> {
        if self.health_interval == Duration::ZERO {
            None
        } else {
            Some(self.health_interval)
        }
    }

    /// Returns the bridge worker limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` endpoints served at once
    #[inline]
    pub fn bridge_worker_limit(&self) -> Option<usize> {
        if self.bridge_workers == 0 {
            None
        } else {
            Some(self.bridge_workers)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 10s`
    /// - `bus_capacity = 1024`
    /// - `health_interval = 100ms`
    /// - `enable_monitoring = true`
    /// - `log_level = "info"`
    /// - `trigger_policy = Queue`
    /// - `fallback_interval = 0s`
    /// - `bridge_workers = 0` (unlimited), sockets in `/tmp`, 8 MiB frames
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(10),
            bus_capacity: 1024,
            health_interval: Duration::from_millis(100),
            enable_monitoring: true,
            log_level: "info".to_string(),
            config_file: None,
            trigger_policy: TriggerPolicy::default(),
            fallback_interval: Duration::ZERO,
            bridge_workers: 0,
            bridge_socket_dir: PathBuf::from("/tmp"),
            bridge_max_frame: DEFAULT_MAX_FRAME,
            bridge_backoff: BackoffPolicy::default(),
        }
    }
}
