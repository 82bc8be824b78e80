use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{config::Config, launcher::Launcher};
use crate::launch::{Launch, LocalLaunch};
use crate::signals::Bus;
use crate::subscribers::Subscribe;

/// Builder for constructing a [`Launcher`] with optional collaborators.
pub struct LauncherBuilder {
    cfg: Config,
    launch: Option<Arc<dyn Launch>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl LauncherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            launch: None,
            subscribers: Vec::new(),
        }
    }

    /// Replaces the launch backend (default: [`LocalLaunch`]).
    pub fn with_launch(mut self, launch: Arc<dyn Launch>) -> Self {
        self.launch = Some(launch);
        self
    }

    /// Sets signal subscribers.
    ///
    /// Subscribers receive every runtime signal through dedicated workers
    /// with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the launcher.
    ///
    /// The signal bus exists from here on, so [`Launcher::handle`] can be
    /// taken before bringup.
    pub fn build(self) -> Launcher {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let launch = self
            .launch
            .unwrap_or_else(|| Arc::new(LocalLaunch::new()));
        Launcher::new_internal(
            self.cfg,
            bus,
            launch,
            self.subscribers,
            CancellationToken::new(),
        )
    }
}
