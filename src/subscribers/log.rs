//! # Logging subscriber.
//!
//! [`LogWriter`] renders every bus [`Signal`] as a `tracing` event: failures
//! at `warn`, everything else at `info` or `debug`. Installing a
//! `tracing` subscriber is up to the binary.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::Subscribe;
use crate::signals::{Signal, SignalKind};

/// Subscriber forwarding signals to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Creates the writer.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_signal(&self, s: &Signal) {
        let component = s.component.as_deref().unwrap_or("-");
        let event = s.event.as_deref().unwrap_or("-");
        let reason = s.reason.as_deref().unwrap_or("");

        match s.kind {
            SignalKind::HealthReported => match s.status {
                Some(status) if status.is_failure() => {
                    warn!(seq = s.seq, component, %status, reason, "health failure reported");
                }
                _ => debug!(seq = s.seq, component, "healthy"),
            },
            SignalKind::TransitionRequested => {
                debug!(seq = s.seq, component, transition = ?s.transition, "transition requested");
            }
            SignalKind::TransitionApplied => {
                info!(seq = s.seq, component, transition = ?s.transition, state = ?s.state, "transition applied");
            }
            SignalKind::TransitionFailed => {
                warn!(seq = s.seq, component, transition = ?s.transition, reason, "transition failed");
            }
            SignalKind::EventTriggered => info!(seq = s.seq, event, "event triggered"),
            SignalKind::EventDispatched => debug!(seq = s.seq, event, "event dispatched"),
            SignalKind::TriggerDropped => warn!(seq = s.seq, event, "trigger dropped, dispatch in progress"),
            SignalKind::ActionFailed => warn!(seq = s.seq, event, component, reason, "action failed"),
            SignalKind::FallbackInvoked => {
                info!(seq = s.seq, component, attempt = ?s.attempt, reason, "fallback invoked");
            }
            SignalKind::FallbackExhausted => {
                warn!(seq = s.seq, component, max_retries = ?s.attempt, "fallback exhausted, failure unrecovered");
            }
            SignalKind::ComponentLaunched => info!(seq = s.seq, component, topology = reason, "component launched"),
            SignalKind::BridgeListening => {
                info!(seq = s.seq, component, address = ?s.address, "bridge endpoint listening");
            }
            SignalKind::BridgeConnected => debug!(seq = s.seq, component, address = ?s.address, "bridge peer connected"),
            SignalKind::BridgeDisconnected => debug!(seq = s.seq, component, address = ?s.address, "bridge peer disconnected"),
            SignalKind::BridgeError => warn!(seq = s.seq, component, address = ?s.address, reason, "bridge error"),
            SignalKind::Ready => info!(seq = s.seq, "orchestrator ready"),
            SignalKind::ShutdownRequested => info!(seq = s.seq, "shutdown requested"),
            SignalKind::AllStoppedWithin => info!(seq = s.seq, "all components stopped within grace"),
            SignalKind::GraceExceeded => warn!(seq = s.seq, reason, "grace period exceeded"),
            SignalKind::SubscriberPanicked | SignalKind::SubscriberOverflow => {
                warn!(seq = s.seq, subscriber = component, kind = ?s.kind, reason, "subscriber problem");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::monitor::HealthStatus;
    use crate::signals::Bus;
    use crate::subscribers::SubscriberSet;

    #[tokio::test]
    async fn renders_through_a_subscriber_set() {
        let writer = LogWriter::new();
        assert_eq!(writer.name(), "log_writer");

        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(writer) as Arc<dyn Subscribe>], bus);
        set.emit(&Signal::health("lidar", HealthStatus::SystemFailure).with_reason("no data"));
        set.emit(&Signal::triggered("lidar_down"));
        set.emit(&Signal::new(SignalKind::GraceExceeded));
        set.shutdown().await;

        // Nothing panicked, nothing overflowed.
        assert!(rx.try_recv().is_err());
    }
}
