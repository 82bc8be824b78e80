//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom signal handlers into
//! the orchestrator. Each subscriber is driven by a dedicated worker loop fed by
//! a bounded queue owned by the [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching, retries); they do **not** block
//!   the publisher nor other subscribers.
//! - Each subscriber **declares** its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. If a queue overflows, signals for that
//!   subscriber are **dropped** and a `SubscriberOverflow` signal is published.
//!
//! ## Example
//! ```rust
//! use nodevisor::{Signal, SignalKind, Subscribe};
//!
//! struct Audit;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Audit {
//!     async fn on_signal(&self, signal: &Signal) {
//!         if signal.kind == SignalKind::FallbackExhausted {
//!             // page someone
//!         }
//!     }
//!     fn name(&self) -> &'static str { "audit" }
//!     fn queue_capacity(&self) -> usize { 512 }
//! }
//! ```

use async_trait::async_trait;

use crate::signals::Signal;

/// Contract for signal subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single signal.
    async fn on_signal(&self, signal: &Signal);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
