//! Retry, fallback and admission policies.
//!
//! ## Contents
//! - [`FallbackPolicy`], [`FallbackEngine`] what to run when a component fails, and how often
//! - [`TriggerPolicy`] what happens to a trigger while its event is still dispatching
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`] randomization strategy to avoid thundering herd
//!
//! ## Quick wiring
//! ```text
//! Launcher::set_fallback(..) ──► FallbackEngine ──► fallback listener (Dispatcher)
//! Event::with_policy(..) / Config::trigger_policy ──► Dispatcher slots
//! Config::bridge_backoff ──► bridge endpoints (accept retries)
//! ```

mod admission;
mod backoff;
mod fallback;
mod jitter;

pub use admission::TriggerPolicy;
pub use backoff::BackoffPolicy;
pub use fallback::{FallbackEngine, FallbackOutcome, FallbackPolicy};
pub use jitter::JitterPolicy;
