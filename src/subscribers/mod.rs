//! # Signal subscribers.
//!
//! Observers plug into the orchestrator through [`Subscribe`]; the launcher
//! forwards every bus signal to a [`SubscriberSet`] that fans it out without
//! awaiting any subscriber.
//!
//! ```text
//! Bus ──► subscriber listener ──► SubscriberSet::emit(&Signal)
//!                                    ├──► [queue] ──► LogWriter
//!                                    └──► [queue] ──► custom ...
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
