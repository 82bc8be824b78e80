//! # Retry delays for failing loops.
//!
//! [`BackoffPolicy`] tells a retrying loop how long to wait after the `n`-th
//! consecutive failure. Bridge endpoints use it when `accept` fails.
//!
//! The delay for failure `n` (0-indexed) is `first × factor^n`, capped at
//! `max`, then passed through the [`JitterPolicy`]. The base is derived from
//! `n` alone, so jittered delays never feed back into later ones.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use nodevisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy::exponential(Duration::from_millis(50), Duration::from_secs(2));
//! assert_eq!(backoff.next(0), Duration::from_millis(50));
//! assert_eq!(backoff.next(2), Duration::from_millis(200));
//! assert_eq!(backoff.next(20), Duration::from_secs(2));
//! assert_eq!(backoff.jitter, JitterPolicy::None);
//! ```

use std::time::Duration;

use super::jitter::JitterPolicy;

/// Delay schedule for consecutive failures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failure.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Growth factor per failure (`1.0` keeps the delay constant).
    pub factor: f64,
    /// Randomization applied to each delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 100ms`, `factor = 2.0`, `max = 5s`, equal jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(5),
            factor: 2.0,
            jitter: JitterPolicy::Equal,
        }
    }
}

impl BackoffPolicy {
    /// Same delay after every failure.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Doubling delays from `first` up to `max`, without jitter.
    pub fn exponential(first: Duration, max: Duration) -> Self {
        Self {
            first,
            max,
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Replaces the jitter policy.
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay to wait after failure number `failures` (0 = first failure).
    pub fn next(&self, failures: u32) -> Duration {
        let exp = i32::try_from(failures).unwrap_or(i32::MAX);
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if secs.is_finite() && secs >= 0.0 && secs <= self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            other => other.apply(base),
        }
    }
}
