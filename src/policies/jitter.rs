//! # Randomization of retry delays.
//!
//! Spreads retries of many endpoints that failed together so they do not
//! hammer the system in lockstep.
//!
//! | policy         | delay                                    |
//! |----------------|------------------------------------------|
//! | `None`         | `d`                                      |
//! | `Full`         | `rand[0, d]`                             |
//! | `Equal`        | `d/2 + rand[0, d/2]`                     |
//! | `Decorrelated` | `rand[first, min(3 × d, max)]`           |

use std::time::Duration;

use rand::Rng;

/// How a base delay is randomized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JitterPolicy {
    /// Exact delay.
    #[default]
    None,
    /// Anywhere between zero and the delay.
    Full,
    /// At least half the delay.
    Equal,
    /// Between the first delay and three times the current one, capped.
    Decorrelated,
}

impl JitterPolicy {
    /// Randomizes `delay`. `Decorrelated` needs bounds, see [`Self::apply_decorrelated`].
    pub fn apply(self, delay: Duration) -> Duration {
        let ms = millis(delay);
        match self {
            JitterPolicy::None | JitterPolicy::Decorrelated => delay,
            JitterPolicy::Full => Duration::from_millis(uniform(0, ms)),
            JitterPolicy::Equal => {
                let half = ms / 2;
                Duration::from_millis(half + uniform(0, half))
            }
        }
    }

    /// Decorrelated jitter between `first` and `min(3 × prev, max)`.
    ///
    /// Other policies fall back to [`Self::apply`] on `prev`.
    pub fn apply_decorrelated(self, first: Duration, prev: Duration, max: Duration) -> Duration {
        if self != JitterPolicy::Decorrelated {
            return self.apply(prev);
        }
        let low = millis(first);
        let high = millis(prev).saturating_mul(3).min(millis(max)).max(low);
        Duration::from_millis(uniform(low, high))
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn uniform(low: u64, high: u64) -> u64 {
    if low >= high {
        return low;
    }
    rand::rng().random_range(low..=high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_exact() {
        let d = Duration::from_millis(420);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn full_and_equal_stay_in_range() {
        let d = Duration::from_millis(1000);
        for _ in 0..100 {
            assert!(JitterPolicy::Full.apply(d) <= d);
            let e = JitterPolicy::Equal.apply(d);
            assert!(e >= Duration::from_millis(500) && e <= d);
        }
    }

    #[test]
    fn zero_delay_stays_zero() {
        assert_eq!(JitterPolicy::Full.apply(Duration::ZERO), Duration::ZERO);
        assert_eq!(JitterPolicy::Equal.apply(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn decorrelated_respects_bounds() {
        let first = Duration::from_millis(100);
        let max = Duration::from_millis(900);
        for _ in 0..100 {
            let d = JitterPolicy::Decorrelated.apply_decorrelated(first, Duration::from_millis(500), max);
            assert!(d >= first && d <= max);
        }
    }
}
