//! Bounded exponential backoff with jitter.
//!
//! [`ExponentialBackoff`] is a pure calculator: given how many consecutive
//! attempts have failed it returns how long to wait. It keeps no timing
//! state; [`RequestState`](super::RequestState) owns that.
//!
//! ```text
//! backoff(n) = clamp(floor * base^n * jitter, floor, ceiling)
//! jitter     = uniform in [1 - ratio, 1 + ratio]
//! ```

use std::time::Duration;

use crate::constants::RETRY_BACKOFF_EXP_BASE;

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Bounded exponential backoff calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    initial_ms: u64,
    max_ms: u64,
    multiplier: u32,
    jitter: f64,
    /// Smallest exponent at which the ceiling is reached.
    exp_max: u32,
}

impl ExponentialBackoff {
    /// Create a backoff growing from `initial_ms` to `max_ms`.
    ///
    /// A ceiling below the floor is raised to the floor. Jitter is clamped
    /// to `[0, 1)`. A multiplier below 2 is raised to 2.
    pub fn new(initial_ms: u64, multiplier: u32, max_ms: u64, jitter: f64) -> Self {
        let max_ms = max_ms.max(initial_ms);
        let multiplier = multiplier.max(2);
        let jitter = if jitter.is_finite() {
            jitter.clamp(0.0, 0.999)
        } else {
            0.0
        };

        let mut exp_max = 0;
        if initial_ms > 0 {
            let mut term = initial_ms;
            while term < max_ms {
                term = term.saturating_mul(u64::from(multiplier));
                exp_max += 1;
            }
        }

        Self {
            initial_ms,
            max_ms,
            multiplier,
            jitter,
            exp_max,
        }
    }

    /// Backoff doubling from `retry_backoff` up to `retry_backoff_max`.
    pub fn from_durations(retry_backoff: Duration, retry_backoff_max: Duration, jitter: f64) -> Self {
        Self::new(
            saturating_millis(retry_backoff),
            RETRY_BACKOFF_EXP_BASE,
            saturating_millis(retry_backoff_max),
            jitter,
        )
    }

    /// The floor.
    #[inline]
    pub fn initial_ms(&self) -> u64 {
        self.initial_ms
    }

    /// The ceiling.
    #[inline]
    pub fn max_ms(&self) -> u64 {
        self.max_ms
    }

    #[inline]
    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Backoff after `attempts` consecutive failures.
    ///
    /// `backoff(0)` is the floor (before jitter).
    pub fn backoff(&self, attempts: u32) -> u64 {
        if self.exp_max == 0 {
            return self.initial_ms;
        }

        let exp = attempts.min(self.exp_max);
        let term = self.initial_ms as f64 * (self.multiplier as f64).powi(exp as i32);
        let factor = if self.jitter > f64::EPSILON {
            1.0 - self.jitter + fastrand::f64() * 2.0 * self.jitter
        } else {
            1.0
        };

        ((term * factor) as u64).clamp(self.initial_ms, self.max_ms)
    }
}
