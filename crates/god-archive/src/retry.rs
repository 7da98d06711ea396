//! Retry policy for archive downloads

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default attempt budget per archive
pub const MAX_ATTEMPTS: u32 = 5;

/// Delay between failed attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Retry immediately
    #[default]
    None,
    /// Same delay after every failure
    Fixed { delay_ms: u64 },
    /// `base_ms * 2^(failures - 1)`, capped at `max_ms`
    Exponential { base_ms: u64, max_ms: u64 },
}

impl Backoff {
    /// Delay to wait after the `failures`-th consecutive failure (1-based)
    #[must_use]
    pub fn delay(&self, failures: u32) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Self::Exponential { base_ms, max_ms } => {
                let shift = failures.saturating_sub(1).min(63);
                let factor = 1u64.checked_shl(shift).unwrap_or(u64::MAX);
                Duration::from_millis(base_ms.saturating_mul(factor).min(max_ms))
            }
        }
    }
}

/// Bounded retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay between attempts
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Default policy: five immediate attempts
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With attempt budget
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// With backoff strategy
    #[inline]
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            backoff: Backoff::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_backoff_is_immediate() {
        assert_eq!(Backoff::None.delay(1), Duration::ZERO);
        assert_eq!(Backoff::None.delay(4), Duration::ZERO);
    }

    #[test]
    fn fixed_backoff_is_constant() {
        let b = Backoff::Fixed { delay_ms: 250 };
        assert_eq!(b.delay(1), Duration::from_millis(250));
        assert_eq!(b.delay(3), Duration::from_millis(250));
    }

    #[test]
    fn exponential_backoff_doubles_then_caps() {
        let b = Backoff::Exponential {
            base_ms: 100,
            max_ms: 1000,
        };
        assert_eq!(b.delay(1), Duration::from_millis(100));
        assert_eq!(b.delay(2), Duration::from_millis(200));
        assert_eq!(b.delay(4), Duration::from_millis(800));
        assert_eq!(b.delay(5), Duration::from_millis(1000));
        assert_eq!(b.delay(200), Duration::from_millis(1000));
    }

    #[test]
    fn default_policy_matches_attempt_budget() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, MAX_ATTEMPTS);
        assert_eq!(policy.backoff, Backoff::None);
    }
}
