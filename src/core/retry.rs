//! Retry policy and the tagged retry state carried by each dispatch.
//!
//! A failed report is never re-dispatched from inside its own completion.
//! Instead the job is re-armed with a bumped attempt counter and a
//! next-eligible instant, then handed back to the scheduler context.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

use crate::config::RetryConfig;
use crate::core::EntityReporter;

/// Backoff settings for failed reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry. Actual delay = base * 2^(failures - 1) (+ jitter).
    pub base_delay: Duration,
    /// Hard cap on any computed delay.
    pub max_delay: Duration,
    /// Add random jitter of `[0, base_delay / 2)`, never past `max_delay`.
    pub jitter: bool,
    /// Failed attempts allowed before a job is abandoned. `None` is unbounded.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
            jitter: cfg.jitter,
            max_attempts: cfg.max_attempts,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given number of failed attempts (1-based).
    pub fn delay_for_attempt(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1);
        // checked_shl keeps huge attempt counts from overflowing
        let multiplier = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        let capped = self
            .base_delay
            .checked_mul(multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay);

        if !self.jitter {
            return capped;
        }

        let jitter_range_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX) / 2;
        let remaining_ms =
            u64::try_from(self.max_delay.saturating_sub(capped).as_millis()).unwrap_or(0);
        let limit_ms = jitter_range_ms.min(remaining_ms);
        if limit_ms == 0 {
            return capped;
        }
        let jitter_ms = rand::rng().random_range(0..limit_ms);
        (capped + Duration::from_millis(jitter_ms)).min(self.max_delay)
    }

    /// True when a job that has failed `failures` times may not run again.
    pub fn exhausted(&self, failures: u32) -> bool {
        self.max_attempts.is_some_and(|max| failures >= max)
    }
}

/// One reporter plus its retry bookkeeping.
#[derive(Clone)]
pub struct DispatchJob {
    /// Reporter to invoke.
    pub reporter: Arc<dyn EntityReporter>,
    /// Failed attempts so far.
    pub failures: u32,
    /// Earliest instant the next attempt may start; `None` means now.
    pub next_eligible: Option<Instant>,
}

impl DispatchJob {
    /// Fresh job taken from a flush.
    pub fn new(reporter: Arc<dyn EntityReporter>) -> Self {
        Self {
            reporter,
            failures: 0,
            next_eligible: None,
        }
    }

    /// Attempt number of the next report call (1-based).
    pub const fn attempt(&self) -> u32 {
        self.failures + 1
    }

    /// Record a failure and compute when the job becomes eligible again.
    /// Returns `None` once the policy is exhausted.
    pub fn rearm(mut self, policy: &RetryPolicy, now: Instant) -> Option<Self> {
        self.failures += 1;
        if policy.exhausted(self.failures) {
            return None;
        }
        self.next_eligible = Some(now + policy.delay_for_attempt(self.failures));
        Some(self)
    }
}

impl fmt::Debug for DispatchJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchJob")
            .field("reporter", &self.reporter.to_string())
            .field("failures", &self.failures)
            .field("next_eligible", &self.next_eligible)
            .finish()
    }
}
