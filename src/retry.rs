use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How many failed trials an aggregation tolerates and how long it waits
/// between attempts.
///
/// `max_failures: None` retries without limit. Backoff doubles from
/// `initial_backoff_ms` up to `max_backoff_ms`; each wait is drawn uniformly
/// from the upper half of the current step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_failures: Option<u32>,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_failures: Some(16),
            initial_backoff_ms: 10,
            max_backoff_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    /// Retries forever without waiting.
    pub fn unbounded() -> Self {
        Self {
            max_failures: None,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Allows `max_failures` failed trials, without waiting between attempts.
    pub fn immediate(max_failures: u32) -> Self {
        Self {
            max_failures: Some(max_failures),
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Whether another attempt is allowed after `failures` failed trials.
    pub fn allows(&self, failures: u32) -> bool {
        self.max_failures.is_none_or(|max| failures <= max)
    }

    /// Upper bound of the wait after the `failures`-th failed trial (1-based).
    pub fn backoff_ceiling(&self, failures: u32) -> Duration {
        if self.initial_backoff_ms == 0 || failures == 0 {
            return Duration::ZERO;
        }
        let shift = (failures - 1).min(32);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(1u64 << shift)
            .min(self.max_backoff_ms.max(self.initial_backoff_ms));
        Duration::from_millis(millis)
    }

    pub fn backoff(&self, failures: u32) -> Duration {
        let ceiling = self.backoff_ceiling(failures);
        if ceiling.is_zero() {
            return ceiling;
        }
        let upper = ceiling.as_micros() as u64;
        let jittered = rand::thread_rng().gen_range(upper / 2..=upper);
        Duration::from_micros(jittered)
    }
}
