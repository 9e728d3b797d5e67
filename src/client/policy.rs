use std::time::Duration;

use crate::config::ClientConfig;

/// Internal decision for how to proceed after a failed send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Retry { delay: Duration },
    Fail,
}

/// Send retry policy.
///
/// Only the send phase is retried. Receive failures are reported after a
/// single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of send attempts, including the first one.
    pub budget: u32,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(budget: u32) -> Self {
        Self {
            budget: budget.max(1),
            min_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            budget: config.retry_budget.max(1),
            min_delay_ms: config.retry_min_delay_ms,
            max_delay_ms: config.retry_max_delay_ms.max(config.retry_min_delay_ms),
        }
    }

    pub fn with_backoff(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.min_delay_ms = min_delay.as_millis() as u64;
        self.max_delay_ms = (max_delay.as_millis() as u64).max(self.min_delay_ms);
        self
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = if self.min_delay_ms == 0 {
            0
        } else {
            // exponential backoff: min_delay * 2^attempt
            let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
            self.min_delay_ms.saturating_mul(factor)
        };
        Duration::from_millis(base.min(self.max_delay_ms))
    }

    /// Decide what to do after `failures` send attempts have failed (1-based).
    pub(crate) fn decide(&self, failures: u32) -> Decision {
        if failures >= self.budget {
            return Decision::Fail;
        }
        Decision::Retry {
            delay: self.backoff_delay(failures.saturating_sub(1)),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_RETRY_BUDGET)
    }
}
