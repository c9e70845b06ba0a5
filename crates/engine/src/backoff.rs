// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry backoff policies for the work queue.

use std::time::Duration;

/// When (if ever) a failed work item may be attempted again.
///
/// Flat data consulted by the processor after each retryable failure;
/// returning no next attempt turns the failure permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Every failure is permanent.
    NoRetry,
    /// One extra attempt after `interval`.
    RetryOnce { interval: Duration },
    /// Up to `max_attempts` attempts, evenly spaced.
    Linear { max_attempts: u32, interval: Duration },
    /// Up to `max_attempts` attempts; the delay doubles each time, capped.
    Exponential {
        max_attempts: u32,
        initial: Duration,
        max: Duration,
    },
}

impl BackoffPolicy {
    pub fn no_retry() -> Self {
        BackoffPolicy::NoRetry
    }

    pub fn retry_once(interval: Duration) -> Self {
        BackoffPolicy::RetryOnce { interval }
    }

    pub fn linear(max_attempts: u32, interval: Duration) -> Self {
        BackoffPolicy::Linear { max_attempts, interval }
    }

    pub fn exponential(max_attempts: u32, initial: Duration, max: Duration) -> Self {
        BackoffPolicy::Exponential { max_attempts, initial, max }
    }

    /// The earliest time for the next attempt, given that `attempts` have
    /// now failed. `None` means give up.
    ///
    /// The exponential delay grows as `initial * 2^(attempts - 1)`, capped
    /// at `max`.
    pub fn next_attempt_ms(&self, attempts: u32, now_ms: u64) -> Option<u64> {
        let delay = match self {
            BackoffPolicy::NoRetry => return None,
            BackoffPolicy::RetryOnce { interval } => {
                if attempts > 1 {
                    return None;
                }
                *interval
            }
            BackoffPolicy::Linear { max_attempts, interval } => {
                if attempts >= *max_attempts {
                    return None;
                }
                *interval
            }
            BackoffPolicy::Exponential { max_attempts, initial, max } => {
                if attempts >= *max_attempts {
                    return None;
                }
                let factor = 1u32.checked_shl(attempts.saturating_sub(1)).unwrap_or(u32::MAX);
                initial.saturating_mul(factor).min(*max)
            }
        };
        Some(now_ms + delay.as_millis() as u64)
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
