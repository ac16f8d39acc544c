//! Backoff for rate-limited deletion calls
//!
//! Only errors classified as [`AwsError::TooManyRequests`] are retried;
//! everything else fails on the first attempt. The default policy makes at
//! most three attempts, waiting 60s and then 120s.
//!
//! [`AwsError::TooManyRequests`]: crate::aws::error::AwsError::TooManyRequests

use crate::aws::error::classify_anyhow_error;
use anyhow::Result;
use backon::{ExponentialBuilder, Retryable};
use cloudsweep_common::defaults::{RETRY_FACTOR, RETRY_INITIAL_DELAY, RETRY_MAX_ATTEMPTS};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// How often and how long to back off on `TooManyRequests`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first call included
    pub max_attempts: usize,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Multiplier between consecutive delays
    pub factor: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_MAX_ATTEMPTS,
            initial_delay: RETRY_INITIAL_DELAY,
            factor: RETRY_FACTOR,
        }
    }
}

impl RetryPolicy {
    fn retries(&self) -> usize {
        self.max_attempts.saturating_sub(1)
    }

    /// Exponential backoff without jitter, capped at the last planned delay
    fn backoff(&self) -> ExponentialBuilder {
        let exponent = self.retries().saturating_sub(1) as i32;
        let max_delay = self.initial_delay.mul_f32(self.factor.powi(exponent));
        ExponentialBuilder::default()
            .with_min_delay(self.initial_delay)
            .with_max_delay(max_delay)
            .with_factor(self.factor)
            .with_max_times(self.retries())
    }

    /// Run `op`, retrying while it fails with `TooManyRequests`.
    ///
    /// `on_retry` is called with the error and the delay before each retry.
    /// When attempts run out the last error is returned unchanged.
    pub async fn run<T, F, Fut>(
        &self,
        what: &str,
        op: F,
        mut on_retry: impl FnMut(&anyhow::Error, Duration),
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        op.retry(self.backoff())
            .when(|e| classify_anyhow_error(e).is_too_many_requests())
            .notify(|e, delay| {
                warn!(what, delay = ?delay, error = %e, "Rate limited, backing off");
                on_retry(e, delay);
            })
            .await
    }
}
