//! Retry policy and scheduler options

use crate::config::SchedulerConfig;
use std::time::Duration;

/// Exponential backoff between engine attempts
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per job, including the first
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            initial_delay: Duration::from_millis(config.retry_initial_delay_ms),
            multiplier: config.retry_backoff_multiplier,
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }

    /// Same attempt budget with a fixed delay
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: delay,
            multiplier: 1.0,
            max_delay: delay,
        }
    }

    /// Delay before the attempt following `failed_attempt` (1-based)
    ///
    /// `initial_delay * multiplier^(failed_attempt - 1)`, capped at `max_delay`.
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let factor = self.multiplier.max(1.0).powi(exponent);
        let millis = self.initial_delay.as_millis() as f64 * factor;
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }

    /// Whether another attempt is allowed after `attempts` have run
    pub fn allows_another(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

/// Scheduler construction options
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerOptions {
    /// Worker slots
    pub max_concurrent_jobs: usize,
    pub retry: RetryPolicy,
}

impl SchedulerOptions {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            max_concurrent_jobs: config.max_concurrent_jobs.max(1),
            retry: RetryPolicy::from_config(config),
        }
    }

    pub fn with_max_concurrent_jobs(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max.max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}
