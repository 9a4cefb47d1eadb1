//! Bounded retry with exponential backoff and per-call timeouts.
//!
//! Every call to an external service goes through a [`RetryPolicy`]. Reads
//! (embedding, similarity search, generation) use [`RetryPolicy::run`], which
//! retries [`AppError::Service`] failures. Writes to the vector store use
//! [`RetryPolicy::run_once`]: they get the timeout but are never repeated.

use crate::types::{AppError, Result};
use crate::utils::toml_config::RetryConfig;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Applied to each attempt separately
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            timeout: config.request_timeout(),
        }
    }

    /// A policy that never retries.
    pub fn no_retry(timeout: Duration) -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            timeout,
        }
    }

    /// Delay before retry number `attempt` (1-based), without jitter.
    pub fn base_backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let delay = self.initial_backoff.saturating_mul(1u32 << exp);
        delay.min(self.max_backoff)
    }

    fn backoff_with_jitter(&self, attempt: u32) -> Duration {
        let base = self.base_backoff(attempt);
        let jitter_ms = (base.as_millis() / 10) as u64;
        if jitter_ms == 0 {
            return base;
        }
        let jitter = rand::rng().random_range(0..=jitter_ms);
        (base + Duration::from_millis(jitter)).min(self.max_backoff)
    }

    /// Run an idempotent operation, retrying transient service failures.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            let err = match self.attempt(operation, call()).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() || attempt >= self.max_retries {
                return Err(err);
            }

            attempt += 1;
            let delay = self.backoff_with_jitter(attempt);
            warn!(
                operation,
                attempt,
                max_retries = self.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Service call failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Run a non-idempotent operation once, bounded by the timeout.
    pub async fn run_once<T, Fut>(&self, operation: &str, call: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        self.attempt(operation, call).await
    }

    async fn attempt<T, Fut>(&self, operation: &str, call: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        match timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Service(format!(
                "{} timed out after {}s",
                operation,
                self.timeout.as_secs_f32()
            ))),
        }
    }
}
