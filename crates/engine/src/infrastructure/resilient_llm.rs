//! Retrying wrapper for any `LlmPort`
//!
//! Transient failures are retried with exponential backoff plus jitter.
//! Client errors (bad request, auth) fail on the first attempt.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};

/// Backoff schedule for retried LLM calls.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 = single attempt).
    pub max_retries: u32,
    pub base_delay_ms: u64,
    /// Cap on the exponential growth.
    pub max_delay_ms: u64,
    /// Fraction (0.0-1.0) of the delay randomized in either direction.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            jitter_factor: 0.2,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay before retry number `retry` (1-based), without jitter.
    pub fn backoff_ms(&self, retry: u32) -> u64 {
        let factor = 2u64.saturating_pow(retry.saturating_sub(1));
        self.base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms)
    }

    fn jittered_ms(&self, retry: u32) -> u64 {
        let delay = self.backoff_ms(retry);
        let spread = (delay as f64 * self.jitter_factor.clamp(0.0, 1.0)) as i64;
        if spread == 0 {
            return delay;
        }
        let offset = rand::thread_rng().gen_range(-spread..=spread);
        (delay as i64).saturating_add(offset).max(0) as u64
    }
}

pub struct ResilientLlmClient {
    inner: Arc<dyn LlmPort>,
    config: RetryConfig,
}

impl ResilientLlmClient {
    pub fn new(inner: Arc<dyn LlmPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl LlmPort for ResilientLlmClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut retry = 0;
        loop {
            let error = match self.inner.generate(request.clone()).await {
                Ok(response) => {
                    if retry > 0 {
                        tracing::info!(attempt = retry + 1, "LLM request succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                tracing::error!(error = %error, "LLM request failed with non-retryable error");
                return Err(error);
            }
            if retry >= self.config.max_retries {
                tracing::error!(
                    attempts = retry + 1,
                    error = %error,
                    "LLM request failed after all retry attempts"
                );
                return Err(error);
            }

            retry += 1;
            let delay = self.config.jittered_ms(retry);
            tracing::warn!(
                attempt = retry,
                max_retries = self.config.max_retries,
                delay_ms = delay,
                error = %error,
                "LLM request failed, retrying"
            );
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}
