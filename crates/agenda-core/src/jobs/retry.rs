//! Retry Executor: wraps a write that may fail with a conflict-class
//! error in bounded exponential backoff.

use crate::jobs::error::JobError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Tunables for the Retry Executor. Defaults match the spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    100
}
fn default_max_delay_ms() -> u64 {
    5000
}

/// A classifier deciding whether an error belongs to the conflict class
/// the executor is allowed to retry. Defaults to `JobError::is_conflict`;
/// callers operating over a different error type supply their own.
pub type Classifier<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// `min(base_delay * 2^k + rand(0, base_delay), max_delay)`. The
    /// additive jitter is uniform in `[0, base_delay)` so workers woken on
    /// the same tick don't retry in lockstep (thundering herd).
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = 2u64.saturating_pow(attempt).saturating_mul(self.config.base_delay_ms);
        let jitter = if self.config.base_delay_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..self.config.base_delay_ms)
        };
        let total = exp.saturating_add(jitter).min(self.config.max_delay_ms);
        Duration::from_millis(total)
    }

    /// Run `op` up to `max_retries + 1` times. Propagates immediately on
    /// a non-retryable error or once retries are exhausted.
    pub async fn run<T, Fut>(
        &self,
        classify: impl Fn(&JobError) -> bool,
        mut op: impl FnMut() -> Fut,
    ) -> Result<T, JobError>
    where
        Fut: Future<Output = Result<T, JobError>>,
    {
        for attempt in 0..=self.config.max_retries {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let retryable = classify(&err);
                    if !retryable || attempt == self.config.max_retries {
                        return Err(err);
                    }
                    tokio::time::sleep(self.backoff_delay(attempt)).await;
                }
            }
        }
        unreachable!("loop always returns on the final iteration")
    }

    /// Convenience entry point using the default conflict classifier
    /// (`JobError::is_conflict`).
    pub async fn run_default<T, Fut>(&self, op: impl FnMut() -> Fut) -> Result<T, JobError>
    where
        Fut: Future<Output = Result<T, JobError>>,
    {
        self.run(JobError::is_conflict, op).await
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn conflict(job_name: &str) -> JobError {
        JobError::Conflict {
            job_name: job_name.to_string(),
            message: "duplicate key".to_string(),
        }
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt_when_no_error() {
        let executor = RetryExecutor::new(RetryConfig {
            max_retries: 3,
            base_delay_ms: 1,
            max_delay_ms: 10,
        });
        let attempts = Arc::new(AtomicU32::new(0));
        let a = attempts.clone();
        let result = executor
            .run(JobError::is_conflict, || {
                let a = a.clone();
                async move {
                    a.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, JobError>(42)
                }
            })
            .await
            .unwrap();

        assert_eq!(result, 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn performs_k_plus_one_attempts_when_kth_try_succeeds() {
        let executor = RetryExecutor::new(RetryConfig {
            max_retries: 5,
            base_delay_ms: 1,
            max_delay_ms: 10,
        });
        let attempts = Arc::new(AtomicU32::new(0));
        let a = attempts.clone();
        let result = executor
            .run(JobError::is_conflict, move || {
                let a = a.clone();
                async move {
                    let n = a.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(conflict("A"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result, 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries_plus_one_attempts() {
        let executor = RetryExecutor::new(RetryConfig {
            max_retries: 3,
            base_delay_ms: 1,
            max_delay_ms: 10,
        });
        let attempts = Arc::new(AtomicU32::new(0));
        let a = attempts.clone();
        let result = executor
            .run(JobError::is_conflict, move || {
                let a = a.clone();
                async move {
                    a.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(conflict("A"))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn never_retries_non_conflict_errors() {
        let executor = RetryExecutor::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let a = attempts.clone();
        let result = executor
            .run(JobError::is_conflict, move || {
                let a = a.clone();
                async move {
                    a.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(JobError::Storage("disk full".into()))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn respects_max_delay_ceiling() {
        let executor = RetryExecutor::new(RetryConfig {
            max_retries: 10,
            base_delay_ms: 1000,
            max_delay_ms: 50,
        });
        for attempt in 0..5 {
            let delay = executor.backoff_delay(attempt);
            assert!(delay.as_millis() <= 50);
        }
    }

    #[tokio::test]
    async fn write_conflict_retry_scenario_succeeds_on_third_attempt() {
        let executor = RetryExecutor::default();
        let attempts = Arc::new(AtomicU32::new(0));
        let a = attempts.clone();
        let result = executor
            .run_default(move || {
                let a = a.clone();
                async move {
                    let n = a.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(conflict("claimNext"))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
