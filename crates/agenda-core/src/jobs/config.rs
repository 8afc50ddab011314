//! Tunables for the Job Processor and per-job-type overrides.

use crate::jobs::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Processor-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Discovery cadence, in milliseconds.
    #[serde(default = "default_process_every_ms")]
    pub process_every_ms: u64,

    /// Global cap on concurrently running handlers. 0 means unlimited.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Global cap on concurrently locked (claimed) jobs. 0 means unlimited.
    #[serde(default)]
    pub total_lock_limit: usize,

    /// Documents claimed per discovery round trip when batching is enabled.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Whether `fillQueueForName` uses `batchClaim` (true) or falls back to
    /// one `claimNext` per slot (false).
    #[serde(default = "default_true")]
    pub batching_enabled: bool,

    /// Local Ready Queue capacity.
    #[serde(default = "default_queue_capacity")]
    pub ready_queue_capacity: usize,

    /// Per-name overrides, keyed by job name.
    #[serde(default)]
    pub job_types: HashMap<String, JobTypeConfig>,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            process_every_ms: default_process_every_ms(),
            max_concurrency: default_max_concurrency(),
            total_lock_limit: 0,
            batch_size: default_batch_size(),
            batching_enabled: true,
            ready_queue_capacity: default_queue_capacity(),
            job_types: HashMap::new(),
            retry: RetryConfig::default(),
        }
    }
}

impl ProcessorConfig {
    pub fn process_every(&self) -> Duration {
        Duration::from_millis(self.process_every_ms)
    }

    pub fn job_type(&self, name: &str) -> JobTypeConfig {
        self.job_types.get(name).cloned().unwrap_or_default()
    }
}

/// Per-name overrides: concurrency ceiling, lock limit, lock lifetime, and
/// default priority for newly-discovered jobs of this name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTypeConfig {
    /// Max concurrently-running handlers for this name. 0 means unlimited.
    #[serde(default)]
    pub concurrency: usize,

    /// Max concurrently-locked jobs for this name. 0 means unlimited.
    #[serde(default)]
    pub lock_limit: usize,

    /// Claim lease duration for this name, in milliseconds.
    #[serde(default = "default_lock_lifetime_ms")]
    pub lock_lifetime_ms: u64,

    #[serde(default)]
    pub priority: i32,
}

impl Default for JobTypeConfig {
    fn default() -> Self {
        Self {
            concurrency: 0,
            lock_limit: 0,
            lock_lifetime_ms: default_lock_lifetime_ms(),
            priority: 0,
        }
    }
}

impl JobTypeConfig {
    pub fn lock_lifetime(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.lock_lifetime_ms as i64)
    }

    /// The watchdog interval named in §4.4: `max(processEvery/2,
    /// lockLifetime/2)`. Flagged in the design notes as a tuning concern
    /// when `lockLifetime << processEvery`, since the watchdog may then
    /// fire less often than the lease would warrant; carried forward
    /// unchanged because the spec asks for the observed formula, not a
    /// fix.
    pub fn watchdog_interval(&self, process_every: Duration) -> Duration {
        let half_process_every = process_every / 2;
        let half_lock_lifetime = Duration::from_millis(self.lock_lifetime_ms / 2);
        half_process_every.max(half_lock_lifetime)
    }
}

fn default_true() -> bool {
    true
}
fn default_process_every_ms() -> u64 {
    5_000
}
fn default_max_concurrency() -> usize {
    20
}
fn default_batch_size() -> usize {
    5
}
fn default_queue_capacity() -> usize {
    crate::jobs::ready_queue::DEFAULT_CAPACITY
}
fn default_lock_lifetime_ms() -> u64 {
    10 * 60 * 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = ProcessorConfig::default();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.ready_queue_capacity, 10_000);
        assert!(config.batching_enabled);
    }

    #[test]
    fn unconfigured_name_falls_back_to_defaults() {
        let config = ProcessorConfig::default();
        let jt = config.job_type("unregistered");
        assert_eq!(jt.concurrency, 0);
        assert_eq!(jt.lock_lifetime_ms, 10 * 60 * 1000);
    }

    #[test]
    fn watchdog_interval_takes_the_larger_half() {
        let jt = JobTypeConfig {
            lock_lifetime_ms: 100,
            ..Default::default()
        };
        let interval = jt.watchdog_interval(Duration::from_millis(5000));
        assert_eq!(interval, Duration::from_millis(2500));

        let jt_short_lease = JobTypeConfig {
            lock_lifetime_ms: 20_000,
            ..Default::default()
        };
        let interval = jt_short_lease.watchdog_interval(Duration::from_millis(5000));
        assert_eq!(interval, Duration::from_millis(10_000));
    }
}
