//! The Persistent Job Record and its lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique job identifier.
pub type JobId = Uuid;

/// Whether at most one record may exist per `name` (`Single`) or the
/// name may have arbitrarily many concurrent/queued records (`Normal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Normal,
    Single,
}

impl Default for JobType {
    fn default() -> Self {
        JobType::Normal
    }
}

/// A document in the shared store: the unit the Processor claims, runs,
/// and reconciles. Field names follow the data model directly so the
/// mapping onto storage columns is one-to-one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,

    /// Identifies the handler type; looked up in the definitions registry.
    pub name: String,

    /// Handler-defined payload.
    pub data: serde_json::Value,

    /// Signed priority in `[-20, 20]`. Higher runs earlier when
    /// `next_run_at` ties. Not a global ordering guarantee, only a sort key.
    pub priority: i32,

    /// Instant of next eligible execution. `None` means not scheduled.
    pub next_run_at: Option<DateTime<Utc>>,

    /// Instant this job was claimed by a worker, or `None` if unclaimed.
    pub locked_at: Option<DateTime<Utc>>,

    pub last_run_at: Option<DateTime<Utc>>,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,

    /// Monotonically non-decreasing across the job's lifetime (invariant 4).
    pub fail_count: u32,
    pub fail_reason: Option<String>,

    /// Advisory progress indicator, 0..100.
    pub progress: Option<u8>,

    /// Disabled jobs are skipped during discovery.
    pub disabled: bool,

    pub job_type: JobType,

    /// When set, a successful run reschedules by recomputing `next_run_at`
    /// from this interval instead of clearing it.
    pub repeat_interval: Option<RepeatInterval>,
}

/// A recurrence specifier. Only fixed durations are modeled here; cron
/// expression parsing belongs to the job-authoring surface, out of scope
/// for this core (see spec's non-goals).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RepeatInterval(pub chrono::Duration);

impl Job {
    /// Construct a new, unclaimed, immediately-eligible job.
    pub fn new(name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: JobId::new_v4(),
            name: name.into(),
            data,
            priority: 0,
            next_run_at: Some(Utc::now()),
            locked_at: None,
            last_run_at: None,
            last_finished_at: None,
            failed_at: None,
            fail_count: 0,
            fail_reason: None,
            progress: None,
            disabled: false,
            job_type: JobType::Normal,
            repeat_interval: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority.clamp(-20, 20);
        self
    }

    pub fn with_next_run_at(mut self, at: DateTime<Utc>) -> Self {
        self.next_run_at = Some(at);
        self
    }

    pub fn single(mut self) -> Self {
        self.job_type = JobType::Single;
        self
    }

    pub fn repeating(mut self, interval: chrono::Duration) -> Self {
        self.repeat_interval = Some(RepeatInterval(interval));
        self
    }

    /// Invariant 1: a job is claimed iff `locked_at` is set.
    pub fn is_claimed(&self) -> bool {
        self.locked_at.is_some()
    }

    /// Invariant 2's eligibility predicate, evaluated locally (the
    /// Repository re-evaluates this as part of its atomic update so this
    /// copy is for bookkeeping/tests, not for gating a claim decision).
    pub fn is_eligible(&self, scan_horizon: DateTime<Utc>, lock_deadline: DateTime<Utc>) -> bool {
        if self.disabled {
            return false;
        }
        let unclaimed_and_due = self.locked_at.is_none()
            && self.next_run_at.map(|t| t <= scan_horizon).unwrap_or(false);
        let stale_claim = self.locked_at.map(|t| t <= lock_deadline).unwrap_or(false);
        unclaimed_and_due || stale_claim
    }

    /// Invariant 3: whether this claim has exceeded its lease.
    pub fn is_lock_expired(&self, lock_lifetime: chrono::Duration, now: DateTime<Utc>) -> bool {
        match self.locked_at {
            None => true,
            Some(locked_at) => now - locked_at >= lock_lifetime,
        }
    }

    /// Success path: advance bookkeeping and, if recurring, reschedule;
    /// otherwise clear `next_run_at` so the job is no longer eligible.
    pub fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.locked_at = None;
        self.last_run_at = Some(now);
        self.last_finished_at = Some(now);
        match self.repeat_interval {
            Some(RepeatInterval(interval)) => self.next_run_at = Some(now + interval),
            None => self.next_run_at = None,
        }
    }

    /// Failure path: bump telemetry, clear the lock so another worker (or
    /// this one, next tick) may retry it. `next_run_at` is left untouched,
    /// matching the described retry contract of at-least-once execution.
    pub fn mark_failed(&mut self, now: DateTime<Utc>, reason: impl Into<String>) {
        self.locked_at = None;
        self.last_run_at = Some(now);
        self.failed_at = Some(now);
        self.fail_count += 1;
        self.fail_reason = Some(reason.into());
    }

    /// Release without running: clear the lock, keep `next_run_at`.
    pub fn release(&mut self) {
        self.locked_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_job_is_unclaimed_and_due() {
        let job = Job::new("send_email", serde_json::json!({"to": "a@b.com"}));
        assert!(!job.is_claimed());
        assert_eq!(job.fail_count, 0);
        assert!(!job.disabled);
    }

    #[test]
    fn eligibility_covers_due_unclaimed_and_stale_claim() {
        let now = Utc::now();
        let scan_horizon = now + Duration::seconds(10);
        let lock_deadline = now - Duration::seconds(30);

        let mut due = Job::new("a", serde_json::json!({})).with_next_run_at(now - Duration::seconds(1));
        assert!(due.is_eligible(scan_horizon, lock_deadline));

        due.locked_at = Some(now - Duration::seconds(1));
        assert!(!due.is_eligible(scan_horizon, lock_deadline));

        due.locked_at = Some(now - Duration::seconds(60));
        assert!(due.is_eligible(scan_horizon, lock_deadline));
    }

    #[test]
    fn disabled_job_is_never_eligible() {
        let now = Utc::now();
        let mut job = Job::new("a", serde_json::json!({})).with_next_run_at(now - Duration::seconds(1));
        job.disabled = true;
        assert!(!job.is_eligible(now + Duration::seconds(10), now - Duration::seconds(30)));
    }

    #[test]
    fn completion_reschedules_recurring_jobs() {
        let now = Utc::now();
        let mut job = Job::new("heartbeat", serde_json::json!({})).repeating(Duration::seconds(60));
        job.locked_at = Some(now);
        job.mark_completed(now);

        assert!(job.locked_at.is_none());
        assert_eq!(job.next_run_at, Some(now + Duration::seconds(60)));
    }

    #[test]
    fn completion_clears_next_run_at_for_one_shot_jobs() {
        let now = Utc::now();
        let mut job = Job::new("one_shot", serde_json::json!({}));
        job.locked_at = Some(now);
        job.mark_completed(now);
        assert!(job.next_run_at.is_none());
    }

    #[test]
    fn failure_increments_fail_count_monotonically() {
        let now = Utc::now();
        let mut job = Job::new("flaky", serde_json::json!({}));
        job.locked_at = Some(now);
        job.mark_failed(now, "boom");
        assert_eq!(job.fail_count, 1);
        job.locked_at = Some(now);
        job.mark_failed(now, "boom again");
        assert_eq!(job.fail_count, 2);
        assert_eq!(job.fail_reason.as_deref(), Some("boom again"));
    }

    #[test]
    fn lock_expiry_treats_missing_lock_as_expired() {
        let now = Utc::now();
        let job = Job::new("a", serde_json::json!({}));
        assert!(job.is_lock_expired(Duration::seconds(30), now));
    }
}
