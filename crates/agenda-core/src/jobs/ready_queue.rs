//! Local Ready Queue: a bounded, priority/time-ordered holding area for
//! claimed jobs awaiting dispatch.
//!
//! Kept ordered by `(next_run_at ASC, priority DESC, FIFO)` at all times,
//! so `pop` and `pick_next_runnable` are simple scans from one end rather
//! than requiring a re-sort. Capacity is small enough (default 10,000)
//! that a `Vec`-backed ordered insert is simpler and cache-friendlier than
//! a heap, and `remove`/`pick_next_runnable` need arbitrary-position
//! removal that a heap doesn't offer cleanly.

use crate::jobs::error::{JobError, JobResult};
use crate::jobs::job::{Job, JobId};
use std::cmp::Ordering;
use std::collections::HashMap;

fn order_key(job: &Job) -> (chrono::DateTime<chrono::Utc>, i32) {
    (job.next_run_at.unwrap_or(chrono::DateTime::<chrono::Utc>::MIN_UTC), job.priority)
}

/// Compare two jobs for queue position: earlier `next_run_at` sorts first;
/// among ties, higher priority sorts first.
fn queue_order(a: &Job, b: &Job) -> Ordering {
    let (a_time, a_prio) = order_key(a);
    let (b_time, b_prio) = order_key(b);
    a_time.cmp(&b_time).then(b_prio.cmp(&a_prio))
}

pub const DEFAULT_CAPACITY: usize = 10_000;

/// A single entry in the queue, wrapping the job with insertion order for
/// FIFO tie-breaking beyond `(next_run_at, priority)`.
struct Entry {
    job: Job,
    seq: u64,
}

pub struct ReadyQueue {
    capacity: usize,
    entries: Vec<Entry>,
    next_seq: u64,
}

impl ReadyQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fraction of capacity occupied, in `[0.0, 1.0]`.
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.entries.len() as f64 / self.capacity as f64
    }

    pub fn is_near_capacity(&self, threshold: f64) -> bool {
        self.utilization() >= threshold
    }

    /// Insert at the position that keeps the queue ordered. Rejects when
    /// full; the caller MUST release the claim it was about to queue to
    /// avoid leaking a lock (spec §4.3).
    pub fn insert(&mut self, job: Job) -> Result<(), JobError> {
        if self.entries.len() >= self.capacity {
            return Err(JobError::Overflow {
                name: job.name.clone(),
                queue_size: self.entries.len(),
                max_size: self.capacity,
            });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let pos = self
            .entries
            .binary_search_by(|e| queue_order(&e.job, &job).then(e.seq.cmp(&seq)))
            .unwrap_or_else(|p| p);
        self.entries.insert(pos, Entry { job, seq });
        Ok(())
    }

    /// Remove and return the rightmost (least-urgent) element. Used only
    /// for forced pops in tests, per spec.
    pub fn pop(&mut self) -> Option<Job> {
        self.entries.pop().map(|e| e.job)
    }

    /// Remove a specific job by id. Spec leaves open whether a missing
    /// entry is ever benign; this core follows the observed contract
    /// (throws) and returns an `Invariant` error on a miss so callers that
    /// rely on speculative removal must explicitly tolerate it.
    pub fn remove(&mut self, id: JobId) -> JobResult<Job> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.job.id == id)
            .ok_or_else(|| JobError::Invariant(format!("ready queue: job {id} not found for removal")))?;
        Ok(self.entries.remove(pos).job)
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.entries.iter().any(|e| e.job.id == id)
    }

    /// Scan right to left (least-urgent first) and remove+return the
    /// first job whose name has free per-type concurrency and whose id
    /// is not excluded. The rightward bias leaves higher-priority,
    /// sooner-due jobs in the queue for the *next* dispatch pass so newly
    /// arrived urgent jobs are not starved by a single large batch.
    pub fn pick_next_runnable(
        &mut self,
        has_free_concurrency: impl Fn(&str) -> bool,
        excluded: &std::collections::HashSet<JobId>,
    ) -> Option<Job> {
        for idx in (0..self.entries.len()).rev() {
            let entry = &self.entries[idx];
            if excluded.contains(&entry.job.id) {
                continue;
            }
            if has_free_concurrency(&entry.job.name) {
                return Some(self.entries.remove(idx).job);
            }
        }
        None
    }

    /// Per-name queue depth, for status reporting.
    pub fn counts_by_name(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for entry in &self.entries {
            *counts.entry(entry.job.name.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.entries.iter().map(|e| &e.job)
    }
}

impl Default for ReadyQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn job_at(name: &str, offset_secs: i64, priority: i32) -> Job {
        Job::new(name, serde_json::json!({}))
            .with_next_run_at(chrono::Utc::now() + Duration::seconds(offset_secs))
            .with_priority(priority)
    }

    #[test]
    fn insert_keeps_ascending_time_order() {
        let mut q = ReadyQueue::new(10);
        q.insert(job_at("a", 10, 0)).unwrap();
        q.insert(job_at("b", 5, 0)).unwrap();
        q.insert(job_at("c", 1, 0)).unwrap();

        let names: Vec<_> = q.iter().map(|j| j.name.clone()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn ties_break_by_priority_descending() {
        let mut q = ReadyQueue::new(10);
        let t = chrono::Utc::now();
        q.insert(Job::new("low", serde_json::json!({})).with_next_run_at(t).with_priority(-5))
            .unwrap();
        q.insert(Job::new("high", serde_json::json!({})).with_next_run_at(t).with_priority(10))
            .unwrap();

        let names: Vec<_> = q.iter().map(|j| j.name.clone()).collect();
        assert_eq!(names, vec!["high", "low"]);
    }

    #[test]
    fn insert_rejects_when_full() {
        let mut q = ReadyQueue::new(1);
        q.insert(job_at("a", 0, 0)).unwrap();
        let err = q.insert(job_at("b", 0, 0)).unwrap_err();
        assert!(matches!(err, JobError::Overflow { .. }));
    }

    #[test]
    fn pop_removes_rightmost() {
        let mut q = ReadyQueue::new(10);
        q.insert(job_at("a", 1, 0)).unwrap();
        q.insert(job_at("b", 2, 0)).unwrap();
        let popped = q.pop().unwrap();
        assert_eq!(popped.name, "b");
    }

    #[test]
    fn remove_missing_job_is_an_error() {
        let mut q = ReadyQueue::new(10);
        let err = q.remove(JobId::new_v4()).unwrap_err();
        assert!(err.is_invariant());
    }

    #[test]
    fn pick_next_runnable_skips_exhausted_and_excluded() {
        let mut q = ReadyQueue::new(10);
        q.insert(job_at("a", 1, 0)).unwrap();
        q.insert(job_at("b", 2, 0)).unwrap();

        let excluded = std::collections::HashSet::new();
        let picked = q
            .pick_next_runnable(|name| name == "b", &excluded)
            .expect("should pick b");
        assert_eq!(picked.name, "b");
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn utilization_reports_fraction_full() {
        let mut q = ReadyQueue::new(4);
        q.insert(job_at("a", 1, 0)).unwrap();
        assert_eq!(q.utilization(), 0.25);
        assert!(!q.is_near_capacity(0.5));
    }
}
