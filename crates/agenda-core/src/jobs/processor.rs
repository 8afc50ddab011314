//! Job Processor (spec.md §4.4): the orchestrator tying the Repository,
//! the Local Ready Queue, the Definitions Registry, and the External Job
//! Handle together into one discovery/dispatch/supervise loop.
//!
//! Grounded on the shape of the teacher's background workers
//! (`jobs::worker`, now removed) and `repository::postgres` for the
//! retry-wrapped store access pattern; the watchdog race is built on
//! `tokio::select!` the way the teacher races a shutdown signal against
//! request handling elsewhere in the crate.

use crate::jobs::config::ProcessorConfig;
use crate::jobs::error::{JobError, JobResult};
use crate::jobs::events::{EventBus, JobEvent, JobEventError};
use crate::jobs::handle::{DefaultJobHandle, JobHandle};
use crate::jobs::job::{Job, JobId};
use crate::jobs::ready_queue::ReadyQueue;
use crate::jobs::registry::DefinitionsRegistry;
use crate::jobs::repository::JobRepository;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 2^31 milliseconds, the largest delay tokio's timer wheel accepts
/// without overflowing; any configured interval larger than this (a
/// misconfigured `lockLifetime`, say) is clamped rather than panicking.
const MAX_TIMER_MS: u64 = 1u64 << 31;

fn clamp_delay(duration: Duration) -> Duration {
    let ms = duration.as_millis() as u64;
    Duration::from_millis(ms.min(MAX_TIMER_MS))
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct NameCounters {
    pub queued: usize,
    pub running: usize,
    pub locked: usize,
    /// Whether this name's lock ceiling was hit on the most recent
    /// discovery pass (spec.md §4.4 step 1's `lockLimitReached[name]`).
    pub lock_limit_reached: bool,
}

/// Status snapshot (spec.md §6, "produced"): queue occupancy, per-name
/// counters/limits, and the processor-wide concurrency counters. With
/// `full_details` requested, also carries the actual job lists instead
/// of just their lengths.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ProcessorStatus {
    pub queue_size: usize,
    pub queue_utilization: f64,
    pub running_total: usize,
    pub locked_total: usize,
    /// Currently-running handler count vs. `max_concurrency` (spec's
    /// `localQueueProcessing`).
    pub local_queue_processing: usize,
    /// Whether the processor-wide lock ceiling is currently saturated
    /// (spec's `localLockLimitReached`).
    pub local_lock_limit_reached: bool,
    pub jobs_to_claim: usize,
    pub by_name: HashMap<String, NameCounters>,
    /// Populated only when `full_details` is requested.
    pub queued_jobs: Option<Vec<Job>>,
    pub running_job_ids: Option<Vec<JobId>>,
    pub locked_job_ids: Option<Vec<JobId>>,
}

struct RunningEntry {
    job: Job,
}

/// Orchestrates discovery, local queuing, and supervised execution for
/// every name in the `DefinitionsRegistry`. Long-lived; construct once
/// per process and share via `Arc`.
pub struct JobProcessor {
    repository: Arc<dyn JobRepository>,
    registry: Arc<dyn DefinitionsRegistry>,
    config: ProcessorConfig,
    retry: crate::jobs::retry::RetryExecutor,

    ready_queue: Mutex<ReadyQueue>,
    pending_claims: Mutex<Vec<(JobId, String)>>,

    running: DashMap<JobId, RunningEntry>,
    running_by_name: DashMap<String, usize>,
    locked_by_name: DashMap<String, usize>,
    locked_total: AtomicUsize,
    /// Whether `fill_queue_for_name` bailed out on `should_lock(name) ==
    /// false` on its most recent pass, per spec.md §4.4 step 1.
    lock_limit_reached: DashMap<String, bool>,

    /// Jobs with an outstanding deferred-dispatch timer (spec.md §4.5's
    /// `gotTimerToExecute` flag, tracked here rather than on the handle
    /// since it's only meaningful while a job sits in the queue). Prevents
    /// two dispatch passes from arming the same job twice.
    timer_armed: DashMap<JobId, ()>,

    events: EventBus,
    stop_token: CancellationToken,
}

impl JobProcessor {
    pub fn new(
        repository: Arc<dyn JobRepository>,
        registry: Arc<dyn DefinitionsRegistry>,
        config: ProcessorConfig,
    ) -> Arc<Self> {
        let ready_queue = Mutex::new(ReadyQueue::new(config.ready_queue_capacity));
        let retry = crate::jobs::retry::RetryExecutor::new(config.retry.clone());
        Arc::new(Self {
            repository,
            registry,
            config,
            retry,
            ready_queue,
            pending_claims: Mutex::new(Vec::new()),
            running: DashMap::new(),
            running_by_name: DashMap::new(),
            locked_by_name: DashMap::new(),
            locked_total: AtomicUsize::new(0),
            lock_limit_reached: DashMap::new(),
            timer_armed: DashMap::new(),
            events: EventBus::default(),
            stop_token: CancellationToken::new(),
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    /// Spawn the discovery loop on the current runtime. Returns a handle
    /// the caller may `.await` to block until `stop()` is called.
    pub fn start(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = this.stop_token.cancelled() => break,
                    _ = tokio::time::sleep(clamp_delay(this.config.process_every())) => {
                        if let Err(err) = this.process().await {
                            warn!(error = %err, "discovery pass failed");
                            this.events.emit(JobEvent::Error(JobEventError {
                                name: None,
                                message: err.to_string(),
                            }));
                        }
                    }
                }
            }
        })
    }

    /// Signal the discovery loop to stop after its current tick and
    /// return every job still claimed by this worker — queued and
    /// in-flight — so the caller can release them (spec.md §4.4 `stop`).
    /// In-flight handlers are not forcibly aborted; they keep running
    /// until the watchdog or a natural completion clears their claim.
    pub fn stop(&self) -> Vec<Job> {
        self.stop_token.cancel();
        let mut claimed: Vec<Job> = self.ready_queue.lock().unwrap().iter().cloned().collect();
        claimed.extend(self.running.iter().map(|e| e.value().job.clone()));
        claimed
    }

    /// Observable state for metrics (spec.md §4.4/§6). `full_details`
    /// trades the lengths-only view for the actual job/id lists.
    pub fn status(&self, full_details: bool) -> ProcessorStatus {
        let queue = self.ready_queue.lock().unwrap();
        let mut by_name: HashMap<String, NameCounters> = HashMap::new();
        for (name, queued) in queue.counts_by_name() {
            by_name.entry(name).or_default().queued = queued;
        }
        for entry in self.running_by_name.iter() {
            by_name.entry(entry.key().clone()).or_default().running = *entry.value();
        }
        for entry in self.locked_by_name.iter() {
            by_name.entry(entry.key().clone()).or_default().locked = *entry.value();
        }
        for entry in self.lock_limit_reached.iter() {
            by_name.entry(entry.key().clone()).or_default().lock_limit_reached = *entry.value();
        }

        let running_total = self.running.len();
        let local_lock_limit_reached = self.config.total_lock_limit > 0
            && self.locked_total.load(Ordering::SeqCst) >= self.config.total_lock_limit;

        let (queued_jobs, running_job_ids, locked_job_ids) = if full_details {
            let queued: Vec<Job> = queue.iter().cloned().collect();
            let running_ids: Vec<JobId> = self.running.iter().map(|e| *e.key()).collect();
            let mut locked_ids: Vec<JobId> = queued.iter().map(|j| j.id).collect();
            locked_ids.extend(running_ids.iter().copied());
            (Some(queued), Some(running_ids), Some(locked_ids))
        } else {
            (None, None, None)
        };

        ProcessorStatus {
            queue_size: queue.len(),
            queue_utilization: queue.utilization(),
            running_total,
            locked_total: self.locked_total.load(Ordering::SeqCst),
            local_queue_processing: running_total,
            local_lock_limit_reached,
            jobs_to_claim: self.pending_claims.lock().unwrap().len(),
            by_name,
            queued_jobs,
            running_job_ids,
            locked_job_ids,
        }
    }

    /// Per-name lock ceiling (spec.md §6: the Definitions Registry is the
    /// authoritative source for `{concurrency, lockLimit, lockLifetime,
    /// priority}`). Falls back to `ProcessorConfig.job_types` only for a
    /// name with no registered definition.
    fn lock_limit_for(&self, name: &str) -> usize {
        match self.registry.get(name) {
            Some(definition) => definition.lock_limit,
            None => self.config.job_type(name).lock_limit,
        }
    }

    /// Per-name concurrency ceiling, same precedence as `lock_limit_for`.
    fn concurrency_for(&self, name: &str) -> usize {
        match self.registry.get(name) {
            Some(definition) => definition.concurrency,
            None => self.config.job_type(name).concurrency,
        }
    }

    /// Per-name claim lease duration, same precedence as `lock_limit_for`.
    /// Used uniformly by discovery's stale-claim deadline, dispatch's
    /// expiry check, and the watchdog so a registry-configured lease is
    /// honored everywhere rather than only where the definition happened
    /// to be read directly.
    fn lock_lifetime_for(&self, name: &str) -> chrono::Duration {
        match self.registry.get(name) {
            Some(definition) => definition.lock_lifetime,
            None => self.config.job_type(name).lock_lifetime(),
        }
    }

    /// Watchdog poll interval named in spec.md §4.4: `max(processEvery/2,
    /// lockLifetime/2)`, computed against the same `lock_lifetime` every
    /// other check in this processor uses for a name (see
    /// `lock_lifetime_for`), not a second, independently-configured value.
    fn watchdog_interval_for(&self, lock_lifetime: chrono::Duration) -> Duration {
        let half_process_every = self.config.process_every() / 2;
        let half_lock_lifetime = lock_lifetime.to_std().unwrap_or_default() / 2;
        half_process_every.max(half_lock_lifetime)
    }

    /// Whether another job of `name` may be claimed right now, honoring
    /// both the per-name and the processor-wide lock ceilings (spec.md
    /// §4.4 invariant: 0 means unlimited).
    fn should_lock(&self, name: &str) -> bool {
        let lock_limit = self.lock_limit_for(name);
        if lock_limit > 0 {
            let current = self.locked_by_name.get(name).map(|c| *c).unwrap_or(0);
            if current >= lock_limit {
                return false;
            }
        }
        if self.config.total_lock_limit > 0
            && self.locked_total.load(Ordering::SeqCst) >= self.config.total_lock_limit
        {
            return false;
        }
        true
    }

    fn has_free_concurrency(&self, name: &str) -> bool {
        let concurrency = self.concurrency_for(name);
        if concurrency > 0 {
            let current = self.running_by_name.get(name).map(|c| *c).unwrap_or(0);
            if current >= concurrency {
                return false;
            }
        }
        if self.config.max_concurrency > 0 && self.running.len() >= self.config.max_concurrency {
            return false;
        }
        true
    }

    fn note_locked(&self, name: &str) {
        *self.locked_by_name.entry(name.to_string()).or_insert(0) += 1;
        self.locked_total.fetch_add(1, Ordering::SeqCst);
    }

    fn note_unlocked(&self, name: &str) {
        if let Some(mut count) = self.locked_by_name.get_mut(name) {
            *count = count.saturating_sub(1);
        }
        let prev = self.locked_total.load(Ordering::SeqCst);
        if prev > 0 {
            self.locked_total.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// One full discovery/dispatch pass: fill the ready queue from every
    /// registered name, drain any fast-path claims, then dispatch as many
    /// runnable jobs as current concurrency allows.
    pub async fn process(self: &Arc<Self>) -> JobResult<()> {
        for name in self.registry.names() {
            self.fill_queue_for_name(&name).await?;
        }
        self.lock_on_the_fly().await;
        self.dispatch();
        self.events.emit(JobEvent::Ready);
        Ok(())
    }

    /// Claim eligible jobs of `name` in batches (or one at a time, if
    /// batching is disabled) until the name's lock ceiling is hit, the
    /// store has nothing left, or the ready queue is full.
    async fn fill_queue_for_name(self: &Arc<Self>, name: &str) -> JobResult<()> {
        let now = Utc::now();
        let scan_horizon = now + self.config.process_every();
        let lock_deadline = now - self.lock_lifetime_for(name);
        let batch_size = if self.config.batching_enabled {
            self.config.batch_size
        } else {
            1
        };

        loop {
            if !self.should_lock(name) {
                self.lock_limit_reached.insert(name.to_string(), true);
                break;
            }
            self.lock_limit_reached.insert(name.to_string(), false);

            let claimed = if self.config.batching_enabled {
                self.repository
                    .batch_claim(name, batch_size, scan_horizon, lock_deadline, now)
                    .await?
            } else {
                match self.repository.claim_next(name, scan_horizon, lock_deadline, now).await? {
                    Some(job) => vec![job],
                    None => Vec::new(),
                }
            };

            if claimed.is_empty() {
                break;
            }

            let got = claimed.len();
            for job in claimed {
                self.note_locked(name);
                self.enqueue_or_release(job).await;
            }

            if got < batch_size {
                break;
            }
        }
        Ok(())
    }

    /// Insert a freshly-claimed job into the ready queue; on overflow,
    /// release the claim immediately so the lock isn't leaked (spec.md
    /// §4.3) and emit the observable backpressure signal.
    async fn enqueue_or_release(self: &Arc<Self>, job: Job) {
        let name = job.name.clone();
        let id = job.id;
        let insert_result = self.ready_queue.lock().unwrap().insert(job);
        match insert_result {
            Ok(()) => {}
            Err(JobError::Overflow { queue_size, max_size, .. }) => {
                self.note_unlocked(&name);
                if let Err(err) = self.repository.release(id).await {
                    warn!(job_id = %id, error = %err, "failed to release job after queue overflow");
                }
                self.events.emit(JobEvent::QueueOverflow {
                    name,
                    queue_size,
                    max_size,
                });
            }
            Err(other) => {
                self.note_unlocked(&name);
                warn!(job_id = %id, error = %other, "unexpected error inserting into ready queue");
            }
        }
    }

    /// Register a job whose `next_run_at` falls before the next discovery
    /// tick so it can be claimed without waiting a full `processEvery`
    /// cycle. The external scheduling surface (out of this core's scope,
    /// spec.md §1) calls this right after persisting such a job.
    pub fn notify_due_soon(&self, id: JobId, name: impl Into<String>) {
        self.pending_claims.lock().unwrap().push((id, name.into()));
    }

    /// Drain the fast-path buffer and attempt to claim each entry.
    ///
    /// Preserves an observed, possibly-unintended behavior: hitting a
    /// per-name lock limit drops the rest of the buffer rather than
    /// skipping just the offending entry. The buffer is rebuilt from
    /// scratch next tick, so nothing is lost beyond one discovery cycle.
    async fn lock_on_the_fly(self: &Arc<Self>) {
        let drained = std::mem::take(&mut *self.pending_claims.lock().unwrap());
        let now = Utc::now();
        for (id, name) in drained {
            if !self.should_lock(&name) {
                break;
            }
            match self.repository.claim(id, &name, now).await {
                Ok(Some(job)) => {
                    self.note_locked(&name);
                    self.enqueue_or_release(job).await;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(job_id = %id, error = %err, "lock-on-the-fly claim failed");
                    self.events.emit(JobEvent::Error(JobEventError {
                        name: Some(name),
                        message: err.to_string(),
                    }));
                }
            }
        }
    }

    /// Pop every job the current concurrency ceilings allow and, for each,
    /// follow spec.md §4.4's dispatch protocol: drop jobs whose claim has
    /// already expired (another worker likely stole them), release jobs
    /// that drifted too far into the future, arm a one-shot timer for jobs
    /// not yet due, and run the rest.
    fn dispatch(self: &Arc<Self>) {
        let mut handled: HashSet<JobId> = HashSet::new();
        loop {
            let job = {
                let mut queue = self.ready_queue.lock().unwrap();
                queue.pick_next_runnable(|name| self.has_free_concurrency(name), &handled)
            };
            let Some(job) = job else { break };
            handled.insert(job.id);
            self.handle_picked(job);
        }
    }

    /// Decide what to do with one job pulled off the ready queue: drop,
    /// release, arm a deferred timer, or hand off to `run_or_retry`.
    fn handle_picked(self: &Arc<Self>, job: Job) {
        let lock_lifetime = self.lock_lifetime_for(&job.name);
        let now = Utc::now();

        if job.is_lock_expired(lock_lifetime, now) {
            debug!(job_id = %job.id, job_name = %job.name, "dropping expired claim at dispatch, likely stolen");
            self.timer_armed.remove(&job.id);
            self.note_unlocked(&job.name);
            return;
        }

        let Some(next_run_at) = job.next_run_at else {
            self.timer_armed.remove(&job.id);
            self.note_unlocked(&job.name);
            let this = self.clone();
            let id = job.id;
            tokio::spawn(async move {
                if let Err(err) = this.repository.release(id).await {
                    warn!(job_id = %id, error = %err, "failed to release job with no next_run_at");
                }
            });
            return;
        };

        if next_run_at <= now {
            self.timer_armed.remove(&job.id);
            self.spawn_run(job);
            return;
        }

        let process_every = self.config.process_every();
        if (next_run_at - now).to_std().unwrap_or_default() > process_every {
            debug!(job_id = %job.id, job_name = %job.name, "claim drifted past next tick, releasing");
            self.timer_armed.remove(&job.id);
            self.note_unlocked(&job.name);
            let this = self.clone();
            let id = job.id;
            tokio::spawn(async move {
                if let Err(err) = this.repository.release(id).await {
                    warn!(job_id = %id, error = %err, "failed to release drifted job");
                }
            });
            return;
        }

        if self.timer_armed.insert(job.id, ()).is_some() {
            // Already has a timer in flight; put it back and let that
            // timer's re-dispatch pick it up once it fires.
            if let Err(err) = self.ready_queue.lock().unwrap().insert(job) {
                warn!(error = %err, "failed to re-insert already-armed job");
            }
            return;
        }
        self.arm_timer(job, next_run_at, now);
    }

    /// Schedule a one-shot re-dispatch at `next_run_at`, clamped to the
    /// 32-bit-safe timer ceiling (spec.md §5). The job is put back in the
    /// ready queue immediately so status reporting still counts it as
    /// queued; the timer only re-triggers a dispatch pass, it doesn't hold
    /// the job outside the queue.
    fn arm_timer(self: &Arc<Self>, job: Job, next_run_at: chrono::DateTime<Utc>, now: chrono::DateTime<Utc>) {
        let id = job.id;
        let name = job.name.clone();
        if let Err(err) = self.ready_queue.lock().unwrap().insert(job) {
            warn!(job_id = %id, error = %err, "failed to re-insert job pending its timer");
            self.note_unlocked(&name);
            return;
        }
        let delay = clamp_delay((next_run_at - now).to_std().unwrap_or_default());
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.timer_armed.remove(&id);
            this.dispatch();
        });
    }

    fn spawn_run(self: &Arc<Self>, job: Job) {
        let Some(definition) = self.registry.get(&job.name) else {
            warn!(job_name = %job.name, "no definition registered for claimed job; releasing");
            let this = self.clone();
            let id = job.id;
            let name = job.name.clone();
            tokio::spawn(async move {
                this.note_unlocked(&name);
                if let Err(err) = this.repository.release(id).await {
                    warn!(job_id = %id, error = %err, "failed to release undefined job");
                }
            });
            return;
        };

        let name = job.name.clone();
        *self.running_by_name.entry(name.clone()).or_insert(0) += 1;
        self.running.insert(job.id, RunningEntry { job: job.clone() });

        self.events.emit(JobEvent::ProcessJob { job: job.clone() });

        let this = self.clone();
        tokio::spawn(async move {
            this.run_or_retry(job, definition).await;
            this.note_unlocked(&name);
            if let Some(mut count) = this.running_by_name.get_mut(&name) {
                *count = count.saturating_sub(1);
            }
        });
    }

    /// Race the handler against a watchdog that watches for the claim
    /// expiring or `locked_at` being cleared out from under the handler,
    /// then persist the outcome.
    async fn run_or_retry(
        self: &Arc<Self>,
        mut job: Job,
        definition: Arc<crate::jobs::registry::JobDefinition>,
    ) {
        let id = job.id;
        let name = job.name.clone();
        let lock_lifetime = self.lock_lifetime_for(&name);
        let handle = DefaultJobHandle::new(job.clone(), definition.clone());
        let watchdog_interval = clamp_delay(self.watchdog_interval_for(lock_lifetime));

        let outcome = tokio::select! {
            result = handle.run() => result,
            reason = self.watchdog_loop(id, lock_lifetime, watchdog_interval) => {
                let error = JobError::Expiration {
                    job_id: id,
                    job_name: name.clone(),
                    reason: reason.clone(),
                };
                handle.cancel(error.clone());
                Err(error)
            }
        };

        self.running.remove(&id);

        let now = Utc::now();
        match outcome {
            Ok(()) => {
                job.mark_completed(now);
            }
            Err(err) => {
                job.mark_failed(now, err.to_string());
                self.events.emit(JobEvent::Error(JobEventError {
                    name: Some(name.clone()),
                    message: err.to_string(),
                }));
            }
        }

        if let Err(err) = self
            .retry
            .run_default(|| {
                let job = job.clone();
                async move { self.repository.save_state(&job).await }
            })
            .await
        {
            warn!(job_id = %id, error = %err, "failed to persist job outcome");
            self.events.emit(JobEvent::Error(JobEventError {
                name: Some(name),
                message: err.to_string(),
            }));
        }
    }

    /// Poll the store's `locked_at` for `id` on `interval` until the
    /// claim has either expired against `lock_lifetime` or the lock was
    /// cleared by someone else. Returns the human-readable reason; the
    /// caller treats any return as a cancellation signal.
    async fn watchdog_loop(&self, id: JobId, lock_lifetime: chrono::Duration, interval: Duration) -> String {
        loop {
            tokio::time::sleep(interval).await;
            match self.repository.locked_at(id).await {
                Ok(None) => return "locked_at was cleared externally while the handler was running".to_string(),
                Ok(Some(locked_at)) => {
                    if Utc::now() - locked_at >= lock_lifetime {
                        return "job ran longer than its lockLifetime; handler never called touch()".to_string();
                    }
                }
                Err(err) => {
                    debug!(job_id = %id, error = %err, "watchdog lookup failed, retrying");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::job::Job;
    use crate::jobs::registry::{HandlerFn, InMemoryRegistry, JobDefinition};
    use crate::jobs::repository::test_support::FakeJobRepository;
    use chrono::Duration as ChronoDuration;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize as StdAtomicUsize, Ordering as StdOrdering};

    fn counting_handler(counter: Arc<StdAtomicUsize>) -> Arc<HandlerFn> {
        Arc::new(move |_job, _token| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, StdOrdering::SeqCst);
                Ok(())
            }
            .boxed()
        })
    }

    fn failing_handler() -> Arc<HandlerFn> {
        Arc::new(|job, _token| {
            async move {
                Err(JobError::Handler {
                    job_id: job.id,
                    job_name: job.name,
                    reason: "boom".into(),
                })
            }
            .boxed()
        })
    }

    #[tokio::test]
    async fn process_claims_runs_and_completes_a_due_job() {
        let repo = Arc::new(FakeJobRepository::new());
        let job = Job::new("send_email", serde_json::json!({})).with_next_run_at(Utc::now() - ChronoDuration::seconds(1));
        let id = job.id;
        repo.seed(job);

        let registry = Arc::new(InMemoryRegistry::new());
        let ran = Arc::new(StdAtomicUsize::new(0));
        registry.register(JobDefinition::new("send_email", counting_handler(ran.clone())));

        let processor = JobProcessor::new(repo.clone(), registry, ProcessorConfig::default());
        processor.process().await.unwrap();

        // Give the spawned handler task a chance to run.
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(ran.load(StdOrdering::SeqCst), 1);
        let persisted = repo.get(id).unwrap();
        assert!(persisted.locked_at.is_none());
        assert!(persisted.next_run_at.is_none());
    }

    #[tokio::test]
    async fn failed_handler_marks_job_failed_and_releases_lock() {
        let repo = Arc::new(FakeJobRepository::new());
        let job = Job::new("flaky", serde_json::json!({})).with_next_run_at(Utc::now() - ChronoDuration::seconds(1));
        let id = job.id;
        repo.seed(job);

        let registry = Arc::new(InMemoryRegistry::new());
        registry.register(JobDefinition::new("flaky", failing_handler()));

        let processor = JobProcessor::new(repo.clone(), registry, ProcessorConfig::default());
        processor.process().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let persisted = repo.get(id).unwrap();
        assert!(persisted.locked_at.is_none());
        assert_eq!(persisted.fail_count, 1);
        assert!(persisted.failed_at.is_some());
    }

    #[tokio::test]
    async fn respects_per_name_concurrency_ceiling() {
        let repo = Arc::new(FakeJobRepository::new());
        for _ in 0..5 {
            repo.seed(Job::new("limited", serde_json::json!({})).with_next_run_at(Utc::now() - ChronoDuration::seconds(1)));
        }

        let registry = Arc::new(InMemoryRegistry::new());
        let running_peak = Arc::new(StdAtomicUsize::new(0));
        let running_now = Arc::new(StdAtomicUsize::new(0));
        let rn = running_now.clone();
        let rp = running_peak.clone();
        let handler: Arc<HandlerFn> = Arc::new(move |_job, _token| {
            let rn = rn.clone();
            let rp = rp.clone();
            async move {
                let current = rn.fetch_add(1, StdOrdering::SeqCst) + 1;
                rp.fetch_max(current, StdOrdering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                rn.fetch_sub(1, StdOrdering::SeqCst);
                Ok(())
            }
            .boxed()
        });
        registry.register(JobDefinition::new("limited", handler).with_concurrency(2));

        let mut config = ProcessorConfig::default();
        config.batch_size = 10;
        let processor = JobProcessor::new(repo.clone(), registry, config);
        processor.process().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(running_peak.load(StdOrdering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn respects_per_name_lock_limit_from_the_registry() {
        let repo = Arc::new(FakeJobRepository::new());
        for _ in 0..5 {
            repo.seed(Job::new("scarce", serde_json::json!({})).with_next_run_at(Utc::now() - ChronoDuration::seconds(1)));
        }

        let registry = Arc::new(InMemoryRegistry::new());
        registry.register(
            JobDefinition::new("scarce", counting_handler(Arc::new(StdAtomicUsize::new(0)))).with_lock_limit(2),
        );

        let mut config = ProcessorConfig::default();
        config.batch_size = 10;
        let processor = JobProcessor::new(repo.clone(), registry, config);
        processor.process().await.unwrap();

        assert_eq!(repo.all().iter().filter(|j| j.locked_at.is_some()).count(), 2);
    }

    #[tokio::test]
    async fn watchdog_fails_a_job_whose_handler_outlives_its_lock_lifetime() {
        let repo = Arc::new(FakeJobRepository::new());
        let job = Job::new("stuck", serde_json::json!({})).with_next_run_at(Utc::now() - ChronoDuration::seconds(1));
        let id = job.id;
        repo.seed(job);

        let registry = Arc::new(InMemoryRegistry::new());
        let handler: Arc<HandlerFn> = Arc::new(|_job, _token| {
            async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            }
            .boxed()
        });
        registry.register(JobDefinition::new("stuck", handler).with_lock_lifetime(ChronoDuration::milliseconds(30)));

        let mut config = ProcessorConfig::default();
        config.process_every_ms = 20;
        let processor = JobProcessor::new(repo.clone(), registry, config);
        processor.process().await.unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;

        let persisted = repo.get(id).unwrap();
        assert!(persisted.locked_at.is_none());
        let reason = persisted.fail_reason.expect("watchdog should have failed the job");
        assert!(reason.contains("lockLifetime"));
        assert!(reason.contains("touch()"));
    }

    #[tokio::test]
    async fn queue_overflow_releases_the_claim() {
        let repo = Arc::new(FakeJobRepository::new());
        for _ in 0..3 {
            repo.seed(Job::new("overflow", serde_json::json!({})).with_next_run_at(Utc::now() - ChronoDuration::seconds(1)));
        }

        let registry = Arc::new(InMemoryRegistry::new());
        registry.register(JobDefinition::new("overflow", counting_handler(Arc::new(StdAtomicUsize::new(0)))));

        let mut config = ProcessorConfig::default();
        config.ready_queue_capacity = 1;
        config.batch_size = 10;
        let processor = JobProcessor::new(repo.clone(), registry, config);

        let mut events = processor.subscribe_events();
        processor.process().await.unwrap();

        let mut saw_overflow = false;
        while let Ok(event) = events.try_recv() {
            if matches!(event, JobEvent::QueueOverflow { .. }) {
                saw_overflow = true;
            }
        }
        assert!(saw_overflow);

        let unlocked_count = repo.all().iter().filter(|j| j.locked_at.is_none()).count();
        assert!(unlocked_count >= 2);
    }

    #[tokio::test]
    async fn notify_due_soon_claims_without_waiting_for_next_tick() {
        let repo = Arc::new(FakeJobRepository::new());
        let job = Job::new("fast", serde_json::json!({})).with_next_run_at(Utc::now() + ChronoDuration::seconds(1));
        let id = job.id;
        repo.seed(job);

        let registry = Arc::new(InMemoryRegistry::new());
        let ran = Arc::new(StdAtomicUsize::new(0));
        registry.register(JobDefinition::new("fast", counting_handler(ran.clone())));

        let processor = JobProcessor::new(repo.clone(), registry, ProcessorConfig::default());
        processor.notify_due_soon(id, "fast");
        processor.lock_on_the_fly().await;
        processor.dispatch();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(ran.load(StdOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_returns_currently_claimed_jobs_for_release() {
        let repo = Arc::new(FakeJobRepository::new());
        let job = Job::new("held", serde_json::json!({})).with_next_run_at(Utc::now() + ChronoDuration::seconds(30));
        let id = job.id;
        repo.seed(job);

        let registry = Arc::new(InMemoryRegistry::new());
        let processor = JobProcessor::new(repo, registry, ProcessorConfig::default());
        processor.process().await.unwrap();

        let claimed = processor.stop();
        assert!(claimed.iter().any(|j| j.id == id));
    }

    #[tokio::test]
    async fn status_reports_queue_and_running_counts() {
        let repo = Arc::new(FakeJobRepository::new());
        let registry = Arc::new(InMemoryRegistry::new());
        let processor = JobProcessor::new(repo, registry, ProcessorConfig::default());
        let status = processor.status(false);
        assert_eq!(status.queue_size, 0);
        assert_eq!(status.running_total, 0);
        assert!(status.queued_jobs.is_none());
    }

    #[tokio::test]
    async fn full_details_status_reports_actual_job_lists() {
        let repo = Arc::new(FakeJobRepository::new());
        let job = Job::new("send_email", serde_json::json!({})).with_next_run_at(Utc::now() + ChronoDuration::seconds(30));
        let id = job.id;
        repo.seed(job);

        let registry = Arc::new(InMemoryRegistry::new());
        registry.register(JobDefinition::new(
            "send_email",
            counting_handler(Arc::new(StdAtomicUsize::new(0))),
        ));

        let processor = JobProcessor::new(repo, registry, ProcessorConfig::default());
        processor.process().await.unwrap();

        let status = processor.status(true);
        let queued = status.queued_jobs.expect("full details requested");
        assert!(queued.iter().any(|j| j.id == id));
        assert!(status.locked_job_ids.expect("full details requested").contains(&id));
    }

    #[tokio::test]
    async fn dispatch_arms_a_timer_for_a_job_not_yet_due_and_releases_drifted_jobs() {
        let repo = Arc::new(FakeJobRepository::new());
        let near_future = Job::new("timer", serde_json::json!({})).with_next_run_at(Utc::now() + ChronoDuration::milliseconds(30));
        let near_id = near_future.id;
        repo.seed(near_future);

        let registry = Arc::new(InMemoryRegistry::new());
        let ran = Arc::new(StdAtomicUsize::new(0));
        registry.register(JobDefinition::new("timer", counting_handler(ran.clone())));

        let processor = JobProcessor::new(repo.clone(), registry, ProcessorConfig::default());
        processor.process().await.unwrap();

        // Immediately after the pass the job should still be queued, not run.
        assert_eq!(ran.load(StdOrdering::SeqCst), 0);
        assert_eq!(processor.status(false).queue_size, 1);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(ran.load(StdOrdering::SeqCst), 1);
        let persisted = repo.get(near_id).unwrap();
        assert!(persisted.locked_at.is_none());
    }

    #[tokio::test]
    async fn dispatch_releases_a_claim_that_drifted_past_the_next_tick() {
        // Simulates a job whose next_run_at moved far into the future
        // after it was already claimed and queued (spec.md §4.4 dispatch
        // step 7): the queue is seeded directly, bypassing discovery, to
        // exercise handle_picked's release path in isolation.
        let repo = Arc::new(FakeJobRepository::new());
        let registry = Arc::new(InMemoryRegistry::new());
        let processor = JobProcessor::new(repo.clone(), registry, ProcessorConfig::default());

        let job = Job::new("drifted", serde_json::json!({}))
            .with_next_run_at(Utc::now() + ChronoDuration::hours(1));
        let id = job.id;
        let mut seeded = job.clone();
        seeded.locked_at = Some(Utc::now());
        repo.seed(seeded);
        processor.note_locked("drifted");
        processor.ready_queue.lock().unwrap().insert(job).unwrap();

        processor.dispatch();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(processor.status(false).queue_size, 0);
        let persisted = repo.get(id).unwrap();
        assert!(persisted.locked_at.is_none());
    }
}
