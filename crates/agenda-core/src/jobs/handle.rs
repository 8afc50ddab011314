//! External Job Handle (spec.md §4.5): the object the Processor holds
//! for a job once it moves from "claimed" to "about to run". It wraps
//! identity, the registered handler, cancellation, and a run-once guard.
//!
//! The Ready Queue and the `locked` bookkeeping (spec.md §3) hold the
//! plain `Job` record; a handle is constructed only at dispatch time,
//! when the Processor is about to execute it. The "timer armed" scratch
//! flag the spec attaches to the handle (`gotTimerToExecute`) is tracked
//! by the Processor separately, keyed by job id, since it is meaningful
//! only while a job is queued, not while it is running (see
//! `jobs::processor`).

use crate::jobs::error::{JobError, JobResult};
use crate::jobs::job::{Job, JobId};
use crate::jobs::registry::JobDefinition;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Read-only identity/scheduling fields, snapshotted at handle
/// construction.
#[derive(Debug, Clone)]
pub struct JobAttrs {
    pub id: JobId,
    pub name: String,
    pub next_run_at: Option<DateTime<Utc>>,
    pub priority: i32,
    pub locked_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait JobHandle: Send + Sync {
    fn attrs(&self) -> JobAttrs;

    /// Execute the handler. Callable at most once; a second call is a
    /// programming error in the Processor and returns an `Invariant`.
    async fn run(&self) -> JobResult<()>;

    /// True when the claim behind this handle is expired or `locked_at`
    /// is absent (spec.md §3 invariant 2/3).
    fn is_expired(&self, now: DateTime<Utc>) -> bool;

    /// Signal the handler to wind down, recording `error` as the reason
    /// reported to the caller.
    fn cancel(&self, error: JobError);
}

pub struct DefaultJobHandle {
    job: Job,
    definition: Arc<JobDefinition>,
    ran: AtomicBool,
    cancel_token: CancellationToken,
    cancel_reason: Mutex<Option<JobError>>,
}

impl DefaultJobHandle {
    pub fn new(job: Job, definition: Arc<JobDefinition>) -> Self {
        Self {
            job,
            definition,
            ran: AtomicBool::new(false),
            cancel_token: CancellationToken::new(),
            cancel_reason: Mutex::new(None),
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn cancel_reason(&self) -> Option<JobError> {
        self.cancel_reason.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobHandle for DefaultJobHandle {
    fn attrs(&self) -> JobAttrs {
        JobAttrs {
            id: self.job.id,
            name: self.job.name.clone(),
            next_run_at: self.job.next_run_at,
            priority: self.job.priority,
            locked_at: self.job.locked_at,
        }
    }

    async fn run(&self) -> JobResult<()> {
        if self.ran.swap(true, Ordering::SeqCst) {
            return Err(JobError::Invariant(format!(
                "job {} ({}) run() called more than once",
                self.job.id, self.job.name
            )));
        }
        (self.definition.handler)(self.job.clone(), self.cancel_token.clone()).await
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.job.is_lock_expired(self.definition.lock_lifetime, now)
    }

    fn cancel(&self, error: JobError) {
        *self.cancel_reason.lock().unwrap() = Some(error);
        self.cancel_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn definition(handler: Arc<crate::jobs::registry::HandlerFn>) -> Arc<JobDefinition> {
        Arc::new(JobDefinition::new("a", handler).with_lock_lifetime(chrono::Duration::seconds(30)))
    }

    #[tokio::test]
    async fn run_is_callable_exactly_once() {
        let handler: Arc<crate::jobs::registry::HandlerFn> =
            Arc::new(|_job, _token| async move { Ok(()) }.boxed());
        let handle = DefaultJobHandle::new(Job::new("a", serde_json::json!({})), definition(handler));

        assert!(handle.run().await.is_ok());
        let second = handle.run().await;
        assert!(matches!(second, Err(JobError::Invariant(_))));
    }

    #[tokio::test]
    async fn cancel_records_reason_and_trips_token() {
        let handler: Arc<crate::jobs::registry::HandlerFn> =
            Arc::new(|_job, _token| async move { Ok(()) }.boxed());
        let handle = DefaultJobHandle::new(Job::new("a", serde_json::json!({})), definition(handler));

        handle.cancel(JobError::Handler {
            job_id: handle.job().id,
            job_name: "a".into(),
            reason: "boom".into(),
        });

        assert!(handle.cancellation_token().is_cancelled());
        assert!(matches!(handle.cancel_reason(), Some(JobError::Handler { .. })));
    }

    #[test]
    fn is_expired_reflects_missing_or_stale_lock() {
        let handler: Arc<crate::jobs::registry::HandlerFn> =
            Arc::new(|_job, _token| async move { Ok(()) }.boxed());
        let mut job = Job::new("a", serde_json::json!({}));
        job.locked_at = None;
        let handle = DefaultJobHandle::new(job, definition(handler));
        assert!(handle.is_expired(Utc::now()));
    }
}
