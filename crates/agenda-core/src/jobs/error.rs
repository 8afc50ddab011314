//! Error taxonomy for the job scheduler core.
//!
//! Six categories, matched to how the Processor is allowed to react:
//! conflicts are absorbed by the retry executor, storage/expiration/handler
//! errors are per-job and isolated, invariant errors are bugs and must
//! propagate, overflow is an observable back-pressure signal.

use crate::jobs::job::JobId;
use serde::{Deserialize, Serialize};

/// Result alias used throughout the job scheduler core.
pub type JobResult<T> = std::result::Result<T, JobError>;

#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum JobError {
    /// Duplicate-key or optimistic write conflict. Retryable; the Retry
    /// Executor absorbs these unless retries are exhausted.
    #[error("conflict on job {job_name}: {message}")]
    Conflict { job_name: String, message: String },

    /// Any non-conflict error from the persistent store.
    #[error("storage error: {0}")]
    Storage(String),

    /// The watchdog observed a claim has expired, or `lockedAt` went missing.
    #[error("job {job_id} ({job_name}) expired: {reason}")]
    Expiration {
        job_id: JobId,
        job_name: String,
        reason: String,
    },

    /// The user-supplied handler rejected.
    #[error("handler for job {job_id} ({job_name}) failed: {reason}")]
    Handler {
        job_id: JobId,
        job_name: String,
        reason: String,
    },

    /// Bookkeeping disagrees with reality. Indicates a bug in the
    /// Processor itself. Never swallow this variant.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// The Local Ready Queue was full on insert.
    #[error("ready queue overflow for {name}: size {queue_size} exceeds {max_size}")]
    Overflow {
        name: String,
        queue_size: usize,
        max_size: usize,
    },
}

impl JobError {
    /// True for the conflict class the Retry Executor is allowed to retry.
    ///
    /// Mirrors the store error codes named in the spec: duplicate-key
    /// (11000), optimistic write conflict (112 / `WriteConflict`), or a
    /// message substring match for either.
    pub fn is_conflict(&self) -> bool {
        matches!(self, JobError::Conflict { .. })
    }

    pub fn is_invariant(&self) -> bool {
        matches!(self, JobError::Invariant(_))
    }

    /// Classify a raw storage error by Postgres SQLSTATE / message text.
    ///
    /// `23505` is unique_violation (duplicate-key equivalent); `40001` is
    /// serialization_failure (the optimistic write conflict equivalent).
    /// A bare message match covers drivers that don't surface a code.
    pub fn classify_storage(job_name: &str, err: &sqlx::Error) -> JobError {
        if let sqlx::Error::Database(db_err) = err {
            if let Some(code) = db_err.code() {
                if code.as_ref() == "23505" || code.as_ref() == "40001" {
                    return JobError::Conflict {
                        job_name: job_name.to_string(),
                        message: db_err.message().to_string(),
                    };
                }
            }
            let msg = db_err.message();
            if msg.contains("WriteConflict") || msg.contains("duplicate key") {
                return JobError::Conflict {
                    job_name: job_name.to_string(),
                    message: msg.to_string(),
                };
            }
        }
        JobError::Storage(err.to_string())
    }
}

impl From<JobError> for crate::Error {
    fn from(err: JobError) -> Self {
        crate::Error::Job(err.to_string())
    }
}

impl From<sqlx::Error> for JobError {
    fn from(err: sqlx::Error) -> Self {
        JobError::classify_storage("unknown", &err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_recognized() {
        let err = JobError::Conflict {
            job_name: "send_email".into(),
            message: "duplicate key".into(),
        };
        assert!(err.is_conflict());
        assert!(!err.is_invariant());
    }

    #[test]
    fn invariant_is_recognized() {
        let err = JobError::Invariant("job missing from running set".into());
        assert!(err.is_invariant());
        assert!(!err.is_conflict());
    }

    #[test]
    fn display_includes_job_identity() {
        let job_id = JobId::new_v4();
        let err = JobError::Expiration {
            job_id,
            job_name: "B".into(),
            reason: "lock lifetime exceeded".into(),
        };
        let text = err.to_string();
        assert!(text.contains("B"));
        assert!(text.contains("lock lifetime exceeded"));
    }
}
