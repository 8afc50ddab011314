//! Job Repository (spec.md §4.2): typed operations on the persistent
//! store. Every mutating operation is a single atomic conditional update
//! so that the contention unit stays one document (or, for `batch_claim`,
//! one multi-document update).
//!
//! Grounded on the teacher's Postgres repository shape
//! (`repository::postgres::customer_repository`): `sqlx::query`/
//! `query_as` against a `PgPool`, manual row mapping where a type (here,
//! `JobType`, `RepeatInterval`) doesn't map onto a SQL column 1:1.

use crate::jobs::error::{JobError, JobResult};
use crate::jobs::job::{Job, JobId, JobType, RepeatInterval};
use crate::jobs::retry::RetryExecutor;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// `{id, name, lockedAt: null} -> lockedAt: now`. Returns the updated
    /// record, or `None` if the predicate failed (already claimed,
    /// disabled, or gone).
    async fn claim(&self, id: JobId, name: &str, now: DateTime<Utc>) -> JobResult<Option<Job>>;

    /// Find and claim one eligible job of `name`, in
    /// `(next_run_at ASC, priority DESC)` order.
    async fn claim_next(
        &self,
        name: &str,
        scan_horizon: DateTime<Utc>,
        lock_deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> JobResult<Option<Job>>;

    /// Two-phase atomic claim of up to `batch_size` eligible jobs of
    /// `name`, returned in the same sort order as a single
    /// `claim_next` scan.
    async fn batch_claim(
        &self,
        name: &str,
        batch_size: usize,
        scan_horizon: DateTime<Utc>,
        lock_deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> JobResult<Vec<Job>>;

    /// Clear `locked_at` where `next_run_at IS NOT NULL` (spec.md §4.2:
    /// never "un-finish" a job whose `next_run_at` completion cleared).
    async fn release(&self, id: JobId) -> JobResult<()>;

    async fn release_many(&self, ids: &[JobId]) -> JobResult<()>;

    /// Patch the mutable execution fields. Fails if the record no
    /// longer exists.
    async fn save_state(&self, job: &Job) -> JobResult<()>;

    /// Count of documents with `next_run_at < now` (advisory metric).
    async fn queue_size(&self, now: DateTime<Utc>) -> JobResult<i64>;

    /// Current `locked_at` for a job, used by the watchdog to detect an
    /// externally-cleared lock (spec.md §4.4 runOrRetry step 4(c))
    /// without requiring a full record re-read.
    async fn locked_at(&self, id: JobId) -> JobResult<Option<DateTime<Utc>>>;

    /// Upsert for `type == "single"` jobs (spec.md §4.2, invariant 5):
    /// insert if no record exists for `name`, otherwise update `data`
    /// only — `next_run_at` is insert-only so a concurrent creator can
    /// never "un-finish" an already-scheduled single job.
    async fn upsert_single(
        &self,
        name: &str,
        data: serde_json::Value,
        priority: i32,
        next_run_at: Option<DateTime<Utc>>,
    ) -> JobResult<Job>;
}

fn job_type_str(t: JobType) -> &'static str {
    match t {
        JobType::Normal => "normal",
        JobType::Single => "single",
    }
}

fn parse_job_type(s: &str) -> JobType {
    match s {
        "single" => JobType::Single,
        _ => JobType::Normal,
    }
}

fn job_from_row(row: &PgRow) -> Result<Job, sqlx::Error> {
    let job_type: String = row.try_get("job_type")?;
    let repeat_interval_ms: Option<i64> = row.try_get("repeat_interval_ms")?;
    let progress: Option<i32> = row.try_get("progress")?;
    Ok(Job {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        data: row.try_get("data")?,
        priority: row.try_get("priority")?,
        next_run_at: row.try_get("next_run_at")?,
        locked_at: row.try_get("locked_at")?,
        last_run_at: row.try_get("last_run_at")?,
        last_finished_at: row.try_get("last_finished_at")?,
        failed_at: row.try_get("failed_at")?,
        fail_count: row.try_get::<i32, _>("fail_count")? as u32,
        fail_reason: row.try_get("fail_reason")?,
        progress: progress.map(|p| p as u8),
        disabled: row.try_get("disabled")?,
        job_type: parse_job_type(&job_type),
        repeat_interval: repeat_interval_ms.map(|ms| RepeatInterval(chrono::Duration::milliseconds(ms))),
    })
}

/// Postgres realization of the document store (SPEC_FULL.md's resolved
/// Open Question): the `jobs` table plays the role of the spec's shared
/// collection, and `UPDATE ... RETURNING` gives the same single-round-trip
/// conditional-update semantics as a `findOneAndUpdate`.
pub struct PostgresJobRepository {
    pool: PgPool,
    retry: RetryExecutor,
}

impl PostgresJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            retry: RetryExecutor::default(),
        }
    }

    pub fn with_retry(pool: PgPool, retry: RetryExecutor) -> Self {
        Self { pool, retry }
    }
}

#[async_trait]
impl JobRepository for PostgresJobRepository {
    async fn claim(&self, id: JobId, name: &str, now: DateTime<Utc>) -> JobResult<Option<Job>> {
        self.retry
            .run_default(|| async {
                let row = sqlx::query(
                    r#"
                    UPDATE jobs SET locked_at = $1
                    WHERE id = $2 AND name = $3 AND locked_at IS NULL AND disabled = false
                    RETURNING *
                    "#,
                )
                .bind(now)
                .bind(id)
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| JobError::classify_storage(name, &e))?;

                row.as_ref()
                    .map(job_from_row)
                    .transpose()
                    .map_err(|e| JobError::classify_storage(name, &e))
            })
            .await
    }

    async fn claim_next(
        &self,
        name: &str,
        scan_horizon: DateTime<Utc>,
        lock_deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> JobResult<Option<Job>> {
        self.retry
            .run_default(|| async {
                let row = sqlx::query(
                    r#"
                    UPDATE jobs SET locked_at = $1
                    WHERE id = (
                        SELECT id FROM jobs
                        WHERE name = $2 AND disabled = false
                          AND ((locked_at IS NULL AND next_run_at <= $3) OR locked_at <= $4)
                        ORDER BY next_run_at ASC, priority DESC
                        LIMIT 1
                        FOR UPDATE SKIP LOCKED
                    )
                    RETURNING *
                    "#,
                )
                .bind(now)
                .bind(name)
                .bind(scan_horizon)
                .bind(lock_deadline)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| JobError::classify_storage(name, &e))?;

                row.as_ref()
                    .map(job_from_row)
                    .transpose()
                    .map_err(|e| JobError::classify_storage(name, &e))
            })
            .await
    }

    async fn batch_claim(
        &self,
        name: &str,
        batch_size: usize,
        scan_horizon: DateTime<Utc>,
        lock_deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> JobResult<Vec<Job>> {
        self.retry
            .run_default(|| async {
                let mut tx = self.pool.begin().await.map_err(|e| JobError::classify_storage(name, &e))?;

                let candidate_ids: Vec<JobId> = sqlx::query(
                    r#"
                    SELECT id FROM jobs
                    WHERE name = $1 AND disabled = false
                      AND ((locked_at IS NULL AND next_run_at <= $2) OR locked_at <= $3)
                    ORDER BY next_run_at ASC, priority DESC
                    LIMIT $4
                    "#,
                )
                .bind(name)
                .bind(scan_horizon)
                .bind(lock_deadline)
                .bind(batch_size as i64)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| JobError::classify_storage(name, &e))?
                .into_iter()
                .map(|row| row.try_get::<JobId, _>("id"))
                .collect::<Result<_, _>>()
                .map_err(|e| JobError::classify_storage(name, &e))?;

                if candidate_ids.is_empty() {
                    tx.commit().await.map_err(|e| JobError::classify_storage(name, &e))?;
                    return Ok(Vec::new());
                }

                let claimed_ids: Vec<JobId> = sqlx::query(
                    r#"
                    UPDATE jobs SET locked_at = $1
                    WHERE id = ANY($2) AND (locked_at IS NULL OR locked_at <= $3)
                    RETURNING id
                    "#,
                )
                .bind(now)
                .bind(&candidate_ids)
                .bind(lock_deadline)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| JobError::classify_storage(name, &e))?
                .into_iter()
                .map(|row| row.try_get::<JobId, _>("id"))
                .collect::<Result<_, _>>()
                .map_err(|e| JobError::classify_storage(name, &e))?;

                let rows = sqlx::query("SELECT * FROM jobs WHERE id = ANY($1)")
                    .bind(&claimed_ids)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(|e| JobError::classify_storage(name, &e))?;

                tx.commit().await.map_err(|e| JobError::classify_storage(name, &e))?;

                let mut by_id: std::collections::HashMap<JobId, Job> = std::collections::HashMap::new();
                for row in &rows {
                    let job = job_from_row(row).map_err(|e| JobError::classify_storage(name, &e))?;
                    by_id.insert(job.id, job);
                }

                // Preserve phase 1's sort order; a steal between phases
                // simply drops that id from the result (it won't be in
                // `by_id`), per the spec's two-phase contention tolerance.
                Ok(candidate_ids
                    .into_iter()
                    .filter_map(|id| by_id.remove(&id))
                    .collect())
            })
            .await
    }

    async fn release(&self, id: JobId) -> JobResult<()> {
        sqlx::query("UPDATE jobs SET locked_at = NULL WHERE id = $1 AND next_run_at IS NOT NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| JobError::classify_storage("release", &e))?;
        Ok(())
    }

    async fn release_many(&self, ids: &[JobId]) -> JobResult<()> {
        sqlx::query("UPDATE jobs SET locked_at = NULL WHERE id = ANY($1) AND next_run_at IS NOT NULL")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| JobError::classify_storage("release_many", &e))?;
        Ok(())
    }

    async fn save_state(&self, job: &Job) -> JobResult<()> {
        let repeat_ms = job.repeat_interval.map(|r| r.0.num_milliseconds());
        let _ = repeat_ms; // repeat_interval is immutable post-creation; not part of save_state's column set.
        let result = sqlx::query(
            r#"
            UPDATE jobs SET
                locked_at = $1,
                next_run_at = $2,
                last_run_at = $3,
                last_finished_at = $4,
                failed_at = $5,
                fail_count = $6,
                fail_reason = $7,
                progress = $8
            WHERE id = $9 AND name = $10
            "#,
        )
        .bind(job.locked_at)
        .bind(job.next_run_at)
        .bind(job.last_run_at)
        .bind(job.last_finished_at)
        .bind(job.failed_at)
        .bind(job.fail_count as i32)
        .bind(&job.fail_reason)
        .bind(job.progress.map(|p| p as i32))
        .bind(job.id)
        .bind(&job.name)
        .execute(&self.pool)
        .await
        .map_err(|e| JobError::classify_storage(&job.name, &e))?;

        if result.rows_affected() == 0 {
            return Err(JobError::Storage(format!(
                "save_state: job {} ({}) no longer exists",
                job.id, job.name
            )));
        }
        Ok(())
    }

    async fn queue_size(&self, now: DateTime<Utc>) -> JobResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM jobs WHERE next_run_at < $1")
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| JobError::classify_storage("queue_size", &e))?;
        row.try_get::<i64, _>("count")
            .map_err(|e| JobError::Storage(e.to_string()))
    }

    async fn locked_at(&self, id: JobId) -> JobResult<Option<DateTime<Utc>>> {
        let row = sqlx::query("SELECT locked_at FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| JobError::classify_storage("locked_at", &e))?;
        match row {
            None => Ok(None),
            Some(row) => row
                .try_get::<Option<DateTime<Utc>>, _>("locked_at")
                .map_err(|e| JobError::Storage(e.to_string())),
        }
    }

    async fn upsert_single(
        &self,
        name: &str,
        data: serde_json::Value,
        priority: i32,
        next_run_at: Option<DateTime<Utc>>,
    ) -> JobResult<Job> {
        self.retry
            .run_default(|| async {
                let id = JobId::new_v4();
                let row = sqlx::query(
                    r#"
                    INSERT INTO jobs (id, name, data, priority, next_run_at, job_type)
                    VALUES ($1, $2, $3, $4, $5, 'single')
                    ON CONFLICT (name) WHERE job_type = 'single'
                    DO UPDATE SET data = EXCLUDED.data
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(name)
                .bind(&data)
                .bind(priority)
                .bind(next_run_at)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| JobError::classify_storage(name, &e))?;

                job_from_row(&row).map_err(|e| JobError::classify_storage(name, &e))
            })
            .await
    }
}

/// In-memory fakes used to exercise the Processor and the repository
/// contract's concurrency/stale-lock/retry properties without a live
/// database — the same "build a minimal fake" style the teacher uses for
/// `DeadLetterQueue`/`RetryHistory` unit tests.
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeJobRepository {
        jobs: Mutex<Vec<Job>>,
    }

    impl FakeJobRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(&self, job: Job) {
            self.jobs.lock().unwrap().push(job);
        }

        pub fn get(&self, id: JobId) -> Option<Job> {
            self.jobs.lock().unwrap().iter().find(|j| j.id == id).cloned()
        }

        pub fn all(&self) -> Vec<Job> {
            self.jobs.lock().unwrap().clone()
        }

        fn eligible(job: &Job, scan_horizon: DateTime<Utc>, lock_deadline: DateTime<Utc>) -> bool {
            job.is_eligible(scan_horizon, lock_deadline)
        }
    }

    #[async_trait]
    impl JobRepository for FakeJobRepository {
        async fn claim(&self, id: JobId, name: &str, now: DateTime<Utc>) -> JobResult<Option<Job>> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs
                .iter_mut()
                .find(|j| j.id == id && j.name == name && j.locked_at.is_none() && !j.disabled);
            match job {
                Some(job) => {
                    job.locked_at = Some(now);
                    Ok(Some(job.clone()))
                }
                None => Ok(None),
            }
        }

        async fn claim_next(
            &self,
            name: &str,
            scan_horizon: DateTime<Utc>,
            lock_deadline: DateTime<Utc>,
            now: DateTime<Utc>,
        ) -> JobResult<Option<Job>> {
            let mut jobs = self.jobs.lock().unwrap();
            let mut candidates: Vec<usize> = jobs
                .iter()
                .enumerate()
                .filter(|(_, j)| j.name == name && Self::eligible(j, scan_horizon, lock_deadline))
                .map(|(i, _)| i)
                .collect();
            candidates.sort_by(|&a, &b| {
                let ja = &jobs[a];
                let jb = &jobs[b];
                ja.next_run_at
                    .cmp(&jb.next_run_at)
                    .then(jb.priority.cmp(&ja.priority))
            });
            match candidates.first() {
                Some(&idx) => {
                    jobs[idx].locked_at = Some(now);
                    Ok(Some(jobs[idx].clone()))
                }
                None => Ok(None),
            }
        }

        async fn batch_claim(
            &self,
            name: &str,
            batch_size: usize,
            scan_horizon: DateTime<Utc>,
            lock_deadline: DateTime<Utc>,
            now: DateTime<Utc>,
        ) -> JobResult<Vec<Job>> {
            let mut jobs = self.jobs.lock().unwrap();
            let mut candidates: Vec<usize> = jobs
                .iter()
                .enumerate()
                .filter(|(_, j)| j.name == name && Self::eligible(j, scan_horizon, lock_deadline))
                .map(|(i, _)| i)
                .collect();
            candidates.sort_by(|&a, &b| {
                let ja = &jobs[a];
                let jb = &jobs[b];
                ja.next_run_at
                    .cmp(&jb.next_run_at)
                    .then(jb.priority.cmp(&ja.priority))
            });
            candidates.truncate(batch_size);

            let mut claimed = Vec::new();
            for idx in candidates {
                // Re-check eligibility: simulates phase 2's re-filter for
                // stealers between phase 1 and phase 2.
                if Self::eligible(&jobs[idx], scan_horizon, lock_deadline) {
                    jobs[idx].locked_at = Some(now);
                    claimed.push(jobs[idx].clone());
                }
            }
            Ok(claimed)
        }

        async fn release(&self, id: JobId) -> JobResult<()> {
            let mut jobs = self.jobs.lock().unwrap();
            if let Some(job) = jobs.iter_mut().find(|j| j.id == id) {
                if job.next_run_at.is_some() {
                    job.locked_at = None;
                }
            }
            Ok(())
        }

        async fn release_many(&self, ids: &[JobId]) -> JobResult<()> {
            let mut jobs = self.jobs.lock().unwrap();
            for job in jobs.iter_mut() {
                if ids.contains(&job.id) && job.next_run_at.is_some() {
                    job.locked_at = None;
                }
            }
            Ok(())
        }

        async fn save_state(&self, job: &Job) -> JobResult<()> {
            let mut jobs = self.jobs.lock().unwrap();
            match jobs.iter_mut().find(|j| j.id == job.id && j.name == job.name) {
                Some(existing) => {
                    existing.locked_at = job.locked_at;
                    existing.next_run_at = job.next_run_at;
                    existing.last_run_at = job.last_run_at;
                    existing.last_finished_at = job.last_finished_at;
                    existing.failed_at = job.failed_at;
                    existing.fail_count = job.fail_count;
                    existing.fail_reason = job.fail_reason.clone();
                    existing.progress = job.progress;
                    Ok(())
                }
                None => Err(JobError::Storage(format!(
                    "save_state: job {} ({}) no longer exists",
                    job.id, job.name
                ))),
            }
        }

        async fn queue_size(&self, now: DateTime<Utc>) -> JobResult<i64> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs.iter().filter(|j| j.next_run_at.map(|t| t < now).unwrap_or(false)).count() as i64)
        }

        async fn locked_at(&self, id: JobId) -> JobResult<Option<DateTime<Utc>>> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs.iter().find(|j| j.id == id).and_then(|j| j.locked_at))
        }

        async fn upsert_single(
            &self,
            name: &str,
            data: serde_json::Value,
            priority: i32,
            next_run_at: Option<DateTime<Utc>>,
        ) -> JobResult<Job> {
            let mut jobs = self.jobs.lock().unwrap();
            if let Some(existing) = jobs
                .iter_mut()
                .find(|j| j.name == name && j.job_type == JobType::Single)
            {
                existing.data = data;
                return Ok(existing.clone());
            }
            let mut job = Job::new(name, data).with_priority(priority).single();
            job.next_run_at = next_run_at;
            jobs.push(job.clone());
            Ok(job)
        }
    }

    /// Shareable handle for tests simulating multiple workers against
    /// one store.
    pub fn shared_fake() -> Arc<FakeJobRepository> {
        Arc::new(FakeJobRepository::new())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::FakeJobRepository;
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn claim_then_release_round_trips_non_locked_fields() {
        let repo = FakeJobRepository::new();
        let job = Job::new("a", serde_json::json!({"x": 1})).with_next_run_at(Utc::now() - Duration::seconds(1));
        let id = job.id;
        repo.seed(job.clone());

        let claimed = repo.claim(id, "a", Utc::now()).await.unwrap().unwrap();
        assert!(claimed.locked_at.is_some());

        repo.release(id).await.unwrap();
        let after = repo.get(id).unwrap();
        assert!(after.locked_at.is_none());
        assert_eq!(after.data, job.data);
        assert_eq!(after.priority, job.priority);
    }

    #[tokio::test]
    async fn claim_next_orders_by_next_run_at_then_priority() {
        let repo = FakeJobRepository::new();
        let now = Utc::now();
        let low = Job::new("a", serde_json::json!({})).with_next_run_at(now - Duration::seconds(5)).with_priority(-5);
        let high = Job::new("a", serde_json::json!({})).with_next_run_at(now - Duration::seconds(5)).with_priority(10);
        let high_id = high.id;
        repo.seed(low);
        repo.seed(high);

        let claimed = repo
            .claim_next("a", now + Duration::seconds(5), now - Duration::minutes(10), now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(claimed.id, high_id);
    }

    #[tokio::test]
    async fn batch_claim_then_release_many_leaves_collection_unchanged() {
        let repo = FakeJobRepository::new();
        let now = Utc::now();
        for _ in 0..5 {
            repo.seed(Job::new("a", serde_json::json!({})).with_next_run_at(now - Duration::seconds(1)));
        }
        let before = repo.all();

        let claimed = repo
            .batch_claim("a", 5, now + Duration::seconds(5), now - Duration::minutes(10), now)
            .await
            .unwrap();
        assert_eq!(claimed.len(), 5);

        let ids: Vec<JobId> = claimed.iter().map(|j| j.id).collect();
        repo.release_many(&ids).await.unwrap();

        let mut after = repo.all();
        let mut before_sorted = before;
        after.sort_by_key(|j| j.id);
        before_sorted.sort_by_key(|j| j.id);
        assert_eq!(after.len(), before_sorted.len());
        for (a, b) in after.iter().zip(before_sorted.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.locked_at, b.locked_at);
        }
    }

    #[tokio::test]
    async fn stale_lock_is_reclaimed_after_deadline() {
        let repo = FakeJobRepository::new();
        let now = Utc::now();
        let mut job = Job::new("b", serde_json::json!({})).with_next_run_at(now - Duration::seconds(60));
        job.locked_at = Some(now - Duration::seconds(60));
        let id = job.id;
        repo.seed(job);

        let claimed = repo
            .claim_next("b", now + Duration::seconds(5), now - Duration::seconds(30), now)
            .await
            .unwrap();
        assert_eq!(claimed.unwrap().id, id);
    }

    #[tokio::test]
    async fn save_state_fails_when_record_is_gone() {
        let repo = FakeJobRepository::new();
        let job = Job::new("a", serde_json::json!({}));
        let err = repo.save_state(&job).await.unwrap_err();
        assert!(matches!(err, JobError::Storage(_)));
    }

    #[tokio::test]
    async fn upsert_single_is_idempotent_under_concurrent_creators() {
        let repo = Arc::new(FakeJobRepository::new());
        let mut handles = Vec::new();
        for i in 0..10 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.upsert_single("heartbeat", serde_json::json!({"n": i}), 0, Some(Utc::now()))
                    .await
                    .unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let singles: Vec<_> = repo.all().into_iter().filter(|j| j.name == "heartbeat").collect();
        assert_eq!(singles.len(), 1);
    }
}
