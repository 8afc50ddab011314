//! Definitions Registry: the external collaborator (spec.md §6, "consumed")
//! that maps a job `name` to its handler and per-name tunables.
//!
//! Registering named job handlers, cron/interval parsing, and the
//! user-facing job-construction surface are all out of scope for the core
//! (spec.md §1); this module defines only the read side the Processor
//! needs: look up a `JobDefinition` by name, and enumerate the registered
//! names to drive a discovery pass.

use crate::jobs::error::JobResult;
use crate::jobs::job::Job;
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A registered handler, called with the claimed job and a cancellation
/// token the handler should poll (or race against) so it can wind down
/// cooperatively when the watchdog or an explicit `cancel()` fires.
pub type HandlerFn = dyn Fn(Job, CancellationToken) -> BoxFuture<'static, JobResult<()>> + Send + Sync;

/// Per-name configuration and handler, as consumed by the Processor.
pub struct JobDefinition {
    pub name: String,
    pub handler: Arc<HandlerFn>,

    /// Max concurrently-running handlers for this name. 0 means unlimited.
    pub concurrency: usize,

    /// Max concurrently-locked (claimed) jobs for this name. 0 means unlimited.
    pub lock_limit: usize,

    /// Claim lease duration for this name.
    pub lock_lifetime: chrono::Duration,

    /// Default priority for jobs of this name when not explicitly set.
    pub priority: i32,
}

impl std::fmt::Debug for JobDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobDefinition")
            .field("name", &self.name)
            .field("concurrency", &self.concurrency)
            .field("lock_limit", &self.lock_limit)
            .field("lock_lifetime", &self.lock_lifetime)
            .field("priority", &self.priority)
            .finish()
    }
}

impl JobDefinition {
    pub fn new(
        name: impl Into<String>,
        handler: Arc<HandlerFn>,
    ) -> Self {
        Self {
            name: name.into(),
            handler,
            concurrency: 0,
            lock_limit: 0,
            lock_lifetime: chrono::Duration::minutes(10),
            priority: 0,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_lock_limit(mut self, lock_limit: usize) -> Self {
        self.lock_limit = lock_limit;
        self
    }

    pub fn with_lock_lifetime(mut self, lifetime: chrono::Duration) -> Self {
        self.lock_lifetime = lifetime;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Read-side contract the Processor consumes. Registration itself (the
/// write side) belongs to the job-authoring surface, out of scope here;
/// `InMemoryRegistry` provides just enough of a write side for the
/// core's own tests and for a minimal in-process consumer.
pub trait DefinitionsRegistry: Send + Sync {
    fn get(&self, name: &str) -> Option<Arc<JobDefinition>>;
    fn names(&self) -> Vec<String>;
}

/// Default, in-memory implementation backed by a concurrent map so
/// registration from one task is visible to the Processor's discovery
/// loop without an external lock.
#[derive(Default)]
pub struct InMemoryRegistry {
    definitions: DashMap<String, Arc<JobDefinition>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, definition: JobDefinition) {
        self.definitions
            .insert(definition.name.clone(), Arc::new(definition));
    }
}

impl DefinitionsRegistry for InMemoryRegistry {
    fn get(&self, name: &str) -> Option<Arc<JobDefinition>> {
        self.definitions.get(name).map(|entry| entry.value().clone())
    }

    fn names(&self) -> Vec<String> {
        self.definitions.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_handler() -> Arc<HandlerFn> {
        Arc::new(|job, _token| Box::pin(async move { let _ = job; Ok(()) }))
    }

    #[test]
    fn register_then_lookup_round_trips() {
        let registry = InMemoryRegistry::new();
        registry.register(
            JobDefinition::new("send_email", noop_handler())
                .with_concurrency(2)
                .with_lock_limit(5),
        );

        let def = registry.get("send_email").expect("registered");
        assert_eq!(def.concurrency, 2);
        assert_eq!(def.lock_limit, 5);
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn names_enumerates_all_registered() {
        let registry = InMemoryRegistry::new();
        registry.register(JobDefinition::new("a", noop_handler()));
        registry.register(JobDefinition::new("b", noop_handler()));
        let mut names = registry.names();
        names.sort();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
