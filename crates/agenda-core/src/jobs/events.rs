//! Event Surface (spec.md §6, "produced"): `processJob`, `error`,
//! `queueOverflow`, `ready`. These are observations the core emits; it
//! never consumes its own events.
//!
//! REDESIGN FLAGS maps the source's event-bus emitter onto a typed
//! channel: a `tokio::sync::broadcast` of a strongly-typed `JobEvent`,
//! so any number of observers (a status page, a metrics exporter, a
//! test) can subscribe independently.

use crate::jobs::job::Job;
use serde::Serialize;
use tokio::sync::broadcast;

/// An error observation, carrying the job name when the error is
/// attributable to one (storage errors during discovery may not be).
#[derive(Debug, Clone, Serialize)]
pub struct JobEventError {
    pub name: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// A job is about to run.
    ProcessJob { job: Job },
    /// A per-job or per-discovery-pass error occurred.
    Error(JobEventError),
    /// The Local Ready Queue rejected an insert because it was full.
    QueueOverflow {
        name: String,
        queue_size: usize,
        max_size: usize,
    },
    /// The processor completed a tick with no errors.
    Ready,
}

const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Broadcast hub for `JobEvent`. Cloning is cheap (wraps the `Sender`);
/// every clone shares the same subscriber set.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<JobEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.tx.subscribe()
    }

    /// Best-effort publish. No receivers is not an error: the core does
    /// not require anyone to be listening.
    pub fn emit(&self, event: JobEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_observes_emitted_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        bus.emit(JobEvent::Ready);
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, JobEvent::Ready));
    }

    #[tokio::test]
    async fn emit_without_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.emit(JobEvent::QueueOverflow {
            name: "a".into(),
            queue_size: 10_000,
            max_size: 10_000,
        });
    }
}
