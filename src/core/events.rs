//! In-process publish/subscribe
//!
//! [`EventBus`] fans events out to channel subscribers and callback
//! listeners. Emission never blocks: channels are unbounded, and callbacks run
//! on the emitting task outside the subscriber lock, so a callback may itself
//! subscribe or emit.

use crate::domain::JobId;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Callback listener
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

enum Subscriber<E> {
    Channel(mpsc::UnboundedSender<E>),
    Callback(Listener<E>),
}

impl<E> Clone for Subscriber<E> {
    fn clone(&self) -> Self {
        match self {
            Subscriber::Channel(tx) => Subscriber::Channel(tx.clone()),
            Subscriber::Callback(f) => Subscriber::Callback(f.clone()),
        }
    }
}

/// Multi-subscriber event bus
///
/// Each subscriber sees events in emission order. Closed channel subscribers
/// are dropped on the next emission.
pub struct EventBus<E> {
    subscribers: Mutex<Vec<Subscriber<E>>>,
}

impl<E: Clone + Send + 'static> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe with a channel
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<E> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(Subscriber::Channel(tx));
        rx
    }

    /// Register a callback invoked for every event
    pub fn on(&self, listener: impl Fn(&E) + Send + Sync + 'static) {
        self.subscribers
            .lock()
            .push(Subscriber::Callback(Arc::new(listener)));
    }

    /// Deliver an event to every live subscriber
    pub fn emit(&self, event: E) {
        let snapshot: Vec<Subscriber<E>> = self.subscribers.lock().clone();
        let mut closed = false;

        for subscriber in &snapshot {
            match subscriber {
                Subscriber::Channel(tx) => {
                    if tx.send(event.clone()).is_err() {
                        closed = true;
                    }
                }
                Subscriber::Callback(listener) => listener(&event),
            }
        }

        if closed {
            self.subscribers.lock().retain(|s| match s {
                Subscriber::Channel(tx) => !tx.is_closed(),
                Subscriber::Callback(_) => true,
            });
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl<E: Clone + Send + 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.lock().len())
            .finish()
    }
}

/// Scheduler lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SchedulerEvent {
    JobAdded { job_id: JobId },
    /// Fired at the start of every attempt
    JobStarted { job_id: JobId, attempt: u32 },
    JobProgress { job_id: JobId, percent: f64 },
    JobCompleted { job_id: JobId, output_path: PathBuf },
    /// Fired once, after the final attempt
    JobFailed { job_id: JobId, error: String },
    JobCancelled { job_id: JobId },
    QueueChanged,
}

impl SchedulerEvent {
    /// Job the event concerns, if any
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            SchedulerEvent::JobAdded { job_id }
            | SchedulerEvent::JobStarted { job_id, .. }
            | SchedulerEvent::JobProgress { job_id, .. }
            | SchedulerEvent::JobCompleted { job_id, .. }
            | SchedulerEvent::JobFailed { job_id, .. }
            | SchedulerEvent::JobCancelled { job_id } => Some(job_id),
            SchedulerEvent::QueueChanged => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SchedulerEvent::JobCompleted { .. }
                | SchedulerEvent::JobFailed { .. }
                | SchedulerEvent::JobCancelled { .. }
        )
    }
}
