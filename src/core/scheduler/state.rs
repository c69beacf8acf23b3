//! Shared scheduler state
//!
//! Every job lives in exactly one place: the pending queue, the active map, or
//! one of the three history partitions. All moves between them happen under
//! one lock, and the events describing a move are emitted in the same order
//! the moves happen.

use super::queue::PendingQueue;
use super::retry::SchedulerOptions;
use crate::adapters::engines::EngineRegistry;
use crate::core::events::{EventBus, SchedulerEvent};
use crate::domain::{Job, JobId, JobStatus};
use chrono::Utc;
use parking_lot::{Mutex, ReentrantMutex};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify, Semaphore};

/// Point-in-time queue counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub pending: usize,
    pub active: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub max_concurrent: usize,
}

impl QueueStatus {
    /// Jobs that have not reached a terminal state
    pub fn outstanding(&self) -> usize {
        self.pending + self.active
    }
}

/// Outcome of [`Scheduler::shutdown`](super::Scheduler::shutdown)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    /// Every in-flight job finished before the timeout
    pub drained: bool,
    /// Jobs still running when shutdown returned
    pub in_flight: usize,
    /// Jobs left in the queue, never started
    pub pending: usize,
}

pub(super) struct ActiveJob {
    pub job: Job,
    pub cancel_tx: watch::Sender<bool>,
}

#[derive(Default)]
pub(super) struct State {
    pub pending: PendingQueue,
    pub active: HashMap<JobId, ActiveJob>,
    pub completed: Vec<Job>,
    pub failed: Vec<Job>,
    pub cancelled: Vec<Job>,
    pub closed: bool,
}

impl State {
    fn find(&self, id: &str) -> Option<&Job> {
        self.pending
            .get(id)
            .or_else(|| {
                self.active
                    .values()
                    .map(|a| &a.job)
                    .find(|j| j.id.as_str() == id)
            })
            .or_else(|| {
                self.completed
                    .iter()
                    .chain(&self.failed)
                    .chain(&self.cancelled)
                    .find(|j| j.id.as_str() == id)
            })
    }
}

pub(super) struct Inner {
    pub state: Mutex<State>,
    /// Serializes state transitions with the events they produce; reentrant
    /// so a listener may call back into the scheduler
    order: ReentrantMutex<()>,
    pub engines: EngineRegistry,
    pub options: SchedulerOptions,
    pub slots: Arc<Semaphore>,
    pub wake: Notify,
    pub events: EventBus<SchedulerEvent>,
    pub shutdown_tx: watch::Sender<bool>,
}

impl Inner {
    pub fn new(engines: EngineRegistry, options: SchedulerOptions) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            state: Mutex::new(State::default()),
            order: ReentrantMutex::new(()),
            engines,
            slots: Arc::new(Semaphore::new(options.max_concurrent_jobs)),
            options,
            wake: Notify::new(),
            events: EventBus::new(),
            shutdown_tx,
        }
    }

    /// Apply `f` to the state, then emit the events it returns
    pub fn transition<R>(&self, f: impl FnOnce(&mut State) -> (R, Vec<SchedulerEvent>)) -> R {
        let _order = self.order.lock();
        let (result, events) = {
            let mut state = self.state.lock();
            f(&mut state)
        };
        for event in events {
            self.events.emit(event);
        }
        result
    }

    pub fn enqueue(&self, mut job: Job) -> Option<JobId> {
        let accepted = self.transition(|state| {
            if state.closed {
                return (None, Vec::new());
            }
            job.mark_queued();
            let id = job.id.clone();
            state.pending.push(job);
            (
                Some(id.clone()),
                vec![
                    SchedulerEvent::JobAdded { job_id: id },
                    SchedulerEvent::QueueChanged,
                ],
            )
        });
        if accepted.is_some() {
            self.wake.notify_one();
        }
        accepted
    }

    /// Pop the next pending job into the active map
    pub fn take_next(&self) -> Option<(JobId, watch::Receiver<bool>)> {
        let mut state = self.state.lock();
        let job = state.pending.pop()?;
        let id = job.id.clone();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        state.active.insert(id.clone(), ActiveJob { job, cancel_tx });
        Some((id, cancel_rx))
    }

    /// Start the next attempt; `None` once the job was cancelled
    pub fn begin_attempt(&self, id: &JobId) -> Option<Job> {
        self.transition(|state| match state.active.get_mut(id) {
            Some(active) if !active.job.is_terminal() => {
                active.job.mark_processing();
                let event = SchedulerEvent::JobStarted {
                    job_id: id.clone(),
                    attempt: active.job.attempts,
                };
                (Some(active.job.clone()), vec![event])
            }
            _ => (None, Vec::new()),
        })
    }

    pub fn record_progress(&self, id: &JobId, percent: f64) {
        self.transition(|state| {
            let moved = state
                .active
                .get_mut(id)
                .and_then(|active| active.job.update_progress(percent));
            let events = moved
                .map(|percent| SchedulerEvent::JobProgress {
                    job_id: id.clone(),
                    percent,
                })
                .into_iter()
                .collect();
            ((), events)
        });
    }

    /// Keep a failed attempt's error visible while the job waits to retry
    pub fn record_attempt_error(&self, id: &JobId, error: String) {
        let mut state = self.state.lock();
        if let Some(active) = state.active.get_mut(id) {
            if !active.job.is_terminal() {
                active.job.error_message = Some(error);
            }
        }
    }

    pub fn is_cancelled(&self, id: &JobId) -> bool {
        let state = self.state.lock();
        state
            .active
            .get(id)
            .map(|a| a.job.status == JobStatus::Cancelled)
            .unwrap_or(false)
    }

    pub fn mark_completed(&self, id: &JobId) {
        let mut state = self.state.lock();
        if let Some(active) = state.active.get_mut(id) {
            if !active.job.is_terminal() {
                active.job.mark_completed();
            }
        }
    }

    pub fn mark_failed(&self, id: &JobId, error: String) {
        let mut state = self.state.lock();
        if let Some(active) = state.active.get_mut(id) {
            if !active.job.is_terminal() {
                active.job.mark_failed(error);
            }
        }
    }

    /// Move a job out of the active map into its history partition
    ///
    /// A job that never reached a terminal state is recorded as failed.
    pub fn retire(&self, id: &JobId) -> Option<Job> {
        self.transition(|state| {
            let Some(ActiveJob { mut job, .. }) = state.active.remove(id) else {
                return (None, Vec::new());
            };

            let mut events = Vec::with_capacity(2);
            if !job.is_terminal() {
                job.mark_failed("export worker stopped before the job finished");
            }
            match job.status {
                JobStatus::Completed => {
                    events.push(SchedulerEvent::JobCompleted {
                        job_id: job.id.clone(),
                        output_path: job.output_path.clone(),
                    });
                    state.completed.push(job.clone());
                }
                JobStatus::Cancelled => state.cancelled.push(job.clone()),
                _ => {
                    events.push(SchedulerEvent::JobFailed {
                        job_id: job.id.clone(),
                        error: job.error_message.clone().unwrap_or_default(),
                    });
                    state.failed.push(job.clone());
                }
            }
            events.push(SchedulerEvent::QueueChanged);
            (Some(job), events)
        })
    }

    pub fn cancel(&self, id: &str) -> bool {
        self.transition(|state| {
            let Some(active) = state
                .active
                .values_mut()
                .find(|a| a.job.id.as_str() == id)
            else {
                return (false, Vec::new());
            };
            if active.job.is_terminal() {
                return (false, Vec::new());
            }
            active.job.mark_cancelled();
            let _ = active.cancel_tx.send(true);
            let event = SchedulerEvent::JobCancelled {
                job_id: active.job.id.clone(),
            };
            (true, vec![event])
        })
    }

    pub fn status(&self) -> QueueStatus {
        let state = self.state.lock();
        QueueStatus {
            pending: state.pending.len(),
            active: state.active.len(),
            completed: state.completed.len(),
            failed: state.failed.len(),
            cancelled: state.cancelled.len(),
            max_concurrent: self.options.max_concurrent_jobs,
        }
    }

    pub fn job(&self, id: &str) -> Option<Job> {
        self.state.lock().find(id).cloned()
    }

    pub fn pending_jobs(&self) -> Vec<Job> {
        self.state.lock().pending.to_vec()
    }

    pub fn active_jobs(&self) -> Vec<Job> {
        let state = self.state.lock();
        let mut jobs: Vec<Job> = state.active.values().map(|a| a.job.clone()).collect();
        jobs.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        jobs
    }

    pub fn history(&self, limit: usize) -> Vec<Job> {
        let state = self.state.lock();
        let mut jobs: Vec<Job> = state
            .completed
            .iter()
            .chain(&state.failed)
            .chain(&state.cancelled)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        jobs.truncate(limit);
        jobs
    }

    pub fn purge_completed(&self, max_age: Duration) -> usize {
        let cutoff = chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age));
        let mut state = self.state.lock();
        let before = state.completed.len();
        state.completed.retain(|job| match (job.completed_at, cutoff) {
            (Some(done), Some(cutoff)) => done >= cutoff,
            _ => true,
        });
        before - state.completed.len()
    }

    pub fn close(&self) {
        self.state.lock().closed = true;
    }
}
