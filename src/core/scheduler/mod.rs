//! Export job scheduler
//!
//! The scheduler owns a priority queue of pending jobs and a bounded pool of
//! worker slots. A background dispatch loop moves the highest-priority job
//! into a free slot, where a worker runs it on the engine registered for its
//! format, retrying transient failures with exponential backoff.
//!
//! Lifecycle changes are published as [`SchedulerEvent`]s. Events for one job
//! are always ordered: started, then progress, then exactly one terminal
//! event.
//!
//! # Example
//!
//! ```rust,no_run
//! use framequeue::adapters::engines::EngineRegistry;
//! use framequeue::config::EnginesConfig;
//! use framequeue::core::catalog::PresetCatalog;
//! use framequeue::core::scheduler::{Scheduler, SchedulerOptions};
//! use framequeue::domain::Job;
//! use std::time::Duration;
//!
//! # async fn example() -> framequeue::domain::Result<()> {
//! let engines = EngineRegistry::with_defaults(&EnginesConfig::default());
//! let scheduler = Scheduler::start(engines, SchedulerOptions::default())?;
//! let mut events = scheduler.subscribe();
//!
//! let preset = PresetCatalog::new().get("youtube_1080p").unwrap();
//! let id = scheduler.enqueue(Job::new("project-1", "/tmp/out.mp4", preset))?;
//!
//! while let Some(event) = events.recv().await {
//!     if event.is_terminal() && event.job_id() == Some(&id) {
//!         break;
//!     }
//! }
//! scheduler.shutdown(Duration::from_secs(5)).await;
//! # Ok(())
//! # }
//! ```

pub mod queue;
pub mod retry;
mod state;
mod worker;

use crate::adapters::engines::EngineRegistry;
use crate::core::events::SchedulerEvent;
use crate::domain::{ExportFormat, FramequeueError, Job, JobId, Result};
use parking_lot::Mutex;
use state::Inner;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use retry::{RetryPolicy, SchedulerOptions};
pub use state::{QueueStatus, ShutdownReport};

/// Priority job scheduler
///
/// Must be started inside a Tokio runtime. Dropping the scheduler stops the
/// dispatch loop without waiting for in-flight jobs; call
/// [`shutdown`](Self::shutdown) to drain them.
pub struct Scheduler {
    inner: Arc<Inner>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    /// Start the scheduler and its dispatch loop
    ///
    /// # Errors
    ///
    /// Returns a scheduler error when called outside a Tokio runtime.
    pub fn start(engines: EngineRegistry, options: SchedulerOptions) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            FramequeueError::Scheduler(format!("scheduler needs a Tokio runtime: {e}"))
        })?;

        if engines.is_empty() {
            tracing::warn!("Scheduler started with no export engines registered");
        }

        let inner = Arc::new(Inner::new(engines, options));
        let shutdown_rx = inner.shutdown_tx.subscribe();
        let dispatcher = runtime.spawn(worker::dispatch_loop(inner.clone(), shutdown_rx));

        tracing::info!(
            max_concurrent_jobs = inner.options.max_concurrent_jobs,
            max_attempts = inner.options.retry.max_attempts,
            formats = ?inner.engines.formats(),
            "Scheduler started"
        );

        Ok(Self {
            inner,
            dispatcher: Mutex::new(Some(dispatcher)),
        })
    }

    /// Queue a job
    ///
    /// The job is marked queued and picked up by the dispatch loop; this
    /// never waits for a worker slot.
    ///
    /// # Errors
    ///
    /// Returns a scheduler error once [`shutdown`](Self::shutdown) has begun.
    pub fn enqueue(&self, job: Job) -> Result<JobId> {
        let priority = job.priority;
        let id = self.inner.enqueue(job).ok_or_else(|| {
            FramequeueError::Scheduler("scheduler is shutting down".to_string())
        })?;
        tracing::debug!(job_id = %id, priority, "Job queued");
        Ok(id)
    }

    /// Cancel an active job
    ///
    /// Returns `false` for unknown, finished and still-queued jobs; only a
    /// job occupying a worker slot can be cancelled. The engine is signalled
    /// and the job is recorded as cancelled once its worker exits.
    pub fn cancel(&self, job_id: &str) -> bool {
        let cancelled = self.inner.cancel(job_id);
        if cancelled {
            tracing::info!(job_id = %job_id, "Export job cancelled");
        } else {
            tracing::debug!(job_id = %job_id, "Cancel ignored, job is not active");
        }
        cancelled
    }

    /// Point-in-time queue counts
    pub fn status_snapshot(&self) -> QueueStatus {
        self.inner.status()
    }

    /// Finished jobs, most recent first
    pub fn history(&self, limit: usize) -> Vec<Job> {
        self.inner.history(limit)
    }

    /// Drop completed jobs older than `max_age`; returns how many went
    ///
    /// Failed and cancelled jobs are kept.
    pub fn purge_completed(&self, max_age: Duration) -> usize {
        let purged = self.inner.purge_completed(max_age);
        if purged > 0 {
            tracing::debug!(purged, "Purged completed jobs");
        }
        purged
    }

    /// Look up a job in any state
    pub fn job(&self, job_id: &str) -> Option<Job> {
        self.inner.job(job_id)
    }

    /// Queued jobs in dispatch order
    pub fn pending_jobs(&self) -> Vec<Job> {
        self.inner.pending_jobs()
    }

    /// Jobs currently holding a worker slot
    pub fn active_jobs(&self) -> Vec<Job> {
        self.inner.active_jobs()
    }

    pub fn has_engine(&self, format: ExportFormat) -> bool {
        self.inner.engines.supports(format)
    }

    pub fn engines(&self) -> &EngineRegistry {
        &self.inner.engines
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.inner.options
    }

    /// Receive every scheduler event from now on
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SchedulerEvent> {
        self.inner.events.subscribe()
    }

    /// Invoke `listener` for every scheduler event
    ///
    /// Listeners run on the task that produced the event and must not block.
    pub fn on_event(&self, listener: impl Fn(&SchedulerEvent) + Send + Sync + 'static) {
        self.inner.events.on(listener);
    }

    /// Stop dispatching and wait up to `timeout` for in-flight jobs
    ///
    /// Queued jobs stay queued and are reported, in-flight jobs are not
    /// cancelled. Further [`enqueue`](Self::enqueue) calls fail.
    pub async fn shutdown(&self, timeout: Duration) -> ShutdownReport {
        self.inner.close();
        let _ = self.inner.shutdown_tx.send(true);

        let dispatcher = self.dispatcher.lock().take();
        if let Some(handle) = dispatcher {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Dispatch loop ended abnormally");
            }
        }

        let slots = u32::try_from(self.inner.options.max_concurrent_jobs).unwrap_or(u32::MAX);
        let drained = matches!(
            tokio::time::timeout(timeout, self.inner.slots.acquire_many(slots)).await,
            Ok(Ok(_))
        );

        let status = self.inner.status();
        let report = ShutdownReport {
            drained,
            in_flight: status.active,
            pending: status.pending,
        };

        if drained {
            tracing::info!(pending = report.pending, "Scheduler stopped");
        } else {
            tracing::warn!(
                in_flight = report.in_flight,
                pending = report.pending,
                timeout_secs = timeout.as_secs_f64(),
                "Scheduler stopped before in-flight jobs finished"
            );
        }
        report
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let _ = self.inner.shutdown_tx.send(true);
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("status", &self.inner.status())
            .field("engines", &self.inner.engines)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::engines::{ExportEngine, JobContext};
    use crate::core::catalog::PresetCatalog;
    use crate::domain::{EngineError, JobStatus};
    use async_trait::async_trait;

    struct Instant;

    #[async_trait]
    impl ExportEngine for Instant {
        fn name(&self) -> &'static str {
            "instant"
        }

        fn supports(&self) -> &[ExportFormat] {
            &[ExportFormat::Mp4H264]
        }

        async fn export(&self, _job: &Job, ctx: &JobContext) -> std::result::Result<(), EngineError> {
            ctx.report_progress(50.0);
            Ok(())
        }
    }

    fn job() -> Job {
        let preset = PresetCatalog::new().get("youtube_1080p").unwrap();
        Job::new("project", "/tmp/out.mp4", preset)
    }

    async fn wait_terminal(
        events: &mut mpsc::UnboundedReceiver<SchedulerEvent>,
        id: &JobId,
    ) -> SchedulerEvent {
        loop {
            let event = events.recv().await.unwrap();
            if event.is_terminal() && event.job_id() == Some(id) {
                return event;
            }
        }
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let result = Scheduler::start(EngineRegistry::new(), SchedulerOptions::default());
        assert!(matches!(result, Err(FramequeueError::Scheduler(_))));
    }

    #[tokio::test]
    async fn test_job_runs_to_completion() {
        let engines = EngineRegistry::new().with_engine(Arc::new(Instant));
        let scheduler = Scheduler::start(engines, SchedulerOptions::default()).unwrap();
        let mut events = scheduler.subscribe();

        let id = scheduler.enqueue(job()).unwrap();
        let terminal = wait_terminal(&mut events, &id).await;
        assert!(matches!(terminal, SchedulerEvent::JobCompleted { .. }));

        let finished = scheduler.job(id.as_str()).unwrap();
        assert_eq!(finished.status, JobStatus::Completed);
        assert_eq!(finished.progress, 100.0);
        assert_eq!(finished.attempts, 1);

        let report = scheduler.shutdown(Duration::from_secs(1)).await;
        assert!(report.drained);
        assert_eq!(scheduler.status_snapshot().completed, 1);
    }

    #[tokio::test]
    async fn test_enqueue_after_shutdown_fails() {
        let scheduler = Scheduler::start(EngineRegistry::new(), SchedulerOptions::default()).unwrap();
        scheduler.shutdown(Duration::from_millis(100)).await;
        assert!(matches!(
            scheduler.enqueue(job()),
            Err(FramequeueError::Scheduler(_))
        ));
    }

    #[tokio::test]
    async fn test_purge_only_touches_completed() {
        let engines = EngineRegistry::new().with_engine(Arc::new(Instant));
        let scheduler = Scheduler::start(engines, SchedulerOptions::default()).unwrap();
        let mut events = scheduler.subscribe();

        let id = scheduler.enqueue(job()).unwrap();
        wait_terminal(&mut events, &id).await;

        assert_eq!(scheduler.purge_completed(Duration::from_secs(3600)), 0);
        assert_eq!(scheduler.purge_completed(Duration::ZERO), 1);
        assert_eq!(scheduler.status_snapshot().completed, 0);
        assert!(scheduler.history(10).is_empty());
    }
}
