//! Export engine abstraction
//!
//! This module defines the capability every export engine implements and the
//! per-job context the scheduler hands to it.

use crate::domain::{EngineError, ExportFormat, Job, Preset};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Progress sink invoked with a percentage in `[0, 100]`
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// Per-job execution context
///
/// Carries the progress sink and the cancellation signal for one engine
/// attempt. Engines never change job status; they report progress here and
/// return `Ok` or `Err`.
#[derive(Clone)]
pub struct JobContext {
    progress: ProgressFn,
    cancel: watch::Receiver<bool>,
}

impl JobContext {
    pub fn new(progress: ProgressFn, cancel: watch::Receiver<bool>) -> Self {
        Self { progress, cancel }
    }

    /// Context that discards progress and is never cancelled
    ///
    /// Handy for driving an engine directly, outside the scheduler.
    pub fn detached() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self::new(Arc::new(|_| {}), rx)
    }

    /// Report progress
    ///
    /// Values are clamped by the job; non-monotonic reports are dropped.
    pub fn report_progress(&self, percent: f64) {
        (self.progress)(percent);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Resolves once the job is cancelled
    ///
    /// Pends forever when the scheduler drops the sender without cancelling,
    /// so it is safe to use as a `select!` branch.
    pub async fn cancelled(&self) {
        let mut rx = self.cancel.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl fmt::Debug for JobContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobContext")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Export engine capability
///
/// One implementation per output-format family. The scheduler looks engines up
/// by `job.preset.format` and calls [`ExportEngine::export`] from a worker
/// task.
#[async_trait]
pub trait ExportEngine: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Formats this engine can produce
    fn supports(&self) -> &[ExportFormat];

    /// Reject presets the engine cannot honor
    ///
    /// Called at submission time so a bad preset fails synchronously.
    fn validate_preset(&self, _preset: &Preset) -> Result<(), EngineError> {
        Ok(())
    }

    /// Produce the artifact at `job.output_path`
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] describing why the artifact could not be
    /// produced. The error text becomes the job's `error_message`.
    async fn export(&self, job: &Job, ctx: &JobContext) -> Result<(), EngineError>;
}
