//! Dispatch loop and per-job worker

use super::state::Inner;
use crate::adapters::engines::{ExportEngine, JobContext};
use crate::domain::{EngineError, Job, JobId};
use crate::{log_job_finished, log_job_started, log_retry_attempt};
use std::any::Any;
use std::sync::Arc;
use tokio::sync::{watch, OwnedSemaphorePermit};

/// Hand pending jobs to free worker slots until shutdown
pub(super) async fn dispatch_loop(inner: Arc<Inner>, mut shutdown: watch::Receiver<bool>) {
    tracing::debug!(
        max_concurrent_jobs = inner.options.max_concurrent_jobs,
        "Dispatch loop started"
    );

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }

        let permit = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            permit = inner.slots.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let next = loop {
            if let Some(next) = inner.take_next() {
                break Some(next);
            }
            tokio::select! {
                biased;
                _ = shutdown.changed() => break None,
                _ = inner.wake.notified() => {}
            }
        };

        let Some((job_id, cancel_rx)) = next else {
            break;
        };
        tokio::spawn(run_job(inner.clone(), job_id, cancel_rx, permit));
    }

    tracing::debug!("Dispatch loop stopped");
}

/// Retires the job from the active map however the worker exits
struct Retire {
    inner: Arc<Inner>,
    job_id: JobId,
}

impl Drop for Retire {
    fn drop(&mut self) {
        if let Some(job) = self.inner.retire(&self.job_id) {
            let elapsed = job
                .elapsed()
                .and_then(|d| d.to_std().ok())
                .unwrap_or_default();
            log_job_finished!(&job.id, job.status, elapsed);
        }
    }
}

/// Drive one job through its attempts
async fn run_job(
    inner: Arc<Inner>,
    job_id: JobId,
    cancel_rx: watch::Receiver<bool>,
    _permit: OwnedSemaphorePermit,
) {
    let _retire = Retire {
        inner: inner.clone(),
        job_id: job_id.clone(),
    };

    let progress_inner = inner.clone();
    let progress_id = job_id.clone();
    let ctx = JobContext::new(
        Arc::new(move |percent| progress_inner.record_progress(&progress_id, percent)),
        cancel_rx,
    );
    let policy = &inner.options.retry;

    loop {
        let Some(job) = inner.begin_attempt(&job_id) else {
            return;
        };
        log_job_started!(&job.id, job.preset.format, job.attempts);

        let result = match inner.engines.get(job.preset.format) {
            Some(engine) => execute(engine, job.clone(), ctx.clone()).await,
            None => Err(EngineError::NoEngine(job.preset.format)),
        };

        if inner.is_cancelled(&job_id) {
            return;
        }

        let err = match result {
            Ok(()) => {
                inner.mark_completed(&job_id);
                return;
            }
            Err(err) => err,
        };

        if err.is_retryable() && policy.allows_another(job.attempts) {
            log_retry_attempt!(job.attempts + 1, policy.max_attempts, err);
            inner.record_attempt_error(&job_id, err.to_string());

            tokio::select! {
                _ = tokio::time::sleep(policy.delay_after(job.attempts)) => {}
                _ = ctx.cancelled() => return,
            }
            continue;
        }

        tracing::error!(
            job_id = %job_id,
            attempts = job.attempts,
            error = %err,
            "Export job failed"
        );
        inner.mark_failed(&job_id, err.to_string());
        return;
    }
}

/// Run the engine on its own task so a panic surfaces as an error
async fn execute(engine: Arc<dyn ExportEngine>, job: Job, ctx: JobContext) -> Result<(), EngineError> {
    let name = engine.name();
    let handle = tokio::spawn(async move { engine.export(&job, &ctx).await });

    match handle.await {
        Ok(result) => result,
        Err(err) if err.is_panic() => {
            let message = panic_message(err.into_panic());
            tracing::error!(engine = name, panic = %message, "Export engine panicked");
            Err(EngineError::Panicked(message))
        }
        Err(err) => Err(EngineError::Failed(format!("engine task aborted: {err}"))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
