//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output filtered by level or `RUST_LOG`
//! - JSON-formatted local log files with rotation
//! - Macros that keep job lifecycle log lines uniform
//!
//! # Example
//!
//! ```no_run
//! use framequeue::logging::init_logging;
//! use framequeue::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of an engine attempt
///
/// # Example
///
/// ```no_run
/// use framequeue::log_job_started;
/// use framequeue::domain::{ExportFormat, JobId};
///
/// let job_id = JobId::generate();
/// log_job_started!(&job_id, ExportFormat::Mp4H264, 1);
/// ```
#[macro_export]
macro_rules! log_job_started {
    ($job_id:expr, $format:expr, $attempt:expr) => {
        tracing::info!(
            job_id = %$job_id,
            format = %$format,
            attempt = $attempt,
            "Export job started"
        );
    };
}

/// Log a job reaching a terminal state
///
/// # Example
///
/// ```no_run
/// use framequeue::log_job_finished;
/// use framequeue::domain::{JobId, JobStatus};
/// use std::time::Duration;
///
/// let job_id = JobId::generate();
/// log_job_finished!(&job_id, JobStatus::Completed, Duration::from_secs(12));
/// ```
#[macro_export]
macro_rules! log_job_finished {
    ($job_id:expr, $status:expr, $duration:expr) => {
        tracing::info!(
            job_id = %$job_id,
            status = %$status,
            duration_ms = $duration.as_millis() as u64,
            "Export job finished"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use framequeue::log_error_with_context;
/// use framequeue::domain::FramequeueError;
///
/// let error = FramequeueError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use framequeue::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Encoder exited with status 1");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying export job"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::{ExportFormat, FramequeueError, JobId, JobStatus};
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        let job_id = JobId::generate();
        log_job_started!(&job_id, ExportFormat::Mp4H264, 1);
        log_job_finished!(&job_id, JobStatus::Failed, Duration::from_millis(5));
        log_retry_attempt!(1, 3, "boom");
        log_error_with_context!(FramequeueError::Other("x".into()), "test");
    }
}
