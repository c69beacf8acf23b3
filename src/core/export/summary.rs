//! Export summary and reporting
//!
//! Tallies the outcome of a set of submitted exports for the command line.

use crate::domain::{Job, JobId, JobStatus};
use std::time::Duration;

/// Summary of an export run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Requests handed to the system, accepted or not
    pub total_requests: usize,

    /// Requests rejected before a job was created
    pub rejected: usize,

    /// Jobs that completed
    pub completed: usize,

    /// Jobs that failed after their last attempt
    pub failed: usize,

    /// Jobs that were cancelled
    pub cancelled: usize,

    /// Jobs that never reached a terminal state
    pub unfinished: usize,

    /// Duration of the run
    pub duration: Duration,

    /// Errors encountered during the run
    pub errors: Vec<ExportError>,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new() -> Self {
        Self {
            total_requests: 0,
            rejected: 0,
            completed: 0,
            failed: 0,
            cancelled: 0,
            unfinished: 0,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Count a request that never became a job
    pub fn record_rejection(&mut self, message: impl Into<String>) {
        self.total_requests += 1;
        self.rejected += 1;
        self.add_error(ExportError::new(ExportErrorType::Submission, message.into()));
    }

    /// Count a job by its final state
    pub fn record_job(&mut self, job: &Job) {
        self.total_requests += 1;
        match job.status {
            JobStatus::Completed => self.completed += 1,
            JobStatus::Cancelled => self.cancelled += 1,
            JobStatus::Failed => {
                self.failed += 1;
                self.add_error(
                    ExportError::new(
                        ExportErrorType::Execution,
                        job.error_message.clone().unwrap_or_default(),
                    )
                    .with_job(job.id.clone()),
                );
            }
            _ => self.unfinished += 1,
        }
    }

    /// Jobs that got past submission
    pub fn accepted(&self) -> usize {
        self.total_requests - self.rejected
    }

    /// Check if the run was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.failed == 0 && self.rejected == 0 && self.errors.is_empty()
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 100.0;
        }
        (self.completed as f64 / self.total_requests as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total_requests,
            completed = self.completed,
            failed = self.failed,
            cancelled = self.cancelled,
            rejected = self.rejected,
            unfinished = self.unfinished,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export run finished"
        );

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Export run had errors");
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    job_id = error.job_id.as_ref().map(|id| id.as_str()),
                    message = %error.message,
                    "Export error"
                );
            }
        }
    }
}

impl Default for ExportSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of export error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportErrorType {
    /// Rejected at submission (unknown preset, invalid preset, ...)
    Submission,
    /// Failed while running
    Execution,
}

/// Export error with context
#[derive(Debug, Clone)]
pub struct ExportError {
    pub error_type: ExportErrorType,
    pub message: String,
    /// Job the error belongs to, if one was created
    pub job_id: Option<JobId>,
}

impl ExportError {
    pub fn new(error_type: ExportErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            job_id: None,
        }
    }

    pub fn with_job(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }
}
