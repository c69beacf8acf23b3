//! Export job model
//!
//! A job is one request to produce one output artifact. Its identity, preset
//! snapshot and metadata are fixed at submission; status, progress and
//! timestamps move as the scheduler drives it through its lifecycle.

use crate::domain::ids::JobId;
use crate::domain::preset::Preset;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Caller-supplied context carried with a job and echoed back in events
pub type JobMetadata = Map<String, Value>;

/// Job lifecycle status
///
/// `Pending -> Queued -> Processing -> {Completed | Failed | Cancelled}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created but not yet handed to the scheduler
    #[default]
    Pending,
    /// Waiting in the priority queue
    Queued,
    /// Occupying a worker slot
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Completed, failed and cancelled jobs never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Export job
///
/// # Examples
///
/// ```
/// use framequeue::core::catalog::PresetCatalog;
/// use framequeue::domain::job::{Job, JobStatus};
///
/// let catalog = PresetCatalog::new();
/// let preset = catalog.get("youtube_1080p").unwrap();
///
/// let mut job = Job::new("project-1", "/tmp/out.mp4", preset).with_priority(5);
/// assert_eq!(job.status, JobStatus::Pending);
///
/// job.mark_queued();
/// job.mark_processing();
/// job.update_progress(40.0);
/// job.update_progress(25.0); // never goes backwards
/// assert_eq!(job.progress, 40.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Source project reference
    pub project_id: String,
    pub output_path: PathBuf,
    /// Snapshot of the preset at submission time
    pub preset: Preset,
    pub status: JobStatus,
    /// Percentage in `[0, 100]`
    pub progress: f64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub metadata: JobMetadata,
    /// Higher runs sooner
    pub priority: i32,
    /// Informational only
    pub estimated_duration_secs: Option<f64>,
    /// Engine attempts made so far
    pub attempts: u32,
}

impl Job {
    /// Creates a pending job with a freshly generated id
    pub fn new(project_id: impl Into<String>, output_path: impl Into<PathBuf>, preset: Preset) -> Self {
        Self {
            id: JobId::generate(),
            project_id: project_id.into(),
            output_path: output_path.into(),
            preset,
            status: JobStatus::Pending,
            progress: 0.0,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error_message: None,
            metadata: JobMetadata::new(),
            priority: 0,
            estimated_duration_secs: None,
            attempts: 0,
        }
    }

    pub fn with_metadata(mut self, metadata: JobMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_estimated_duration(mut self, secs: f64) -> Self {
        self.estimated_duration_secs = Some(secs);
        self
    }

    /// Source media duration in seconds from `metadata.duration`
    ///
    /// Accepts a JSON number or a numeric string; anything else is treated as
    /// unknown.
    pub fn source_duration_secs(&self) -> Option<f64> {
        match self.metadata.get("duration")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|d| d.is_finite() && *d > 0.0)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Mark the job as accepted into the queue
    pub fn mark_queued(&mut self) {
        self.status = JobStatus::Queued;
        self.progress = 0.0;
    }

    /// Mark the start of an engine attempt
    ///
    /// Each attempt starts from zero progress and clears the previous
    /// attempt's error.
    pub fn mark_processing(&mut self) {
        self.status = JobStatus::Processing;
        self.started_at = Some(Utc::now());
        self.progress = 0.0;
        self.error_message = None;
        self.attempts += 1;
    }

    /// Raise progress, clamped to `[0, 100]`
    ///
    /// Returns the new value if progress moved forward. Ignored unless the job
    /// is processing.
    pub fn update_progress(&mut self, percent: f64) -> Option<f64> {
        if self.status != JobStatus::Processing || !percent.is_finite() {
            return None;
        }
        let percent = percent.clamp(0.0, 100.0);
        if percent > self.progress {
            self.progress = percent;
            Some(percent)
        } else {
            None
        }
    }

    /// Mark the job as completed successfully
    pub fn mark_completed(&mut self) {
        self.status = JobStatus::Completed;
        self.progress = 100.0;
        self.completed_at = Some(Utc::now());
        self.error_message = None;
    }

    /// Mark the job as failed for good
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.error_message = Some(error.into());
    }

    /// Mark the job as cancelled
    pub fn mark_cancelled(&mut self) {
        self.status = JobStatus::Cancelled;
        self.completed_at = Some(Utc::now());
    }

    /// Wall-clock time of the latest attempt, if it has finished
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::PresetId;
    use crate::domain::preset::{ExportFormat, ExportQuality, Resolution};

    fn preset() -> Preset {
        Preset::new(
            PresetId::new("p").unwrap(),
            "P",
            ExportFormat::Mp4H264,
            ExportQuality::High,
            Resolution(1920, 1080),
            8000,
            30.0,
            128,
        )
    }

    #[test]
    fn test_new_job_defaults() {
        let job = Job::new("project", "/tmp/out.mp4", preset());
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress, 0.0);
        assert_eq!(job.priority, 0);
        assert_eq!(job.attempts, 0);
        assert!(job.started_at.is_none());
        assert!(job.completed_at.is_none());
        assert!(job.error_message.is_none());
    }

    #[test]
    fn test_status_transitions() {
        let mut job = Job::new("project", "/tmp/out.mp4", preset());

        job.mark_queued();
        assert_eq!(job.status, JobStatus::Queued);

        job.mark_processing();
        assert_eq!(job.status, JobStatus::Processing);
        assert!(job.started_at.is_some());
        assert_eq!(job.attempts, 1);

        job.mark_completed();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.completed_at.is_some());
        assert!(job.is_terminal());
        assert!(job.elapsed().is_some());
    }

    #[test]
    fn test_progress_is_monotonic_and_clamped() {
        let mut job = Job::new("project", "/tmp/out.mp4", preset());
        assert_eq!(job.update_progress(10.0), None, "not processing yet");

        job.mark_processing();
        assert_eq!(job.update_progress(30.0), Some(30.0));
        assert_eq!(job.update_progress(20.0), None);
        assert_eq!(job.progress, 30.0);
        assert_eq!(job.update_progress(250.0), Some(100.0));
        assert_eq!(job.update_progress(f64::NAN), None);
    }

    #[test]
    fn test_retry_attempt_resets_progress() {
        let mut job = Job::new("project", "/tmp/out.mp4", preset());
        job.mark_processing();
        job.update_progress(80.0);
        job.error_message = Some("boom".to_string());

        job.mark_processing();
        assert_eq!(job.progress, 0.0);
        assert!(job.error_message.is_none());
        assert_eq!(job.attempts, 2);
    }

    #[test]
    fn test_failure_and_cancellation_are_terminal() {
        let mut failed = Job::new("project", "/tmp/out.mp4", preset());
        failed.mark_failed("encoder crashed");
        assert_eq!(failed.error_message.as_deref(), Some("encoder crashed"));
        assert!(failed.is_terminal());

        let mut cancelled = Job::new("project", "/tmp/out.mp4", preset());
        cancelled.mark_cancelled();
        assert!(cancelled.is_terminal());
        assert!(cancelled.completed_at.is_some());
    }

    #[test]
    fn test_source_duration_from_metadata() {
        let mut metadata = JobMetadata::new();
        metadata.insert("duration".to_string(), serde_json::json!(60.0));
        let job = Job::new("p", "/tmp/o.mp4", preset()).with_metadata(metadata.clone());
        assert_eq!(job.source_duration_secs(), Some(60.0));

        metadata.insert("duration".to_string(), serde_json::json!("12.5"));
        let job = Job::new("p", "/tmp/o.mp4", preset()).with_metadata(metadata.clone());
        assert_eq!(job.source_duration_secs(), Some(12.5));

        metadata.insert("duration".to_string(), serde_json::json!(0));
        let job = Job::new("p", "/tmp/o.mp4", preset()).with_metadata(metadata);
        assert_eq!(job.source_duration_secs(), None);
    }

    #[test]
    fn test_status_serialization() {
        let statuses = vec![
            (JobStatus::Pending, "\"pending\""),
            (JobStatus::Queued, "\"queued\""),
            (JobStatus::Processing, "\"processing\""),
            (JobStatus::Completed, "\"completed\""),
            (JobStatus::Failed, "\"failed\""),
            (JobStatus::Cancelled, "\"cancelled\""),
        ];

        for (status, expected_json) in statuses {
            assert_eq!(serde_json::to_string(&status).unwrap(), expected_json);
            assert_eq!(status.to_string(), expected_json.trim_matches('"'));
        }
    }
}
