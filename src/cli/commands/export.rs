//! Export command implementation
//!
//! This module implements the `export` command: submit one export (or a batch
//! file of requests), stream progress until every job is finished, and print
//! a summary.

use crate::cli::load_config_or_default;
use crate::core::export::{ExportNotification, ExportRequest, ExportSummary, ExportSystem};
use crate::domain::{JobId, JobMetadata};
use anyhow::{anyhow, Context};
use clap::Args;
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Source project reference
    #[arg(long, default_value = "default")]
    pub project: String,

    /// Input media file (transcode presets)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file
    #[arg(short, long, required_unless_present = "batch")]
    pub output: Option<PathBuf>,

    /// Preset id
    #[arg(short, long, default_value = "youtube_1080p")]
    pub preset: String,

    /// Job priority; higher runs sooner
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub priority: i32,

    /// Source duration in seconds, used for progress reporting
    #[arg(long)]
    pub duration: Option<f64>,

    /// Extra job metadata as a JSON object
    #[arg(long, value_name = "JSON")]
    pub metadata: Option<String>,

    /// Draft project description (JSON file) for draft presets
    #[arg(long, value_name = "FILE")]
    pub draft_config: Option<PathBuf>,

    /// JSON file holding an array of export requests
    #[arg(long, value_name = "FILE", conflicts_with_all = ["input", "output", "draft_config"])]
    pub batch: Option<PathBuf>,

    /// Override the number of concurrent jobs
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Some(max) = self.max_concurrent {
            tracing::info!(max_concurrent_jobs = max, "Overriding concurrency from CLI");
            config.scheduler.max_concurrent_jobs = max;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let requests = match self.requests() {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Invalid export request: {e:#}");
                return Ok(2);
            }
        };

        let system = match ExportSystem::from_config(&config) {
            Ok(s) => s,
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to initialize export system");
                eprintln!("Failed to initialize export: {e}");
                return Ok(2);
            }
        };

        let started = Instant::now();
        let mut events = system.subscribe();
        let mut summary = ExportSummary::new();
        let mut submitted = Vec::with_capacity(requests.len());

        for request in requests {
            let preset_id = request.preset_id.clone();
            match system.submit_request(request) {
                Ok(id) => submitted.push(id),
                Err(e) => {
                    eprintln!("❌ Rejected ({preset_id}): {e}");
                    summary.record_rejection(e.to_string());
                }
            }
        }

        if !submitted.is_empty() {
            println!("🚀 Submitted {} export job(s)", submitted.len());
        }

        let mut outstanding: HashSet<JobId> = submitted.iter().cloned().collect();
        let mut signal_open = true;
        let mut interrupted = false;

        while !outstanding.is_empty() {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    self.print_event(&event);
                    if event.is_terminal() {
                        if let Some(id) = event.job_id() {
                            outstanding.remove(id);
                        }
                    }
                }
                changed = shutdown_signal.changed(), if signal_open => {
                    if changed.is_err() {
                        signal_open = false;
                    } else if *shutdown_signal.borrow() {
                        interrupted = true;
                        break;
                    }
                }
            }
        }

        if interrupted {
            println!("\n⚠️  Cancelling running exports...");
            for job in system.active_jobs() {
                if outstanding.contains(&job.id) {
                    system.cancel(job.id.as_str());
                }
            }
        }

        let report = system.shutdown().await;
        if !report.drained {
            eprintln!(
                "⚠️  Shutdown timed out with {} job(s) still running",
                report.in_flight
            );
        }

        for id in &submitted {
            if let Some(job) = system.job(id.as_str()) {
                summary.record_job(&job);
            }
        }
        let summary = summary.with_duration(started.elapsed());
        summary.log_summary();
        Self::print_summary(&summary);

        if interrupted {
            return Ok(130);
        }
        Ok(if summary.is_successful() { 0 } else { 1 })
    }

    /// Requests described by the arguments
    fn requests(&self) -> anyhow::Result<Vec<ExportRequest>> {
        if let Some(batch) = &self.batch {
            let text = std::fs::read_to_string(batch)
                .with_context(|| format!("Failed to read batch file {}", batch.display()))?;
            let requests: Vec<ExportRequest> = serde_json::from_str(&text)
                .with_context(|| format!("Batch file {} is not a JSON array of requests", batch.display()))?;
            return Ok(requests);
        }

        let output = self
            .output
            .clone()
            .ok_or_else(|| anyhow!("--output is required unless --batch is given"))?;

        let mut metadata = match &self.metadata {
            Some(json) => serde_json::from_str::<JobMetadata>(json)
                .context("--metadata must be a JSON object")?,
            None => JobMetadata::new(),
        };

        if let Some(input) = &self.input {
            metadata.insert(
                "input_file".to_string(),
                Value::String(input.display().to_string()),
            );
        }
        if let Some(duration) = self.duration {
            metadata.insert("duration".to_string(), Value::from(duration));
        }
        if let Some(path) = &self.draft_config {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read draft config {}", path.display()))?;
            let draft: Value = serde_json::from_str(&text)
                .with_context(|| format!("Draft config {} is not valid JSON", path.display()))?;
            metadata.insert("draft_config".to_string(), draft);
        }

        let mut request = ExportRequest::new(self.project.clone(), output, self.preset.clone())
            .with_metadata(metadata)
            .with_priority(self.priority);
        if let Some(duration) = self.duration {
            request = request.with_estimated_duration(duration);
        }
        Ok(vec![request])
    }

    fn print_event(&self, event: &ExportNotification) {
        if self.json {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{line}");
            }
            return;
        }

        match event {
            ExportNotification::Started { job_id, attempt } if *attempt > 1 => {
                println!("🔁 {job_id} retrying (attempt {attempt})");
            }
            ExportNotification::Started { job_id, .. } => println!("▶️  {job_id} started"),
            ExportNotification::Progress { job_id, percent } => {
                println!("   {job_id} {percent:>5.1}%");
            }
            ExportNotification::Completed {
                job_id,
                output_path,
            } => println!("✅ {job_id} -> {}", output_path.display()),
            ExportNotification::Failed { job_id, error } => println!("❌ {job_id} failed: {error}"),
            ExportNotification::Cancelled { job_id } => println!("⏹️  {job_id} cancelled"),
            ExportNotification::Queued { .. } | ExportNotification::QueueChanged => {}
        }
    }

    fn print_summary(summary: &ExportSummary) {
        println!();
        println!("📊 Export Summary:");
        println!("  Requests: {}", summary.total_requests);
        println!("  Completed: {}", summary.completed);
        println!("  Failed: {}", summary.failed);
        println!("  Cancelled: {}", summary.cancelled);
        println!("  Rejected: {}", summary.rejected);
        if summary.unfinished > 0 {
            println!("  Unfinished: {}", summary.unfinished);
        }
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!("  Success Rate: {:.2}%", summary.success_rate());

        if !summary.errors.is_empty() {
            println!();
            println!("  ⚠️  Errors:");
            for error in summary.errors.iter().take(10) {
                match &error.job_id {
                    Some(id) => println!("    - {id}: {}", error.message),
                    None => println!("    - {}", error.message),
                }
            }
            if summary.errors.len() > 10 {
                println!("    ... and {} more", summary.errors.len() - 10);
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use tempfile::TempDir;

    fn args(argv: &[&str]) -> ExportArgs {
        let mut full = vec!["framequeue", "export"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Export(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_single_request_metadata() {
        let args = args(&[
            "--input",
            "/media/in.mov",
            "--output",
            "/media/out.mp4",
            "--duration",
            "42",
            "--priority",
            "-2",
            "--metadata",
            r#"{"scene": 3}"#,
        ]);
        let requests = args.requests().unwrap();
        assert_eq!(requests.len(), 1);

        let request = &requests[0];
        assert_eq!(request.preset_id, "youtube_1080p");
        assert_eq!(request.priority, -2);
        assert_eq!(request.metadata["input_file"], "/media/in.mov");
        assert_eq!(request.metadata["duration"], 42.0);
        assert_eq!(request.metadata["scene"], 3);
        assert_eq!(request.estimated_duration_secs, Some(42.0));
    }

    #[test]
    fn test_bad_metadata_is_rejected() {
        let args = args(&["--output", "/tmp/out.mp4", "--metadata", "[1,2]"]);
        assert!(args.requests().is_err());
    }

    #[test]
    fn test_batch_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(
            &path,
            r#"[
                {"project_id": "a", "output_path": "/tmp/a.mp4", "preset_id": "youtube_1080p"},
                {"project_id": "b", "output_path": "/tmp/b.json", "preset_id": "jianying_draft", "priority": 5}
            ]"#,
        )
        .unwrap();

        let args = args(&["--batch", path.to_str().unwrap()]);
        let requests = args.requests().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].priority, 5);
    }

    #[test]
    fn test_draft_config_file_lands_in_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("draft.json");
        std::fs::write(&path, r#"{"project_name": "Trailer"}"#).unwrap();

        let args = args(&[
            "--output",
            "/tmp/draft.json",
            "--preset",
            "jianying_draft",
            "--draft-config",
            path.to_str().unwrap(),
        ]);
        let requests = args.requests().unwrap();
        assert_eq!(requests[0].metadata["draft_config"]["project_name"], "Trailer");
    }
}
