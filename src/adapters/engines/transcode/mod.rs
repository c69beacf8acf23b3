//! ffmpeg transcode engine
//!
//! Builds an argument list from the job's preset, runs ffmpeg as a child
//! process, and turns the `time=` markers on stderr into progress using
//! `metadata.duration` (seconds). The child is killed if the job is cancelled
//! or the engine future is dropped.

pub mod command;
pub mod progress;

use super::traits::{ExportEngine, JobContext};
use crate::config::TranscodeConfig;
use crate::domain::{EngineError, ExportFormat, Job, Preset};
use async_trait::async_trait;
use progress::{parse_elapsed_secs, percent_of, DiagnosticTail, LineSplitter};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

static SUPPORTED: [ExportFormat; 9] = [
    ExportFormat::Mp4H264,
    ExportFormat::Mp4H265,
    ExportFormat::MovProres,
    ExportFormat::AviUncompressed,
    ExportFormat::MkvH264,
    ExportFormat::WebmVp9,
    ExportFormat::GifAnimated,
    ExportFormat::Mp3Audio,
    ExportFormat::WavAudio,
];

/// Transcode engine backed by an external ffmpeg binary
#[derive(Debug, Clone)]
pub struct TranscodeEngine {
    config: TranscodeConfig,
}

impl TranscodeEngine {
    pub fn new(config: TranscodeConfig) -> Self {
        Self { config }
    }

    async fn run(&self, job: &Job, ctx: &JobContext) -> Result<(), EngineError> {
        let binary = command::resolve_binary(&self.config)?;
        let input = command::input_file(job)?;
        let args = command::build_args(&job.preset, &input, &job.output_path);
        let duration = job.source_duration_secs();

        if let Some(parent) = job.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tracing::debug!(
            job_id = %job.id,
            binary = %binary.display(),
            args = ?args,
            "Spawning ffmpeg"
        );

        let mut child = Command::new(&binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Spawn(format!("{}: {}", binary.display(), e)))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::Spawn("ffmpeg stderr was not captured".to_string()))?;

        let mut tail = DiagnosticTail::new(self.config.diagnostic_tail_lines);

        let outcome = tokio::select! {
            result = async {
                read_diagnostics(stderr, &mut tail, |elapsed| {
                    if let Some(percent) = duration.and_then(|d| percent_of(elapsed, d)) {
                        ctx.report_progress(percent);
                    }
                })
                .await?;
                child.wait().await
            } => Some(result),
            _ = ctx.cancelled() => None,
        };

        match outcome {
            Some(status) => check_status(status?, &tail),
            None => {
                tracing::info!(job_id = %job.id, "Cancelling ffmpeg process");
                if let Err(e) = child.kill().await {
                    tracing::warn!(job_id = %job.id, error = %e, "Failed to kill ffmpeg process");
                }
                Err(EngineError::Cancelled)
            }
        }
    }
}

/// Drain stderr, feeding elapsed-time markers to `on_elapsed`
async fn read_diagnostics<R, F>(
    mut stream: R,
    tail: &mut DiagnosticTail,
    mut on_elapsed: F,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    F: FnMut(f64),
{
    let mut splitter = LineSplitter::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        for line in splitter.push(&buf[..n]) {
            if let Some(elapsed) = parse_elapsed_secs(&line) {
                on_elapsed(elapsed);
            }
            tail.push(line);
        }
    }

    if let Some(line) = splitter.finish() {
        if let Some(elapsed) = parse_elapsed_secs(&line) {
            on_elapsed(elapsed);
        }
        tail.push(line);
    }
    Ok(())
}

fn check_status(status: ExitStatus, tail: &DiagnosticTail) -> Result<(), EngineError> {
    if status.success() {
        Ok(())
    } else {
        Err(EngineError::ProcessFailed {
            status: status.to_string(),
            diagnostics: tail.render(),
        })
    }
}

#[async_trait]
impl ExportEngine for TranscodeEngine {
    fn name(&self) -> &'static str {
        "transcode"
    }

    fn supports(&self) -> &[ExportFormat] {
        &SUPPORTED
    }

    fn validate_preset(&self, preset: &Preset) -> Result<(), EngineError> {
        if !SUPPORTED.contains(&preset.format) {
            return Err(EngineError::InvalidJob(format!(
                "transcode engine cannot produce {}",
                preset.format
            )));
        }
        if let Some(hint) = &preset.hw_acceleration {
            if command::HwAccel::from_hint(hint).is_none() {
                return Err(EngineError::InvalidJob(format!(
                    "unknown hardware acceleration '{hint}'; expected cuda, nvenc, qsv or videotoolbox"
                )));
            }
        }
        if !preset.fps.is_finite() || preset.fps < 0.0 {
            return Err(EngineError::InvalidJob(format!(
                "invalid frame rate {}",
                preset.fps
            )));
        }
        Ok(())
    }

    async fn export(&self, job: &Job, ctx: &JobContext) -> Result<(), EngineError> {
        self.run(job, ctx).await
    }
}
