//! Draft-generation engine
//!
//! Writes an editing-draft JSON document built from `metadata.draft_config`.
//! Runs entirely in process; the scheduler treats the config as an opaque
//! payload.

use super::traits::{ExportEngine, JobContext};
use crate::config::DraftConfig as DraftEngineConfig;
use crate::domain::{EngineError, ExportFormat, Job};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

static SUPPORTED: [ExportFormat; 1] = [ExportFormat::JianyingDraft];

/// Draft project description read from `metadata.draft_config`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftConfig {
    pub project_name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// `[width, height]`
    #[serde(default = "default_resolution")]
    pub resolution: (u32, u32),
    #[serde(default = "default_audio_sample_rate")]
    pub audio_sample_rate: u32,
    #[serde(default)]
    pub tracks: Vec<Value>,
    #[serde(default)]
    pub materials: Vec<Value>,
    #[serde(default)]
    pub effects: Vec<Value>,
    #[serde(default)]
    pub text_overlays: Vec<Value>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_fps() -> f64 {
    30.0
}

fn default_resolution() -> (u32, u32) {
    (1920, 1080)
}

fn default_audio_sample_rate() -> u32 {
    48_000
}

impl DraftConfig {
    /// Read the draft config from a job's metadata
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidJob`] when the key is missing, malformed, or
    /// names an empty project.
    pub fn from_job(job: &Job) -> Result<Self, EngineError> {
        let raw = job.metadata.get("draft_config").ok_or_else(|| {
            EngineError::InvalidJob("metadata.draft_config is required for draft export".into())
        })?;

        let config: DraftConfig = serde_json::from_value(raw.clone())
            .map_err(|e| EngineError::InvalidJob(format!("invalid draft_config: {e}")))?;

        if config.project_name.trim().is_empty() {
            return Err(EngineError::InvalidJob(
                "draft_config.project_name cannot be empty".into(),
            ));
        }
        Ok(config)
    }

    /// Build the draft document
    pub fn to_document(&self, generator: &str) -> Value {
        json!({
            "version": self.version,
            "project_name": self.project_name,
            "settings": {
                "fps": self.fps,
                "resolution": {
                    "width": self.resolution.0,
                    "height": self.resolution.1,
                },
                "audio_sample_rate": self.audio_sample_rate,
            },
            "tracks": self.tracks,
            "materials": self.materials,
            "effects": self.effects,
            "text_overlays": self.text_overlays,
            "metadata": {
                "created_by": generator,
                "created_at": Utc::now().to_rfc3339(),
            },
        })
    }
}

/// Engine producing `jianying_draft` documents
#[derive(Debug, Clone, Default)]
pub struct DraftEngine {
    config: DraftEngineConfig,
}

impl DraftEngine {
    pub fn new(config: DraftEngineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ExportEngine for DraftEngine {
    fn name(&self) -> &'static str {
        "draft"
    }

    fn supports(&self) -> &[ExportFormat] {
        &SUPPORTED
    }

    async fn export(&self, job: &Job, ctx: &JobContext) -> Result<(), EngineError> {
        let draft = DraftConfig::from_job(job)?;
        ctx.report_progress(10.0);

        let document = draft.to_document(&self.config.generator);
        let body = serde_json::to_vec_pretty(&document)?;
        ctx.report_progress(60.0);

        if ctx.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        if let Some(parent) = job.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&job.output_path, body).await.map_err(|e| {
            EngineError::Io(format!("{}: {}", job.output_path.display(), e))
        })?;

        tracing::debug!(
            job_id = %job.id,
            project = %draft.project_name,
            path = %job.output_path.display(),
            "Draft written"
        );
        ctx.report_progress(100.0);
        Ok(())
    }
}
