//! Export request type
//!
//! The caller-facing description of one export, before a preset has been
//! resolved and a job created. Batch files are JSON arrays of these.

use crate::domain::JobMetadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// One export to submit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub project_id: String,
    pub output_path: PathBuf,
    pub preset_id: String,
    #[serde(default)]
    pub metadata: JobMetadata,
    #[serde(default)]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_secs: Option<f64>,
}

impl ExportRequest {
    pub fn new(
        project_id: impl Into<String>,
        output_path: impl Into<PathBuf>,
        preset_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            output_path: output_path.into(),
            preset_id: preset_id.into(),
            metadata: JobMetadata::new(),
            priority: 0,
            estimated_duration_secs: None,
        }
    }

    pub fn with_metadata(mut self, metadata: JobMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set a single metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
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
}
