//! Domain error types
//!
//! This module defines the error hierarchy for framequeue.
//! All errors are domain-specific and don't expose third-party types.

use crate::domain::preset::ExportFormat;
use thiserror::Error;

/// Main framequeue error type
///
/// This is the primary error type used throughout the library. Pre-flight
/// failures (unknown preset, unsupported format) surface through it
/// synchronously; execution failures travel as [`EngineError`] and end up on
/// the job record instead.
#[derive(Debug, Error)]
pub enum FramequeueError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A submission referenced a preset id the catalog does not hold
    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Engine-related errors
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scheduler lifecycle errors
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Export engine errors
///
/// Errors produced while an engine executes a single job. The scheduler turns
/// these into the job's `error_message` and decides whether to retry.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The encoder binary could not be located
    #[error("Encoder binary not found: {0}")]
    BinaryNotFound(String),

    /// The encoder process could not be started
    #[error("Failed to start encoder process: {0}")]
    Spawn(String),

    /// The encoder process exited unsuccessfully
    #[error("Encoder exited with {status}: {diagnostics}")]
    ProcessFailed { status: String, diagnostics: String },

    /// The job lacks something the engine needs (input file, draft config, ...)
    #[error("Invalid job: {0}")]
    InvalidJob(String),

    /// No engine is registered for the job's format
    #[error("no engine available for format: {0}")]
    NoEngine(ExportFormat),

    /// I/O failure while producing the artifact
    #[error("I/O error: {0}")]
    Io(String),

    /// Failure encoding the output document
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The job was cancelled while the engine was running
    #[error("Export cancelled")]
    Cancelled,

    /// The engine panicked
    #[error("Engine panicked: {0}")]
    Panicked(String),

    /// Any other engine failure
    #[error("{0}")]
    Failed(String),
}

impl EngineError {
    /// Whether another attempt could plausibly succeed
    ///
    /// Missing engines, malformed jobs and cancellation are permanent; every
    /// other failure is treated as transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            EngineError::NoEngine(_) | EngineError::InvalidJob(_) | EngineError::Cancelled
        )
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for FramequeueError {
    fn from(err: std::io::Error) -> Self {
        FramequeueError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FramequeueError {
    fn from(err: serde_json::Error) -> Self {
        FramequeueError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FramequeueError {
    fn from(err: toml::de::Error) -> Self {
        FramequeueError::Configuration(format!("TOML parse error: {err}"))
    }
}
