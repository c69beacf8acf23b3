//! Configuration schema types
//!
//! This module defines the configuration structure for framequeue. Every
//! section carries defaults, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main framequeue configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FramequeueConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Scheduler concurrency and retry settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Preset file settings
    #[serde(default)]
    pub presets: PresetsConfig,

    /// Export engine settings
    #[serde(default)]
    pub engines: EnginesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FramequeueConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.scheduler.validate()?;
        self.engines.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of jobs that may execute at once
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Total engine attempts per job, including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the second attempt in milliseconds
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,

    /// Backoff multiplier applied per further attempt
    #[serde(default = "default_retry_backoff_multiplier")]
    pub retry_backoff_multiplier: f64,

    /// Upper bound on a single backoff delay in milliseconds
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,

    /// Graceful shutdown timeout in seconds
    ///
    /// The maximum time to wait for in-flight jobs to finish before
    /// returning from shutdown.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Age after which completed history entries are purged
    #[serde(default = "default_history_max_age_secs")]
    pub history_max_age_secs: u64,
}

impl SchedulerConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=64).contains(&self.max_concurrent_jobs) {
            return Err(format!(
                "scheduler.max_concurrent_jobs must be between 1 and 64, got {}",
                self.max_concurrent_jobs
            ));
        }

        if !(1..=10).contains(&self.max_retries) {
            return Err(format!(
                "scheduler.max_retries must be between 1 and 10, got {}",
                self.max_retries
            ));
        }

        if !self.retry_backoff_multiplier.is_finite() || self.retry_backoff_multiplier < 1.0 {
            return Err(format!(
                "scheduler.retry_backoff_multiplier must be >= 1.0, got {}",
                self.retry_backoff_multiplier
            ));
        }

        if self.retry_max_delay_ms < self.retry_initial_delay_ms {
            return Err(format!(
                "scheduler.retry_max_delay_ms ({}) must be >= retry_initial_delay_ms ({})",
                self.retry_max_delay_ms, self.retry_initial_delay_ms
            ));
        }

        Ok(())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn history_max_age(&self) -> Duration {
        Duration::from_secs(self.history_max_age_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            max_retries: default_max_retries(),
            retry_initial_delay_ms: default_retry_initial_delay_ms(),
            retry_backoff_multiplier: default_retry_backoff_multiplier(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            history_max_age_secs: default_history_max_age_secs(),
        }
    }
}

/// Preset file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetsConfig {
    /// User preset file merged over the built-in presets
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Export engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnginesConfig {
    #[serde(default)]
    pub transcode: TranscodeConfig,

    #[serde(default)]
    pub draft: DraftConfig,
}

impl EnginesConfig {
    fn validate(&self) -> Result<(), String> {
        self.transcode.validate()?;
        self.draft.validate()?;
        Ok(())
    }
}

/// Transcode (ffmpeg) engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeConfig {
    /// Explicit encoder binary; looked up on `PATH` when unset
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Fallback locations tried after `PATH`
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<PathBuf>,

    /// Number of trailing stderr lines kept for failure messages
    #[serde(default = "default_diagnostic_tail_lines")]
    pub diagnostic_tail_lines: usize,
}

impl TranscodeConfig {
    fn validate(&self) -> Result<(), String> {
        if self.diagnostic_tail_lines == 0 || self.diagnostic_tail_lines > 1000 {
            return Err(format!(
                "engines.transcode.diagnostic_tail_lines must be between 1 and 1000, got {}",
                self.diagnostic_tail_lines
            ));
        }
        Ok(())
    }
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            search_paths: default_search_paths(),
            diagnostic_tail_lines: default_diagnostic_tail_lines(),
        }
    }
}

/// Draft-generation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftConfig {
    /// Value written to `metadata.created_by` in generated drafts
    #[serde(default = "default_generator")]
    pub generator: String,
}

impl DraftConfig {
    fn validate(&self) -> Result<(), String> {
        if self.generator.trim().is_empty() {
            return Err("engines.draft.generator cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            generator: default_generator(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_concurrent_jobs() -> usize {
    2
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_initial_delay_ms() -> u64 {
    1000
}

fn default_retry_backoff_multiplier() -> f64 {
    2.0
}

fn default_retry_max_delay_ms() -> u64 {
    60_000
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

fn default_history_max_age_secs() -> u64 {
    86_400
}

fn default_search_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/local/bin/ffmpeg"),
        PathBuf::from("/opt/local/bin/ffmpeg"),
    ]
}

fn default_diagnostic_tail_lines() -> usize {
    20
}

fn default_generator() -> String {
    "framequeue".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig {
            log_level: "info".to_string(),
        };

        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scheduler_config_validation() {
        let mut config = SchedulerConfig::default();
        assert!(config.validate().is_ok());

        config.max_concurrent_jobs = 0;
        assert!(config.validate().is_err());

        config.max_concurrent_jobs = 65;
        assert!(config.validate().is_err());

        config.max_concurrent_jobs = 4;
        config.max_retries = 0;
        assert!(config.validate().is_err());

        config.max_retries = 11;
        assert!(config.validate().is_err());

        config.max_retries = 3;
        config.retry_backoff_multiplier = 0.5;
        assert!(config.validate().is_err());

        config.retry_backoff_multiplier = 2.0;
        config.retry_max_delay_ms = 10;
        let err = config.validate().unwrap_err();
        assert!(err.contains("retry_max_delay_ms"));
    }

    #[test]
    fn test_transcode_config_validation() {
        let mut config = TranscodeConfig::default();
        assert!(config.validate().is_ok());

        config.diagnostic_tail_lines = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_draft_config_validation() {
        let config = DraftConfig {
            generator: "  ".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert_eq!(config.local_path, "./logs");
        assert_eq!(config.local_rotation, "daily");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_logging_config_rejects_unknown_rotation() {
        let config = LoggingConfig {
            local_rotation: "weekly".to_string(),
            ..LoggingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_document_is_valid() {
        let config: FramequeueConfig = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.scheduler.max_concurrent_jobs, 2);
        assert_eq!(config.scheduler.max_retries, 3);
        assert!(config.presets.file.is_none());
        assert_eq!(config.engines.draft.generator, "framequeue");
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_max_concurrent_jobs(), 2);
        assert_eq!(default_max_retries(), 3);
        assert_eq!(default_retry_initial_delay_ms(), 1000);
        assert_eq!(default_retry_backoff_multiplier(), 2.0);
        assert_eq!(default_shutdown_timeout_secs(), 5);
        assert_eq!(default_diagnostic_tail_lines(), 20);
        assert_eq!(default_search_paths().len(), 2);
    }
}
