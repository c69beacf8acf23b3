//! Configuration management for framequeue.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! framequeue uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FRAMEQUEUE_*` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use framequeue::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("framequeue.toml")?;
//!
//! println!("Workers: {}", config.scheduler.max_concurrent_jobs);
//! println!("Attempts per job: {}", config.scheduler.max_retries);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`SchedulerConfig`] - Concurrency, retry and shutdown settings
//! - [`PresetsConfig`] - User preset file
//! - [`EnginesConfig`] - Transcode and draft engine settings
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [scheduler]
//! max_concurrent_jobs = 2
//! max_retries = 3
//!
//! [presets]
//! file = "${HOME}/.config/framequeue/presets.json"
//!
//! [engines.transcode]
//! ffmpeg_path = "/usr/bin/ffmpeg"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{default_config, load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, DraftConfig, EnginesConfig, FramequeueConfig, LoggingConfig, PresetsConfig,
    SchedulerConfig, TranscodeConfig,
};
