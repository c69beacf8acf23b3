//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for framequeue using clap.

pub mod commands;

use crate::config::{default_config, load_config, FramequeueConfig};
use crate::domain::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

/// Framequeue - prioritized media export queue
#[derive(Parser, Debug)]
#[command(name = "framequeue")]
#[command(version, about, long_about = None)]
#[command(author = "Framequeue Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "framequeue.toml", env = "FRAMEQUEUE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FRAMEQUEUE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export one project, or a batch of requests
    Export(commands::export::ExportArgs),

    /// List, inspect and save presets
    Presets(commands::presets::PresetsArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Load `path`, or fall back to defaults when the file does not exist
///
/// Defaults still pass through environment overrides and validation.
pub fn load_config_or_default(path: &str) -> Result<FramequeueConfig> {
    if Path::new(path).exists() {
        load_config(path)
    } else {
        tracing::debug!(config_path = %path, "Configuration file not found, using defaults");
        default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["framequeue", "export", "--output", "/tmp/out.mp4"]);
        assert_eq!(cli.config, "framequeue.toml");
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["framequeue", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["framequeue", "--log-level", "debug", "presets", "list"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Presets(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["framequeue", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(ref args) if args.force));
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let config = load_config_or_default("/nonexistent/framequeue.toml").unwrap();
        assert_eq!(config.scheduler.max_concurrent_jobs, 2);
    }
}
