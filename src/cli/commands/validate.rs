//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the framequeue configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let scheduler = &config.scheduler;
        let transcode = &config.engines.transcode;

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Max Concurrent Jobs: {}", scheduler.max_concurrent_jobs);
        println!("  Attempts Per Job: {}", scheduler.max_retries);
        println!(
            "  Retry Backoff: {}ms x{} (max {}ms)",
            scheduler.retry_initial_delay_ms,
            scheduler.retry_backoff_multiplier,
            scheduler.retry_max_delay_ms
        );
        println!("  Shutdown Timeout: {}s", scheduler.shutdown_timeout_secs);
        println!(
            "  Preset File: {}",
            config
                .presets
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-ins only)".to_string())
        );
        println!(
            "  ffmpeg: {}",
            transcode
                .ffmpeg_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(search PATH)".to_string())
        );
        println!("  Draft Generator: {}", config.engines.draft.generator);
        if config.logging.local_enabled {
            println!(
                "  Log Files: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_valid_and_invalid_files() {
        let dir = TempDir::new().unwrap();

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[scheduler]\nmax_concurrent_jobs = 4\n").unwrap();
        let code = ValidateArgs {}.execute(good.to_str().unwrap()).await.unwrap();
        assert_eq!(code, 0);

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[scheduler]\nmax_concurrent_jobs = 0\n").unwrap();
        let code = ValidateArgs {}.execute(bad.to_str().unwrap()).await.unwrap();
        assert_eq!(code, 2);
    }
}
