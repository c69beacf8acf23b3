//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "framequeue.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing framequeue configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Make sure ffmpeg is installed, or set engines.transcode.ffmpeg_path");
                println!("  3. Validate configuration: framequeue validate-config");
                println!("  4. Run an export: framequeue export --input in.mov --output out.mp4");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Sample configuration with every option and its default
    pub fn sample_config() -> &'static str {
        r#"# framequeue configuration
#
# Every setting is optional; the values below are the defaults.
# ${VAR} placeholders are replaced from the environment, and FRAMEQUEUE_*
# environment variables override individual keys.

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

[scheduler]
# Jobs running at the same time (1-64)
max_concurrent_jobs = 2

# Engine attempts per job, including the first (1-10)
max_retries = 3

# Backoff between attempts: initial * multiplier^(attempt - 1), capped
retry_initial_delay_ms = 1000
retry_backoff_multiplier = 2.0
retry_max_delay_ms = 60000

# Seconds to wait for running jobs on shutdown
shutdown_timeout_secs = 5

# Completed jobs older than this are purged from history
history_max_age_secs = 86400

[presets]
# User presets merged over the built-ins
# file = "presets.json"

[engines.transcode]
# Explicit encoder binary; otherwise PATH, then search_paths
# ffmpeg_path = "/usr/bin/ffmpeg"
search_paths = ["/usr/local/bin/ffmpeg", "/opt/homebrew/bin/ffmpeg", "/opt/local/bin/ffmpeg"]

# Encoder output lines kept for failure messages
diagnostic_tail_lines = 20

[engines.draft]
# Recorded as created_by in generated drafts
generator = "framequeue"

[logging]
# JSON log files in addition to the console
local_enabled = false
local_path = "./logs"
# daily | hourly | never
local_rotation = "daily"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;
    use tempfile::TempDir;

    #[test]
    fn test_sample_config_is_loadable() {
        let config = load_config_from_str(InitArgs::sample_config()).unwrap();
        assert_eq!(config.scheduler.max_concurrent_jobs, 2);
        assert_eq!(config.engines.transcode.search_paths.len(), 3);
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("framequeue.toml");
        std::fs::write(&output, "# existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "# existing");

        let args = InitArgs {
            force: true,
            ..args
        };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(std::fs::read_to_string(&output)
            .unwrap()
            .contains("[scheduler]"));
    }
}
