//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::FramequeueConfig;
use crate::domain::errors::FramequeueError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FramequeueConfig
/// 4. Applies environment variable overrides (FRAMEQUEUE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use framequeue::config::loader::load_config;
///
/// let config = load_config("framequeue.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FramequeueConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FramequeueError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FramequeueError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads configuration from TOML text
///
/// Same pipeline as [`load_config`] minus the file read.
pub fn load_config_from_str(contents: &str) -> Result<FramequeueConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: FramequeueConfig = toml::from_str(&contents)
        .map_err(|e| FramequeueError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;
    finish(config)
}

/// Built-in defaults with environment overrides applied
///
/// Used when no configuration file exists.
pub fn default_config() -> Result<FramequeueConfig> {
    let mut config = FramequeueConfig::default();
    apply_env_overrides(&mut config)?;
    finish(config)
}

fn finish(config: FramequeueConfig) -> Result<FramequeueConfig> {
    config.validate().map_err(|e| {
        FramequeueError::Configuration(format!("Configuration validation failed: {}", e))
    })?;
    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FramequeueError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        // Placeholders in comments are left alone
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(FramequeueError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        FramequeueError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using FRAMEQUEUE_* prefix
///
/// Environment variables follow the pattern: FRAMEQUEUE_<SECTION>_<KEY>
/// For example: FRAMEQUEUE_SCHEDULER_MAX_CONCURRENT_JOBS
fn apply_env_overrides(config: &mut FramequeueConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("FRAMEQUEUE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Scheduler overrides
    if let Ok(val) = std::env::var("FRAMEQUEUE_SCHEDULER_MAX_CONCURRENT_JOBS") {
        config.scheduler.max_concurrent_jobs =
            parse_override("FRAMEQUEUE_SCHEDULER_MAX_CONCURRENT_JOBS", &val)?;
    }
    if let Ok(val) = std::env::var("FRAMEQUEUE_SCHEDULER_MAX_RETRIES") {
        config.scheduler.max_retries = parse_override("FRAMEQUEUE_SCHEDULER_MAX_RETRIES", &val)?;
    }
    if let Ok(val) = std::env::var("FRAMEQUEUE_SCHEDULER_SHUTDOWN_TIMEOUT_SECS") {
        config.scheduler.shutdown_timeout_secs =
            parse_override("FRAMEQUEUE_SCHEDULER_SHUTDOWN_TIMEOUT_SECS", &val)?;
    }

    // Preset overrides
    if let Ok(val) = std::env::var("FRAMEQUEUE_PRESETS_FILE") {
        config.presets.file = Some(PathBuf::from(val));
    }

    // Engine overrides
    if let Ok(val) = std::env::var("FRAMEQUEUE_TRANSCODE_FFMPEG_PATH") {
        config.engines.transcode.ffmpeg_path = Some(PathBuf::from(val));
    }

    // Logging overrides
    if let Ok(val) = std::env::var("FRAMEQUEUE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("FRAMEQUEUE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("FQ_LOADER_TEST_VAR", "test_value");
        let input = "file = \"${FQ_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "file = \"test_value\"");
        std::env::remove_var("FQ_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("FQ_LOADER_MISSING_VAR");
        let input = "file = \"${FQ_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("FQ_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("FQ_LOADER_COMMENTED_VAR");
        let input = "# file = \"${FQ_LOADER_COMMENTED_VAR}\"\nlog_level = \"info\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(FramequeueError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[scheduler]
max_concurrent_jobs = 4
max_retries = 2

[engines.transcode]
diagnostic_tail_lines = 50

[engines.draft]
generator = "studio"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.scheduler.max_concurrent_jobs, 4);
        assert_eq!(config.scheduler.max_retries, 2);
        assert_eq!(config.engines.transcode.diagnostic_tail_lines, 50);
        assert_eq!(config.engines.draft.generator, "studio");
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let result = load_config_from_str("[scheduler]\nmax_concurrent_jobs = 0\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("max_concurrent_jobs"));
    }

    #[test]
    fn test_load_config_rejects_bad_toml() {
        let result = load_config_from_str("[scheduler\nmax_retries = ");
        assert!(matches!(result, Err(FramequeueError::Configuration(_))));
    }
}
