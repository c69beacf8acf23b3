//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use framequeue::config::{default_config, load_config};
use framequeue::core::scheduler::SchedulerOptions;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("FRAMEQUEUE_APPLICATION_LOG_LEVEL");
    std::env::remove_var("FRAMEQUEUE_SCHEDULER_MAX_CONCURRENT_JOBS");
    std::env::remove_var("FRAMEQUEUE_SCHEDULER_MAX_RETRIES");
    std::env::remove_var("FRAMEQUEUE_PRESETS_FILE");
    std::env::remove_var("FRAMEQUEUE_TRANSCODE_FFMPEG_PATH");
    std::env::remove_var("TEST_FFMPEG_BIN");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[application]
log_level = "debug"

[scheduler]
max_concurrent_jobs = 6
max_retries = 4
retry_initial_delay_ms = 250
retry_backoff_multiplier = 3.0
retry_max_delay_ms = 5000
shutdown_timeout_secs = 30
history_max_age_secs = 3600

[presets]
file = "/etc/framequeue/presets.json"

[engines.transcode]
ffmpeg_path = "/usr/bin/ffmpeg"
search_paths = ["/srv/ffmpeg"]
diagnostic_tail_lines = 5

[engines.draft]
generator = "studio"

[logging]
local_enabled = true
local_path = "/var/log/framequeue"
local_rotation = "hourly"
"#,
    );

    let config = load_config(temp_file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.scheduler.max_concurrent_jobs, 6);
    assert_eq!(config.scheduler.shutdown_timeout(), Duration::from_secs(30));
    assert_eq!(config.scheduler.history_max_age(), Duration::from_secs(3600));
    assert_eq!(
        config.presets.file.as_deref(),
        Some(std::path::Path::new("/etc/framequeue/presets.json"))
    );
    assert_eq!(config.engines.transcode.search_paths.len(), 1);
    assert_eq!(config.engines.transcode.diagnostic_tail_lines, 5);
    assert_eq!(config.engines.draft.generator, "studio");
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");

    let options = SchedulerOptions::from_config(&config.scheduler);
    assert_eq!(options.max_concurrent_jobs, 6);
    assert_eq!(options.retry.max_attempts, 4);
    assert_eq!(options.retry.delay_after(1), Duration::from_millis(250));
    assert_eq!(options.retry.delay_after(2), Duration::from_millis(750));
    assert_eq!(options.retry.delay_after(4), Duration::from_millis(5000));
}

#[test]
fn test_empty_file_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config("");
    let config = load_config(temp_file.path()).unwrap();
    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.scheduler.max_concurrent_jobs, 2);
    assert_eq!(config.scheduler.max_retries, 3);
    assert!(config.presets.file.is_none());
    assert_eq!(config.engines.draft.generator, "framequeue");
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_FFMPEG_BIN", "/opt/ffmpeg/bin/ffmpeg");

    let temp_file = write_config(
        r#"
[engines.transcode]
ffmpeg_path = "${TEST_FFMPEG_BIN}"
"#,
    );
    let config = load_config(temp_file.path()).unwrap();
    assert_eq!(
        config.engines.transcode.ffmpeg_path.as_deref(),
        Some(std::path::Path::new("/opt/ffmpeg/bin/ffmpeg"))
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable_is_an_error() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[engines.transcode]
ffmpeg_path = "${TEST_FFMPEG_BIN}"
"#,
    );
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_FFMPEG_BIN"));
}

#[test]
fn test_env_overrides() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("FRAMEQUEUE_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("FRAMEQUEUE_SCHEDULER_MAX_CONCURRENT_JOBS", "8");
    std::env::set_var("FRAMEQUEUE_SCHEDULER_MAX_RETRIES", "1");
    std::env::set_var("FRAMEQUEUE_PRESETS_FILE", "/tmp/presets.json");

    let temp_file = write_config(
        r#"
[application]
log_level = "debug"

[scheduler]
max_concurrent_jobs = 2
"#,
    );
    let config = load_config(temp_file.path()).unwrap();
    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.scheduler.max_concurrent_jobs, 8);
    assert_eq!(config.scheduler.max_retries, 1);
    assert_eq!(
        config.presets.file.as_deref(),
        Some(std::path::Path::new("/tmp/presets.json"))
    );

    let defaults = default_config().unwrap();
    assert_eq!(defaults.scheduler.max_concurrent_jobs, 8);

    cleanup_env_vars();
}

#[test]
fn test_invalid_override_is_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("FRAMEQUEUE_SCHEDULER_MAX_CONCURRENT_JOBS", "lots");

    let err = default_config().unwrap_err();
    assert!(err
        .to_string()
        .contains("FRAMEQUEUE_SCHEDULER_MAX_CONCURRENT_JOBS"));

    std::env::set_var("FRAMEQUEUE_SCHEDULER_MAX_CONCURRENT_JOBS", "0");
    let err = default_config().unwrap_err();
    assert!(err.to_string().contains("max_concurrent_jobs"));

    cleanup_env_vars();
}

#[test]
fn test_validation_errors() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let cases = [
        ("[application]\nlog_level = \"loud\"\n", "log_level"),
        ("[scheduler]\nmax_retries = 0\n", "max_retries"),
        ("[scheduler]\nretry_backoff_multiplier = 0.5\n", "retry_backoff_multiplier"),
        (
            "[scheduler]\nretry_initial_delay_ms = 5000\nretry_max_delay_ms = 10\n",
            "retry_max_delay_ms",
        ),
        ("[logging]\nlocal_rotation = \"weekly\"\n", "local_rotation"),
    ];

    for (contents, field) in cases {
        let temp_file = write_config(contents);
        let err = load_config(temp_file.path()).unwrap_err();
        assert!(
            err.to_string().contains(field),
            "expected error about {field}, got: {err}"
        );
    }
}
