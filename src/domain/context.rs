//! Error context extension trait
//!
//! Adds `.context()` and `.with_context()` to any `Result` whose error
//! converts into [`FramequeueError`], so callers can say what they were doing
//! without giving up the typed error.
//!
//! # Examples
//!
//! ```rust
//! use framequeue::domain::Result;
//! use framequeue::domain::context::ResultExt;
//!
//! fn read_presets(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path).with_context(|| format!("Failed to read presets: {}", path))
//! }
//! ```

use crate::domain::errors::FramequeueError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context computed only when an error occurs
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<FramequeueError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| wrap(e.into(), context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| wrap(e.into(), f()))
    }
}

// Pre-flight variants keep their kind so callers can still match on them
fn wrap(base: FramequeueError, context: impl std::fmt::Display) -> FramequeueError {
    match base {
        FramequeueError::Configuration(msg) => {
            FramequeueError::Configuration(format!("{context}: {msg}"))
        }
        FramequeueError::Validation(msg) => FramequeueError::Validation(format!("{context}: {msg}")),
        FramequeueError::Io(msg) => FramequeueError::Io(format!("{context}: {msg}")),
        other => FramequeueError::Other(format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::EngineError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_context_keeps_configuration_kind() {
        let result: Result<()> = Err(FramequeueError::Configuration("bad value".to_string()));
        let err = result.context("Failed to load framequeue.toml").unwrap_err();

        assert!(matches!(err, FramequeueError::Configuration(_)));
        let msg = err.to_string();
        assert!(msg.contains("Failed to load framequeue.toml"));
        assert!(msg.contains("bad value"));
    }

    #[test]
    fn test_with_context_is_lazy() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();

        let result: Result<i32> = Ok(42);
        let result = result.with_context(|| {
            flag.store(true, Ordering::SeqCst);
            "never"
        });

        assert_eq!(result.unwrap(), 42);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_context_on_io_error() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = result.context("Reading presets").unwrap_err();
        assert!(matches!(err, FramequeueError::Io(_)));
        assert!(err.to_string().contains("Reading presets: missing"));
    }

    #[test]
    fn test_context_on_engine_error() {
        let result: std::result::Result<(), EngineError> = Err(EngineError::Cancelled);
        let err = result.context("Running export").unwrap_err();
        assert!(matches!(err, FramequeueError::Other(_)));
        assert!(err.to_string().contains("Export cancelled"));
    }
}
