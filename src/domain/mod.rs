//! Domain models and types for framequeue.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`JobId`], [`PresetId`])
//! - **Export presets** ([`Preset`], [`ExportFormat`], [`ExportQuality`], [`Resolution`])
//! - **Export jobs** ([`Job`], [`JobStatus`])
//! - **Error types** ([`FramequeueError`], [`EngineError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, FramequeueError>`]:
//!
//! ```rust
//! use framequeue::domain::{FramequeueError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = framequeue::config::load_config("framequeue.toml")?;
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod errors;
pub mod ids;
pub mod job;
pub mod preset;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{EngineError, FramequeueError};
pub use ids::{JobId, PresetId};
pub use job::{Job, JobMetadata, JobStatus};
pub use preset::{ExportFormat, ExportQuality, Preset, Resolution};
pub use result::Result;
