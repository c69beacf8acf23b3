//! External system integrations for framequeue.
//!
//! - [`engines`] - export engines (ffmpeg transcoding, draft generation)
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external processes and
//! file formats behind a trait, so the scheduler can be tested with stub
//! engines.
//!
//! ```rust,no_run
//! use framequeue::adapters::engines::{EngineRegistry, ExportEngine};
//! use framequeue::config::EnginesConfig;
//! use framequeue::domain::ExportFormat;
//!
//! let registry = EngineRegistry::with_defaults(&EnginesConfig::default());
//! let engine = registry.get(ExportFormat::Mp4H264).unwrap();
//! println!("mp4_h264 handled by {}", engine.name());
//! ```

pub mod engines;
