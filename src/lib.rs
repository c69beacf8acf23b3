// Framequeue - Prioritized media export queue
// Copyright (c) 2025 Framequeue Contributors
// Licensed under the MIT License

//! # Framequeue - prioritized media export queue
//!
//! Framequeue turns export requests ("render this project with that preset to
//! this path") into jobs, runs them on a bounded pool of workers in priority
//! order, retries transient failures, and reports progress as events.
//!
//! ## Overview
//!
//! - **Presets** name a format, resolution, bitrates and encoder options
//! - **Jobs** carry a snapshot of their preset through a fixed lifecycle
//! - **Engines** produce the artifact: an ffmpeg transcode, or an editable
//!   draft project document
//! - **The scheduler** orders, dispatches and retries jobs
//! - **The export system** is the one facade callers use
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Catalog, events, scheduler and export facade
//! - [`adapters`] - Export engines
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use framequeue::config::load_config;
//! use framequeue::core::export::{ExportRequest, ExportSystem};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("framequeue.toml")?;
//!     let system = ExportSystem::from_config(&config)?;
//!     let mut events = system.subscribe();
//!
//!     let id = system.submit_request(
//!         ExportRequest::new("project-1", "/media/out.mp4", "youtube_1080p")
//!             .with_meta("input_file", "/media/in.mov")
//!             .with_meta("duration", 93.5)
//!             .with_priority(10),
//!     )?;
//!
//!     while let Some(event) = events.recv().await {
//!         println!("{event:?}");
//!         if event.is_terminal() && event.job_id() == Some(&id) {
//!             break;
//!         }
//!     }
//!
//!     system.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Custom Engines
//!
//! Any type implementing [`adapters::engines::ExportEngine`] can be
//! registered for the formats it supports:
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use framequeue::adapters::engines::{EngineRegistry, ExportEngine, JobContext};
//! use framequeue::domain::{EngineError, ExportFormat, Job};
//! use std::sync::Arc;
//!
//! struct Touch;
//!
//! #[async_trait]
//! impl ExportEngine for Touch {
//!     fn name(&self) -> &'static str { "touch" }
//!     fn supports(&self) -> &[ExportFormat] { &[ExportFormat::WavAudio] }
//!     async fn export(&self, job: &Job, ctx: &JobContext) -> Result<(), EngineError> {
//!         tokio::fs::write(&job.output_path, b"").await?;
//!         ctx.report_progress(100.0);
//!         Ok(())
//!     }
//! }
//!
//! let registry = EngineRegistry::new().with_engine(Arc::new(Touch));
//! assert!(registry.supports(ExportFormat::WavAudio));
//! ```
//!
//! ## Error Handling
//!
//! Pre-flight failures (unknown preset, rejected preset, bad configuration)
//! return [`domain::FramequeueError`] synchronously. Execution failures end
//! up on the job's `error_message` and in a `Failed` event.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
