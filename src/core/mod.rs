//! Core export orchestration
//!
//! # Modules
//!
//! - [`catalog`] - Named export presets, seeded with built-ins
//! - [`events`] - In-process publish/subscribe
//! - [`scheduler`] - Priority queue, worker slots and retries
//! - [`export`] - The [`ExportSystem`](export::ExportSystem) facade
//!
//! # Export Workflow
//!
//! 1. **Submit**: the facade resolves the preset id and creates a job
//! 2. **Queue**: the scheduler orders jobs by priority, then submission order
//! 3. **Dispatch**: a free worker slot picks up the next job
//! 4. **Export**: the engine registered for the preset's format runs it
//! 5. **Retry**: transient failures are retried with exponential backoff
//! 6. **Report**: lifecycle events reach subscribers; finished jobs land in history
//!
//! # Example
//!
//! ```rust,no_run
//! use framequeue::config::load_config;
//! use framequeue::core::export::{ExportNotification, ExportSystem};
//! use framequeue::domain::JobMetadata;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("framequeue.toml")?;
//! let system = ExportSystem::from_config(&config)?;
//! let mut events = system.subscribe();
//!
//! let mut metadata = JobMetadata::new();
//! metadata.insert("input_file".into(), "/media/in.mov".into());
//! let id = system.submit("project-1", "/media/out.mp4", "youtube_1080p", metadata)?;
//!
//! while let Some(event) = events.recv().await {
//!     if let ExportNotification::Progress { percent, .. } = &event {
//!         println!("{percent:.1}%");
//!     }
//!     if event.is_terminal() && event.job_id() == Some(&id) {
//!         break;
//!     }
//! }
//!
//! system.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod events;
pub mod export;
pub mod scheduler;
