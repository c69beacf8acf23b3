//! Export engines
//!
//! An engine turns one [`Job`](crate::domain::Job) into one artifact on disk.
//! Two engines ship with the crate:
//!
//! - [`transcode`] - drives an external `ffmpeg` process for every video and
//!   audio format
//! - [`draft`] - writes a JSON editing-draft document in process
//!
//! Engines are looked up by format through an [`EngineRegistry`].

pub mod draft;
pub mod registry;
pub mod traits;
pub mod transcode;

pub use draft::DraftEngine;
pub use registry::EngineRegistry;
pub use traits::{ExportEngine, JobContext, ProgressFn};
pub use transcode::TranscodeEngine;
