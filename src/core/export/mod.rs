//! Export facade
//!
//! This module provides the caller-facing side of framequeue:
//! - [`ExportSystem`], composing the preset catalog and the scheduler
//! - [`ExportRequest`], one export to submit
//! - [`ExportSummary`], run reporting for the command line

pub mod request;
pub mod summary;
pub mod system;

pub use request::ExportRequest;
pub use summary::{ExportError, ExportErrorType, ExportSummary};
pub use system::{ExportNotification, ExportSystem};
