//! Preset catalog
//!
//! Holds the named export presets. The catalog is seeded with the built-in
//! presets at construction; user presets are merged in from a JSON file keyed
//! by preset id.
//!
//! # Example
//!
//! ```no_run
//! use framequeue::core::catalog::PresetCatalog;
//! use framequeue::domain::ExportFormat;
//!
//! # fn example() -> framequeue::domain::Result<()> {
//! let mut catalog = PresetCatalog::new();
//! catalog.load("presets.json")?;
//!
//! for preset in catalog.list_by_format(ExportFormat::Mp4H264) {
//!     println!("{} ({})", preset.name, preset.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod defaults;

use crate::domain::{ExportFormat, FramequeueError, Preset, Result};
use serde_json::{Map, Value};
use std::path::Path;

pub use defaults::builtin_presets;

/// Named export presets in insertion order
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl PresetCatalog {
    /// Catalog seeded with the built-in presets
    pub fn new() -> Self {
        Self {
            presets: builtin_presets(),
        }
    }

    /// Catalog with no presets at all
    pub fn empty() -> Self {
        Self {
            presets: Vec::new(),
        }
    }

    /// Insert or replace a preset by id
    ///
    /// A replaced preset keeps its position. Always succeeds.
    pub fn add(&mut self, preset: Preset) -> bool {
        match self.presets.iter_mut().find(|p| p.id == preset.id) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
        true
    }

    /// Remove a preset; returns whether one was removed
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.presets.len();
        self.presets.retain(|p| p.id.as_str() != id);
        self.presets.len() != before
    }

    pub fn get(&self, id: &str) -> Option<Preset> {
        self.presets.iter().find(|p| p.id.as_str() == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.presets.iter().any(|p| p.id.as_str() == id)
    }

    pub fn list_all(&self) -> Vec<Preset> {
        self.presets.clone()
    }

    pub fn list_by_format(&self, format: ExportFormat) -> Vec<Preset> {
        self.presets
            .iter()
            .filter(|p| p.format == format)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Write every preset to `path` as a JSON object keyed by id
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut document = Map::new();
        for preset in &self.presets {
            document.insert(preset.id.to_string(), serde_json::to_value(preset)?);
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let body = serde_json::to_string_pretty(&Value::Object(document))?;
        std::fs::write(path, body).map_err(|e| {
            FramequeueError::Io(format!("Failed to write presets to {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), count = self.presets.len(), "Presets saved");
        Ok(())
    }

    /// Merge presets from `path` into the catalog
    ///
    /// Entries replace presets with the same id; everything else is kept. A
    /// missing file merges nothing. Returns the number of presets read.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable, is not a JSON object, or
    /// holds an entry that is not a valid preset. Nothing is merged on error.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No preset file, keeping built-ins");
            return Ok(0);
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            FramequeueError::Io(format!("Failed to read presets from {}: {}", path.display(), e))
        })?;

        let document: Map<String, Value> = serde_json::from_str(&contents).map_err(|e| {
            FramequeueError::Serialization(format!(
                "Preset file {} is not a JSON object of presets: {}",
                path.display(),
                e
            ))
        })?;

        let mut loaded = Vec::with_capacity(document.len());
        for (key, value) in document {
            let preset: Preset = serde_json::from_value(value).map_err(|e| {
                FramequeueError::Serialization(format!("Invalid preset '{key}': {e}"))
            })?;
            if preset.id.as_str() != key {
                tracing::warn!(key = %key, id = %preset.id, "Preset key does not match its id, using id");
            }
            loaded.push(preset);
        }

        let count = loaded.len();
        for preset in loaded {
            self.add(preset);
        }

        tracing::info!(path = %path.display(), count, "Presets loaded");
        Ok(count)
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::new()
    }
}
