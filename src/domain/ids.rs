//! Domain identifier types with validation
//!
//! Newtype wrappers keep job ids and preset ids from being mixed up.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Export job identifier
///
/// Generated at submission time. The leading millisecond timestamp keeps ids
/// roughly ordered by creation; the random suffix keeps jobs submitted within
/// the same millisecond distinct.
///
/// # Examples
///
/// ```
/// use framequeue::domain::ids::JobId;
///
/// let id = JobId::generate();
/// assert!(id.as_str().starts_with("export_"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Creates a JobId from an existing string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Job ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Generates a fresh, timestamp-prefixed job id
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("export_{}_{}", millis, &suffix[..8]))
    }

    /// Returns the job ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Preset identifier (e.g. `youtube_1080p`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetId(String);

impl PresetId {
    /// Creates a new PresetId
    ///
    /// Preset ids are used as JSON object keys in the preset file, so they
    /// must be non-empty and free of surrounding whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Preset ID cannot be empty".to_string());
        }
        if id.trim() != id {
            return Err(format!(
                "Preset ID cannot have leading or trailing whitespace: '{id}'"
            ));
        }
        Ok(Self(id))
    }

    /// Returns the preset ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PresetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PresetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
