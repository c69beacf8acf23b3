//! Engine lookup table
//!
//! Maps each format tag to the engine that produces it. Built once and
//! handed to the scheduler; the scheduler never mutates it.

use super::draft::DraftEngine;
use super::traits::ExportEngine;
use super::transcode::TranscodeEngine;
use crate::config::EnginesConfig;
use crate::domain::ExportFormat;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Format tag to engine lookup table
#[derive(Clone, Default)]
pub struct EngineRegistry {
    engines: HashMap<ExportFormat, Arc<dyn ExportEngine>>,
}

impl EngineRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the transcode and draft engines
    pub fn with_defaults(config: &EnginesConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TranscodeEngine::new(config.transcode.clone())));
        registry.register(Arc::new(DraftEngine::new(config.draft.clone())));
        registry
    }

    /// Register an engine for every format it supports
    ///
    /// A later registration replaces an earlier one for the same format.
    pub fn register(&mut self, engine: Arc<dyn ExportEngine>) {
        for format in engine.supports() {
            if let Some(previous) = self.engines.insert(*format, engine.clone()) {
                tracing::debug!(
                    format = %format,
                    previous = previous.name(),
                    engine = engine.name(),
                    "Replacing registered engine"
                );
            }
        }
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_engine(mut self, engine: Arc<dyn ExportEngine>) -> Self {
        self.register(engine);
        self
    }

    pub fn get(&self, format: ExportFormat) -> Option<Arc<dyn ExportEngine>> {
        self.engines.get(&format).cloned()
    }

    pub fn supports(&self, format: ExportFormat) -> bool {
        self.engines.contains_key(&format)
    }

    /// Registered formats in declaration order
    pub fn formats(&self) -> Vec<ExportFormat> {
        ExportFormat::ALL
            .into_iter()
            .filter(|f| self.engines.contains_key(f))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for format in self.formats() {
            if let Some(engine) = self.engines.get(&format) {
                map.entry(&format.as_str(), &engine.name());
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::engines::JobContext;
    use crate::domain::{EngineError, Job};
    use async_trait::async_trait;

    struct Named(&'static str, Vec<ExportFormat>);

    #[async_trait]
    impl ExportEngine for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn supports(&self) -> &[ExportFormat] {
            &self.1
        }

        async fn export(&self, _job: &Job, _ctx: &JobContext) -> Result<(), EngineError> {
            Ok(())
        }
    }

    #[test]
    fn test_defaults_cover_every_format() {
        let registry = EngineRegistry::with_defaults(&EnginesConfig::default());
        for format in ExportFormat::ALL {
            assert!(registry.supports(format), "{format} has no engine");
        }
        assert_eq!(
            registry.get(ExportFormat::JianyingDraft).unwrap().name(),
            "draft"
        );
        assert_eq!(registry.get(ExportFormat::GifAnimated).unwrap().name(), "transcode");
    }

    #[test]
    fn test_empty_registry() {
        let registry = EngineRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(ExportFormat::Mp4H264).is_none());
        assert!(registry.formats().is_empty());
    }

    #[test]
    fn test_later_registration_wins() {
        let registry = EngineRegistry::new()
            .with_engine(Arc::new(Named("first", vec![ExportFormat::WavAudio])))
            .with_engine(Arc::new(Named(
                "second",
                vec![ExportFormat::WavAudio, ExportFormat::Mp3Audio],
            )));

        assert_eq!(registry.get(ExportFormat::WavAudio).unwrap().name(), "second");
        assert_eq!(
            registry.formats(),
            vec![ExportFormat::Mp3Audio, ExportFormat::WavAudio]
        );
    }
}
