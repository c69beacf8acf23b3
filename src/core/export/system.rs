//! Export system facade
//!
//! [`ExportSystem`] is the single entry point for callers: it resolves preset
//! ids against the catalog, turns requests into jobs, hands them to the
//! scheduler and relays scheduler events as [`ExportNotification`]s.

use super::request::ExportRequest;
use crate::adapters::engines::EngineRegistry;
use crate::config::FramequeueConfig;
use crate::core::catalog::PresetCatalog;
use crate::core::events::{EventBus, SchedulerEvent};
use crate::core::scheduler::{QueueStatus, Scheduler, SchedulerOptions, ShutdownReport};
use crate::domain::context::ResultExt;
use crate::domain::{
    ExportFormat, FramequeueError, Job, JobId, JobMetadata, Preset, Result,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Event published to external listeners
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExportNotification {
    Queued { job_id: JobId },
    Started { job_id: JobId, attempt: u32 },
    Progress { job_id: JobId, percent: f64 },
    Completed { job_id: JobId, output_path: PathBuf },
    Failed { job_id: JobId, error: String },
    Cancelled { job_id: JobId },
    QueueChanged,
}

impl ExportNotification {
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            ExportNotification::Queued { job_id }
            | ExportNotification::Started { job_id, .. }
            | ExportNotification::Progress { job_id, .. }
            | ExportNotification::Completed { job_id, .. }
            | ExportNotification::Failed { job_id, .. }
            | ExportNotification::Cancelled { job_id } => Some(job_id),
            ExportNotification::QueueChanged => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExportNotification::Completed { .. }
                | ExportNotification::Failed { .. }
                | ExportNotification::Cancelled { .. }
        )
    }
}

impl From<&SchedulerEvent> for ExportNotification {
    fn from(event: &SchedulerEvent) -> Self {
        match event.clone() {
            SchedulerEvent::JobAdded { job_id } => ExportNotification::Queued { job_id },
            SchedulerEvent::JobStarted { job_id, attempt } => {
                ExportNotification::Started { job_id, attempt }
            }
            SchedulerEvent::JobProgress { job_id, percent } => {
                ExportNotification::Progress { job_id, percent }
            }
            SchedulerEvent::JobCompleted {
                job_id,
                output_path,
            } => ExportNotification::Completed {
                job_id,
                output_path,
            },
            SchedulerEvent::JobFailed { job_id, error } => {
                ExportNotification::Failed { job_id, error }
            }
            SchedulerEvent::JobCancelled { job_id } => ExportNotification::Cancelled { job_id },
            SchedulerEvent::QueueChanged => ExportNotification::QueueChanged,
        }
    }
}

/// Export subsystem facade
pub struct ExportSystem {
    catalog: RwLock<PresetCatalog>,
    scheduler: Arc<Scheduler>,
    events: Arc<EventBus<ExportNotification>>,
    presets_path: Option<PathBuf>,
    shutdown_timeout: Duration,
    history_max_age: Duration,
}

impl ExportSystem {
    /// Compose a catalog and a running scheduler
    pub fn new(catalog: PresetCatalog, scheduler: Arc<Scheduler>) -> Self {
        let events = Arc::new(EventBus::new());
        let relay = events.clone();
        scheduler.on_event(move |event| relay.emit(ExportNotification::from(event)));

        let defaults = crate::config::SchedulerConfig::default();
        Self {
            catalog: RwLock::new(catalog),
            scheduler,
            events,
            presets_path: None,
            shutdown_timeout: defaults.shutdown_timeout(),
            history_max_age: defaults.history_max_age(),
        }
    }

    /// Build the whole subsystem from configuration
    ///
    /// Merges the configured preset file over the built-ins, registers the
    /// default engines and starts the scheduler.
    ///
    /// # Errors
    ///
    /// Returns an error if the preset file is unreadable or invalid, or if
    /// called outside a Tokio runtime.
    pub fn from_config(config: &FramequeueConfig) -> Result<Self> {
        let mut catalog = PresetCatalog::new();
        if let Some(path) = &config.presets.file {
            catalog
                .load(path)
                .with_context(|| format!("Failed to load presets from {}", path.display()))?;
        }

        let engines = EngineRegistry::with_defaults(&config.engines);
        let scheduler = Scheduler::start(engines, SchedulerOptions::from_config(&config.scheduler))?;

        let mut system = Self::new(catalog, Arc::new(scheduler));
        system.presets_path = config.presets.file.clone();
        system.shutdown_timeout = config.scheduler.shutdown_timeout();
        system.history_max_age = config.scheduler.history_max_age();
        Ok(system)
    }

    /// Submit one export by preset id
    ///
    /// # Errors
    ///
    /// Returns [`FramequeueError::PresetNotFound`] for an unknown preset and a
    /// validation error when the format's engine rejects the preset. No job is
    /// queued in either case.
    pub fn submit(
        &self,
        project_id: impl Into<String>,
        output_path: impl Into<PathBuf>,
        preset_id: &str,
        metadata: JobMetadata,
    ) -> Result<JobId> {
        self.submit_request(
            ExportRequest::new(project_id, output_path, preset_id).with_metadata(metadata),
        )
    }

    /// Submit one export request
    pub fn submit_request(&self, request: ExportRequest) -> Result<JobId> {
        let preset = self
            .catalog
            .read()
            .get(&request.preset_id)
            .ok_or_else(|| FramequeueError::PresetNotFound(request.preset_id.clone()))?;

        if let Some(engine) = self.scheduler.engines().get(preset.format) {
            engine.validate_preset(&preset).map_err(|e| {
                FramequeueError::Validation(format!(
                    "preset '{}' rejected by {} engine: {}",
                    preset.id,
                    engine.name(),
                    e
                ))
            })?;
        }

        let mut job = Job::new(request.project_id, request.output_path, preset)
            .with_metadata(request.metadata)
            .with_priority(request.priority);
        if let Some(secs) = request.estimated_duration_secs {
            job = job.with_estimated_duration(secs);
        }

        let format = job.preset.format;
        let id = self.scheduler.enqueue(job)?;
        tracing::info!(job_id = %id, preset = %request.preset_id, format = %format, "Export submitted");
        Ok(id)
    }

    /// Submit every request, skipping the ones that fail
    ///
    /// Returns the ids of the accepted jobs in request order.
    pub fn submit_batch(&self, requests: impl IntoIterator<Item = ExportRequest>) -> Vec<JobId> {
        requests
            .into_iter()
            .enumerate()
            .filter_map(|(index, request)| {
                let preset_id = request.preset_id.clone();
                match self.submit_request(request) {
                    Ok(id) => Some(id),
                    Err(e) => {
                        tracing::warn!(
                            index,
                            preset = %preset_id,
                            error = %e,
                            "Skipping batch entry"
                        );
                        None
                    }
                }
            })
            .collect()
    }

    pub fn cancel(&self, job_id: &str) -> bool {
        self.scheduler.cancel(job_id)
    }

    pub fn queue_status(&self) -> QueueStatus {
        self.scheduler.status_snapshot()
    }

    pub fn history(&self, limit: usize) -> Vec<Job> {
        self.scheduler.history(limit)
    }

    pub fn job(&self, job_id: &str) -> Option<Job> {
        self.scheduler.job(job_id)
    }

    pub fn active_jobs(&self) -> Vec<Job> {
        self.scheduler.active_jobs()
    }

    /// Drop completed jobs older than the configured history age
    pub fn purge_history(&self) -> usize {
        self.scheduler.purge_completed(self.history_max_age)
    }

    pub fn add_preset(&self, preset: Preset) -> bool {
        tracing::debug!(preset = %preset.id, "Preset added");
        self.catalog.write().add(preset)
    }

    pub fn remove_preset(&self, preset_id: &str) -> bool {
        self.catalog.write().remove(preset_id)
    }

    pub fn get_preset(&self, preset_id: &str) -> Option<Preset> {
        self.catalog.read().get(preset_id)
    }

    pub fn list_presets(&self) -> Vec<Preset> {
        self.catalog.read().list_all()
    }

    pub fn list_presets_by_format(&self, format: ExportFormat) -> Vec<Preset> {
        self.catalog.read().list_by_format(format)
    }

    /// Write the catalog to the configured preset file
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no preset file is configured.
    pub fn save_presets(&self) -> Result<()> {
        let path = self.presets_path.as_ref().ok_or_else(|| {
            FramequeueError::Configuration("no preset file configured".to_string())
        })?;
        self.save_presets_to(path)
    }

    pub fn save_presets_to(&self, path: impl AsRef<Path>) -> Result<()> {
        self.catalog.read().save(path)
    }

    /// Merge presets from `path` into the catalog
    pub fn load_presets(&self, path: impl AsRef<Path>) -> Result<usize> {
        self.catalog.write().load(path)
    }

    /// Receive every notification from now on
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ExportNotification> {
        self.events.subscribe()
    }

    /// Invoke `listener` for every notification
    pub fn on_event(&self, listener: impl Fn(&ExportNotification) + Send + Sync + 'static) {
        self.events.on(listener);
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Stop the scheduler, waiting up to the configured timeout
    pub async fn shutdown(&self) -> ShutdownReport {
        self.shutdown_with_timeout(self.shutdown_timeout).await
    }

    pub async fn shutdown_with_timeout(&self, timeout: Duration) -> ShutdownReport {
        self.scheduler.shutdown(timeout).await
    }
}

impl std::fmt::Debug for ExportSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportSystem")
            .field("presets", &self.catalog.read().len())
            .field("scheduler", &self.scheduler)
            .field("presets_path", &self.presets_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_from_scheduler_event() {
        let id = JobId::new("export_1").unwrap();
        let relayed = ExportNotification::from(&SchedulerEvent::JobStarted {
            job_id: id.clone(),
            attempt: 2,
        });
        assert_eq!(
            relayed,
            ExportNotification::Started {
                job_id: id.clone(),
                attempt: 2
            }
        );
        assert!(!relayed.is_terminal());
        assert_eq!(relayed.job_id(), Some(&id));

        let json = serde_json::to_value(ExportNotification::Cancelled { job_id: id }).unwrap();
        assert_eq!(json["type"], "cancelled");
    }

    #[tokio::test]
    async fn test_save_presets_requires_path() {
        let scheduler = Scheduler::start(EngineRegistry::new(), SchedulerOptions::default()).unwrap();
        let system = ExportSystem::new(PresetCatalog::new(), Arc::new(scheduler));
        assert!(matches!(
            system.save_presets(),
            Err(FramequeueError::Configuration(_))
        ));
    }
}
