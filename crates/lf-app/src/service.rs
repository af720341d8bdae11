//! Job lifecycle service: the facade frontends talk to.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lf_cache::{CacheStats, Dataset, ResultCache};
use lf_core::{JobId, JobRecord, JobStatus, SimulationConfig, config_fingerprint};
use lf_engine::SimulationEngine;
use lf_exec::{
    ControllerOptions, ExecutionController, InMemoryMetadataStore, MetadataStore, RunObserver,
};
use lf_store::SnapshotStore;

use crate::error::{AppError, AppResult};

/// Tuning for a [`JobService`].
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// Maximum number of materialized datasets kept in memory
    pub cache_limit: usize,
    /// Minimum interval between observer progress notifications
    pub min_notify_interval: Duration,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            cache_limit: 8,
            min_notify_interval: Duration::from_millis(100),
        }
    }
}

/// Composes the snapshot store, metadata store, result cache, and execution
/// controller behind one interface.
pub struct JobService {
    store: SnapshotStore,
    metadata: Arc<dyn MetadataStore>,
    cache: Arc<ResultCache>,
    controller: ExecutionController,
}

impl JobService {
    /// Service over a storage root with a process-local metadata store.
    pub fn new(
        root_dir: PathBuf,
        engine: Arc<dyn SimulationEngine>,
        options: ServiceOptions,
    ) -> AppResult<Self> {
        let store = SnapshotStore::new(root_dir)?;
        Self::with_metadata(store, engine, Arc::new(InMemoryMetadataStore::new()), options)
    }

    /// Service over an existing store and an external metadata store.
    pub fn with_metadata(
        store: SnapshotStore,
        engine: Arc<dyn SimulationEngine>,
        metadata: Arc<dyn MetadataStore>,
        options: ServiceOptions,
    ) -> AppResult<Self> {
        let cache = Arc::new(ResultCache::new(options.cache_limit));
        let controller = ExecutionController::new(
            engine,
            store.clone(),
            Arc::clone(&metadata),
            Arc::clone(&cache),
            ControllerOptions {
                min_notify_interval: options.min_notify_interval,
            },
        );
        Ok(Self {
            store,
            metadata,
            cache,
            controller,
        })
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Create a draft job: directory and configuration on disk, record in
    /// the metadata store.
    pub fn create_job(&self, name: &str, config: SimulationConfig) -> AppResult<JobRecord> {
        config.validate()?;

        let id: JobId = uuid::Uuid::new_v4().to_string();
        self.store.save_config(&id, &config)?;

        let now = chrono::Utc::now().to_rfc3339();
        let record = JobRecord {
            id: id.clone(),
            name: name.to_string(),
            status: JobStatus::Draft,
            config_fingerprint: config_fingerprint(&config),
            config,
            summaries: Vec::new(),
            data_dir: self.store.root_dir().join(&id),
            created_at: now.clone(),
            updated_at: now,
        };
        self.metadata.insert(record.clone())?;
        tracing::info!(job_id = %record.id, name, "job created");
        Ok(record)
    }

    /// Start a run with the configuration stored on the job record.
    pub fn run(&self, job_id: &str, observer: Box<dyn RunObserver>) -> AppResult<()> {
        let record = self
            .metadata
            .get(job_id)?
            .ok_or_else(|| AppError::JobNotFound(job_id.to_string()))?;
        self.controller.run(job_id, record.config, observer)?;
        Ok(())
    }

    /// Start a run with an explicit configuration (stored on the record as
    /// part of run bookkeeping).
    pub fn run_with_config(
        &self,
        job_id: &str,
        config: SimulationConfig,
        observer: Box<dyn RunObserver>,
    ) -> AppResult<()> {
        self.controller.run(job_id, config, observer)?;
        Ok(())
    }

    pub fn pause(&self, job_id: &str) -> AppResult<()> {
        self.controller.pause(job_id)?;
        Ok(())
    }

    pub fn resume(&self, job_id: &str) -> AppResult<()> {
        self.controller.resume(job_id)?;
        Ok(())
    }

    pub fn cancel(&self, job_id: &str) -> AppResult<()> {
        self.controller.cancel(job_id)?;
        Ok(())
    }

    /// Block until the job has no active run; `None` if it never ran.
    pub fn wait(&self, job_id: &str) -> Option<JobStatus> {
        self.controller.wait(job_id)
    }

    pub fn is_active(&self, job_id: &str) -> bool {
        self.controller.is_active(job_id)
    }

    /// Cached dataset for a job, materializing it from disk on a miss.
    ///
    /// A corrupted tail costs only the frames at and after the bad one; the
    /// valid prefix stays loadable.
    pub fn load_for_display(&self, job_id: &str) -> AppResult<Arc<Dataset>> {
        if let Some(dataset) = self.cache.get(job_id) {
            return Ok(dataset);
        }

        let load = self.store.load_snapshots(job_id)?;
        if let Some(corruption) = &load.corruption {
            tracing::warn!(
                job_id,
                line = corruption.line,
                "using valid snapshot prefix; tail failed to decode"
            );
        }
        if load.records.is_empty() {
            return Err(AppError::NoData(job_id.to_string()));
        }

        let dataset = Arc::new(Dataset::from_records(job_id, &load.records)?);
        self.cache.put(job_id, Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn job(&self, job_id: &str) -> AppResult<JobRecord> {
        self.metadata
            .get(job_id)?
            .ok_or_else(|| AppError::JobNotFound(job_id.to_string()))
    }

    pub fn list_jobs(&self) -> AppResult<Vec<JobRecord>> {
        Ok(self.metadata.query()?)
    }

    /// Remove a job's data directory, metadata record, and cache entry.
    /// Refused while a run is active.
    pub fn delete_job(&self, job_id: &str) -> AppResult<()> {
        if self.controller.is_active(job_id) {
            return Err(AppError::JobActive(job_id.to_string()));
        }
        self.store.delete_job(job_id)?;
        self.metadata.delete(job_id)?;
        self.cache.invalidate(job_id);
        tracing::info!(job_id, "job deleted");
        Ok(())
    }

    pub fn storage_size(&self, job_id: &str) -> AppResult<u64> {
        Ok(self.store.storage_size(job_id)?)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
