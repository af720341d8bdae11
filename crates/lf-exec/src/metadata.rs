//! Boundary to the external job metadata store.

use std::collections::HashMap;
use std::sync::Mutex;

use lf_core::{JobId, JobRecord, JobStatus, SnapshotSummary};

pub type MetaResult<T> = Result<T, MetadataError>;

#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    #[error("job not found: {job_id}")]
    JobNotFound { job_id: String },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

/// Structured record store holding lightweight job metadata.
///
/// The controller writes `status` and appends summaries during a run; no
/// transactional atomicity is assumed between a metadata write and a data
/// file write.
pub trait MetadataStore: Send + Sync {
    /// Insert or replace the whole record.
    fn insert(&self, record: JobRecord) -> MetaResult<()>;

    /// Replace an existing record; `JobNotFound` if absent.
    fn update(&self, record: JobRecord) -> MetaResult<()>;

    fn get(&self, job_id: &str) -> MetaResult<Option<JobRecord>>;

    /// Remove a record; absent is a no-op.
    fn delete(&self, job_id: &str) -> MetaResult<()>;

    fn query(&self) -> MetaResult<Vec<JobRecord>>;

    fn set_status(&self, job_id: &str, status: JobStatus) -> MetaResult<()>;

    fn append_summary(&self, job_id: &str, summary: SnapshotSummary) -> MetaResult<()>;

    fn clear_summaries(&self, job_id: &str) -> MetaResult<()>;
}

/// Process-local metadata store.
#[derive(Default)]
pub struct InMemoryMetadataStore {
    jobs: Mutex<HashMap<JobId, JobRecord>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_job<T>(
        &self,
        job_id: &str,
        f: impl FnOnce(&mut JobRecord) -> T,
    ) -> MetaResult<T> {
        let mut jobs = self.jobs.lock().expect("metadata lock poisoned");
        let record = jobs
            .get_mut(job_id)
            .ok_or_else(|| MetadataError::JobNotFound {
                job_id: job_id.to_string(),
            })?;
        let out = f(record);
        record.updated_at = chrono::Utc::now().to_rfc3339();
        Ok(out)
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn insert(&self, record: JobRecord) -> MetaResult<()> {
        let mut jobs = self.jobs.lock().expect("metadata lock poisoned");
        jobs.insert(record.id.clone(), record);
        Ok(())
    }

    fn update(&self, record: JobRecord) -> MetaResult<()> {
        let mut jobs = self.jobs.lock().expect("metadata lock poisoned");
        if !jobs.contains_key(&record.id) {
            return Err(MetadataError::JobNotFound { job_id: record.id });
        }
        jobs.insert(record.id.clone(), record);
        Ok(())
    }

    fn get(&self, job_id: &str) -> MetaResult<Option<JobRecord>> {
        let jobs = self.jobs.lock().expect("metadata lock poisoned");
        Ok(jobs.get(job_id).cloned())
    }

    fn delete(&self, job_id: &str) -> MetaResult<()> {
        let mut jobs = self.jobs.lock().expect("metadata lock poisoned");
        jobs.remove(job_id);
        Ok(())
    }

    fn query(&self) -> MetaResult<Vec<JobRecord>> {
        let jobs = self.jobs.lock().expect("metadata lock poisoned");
        let mut records: Vec<_> = jobs.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    fn set_status(&self, job_id: &str, status: JobStatus) -> MetaResult<()> {
        self.with_job(job_id, |record| record.status = status)
    }

    fn append_summary(&self, job_id: &str, summary: SnapshotSummary) -> MetaResult<()> {
        self.with_job(job_id, |record| record.summaries.push(summary))
    }

    fn clear_summaries(&self, job_id: &str) -> MetaResult<()> {
        self.with_job(job_id, |record| record.summaries.clear())
    }
}
