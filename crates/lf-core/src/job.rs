//! Job identifier and metadata record.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::snapshot::SnapshotSummary;
use crate::status::JobStatus;

pub type JobId = String;

/// Row held by the external metadata store for one job.
///
/// The summaries list mirrors the job's on-disk snapshot sequence: an entry
/// is appended only after the corresponding record write is durable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRecord {
    pub id: JobId,
    pub name: String,
    pub status: JobStatus,
    pub config: SimulationConfig,
    pub config_fingerprint: String,
    #[serde(default)]
    pub summaries: Vec<SnapshotSummary>,
    pub data_dir: PathBuf,
    pub created_at: String,
    pub updated_at: String,
}
