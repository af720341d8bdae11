//! lf-store: durable per-job snapshot and configuration storage.

pub mod store;

pub use store::{Corruption, SnapshotLoad, SnapshotStore};

use std::path::PathBuf;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupted snapshot frame at {path}:{line}: {detail}")]
    Corrupted {
        path: PathBuf,
        line: usize,
        detail: String,
    },

    #[error("no stored simulation for job {job_id}")]
    SimulationNotFound { job_id: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
