//! lf-exec: exclusive-ownership run lifecycle for simulation jobs.
//!
//! Provides:
//! - `ExecutionController`: at-most-one active run per job id, worker thread
//!   per run, persist-then-notify snapshot handling, cooperative cancel
//! - `ProgressThrottle`: time-gated coalescing of observer notifications
//! - `RunObserver` callback surface
//! - `MetadataStore` boundary trait + in-memory implementation

pub mod controller;
pub mod metadata;
pub mod observer;
pub mod throttle;

pub use controller::{ControllerOptions, ExecutionController};
pub use metadata::{InMemoryMetadataStore, MetaResult, MetadataError, MetadataStore};
pub use observer::{NullObserver, ProgressUpdate, RunObserver};
pub use throttle::ProgressThrottle;

pub type ExecResult<T> = Result<T, ExecError>;

#[derive(thiserror::Error, Debug)]
pub enum ExecError {
    #[error("job {job_id} is already running")]
    AlreadyRunning { job_id: String },

    #[error(transparent)]
    InvalidConfiguration(#[from] lf_core::ConfigError),

    #[error("job {job_id} has no active run")]
    NotActive { job_id: String },

    #[error("metadata store error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("snapshot store error: {0}")]
    Store(#[from] lf_store::StoreError),
}
