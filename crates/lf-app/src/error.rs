//! Error types for the lf-app service layer.

/// Application error type that wraps errors from the backend crates and
/// provides a unified interface for frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job has an active run: {0}")]
    JobActive(String),

    #[error("No snapshot data for job: {0}")]
    NoData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for lf-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<lf_store::StoreError> for AppError {
    fn from(err: lf_store::StoreError) -> Self {
        match err {
            lf_store::StoreError::SimulationNotFound { job_id } => AppError::JobNotFound(job_id),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<lf_exec::ExecError> for AppError {
    fn from(err: lf_exec::ExecError) -> Self {
        match err {
            lf_exec::ExecError::AlreadyRunning { job_id } => AppError::JobActive(job_id),
            lf_exec::ExecError::InvalidConfiguration(inner) => {
                AppError::InvalidInput(inner.to_string())
            }
            other => AppError::Execution(other.to_string()),
        }
    }
}

impl From<lf_exec::MetadataError> for AppError {
    fn from(err: lf_exec::MetadataError) -> Self {
        match err {
            lf_exec::MetadataError::JobNotFound { job_id } => AppError::JobNotFound(job_id),
            other => AppError::Metadata(other.to_string()),
        }
    }
}

impl From<lf_cache::CacheError> for AppError {
    fn from(err: lf_cache::CacheError) -> Self {
        match err {
            lf_cache::CacheError::NoData { job_id } => AppError::NoData(job_id),
            other => AppError::Dataset(other.to_string()),
        }
    }
}

impl From<lf_core::ConfigError> for AppError {
    fn from(err: lf_core::ConfigError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
