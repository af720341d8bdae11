//! lf-cache: bounded in-memory cache of display-ready datasets.

pub mod cache;
pub mod dataset;

pub use cache::{CacheStats, ResultCache};
pub use dataset::{Dataset, FieldMatrix};

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("no snapshot data for job {job_id}")]
    NoData { job_id: String },

    #[error("inconsistent snapshot sequence: {what}")]
    Inconsistent { what: String },
}
