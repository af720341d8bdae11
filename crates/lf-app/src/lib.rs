//! Shared application service layer for labflow.
//!
//! Provides a unified interface for frontends, composing the snapshot
//! store, execution controller, metadata store, and result cache.

pub mod error;
pub mod query;
pub mod service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use query::{
    DatasetSummary, dataset_summary, extract_cell_series, extract_derived_series, list_field_names,
};
pub use service::{JobService, ServiceOptions};
