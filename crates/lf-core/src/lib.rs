//! lf-core: stable foundation for labflow.
//!
//! Contains:
//! - config (simulation configuration + validation)
//! - snapshot (bulk record and lightweight summary types)
//! - status (job lifecycle states)
//! - job (job identifier and metadata record)
//! - fingerprint (content hash of a configuration)

pub mod config;
pub mod fingerprint;
pub mod job;
pub mod snapshot;
pub mod status;

pub use config::{ConfigError, SimulationConfig};
pub use fingerprint::config_fingerprint;
pub use job::{JobId, JobRecord};
pub use snapshot::{
    DerivedScalar, DerivedSnapshot, FieldSeries, ProfileSnapshot, SnapshotRecord, SnapshotSummary,
};
pub use status::JobStatus;
