//! Job lifecycle states.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a job.
///
/// `Draft` jobs have never run. `Running` and `Paused` mean the job is
/// currently owned by the execution controller; the terminal states return
/// the job to a re-runnable condition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state")]
pub enum JobStatus {
    Draft,
    Running,
    Paused,
    Completed,
    Cancelled,
    Failed { reason: String },
}

impl JobStatus {
    /// True while the controller owns the job (Running or Paused).
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Running | JobStatus::Paused)
    }

    /// True once a run has ended (Completed, Cancelled, or Failed).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Cancelled | JobStatus::Failed { .. }
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Draft => write!(f, "draft"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Paused => write!(f, "paused"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
            JobStatus::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}
