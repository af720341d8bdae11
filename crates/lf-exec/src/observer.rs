//! Observer callback surface for run progress.

use lf_core::{JobId, JobStatus, SnapshotSummary};

/// One throttled progress notification.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub job_id: JobId,
    pub summary: SnapshotSummary,
    pub elapsed_wall_s: f64,
}

/// Caller-supplied observer for one run.
///
/// Passed owned per `run` call and dropped when the run reaches a terminal
/// state; the controller keeps no reference beyond the run's lifetime.
/// Callbacks are invoked on the run's worker thread in persisted order.
pub trait RunObserver: Send {
    fn on_progress(&mut self, update: &ProgressUpdate);

    /// Always delivered exactly once, bypassing the throttle. `error` is
    /// present only for `Failed`.
    fn on_terminal(&mut self, status: &JobStatus, error: Option<&str>);
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl RunObserver for NullObserver {
    fn on_progress(&mut self, _update: &ProgressUpdate) {}
    fn on_terminal(&mut self, _status: &JobStatus, _error: Option<&str>) {}
}
