//! SimulationEngine trait and the progress vocabulary shared with the
//! execution controller.

use lf_core::{SimulationConfig, SnapshotRecord};

use crate::cancel::CancelToken;
use crate::error::EngineResult;

/// One progress event: a full snapshot at an engine checkpoint.
#[derive(Debug, Clone)]
pub struct EngineProgress {
    /// Engine step counter at the time of the snapshot
    pub step: usize,
    pub record: SnapshotRecord,
}

/// What the caller wants after consuming a progress event.
///
/// `Halt` asks the engine to stop at this checkpoint; the controller uses it
/// when persisting a snapshot failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineDirective {
    Continue,
    Halt,
}

/// How an engine run ended. `Stopped` means the engine observed the cancel
/// token or a `Halt` directive at a checkpoint and stopped cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOutcome {
    Completed { steps: usize },
    Stopped { steps: usize },
}

/// An opaque long-running computation.
///
/// Implementations must:
/// - emit a full snapshot per progress event, in non-decreasing time order
/// - poll the cancel token at every checkpoint
/// - honor a `Halt` directive by stopping before the next step
///
/// There is no suspension or resume-from-checkpoint contract: a run either
/// finishes, stops at a checkpoint, or fails.
pub trait SimulationEngine: Send + Sync {
    fn run(
        &self,
        config: &SimulationConfig,
        cancel: &CancelToken,
        emit: &mut dyn FnMut(EngineProgress) -> EngineDirective,
    ) -> EngineResult<EngineOutcome>;
}
