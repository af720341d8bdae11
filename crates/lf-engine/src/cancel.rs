//! Cooperative cancellation signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag an engine polls at its checkpoints.
///
/// Cloning yields a handle to the same flag; cancellation is sticky for the
/// lifetime of one run.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
