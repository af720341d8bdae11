//! Error types for engine invocations.

use thiserror::Error;

/// Errors raised by an engine run. Cancellation is not an error; it is
/// reported through [`EngineOutcome::Stopped`](crate::EngineOutcome).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
