//! lf-engine: the boundary to the numerical simulation engine.
//!
//! Provides:
//! - `SimulationEngine` trait for pluggable long-running computations
//! - cooperative cancellation token
//! - progress/outcome vocabulary shared with the execution controller
//! - a built-in 1-D thermal diffusion demo engine

pub mod cancel;
pub mod diffusion;
pub mod engine;
pub mod error;

pub use cancel::CancelToken;
pub use diffusion::DiffusionEngine;
pub use engine::{EngineDirective, EngineOutcome, EngineProgress, SimulationEngine};
pub use error::{EngineError, EngineResult};
