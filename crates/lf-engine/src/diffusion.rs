//! Built-in demo engine: explicit 1-D thermal diffusion.
//!
//! Relaxes a uniform rod toward its boundary temperature with the FTCS
//! scheme. Snapshots are emitted at t=0, every `record_every`-th step, and
//! for the final state; the cancel token is polled once per step.

use lf_core::{
    DerivedScalar, DerivedSnapshot, FieldSeries, ProfileSnapshot, SimulationConfig, SnapshotRecord,
};

use crate::cancel::CancelToken;
use crate::engine::{EngineDirective, EngineOutcome, EngineProgress, SimulationEngine};
use crate::error::{EngineError, EngineResult};

pub const TEMPERATURE_FIELD: &str = "temperature_k";

#[derive(Debug, Clone, Copy, Default)]
pub struct DiffusionEngine;

impl DiffusionEngine {
    fn snapshot(time_s: f64, positions_m: &[f64], temperatures: &[f64]) -> SnapshotRecord {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &t in temperatures {
            min = min.min(t);
            max = max.max(t);
            sum += t;
        }
        let mean = sum / temperatures.len() as f64;

        SnapshotRecord {
            time_s,
            profile: ProfileSnapshot {
                positions_m: positions_m.to_vec(),
                fields: vec![FieldSeries {
                    name: TEMPERATURE_FIELD.to_string(),
                    values: temperatures.to_vec(),
                }],
            },
            derived: Some(DerivedSnapshot {
                scalars: vec![
                    DerivedScalar {
                        name: "min_temperature_k".to_string(),
                        value: min,
                    },
                    DerivedScalar {
                        name: "max_temperature_k".to_string(),
                        value: max,
                    },
                    DerivedScalar {
                        name: "mean_temperature_k".to_string(),
                        value: mean,
                    },
                ],
            }),
        }
    }
}

impl SimulationEngine for DiffusionEngine {
    fn run(
        &self,
        config: &SimulationConfig,
        cancel: &CancelToken,
        emit: &mut dyn FnMut(EngineProgress) -> EngineDirective,
    ) -> EngineResult<EngineOutcome> {
        if config.cells < 2 {
            return Err(EngineError::InvalidArg {
                what: "cells must be at least 2",
            });
        }
        if config.dt_s <= 0.0 {
            return Err(EngineError::InvalidArg {
                what: "dt_s must be positive",
            });
        }
        if config.record_every == 0 {
            return Err(EngineError::InvalidArg {
                what: "record_every must be positive",
            });
        }

        let n = config.cells;
        let dx = config.length_m / (n as f64 - 1.0);
        let r = config.diffusivity_m2_s * config.dt_s / (dx * dx);
        if !r.is_finite() || r > 0.5 {
            // FTCS blows up beyond r = 1/2
            return Err(EngineError::NonPhysical {
                what: "diffusion number exceeds FTCS stability limit",
            });
        }

        let positions_m: Vec<f64> = (0..n).map(|i| i as f64 * dx).collect();
        let mut temperatures = vec![config.initial_temperature_k; n];
        temperatures[0] = config.boundary_temperature_k;
        temperatures[n - 1] = config.boundary_temperature_k;

        let mut t = 0.0;
        let mut step = 0usize;

        if emit(EngineProgress {
            step,
            record: Self::snapshot(t, &positions_m, &temperatures),
        }) == EngineDirective::Halt
        {
            return Ok(EngineOutcome::Stopped { steps: step });
        }

        let mut emitted_at_step = 0usize;
        while t < config.t_end_s {
            if cancel.is_cancelled() {
                tracing::info!(step, "diffusion run observed cancellation");
                return Ok(EngineOutcome::Stopped { steps: step });
            }

            let mut next = temperatures.clone();
            for i in 1..n - 1 {
                next[i] = temperatures[i]
                    + r * (temperatures[i + 1] - 2.0 * temperatures[i] + temperatures[i - 1]);
            }
            temperatures = next;
            t += config.dt_s;
            step += 1;

            if step % config.record_every == 0 {
                emitted_at_step = step;
                if emit(EngineProgress {
                    step,
                    record: Self::snapshot(t, &positions_m, &temperatures),
                }) == EngineDirective::Halt
                {
                    return Ok(EngineOutcome::Stopped { steps: step });
                }
            }
        }

        // Always record the final state
        if step != emitted_at_step
            && emit(EngineProgress {
                step,
                record: Self::snapshot(t, &positions_m, &temperatures),
            }) == EngineDirective::Halt
        {
            return Ok(EngineOutcome::Stopped { steps: step });
        }

        Ok(EngineOutcome::Completed { steps: step })
    }
}
