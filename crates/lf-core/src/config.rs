//! Simulation configuration and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid configuration: {what}")]
    Invalid { what: &'static str },
}

/// Parameters for a 1-D thermal relaxation run.
///
/// The engine is free to interpret these; the controller only validates them
/// before claiming ownership of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Number of spatial cells along the rod
    pub cells: usize,
    /// Rod length (meters)
    pub length_m: f64,
    /// Thermal diffusivity (m^2/s)
    pub diffusivity_m2_s: f64,
    /// Fixed time step (seconds)
    pub dt_s: f64,
    /// Final simulation time (seconds)
    pub t_end_s: f64,
    /// Emit a snapshot every N-th step (decimation)
    pub record_every: usize,
    /// Uniform initial temperature (K)
    pub initial_temperature_k: f64,
    /// Fixed temperature at both rod ends (K)
    pub boundary_temperature_k: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cells: 50,
            length_m: 1.0,
            diffusivity_m2_s: 1.0e-4,
            dt_s: 1.0,
            t_end_s: 100.0,
            record_every: 10,
            initial_temperature_k: 300.0,
            boundary_temperature_k: 350.0,
        }
    }
}

impl SimulationConfig {
    /// Check the configuration before any run state is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cells < 2 {
            return Err(ConfigError::Invalid {
                what: "cells must be at least 2",
            });
        }
        if !self.length_m.is_finite() || self.length_m <= 0.0 {
            return Err(ConfigError::Invalid {
                what: "length_m must be finite and positive",
            });
        }
        if !self.diffusivity_m2_s.is_finite() || self.diffusivity_m2_s <= 0.0 {
            return Err(ConfigError::Invalid {
                what: "diffusivity_m2_s must be finite and positive",
            });
        }
        if !self.dt_s.is_finite() || self.dt_s <= 0.0 {
            return Err(ConfigError::Invalid {
                what: "dt_s must be finite and positive",
            });
        }
        if !self.t_end_s.is_finite() || self.t_end_s < 0.0 {
            return Err(ConfigError::Invalid {
                what: "t_end_s must be finite and non-negative",
            });
        }
        if self.record_every == 0 {
            return Err(ConfigError::Invalid {
                what: "record_every must be positive",
            });
        }
        if !self.initial_temperature_k.is_finite() || self.initial_temperature_k <= 0.0 {
            return Err(ConfigError::Invalid {
                what: "initial_temperature_k must be finite and positive",
            });
        }
        if !self.boundary_temperature_k.is_finite() || self.boundary_temperature_k <= 0.0 {
            return Err(ConfigError::Invalid {
                what: "boundary_temperature_k must be finite and positive",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_grid() {
        let config = SimulationConfig {
            cells: 1,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_dt() {
        let config = SimulationConfig {
            dt_s: 0.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_nan_diffusivity() {
        let config = SimulationConfig {
            diffusivity_m2_s: f64::NAN,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_decimation() {
        let config = SimulationConfig {
            record_every: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_t_end_is_allowed() {
        let config = SimulationConfig {
            t_end_s: 0.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
