use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simulation constants for one run.
///
/// A parameter set is fixed for the lifetime of a run; changing any value
/// means starting a new run with a freshly seeded grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Initial ambient vapor density, expected in `[0, 1]`.
    pub rho: f32,
    /// Boundary-mass threshold for attachment with 1–2 attached neighbors.
    pub beta: f32,
    /// Boundary-mass threshold for the low-vapor attachment rule.
    pub alpha: f32,
    /// Nearby-vapor ceiling for the low-vapor attachment rule.
    pub theta: f32,
    /// Fraction of vapor that freezes directly to crystal at boundary sites.
    pub kappa: f32,
    /// Fraction of boundary mass that melts back to vapor per generation.
    pub mu: f32,
    /// Fraction of crystal mass that melts back to vapor per generation.
    pub gamma: f32,
}

impl Default for Params {
    /// Reference parameter set for a slowly growing dendrite.
    fn default() -> Self {
        Self {
            rho: 0.635,
            beta: 1.6,
            alpha: 0.4,
            theta: 0.025,
            kappa: 0.005,
            mu: 0.015,
            gamma: 0.0005,
        }
    }
}

impl Params {
    /// Checks that every parameter is non-negative and `rho` is in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("rho", self.rho),
            ("beta", self.beta),
            ("alpha", self.alpha),
            ("theta", self.theta),
            ("kappa", self.kappa),
            ("mu", self.mu),
            ("gamma", self.gamma),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeParameter { name, value });
            }
        }
        if self.rho > 1.0 {
            return Err(ConfigError::RhoOutOfRange { value: self.rho });
        }
        Ok(())
    }
}

/// Rejected run configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    NonPositiveDimensions { width: usize, height: usize },
    #[error("parameter `{name}` must be a non-negative finite number, got {value}")]
    NegativeParameter { name: &'static str, value: f32 },
    #[error("parameter `rho` must lie in [0, 1], got {value}")]
    RhoOutOfRange { value: f32 },
}
