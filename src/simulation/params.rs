//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - integration step size and end time,
//! - softening and gravitational constant (`eps2`, `G`),
//! - random seed used by the body generators

use super::error::{SimError, SimResult};

/// Gravitational constant in SI units.
pub const G_SI: f64 = 6.6743e-11;

#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct Parameters {
    pub t_end: f64, // time end
    pub dt: f64, // step size, adjustable while running
    pub eps2: f64, // softening, 0 = plain Newtonian
    pub seed: u64, // deterministic seed
    pub G: f64, // gravitational constant
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            t_end: 100.0,
            dt: 0.1,
            eps2: 0.0,
            seed: 42,
            G: G_SI,
        }
    }
}

impl Parameters {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt > 0.0) {
            return Err(SimError::invalid_params(format!("dt must be positive, got {}", self.dt)));
        }
        if !(self.G > 0.0) {
            return Err(SimError::invalid_params(format!("G must be positive, got {}", self.G)));
        }
        if !(self.eps2 >= 0.0) {
            return Err(SimError::invalid_params(format!("eps2 must be non-negative, got {}", self.eps2)));
        }
        if !(self.t_end >= 0.0) {
            return Err(SimError::invalid_params(format!("t_end must be non-negative, got {}", self.t_end)));
        }
        Ok(())
    }
}
