//! High-level runtime engine settings
//!
//! Selects dimension (2D/3D), the force model, Barnes–Hut options and the
//! universe extent used when building and running a `Simulation`

use serde::Deserialize;

use super::bounds::Bounds;
use super::error::{SimError, SimResult};

/// Canonical Barnes–Hut opening threshold.
pub const DEFAULT_THETA: f64 = 1.0;

/// Depth at which the tree stops trying to separate coincident bodies.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How forces are accumulated each tick
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceModel {
    #[serde(rename = "barnes_hut")] // octree approximation, O(n log n)
    #[default]
    BarnesHut,

    #[serde(rename = "direct")] // exact pairwise sum, O(n^2), reference
    Direct,
}

#[derive(Debug, Clone)]
pub struct Engine {
    pub enable_z: bool, // false = quadtree on the z = 0 plane, true = octree
    pub force_model: ForceModel, // barnes-hut or direct
    pub theta: f64, // opening threshold: approximate a node when size / distance <= theta
    pub radius: f64, // universe radius, root cell is [-radius, radius]
    pub max_depth: usize, // tree depth limit for coincident bodies
    pub parallel: bool, // run the per-body force pass on rayon
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            enable_z: false,
            force_model: ForceModel::BarnesHut,
            theta: DEFAULT_THETA,
            radius: 2.838e6,
            max_depth: DEFAULT_MAX_DEPTH,
            parallel: false,
        }
    }
}

impl Engine {
    /// Root cell for the configured universe.
    pub fn root_bounds(&self) -> Bounds {
        Bounds::universe(self.radius, self.enable_z)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.radius > 0.0) || !self.radius.is_finite() {
            return Err(SimError::invalid_params(format!("radius must be positive, got {}", self.radius)));
        }
        if !(self.theta >= 0.0) {
            return Err(SimError::invalid_params(format!("theta must be non-negative, got {}", self.theta)));
        }
        if self.max_depth == 0 {
            return Err(SimError::invalid_params("max_depth must be at least 1"));
        }
        Ok(())
    }
}
