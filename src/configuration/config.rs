//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – global engine options (dimension, force model, Barnes–Hut)
//! - [`ParametersConfig`] – numerical parameters and physical constants
//! - [`BodySource`]       – where the initial bodies come from
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example planar scenario matching these types:
//!
//! ```yaml
//! engine:
//!   enable_z: false         # false -> quadtree on z = 0, true -> octree
//!   force_model: barnes_hut # or "direct"
//!   theta: 1.0
//!   radius: 10.0            # universe radius
//!
//! parameters:
//!   t_end: 10.0             # total simulation time
//!   dt: 0.01                # step size
//!   G: 1.0                  # gravitational constant
//!
//! bodies:
//!   list:
//!     - x: [ -0.5, 0.0 ]
//!       v: [  0.0, 1.0 ]
//!       m: 1.0
//!     - x: [  0.5, 0.0 ]
//!       v: [  0.0, -1.0 ]
//!       m: 1.0
//! ```
//!
//! `bodies` may instead name a galaxy file (`galaxy: galaxies/pair.txt`,
//! resolved relative to the scenario file) or ask for generated bodies
//! (`random:` / `clusters:`).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::simulation::engine::{ForceModel, DEFAULT_MAX_DEPTH, DEFAULT_THETA};
use crate::simulation::params::G_SI;
use crate::simulation::states::{Body, Rgb};
use crate::simulation::vector::NVec3;

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    #[serde(default)]
    pub enable_z: bool, // `false` - planar simulation, `true` - full 3D
    #[serde(default)]
    pub force_model: ForceModel, // barnes_hut (default) or direct summation
    pub theta: Option<f64>, // opening threshold, defaults to 1.0
    pub radius: Option<f64>, // universe radius; ignored for galaxy files, which carry their own
    pub max_depth: Option<usize>, // tree depth limit for coincident bodies
    #[serde(default)]
    pub parallel: bool, // parallel force pass
}

/// Global numerical and physical parameters for a scenario
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub t_end: f64, // time end
    pub dt: f64, // time step size
    #[serde(default)]
    pub eps2: f64, // softening, 0 = plain Newtonian
    #[serde(default = "default_seed")]
    pub seed: u64, // seed for generated bodies
    #[serde(default = "default_g")]
    pub G: f64, // gravitational constant
}

fn default_seed() -> u64 {
    42
}

fn default_g() -> f64 {
    G_SI
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: Vec<f64>, // position, 2 or 3 components
    pub v: Vec<f64>, // velocity, 2 or 3 components
    pub m: f64, // mass
    #[serde(default)]
    pub radius: f64, // visual radius
    pub color: Option<Rgb>,
}

/// Knobs shared by the procedural generators. Unset values scale with the
/// universe radius.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct GeneratorConfig {
    pub mass_min: Option<f64>,
    pub mass_max: Option<f64>,
    pub velocity_range: Option<f64>,
    pub body_radius: Option<f64>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RandomConfig {
    pub count: usize,
    #[serde(flatten)]
    pub generator: GeneratorConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ClusterConfig {
    pub center: Vec<f64>,
    pub count: usize,
    pub spread: f64, // half-width of the cube the members are scattered in
    pub core_mass: Option<f64>,
    #[serde(flatten)]
    pub generator: GeneratorConfig,
}

/// Where the initial bodies of a scenario come from
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub enum BodySource {
    List(Vec<BodyConfig>),
    Galaxy(String),
    Random(RandomConfig),
    Clusters(Vec<ClusterConfig>),
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub bodies: BodySource, // `list:`, `galaxy:`, `random:` or `clusters:` key
}

impl EngineConfig {
    pub fn theta(&self) -> f64 {
        self.theta.unwrap_or(DEFAULT_THETA)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("failed to parse scenario YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open scenario {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).with_context(|| format!("failed to parse scenario {}", path.display()))
    }
}

/// Read a 2- or 3-component vector; a missing z is 0.
pub fn vec_from_slice(values: &[f64], what: &str) -> Result<NVec3> {
    match values {
        [x, y] => Ok(NVec3::new(*x, *y, 0.0)),
        [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
        _ => bail!("{what} needs 2 or 3 components, got {}", values.len()),
    }
}

impl BodyConfig {
    pub fn to_body(&self) -> Result<Body> {
        if !(self.m > 0.0) {
            bail!("body mass must be positive, got {}", self.m);
        }
        let body = Body::new(vec_from_slice(&self.x, "position")?, vec_from_slice(&self.v, "velocity")?, self.m)
            .with_radius(self.radius);
        Ok(match self.color {
            Some(c) => body.with_color(c),
            None => body,
        })
    }
}
