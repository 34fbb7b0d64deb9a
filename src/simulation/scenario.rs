//! Step driver: a fully-initialized simulation and its per-tick update.
//!
//! [`Simulation`] bundles:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - system state (`System`, bodies and time)
//! - the initial bodies, for `restart`
//!
//! One [`Simulation::step`] rebuilds the tree from the current positions,
//! accumulates every force from that tree, then integrates. Bodies outside
//! the universe at the start of a tick are frozen for that tick.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use crate::configuration::config::{vec_from_slice, BodySource, ScenarioConfig};
use crate::configuration::galaxy::load_galaxy;
use crate::configuration::generate::{default_body_radius, Generator, GeneratorSettings, DEFAULT_CORE_MASS};
use crate::simulation::barnes_hut::{BarnesHutTree, TraversalStats, TreeOptions};
use crate::simulation::diagnostics::Diagnostics;
use crate::simulation::engine::{Engine, ForceModel};
use crate::simulation::error::{SimError, SimResult};
use crate::simulation::forces::{direct_forces, tree_forces};
use crate::simulation::integrator::symplectic_euler;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, System};

/// Outcome of one tick.
#[derive(Debug)]
pub struct StepReport {
    pub t: f64, // time after the step
    pub advanced: usize, // bodies that received forces and were integrated
    pub out_of_bounds: usize, // bodies frozen because they left the universe
    pub rejected: Vec<SimError>, // bodies the tree refused (depth limit)
    pub stats: TraversalStats,
    pub tree: Option<BarnesHutTree>, // the tick's tree, for overlays
}

#[derive(Debug, Clone)]
pub struct Simulation {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: System,
    initial: Vec<Body>,
}

impl Simulation {
    pub fn new(engine: Engine, parameters: Parameters, bodies: Vec<Body>) -> SimResult<Self> {
        engine.validate()?;
        parameters.validate()?;
        if let Some(b) = bodies.iter().find(|b| !(b.m > 0.0)) {
            return Err(SimError::invalid_params(format!("body mass must be positive, got {}", b.m)));
        }

        Ok(Self {
            engine,
            parameters,
            system: System::new(bodies.clone()),
            initial: bodies,
        })
    }

    /// Build a simulation from a scenario. Relative galaxy paths resolve
    /// against `base_dir`.
    pub fn build_scenario(cfg: ScenarioConfig, base_dir: &Path) -> Result<Self> {
        let e_cfg = &cfg.engine;
        let p_cfg = cfg.parameters;

        let mut generator = Generator::new(p_cfg.seed, e_cfg.enable_z);
        let configured_radius = e_cfg.radius;
        let need_radius = || configured_radius.context("engine.radius is required for this body source");

        let (radius, bodies) = match &cfg.bodies {
            BodySource::List(list) => {
                let bodies = list
                    .iter()
                    .enumerate()
                    .map(|(i, bc)| -> Result<Body> {
                        let b = bc.to_body().with_context(|| format!("body {i}"))?;
                        // a planar universe has no room off z = 0
                        if !e_cfg.enable_z && (b.x.z != 0.0 || b.v.z != 0.0) {
                            bail!("body {i}: nonzero z component but engine.enable_z is false");
                        }
                        Ok(b)
                    })
                    .collect::<Result<Vec<_>>>()?;
                (need_radius()?, bodies)
            }
            BodySource::Galaxy(rel) => {
                let galaxy = load_galaxy(&base_dir.join(rel), default_body_radius)?;
                if let Some(r) = configured_radius {
                    debug!(configured = r, file = galaxy.radius, "galaxy radius overrides engine.radius");
                }
                (galaxy.radius, galaxy.bodies)
            }
            BodySource::Random(r) => {
                let radius = need_radius()?;
                let s = GeneratorSettings::resolve(&r.generator, radius)?;
                (radius, generator.random(r.count, radius, &s))
            }
            BodySource::Clusters(clusters) => {
                let radius = need_radius()?;
                let mut bodies = Vec::new();
                for (i, c) in clusters.iter().enumerate() {
                    let s = GeneratorSettings::resolve(&c.generator, radius).with_context(|| format!("cluster {i}"))?;
                    let center = vec_from_slice(&c.center, "cluster center").with_context(|| format!("cluster {i}"))?;
                    let core = c.core_mass.unwrap_or(DEFAULT_CORE_MASS);
                    bodies.extend(generator.cluster(center, c.count, c.spread, core, &s));
                }
                (radius, bodies)
            }
        };

        let engine = Engine {
            enable_z: e_cfg.enable_z,
            force_model: e_cfg.force_model,
            theta: e_cfg.theta(),
            radius,
            max_depth: e_cfg.max_depth(),
            parallel: e_cfg.parallel,
        };

        let parameters = Parameters {
            t_end: p_cfg.t_end,
            dt: p_cfg.dt,
            eps2: p_cfg.eps2,
            seed: p_cfg.seed,
            G: p_cfg.G,
        };

        let sim = Self::new(engine, parameters, bodies)?;
        info!(
            bodies = sim.system.bodies.len(),
            radius = sim.engine.radius,
            theta = sim.engine.theta,
            enable_z = sim.engine.enable_z,
            "scenario built"
        );
        Ok(sim)
    }

    /// Advance the system by one step of `parameters.dt`.
    ///
    /// A numerical singularity aborts the tick before any body is
    /// integrated; positions and velocities are then unchanged.
    pub fn step(&mut self) -> SimResult<StepReport> {
        let root = self.engine.root_bounds();
        let bodies = &mut self.system.bodies;
        let mut active = vec![false; bodies.len()];
        let mut out_of_bounds = 0;
        let mut rejected = Vec::new();
        let mut stats = TraversalStats::default();
        let mut tree = None;

        match self.engine.force_model {
            ForceModel::BarnesHut => {
                let opts = TreeOptions::new(&self.engine, &self.parameters);
                let mut t = BarnesHutTree::new(root, opts);
                for (i, b) in bodies.iter().enumerate() {
                    // outside the universe: frozen until it comes back
                    if !b.is_inside(&root) {
                        debug!(index = i, "outside the universe, frozen");
                        out_of_bounds += 1;
                        continue;
                    }
                    match t.insert(i, b) {
                        Ok(()) => active[i] = true,
                        Err(e) if e.is_recoverable() => {
                            warn!(error = %e, "body left out of this tick");
                            rejected.push(e);
                        }
                        Err(e) => return Err(e),
                    }
                }
                stats = tree_forces(&t, bodies, &active, self.engine.parallel)?;
                tree = Some(t);
            }
            ForceModel::Direct => {
                for (i, b) in bodies.iter().enumerate() {
                    if b.is_inside(&root) {
                        active[i] = true;
                    } else {
                        out_of_bounds += 1;
                    }
                }
                direct_forces(bodies, &active, self.parameters.G, self.parameters.eps2, self.engine.parallel)?;
            }
        }

        symplectic_euler(bodies, &active, self.parameters.dt);
        self.system.t += self.parameters.dt;

        let advanced = active.iter().filter(|a| **a).count();
        debug!(
            t = self.system.t,
            advanced,
            out_of_bounds,
            rejected = rejected.len(),
            nodes_visited = stats.nodes_visited,
            approximations = stats.approximations,
            "step"
        );

        Ok(StepReport {
            t: self.system.t,
            advanced,
            out_of_bounds,
            rejected,
            stats,
            tree,
        })
    }

    /// Step until `t_end` is reached or `max_steps` have run.
    pub fn run(&mut self, max_steps: Option<usize>) -> SimResult<usize> {
        let mut steps = 0;
        while self.system.t < self.parameters.t_end && max_steps.map_or(true, |m| steps < m) {
            self.step()?;
            steps += 1;
        }
        Ok(steps)
    }

    pub fn dt(&self) -> f64 {
        self.parameters.dt
    }

    pub fn set_dt(&mut self, dt: f64) -> SimResult<()> {
        if !(dt > 0.0) {
            return Err(SimError::invalid_params(format!("dt must be positive, got {dt}")));
        }
        self.parameters.dt = dt;
        Ok(())
    }

    /// Speed the simulation up or down by `delta`.
    pub fn adjust_dt(&mut self, delta: f64) -> SimResult<()> {
        self.set_dt(self.parameters.dt + delta)
    }

    /// Back to the initial bodies at `t = 0`; `dt` keeps its current value.
    pub fn restart(&mut self) {
        self.system = System::new(self.initial.clone());
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::measure(&self.system.bodies, self.parameters.G, self.parameters.eps2)
    }
}
