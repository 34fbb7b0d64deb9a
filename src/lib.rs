pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::vector::{NVec3, VectorExt};
pub use simulation::bounds::Bounds;
pub use simulation::states::{Body, System, Rgb};
pub use simulation::error::{SimError, SimResult};
pub use simulation::params::Parameters;
pub use simulation::engine::{Engine, ForceModel};
pub use simulation::barnes_hut::{BarnesHutTree, NodeKind, NodeView, TraversalStats, TreeOptions};
pub use simulation::forces::{direct_forces, tree_forces};
pub use simulation::integrator::symplectic_euler;
pub use simulation::diagnostics::Diagnostics;
pub use simulation::scenario::{Simulation, StepReport};

pub use configuration::config::{ScenarioConfig, EngineConfig, ParametersConfig, BodyConfig, BodySource};
pub use configuration::galaxy::{read_galaxy, load_galaxy, Galaxy};
pub use configuration::generate::{Generator, GeneratorSettings};

pub use benchmark::benchmark::{bench_forces, bench_steps};
