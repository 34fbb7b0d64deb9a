pub mod error;
pub mod vector;
pub mod bounds;
pub mod states;
pub mod params;
pub mod engine;
pub mod barnes_hut;
pub mod forces;
pub mod integrator;
pub mod diagnostics;
pub mod scenario;
