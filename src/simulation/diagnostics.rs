//! Conserved-quantity diagnostics used by the run loop and the tests.

#![allow(non_snake_case)]

use super::states::Body;
use super::vector::NVec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    pub total_mass: f64,
    pub momentum: NVec3,
    pub center_of_mass: NVec3,
    pub kinetic: f64,
    pub potential: f64,
}

impl Diagnostics {
    /// Measure `bodies`. The potential is a direct pairwise sum with the same
    /// softening as the force law, so this is O(N²).
    pub fn measure(bodies: &[Body], G: f64, eps2: f64) -> Self {
        let total_mass: f64 = bodies.iter().map(|b| b.m).sum();
        let momentum = bodies.iter().fold(NVec3::zeros(), |acc, b| acc + b.momentum());
        let weighted = bodies.iter().fold(NVec3::zeros(), |acc, b| acc + b.x * b.m);
        let center_of_mass = if total_mass > 0.0 { weighted / total_mass } else { NVec3::zeros() };

        let kinetic = bodies.iter().map(|b| 0.5 * b.m * b.v.norm_squared()).sum();

        let mut potential = 0.0;
        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                let d2 = (b.x - a.x).norm_squared() + eps2;
                if d2 > 0.0 {
                    potential -= G * a.m * b.m / d2.sqrt();
                }
            }
        }

        Self { total_mass, momentum, center_of_mass, kinetic, potential }
    }

    pub fn total_energy(&self) -> f64 {
        self.kinetic + self.potential
    }
}
