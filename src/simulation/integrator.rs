//! Fixed-step time integration for the N-body system
//!
//! Semi-implicit (symplectic) Euler: kick the velocity with the force
//! accumulated this tick, then drift the position with the new velocity.

use super::states::Body;

/// Advance every active body by `dt` using its accumulated force.
///
/// Inactive bodies are left untouched.
pub fn symplectic_euler(bodies: &mut [Body], active: &[bool], dt: f64) {
    for (b, _) in bodies.iter_mut().zip(active).filter(|(_, a)| **a) {
        b.integrate(dt);
    }
}
