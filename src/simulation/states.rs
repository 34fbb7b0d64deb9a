//! Core state types for the N-body simulation.
//!
//! - `Body`: a point mass with its force accumulator
//! - `System`: the body collection and the current simulation time `t`
//!
//! A body's identity is its index in `System::bodies`. The tree stores
//! copies of bodies, so self-interaction is excluded by index, never by
//! comparing positions or masses.

#![allow(non_snake_case)]

use super::bounds::Bounds;
use super::error::SimResult;
use super::vector::{NVec3, VectorExt};

/// RGB color carried for presentation layers; physics never reads it.
pub type Rgb = [u8; 3];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub f: NVec3, // force accumulated this tick
    pub m: f64, // mass
    pub radius: f64, // visual radius
    pub color: Rgb, // visual color
}

impl Body {
    pub fn new(x: NVec3, v: NVec3, m: f64) -> Self {
        Self {
            x,
            v,
            f: NVec3::zeros(),
            m,
            radius: 0.0,
            color: [255, 255, 255],
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Add the gravitational pull of `other` on `self` to the force accumulator.
    ///
    /// Magnitude is `G * m_self * m_other / (r^2 + eps2)`, directed from
    /// `self` toward `other`. Coincident positions have no direction and
    /// fail with [`SimError::DegenerateNormal`](super::error::SimError);
    /// callers attach the body indices.
    pub fn accumulate_force_from(&mut self, other: &Body, G: f64, eps2: f64) -> SimResult<()> {
        let mut dir = other.x - self.x;
        let r = dir.length();
        dir.normalize_checked()?;

        let magnitude = G * self.m * other.m / (r * r + eps2);
        self.f += dir * magnitude;
        Ok(())
    }

    pub fn reset_force(&mut self) {
        self.f.reset();
    }

    /// Semi-implicit Euler: the velocity kick uses the current force, the
    /// position drift uses the updated velocity.
    pub fn integrate(&mut self, dt: f64) {
        self.v += self.f * (dt / self.m);
        self.x += self.v * dt;
    }

    /// Combine with `other` into a pseudo-body at the mass-weighted centroid.
    ///
    /// Velocity, radius and color are copied from `self` and carry no meaning.
    pub fn merge_with(&self, other: &Body) -> Body {
        let m = self.m + other.m;
        let x = (self.x * self.m + other.x * other.m) / m;
        Body {
            x,
            v: self.v,
            f: NVec3::zeros(),
            m,
            radius: self.radius,
            color: self.color,
        }
    }

    pub fn distance_to(&self, other: &Body) -> f64 {
        self.x.distance_to(&other.x)
    }

    pub fn octant_in(&self, bounds: &Bounds, enable_z: bool) -> usize {
        bounds.octant_of(&self.x, enable_z)
    }

    pub fn is_inside(&self, bounds: &Bounds) -> bool {
        bounds.contains(&self.x)
    }

    /// Linear momentum `m * v`.
    pub fn momentum(&self) -> NVec3 {
        self.v * self.m
    }
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>, // collection of bodies
    pub t: f64, // time
}

impl System {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies, t: 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::error::SimError;
    use approx::assert_relative_eq;

    fn body(x: f64, y: f64, z: f64, m: f64) -> Body {
        Body::new(NVec3::new(x, y, z), NVec3::zeros(), m)
    }

    #[test]
    fn merge_conserves_mass_and_weights_centroid() {
        let a = body(0.0, 0.0, 0.0, 1.0);
        let b = body(4.0, 8.0, -4.0, 3.0);
        let p = a.merge_with(&b);

        assert_relative_eq!(p.m, 4.0);
        assert_relative_eq!(p.x.x, 3.0);
        assert_relative_eq!(p.x.y, 6.0);
        assert_relative_eq!(p.x.z, -3.0);
        assert_eq!(p.f, NVec3::zeros());
    }

    #[test]
    fn merge_is_associative_in_mass_and_centroid() {
        let a = body(1.0, 0.0, 0.0, 2.0);
        let b = body(-1.0, 3.0, 0.0, 5.0);
        let c = body(0.0, -2.0, 7.0, 1.5);

        let left = a.merge_with(&b).merge_with(&c);
        let right = a.merge_with(&b.merge_with(&c));
        assert_relative_eq!(left.m, right.m);
        assert_relative_eq!((left.x - right.x).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn force_points_toward_other_and_follows_inverse_square() {
        let mut a = body(0.0, 0.0, 0.0, 2.0);
        let b = body(2.0, 0.0, 0.0, 3.0);

        a.accumulate_force_from(&b, 1.0, 0.0).unwrap();
        assert_relative_eq!(a.f.x, 2.0 * 3.0 / 4.0);
        assert_relative_eq!(a.f.y, 0.0);

        let mut far = body(0.0, 0.0, 0.0, 2.0);
        let b2 = body(4.0, 0.0, 0.0, 3.0);
        far.accumulate_force_from(&b2, 1.0, 0.0).unwrap();
        assert_relative_eq!(a.f.x / far.f.x, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn forces_accumulate_until_reset() {
        let mut a = body(0.0, 0.0, 0.0, 1.0);
        let b = body(0.0, 1.0, 0.0, 1.0);
        a.accumulate_force_from(&b, 1.0, 0.0).unwrap();
        a.accumulate_force_from(&b, 1.0, 0.0).unwrap();
        assert_relative_eq!(a.f.y, 2.0);

        a.reset_force();
        assert_eq!(a.f, NVec3::zeros());
    }

    #[test]
    fn softening_bounds_close_encounters() {
        let mut a = body(0.0, 0.0, 0.0, 1.0);
        let b = body(1e-9, 0.0, 0.0, 1.0);
        a.accumulate_force_from(&b, 1.0, 0.1).unwrap();
        assert!(a.f.norm() < 10.0 + 1e-6);
    }

    #[test]
    fn coincident_bodies_fail() {
        let mut a = body(1.0, 1.0, 1.0, 1.0);
        let b = body(1.0, 1.0, 1.0, 1.0);
        assert_eq!(a.accumulate_force_from(&b, 1.0, 0.0), Err(SimError::DegenerateNormal));
        assert_eq!(a.f, NVec3::zeros());
    }

    #[test]
    fn integrate_kicks_then_drifts() {
        let mut a = Body::new(NVec3::zeros(), NVec3::new(1.0, 0.0, 0.0), 2.0);
        a.f = NVec3::new(0.0, 4.0, 0.0);
        a.integrate(0.5);

        // v = (1, 0 + 4 * 0.5 / 2, 0) = (1, 1, 0); x = v * 0.5
        assert_relative_eq!(a.v.y, 1.0);
        assert_relative_eq!(a.x.x, 0.5);
        assert_relative_eq!(a.x.y, 0.5);
    }

    #[test]
    fn bounds_delegation() {
        let b = Bounds::universe(1.0, true);
        let inside = body(0.5, -0.5, 0.5, 1.0);
        let outside = body(1.5, 0.0, 0.0, 1.0);
        assert!(inside.is_inside(&b));
        assert!(!outside.is_inside(&b));
        assert_eq!(inside.octant_in(&b, true), b.octant_of(&inside.x, true));
    }
}
