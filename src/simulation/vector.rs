//! 3D vector type and the few operations nalgebra does not spell the way
//! the tree needs them.
//!
//! Arithmetic (`+`, `-`, scalar `*` and `/`, `norm`) comes straight from
//! [`nalgebra::Vector3`]. [`VectorExt`] adds distance, componentwise
//! ordering for containment tests, in-place reset, and a normalization
//! that reports the zero-length case instead of producing NaNs.

use nalgebra::Vector3;

use super::error::{SimError, SimResult};

pub type NVec3 = Vector3<f64>;

pub trait VectorExt {
    /// Euclidean distance to `other`.
    fn distance_to(&self, other: &Self) -> f64;

    /// Distance to the origin.
    fn length(&self) -> f64;

    /// Scale to unit length in place. Fails on a zero-length vector.
    fn normalize_checked(&mut self) -> SimResult<()>;

    /// Zero all components in place.
    fn reset(&mut self);

    /// True if `self >= other` holds on every axis.
    fn ge_all(&self, other: &Self) -> bool;

    /// True if `self <= other` holds on every axis.
    fn le_all(&self, other: &Self) -> bool;
}

impl VectorExt for NVec3 {
    fn distance_to(&self, other: &Self) -> f64 {
        (self - other).norm()
    }

    fn length(&self) -> f64 {
        self.norm()
    }

    fn normalize_checked(&mut self) -> SimResult<()> {
        let len = self.norm();
        if len == 0.0 || !len.is_finite() {
            return Err(SimError::DegenerateNormal);
        }
        *self /= len;
        Ok(())
    }

    fn reset(&mut self) {
        self.fill(0.0);
    }

    fn ge_all(&self, other: &Self) -> bool {
        self.x >= other.x && self.y >= other.y && self.z >= other.z
    }

    fn le_all(&self, other: &Self) -> bool {
        self.x <= other.x && self.y <= other.y && self.z <= other.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn distance_and_length() {
        let a = NVec3::new(1.0, 2.0, 2.0);
        let b = NVec3::new(4.0, 6.0, 2.0);
        assert_relative_eq!(a.distance_to(&b), 5.0);
        assert_relative_eq!(a.length(), 3.0);
        assert_relative_eq!(b.distance_to(&a), a.distance_to(&b));
    }

    #[test]
    fn normalize_gives_unit_length() {
        let mut v = NVec3::new(3.0, 0.0, 4.0);
        v.normalize_checked().unwrap();
        assert_relative_eq!(v.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.x, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn normalize_zero_is_an_error() {
        let mut v = NVec3::zeros();
        assert_eq!(v.normalize_checked(), Err(SimError::DegenerateNormal));
    }

    #[test]
    fn reset_zeroes_in_place() {
        let mut v = NVec3::new(1.0, -2.0, 3.0);
        v.reset();
        assert_eq!(v, NVec3::zeros());
    }

    #[test]
    fn componentwise_comparison_needs_every_axis() {
        let lo = NVec3::new(-1.0, -1.0, -1.0);
        let p = NVec3::new(0.0, 0.0, -1.0);
        assert!(p.ge_all(&lo));
        assert!(!lo.ge_all(&p));

        // one axis violating is enough to fail
        let q = NVec3::new(0.0, -2.0, 0.0);
        assert!(!q.ge_all(&lo));
        assert!(!q.le_all(&lo));
    }
}
