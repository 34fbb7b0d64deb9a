//! Axis-aligned cubic regions used as octree cells.
//!
//! Child octants are labelled with 3 bits, a set bit selecting the upper
//! half along that axis:
//!
//! ```text
//! child:  0 1 2 3 4 5 6 7
//! x:      - - - - + + + +
//! y:      - - + + - - + +
//! z:      - + - + - + - +
//! ```
//!
//! With the z-axis disabled the z bit is never produced, so only the
//! even children (0, 2, 4, 6) are ever occupied and the tree degenerates
//! to a quadtree.

use super::vector::{NVec3, VectorExt};

pub const X_BIT: usize = 4;
pub const Y_BIT: usize = 2;
pub const Z_BIT: usize = 1;

/// Number of child cells per internal node.
pub const OCTANTS: usize = 8;

/// Children reachable when the z-axis is disabled.
pub const PLANAR_OCTANTS: [usize; 4] = [0, 2, 4, 6];

/// A cube given by its `upper` and `lower` corners.
///
/// `center` and `length` are derived once at construction. The side
/// length is taken from the x-axis, so the corners must describe a cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    upper: NVec3,
    lower: NVec3,
    center: NVec3,
    length: f64,
}

impl Bounds {
    pub fn new(upper: NVec3, lower: NVec3) -> Self {
        Self {
            upper,
            lower,
            center: (upper + lower) * 0.5,
            length: (upper.x - lower.x).abs(),
        }
    }

    /// Root cell of a universe of the given radius.
    ///
    /// With `enable_z == false` the cell is flat in z (`z ∈ [0, 0]`), so only
    /// bodies on the `z = 0` plane are contained.
    pub fn universe(radius: f64, enable_z: bool) -> Self {
        let rz = if enable_z { radius } else { 0.0 };
        Self::new(NVec3::new(radius, radius, rz), NVec3::new(-radius, -radius, -rz))
    }

    pub fn upper(&self) -> NVec3 {
        self.upper
    }

    pub fn lower(&self) -> NVec3 {
        self.lower
    }

    pub fn center(&self) -> NVec3 {
        self.center
    }

    /// Side length of the cube.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// True if `p` lies between `lower` and `upper`, inclusive on every axis.
    pub fn contains(&self, p: &NVec3) -> bool {
        p.ge_all(&self.lower) && p.le_all(&self.upper)
    }

    /// Octant index of `p` relative to `center`.
    ///
    /// A coordinate equal to the center goes to the upper half.
    pub fn octant_of(&self, p: &NVec3, enable_z: bool) -> usize {
        let mut idx = 0;
        if p.x >= self.center.x { idx |= X_BIT; }
        if p.y >= self.center.y { idx |= Y_BIT; }
        if enable_z && p.z >= self.center.z { idx |= Z_BIT; }
        idx
    }

    /// The child cube for `octant`, split at `center`.
    pub fn subdivide(&self, octant: usize) -> Bounds {
        debug_assert!(octant < OCTANTS, "octant index out of range: {octant}");

        let mut lower = self.lower;
        let mut upper = self.upper;

        if octant & X_BIT == 0 { upper.x = self.center.x; } else { lower.x = self.center.x; }
        if octant & Y_BIT == 0 { upper.y = self.center.y; } else { lower.y = self.center.y; }
        if octant & Z_BIT == 0 { upper.z = self.center.z; } else { lower.z = self.center.z; }

        Bounds::new(upper, lower)
    }

    /// Volume of the box spanned by the corners.
    pub fn volume(&self) -> f64 {
        let d = self.upper - self.lower;
        (d.x * d.y * d.z).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit() -> Bounds {
        Bounds::new(NVec3::new(1.0, 1.0, 1.0), NVec3::new(-1.0, -1.0, -1.0))
    }

    #[test]
    fn derived_center_and_length() {
        let b = Bounds::new(NVec3::new(4.0, 6.0, 2.0), NVec3::new(2.0, 4.0, 0.0));
        assert_eq!(b.center(), NVec3::new(3.0, 5.0, 1.0));
        assert_relative_eq!(b.length(), 2.0);
    }

    #[test]
    fn subdivided_centers_lie_strictly_inside() {
        let b = unit();
        for i in 0..OCTANTS {
            let c = b.subdivide(i).center();
            assert!(c.x > -1.0 && c.x < 1.0);
            assert!(c.y > -1.0 && c.y < 1.0);
            assert!(c.z > -1.0 && c.z < 1.0);
            assert!(b.contains(&c));
        }
    }

    #[test]
    fn octants_tile_the_parent() {
        let b = Bounds::new(NVec3::new(3.0, 5.0, 7.0), NVec3::new(-1.0, 1.0, 3.0));
        let children: Vec<Bounds> = (0..OCTANTS).map(|i| b.subdivide(i)).collect();

        let total: f64 = children.iter().map(Bounds::volume).sum();
        assert_relative_eq!(total, b.volume(), epsilon = 1e-12);

        for (i, a) in children.iter().enumerate() {
            assert_relative_eq!(a.length(), b.length() / 2.0);
            for c in children.iter().skip(i + 1) {
                // interiors are disjoint if some axis separates them
                let separated = a.upper().x <= c.lower().x
                    || c.upper().x <= a.lower().x
                    || a.upper().y <= c.lower().y
                    || c.upper().y <= a.lower().y
                    || a.upper().z <= c.lower().z
                    || c.upper().z <= a.lower().z;
                assert!(separated, "children overlap: {a:?} / {c:?}");
            }
        }
    }

    #[test]
    fn octant_of_matches_subdivide() {
        let b = unit();
        let points = [
            NVec3::new(0.5, 0.5, 0.5),
            NVec3::new(-0.5, 0.25, 0.9),
            NVec3::new(-0.1, -0.7, -0.3),
            NVec3::new(0.9, -0.9, 0.1),
            NVec3::new(0.0, 0.0, 0.0),
            NVec3::new(-0.999, 0.999, -0.5),
        ];
        for p in points {
            let oct = b.octant_of(&p, true);
            assert!(b.subdivide(oct).contains(&p), "{p:?} not in octant {oct}");
        }
    }

    #[test]
    fn center_plane_goes_upper() {
        let b = unit();
        assert_eq!(b.octant_of(&NVec3::zeros(), true), X_BIT | Y_BIT | Z_BIT);
        assert_eq!(b.octant_of(&NVec3::new(0.0, -0.5, -0.5), true), X_BIT);
    }

    #[test]
    fn planar_classification_never_sets_z() {
        let b = Bounds::universe(10.0, false);
        assert_relative_eq!(b.length(), 20.0);
        for p in [NVec3::new(1.0, 1.0, 0.0), NVec3::new(-3.0, 2.0, 0.0), NVec3::new(0.0, -9.0, 0.0)] {
            let oct = b.octant_of(&p, false);
            assert_eq!(oct & Z_BIT, 0);
            assert!(PLANAR_OCTANTS.contains(&oct));
            assert!(b.subdivide(oct).contains(&p));
        }
    }

    #[test]
    fn containment_is_inclusive() {
        let b = unit();
        assert!(b.contains(&NVec3::new(1.0, -1.0, 1.0)));
        assert!(!b.contains(&NVec3::new(1.0 + 1e-9, 0.0, 0.0)));

        let flat = Bounds::universe(5.0, false);
        assert!(flat.contains(&NVec3::new(5.0, -5.0, 0.0)));
        assert!(!flat.contains(&NVec3::new(0.0, 0.0, 0.1)));
    }
}
