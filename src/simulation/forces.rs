//! Force passes for the n-body engine
//!
//! Both passes reset and then fill the force accumulator of every active
//! body. Inactive bodies (outside the universe or rejected by the tree)
//! are neither sources nor targets for the tick.
//!
//! - [`tree_forces`]: Barnes–Hut traversal of a tree built for this tick
//! - [`direct_forces`]: exact pairwise sum, the O(N²) reference

#![allow(non_snake_case)]

use rayon::prelude::*;

use crate::simulation::barnes_hut::{BarnesHutTree, TraversalStats};
use crate::simulation::error::{SimError, SimResult};
use crate::simulation::states::Body;

/// Accumulate Barnes–Hut forces for every active body.
///
/// The tree is only read, so with `parallel` the bodies are processed on
/// the rayon pool; each body writes only its own accumulator.
pub fn tree_forces(tree: &BarnesHutTree, bodies: &mut [Body], active: &[bool], parallel: bool) -> SimResult<TraversalStats> {
    let per_body = |(i, b): (usize, &mut Body)| -> SimResult<TraversalStats> {
        if !active[i] {
            return Ok(TraversalStats::default());
        }
        b.reset_force();
        tree.accumulate_force(i, b)
    };

    if parallel {
        bodies
            .par_iter_mut()
            .enumerate()
            .map(per_body)
            .try_reduce(TraversalStats::default, |mut a, b| {
                a += b;
                Ok(a)
            })
    } else {
        let mut total = TraversalStats::default();
        for item in bodies.iter_mut().enumerate() {
            total += per_body(item)?;
        }
        Ok(total)
    }
}

/// Accumulate exact pairwise forces for every active body.
///
/// Sources are snapshotted before any accumulator is touched, so the
/// result does not depend on iteration order.
pub fn direct_forces(bodies: &mut [Body], active: &[bool], G: f64, eps2: f64, parallel: bool) -> SimResult<()> {
    let sources: Vec<(usize, Body)> = bodies
        .iter()
        .enumerate()
        .filter(|(i, _)| active[*i])
        .map(|(i, b)| (i, *b))
        .collect();

    let per_body = |(i, b): (usize, &mut Body)| -> SimResult<()> {
        if !active[i] {
            return Ok(());
        }
        b.reset_force();
        for (j, src) in &sources {
            if *j == i {
                continue; // don't self-interact
            }
            b.accumulate_force_from(src, G, eps2)
                .map_err(|_| SimError::Singularity { index: i, other: Some(*j) })?;
        }
        Ok(())
    };

    if parallel {
        bodies.par_iter_mut().enumerate().try_for_each(per_body)
    } else {
        bodies.iter_mut().enumerate().try_for_each(per_body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::barnes_hut::TreeOptions;
    use crate::simulation::bounds::Bounds;
    use crate::simulation::vector::NVec3;
    use approx::assert_relative_eq;

    fn ring(n: usize) -> Vec<Body> {
        (0..n)
            .map(|i| {
                let a = i as f64 * std::f64::consts::TAU / n as f64;
                Body::new(NVec3::new(a.cos() * 3.0, a.sin() * 3.0, (i % 5) as f64 * 0.2), NVec3::zeros(), 1.0 + (i % 4) as f64)
            })
            .collect()
    }

    fn options(theta: f64) -> TreeOptions {
        TreeOptions { enable_z: true, theta, max_depth: 32, G: 0.5, eps2: 0.0 }
    }

    #[test]
    fn direct_pass_is_equal_and_opposite_for_two_bodies() {
        let mut bodies = vec![
            Body::new(NVec3::new(-1.0, 0.0, 0.0), NVec3::zeros(), 2.0),
            Body::new(NVec3::new(1.0, 0.5, 0.0), NVec3::zeros(), 3.0),
        ];
        direct_forces(&mut bodies, &[true, true], 1.0, 0.0, false).unwrap();
        assert_relative_eq!((bodies[0].f + bodies[1].f).norm(), 0.0, epsilon = 1e-12);
        assert!(bodies[0].f.x > 0.0);
    }

    #[test]
    fn inactive_bodies_are_neither_sources_nor_targets() {
        let mut bodies = ring(3);
        bodies[2].f = NVec3::new(9.0, 9.0, 9.0);
        direct_forces(&mut bodies, &[true, true, false], 1.0, 0.0, false).unwrap();

        assert_eq!(bodies[2].f, NVec3::new(9.0, 9.0, 9.0));
        assert_relative_eq!((bodies[0].f + bodies[1].f).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn coincident_sources_report_singularity() {
        let b = Body::new(NVec3::new(1.0, 1.0, 1.0), NVec3::zeros(), 1.0);
        let mut bodies = vec![b, b];
        let err = direct_forces(&mut bodies, &[true, true], 1.0, 0.0, false).unwrap_err();
        assert_eq!(err, SimError::Singularity { index: 0, other: Some(1) });
    }

    #[test]
    fn tree_pass_at_theta_zero_matches_direct_pass() {
        let mut exact = ring(24);
        let active = vec![true; exact.len()];
        direct_forces(&mut exact, &active, 0.5, 0.0, false).unwrap();

        let mut approx = ring(24);
        let (tree, rejected) = BarnesHutTree::build(&approx, Bounds::universe(4.0, true), options(0.0));
        assert!(rejected.is_empty());
        let stats = tree_forces(&tree, &mut approx, &active, false).unwrap();

        assert_eq!(stats.approximations, 0);
        assert_eq!(stats.direct, 24 * 23);
        for (a, e) in approx.iter().zip(&exact) {
            assert_relative_eq!((a.f - e.f).norm(), 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn parallel_and_sequential_passes_agree() {
        let mut seq = ring(64);
        let mut par = ring(64);
        let active = vec![true; seq.len()];
        let (tree, _) = BarnesHutTree::build(&seq, Bounds::universe(4.0, true), options(0.7));

        let s1 = tree_forces(&tree, &mut seq, &active, false).unwrap();
        let s2 = tree_forces(&tree, &mut par, &active, true).unwrap();

        assert_eq!(s1, s2);
        for (a, b) in seq.iter().zip(&par) {
            assert_eq!(a.f, b.f);
        }
    }
}
