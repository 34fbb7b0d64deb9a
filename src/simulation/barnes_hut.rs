//! # Barnes–Hut Octree
//!
//! This module implements a **Barnes–Hut octree** for approximating
//! gravitational forces in an `N`-body system. The naive `O(N²)` all-pairs
//! force calculation is replaced by an approximate `O(N log N)` traversal
//! that keeps exact interactions for nearby bodies.
//!
//! ## Core Concepts
//!
//! - The simulation space is recursively subdivided into 8 cubes (octants).
//!   With the z-axis disabled every body sits on the `z = 0` plane and only
//!   the 4 octants without the z bit are ever used (a quadtree).
//! - Each node is either a **leaf** holding zero or one body, or an
//!   **internal** node owning exactly 8 children plus a pseudo-body: the
//!   total mass of its subtree placed at the subtree's center of mass.
//! - The pseudo-body is updated on every insertion that passes through the
//!   node, so no bottom-up pass is needed after building.
//! - A far enough internal node (`size / distance <= theta`) acts on a body
//!   as a single mass at its pseudo-body position.
//!
//! The tree is rebuilt from scratch each tick and never mutated while
//! forces are being accumulated, so the force pass may run in parallel.

#![allow(non_snake_case)]

use crate::simulation::bounds::{Bounds, OCTANTS, PLANAR_OCTANTS};
use crate::simulation::engine::Engine;
use crate::simulation::error::{SimError, SimResult};
use crate::simulation::params::Parameters;
use crate::simulation::states::Body;
use crate::simulation::vector::NVec3;

const ALL_OCTANTS: [usize; OCTANTS] = [0, 1, 2, 3, 4, 5, 6, 7];

/// Settings threaded through insertion and traversal.
#[derive(Debug, Clone, Copy)]
pub struct TreeOptions {
    pub enable_z: bool,
    pub theta: f64,
    pub max_depth: usize,
    pub G: f64,
    pub eps2: f64,
}

impl TreeOptions {
    pub fn new(engine: &Engine, params: &Parameters) -> Self {
        Self {
            enable_z: engine.enable_z,
            theta: engine.theta,
            max_depth: engine.max_depth,
            G: params.G,
            eps2: params.eps2,
        }
    }

    /// Child slots a traversal has to look at.
    fn octants(&self) -> &'static [usize] {
        if self.enable_z { &ALL_OCTANTS[..] } else { &PLANAR_OCTANTS[..] }
    }
}

/// A body copied into the tree together with its index in the system.
#[derive(Debug, Clone, Copy)]
pub struct Occupant {
    pub index: usize,
    pub body: Body,
}

#[derive(Debug)]
enum NodeState {
    Leaf(Option<Occupant>),
    Internal {
        children: Box<[OctreeNode; OCTANTS]>,
        pseudo: Body,
    },
}

/// A single cube of the tree.
#[derive(Debug)]
pub struct OctreeNode {
    bounds: Bounds,
    depth: usize,
    state: NodeState,
}

/// What a visitor sees of a node.
#[derive(Debug, Clone, Copy)]
pub enum NodeKind<'a> {
    Empty,
    Occupied(&'a Occupant),
    Internal(&'a Body),
}

#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    pub bounds: &'a Bounds,
    pub depth: usize,
    pub kind: NodeKind<'a>,
}

/// Counters collected during one force traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    pub nodes_visited: usize,
    pub approximations: usize, // internal nodes treated as a single pseudo-body
    pub direct: usize, // exact body-body interactions
}

impl std::ops::AddAssign for TraversalStats {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes_visited += rhs.nodes_visited;
        self.approximations += rhs.approximations;
        self.direct += rhs.direct;
    }
}

impl OctreeNode {
    fn new(bounds: Bounds, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            state: NodeState::Leaf(None),
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.state, NodeState::Leaf(_))
    }

    /// Insert `occ` into this subtree.
    ///
    /// Fails without touching the tree if the body lies outside this node's
    /// bounds, or if it cannot be separated from the body already occupying
    /// its target leaf before `max_depth` is reached.
    pub fn insert(&mut self, occ: Occupant, opts: &TreeOptions) -> SimResult<()> {
        if !occ.body.is_inside(&self.bounds) {
            return Err(SimError::OutOfBounds { index: occ.index });
        }
        self.check_separable(&occ, opts)?;
        self.place(occ, opts);
        Ok(())
    }

    /// Walk down to the leaf `occ` would land in and make sure splitting it
    /// terminates within the depth limit.
    fn check_separable(&self, occ: &Occupant, opts: &TreeOptions) -> SimResult<()> {
        match &self.state {
            NodeState::Leaf(None) => Ok(()),
            NodeState::Leaf(Some(existing)) => {
                let mut bounds = self.bounds;
                let mut depth = self.depth;
                loop {
                    // splitting here would create children at depth + 1
                    if depth >= opts.max_depth {
                        return Err(SimError::DepthLimit {
                            index: occ.index,
                            other: existing.index,
                            depth: opts.max_depth,
                        });
                    }
                    let a = existing.body.octant_in(&bounds, opts.enable_z);
                    let b = occ.body.octant_in(&bounds, opts.enable_z);
                    if a != b {
                        return Ok(());
                    }
                    bounds = bounds.subdivide(a);
                    depth += 1;
                }
            }
            NodeState::Internal { children, .. } => {
                let oct = occ.body.octant_in(&self.bounds, opts.enable_z);
                children[oct].check_separable(occ, opts)
            }
        }
    }

    /// Insertion proper. Callers have already checked bounds and separability.
    fn place(&mut self, occ: Occupant, opts: &TreeOptions) {
        let state = std::mem::replace(&mut self.state, NodeState::Leaf(None));

        self.state = match state {
            // Case 1: empty leaf -> store the body here
            NodeState::Leaf(None) => NodeState::Leaf(Some(occ)),

            // Case 2: occupied leaf -> split, then push both bodies down
            NodeState::Leaf(Some(existing)) => {
                let pseudo = existing.body.merge_with(&occ.body);
                let mut children = self.compute_child_bounds();
                for o in [existing, occ] {
                    let oct = o.body.octant_in(&self.bounds, opts.enable_z);
                    children[oct].place(o, opts);
                }
                NodeState::Internal { children, pseudo }
            }

            // Case 3: internal -> absorb into the pseudo-body, descend
            NodeState::Internal { mut children, pseudo } => {
                let pseudo = pseudo.merge_with(&occ.body);
                let oct = occ.body.octant_in(&self.bounds, opts.enable_z);
                children[oct].place(occ, opts);
                NodeState::Internal { children, pseudo }
            }
        };
    }

    /// All 8 children at once, one per octant, one level deeper.
    fn compute_child_bounds(&self) -> Box<[OctreeNode; OCTANTS]> {
        Box::new(std::array::from_fn(|i| {
            OctreeNode::new(self.bounds.subdivide(i), self.depth + 1)
        }))
    }

    /// Recursively accumulate the Barnes–Hut force on `body` (system index `index`).
    ///
    /// - **Empty leaf**, or the leaf holding `index` itself: no contribution.
    /// - **Occupied leaf**: exact pairwise force.
    /// - **Internal node**: with `s` the side length and `d` the distance to
    ///   the pseudo-body, `s / d <= theta` takes the pseudo-body as a single
    ///   mass; otherwise the children are visited. `d == 0` always descends.
    fn walk(&self, index: usize, body: &mut Body, opts: &TreeOptions, stats: &mut TraversalStats) -> SimResult<()> {
        stats.nodes_visited += 1;

        match &self.state {
            NodeState::Leaf(None) => Ok(()),
            NodeState::Leaf(Some(occ)) if occ.index == index => Ok(()),
            NodeState::Leaf(Some(occ)) => {
                body.accumulate_force_from(&occ.body, opts.G, opts.eps2)
                    .map_err(|_| SimError::Singularity { index, other: Some(occ.index) })?;
                stats.direct += 1;
                Ok(())
            }
            NodeState::Internal { children, pseudo } => {
                let d = body.distance_to(pseudo);
                if d > 0.0 && self.bounds.length() / d <= opts.theta {
                    body.accumulate_force_from(pseudo, opts.G, opts.eps2)
                        .map_err(|_| SimError::Singularity { index, other: None })?;
                    stats.approximations += 1;
                    return Ok(());
                }
                for &oct in opts.octants() {
                    children[oct].walk(index, body, opts, stats)?;
                }
                Ok(())
            }
        }
    }

    fn visit<'a, F>(&'a self, opts: &TreeOptions, f: &mut F)
    where
        F: FnMut(NodeView<'a>),
    {
        let kind = match &self.state {
            NodeState::Leaf(None) => NodeKind::Empty,
            NodeState::Leaf(Some(occ)) => NodeKind::Occupied(occ),
            NodeState::Internal { pseudo, .. } => NodeKind::Internal(pseudo),
        };
        f(NodeView { bounds: &self.bounds, depth: self.depth, kind });

        if let NodeState::Internal { children, .. } = &self.state {
            for &oct in opts.octants() {
                children[oct].visit(opts, f);
            }
        }
    }
}

/// A Barnes–Hut tree built over the bodies of one tick.
#[derive(Debug)]
pub struct BarnesHutTree {
    root: OctreeNode,
    opts: TreeOptions,
    len: usize,
}

impl BarnesHutTree {
    /// An empty tree covering `bounds`.
    pub fn new(bounds: Bounds, opts: TreeOptions) -> Self {
        Self {
            root: OctreeNode::new(bounds, 0),
            opts,
            len: 0,
        }
    }

    /// Build a tree from `bodies`, inserting them in order.
    ///
    /// Bodies that cannot be inserted (outside `bounds`, or coincident with
    /// an already inserted body) are skipped and their errors returned.
    pub fn build(bodies: &[Body], bounds: Bounds, opts: TreeOptions) -> (Self, Vec<SimError>) {
        let mut tree = Self::new(bounds, opts);
        let mut rejected = Vec::new();

        for (index, body) in bodies.iter().enumerate() {
            if let Err(e) = tree.insert(index, body) {
                rejected.push(e);
            }
        }
        (tree, rejected)
    }

    /// Insert a copy of `body` under system index `index`.
    pub fn insert(&mut self, index: usize, body: &Body) -> SimResult<()> {
        self.root.insert(Occupant { index, body: *body }, &self.opts)?;
        self.len += 1;
        Ok(())
    }

    /// Accumulate the approximate force on `body` into its force accumulator.
    ///
    /// `index` is the body's position in the system; a leaf holding the same
    /// index is skipped. The tree itself is not modified.
    pub fn accumulate_force(&self, index: usize, body: &mut Body) -> SimResult<TraversalStats> {
        let mut stats = TraversalStats::default();
        self.root.walk(index, body, &self.opts, &mut stats)?;
        Ok(stats)
    }

    pub fn options(&self) -> &TreeOptions {
        &self.opts
    }

    pub fn root(&self) -> &OctreeNode {
        &self.root
    }

    pub fn bounds(&self) -> &Bounds {
        &self.root.bounds
    }

    /// Number of bodies held by the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Summary of the whole tree: the root's pseudo-body or single body.
    pub fn summary(&self) -> Option<Body> {
        match &self.root.state {
            NodeState::Leaf(None) => None,
            NodeState::Leaf(Some(occ)) => Some(occ.body),
            NodeState::Internal { pseudo, .. } => Some(*pseudo),
        }
    }

    pub fn total_mass(&self) -> f64 {
        self.summary().map_or(0.0, |b| b.m)
    }

    pub fn center_of_mass(&self) -> Option<NVec3> {
        self.summary().map(|b| b.x)
    }

    /// Pre-order walk over every reachable node.
    pub fn visit<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(NodeView<'a>),
    {
        self.root.visit(&self.opts, &mut f);
    }

    pub fn node_count(&self) -> usize {
        let mut n = 0;
        self.visit(|_| n += 1);
        n
    }

    /// Depth of the deepest reachable node.
    pub fn height(&self) -> usize {
        let mut h = 0;
        self.visit(|v| h = h.max(v.depth));
        h
    }

    /// Boundaries of every node, for drawing the full subdivision.
    pub fn boundaries(&self) -> Vec<Bounds> {
        let mut out = Vec::new();
        self.visit(|v| out.push(*v.bounds));
        out
    }

    /// Boundaries of the leaves that hold a body.
    pub fn leaf_boundaries(&self) -> Vec<Bounds> {
        let mut out = Vec::new();
        self.visit(|v| {
            if let NodeKind::Occupied(_) = v.kind {
                out.push(*v.bounds);
            }
        });
        out
    }

    /// Pseudo-body positions of internal nodes with their depth.
    pub fn center_masses(&self) -> Vec<(NVec3, usize)> {
        let mut out = Vec::new();
        self.visit(|v| {
            if let NodeKind::Internal(pseudo) = v.kind {
                out.push((pseudo.x, v.depth));
            }
        });
        out
    }
}
