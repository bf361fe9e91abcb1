//! Per-query state and the traversal of each node variant for the three searches.

use crate::error::Result;
use crate::kdtree::min_k::MinKSet;
use crate::kdtree::node::{Node, NodeId};
use crate::kdtree::queue::PriorityQueue;
use crate::kdtree::rect::HalfSpace;
use crate::kdtree::stats::QueryStats;
use crate::kdtree::{KDTree, QueryOptions};
use crate::r#type::AnnNum;

/// Queue of unexplored subtrees keyed by a lower bound on their distance to the query.
pub(crate) type NodeQueue<N> = PriorityQueue<NodeId, N>;

/// State of one query. Created per call, never shared between queries.
pub(crate) struct SearchContext<'a, N: AnnNum> {
    tree: &'a KDTree<N>,
    query: &'a [N],
    /// `(1 + eps)^2`
    tolerance: N,
    allow_self_match: bool,
    /// Zero means unlimited.
    max_visit: usize,
    visited: usize,
    sq_radius: N,
    pub(crate) results: MinKSet<N>,
    pub(crate) in_range: usize,
    pub(crate) stats: QueryStats,
}

impl<'a, N: AnnNum> SearchContext<'a, N> {
    pub(crate) fn new(
        tree: &'a KDTree<N>,
        query: &'a [N],
        k: usize,
        options: &QueryOptions,
    ) -> Self {
        let one_plus_eps = N::from_f64_lossy(1.0 + options.eps);
        Self {
            tree,
            query,
            tolerance: one_plus_eps * one_plus_eps,
            allow_self_match: options.allow_self_match,
            max_visit: options.max_visit.unwrap_or(0),
            visited: 0,
            sq_radius: N::infinity(),
            results: MinKSet::new(k),
            in_range: 0,
            stats: QueryStats::default(),
        }
    }

    /// Set the squared radius of a fixed-radius search.
    pub(crate) fn with_sq_radius(mut self, sq_radius: N) -> Self {
        self.sq_radius = sq_radius;
        self
    }

    pub(crate) fn tolerance(&self) -> N {
        self.tolerance
    }

    /// Returns `true` once more points than allowed have been visited.
    #[inline]
    pub(crate) fn exhausted(&self) -> bool {
        self.max_visit != 0 && self.visited > self.max_visit
    }

    /// Squared distance from the query to `point`, or `None` once it exceeds `bound`.
    #[inline]
    fn bounded_sq_dist(&mut self, point: &[N], bound: N, flops_per_coord: usize) -> Option<N> {
        let mut dist = N::zero();
        for (&q, &p) in self.query.iter().zip(point) {
            self.stats.coord_hits += 1;
            self.stats.float_ops += flops_per_coord;
            let d = q - p;
            dist = dist + d * d;
            if dist > bound {
                return None;
            }
        }
        Some(dist)
    }

    #[inline]
    fn admits(&self, dist: N) -> bool {
        self.allow_self_match || dist != N::zero()
    }

    fn record_leaf(&mut self, len: usize) {
        self.stats.leaf_visits += 1;
        self.stats.points_visited += len;
        self.visited += len;
    }

    /// Sum of squared distances to the half-spaces the query lies outside of.
    fn inner_distance(&mut self, bounds: &[HalfSpace<N>]) -> N {
        self.stats.float_ops += 3 * bounds.len();
        bounds
            .iter()
            .filter(|bound| bound.outside(self.query))
            .fold(N::zero(), |acc, bound| acc + bound.sq_distance(self.query))
    }

    /// Lower bound for the far child of a split, updated from the near cell's `box_dist`.
    ///
    /// Returns `(near, far, far_dist)`.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    fn split_sides(
        &self,
        axis: usize,
        cut: N,
        lo_bound: N,
        hi_bound: N,
        low: NodeId,
        high: NodeId,
        box_dist: N,
    ) -> (NodeId, NodeId, N) {
        let q = self.query[axis];
        let cut_diff = q - cut;
        let (near, far, box_diff) = if cut_diff < N::zero() {
            (low, high, lo_bound - q)
        } else {
            (high, low, q - hi_bound)
        };
        let box_diff = box_diff.max(N::zero());
        let far_dist = box_dist + cut_diff * cut_diff - box_diff * box_diff;
        (near, far, far_dist)
    }

    /// Bounded depth-first k-nearest-neighbor search below `id`.
    pub(crate) fn search(&mut self, id: NodeId, box_dist: N) {
        let tree = self.tree;
        match tree.node(id) {
            Node::Leaf { .. } => self.scan_bucket(tree.bucket(id)),
            Node::Split {
                axis,
                cut,
                lo_bound,
                hi_bound,
                low,
                high,
            } => {
                if self.exhausted() {
                    return;
                }
                let (near, far, far_dist) =
                    self.split_sides(*axis, *cut, *lo_bound, *hi_bound, *low, *high, box_dist);
                self.search(near, box_dist);
                if far_dist * self.tolerance < self.results.max_key() {
                    self.search(far, far_dist);
                }
                self.stats.split_visits += 1;
                self.stats.float_ops += 10;
            }
            Node::Shrink {
                bounds,
                inside,
                outside,
            } => {
                if self.exhausted() {
                    return;
                }
                let inner_dist = self.inner_distance(bounds);
                if inner_dist <= box_dist {
                    self.search(*inside, inner_dist);
                    self.search(*outside, box_dist);
                } else {
                    self.search(*outside, box_dist);
                    self.search(*inside, inner_dist);
                }
                self.stats.shrink_visits += 1;
            }
        }
    }

    /// Expand `id` for a best-first search: descend towards the query and queue the other
    /// children.
    pub(crate) fn priority_search(
        &mut self,
        id: NodeId,
        box_dist: N,
        queue: &mut NodeQueue<N>,
    ) -> Result<()> {
        let tree = self.tree;
        match tree.node(id) {
            Node::Leaf { .. } => self.scan_bucket(tree.bucket(id)),
            Node::Split {
                axis,
                cut,
                lo_bound,
                hi_bound,
                low,
                high,
            } => {
                let (near, far, far_dist) =
                    self.split_sides(*axis, *cut, *lo_bound, *hi_bound, *low, *high, box_dist);
                if !far.is_empty_leaf() {
                    queue.insert(far_dist, far)?;
                }
                self.stats.split_visits += 1;
                self.stats.float_ops += 8;
                self.priority_search(near, box_dist, queue)?;
            }
            Node::Shrink {
                bounds,
                inside,
                outside,
            } => {
                let inner_dist = self.inner_distance(bounds);
                self.stats.shrink_visits += 1;
                if inner_dist <= box_dist {
                    if !outside.is_empty_leaf() {
                        queue.insert(box_dist, *outside)?;
                    }
                    self.priority_search(*inside, inner_dist, queue)?;
                } else {
                    if !inside.is_empty_leaf() {
                        queue.insert(inner_dist, *inside)?;
                    }
                    self.priority_search(*outside, box_dist, queue)?;
                }
            }
        }
        Ok(())
    }

    /// Fixed-radius search below `id`.
    pub(crate) fn fixed_radius_search(&mut self, id: NodeId, box_dist: N) {
        let tree = self.tree;
        match tree.node(id) {
            Node::Leaf { .. } => self.scan_bucket_in_radius(tree.bucket(id)),
            Node::Split {
                axis,
                cut,
                lo_bound,
                hi_bound,
                low,
                high,
            } => {
                if self.exhausted() {
                    return;
                }
                let (near, far, far_dist) =
                    self.split_sides(*axis, *cut, *lo_bound, *hi_bound, *low, *high, box_dist);
                self.fixed_radius_search(near, box_dist);
                if far_dist * self.tolerance <= self.sq_radius {
                    self.fixed_radius_search(far, far_dist);
                }
                self.stats.split_visits += 1;
                self.stats.float_ops += 13;
            }
            Node::Shrink {
                bounds,
                inside,
                outside,
            } => {
                if self.exhausted() {
                    return;
                }
                let inner_dist = self.inner_distance(bounds);
                if inner_dist <= box_dist {
                    self.fixed_radius_search(*inside, inner_dist);
                    self.fixed_radius_search(*outside, box_dist);
                } else {
                    self.fixed_radius_search(*outside, box_dist);
                    self.fixed_radius_search(*inside, inner_dist);
                }
                self.stats.shrink_visits += 1;
            }
        }
    }

    /// Offer every point of a bucket to the result set, pruning against its current bound.
    fn scan_bucket(&mut self, bucket: &[u32]) {
        let tree = self.tree;
        let points = tree.points();
        let mut bound = self.results.max_key();
        for &idx in bucket {
            if let Some(dist) = self.bounded_sq_dist(points.point(idx as usize), bound, 4) {
                if self.admits(dist) {
                    self.results.insert(dist, idx);
                    bound = self.results.max_key();
                }
            }
        }
        self.record_leaf(bucket.len());
    }

    /// Count and collect the points of a bucket within the search radius.
    fn scan_bucket_in_radius(&mut self, bucket: &[u32]) {
        let tree = self.tree;
        let points = tree.points();
        for &idx in bucket {
            if let Some(dist) = self.bounded_sq_dist(points.point(idx as usize), self.sq_radius, 5)
            {
                if self.admits(dist) {
                    self.results.insert(dist, idx);
                    self.in_range += 1;
                }
            }
        }
        self.record_leaf(bucket.len());
    }
}
