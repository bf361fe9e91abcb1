use num_traits::ToPrimitive;

use crate::kdtree::constants::ASPECT_RATIO_CEILING;
use crate::kdtree::node::{Node, NodeId};
use crate::kdtree::rect::Rect;
use crate::kdtree::KDTree;
use crate::r#type::AnnNum;

/// Counters collected while answering a single query.
///
/// Purely diagnostic: they never influence the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Leaves visited, including the shared empty leaf.
    pub leaf_visits: usize,
    /// Split nodes visited.
    pub split_visits: usize,
    /// Shrink nodes visited.
    pub shrink_visits: usize,
    /// Points whose distance to the query was (at least partially) computed.
    pub points_visited: usize,
    /// Individual coordinates read while computing distances.
    pub coord_hits: usize,
    /// Approximate number of floating point operations.
    pub float_ops: usize,
}

impl QueryStats {
    /// Total number of nodes visited.
    pub fn node_visits(&self) -> usize {
        self.leaf_visits + self.split_visits + self.shrink_visits
    }

    /// Add the counters of another query.
    pub fn merge(&mut self, other: &QueryStats) {
        self.leaf_visits += other.leaf_visits;
        self.split_visits += other.split_visits;
        self.shrink_visits += other.shrink_visits;
        self.points_visited += other.points_visited;
        self.coord_hits += other.coord_hits;
        self.float_ops += other.float_ops;
    }
}

/// Structural statistics of a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TreeStats {
    /// The point dimension.
    pub dimension: usize,
    /// The number of indexed points.
    pub num_points: usize,
    /// The maximum number of points per leaf.
    pub bucket_size: usize,
    /// Leaves, counting each reference to the shared empty leaf.
    pub num_leaves: usize,
    /// References to the shared empty leaf.
    pub num_trivial_leaves: usize,
    /// Split nodes.
    pub num_splits: usize,
    /// Shrink nodes.
    pub num_shrinks: usize,
    /// Number of internal nodes on the longest root-to-leaf path.
    pub depth: usize,
    /// Sum over leaves of the aspect ratio of their cell, each capped at
    /// [`ASPECT_RATIO_CEILING`].
    pub aspect_ratio_sum: f64,
    /// `aspect_ratio_sum` divided by the number of leaves.
    pub aspect_ratio_avg: f64,
}

impl TreeStats {
    fn leaf(trivial: bool, aspect_ratio: f64) -> Self {
        Self {
            num_leaves: 1,
            num_trivial_leaves: trivial as usize,
            aspect_ratio_sum: aspect_ratio.min(ASPECT_RATIO_CEILING),
            ..Default::default()
        }
    }

    /// Combine the statistics of two sibling subtrees under a common parent.
    fn join(a: TreeStats, b: TreeStats) -> Self {
        Self {
            num_leaves: a.num_leaves + b.num_leaves,
            num_trivial_leaves: a.num_trivial_leaves + b.num_trivial_leaves,
            num_splits: a.num_splits + b.num_splits,
            num_shrinks: a.num_shrinks + b.num_shrinks,
            depth: a.depth.max(b.depth) + 1,
            aspect_ratio_sum: a.aspect_ratio_sum + b.aspect_ratio_sum,
            ..Default::default()
        }
    }
}

impl<N: AnnNum> KDTree<N> {
    /// Collect structural statistics by walking the whole tree.
    pub fn stats(&self) -> TreeStats {
        let mut stats = match self.root {
            Some(root) => {
                let mut cell = self.bounds.clone();
                self.collect_stats(root, &mut cell)
            }
            None => TreeStats::default(),
        };
        stats.dimension = self.dimension();
        stats.num_points = self.num_points();
        stats.bucket_size = self.bucket_size;
        if stats.num_leaves > 0 {
            stats.aspect_ratio_avg = stats.aspect_ratio_sum / stats.num_leaves as f64;
        }
        stats
    }

    fn collect_stats(&self, id: NodeId, cell: &mut Rect<N>) -> TreeStats {
        match self.node(id) {
            Node::Leaf { .. } => {
                let aspect_ratio = cell.aspect_ratio().to_f64().unwrap_or(f64::INFINITY);
                TreeStats::leaf(id.is_empty_leaf(), aspect_ratio)
            }
            Node::Split {
                axis, cut, low, high, ..
            } => {
                let hi = cell.hi[*axis];
                cell.hi[*axis] = *cut;
                let low_stats = self.collect_stats(*low, cell);
                cell.hi[*axis] = hi;

                let lo = cell.lo[*axis];
                cell.lo[*axis] = *cut;
                let high_stats = self.collect_stats(*high, cell);
                cell.lo[*axis] = lo;

                let mut stats = TreeStats::join(low_stats, high_stats);
                stats.num_splits += 1;
                stats
            }
            Node::Shrink {
                bounds,
                inside,
                outside,
            } => {
                let mut inner = cell.project(bounds);
                let inside_stats = self.collect_stats(*inside, &mut inner);
                let outside_stats = self.collect_stats(*outside, cell);

                let mut stats = TreeStats::join(inside_stats, outside_stats);
                stats.num_shrinks += 1;
                stats
            }
        }
    }
}
