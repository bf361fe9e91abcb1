use geo_traits::CoordTrait;

use crate::error::{AnnError, Result};
use crate::kdtree::constants::DEFAULT_BUCKET_SIZE;
use crate::kdtree::node::{Node, NodeId};
use crate::kdtree::partition::box_split;
use crate::kdtree::points::PointSet;
use crate::kdtree::rect::{HalfSpaces, Rect};
use crate::kdtree::shrink::{Decomposition, ShrinkRule};
use crate::kdtree::split::SplitRule;
use crate::kdtree::{KDTree, TreeKind};
use crate::r#type::AnnNum;

/// A builder to create a [`KDTree`].
///
/// Setting a [`ShrinkRule`] turns the result into a box-decomposition tree.
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<N: AnnNum> {
    dimension: usize,
    num_items: usize,
    bucket_size: usize,
    split_rule: SplitRule,
    shrink_rule: Option<ShrinkRule>,
    coords: Vec<N>,
}

impl<N: AnnNum> KDTreeBuilder<N> {
    /// Create a new builder with the provided dimension and number of items and the default
    /// bucket size.
    pub fn new(dimension: usize, num_items: usize) -> Self {
        Self::new_with_bucket_size(dimension, num_items, DEFAULT_BUCKET_SIZE)
    }

    /// Create a new builder with the provided dimension, number of items and bucket size.
    ///
    /// ## Panics
    ///
    /// - If `dimension` is zero.
    /// - If `num_items` does not fit in a `u32`.
    pub fn new_with_bucket_size(dimension: usize, num_items: usize, bucket_size: usize) -> Self {
        assert!(dimension > 0, "Point dimension must be at least 1.");
        assert!(num_items <= u32::MAX as usize);

        Self {
            dimension,
            num_items,
            bucket_size,
            split_rule: SplitRule::default(),
            shrink_rule: None,
            coords: Vec::with_capacity(dimension * num_items),
        }
    }

    /// Create a builder holding every point of an existing set.
    pub fn from_point_set(points: PointSet<N>) -> Self {
        let mut builder = Self::new(points.dimension(), points.len());
        builder.coords = points.coords;
        builder
    }

    /// Set the splitting rule.
    pub fn split_rule(mut self, split_rule: SplitRule) -> Self {
        self.split_rule = split_rule;
        self
    }

    /// Set the shrinking rule, making the result a box-decomposition tree.
    pub fn shrink_rule(mut self, shrink_rule: ShrinkRule) -> Self {
        self.shrink_rule = Some(shrink_rule);
        self
    }

    /// Set the maximum number of points per leaf.
    pub fn bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// Add a point to the index. Returns its insertion index.
    ///
    /// ## Panics
    ///
    /// - If the point does not have the builder's dimension.
    pub fn add(&mut self, point: &[N]) -> usize {
        assert_eq!(
            point.len(),
            self.dimension,
            "Got a point of dimension {} when expected dimension {}.",
            point.len(),
            self.dimension
        );
        let index = self.coords.len() / self.dimension;
        self.coords.extend_from_slice(point);
        index
    }

    /// Add a point given as a [`CoordTrait`] to the index. Returns its insertion index.
    ///
    /// ## Panics
    ///
    /// - If the coordinate does not have the builder's dimension.
    pub fn add_coord(&mut self, coord: &impl CoordTrait<T = N>) -> usize {
        assert_eq!(
            coord.dim().size(),
            self.dimension,
            "Got a coordinate of dimension {} when expected dimension {}.",
            coord.dim().size(),
            self.dimension
        );
        let index = self.coords.len() / self.dimension;
        self.coords
            .extend((0..self.dimension).map(|axis| coord.nth_or_panic(axis)));
        index
    }

    /// Add many points given as interleaved coordinates.
    ///
    /// ## Panics
    ///
    /// - If the length of `coords` is not a multiple of the dimension.
    pub fn add_interleaved(&mut self, coords: &[N]) {
        assert_eq!(coords.len() % self.dimension, 0);
        self.coords.extend_from_slice(coords);
    }

    /// Consume this builder, recursively partitioning the points and generating a tree ready
    /// for queries.
    pub fn finish(self) -> Result<KDTree<N>> {
        if self.bucket_size == 0 {
            return Err(AnnError::InvalidBucketSize);
        }
        let num_added = self.coords.len() / self.dimension;
        if num_added != self.num_items {
            return Err(AnnError::General(format!(
                "Added {} items when expected {}.",
                num_added, self.num_items
            )));
        }

        let kind = match self.shrink_rule {
            Some(_) => TreeKind::BoxDecomposition,
            None => TreeKind::Kd,
        };
        let points = PointSet::try_new(self.dimension, self.coords)?;
        let mut indices: Vec<u32> = (0..self.num_items as u32).collect();

        if indices.is_empty() {
            return Ok(KDTree {
                kind,
                bounds: Rect::zero(points.dimension()),
                points,
                indices,
                nodes: vec![Node::EMPTY_LEAF],
                root: None,
                bucket_size: self.bucket_size,
            });
        }

        let bounds = Rect::enclosing(&points, &indices);
        let mut recursion = Recursion {
            points: &points,
            bucket_size: self.bucket_size,
            split_rule: self.split_rule,
            shrink_rule: self.shrink_rule,
            nodes: vec![Node::EMPTY_LEAF],
            max_depth: 0,
        };
        let root = recursion.build(0, &mut indices, &mut bounds.clone(), 0);
        let Recursion {
            nodes, max_depth, ..
        } = recursion;

        log::debug!(
            "Built {} over {} points ({} split, {:?} shrink): {} nodes, depth {}",
            kind,
            points.len(),
            self.split_rule,
            self.shrink_rule,
            nodes.len(),
            max_depth
        );

        Ok(KDTree {
            kind,
            points,
            indices,
            nodes,
            root: Some(root),
            bounds,
            bucket_size: self.bucket_size,
        })
    }
}

/// State of the recursive construction.
struct Recursion<'a, N: AnnNum> {
    points: &'a PointSet<N>,
    bucket_size: usize,
    split_rule: SplitRule,
    shrink_rule: Option<ShrinkRule>,
    nodes: Vec<Node<N>>,
    max_depth: usize,
}

impl<N: AnnNum> Recursion<'_, N> {
    fn push(&mut self, node: Node<N>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Build the subtree over `indices`, which starts at `offset` in the tree's index array.
    ///
    /// `bounds` is the cell of the subtree. It is narrowed while recursing and restored before
    /// returning.
    fn build(
        &mut self,
        offset: usize,
        indices: &mut [u32],
        bounds: &mut Rect<N>,
        depth: usize,
    ) -> NodeId {
        self.max_depth = self.max_depth.max(depth);

        let n = indices.len();
        if n <= self.bucket_size {
            if n == 0 {
                return NodeId::EMPTY;
            }
            return self.push(Node::Leaf {
                start: offset as u32,
                len: n as u32,
            });
        }

        if let Some(shrink_rule) = self.shrink_rule {
            let decomposition = shrink_rule.select(self.points, indices, bounds, self.split_rule);
            if let Decomposition::Shrink(inner) = decomposition {
                let half_spaces = inner.to_half_spaces(bounds);
                if !half_spaces.is_empty() {
                    return self.shrink(offset, indices, bounds, inner, half_spaces, depth);
                }
            }
        }
        self.split(offset, indices, bounds, depth)
    }

    fn split(
        &mut self,
        offset: usize,
        indices: &mut [u32],
        bounds: &mut Rect<N>,
        depth: usize,
    ) -> NodeId {
        let cut = self.split_rule.split(self.points, indices, bounds);
        let lo_bound = bounds.lo[cut.axis];
        let hi_bound = bounds.hi[cut.axis];
        let (low_indices, high_indices) = indices.split_at_mut(cut.num_low);

        bounds.hi[cut.axis] = cut.value;
        let low = self.build(offset, low_indices, bounds, depth + 1);
        bounds.hi[cut.axis] = hi_bound;

        bounds.lo[cut.axis] = cut.value;
        let high = self.build(offset + cut.num_low, high_indices, bounds, depth + 1);
        bounds.lo[cut.axis] = lo_bound;

        self.push(Node::Split {
            axis: cut.axis,
            cut: cut.value,
            lo_bound,
            hi_bound,
            low,
            high,
        })
    }

    fn shrink(
        &mut self,
        offset: usize,
        indices: &mut [u32],
        bounds: &mut Rect<N>,
        mut inner: Rect<N>,
        half_spaces: HalfSpaces<N>,
        depth: usize,
    ) -> NodeId {
        let num_inside = box_split(self.points, indices, &inner);
        let (inside_indices, outside_indices) = indices.split_at_mut(num_inside);

        let inside = self.build(offset, inside_indices, &mut inner, depth + 1);
        let outside = self.build(offset + num_inside, outside_indices, bounds, depth + 1);

        self.push(Node::Shrink {
            bounds: half_spaces,
            inside,
            outside,
        })
    }
}
