use std::fmt;

use crate::kdtree::node::{Node, NodeId};
use crate::kdtree::points::PointSet;
use crate::kdtree::rect::Rect;
use crate::r#type::AnnNum;

/// The flavour of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TreeKind {
    /// A kd-tree: split nodes only.
    #[default]
    Kd,
    /// A box-decomposition tree: split and shrink nodes.
    BoxDecomposition,
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kd => f.write_str("kd-tree"),
            Self::BoxDecomposition => f.write_str("bd-tree"),
        }
    }
}

/// An immutable kd-tree or box-decomposition tree over a [`PointSet`].
///
/// Usually this will be created from scratch via [`KDTreeBuilder`][crate::kdtree::KDTreeBuilder]
/// or loaded with [`KDTree::read_dump`].
///
/// Nodes live in a single arena and refer to each other by [`NodeId`]. Leaves refer to ranges of
/// one index array, a permutation of the point indices fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct KDTree<N: AnnNum> {
    pub(crate) kind: TreeKind,
    pub(crate) points: PointSet<N>,
    pub(crate) indices: Vec<u32>,
    pub(crate) nodes: Vec<Node<N>>,
    pub(crate) root: Option<NodeId>,
    pub(crate) bounds: Rect<N>,
    pub(crate) bucket_size: usize,
}

impl<N: AnnNum> KDTree<N> {
    /// Whether this is a kd-tree or a box-decomposition tree.
    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    /// The indexed points.
    pub fn points(&self) -> &PointSet<N> {
        &self.points
    }

    /// Consume the tree and return the indexed points.
    pub fn into_points(self) -> PointSet<N> {
        self.points
    }

    /// The point dimension.
    pub fn dimension(&self) -> usize {
        self.points.dimension()
    }

    /// The number of indexed points.
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// The maximum number of points per leaf.
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// The bounding box of all points.
    pub fn bounds(&self) -> &Rect<N> {
        &self.bounds
    }

    /// The permutation of point indices referenced by the leaves.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The root node, or `None` if the tree is empty.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Access a node by its handle.
    pub fn node(&self, id: NodeId) -> &Node<N> {
        &self.nodes[id.index()]
    }

    /// The number of nodes, including the shared empty leaf.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// The point indices stored in a leaf. Empty for internal nodes.
    pub fn bucket(&self, id: NodeId) -> &[u32] {
        match self.node(id) {
            Node::Leaf { start, len } => {
                &self.indices[*start as usize..(*start + *len) as usize]
            }
            _ => &[],
        }
    }
}
