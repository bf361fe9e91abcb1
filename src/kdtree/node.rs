use crate::kdtree::rect::HalfSpaces;
use crate::r#type::AnnNum;

/// A handle to a node stored in a [`KDTree`](crate::kdtree::KDTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The shared empty leaf. Every tree stores it at slot 0 and every empty bucket refers to it.
    pub const EMPTY: NodeId = NodeId(0);

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` for the shared empty leaf.
    #[inline]
    pub fn is_empty_leaf(self) -> bool {
        self == Self::EMPTY
    }
}

/// A node of a kd-tree or box-decomposition tree.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum Node<N: AnnNum> {
    /// A bucket of points: `indices[start..start + len]` of the tree's index array.
    Leaf { start: u32, len: u32 },
    /// A cut orthogonal to `axis` at `cut`.
    ///
    /// `lo_bound` and `hi_bound` are the extent of the cell along `axis` when the node was
    /// built. The `low` child holds the points at or below the cut, `high` those at or above.
    Split {
        axis: usize,
        cut: N,
        lo_bound: N,
        hi_bound: N,
        low: NodeId,
        high: NodeId,
    },
    /// An inner box carved out of the cell by `bounds`.
    ///
    /// `inside` holds the points inside every half-space, `outside` the rest.
    Shrink {
        bounds: HalfSpaces<N>,
        inside: NodeId,
        outside: NodeId,
    },
}

impl<N: AnnNum> Node<N> {
    /// The shared empty leaf.
    pub(crate) const EMPTY_LEAF: Node<N> = Node::Leaf { start: 0, len: 0 };

    /// Returns `true` if this is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// The children of an internal node, low (or inside) first.
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self {
            Node::Leaf { .. } => None,
            Node::Split { low, high, .. } => Some((*low, *high)),
            Node::Shrink {
                inside, outside, ..
            } => Some((*inside, *outside)),
        }
    }
}
