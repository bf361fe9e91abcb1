//! Static kd-trees and box-decomposition trees for exact and approximate nearest-neighbor
//! search in any dimension.

#![warn(missing_docs)]

mod builder;
pub mod constants;
mod dump;
mod index;
mod min_k;
mod node;
mod partition;
pub(crate) mod points;
mod queue;
mod rect;
mod shrink;
pub mod split;
mod stats;
pub(crate) mod r#trait;
mod traversal;

pub use builder::KDTreeBuilder;
pub use index::{KDTree, TreeKind};
pub use min_k::MinKSet;
pub use node::{Node, NodeId};
pub use points::PointSet;
pub use queue::PriorityQueue;
pub use r#trait::{AnnIndex, Neighbor, QueryOptions, RadiusNeighbors};
pub use rect::{HalfSpace, HalfSpaces, Rect};
pub use shrink::ShrinkRule;
pub use split::SplitRule;
pub use stats::{QueryStats, TreeStats};
