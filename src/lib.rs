#![doc = include_str!("../README.md")]

mod error;
pub mod kdtree;
mod r#type;

pub use error::{AnnError, Result};
pub use kdtree::{
    AnnIndex, KDTree, KDTreeBuilder, Neighbor, QueryOptions, RadiusNeighbors, ShrinkRule,
    SplitRule, TreeKind,
};
pub use r#type::AnnNum;

#[cfg(test)]
pub(crate) mod test;
