use crate::kdtree::partition::{max_spread, median_split};
use crate::kdtree::points::PointSet;
use crate::kdtree::rect::Rect;
use crate::kdtree::split::{Cut, Split};
use crate::r#type::AnnNum;

/// The classic kd-tree split: cut the axis of largest spread at the median.
///
/// The bounding rectangle is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardSplit;

impl<N: AnnNum> Split<N> for StandardSplit {
    fn split(points: &PointSet<N>, indices: &mut [u32], _bounds: &Rect<N>) -> Cut<N> {
        let axis = max_spread(points, indices);
        let num_low = indices.len() / 2;
        let value = median_split(points, indices, axis, num_low);
        Cut {
            axis,
            value,
            num_low,
        }
    }
}
