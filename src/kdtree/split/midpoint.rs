use crate::kdtree::partition::{min_max, plane_split};
use crate::kdtree::points::PointSet;
use crate::kdtree::rect::Rect;
use crate::kdtree::split::r#trait::{balanced_num_low, longest_side_axis};
use crate::kdtree::split::{Cut, Split};
use crate::r#type::AnnNum;

/// Cut the longest side of the cell through its middle.
///
/// The cut ignores where the points lie, so a cell whose points all coincide is halved until
/// its width underflows. On such data the tree can grow over a thousand levels deep with one
/// empty leaf per level, and construction and search recurse that deep.
/// [`SlidingMidpointSplit`] never creates empty cells and stays shallow on the same input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidpointSplit;

impl<N: AnnNum> Split<N> for MidpointSplit {
    fn split(points: &PointSet<N>, indices: &mut [u32], bounds: &Rect<N>) -> Cut<N> {
        let axis = longest_side_axis(points, indices, bounds);
        let value = (bounds.lo[axis] + bounds.hi[axis]) * N::from_f64_lossy(0.5);
        let (br1, br2) = plane_split(points, indices, axis, value);
        Cut {
            axis,
            value,
            num_low: balanced_num_low(br1, br2, indices.len()),
        }
    }
}

/// Like [`MidpointSplit`], but slides the cut onto the data when the midpoint leaves one side
/// empty, so that no empty cells are created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlidingMidpointSplit;

impl<N: AnnNum> Split<N> for SlidingMidpointSplit {
    fn split(points: &PointSet<N>, indices: &mut [u32], bounds: &Rect<N>) -> Cut<N> {
        let n = indices.len();
        let axis = longest_side_axis(points, indices, bounds);
        let ideal = (bounds.lo[axis] + bounds.hi[axis]) * N::from_f64_lossy(0.5);
        let (min, max) = min_max(points, indices, axis);

        let value = if ideal < min {
            min
        } else if ideal > max {
            max
        } else {
            ideal
        };
        let (br1, br2) = plane_split(points, indices, axis, value);

        let num_low = if ideal < min {
            1
        } else if ideal > max {
            n - 1
        } else {
            balanced_num_low(br1, br2, n)
        };
        Cut {
            axis,
            value,
            num_low,
        }
    }
}
