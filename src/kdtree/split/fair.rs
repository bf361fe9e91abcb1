use crate::kdtree::constants::FS_ASPECT_RATIO;
use crate::kdtree::partition::{median_split, min_max, plane_split, split_balance};
use crate::kdtree::points::PointSet;
use crate::kdtree::rect::Rect;
use crate::kdtree::split::r#trait::{balanced_num_low, longest_side_axis};
use crate::kdtree::split::{Cut, Split};
use crate::r#type::AnnNum;

/// The range of cutting values along `axis` that keeps both children within
/// [`FS_ASPECT_RATIO`].
fn legal_cuts<N: AnnNum>(bounds: &Rect<N>, axis: usize) -> (N, N) {
    let max_other = (0..bounds.dimension())
        .filter(|&d| d != axis)
        .fold(N::zero(), |acc, d| acc.max(bounds.side(d)));
    let small_piece = max_other / N::from_f64_lossy(FS_ASPECT_RATIO);
    (bounds.lo[axis] + small_piece, bounds.hi[axis] - small_piece)
}

/// Low-side count for a cut at the upper legal bound.
///
/// When every point lands on the low side and the cut does not narrow the cell, the low child
/// would equal its parent, so the balanced break is used instead.
fn upper_num_low<N: AnnNum>(
    br1: usize,
    br2: usize,
    n: usize,
    value: N,
    bounds: &Rect<N>,
    axis: usize,
) -> usize {
    if br2 == n && value >= bounds.hi[axis] {
        balanced_num_low(br1, br2, n)
    } else {
        br2
    }
}

/// A compromise between [`StandardSplit`](super::StandardSplit) and
/// [`MidpointSplit`](super::MidpointSplit).
///
/// Cuts as close to the median as possible while bounding the aspect ratio of both children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FairSplit;

impl<N: AnnNum> Split<N> for FairSplit {
    fn split(points: &PointSet<N>, indices: &mut [u32], bounds: &Rect<N>) -> Cut<N> {
        let axis = longest_side_axis(points, indices, bounds);
        let (lo_cut, hi_cut) = legal_cuts(bounds, axis);

        if split_balance(points, indices, axis, lo_cut) >= 0 {
            let (br1, _) = plane_split(points, indices, axis, lo_cut);
            Cut {
                axis,
                value: lo_cut,
                num_low: br1,
            }
        } else if split_balance(points, indices, axis, hi_cut) <= 0 {
            let (br1, br2) = plane_split(points, indices, axis, hi_cut);
            Cut {
                axis,
                value: hi_cut,
                num_low: upper_num_low(br1, br2, indices.len(), hi_cut, bounds, axis),
            }
        } else {
            let num_low = indices.len() / 2;
            let value = median_split(points, indices, axis, num_low);
            Cut {
                axis,
                value,
                num_low,
            }
        }
    }
}

/// [`FairSplit`] with the sliding behaviour of
/// [`SlidingMidpointSplit`](super::SlidingMidpointSplit): a legal cut beyond the data snaps onto
/// the extreme point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlidingFairSplit;

impl<N: AnnNum> Split<N> for SlidingFairSplit {
    fn split(points: &PointSet<N>, indices: &mut [u32], bounds: &Rect<N>) -> Cut<N> {
        let n = indices.len();
        let axis = longest_side_axis(points, indices, bounds);
        let (lo_cut, hi_cut) = legal_cuts(bounds, axis);
        let (min, max) = min_max(points, indices, axis);

        if split_balance(points, indices, axis, lo_cut) >= 0 {
            if max > lo_cut {
                let (br1, _) = plane_split(points, indices, axis, lo_cut);
                Cut {
                    axis,
                    value: lo_cut,
                    num_low: br1,
                }
            } else {
                plane_split(points, indices, axis, max);
                Cut {
                    axis,
                    value: max,
                    num_low: n - 1,
                }
            }
        } else if split_balance(points, indices, axis, hi_cut) <= 0 {
            if min < hi_cut {
                let (br1, br2) = plane_split(points, indices, axis, hi_cut);
                Cut {
                    axis,
                    value: hi_cut,
                    num_low: upper_num_low(br1, br2, n, hi_cut, bounds, axis),
                }
            } else {
                plane_split(points, indices, axis, min);
                Cut {
                    axis,
                    value: min,
                    num_low: 1,
                }
            }
        } else {
            let num_low = n / 2;
            let value = median_split(points, indices, axis, num_low);
            Cut {
                axis,
                value,
                num_low,
            }
        }
    }
}
