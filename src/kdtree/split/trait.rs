use crate::kdtree::constants::SPLIT_EPSILON;
use crate::kdtree::partition::spread;
use crate::kdtree::points::PointSet;
use crate::kdtree::rect::Rect;
use crate::r#type::AnnNum;

/// The outcome of a splitting routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cut<N: AnnNum> {
    /// The cutting axis.
    pub axis: usize,
    /// The cutting value along `axis`.
    pub value: N,
    /// The number of indices on the low side. These come first in the partitioned range.
    pub num_low: usize,
}

/// A rule for cutting a cell of a kd-tree in two.
///
/// Implementations partition `indices` in place so that the first [`Cut::num_low`] entries form
/// the low side. `indices` holds at least two entries and every point it references lies in
/// `bounds`.
pub trait Split<N: AnnNum> {
    /// Choose a cut for the points of `indices` and partition them accordingly.
    fn split(points: &PointSet<N>, indices: &mut [u32], bounds: &Rect<N>) -> Cut<N>;
}

/// An axis of (almost) maximal side length in `bounds`, preferring the one along which the
/// points have the largest spread.
pub(crate) fn longest_side_axis<N: AnnNum>(
    points: &PointSet<N>,
    indices: &[u32],
    bounds: &Rect<N>,
) -> usize {
    let threshold = (N::one() - N::from_f64_lossy(SPLIT_EPSILON)) * bounds.longest_side();

    let mut axis = 0;
    let mut max_spread = -N::one();
    for d in 0..bounds.dimension() {
        if bounds.side(d) >= threshold {
            let s = spread(points, indices, d);
            if s > max_spread {
                max_spread = s;
                axis = d;
            }
        }
    }
    axis
}

/// Pick the plane-split break closest to a balanced split without crossing it.
#[inline]
pub(crate) fn balanced_num_low(br1: usize, br2: usize, n: usize) -> usize {
    if br1 > n / 2 {
        br1
    } else if br2 < n / 2 {
        br2
    } else {
        n / 2
    }
}
