//! In-place partitioning of index ranges.
//!
//! Every routine here reorders a slice of point indices without resizing it. Construction hands
//! each recursive call a sub-slice of one index buffer owned by the tree.

use crate::kdtree::points::PointSet;
use crate::kdtree::rect::Rect;
use crate::r#type::AnnNum;

/// Move every index satisfying `is_low` to the front. Returns the number of such indices.
fn partition_in_place(indices: &mut [u32], mut is_low: impl FnMut(u32) -> bool) -> usize {
    let mut l = 0;
    let mut r = indices.len();
    loop {
        while l < r && is_low(indices[l]) {
            l += 1;
        }
        while l < r && !is_low(indices[r - 1]) {
            r -= 1;
        }
        if l >= r {
            break;
        }
        indices.swap(l, r - 1);
        l += 1;
        r -= 1;
    }
    l
}

/// Partition by the plane `point[axis] == cut`.
///
/// Returns `(br1, br2)`: `indices[..br1]` lie strictly below the plane, `indices[br1..br2]` lie
/// on it and `indices[br2..]` lie strictly above.
pub(crate) fn plane_split<N: AnnNum>(
    points: &PointSet<N>,
    indices: &mut [u32],
    axis: usize,
    cut: N,
) -> (usize, usize) {
    let br1 = partition_in_place(indices, |idx| points.coord(idx, axis) < cut);
    let br2 = br1 + partition_in_place(&mut indices[br1..], |idx| points.coord(idx, axis) <= cut);
    (br1, br2)
}

/// Move the indices of points inside `rect` to the front. Returns their number.
pub(crate) fn box_split<N: AnnNum>(
    points: &PointSet<N>,
    indices: &mut [u32],
    rect: &Rect<N>,
) -> usize {
    partition_in_place(indices, |idx| rect.contains(points.point(idx as usize)))
}

/// Number of points strictly below `cut` minus half the number of points.
///
/// Non-negative when a cut at `cut` would leave at least half the points on the low side.
pub(crate) fn split_balance<N: AnnNum>(
    points: &PointSet<N>,
    indices: &[u32],
    axis: usize,
    cut: N,
) -> isize {
    let below = indices
        .iter()
        .filter(|&&idx| points.coord(idx, axis) < cut)
        .count();
    below as isize - (indices.len() / 2) as isize
}

/// Smallest and largest coordinate along `axis`, as `(min, max)`.
///
/// `indices` must not be empty.
pub(crate) fn min_max<N: AnnNum>(points: &PointSet<N>, indices: &[u32], axis: usize) -> (N, N) {
    let first = points.coord(indices[0], axis);
    indices[1..].iter().fold((first, first), |(min, max), &idx| {
        let c = points.coord(idx, axis);
        (min.min(c), max.max(c))
    })
}

/// Extent of the points along `axis`.
#[inline]
pub(crate) fn spread<N: AnnNum>(points: &PointSet<N>, indices: &[u32], axis: usize) -> N {
    let (min, max) = min_max(points, indices, axis);
    max - min
}

/// The axis with the largest spread. Ties go to the lowest axis.
pub(crate) fn max_spread<N: AnnNum>(points: &PointSet<N>, indices: &[u32]) -> usize {
    if indices.is_empty() {
        return 0;
    }
    let mut best_axis = 0;
    let mut best = N::zero();
    for axis in 0..points.dimension() {
        let s = spread(points, indices, axis);
        if s > best {
            best = s;
            best_axis = axis;
        }
    }
    best_axis
}

/// Select the `num_low` smallest points along `axis` into `indices[..num_low]`.
///
/// Afterwards the largest of them sits at `num_low - 1` and the smallest of the rest at
/// `num_low`. Returns the mean of those two coordinates. Requires
/// `0 < num_low < indices.len()`.
pub(crate) fn median_split<N: AnnNum>(
    points: &PointSet<N>,
    indices: &mut [u32],
    axis: usize,
    num_low: usize,
) -> N {
    let v = |ix: &[u32], i: usize| points.coord(ix[i], axis);

    let mut l = 0;
    let mut r = indices.len() - 1;
    while l < r {
        let mut i = (l + r) / 2;
        // median of three puts a sentinel no smaller than the pivot at r
        if v(indices, i) > v(indices, r) {
            indices.swap(i, r);
        }
        indices.swap(l, i);

        let c = v(indices, l);
        i = l;
        let mut k = r;
        loop {
            i += 1;
            while v(indices, i) < c {
                i += 1;
            }
            k -= 1;
            while v(indices, k) > c {
                k -= 1;
            }
            if i < k {
                indices.swap(i, k);
            } else {
                break;
            }
        }
        indices.swap(l, k);

        if k > num_low {
            r = k - 1;
        } else if k < num_low {
            l = k + 1;
        } else {
            break;
        }
    }

    let mut k = 0;
    let mut c = v(indices, 0);
    for i in 1..num_low {
        if v(indices, i) > c {
            c = v(indices, i);
            k = i;
        }
    }
    indices.swap(num_low - 1, k);

    (v(indices, num_low - 1) + v(indices, num_low)) * N::from_f64_lossy(0.5)
}

#[cfg(test)]
mod test {
    use super::*;

    fn line(xs: &[f64]) -> PointSet<f64> {
        PointSet::try_new(1, xs.to_vec()).unwrap()
    }

    #[test]
    fn plane_split_with_ties() {
        let points = line(&[3., 1., 2., 2., 5., 2., 0.]);
        let mut indices: Vec<u32> = (0..7).collect();
        let (br1, br2) = plane_split(&points, &mut indices, 0, 2.);
        assert_eq!((br1, br2), (2, 5));
        assert!(indices[..br1].iter().all(|&i| points.coord(i, 0) < 2.));
        assert!(indices[br1..br2].iter().all(|&i| points.coord(i, 0) == 2.));
        assert!(indices[br2..].iter().all(|&i| points.coord(i, 0) > 2.));

        let mut sorted = indices.clone();
        sorted.sort();
        assert_eq!(sorted, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn median_split_is_exact() {
        let xs = [9., 4., 4., 7., 1., 4., 8., 0., 3., 4.];
        let points = line(&xs);
        for num_low in 1..xs.len() {
            let mut indices: Vec<u32> = (0..xs.len() as u32).collect();
            let cut = median_split(&points, &mut indices, 0, num_low);

            let mut sorted = xs.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(cut, (sorted[num_low - 1] + sorted[num_low]) / 2.);
            assert_eq!(points.coord(indices[num_low - 1], 0), sorted[num_low - 1]);
            assert_eq!(points.coord(indices[num_low], 0), sorted[num_low]);
            assert!(indices[..num_low]
                .iter()
                .all(|&i| points.coord(i, 0) <= sorted[num_low - 1]));
            assert!(indices[num_low..]
                .iter()
                .all(|&i| points.coord(i, 0) >= sorted[num_low]));
        }
    }

    #[test]
    fn median_split_all_equal() {
        let points = line(&[2.; 6]);
        let mut indices: Vec<u32> = (0..6).collect();
        assert_eq!(median_split(&points, &mut indices, 0, 3), 2.);
    }

    #[test]
    fn spread_and_balance() {
        let points = PointSet::try_new(2, vec![0., 5., 1., -5., 2., 0., 3., 1.]).unwrap();
        let indices: Vec<u32> = (0..4).collect();
        assert_eq!(min_max(&points, &indices, 1), (-5., 5.));
        assert_eq!(spread(&points, &indices, 0), 3.);
        assert_eq!(max_spread(&points, &indices), 1);
        assert_eq!(split_balance(&points, &indices, 0, 0.5), -1);
        assert_eq!(split_balance(&points, &indices, 0, 2.5), 1);
    }

    #[test]
    fn box_split_moves_inside_first() {
        let points = PointSet::try_new(2, vec![5., 5., 0.5, 0.5, 2., 2., 1., 0.]).unwrap();
        let mut indices: Vec<u32> = (0..4).collect();
        let rect = Rect::new(vec![0., 0.], vec![1., 1.]);
        let n_in = box_split(&points, &mut indices, &rect);
        assert_eq!(n_in, 2);
        let mut inside = indices[..n_in].to_vec();
        inside.sort();
        assert_eq!(inside, vec![1, 3]);
    }
}
