use tinyvec::TinyVec;

use crate::kdtree::points::PointSet;
use crate::r#type::AnnNum;

/// Half-spaces bounding the inner box of a shrink node. Up to two per axis.
pub type HalfSpaces<N> = TinyVec<[HalfSpace<N>; 4]>;

/// An axis-aligned rectangle given by its low and high corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect<N: AnnNum> {
    pub(crate) lo: Vec<N>,
    pub(crate) hi: Vec<N>,
}

impl<N: AnnNum> Rect<N> {
    /// Create a new rectangle from its corners.
    ///
    /// ## Panics
    ///
    /// - If the corners have different dimensions.
    pub fn new(lo: Vec<N>, hi: Vec<N>) -> Self {
        assert_eq!(lo.len(), hi.len(), "Rectangle corners differ in dimension.");
        Self { lo, hi }
    }

    /// A degenerate rectangle at the origin.
    pub(crate) fn zero(dimension: usize) -> Self {
        Self {
            lo: vec![N::zero(); dimension],
            hi: vec![N::zero(); dimension],
        }
    }

    /// The tightest rectangle enclosing the given points.
    ///
    /// `indices` must not be empty.
    pub(crate) fn enclosing(points: &PointSet<N>, indices: &[u32]) -> Self {
        let first = points.point(indices[0] as usize);
        let mut lo = first.to_vec();
        let mut hi = first.to_vec();
        for &idx in &indices[1..] {
            for (axis, &c) in points.point(idx as usize).iter().enumerate() {
                if c < lo[axis] {
                    lo[axis] = c;
                }
                if c > hi[axis] {
                    hi[axis] = c;
                }
            }
        }
        Self { lo, hi }
    }

    /// The dimension of this rectangle.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.lo.len()
    }

    /// The low corner.
    pub fn lo(&self) -> &[N] {
        &self.lo
    }

    /// The high corner.
    pub fn hi(&self) -> &[N] {
        &self.hi
    }

    /// Length of the side along `axis`.
    #[inline]
    pub fn side(&self, axis: usize) -> N {
        self.hi[axis] - self.lo[axis]
    }

    /// Length of the longest side.
    pub fn longest_side(&self) -> N {
        (0..self.dimension()).fold(N::zero(), |acc, axis| acc.max(self.side(axis)))
    }

    /// Ratio of the longest side to the shortest side.
    pub fn aspect_ratio(&self) -> N {
        let first = self.side(0);
        let (min, max) = (1..self.dimension()).fold((first, first), |(min, max), axis| {
            let side = self.side(axis);
            (min.min(side), max.max(side))
        });
        max / min
    }

    /// Returns `true` if `point` lies in this rectangle, boundary included.
    #[inline]
    pub fn contains(&self, point: &[N]) -> bool {
        point
            .iter()
            .zip(self.lo.iter().zip(&self.hi))
            .all(|(&c, (&lo, &hi))| c >= lo && c <= hi)
    }

    /// Squared distance from `point` to the nearest point of this rectangle.
    ///
    /// Zero if the point lies inside.
    pub fn sq_distance(&self, point: &[N]) -> N {
        let mut dist = N::zero();
        for (axis, &c) in point.iter().enumerate() {
            if c < self.lo[axis] {
                let d = self.lo[axis] - c;
                dist = dist + d * d;
            } else if c > self.hi[axis] {
                let d = c - self.hi[axis];
                dist = dist + d * d;
            }
        }
        dist
    }

    /// The half-spaces carving this rectangle out of `outer`.
    ///
    /// Only sides of this rectangle that lie strictly inside `outer` produce a half-space.
    pub(crate) fn to_half_spaces(&self, outer: &Rect<N>) -> HalfSpaces<N> {
        let mut bounds = HalfSpaces::new();
        for axis in 0..self.dimension() {
            if self.lo[axis] > outer.lo[axis] {
                bounds.push(HalfSpace::lower(axis, self.lo[axis]));
            }
            if self.hi[axis] < outer.hi[axis] {
                bounds.push(HalfSpace::upper(axis, self.hi[axis]));
            }
        }
        bounds
    }

    /// The inner box obtained by clipping this rectangle against `bounds`.
    pub(crate) fn project(&self, bounds: &[HalfSpace<N>]) -> Rect<N> {
        let mut inner = self.clone();
        for bound in bounds {
            bound.project(&mut inner.lo);
            bound.project(&mut inner.hi);
        }
        inner
    }
}

/// An axis-orthogonal half-space.
///
/// With `side == 1` the half-space holds the points with `point[axis] >= cut`, with
/// `side == -1` the points with `point[axis] <= cut`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HalfSpace<N: AnnNum> {
    pub(crate) axis: usize,
    pub(crate) cut: N,
    pub(crate) side: i8,
}

impl<N: AnnNum> HalfSpace<N> {
    /// A half-space bounding from below along `axis`.
    pub fn lower(axis: usize, cut: N) -> Self {
        Self { axis, cut, side: 1 }
    }

    /// A half-space bounding from above along `axis`.
    pub fn upper(axis: usize, cut: N) -> Self {
        Self {
            axis,
            cut,
            side: -1,
        }
    }

    /// The cutting axis.
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// The cutting value.
    pub fn cut(&self) -> N {
        self.cut
    }

    /// `1` for a lower bound, `-1` for an upper bound.
    pub fn side(&self) -> i8 {
        self.side
    }

    /// Returns `true` if `point` lies in this half-space.
    #[inline]
    pub fn inside(&self, point: &[N]) -> bool {
        !self.outside(point)
    }

    /// Returns `true` if `point` lies strictly outside this half-space.
    #[inline]
    pub fn outside(&self, point: &[N]) -> bool {
        if self.side > 0 {
            point[self.axis] < self.cut
        } else {
            point[self.axis] > self.cut
        }
    }

    /// Squared distance from `point` to the bounding plane.
    #[inline]
    pub fn sq_distance(&self, point: &[N]) -> N {
        let d = point[self.axis] - self.cut;
        d * d
    }

    /// Clamp `point` onto the bounding plane if it lies outside.
    #[inline]
    pub fn project(&self, point: &mut [N]) {
        if self.outside(point) {
            point[self.axis] = self.cut;
        }
    }
}
