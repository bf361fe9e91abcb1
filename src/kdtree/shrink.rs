//! Shrink rules deciding between a split and a shrink in box-decomposition trees.

use std::fmt;
use std::str::FromStr;

use crate::error::AnnError;
use crate::kdtree::constants::{BD_CT_THRESH, BD_FRACTION, BD_GAP_THRESH, BD_MAX_SPLIT_FAC};
use crate::kdtree::points::PointSet;
use crate::kdtree::rect::Rect;
use crate::kdtree::split::SplitRule;
use crate::r#type::AnnNum;

/// Selects how a box-decomposition tree looks for inner boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShrinkRule {
    /// Never shrink. The tree has the shape of a kd-tree.
    None,
    /// Shrink to the tight bounding box of the points when it is clearly smaller than the cell.
    /// The suggested rule.
    #[default]
    Simple,
    /// Split repeatedly towards the denser half and shrink to the resulting box when that took
    /// many splits.
    Centroid,
}

/// How a cell is decomposed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Decomposition<N: AnnNum> {
    Split,
    Shrink(Rect<N>),
}

impl ShrinkRule {
    /// Decide how to decompose the cell `bounds` holding `indices`.
    ///
    /// May reorder `indices`.
    pub(crate) fn select<N: AnnNum>(
        self,
        points: &PointSet<N>,
        indices: &mut [u32],
        bounds: &Rect<N>,
        split_rule: SplitRule,
    ) -> Decomposition<N> {
        match self {
            Self::None => Decomposition::Split,
            Self::Simple => try_simple_shrink(points, indices, bounds),
            Self::Centroid => try_centroid_shrink(points, indices, bounds, split_rule),
        }
    }

    /// All rules, in declaration order.
    pub const ALL: [ShrinkRule; 3] = [Self::None, Self::Simple, Self::Centroid];
}

fn try_simple_shrink<N: AnnNum>(
    points: &PointSet<N>,
    indices: &[u32],
    bounds: &Rect<N>,
) -> Decomposition<N> {
    let mut inner = Rect::enclosing(points, indices);
    let gap_thresh = inner.longest_side() * N::from_f64_lossy(BD_GAP_THRESH);

    let mut shrink_sides = 0;
    for axis in 0..inner.dimension() {
        if bounds.hi[axis] - inner.hi[axis] < gap_thresh {
            inner.hi[axis] = bounds.hi[axis];
        } else {
            shrink_sides += 1;
        }
        if inner.lo[axis] - bounds.lo[axis] < gap_thresh {
            inner.lo[axis] = bounds.lo[axis];
        } else {
            shrink_sides += 1;
        }
    }

    log::trace!("simple shrink: {} shrinking sides", shrink_sides);
    if shrink_sides >= BD_CT_THRESH {
        Decomposition::Shrink(inner)
    } else {
        Decomposition::Split
    }
}

fn try_centroid_shrink<N: AnnNum>(
    points: &PointSet<N>,
    indices: &mut [u32],
    bounds: &Rect<N>,
    split_rule: SplitRule,
) -> Decomposition<N> {
    let n = indices.len();
    let goal = (n as f64 * BD_FRACTION) as usize;

    let mut inner = bounds.clone();
    let mut offset = 0;
    let mut n_sub = n;
    let mut splits = 0usize;
    while n_sub > goal {
        let cut = split_rule.split(points, &mut indices[offset..offset + n_sub], &inner);
        splits += 1;

        if cut.num_low > n_sub / 2 {
            inner.hi[cut.axis] = cut.value;
            n_sub = cut.num_low;
        } else {
            inner.lo[cut.axis] = cut.value;
            offset += cut.num_low;
            n_sub -= cut.num_low;
        }
    }

    log::trace!("centroid shrink: {} splits for {} points", splits, n);
    if splits as f64 > inner.dimension() as f64 * BD_MAX_SPLIT_FAC {
        Decomposition::Shrink(inner)
    } else {
        Decomposition::Split
    }
}

impl fmt::Display for ShrinkRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Simple => "simple",
            Self::Centroid => "centroid",
        };
        f.write_str(name)
    }
}

impl FromStr for ShrinkRule {
    type Err = AnnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "simple" | "suggest" | "suggested" => Ok(Self::Simple),
            "centroid" => Ok(Self::Centroid),
            _ => Err(AnnError::UnknownShrinkRule(s.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// A tight cluster in the corner of a large cell.
    fn cluster() -> (PointSet<f64>, Vec<u32>, Rect<f64>) {
        let points =
            PointSet::try_new(2, vec![1., 1., 1.5, 1.2, 1.2, 1.8, 2., 2., 1.1, 1.9]).unwrap();
        let indices = (0..5).collect();
        let bounds = Rect::new(vec![0.8, 0.8], vec![100., 100.]);
        (points, indices, bounds)
    }

    #[test]
    fn simple_shrink_snaps_close_sides() {
        let (points, mut indices, bounds) = cluster();
        let decomposition =
            ShrinkRule::Simple.select(&points, &mut indices, &bounds, SplitRule::default());
        // the low sides are within half the cluster size of the cell, the high sides are far
        assert_eq!(
            decomposition,
            Decomposition::Shrink(Rect::new(vec![0.8, 0.8], vec![2., 2.]))
        );
    }

    #[test]
    fn simple_shrink_declines_tight_cell() {
        let (points, mut indices, _) = cluster();
        let bounds = Rect::new(vec![0.8, 0.8], vec![2.4, 2.4]);
        let decomposition =
            ShrinkRule::Simple.select(&points, &mut indices, &bounds, SplitRule::default());
        assert_eq!(decomposition, Decomposition::Split);
    }

    #[test]
    fn centroid_shrink_zooms_into_cluster() {
        let (points, mut indices, bounds) = cluster();
        let decomposition =
            ShrinkRule::Centroid.select(&points, &mut indices, &bounds, SplitRule::Midpoint);
        match decomposition {
            Decomposition::Shrink(inner) => {
                assert!(inner.hi[0] < 100. && inner.hi[1] < 100.);
                assert!(points.iter().any(|p| inner.contains(p)));
            }
            Decomposition::Split => panic!("expected a shrink"),
        }
        let mut sorted = indices.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn none_always_splits() {
        let (points, mut indices, bounds) = cluster();
        assert_eq!(
            ShrinkRule::None.select(&points, &mut indices, &bounds, SplitRule::default()),
            Decomposition::Split
        );
    }

    #[test]
    fn parses_rule_names() {
        assert_eq!("suggest".parse::<ShrinkRule>().unwrap(), ShrinkRule::Simple);
        for rule in ShrinkRule::ALL {
            assert_eq!(rule.to_string().parse::<ShrinkRule>().unwrap(), rule);
        }
        assert!(matches!(
            "tight".parse::<ShrinkRule>(),
            Err(AnnError::UnknownShrinkRule(_))
        ));
    }
}
