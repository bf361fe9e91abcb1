//! Splitting rules for kd-tree construction.

mod fair;
mod midpoint;
mod standard;
pub(crate) mod r#trait;

use std::fmt;
use std::str::FromStr;

pub use fair::{FairSplit, SlidingFairSplit};
pub use midpoint::{MidpointSplit, SlidingMidpointSplit};
pub use r#trait::{Cut, Split};
pub use standard::StandardSplit;

use crate::error::AnnError;
use crate::kdtree::points::PointSet;
use crate::kdtree::rect::Rect;
use crate::r#type::AnnNum;

/// Selects the splitting routine used while building a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SplitRule {
    /// [`StandardSplit`]
    Standard,
    /// [`MidpointSplit`]
    Midpoint,
    /// [`FairSplit`]
    Fair,
    /// [`SlidingMidpointSplit`]. The suggested rule.
    #[default]
    SlidingMidpoint,
    /// [`SlidingFairSplit`]
    SlidingFair,
}

impl SplitRule {
    /// Run this rule on `indices`.
    pub fn split<N: AnnNum>(
        self,
        points: &PointSet<N>,
        indices: &mut [u32],
        bounds: &Rect<N>,
    ) -> Cut<N> {
        match self {
            Self::Standard => StandardSplit::split(points, indices, bounds),
            Self::Midpoint => MidpointSplit::split(points, indices, bounds),
            Self::Fair => FairSplit::split(points, indices, bounds),
            Self::SlidingMidpoint => SlidingMidpointSplit::split(points, indices, bounds),
            Self::SlidingFair => SlidingFairSplit::split(points, indices, bounds),
        }
    }

    /// All rules, in declaration order.
    pub const ALL: [SplitRule; 5] = [
        Self::Standard,
        Self::Midpoint,
        Self::Fair,
        Self::SlidingMidpoint,
        Self::SlidingFair,
    ];
}

impl fmt::Display for SplitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Standard => "standard",
            Self::Midpoint => "midpoint",
            Self::Fair => "fair",
            Self::SlidingMidpoint => "sliding_midpoint",
            Self::SlidingFair => "sliding_fair",
        };
        f.write_str(name)
    }
}

impl FromStr for SplitRule {
    type Err = AnnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "standard" | "kd" => Ok(Self::Standard),
            "midpoint" => Ok(Self::Midpoint),
            "fair" => Ok(Self::Fair),
            "sliding_midpoint" | "suggest" | "suggested" => Ok(Self::SlidingMidpoint),
            "sliding_fair" => Ok(Self::SlidingFair),
            _ => Err(AnnError::UnknownSplitRule(s.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cloud() -> PointSet<f64> {
        PointSet::try_new(
            2,
            vec![
                0., 0., 1., 9., 2., 1., 3., 8., 4., 4., 5., 5., 6., 2., 7., 7., 8., 3., 20., 6.,
            ],
        )
        .unwrap()
    }

    #[test]
    fn every_rule_partitions_at_its_cut() {
        let points = cloud();
        let n = points.len() as u32;
        let indices: Vec<u32> = (0..n).collect();
        let bounds = Rect::enclosing(&points, &indices);

        for rule in SplitRule::ALL {
            let mut indices = indices.clone();
            let cut = rule.split(&points, &mut indices, &bounds);
            assert!(cut.num_low <= indices.len(), "{rule}");
            for &idx in &indices[..cut.num_low] {
                assert!(points.coord(idx, cut.axis) <= cut.value, "{rule}");
            }
            for &idx in &indices[cut.num_low..] {
                assert!(points.coord(idx, cut.axis) >= cut.value, "{rule}");
            }

            let mut sorted = indices.clone();
            sorted.sort();
            assert_eq!(sorted, (0..n).collect::<Vec<_>>(), "{rule}");
        }
    }

    #[test]
    fn standard_cuts_at_median_of_widest_axis() {
        let points = cloud();
        let mut indices: Vec<u32> = (0..10).collect();
        let bounds = Rect::enclosing(&points, &indices);
        let cut = SplitRule::Standard.split(&points, &mut indices, &bounds);
        assert_eq!(cut.axis, 0);
        assert_eq!(cut.num_low, 5);
        assert_eq!(cut.value, 4.5);
    }

    #[test]
    fn sliding_midpoint_slides_onto_data() {
        // the cell is much wider than the data, so the midpoint misses every point
        let points = PointSet::try_new(1, vec![0., 1., 2., 3.]).unwrap();
        let mut indices: Vec<u32> = (0..4).collect();
        let bounds = Rect::new(vec![0.], vec![100.]);

        let cut = SplitRule::SlidingMidpoint.split(&points, &mut indices, &bounds);
        assert_eq!(cut.value, 3.);
        assert_eq!(cut.num_low, 3);
        assert_eq!(indices[3], 3);

        let mut indices: Vec<u32> = (0..4).collect();
        let cut = SplitRule::Midpoint.split(&points, &mut indices, &bounds);
        assert_eq!(cut.value, 50.);
        assert_eq!(cut.num_low, 4);
    }

    #[test]
    fn fair_split_respects_aspect_ratio() {
        // a 12 x 3 cell: cuts must stay at least 1 away from either end of the long side
        let points = PointSet::try_new(2, vec![0., 0., 0.1, 1., 0.2, 2., 0.3, 3., 12., 0.])
            .unwrap();
        let mut indices: Vec<u32> = (0..5).collect();
        let bounds = Rect::new(vec![0., 0.], vec![12., 3.]);
        let cut = SplitRule::Fair.split(&points, &mut indices, &bounds);
        assert_eq!(cut.axis, 0);
        assert_eq!(cut.value, 1.);
        assert_eq!(cut.num_low, 4);
    }

    #[test]
    fn coincident_points_split_evenly() {
        let points = PointSet::try_new(2, vec![1.; 12]).unwrap();
        let indices: Vec<u32> = (0..6).collect();
        let bounds = Rect::enclosing(&points, &indices);
        for rule in SplitRule::ALL {
            let mut indices = indices.clone();
            let cut = rule.split(&points, &mut indices, &bounds);
            assert!(cut.num_low > 0 && cut.num_low < 6, "{rule}: {}", cut.num_low);
        }
    }

    #[test]
    fn parses_rule_names() {
        assert_eq!("suggest".parse::<SplitRule>().unwrap(), SplitRule::SlidingMidpoint);
        assert_eq!("Sliding-Fair".parse::<SplitRule>().unwrap(), SplitRule::SlidingFair);
        for rule in SplitRule::ALL {
            assert_eq!(rule.to_string().parse::<SplitRule>().unwrap(), rule);
        }
        assert!(matches!(
            "diagonal".parse::<SplitRule>(),
            Err(AnnError::UnknownSplitRule(_))
        ));
    }
}
