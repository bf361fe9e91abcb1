//! Shared test support: seeded point clouds and a linear-scan oracle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::kdtree::r#trait::validate_query;
use crate::kdtree::{AnnIndex, Neighbor, PointSet, QueryOptions, QueryStats, RadiusNeighbors};
use crate::r#type::AnnNum;

/// `n` points drawn uniformly from the unit cube.
pub(crate) fn uniform_cloud<N: AnnNum>(dimension: usize, n: usize, seed: u64) -> PointSet<N> {
    let mut rng = StdRng::seed_from_u64(seed);
    let coords = (0..dimension * n)
        .map(|_| N::from_f64_lossy(rng.gen::<f64>()))
        .collect();
    PointSet::try_new(dimension, coords).unwrap()
}

/// `n` points in a handful of tight Gaussian-ish clusters inside a large cube, the kind of input
/// box-decomposition trees are meant for.
pub(crate) fn clustered_cloud<N: AnnNum>(
    dimension: usize,
    n: usize,
    num_clusters: usize,
    seed: u64,
) -> PointSet<N> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers: Vec<Vec<f64>> = (0..num_clusters)
        .map(|_| (0..dimension).map(|_| rng.gen_range(-100.0..100.0)).collect())
        .collect();
    let mut coords = Vec::with_capacity(dimension * n);
    for i in 0..n {
        let center = &centers[i % num_clusters];
        for c in center {
            let offset: f64 = (0..4).map(|_| rng.gen_range(-0.5..0.5)).sum();
            coords.push(N::from_f64_lossy(c + offset * 0.1));
        }
    }
    PointSet::try_new(dimension, coords).unwrap()
}

/// A linear scan over all points.
pub(crate) struct BruteForce<'a, N: AnnNum> {
    pub(crate) points: &'a PointSet<N>,
}

impl<'a, N: AnnNum> BruteForce<'a, N> {
    pub(crate) fn new(points: &'a PointSet<N>) -> Self {
        Self { points }
    }

    fn sorted_within(&self, query: &[N], sq_radius: N, options: &QueryOptions) -> Vec<Neighbor<N>> {
        let mut all: Vec<Neighbor<N>> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, point)| Neighbor {
                index: i as u32,
                sq_dist: crate::kdtree::points::sq_dist(query, point),
            })
            .filter(|n| n.sq_dist <= sq_radius)
            .filter(|n| options.allow_self_match || n.sq_dist != N::zero())
            .collect();
        all.sort_by(|a, b| a.sq_dist.partial_cmp(&b.sq_dist).unwrap());
        all
    }
}

impl<N: AnnNum> AnnIndex<N> for BruteForce<'_, N> {
    fn dimension(&self) -> usize {
        self.points.dimension()
    }

    fn num_points(&self) -> usize {
        self.points.len()
    }

    fn search_with_stats(
        &self,
        query: &[N],
        k: usize,
        options: &QueryOptions,
    ) -> Result<(Vec<Neighbor<N>>, QueryStats)> {
        validate_query(self, query, k, options)?;
        let mut neighbors = self.sorted_within(query, N::infinity(), options);
        neighbors.truncate(k);
        Ok((neighbors, QueryStats::default()))
    }

    fn fixed_radius_search_with_stats(
        &self,
        query: &[N],
        sq_radius: N,
        k: usize,
        options: &QueryOptions,
    ) -> Result<(RadiusNeighbors<N>, QueryStats)> {
        validate_query(self, query, k, options)?;
        let mut neighbors = self.sorted_within(query, sq_radius, options);
        let num_in_range = neighbors.len();
        neighbors.truncate(k);
        Ok((
            RadiusNeighbors {
                neighbors,
                num_in_range,
            },
            QueryStats::default(),
        ))
    }
}
