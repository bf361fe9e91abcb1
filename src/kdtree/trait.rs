use geo_traits::CoordTrait;

use crate::error::{AnnError, Result};
use crate::kdtree::stats::QueryStats;
use crate::kdtree::traversal::{NodeQueue, SearchContext};
use crate::kdtree::KDTree;
use crate::r#type::AnnNum;

/// Per-query tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryOptions {
    /// Relative error bound. Every reported neighbor is within a factor `1 + eps` of the
    /// distance of the true neighbor of the same rank. `0` makes the search exact. Negative
    /// or NaN bounds are rejected with [`AnnError::InvalidErrorBound`].
    pub eps: f64,
    /// Stop descending once this many points have been visited. `None` (or `Some(0)`) is
    /// unlimited.
    pub max_visit: Option<usize>,
    /// Whether points at distance exactly zero from the query may be reported.
    pub allow_self_match: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            eps: 0.0,
            max_visit: None,
            allow_self_match: true,
        }
    }
}

impl QueryOptions {
    /// Default options with the given error bound.
    pub fn with_eps(eps: f64) -> Self {
        Self {
            eps,
            ..Default::default()
        }
    }
}

/// A reported neighbor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<N: AnnNum> {
    /// Index of the point in the indexed [`PointSet`](crate::kdtree::PointSet).
    pub index: u32,
    /// Squared Euclidean distance to the query.
    pub sq_dist: N,
}

/// The result of a fixed-radius search.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusNeighbors<N: AnnNum> {
    /// Up to `k` closest points within the radius, nearest first.
    pub neighbors: Vec<Neighbor<N>>,
    /// Number of points within the radius, regardless of `k`.
    pub num_in_range: usize,
}

/// A trait for nearest-neighbor queries against a static index.
pub trait AnnIndex<N: AnnNum> {
    /// The point dimension.
    fn dimension(&self) -> usize;

    /// The number of indexed points.
    fn num_points(&self) -> usize;

    /// Find the `k` (approximate) nearest neighbors of `query`, nearest first, together with
    /// the counters collected while searching.
    fn search_with_stats(
        &self,
        query: &[N],
        k: usize,
        options: &QueryOptions,
    ) -> Result<(Vec<Neighbor<N>>, QueryStats)>;

    /// Count the points within squared distance `sq_radius` of `query` and report the `k`
    /// nearest of them.
    fn fixed_radius_search_with_stats(
        &self,
        query: &[N],
        sq_radius: N,
        k: usize,
        options: &QueryOptions,
    ) -> Result<(RadiusNeighbors<N>, QueryStats)>;

    /// Find the `k` (approximate) nearest neighbors of `query`, nearest first.
    ///
    /// ```
    /// use ann_index::kdtree::{AnnIndex, KDTreeBuilder, QueryOptions};
    ///
    /// let mut builder = KDTreeBuilder::<f64>::new(2, 3);
    /// builder.add(&[0., 0.]);
    /// builder.add(&[1., 1.]);
    /// builder.add(&[5., 5.]);
    /// let tree = builder.finish().unwrap();
    ///
    /// let neighbors = tree.search(&[0.9, 0.9], 1, &QueryOptions::default()).unwrap();
    /// assert_eq!(neighbors[0].index, 1);
    /// ```
    fn search(&self, query: &[N], k: usize, options: &QueryOptions) -> Result<Vec<Neighbor<N>>> {
        self.search_with_stats(query, k, options)
            .map(|(neighbors, _)| neighbors)
    }

    /// Fixed-radius search without statistics.
    fn fixed_radius_search(
        &self,
        query: &[N],
        sq_radius: N,
        k: usize,
        options: &QueryOptions,
    ) -> Result<RadiusNeighbors<N>> {
        self.fixed_radius_search_with_stats(query, sq_radius, k, options)
            .map(|(result, _)| result)
    }

    /// Search the neighbors of a coordinate.
    fn search_coord(
        &self,
        coord: &impl CoordTrait<T = N>,
        k: usize,
        options: &QueryOptions,
    ) -> Result<Vec<Neighbor<N>>> {
        let query: Vec<N> = (0..coord.dim().size())
            .map(|axis| coord.nth_or_panic(axis))
            .collect();
        self.search(&query, k, options)
    }
}

/// Reject queries the index cannot answer.
pub(crate) fn validate_query<N: AnnNum>(
    index: &impl AnnIndex<N>,
    query: &[N],
    k: usize,
    options: &QueryOptions,
) -> Result<()> {
    if options.eps.is_nan() || options.eps < 0.0 {
        return Err(AnnError::InvalidErrorBound(options.eps));
    }
    if k > index.num_points() {
        return Err(AnnError::TooManyNeighbors {
            requested: k,
            available: index.num_points(),
        });
    }
    if query.len() != index.dimension() {
        return Err(AnnError::DimensionMismatch {
            expected: index.dimension(),
            actual: query.len(),
        });
    }
    Ok(())
}

fn into_neighbors<N: AnnNum>(ctx: SearchContext<'_, N>) -> (Vec<Neighbor<N>>, QueryStats) {
    let stats = ctx.stats;
    let neighbors = ctx
        .results
        .into_vec()
        .into_iter()
        .map(|(sq_dist, index)| Neighbor { index, sq_dist })
        .collect();
    (neighbors, stats)
}

impl<N: AnnNum> AnnIndex<N> for KDTree<N> {
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
        let mut ctx = SearchContext::new(self, query, k, options);
        if let (Some(root), true) = (self.root, k > 0) {
            ctx.search(root, self.bounds.sq_distance(query));
        }
        Ok(into_neighbors(ctx))
    }

    fn fixed_radius_search_with_stats(
        &self,
        query: &[N],
        sq_radius: N,
        k: usize,
        options: &QueryOptions,
    ) -> Result<(RadiusNeighbors<N>, QueryStats)> {
        validate_query(self, query, k, options)?;
        let mut ctx = SearchContext::new(self, query, k, options).with_sq_radius(sq_radius);
        if let Some(root) = self.root {
            ctx.fixed_radius_search(root, self.bounds.sq_distance(query));
        }
        let num_in_range = ctx.in_range;
        let (neighbors, stats) = into_neighbors(ctx);
        Ok((
            RadiusNeighbors {
                neighbors,
                num_in_range,
            },
            stats,
        ))
    }
}

impl<N: AnnNum> KDTree<N> {
    /// Best-first search: explore cells in increasing order of their distance to the query.
    ///
    /// Returns the same neighbors as [`AnnIndex::search`] for `eps == 0`, usually after
    /// visiting fewer points when `eps > 0` or when `max_visit` is set.
    pub fn priority_search(
        &self,
        query: &[N],
        k: usize,
        options: &QueryOptions,
    ) -> Result<Vec<Neighbor<N>>> {
        self.priority_search_with_stats(query, k, options)
            .map(|(neighbors, _)| neighbors)
    }

    /// Best-first search, also returning the counters collected while searching.
    pub fn priority_search_with_stats(
        &self,
        query: &[N],
        k: usize,
        options: &QueryOptions,
    ) -> Result<(Vec<Neighbor<N>>, QueryStats)> {
        validate_query(self, query, k, options)?;
        let mut ctx = SearchContext::new(self, query, k, options);
        let root = match self.root {
            Some(root) if k > 0 => root,
            _ => return Ok(into_neighbors(ctx)),
        };

        // Each node is queued at most once.
        let mut queue = NodeQueue::new(self.num_nodes());
        queue.insert(self.bounds.sq_distance(query), root)?;
        while !ctx.exhausted() {
            let Some((box_dist, id)) = queue.extract_min() else {
                break;
            };
            if box_dist * ctx.tolerance() >= ctx.results.max_key() {
                break;
            }
            ctx.priority_search(id, box_dist, &mut queue)?;
        }
        Ok(into_neighbors(ctx))
    }

    /// Answer a batch of queries in parallel. `queries` holds one point after another.
    #[cfg(feature = "rayon")]
    pub fn par_search(
        &self,
        queries: &[N],
        k: usize,
        options: &QueryOptions,
    ) -> Result<Vec<Vec<Neighbor<N>>>> {
        use rayon::prelude::*;

        let dimension = self.dimension();
        if dimension == 0 || queries.len() % dimension != 0 {
            return Err(AnnError::General(format!(
                "Query buffer of length {} is not a multiple of the dimension {}.",
                queries.len(),
                dimension
            )));
        }
        queries
            .par_chunks(dimension)
            .map(|query| self.search(query, k, options))
            .collect()
    }
}
