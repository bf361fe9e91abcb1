use bytemuck::try_cast_slice;

use crate::error::{AnnError, Result};
use crate::r#type::AnnNum;

/// An ordered collection of points in `dimension`-dimensional space.
///
/// Coordinates are stored row-major in a single flat buffer, so point `i` occupies
/// `coords[i * dimension..(i + 1) * dimension]`. Points are addressed by their insertion index
/// and never move once the set is created.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet<N: AnnNum> {
    pub(crate) dimension: usize,
    pub(crate) coords: Vec<N>,
}

impl<N: AnnNum> PointSet<N> {
    /// Create a point set from interleaved coordinates.
    pub fn try_new(dimension: usize, coords: Vec<N>) -> Result<Self> {
        if dimension == 0 {
            return Err(AnnError::General(
                "Point dimension must be at least 1.".to_string(),
            ));
        }
        if coords.len() % dimension != 0 {
            return Err(AnnError::General(format!(
                "Coordinate buffer of length {} is not a multiple of dimension {}.",
                coords.len(),
                dimension
            )));
        }
        Ok(Self { dimension, coords })
    }

    /// Create a point set by casting a native-endian byte buffer of coordinates.
    pub fn try_from_bytes(dimension: usize, data: &[u8]) -> Result<Self> {
        let coords: &[N] = try_cast_slice(data).map_err(|err| {
            AnnError::General(format!(
                "Cannot read {}-byte coordinates from buffer: {}",
                N::BYTES_PER_ELEMENT,
                err
            ))
        })?;
        Self::try_new(dimension, coords.to_vec())
    }

    /// The dimension of every point in this set.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The number of points in this set.
    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len() / self.dimension
    }

    /// Returns `true` if this set holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// The coordinates of point `index`.
    #[inline]
    pub fn point(&self, index: usize) -> &[N] {
        &self.coords[index * self.dimension..(index + 1) * self.dimension]
    }

    /// The coordinate of point `index` along `axis`.
    #[inline]
    pub(crate) fn coord(&self, index: u32, axis: usize) -> N {
        self.coords[index as usize * self.dimension + axis]
    }

    /// The underlying interleaved coordinate buffer.
    pub fn coords(&self) -> &[N] {
        &self.coords
    }

    /// Iterate over all points in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &[N]> {
        self.coords.chunks_exact(self.dimension)
    }
}

/// Squared Euclidean distance between two points of equal dimension.
#[inline]
pub(crate) fn sq_dist<N: AnnNum>(a: &[N], b: &[N]) -> N {
    a.iter().zip(b).fold(N::zero(), |acc, (&x, &y)| {
        let d = x - y;
        acc + d * d
    })
}
