use std::fmt::{Debug, Display};
use std::str::FromStr;

use num_traits::Float;

/// A trait for types that can be used for indexed coordinates and squared distances.
///
/// This trait is sealed and cannot be implemented for external types. Coordinates and squared
/// distances share one scalar type, so only floating point types are supported.
pub trait AnnNum:
    private::Sealed
    + Float
    + Debug
    + Display
    + FromStr
    + Default
    + Send
    + Sync
    + bytemuck::Pod
{
    /// The number of bytes per element
    const BYTES_PER_ELEMENT: usize;

    /// Convert an `f64` tuning value into this type, rounding if necessary.
    fn from_f64_lossy(value: f64) -> Self;
}

impl AnnNum for f32 {
    const BYTES_PER_ELEMENT: usize = 4;

    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value as f32
    }
}

impl AnnNum for f64 {
    const BYTES_PER_ELEMENT: usize = 8;

    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value
    }
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
