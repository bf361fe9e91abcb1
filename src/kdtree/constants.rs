//! Tuning constants shared by the splitting, shrinking and statistics code.

/// Default number of points stored in each leaf.
pub const DEFAULT_BUCKET_SIZE: usize = 1;

/// Version written after the `#ANN` marker of a dump.
pub const DUMP_VERSION: &str = "1.1.2";

/// Relative tolerance when comparing rectangle side lengths against the longest side.
pub const SPLIT_EPSILON: f64 = 1e-5;

/// Maximum aspect ratio allowed for the cells produced by the fair split rules.
pub const FS_ASPECT_RATIO: f64 = 3.0;

/// Simple shrink: a side is snapped to the enclosing box when its gap is smaller than this
/// fraction of the longest side of the tight box.
pub const BD_GAP_THRESH: f64 = 0.5;

/// Simple shrink: minimum number of shrinking sides for a shrink to be worthwhile.
pub const BD_CT_THRESH: usize = 2;

/// Centroid shrink: fraction of the points the inner box should retain.
pub const BD_FRACTION: f64 = 0.5;

/// Centroid shrink: shrink only if more than this many splits per dimension were needed.
pub const BD_MAX_SPLIT_FAC: f64 = 0.5;

/// Aspect ratios above this value are clamped when collecting tree statistics.
pub const ASPECT_RATIO_CEILING: f64 = 1000.0;
