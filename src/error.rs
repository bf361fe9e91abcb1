use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
pub enum AnnError {
    #[error("Requesting {requested} near neighbors but the index only holds {available} points.")]
    TooManyNeighbors { requested: usize, available: usize },

    #[error("Got a point of dimension {actual} when expected dimension {expected}.")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Error bound must be a non-negative number, got {0}.")]
    InvalidErrorBound(f64),

    #[error("Priority queue overflow (capacity {0}).")]
    QueueOverflow(usize),

    #[error("Illegal splitting method: {0}")]
    UnknownSplitRule(String),

    #[error("Illegal shrinking rule: {0}")]
    UnknownShrinkRule(String),

    #[error("Bucket size must be at least 1.")]
    InvalidBucketSize,

    #[error("Invalid dump at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Shrinking node not allowed in kd-tree (line {line}).")]
    ShrinkInKdTree { line: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AnnError>;
