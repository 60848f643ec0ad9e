//! Errors raised while building or decoding pixel grids.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GridError {
    #[error("Image dimensions must be positive, got {width}x{height}")]
    EmptyDimensions { width: usize, height: usize },

    #[error("Plane {plane} holds {actual} samples, expected {expected}")]
    PlaneSizeMismatch {
        plane: usize,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Sample array has {actual} samples but its axes {axes:?} describe {expected}"
    )]
    SampleCountMismatch {
        axes: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    #[error("Sample array axes {axes:?} describe more samples than fit in memory")]
    TooLarge { axes: Vec<usize> },

    #[error("Unsupported sample layout with {0} axes")]
    UnsupportedLayout(usize),
}
