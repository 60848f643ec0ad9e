//! Error types for stacking operations.

use thiserror::Error;

use crate::pixel_grid::ChannelLayout;

/// Errors that can occur while combining aligned frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("No frames provided for stacking")]
    NoFrames,

    #[error(
        "Dimension mismatch for frame {index}: expected {expected:?}, got {actual:?}"
    )]
    DimensionMismatch {
        index: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error(
        "Channel layout mismatch for frame {index}: expected {expected}, got {actual}"
    )]
    LayoutMismatch {
        index: usize,
        expected: ChannelLayout,
        actual: ChannelLayout,
    },
}
