//! Starstack - star-field registration and stacking.
//!
//! Detects stars in every frame, aligns each frame to a reference with a
//! similarity transform (triangle matching plus RANSAC), resamples the
//! accepted frames onto a canvas that holds all of them, and combines them
//! pixel by pixel.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use starstack::prelude::*;
//!
//! let frames: Vec<PixelGrid> = load_frames()?;
//! let output = align_and_stack(&frames, &PipelineConfig::default(), &ProgressSink::none())?;
//!
//! println!("{}", output.report().to_json()?);
//! ```

pub mod canvas;
mod error;
pub mod pipeline;
pub mod pixel_grid;
pub mod progress;
pub mod registration;
pub mod stacking;
pub mod star_detection;

#[cfg(test)]
pub mod testing;

pub mod prelude;

pub use error::Error;

// ============================================================================
// Pixel data
// ============================================================================

pub use pixel_grid::{
    ChannelLayout, GridError, NO_DATA, PixelGrid, SampleArray, SampleBuffer, SampleKind,
};

// ============================================================================
// Star detection
// ============================================================================

pub use star_detection::{Config as StarDetectionConfig, ImageStats, Star, StarDetector};

// ============================================================================
// Registration
// ============================================================================

pub use registration::{
    AcceptancePolicy, AffineTransform, AlignmentResult, FrameRegistration, FrameReport,
    FrameStatus, MatchSelection, PointMatch, RansacConfig, RansacEstimator, ReferenceSelection,
    Registration, RegistrationConfig, RegistrationError, RegistrationReport, Registrator,
    RejectReason, RejectedFramePolicy, TriangleMatchConfig,
};

// ============================================================================
// Canvas and stacking
// ============================================================================

pub use canvas::{CanvasInfo, FramePlacement, resample, resample_all};
pub use stacking::{Error as StackingError, SigmaClip, StackingStatistic, stack};

// ============================================================================
// Pipeline
// ============================================================================

pub use pipeline::{PipelineConfig, StackOutput, align_and_stack, align_frames};
pub use progress::ProgressSink;
