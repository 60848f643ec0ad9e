//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use starstack::prelude::*;
//! ```

// Pixel data
pub use crate::{ChannelLayout, Error, PixelGrid, SampleArray, SampleBuffer};

// Registration
pub use crate::{AffineTransform, FrameStatus, Registration, RegistrationConfig, Registrator};

// Stacking and the end-to-end run
pub use crate::{PipelineConfig, ProgressSink, StackOutput, align_and_stack};
pub use crate::{SigmaClip, StackingStatistic, stack};
