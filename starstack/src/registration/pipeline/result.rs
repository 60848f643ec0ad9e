//! Registration outcome and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pixel_grid::ChannelLayout;
use crate::registration::quality::{AlignmentResult, RejectReason};
use crate::registration::transform::AffineTransform;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    #[error("No frames provided for registration")]
    NoFrames,

    #[error("Frame {index} is {actual} but the first frame is {expected}")]
    LayoutMismatch {
        index: usize,
        expected: ChannelLayout,
        actual: ChannelLayout,
    },

    #[error("Reference frame {index} is out of range for {count} frames")]
    ReferenceOutOfRange { index: usize, count: usize },

    #[error("No frame could be aligned to the reference ({rejected} rejected)")]
    NoFramesAccepted { rejected: usize },
}

/// What registration decided for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FrameStatus {
    Reference,
    Accepted,
    /// Failed the acceptance gate and is left out.
    Rejected(RejectReason),
    /// Failed the acceptance gate but is stacked with the identity transform.
    ForcedIdentity(RejectReason),
}

impl FrameStatus {
    /// True if the frame takes part in the canvas and the stack.
    pub fn is_included(&self) -> bool {
        !matches!(self, FrameStatus::Rejected(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameRegistration {
    /// Position of the frame in the input list.
    pub index: usize,
    pub star_count: usize,
    pub alignment: AlignmentResult,
    pub status: FrameStatus,
}

impl FrameRegistration {
    /// Transform used for the canvas and resampling.
    pub fn transform(&self) -> AffineTransform {
        match self.status {
            FrameStatus::ForcedIdentity(_) => AffineTransform::IDENTITY,
            _ => self.alignment.transform,
        }
    }
}

/// Per-frame registration of a whole run, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub reference_index: usize,
    pub frames: Vec<FrameRegistration>,
}

impl Registration {
    /// Frames that go on the canvas, in input order.
    pub fn included(&self) -> impl Iterator<Item = &FrameRegistration> {
        self.frames.iter().filter(|f| f.status.is_included())
    }

    pub fn included_count(&self) -> usize {
        self.included().count()
    }

    pub fn rejected_count(&self) -> usize {
        self.frames.len() - self.included_count()
    }
}
