//! Geometric registration of frames onto a reference frame.

pub mod config;
pub mod pipeline;
pub mod quality;
pub mod ransac;
pub mod reference;
pub mod report;
pub mod transform;
pub mod triangle;

pub use config::{
    AcceptancePolicy, MatchSelection, RansacConfig, ReferenceSelection, RegistrationConfig,
    RejectedFramePolicy, TriangleMatchConfig,
};
pub use pipeline::{FrameRegistration, FrameStatus, Registration, RegistrationError, Registrator};
pub use quality::{AlignmentResult, RejectReason};
pub use ransac::{RansacEstimator, RansacOutcome};
pub use reference::select_reference;
pub use report::{FrameReport, RegistrationReport};
pub use transform::AffineTransform;
pub use triangle::{PointMatch, match_stars};
