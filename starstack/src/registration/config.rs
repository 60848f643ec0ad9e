//! Configuration types for the registration module.
//!
//! All configuration structs and related enums for the registration pipeline
//! live here. Submodules re-export the types they need.

use serde::{Deserialize, Serialize};

use crate::star_detection;

// =============================================================================
// Triangle matching
// =============================================================================

/// How deduplicated vertex correspondences are turned into the match list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchSelection {
    /// Every distinct correspondence, in first-seen order.
    Unique,
    /// Strongest-supported correspondences first, each star used at most once.
    #[default]
    OneToOne,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleMatchConfig {
    /// Number of brightest stars per frame used to build triangles.
    pub max_stars: usize,
    /// Maximum difference of each side-length ratio for similar triangles.
    pub ratio_tolerance: f64,
    /// Grid, in pixels, on which correspondence coordinates are deduplicated.
    pub dedup_precision: f64,
    pub selection: MatchSelection,
}

impl Default for TriangleMatchConfig {
    fn default() -> Self {
        Self {
            max_stars: 20,
            ratio_tolerance: 0.15,
            dedup_precision: 0.1,
            selection: MatchSelection::OneToOne,
        }
    }
}

impl TriangleMatchConfig {
    pub fn validate(&self) {
        assert!(
            (3..=64).contains(&self.max_stars),
            "max_stars must be in [3, 64], got {}",
            self.max_stars
        );
        assert!(
            self.ratio_tolerance > 0.0,
            "ratio_tolerance must be positive, got {}",
            self.ratio_tolerance
        );
        assert!(
            self.dedup_precision > 0.0,
            "dedup_precision must be positive, got {}",
            self.dedup_precision
        );
    }
}

// =============================================================================
// RANSAC
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RansacConfig {
    /// Total hypotheses, split evenly over the streams.
    pub max_iterations: usize,
    /// Inlier distance threshold in pixels.
    pub inlier_threshold: f64,
    /// Seed shared by every stream.
    pub seed: u64,
    /// Independent random streams evaluated in parallel.
    pub streams: usize,
    /// Re-fit the winning model on its inliers by least squares.
    pub refine: bool,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            inlier_threshold: 3.0,
            seed: 42,
            streams: 4,
            refine: true,
        }
    }
}

impl RansacConfig {
    pub fn validate(&self) {
        assert!(self.max_iterations > 0, "max_iterations must be positive");
        assert!(self.streams > 0, "streams must be positive");
        assert!(
            self.inlier_threshold > 0.0,
            "inlier_threshold must be positive, got {}",
            self.inlier_threshold
        );
    }
}

// =============================================================================
// Acceptance
// =============================================================================

/// Gate a frame's alignment must pass to be stacked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptancePolicy {
    /// Minimum number of inlier correspondences.
    pub min_inliers: usize,
    /// Minimum inlier fraction of all correspondences.
    pub min_quality: f64,
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self {
            min_inliers: 8,
            min_quality: 0.20,
        }
    }
}

impl AcceptancePolicy {
    /// Accepts every frame. Useful for debugging bad registrations.
    pub fn permissive() -> Self {
        Self {
            min_inliers: 0,
            min_quality: 0.0,
        }
    }

    pub fn validate(&self) {
        assert!(
            (0.0..=1.0).contains(&self.min_quality),
            "min_quality must be in [0, 1], got {}",
            self.min_quality
        );
    }
}

/// What happens to a frame that fails the acceptance gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RejectedFramePolicy {
    /// Leave the frame out of the canvas and the stack.
    #[default]
    Exclude,
    /// Stack the frame anyway with the identity transform.
    IncludeUnaligned,
}

// =============================================================================
// Reference frame
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceSelection {
    /// Frame with the most, and most tightly packed, bright stars.
    #[default]
    Auto,
    /// Explicit frame index.
    Index(usize),
}

// =============================================================================
// Registration pipeline
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegistrationConfig {
    pub detection: star_detection::Config,
    /// Stars kept per frame after detection.
    pub max_stars: usize,
    pub triangle: TriangleMatchConfig,
    pub ransac: RansacConfig,
    pub acceptance: AcceptancePolicy,
    pub rejected_frames: RejectedFramePolicy,
    pub reference: ReferenceSelection,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            detection: star_detection::Config::default(),
            max_stars: 100,
            triangle: TriangleMatchConfig::default(),
            ransac: RansacConfig::default(),
            acceptance: AcceptancePolicy::default(),
            rejected_frames: RejectedFramePolicy::default(),
            reference: ReferenceSelection::default(),
        }
    }
}

impl RegistrationConfig {
    /// Default matching with the acceptance gate disabled.
    pub fn permissive() -> Self {
        Self {
            acceptance: AcceptancePolicy::permissive(),
            ..Self::default()
        }
    }

    pub fn validate(&self) {
        self.detection.validate();
        assert!(self.max_stars >= 3, "max_stars must be at least 3");
        self.triangle.validate();
        self.ransac.validate();
        self.acceptance.validate();
    }
}
