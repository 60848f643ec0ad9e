//! Acceptance gate applied to each frame's estimated alignment.

use serde::{Deserialize, Serialize};

use crate::registration::config::AcceptancePolicy;
use crate::registration::transform::AffineTransform;

/// Why a frame's alignment was not trusted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Too few matching stars support the transform.
    TooFewInliers { found: usize, required: usize },
    /// The supporting stars are too small a share of all correspondences.
    LowQuality { score: f64, required: f64 },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::TooFewInliers { found, required } => {
                write!(f, "too few matching stars ({found} < {required})")
            }
            RejectReason::LowQuality { score, required } => {
                write!(f, "low alignment quality ({score:.2} < {required:.2})")
            }
        }
    }
}

/// Estimated transform together with the evidence behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    pub transform: AffineTransform,
    pub inlier_count: usize,
    pub total_matches: usize,
    /// `inlier_count / total_matches`, 0 without correspondences.
    pub quality_score: f64,
    pub accepted: bool,
    pub reject_reason: Option<RejectReason>,
}

impl AlignmentResult {
    /// Scores a transform against `policy`.
    pub fn new(
        transform: AffineTransform,
        inlier_count: usize,
        total_matches: usize,
        policy: &AcceptancePolicy,
    ) -> Self {
        let quality_score = if total_matches == 0 {
            0.0
        } else {
            inlier_count as f64 / total_matches as f64
        };

        let reject_reason = if inlier_count < policy.min_inliers {
            Some(RejectReason::TooFewInliers {
                found: inlier_count,
                required: policy.min_inliers,
            })
        } else if quality_score < policy.min_quality {
            Some(RejectReason::LowQuality {
                score: quality_score,
                required: policy.min_quality,
            })
        } else {
            None
        };

        Self {
            transform,
            inlier_count,
            total_matches,
            quality_score,
            accepted: reject_reason.is_none(),
            reject_reason,
        }
    }

    /// Result for the reference frame, which aligns to itself.
    pub fn reference() -> Self {
        Self {
            transform: AffineTransform::IDENTITY,
            inlier_count: 0,
            total_matches: 0,
            quality_score: 1.0,
            accepted: true,
            reject_reason: None,
        }
    }
}
