//! Registration of a whole set of frames onto one reference.
//!
//! # Pipeline Stages
//!
//! 1. **Star Detection** - every frame, in parallel
//! 2. **Reference** - explicit index or the most detailed frame
//! 3. **Triangle Matching** - correspondences against the reference stars
//! 4. **RANSAC** - robust similarity per frame
//! 5. **Acceptance** - quality gate and the rejected-frame policy

mod result;


pub use result::{FrameRegistration, FrameStatus, Registration, RegistrationError};

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::pixel_grid::PixelGrid;
use crate::progress::ProgressSink;
use crate::registration::config::{ReferenceSelection, RegistrationConfig, RejectedFramePolicy};
use crate::registration::quality::AlignmentResult;
use crate::registration::ransac::RansacEstimator;
use crate::registration::reference::select_reference;
use crate::registration::triangle::match_stars;
use crate::star_detection::{Star, StarDetector};

/// Image registrator that aligns frames to a reference.
#[derive(Debug)]
pub struct Registrator {
    config: RegistrationConfig,
    detector: StarDetector,
    ransac: RansacEstimator,
}

impl Default for Registrator {
    fn default() -> Self {
        Self::new(RegistrationConfig::default())
    }
}

impl Registrator {
    pub fn new(config: RegistrationConfig) -> Self {
        config.validate();
        Self {
            detector: StarDetector::new(config.detection),
            ransac: RansacEstimator::new(config.ransac),
            config,
        }
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    /// Aligns one star list to the reference stars and scores the result.
    ///
    /// Both lists should be sorted brightest first. The transform maps target
    /// coordinates to reference coordinates.
    pub fn register_stars(&self, ref_stars: &[Star], target_stars: &[Star]) -> AlignmentResult {
        let matches = match_stars(ref_stars, target_stars, &self.config.triangle);
        let outcome = self.ransac.estimate(&matches);
        AlignmentResult::new(
            outcome.transform,
            outcome.inlier_count,
            outcome.total,
            &self.config.acceptance,
        )
    }

    /// Detects stars in every frame, picks the reference and registers the rest.
    ///
    /// Progress runs from 0 to 70: detection up to 30, matching up to 70.
    pub fn register_frames(
        &self,
        frames: &[PixelGrid],
        progress: &ProgressSink,
    ) -> Result<Registration, RegistrationError> {
        let count = frames.len();
        let first = frames.first().ok_or(RegistrationError::NoFrames)?;
        for (index, frame) in frames.iter().enumerate().skip(1) {
            if frame.layout() != first.layout() {
                return Err(RegistrationError::LayoutMismatch {
                    index,
                    expected: first.layout(),
                    actual: frame.layout(),
                });
            }
        }
        if let ReferenceSelection::Index(index) = self.config.reference {
            if index >= count {
                return Err(RegistrationError::ReferenceOutOfRange { index, count });
            }
        }

        progress.report(0, "Detecting stars");
        let detected = AtomicUsize::new(0);
        let star_lists: Vec<Vec<Star>> = frames
            .par_iter()
            .enumerate()
            .map(|(index, frame)| {
                let stars = self.detector.detect(frame, self.config.max_stars);
                let done = detected.fetch_add(1, Ordering::Relaxed) + 1;
                progress.report_step(
                    0,
                    30,
                    done,
                    count,
                    &format!("Frame {}: {} stars", index, stars.len()),
                );
                stars
            })
            .collect();

        let reference_index = match self.config.reference {
            ReferenceSelection::Auto => select_reference(&star_lists),
            ReferenceSelection::Index(index) => index,
        };
        let ref_stars = &star_lists[reference_index];
        tracing::info!(
            "Reference frame {} with {} stars",
            reference_index,
            ref_stars.len()
        );
        if ref_stars.len() < self.config.acceptance.min_inliers {
            tracing::warn!(
                "Reference frame {} has only {} stars, alignment may fail",
                reference_index,
                ref_stars.len()
            );
        }
        progress.report(30, &format!("Reference frame: {reference_index}"));

        let aligned = AtomicUsize::new(0);
        let registrations: Vec<FrameRegistration> = star_lists
            .par_iter()
            .enumerate()
            .map(|(index, stars)| {
                let registration = if index == reference_index {
                    FrameRegistration {
                        index,
                        star_count: stars.len(),
                        alignment: AlignmentResult::reference(),
                        status: FrameStatus::Reference,
                    }
                } else {
                    self.register_frame(index, ref_stars, stars)
                };
                let done = aligned.fetch_add(1, Ordering::Relaxed) + 1;
                progress.report_step(30, 70, done, count, &format!("Aligned frame {index}"));
                registration
            })
            .collect();

        let registration = Registration {
            reference_index,
            frames: registrations,
        };

        let included = registration.included_count();
        tracing::info!(
            "Registration: {} of {} frames included, {} rejected",
            included,
            count,
            registration.rejected_count()
        );

        // The reference alone is no stack when there were frames to align.
        if count > 1 && included == 1 {
            return Err(RegistrationError::NoFramesAccepted {
                rejected: count - 1,
            });
        }

        progress.report(70, "Registration complete");
        Ok(registration)
    }

    fn register_frame(
        &self,
        index: usize,
        ref_stars: &[Star],
        stars: &[Star],
    ) -> FrameRegistration {
        let alignment = self.register_stars(ref_stars, stars);

        let status = match alignment.reject_reason {
            None => {
                tracing::info!(
                    "Frame {}: quality {:.1}% ({}/{} stars), {}",
                    index,
                    alignment.quality_score * 100.0,
                    alignment.inlier_count,
                    alignment.total_matches,
                    alignment.transform
                );
                FrameStatus::Accepted
            }
            Some(reason) => match self.config.rejected_frames {
                RejectedFramePolicy::Exclude => {
                    tracing::warn!("Frame {} rejected: {}", index, reason);
                    FrameStatus::Rejected(reason)
                }
                RejectedFramePolicy::IncludeUnaligned => {
                    tracing::warn!(
                        "Frame {} failed alignment ({}), stacking unaligned",
                        index,
                        reason
                    );
                    FrameStatus::ForcedIdentity(reason)
                }
            },
        };

        FrameRegistration {
            index,
            star_count: stars.len(),
            alignment,
            status,
        }
    }
}
