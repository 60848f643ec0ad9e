//! End-to-end run: register, size the canvas, resample and stack.


use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::Error;
use crate::canvas::{CanvasInfo, FramePlacement, resample};
use crate::pixel_grid::PixelGrid;
use crate::progress::ProgressSink;
use crate::registration::{Registration, RegistrationConfig, RegistrationReport, Registrator};
use crate::stacking::{self, StackingStatistic};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineConfig {
    pub registration: RegistrationConfig,
    pub statistic: StackingStatistic,
}

impl PipelineConfig {
    pub fn new(registration: RegistrationConfig, statistic: StackingStatistic) -> Self {
        Self {
            registration,
            statistic,
        }
    }

    /// Stacks every frame RANSAC produced a transform for.
    pub fn permissive() -> Self {
        Self {
            registration: RegistrationConfig::permissive(),
            ..Self::default()
        }
    }
}

/// Result of [`align_and_stack`].
#[derive(Debug, Clone)]
pub struct StackOutput {
    pub image: PixelGrid,
    pub canvas: CanvasInfo,
    pub registration: Registration,
}

impl StackOutput {
    pub fn report(&self) -> RegistrationReport {
        self.registration.report(&self.canvas)
    }
}

/// Sizes the canvas for the included frames and resamples each onto it.
///
/// Returns the aligned frames in input order. Progress runs from 75 to 85.
///
/// # Panics
/// Panics if `registration` was not produced for `frames`.
pub fn align_frames(
    frames: &[PixelGrid],
    registration: &Registration,
    progress: &ProgressSink,
) -> (CanvasInfo, Vec<PixelGrid>) {
    assert_eq!(
        frames.len(),
        registration.frames.len(),
        "registration does not match the frame set"
    );

    let included: Vec<_> = registration.included().collect();
    let placements: Vec<FramePlacement> = included
        .iter()
        .map(|f| {
            let frame = &frames[f.index];
            FramePlacement::new(frame.width(), frame.height(), f.transform())
        })
        .collect();
    let canvas = CanvasInfo::from_frames(&placements);
    progress.report(
        75,
        &format!("Canvas size: {}x{}", canvas.width, canvas.height),
    );

    let total = included.len();
    let done = AtomicUsize::new(0);
    let aligned = included
        .par_iter()
        .map(|f| {
            let frame = resample(&frames[f.index], &f.transform(), &canvas);
            tracing::debug!(
                "Frame {} resampled, coverage {:.1}%",
                f.index,
                frame.coverage() * 100.0
            );
            let done = done.fetch_add(1, Ordering::Relaxed) + 1;
            progress.report_step(75, 85, done, total, &format!("Aligned frame {}", f.index));
            frame
        })
        .collect();

    (canvas, aligned)
}

/// Aligns every frame to a common reference and stacks the result.
///
/// Rejected frames are left out (or stacked unaligned, per
/// [`RegistrationConfig::rejected_frames`]); the canvas grows to hold every
/// included frame.
pub fn align_and_stack(
    frames: &[PixelGrid],
    config: &PipelineConfig,
    progress: &ProgressSink,
) -> Result<StackOutput, Error> {
    let registrator = Registrator::new(config.registration);
    let registration = registrator.register_frames(frames, progress)?;

    let (canvas, aligned) = align_frames(frames, &registration, progress);

    progress.report(
        85,
        &format!("Stacking {} frames ({})", aligned.len(), config.statistic),
    );
    let image = stacking::stack(&aligned, config.statistic)?;

    tracing::info!(
        "Stacked {} of {} frames onto {}x{} canvas",
        aligned.len(),
        frames.len(),
        canvas.width,
        canvas.height
    );
    progress.report(100, "Stacking complete");

    Ok(StackOutput {
        image,
        canvas,
        registration,
    })
}
