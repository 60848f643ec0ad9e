//! Pixel-wise combination of aligned frames.
//!
//! Every output pixel is computed independently from the non-sentinel values
//! of the same pixel in every input frame, per channel.

mod combine;
mod error;


pub use error::Error;

use common::Buffer2;
use common::parallel::par_rows_mut;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::pixel_grid::{NO_DATA, PixelGrid};
use combine::PixelSamples;

/// Statistic used to combine the values of one pixel across frames.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum StackingStatistic {
    /// Average of the valid values.
    #[default]
    Mean,
    /// Middle value; mean of the two middle values on even counts.
    Median,
    /// Mean after discarding values beyond `sigma` standard deviations.
    SigmaClippedMean(SigmaClip),
    Max,
    Min,
    /// Weighted mean favouring frames earlier in the input.
    RankWeightedMean,
}

impl std::fmt::Display for StackingStatistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackingStatistic::Mean => write!(f, "mean"),
            StackingStatistic::Median => write!(f, "median"),
            StackingStatistic::SigmaClippedMean(clip) => write!(f, "sigma{:.1}", clip.sigma),
            StackingStatistic::Max => write!(f, "max"),
            StackingStatistic::Min => write!(f, "min"),
            StackingStatistic::RankWeightedMean => write!(f, "rank-weighted"),
        }
    }
}

/// Configuration for sigma-clipped mean stacking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmaClip {
    /// Number of standard deviations kept around the mean.
    pub sigma: f32,
    /// Below this many valid values the plain mean is used.
    pub min_values: usize,
}

impl Default for SigmaClip {
    fn default() -> Self {
        Self {
            sigma: 2.0,
            min_values: 4,
        }
    }
}

impl SigmaClip {
    pub fn new(sigma: f32, min_values: usize) -> Self {
        let clip = Self { sigma, min_values };
        clip.validate();
        clip
    }

    pub fn validate(&self) {
        assert!(self.sigma > 0.0, "Sigma must be positive");
        assert!(self.min_values >= 2, "min_values must be at least 2");
    }
}

/// Combines aligned frames with `statistic`.
///
/// All frames must share dimensions and channel layout. Sentinel values are
/// excluded; a pixel with no valid value in any frame stays [`NO_DATA`].
pub fn stack(frames: &[PixelGrid], statistic: StackingStatistic) -> Result<PixelGrid, Error> {
    let first = frames.first().ok_or(Error::NoFrames)?;
    let expected = (first.width(), first.height());
    for (index, frame) in frames.iter().enumerate().skip(1) {
        let actual = (frame.width(), frame.height());
        if actual != expected {
            return Err(Error::DimensionMismatch {
                index,
                expected,
                actual,
            });
        }
        if frame.layout() != first.layout() {
            return Err(Error::LayoutMismatch {
                index,
                expected: first.layout(),
                actual: frame.layout(),
            });
        }
    }
    if let StackingStatistic::SigmaClippedMean(clip) = statistic {
        clip.validate();
    }

    tracing::info!(
        "Stacking {} frames ({}x{}, {}) with {}",
        frames.len(),
        first.width(),
        first.height(),
        first.layout(),
        statistic
    );

    let planes = (0..first.channel_count())
        .map(|channel| {
            let inputs: Vec<&Buffer2<f32>> = frames.iter().map(|f| f.plane(channel)).collect();
            stack_plane(&inputs, statistic)
        })
        .collect();
    let image = PixelGrid::from_planes(first.layout(), planes);

    log_summary(&image);
    Ok(image)
}

fn stack_plane(inputs: &[&Buffer2<f32>], statistic: StackingStatistic) -> Buffer2<f32> {
    let width = inputs[0].width();
    let mut output = Buffer2::new_filled(width, inputs[0].height(), NO_DATA);

    par_rows_mut(output.pixels_mut(), width).for_each(|(first_row, chunk)| {
        let mut samples = PixelSamples::with_capacity(inputs.len());
        let start = first_row * width;
        for (offset, px) in chunk.iter_mut().enumerate() {
            let idx = start + offset;
            samples.clear();
            for (frame, input) in inputs.iter().enumerate() {
                let value = input.pixels()[idx];
                if value != NO_DATA {
                    samples.push(value, frame);
                }
            }
            *px = statistic.combine(&mut samples);
        }
    });

    output
}

fn log_summary(image: &PixelGrid) {
    let mut count = 0usize;
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut sum = 0.0f64;
    for &v in image.mono_view().pixels() {
        if v != NO_DATA {
            count += 1;
            min = min.min(v);
            max = max.max(v);
            sum += v as f64;
        }
    }

    if count == 0 {
        tracing::warn!("Stacked image has no covered pixels");
        return;
    }
    tracing::info!(
        "Stacked image: {} covered pixels, min {:.3}, max {:.3}, mean {:.3}",
        count,
        min,
        max,
        sum / count as f64
    );
}
