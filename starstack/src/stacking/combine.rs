//! Per-pixel combination of the valid samples from every frame.

use super::{SigmaClip, StackingStatistic};

/// Weight falloff per input position for [`StackingStatistic::RankWeightedMean`].
const RANK_WEIGHT_STEP: f64 = 0.1;

/// Valid (non-sentinel) samples of one pixel with the index of their frame.
///
/// One instance is reused for every pixel of a row block.
#[derive(Debug, Default)]
pub(crate) struct PixelSamples {
    values: Vec<f32>,
    frames: Vec<usize>,
}

impl PixelSamples {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            frames: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.values.clear();
        self.frames.clear();
    }

    #[inline]
    pub(crate) fn push(&mut self, value: f32, frame: usize) {
        self.values.push(value);
        self.frames.push(frame);
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl StackingStatistic {
    /// Combines the samples of one pixel. Returns 0 when there are none.
    ///
    /// May reorder the samples.
    pub(crate) fn combine(&self, samples: &mut PixelSamples) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let result = match self {
            StackingStatistic::Mean => mean(&samples.values),
            StackingStatistic::Median => median(&mut samples.values),
            StackingStatistic::SigmaClippedMean(clip) => sigma_clipped_mean(&samples.values, clip),
            StackingStatistic::Max => samples
                .values
                .iter()
                .fold(f64::NEG_INFINITY, |acc, &v| acc.max(v as f64)),
            StackingStatistic::Min => samples
                .values
                .iter()
                .fold(f64::INFINITY, |acc, &v| acc.min(v as f64)),
            StackingStatistic::RankWeightedMean => {
                rank_weighted_mean(&samples.values, &samples.frames)
            }
        };
        result as f32
    }
}

fn mean(values: &[f32]) -> f64 {
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

fn median(values: &mut [f32]) -> f64 {
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] as f64 + values[mid] as f64) / 2.0
    } else {
        values[mid] as f64
    }
}

/// Single-pass clip around the population mean.
fn sigma_clipped_mean(values: &[f32], clip: &SigmaClip) -> f64 {
    let center = mean(values);
    if values.len() < clip.min_values {
        return center;
    }

    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - center;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    let threshold = clip.sigma as f64 * variance.sqrt();

    let (sum, kept) = values
        .iter()
        .map(|&v| v as f64)
        .filter(|v| (v - center).abs() <= threshold)
        .fold((0.0, 0usize), |(sum, kept), v| (sum + v, kept + 1));

    // Every value clipped: fall back to the unclipped mean.
    if kept == 0 {
        return center;
    }
    sum / kept as f64
}

fn rank_weighted_mean(values: &[f32], frames: &[usize]) -> f64 {
    let (weighted, total) = values
        .iter()
        .zip(frames)
        .fold((0.0, 0.0), |(weighted, total), (&v, &frame)| {
            let weight = 1.0 / (1.0 + RANK_WEIGHT_STEP * frame as f64);
            (weighted + weight * v as f64, total + weight)
        });
    weighted / total
}
