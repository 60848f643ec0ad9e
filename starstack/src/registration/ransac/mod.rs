//! RANSAC (Random Sample Consensus) for robust similarity estimation.
//!
//! Each hypothesis is fitted in closed form to three random correspondences:
//! scale and rotation from the first pair, translation from the centroids.
//! The hypothesis with the most inliers wins and is optionally re-fitted by
//! least squares on its inliers.
//!
//! Iterations are split across independent seeded streams that run in
//! parallel, so the result depends on the seed and stream count only.

#[cfg(test)]
mod tests;

use glam::DVec2;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::registration::config::RansacConfig;
use crate::registration::transform::AffineTransform;
use crate::registration::triangle::PointMatch;

/// Minimum distance between the two points defining scale and rotation.
pub(crate) const MIN_SAMPLE_DISTANCE: f64 = 1.0;

/// Best model found by [`RansacEstimator::estimate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RansacOutcome {
    pub transform: AffineTransform,
    pub inlier_count: usize,
    /// Number of correspondences the model was scored against.
    pub total: usize,
    pub iterations: usize,
}

impl RansacOutcome {
    fn identity(total: usize) -> Self {
        Self {
            transform: AffineTransform::IDENTITY,
            inlier_count: 0,
            total,
            iterations: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Hypothesis {
    transform: AffineTransform,
    inliers: usize,
}

#[derive(Debug, Clone)]
pub struct RansacEstimator {
    config: RansacConfig,
}

impl Default for RansacEstimator {
    fn default() -> Self {
        Self::new(RansacConfig::default())
    }
}

impl RansacEstimator {
    pub fn new(config: RansacConfig) -> Self {
        config.validate();
        Self { config }
    }

    pub fn config(&self) -> &RansacConfig {
        &self.config
    }

    /// Estimates the transform mapping target positions onto reference positions.
    ///
    /// Fewer than three correspondences yield the identity with zero inliers.
    pub fn estimate(&self, matches: &[PointMatch]) -> RansacOutcome {
        let total = matches.len();
        if total < 3 {
            return RansacOutcome::identity(total);
        }

        let streams = self.config.streams;
        let base = self.config.max_iterations / streams;
        let extra = self.config.max_iterations % streams;

        let stream_results: Vec<Option<Hypothesis>> = (0..streams)
            .into_par_iter()
            .map(|stream| {
                let iterations = base + usize::from(stream < extra);
                self.run_stream(matches, stream as u64, iterations)
            })
            .collect();

        // Highest inlier count; the lowest stream index wins ties.
        let mut best: Option<Hypothesis> = None;
        for hypothesis in stream_results.into_iter().flatten() {
            if best.is_none_or(|b| hypothesis.inliers > b.inliers) {
                best = Some(hypothesis);
            }
        }

        let Some(mut best) = best else {
            tracing::debug!("RANSAC: every sample was degenerate");
            return RansacOutcome {
                iterations: self.config.max_iterations,
                ..RansacOutcome::identity(total)
            };
        };

        if self.config.refine && best.inliers >= 3 {
            if let Some(refined) = self.refine(matches, &best.transform) {
                let inliers = count_inliers(&refined, matches, self.config.inlier_threshold);
                if inliers >= best.inliers {
                    best = Hypothesis {
                        transform: refined,
                        inliers,
                    };
                }
            }
        }

        tracing::debug!(
            "RANSAC: {}/{} inliers, {}",
            best.inliers,
            total,
            best.transform
        );

        RansacOutcome {
            transform: best.transform,
            inlier_count: best.inliers,
            total,
            iterations: self.config.max_iterations,
        }
    }

    fn run_stream(
        &self,
        matches: &[PointMatch],
        stream: u64,
        iterations: usize,
    ) -> Option<Hypothesis> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        rng.set_stream(stream);

        let mut best: Option<Hypothesis> = None;
        for _ in 0..iterations {
            let sample = rand::seq::index::sample(&mut rng, matches.len(), 3);
            let Some(transform) = fit_minimal([
                &matches[sample.index(0)],
                &matches[sample.index(1)],
                &matches[sample.index(2)],
            ]) else {
                continue;
            };

            let inliers = count_inliers(&transform, matches, self.config.inlier_threshold);
            if best.is_none_or(|b| inliers > b.inliers) {
                best = Some(Hypothesis { transform, inliers });
            }
        }
        best
    }

    fn refine(
        &self,
        matches: &[PointMatch],
        transform: &AffineTransform,
    ) -> Option<AffineTransform> {
        let inliers: Vec<PointMatch> = matches
            .iter()
            .filter(|m| residual(transform, m) < self.config.inlier_threshold)
            .copied()
            .collect();
        fit_least_squares(&inliers)
    }
}

#[inline]
fn residual(transform: &AffineTransform, m: &PointMatch) -> f64 {
    transform.apply(m.target).distance(m.reference)
}

/// Correspondences whose mapped target lands within `threshold` of the reference.
pub fn count_inliers(transform: &AffineTransform, matches: &[PointMatch], threshold: f64) -> usize {
    matches
        .iter()
        .filter(|m| residual(transform, m) < threshold)
        .count()
}

/// Closed-form similarity from three correspondences.
///
/// Returns None when either point pair defining scale and rotation is closer
/// than [`MIN_SAMPLE_DISTANCE`].
pub(crate) fn fit_minimal(sample: [&PointMatch; 3]) -> Option<AffineTransform> {
    let ref_delta = sample[1].reference - sample[0].reference;
    let target_delta = sample[1].target - sample[0].target;
    let ref_dist = ref_delta.length();
    let target_dist = target_delta.length();
    if ref_dist < MIN_SAMPLE_DISTANCE || target_dist < MIN_SAMPLE_DISTANCE {
        return None;
    }

    let scale = ref_dist / target_dist;
    let rotation = ref_delta.y.atan2(ref_delta.x) - target_delta.y.atan2(target_delta.x);

    let ref_center = (sample[0].reference + sample[1].reference + sample[2].reference) / 3.0;
    let target_center = (sample[0].target + sample[1].target + sample[2].target) / 3.0;

    Some(with_centroids(scale, rotation, ref_center, target_center))
}

/// Least-squares similarity over any number of correspondences.
pub(crate) fn fit_least_squares(matches: &[PointMatch]) -> Option<AffineTransform> {
    if matches.len() < 2 {
        return None;
    }
    let n = matches.len() as f64;
    let ref_center = matches.iter().map(|m| m.reference).sum::<DVec2>() / n;
    let target_center = matches.iter().map(|m| m.target).sum::<DVec2>() / n;

    let mut norm = 0.0;
    let mut dot = 0.0;
    let mut cross = 0.0;
    for m in matches {
        let t = m.target - target_center;
        let r = m.reference - ref_center;
        norm += t.length_squared();
        dot += t.dot(r);
        cross += t.perp_dot(r);
    }
    if norm < MIN_SAMPLE_DISTANCE {
        return None;
    }

    let a = dot / norm;
    let b = cross / norm;
    let scale = a.hypot(b);
    if scale <= 0.0 {
        return None;
    }
    Some(with_centroids(scale, b.atan2(a), ref_center, target_center))
}

/// Angle in (-pi, pi].
fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let wrapped = angle.rem_euclid(TAU);
    let over = if wrapped > PI { TAU } else { 0.0 };
    wrapped - over
}

/// Similarity with the given scale and rotation that maps `target_center`
/// onto `ref_center`.
fn with_centroids(
    scale: f64,
    rotation: f64,
    ref_center: DVec2,
    target_center: DVec2,
) -> AffineTransform {
    let rotation = wrap_angle(rotation);
    let (sin, cos) = rotation.sin_cos();
    AffineTransform::new(
        scale,
        rotation,
        ref_center.x - scale * (cos * target_center.x - sin * target_center.y),
        ref_center.y - scale * (sin * target_center.x + cos * target_center.y),
    )
}
