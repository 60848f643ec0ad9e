//! Point-source detection on the mono view of a [`PixelGrid`].
//!
//! Seeds are local maxima above a global `mean + k * sigma` threshold. Each
//! seed is refined to a flux-weighted centroid over pixels above a lower
//! sub-threshold, so the star's wings pull the centroid without admitting
//! background. Accepted stars claim a small disk so one star is never
//! reported twice.

mod config;
mod star;


pub use config::Config;
pub use star::Star;

use common::Buffer2;
use common::parallel::par_sum_f64;

use crate::pixel_grid::PixelGrid;

/// Global mean and population standard deviation of an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl ImageStats {
    pub fn compute(pixels: &[f32]) -> Self {
        if pixels.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
            };
        }
        let n = pixels.len() as f64;
        let mean = par_sum_f64(pixels, |v| v as f64) / n;
        let variance = par_sum_f64(pixels, |v| {
            let d = v as f64 - mean;
            d * d
        }) / n;
        Self {
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StarDetector {
    config: Config,
}

impl Default for StarDetector {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl StarDetector {
    pub fn new(config: Config) -> Self {
        config.validate();
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Detects up to `max_stars` stars, brightest first.
    ///
    /// An image with nothing above the threshold yields an empty list.
    pub fn detect(&self, grid: &PixelGrid, max_stars: usize) -> Vec<Star> {
        let image = grid.mono_view();
        let (width, height) = (image.width(), image.height());
        let margin = self.config.edge_margin;

        if width <= 2 * margin || height <= 2 * margin {
            tracing::debug!(
                "Image {}x{} is smaller than the detection margin, no stars",
                width,
                height
            );
            return Vec::new();
        }

        let stats = ImageStats::compute(image.pixels());
        let threshold = stats.mean + self.config.threshold_sigma * stats.std_dev;
        let sub_threshold = threshold * self.config.sub_threshold_ratio;

        let mut claimed = Buffer2::<bool>::new_default(width, height);
        let mut stars = Vec::new();

        for y in margin..height - margin {
            for x in margin..width - margin {
                if claimed[(x, y)] {
                    continue;
                }
                if image[(x, y)] as f64 <= threshold {
                    continue;
                }
                if !self.is_local_maximum(image, x, y) {
                    continue;
                }
                if let Some(star) = self.centroid(image, x, y, sub_threshold) {
                    self.claim(&mut claimed, &star);
                    stars.push(star);
                }
            }
        }

        stars.sort_by(|a, b| b.flux.total_cmp(&a.flux));
        let found = stars.len();
        stars.truncate(max_stars);

        tracing::debug!(
            "Detected {} stars, kept {} (mean {:.2}, sigma {:.2}, threshold {:.2})",
            found,
            stars.len(),
            stats.mean,
            stats.std_dev,
            threshold
        );

        stars
    }

    /// True if no pixel within `local_max_radius` is brighter. Plateaus pass.
    fn is_local_maximum(&self, image: &Buffer2<f32>, x: usize, y: usize) -> bool {
        let r = self.config.local_max_radius;
        let center = image[(x, y)];
        for ny in y - r..=y + r {
            for nx in x - r..=x + r {
                if image[(nx, ny)] > center {
                    return false;
                }
            }
        }
        true
    }

    fn centroid(
        &self,
        image: &Buffer2<f32>,
        x: usize,
        y: usize,
        sub_threshold: f64,
    ) -> Option<Star> {
        let r = self.config.centroid_radius;
        let mut sum_w = 0.0f64;
        let mut sum_wx = 0.0f64;
        let mut sum_wy = 0.0f64;
        let mut count = 0usize;

        for wy in y - r..=y + r {
            for wx in x - r..=x + r {
                let v = image[(wx, wy)] as f64;
                if v > sub_threshold {
                    let w = v - sub_threshold;
                    sum_w += w;
                    sum_wx += w * wx as f64;
                    sum_wy += w * wy as f64;
                    count += 1;
                }
            }
        }

        if count < self.config.min_star_pixels
            || count > self.config.max_star_pixels()
            || sum_w <= 0.0
        {
            return None;
        }

        Some(Star::new(
            sum_wx / sum_w,
            sum_wy / sum_w,
            image[(x, y)],
            sum_w as f32,
        ))
    }

    fn claim(&self, claimed: &mut Buffer2<bool>, star: &Star) {
        let r = self.config.suppression_radius as i64;
        let cx = star.pos.x.floor() as i64;
        let cy = star.pos.y.floor() as i64;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > r * r {
                    continue;
                }
                if let Some(px) = claimed.checked_mut(cx + dx, cy + dy) {
                    *px = true;
                }
            }
        }
    }
}

/// Detects stars with the default [`Config`].
pub fn detect_stars(grid: &PixelGrid, max_stars: usize) -> Vec<Star> {
    StarDetector::default().detect(grid, max_stars)
}
