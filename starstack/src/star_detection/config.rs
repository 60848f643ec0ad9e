//! Star detection parameters.

/// Detection thresholds and window sizes, all in pixels unless noted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Detection threshold in standard deviations above the image mean.
    pub threshold_sigma: f64,
    /// Border excluded from the seed scan. Equals the largest star radius, so
    /// every centroid window stays inside the image.
    pub edge_margin: usize,
    /// A seed must not be exceeded by any pixel within this radius.
    pub local_max_radius: usize,
    /// Half-size of the square centroid window.
    pub centroid_radius: usize,
    /// Centroid pixels must exceed `sub_threshold_ratio * threshold`.
    pub sub_threshold_ratio: f64,
    /// Fewer contributing pixels than this is a hot pixel or noise spike.
    pub min_star_pixels: usize,
    /// More contributing pixels than `max_star_size^2` is not a point source.
    pub max_star_size: usize,
    /// Radius of the disk claimed around each accepted centroid.
    pub suppression_radius: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold_sigma: 3.0,
            edge_margin: 30,
            local_max_radius: 3,
            centroid_radius: 10,
            sub_threshold_ratio: 0.5,
            min_star_pixels: 3,
            max_star_size: 30,
            suppression_radius: 5,
        }
    }
}

impl Config {
    /// Maximum number of contributing pixels for one star.
    #[inline]
    pub fn max_star_pixels(&self) -> usize {
        self.max_star_size * self.max_star_size
    }

    pub fn validate(&self) {
        assert!(
            self.threshold_sigma.is_finite() && self.threshold_sigma >= 0.0,
            "threshold_sigma must be non-negative, got {}",
            self.threshold_sigma
        );
        assert!(
            self.local_max_radius >= 1,
            "local_max_radius must be at least 1"
        );
        assert!(
            self.centroid_radius >= 1,
            "centroid_radius must be at least 1"
        );
        assert!(
            self.edge_margin >= self.centroid_radius.max(self.local_max_radius),
            "edge_margin ({}) must cover the centroid and local-maximum windows",
            self.edge_margin
        );
        assert!(
            (0.0..=1.0).contains(&self.sub_threshold_ratio),
            "sub_threshold_ratio must be in [0, 1], got {}",
            self.sub_threshold_ratio
        );
        assert!(
            self.min_star_pixels <= self.max_star_pixels(),
            "min_star_pixels ({}) exceeds max_star_size^2 ({})",
            self.min_star_pixels,
            self.max_star_pixels()
        );
    }
}
