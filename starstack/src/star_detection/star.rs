//! Star detection result type.

use glam::DVec2;

/// A detected point source with a sub-pixel centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Flux-weighted centroid in pixel coordinates.
    pub pos: DVec2,
    /// Value of the seed pixel.
    pub peak: f32,
    /// Sum of the centroid weights.
    pub flux: f32,
}

impl Star {
    pub fn new(x: f64, y: f64, peak: f32, flux: f32) -> Self {
        Self {
            pos: DVec2::new(x, y),
            peak,
            flux,
        }
    }

    #[inline]
    pub fn distance_to(&self, other: &Star) -> f64 {
        self.pos.distance(other.pos)
    }
}
