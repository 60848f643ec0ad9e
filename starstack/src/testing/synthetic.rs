//! Synthetic star fields for detection, registration and pipeline tests.

use glam::DVec2;
use rand::prelude::*;

use crate::pixel_grid::PixelGrid;
use crate::registration::AffineTransform;
use crate::star_detection::Star;

/// Ground truth for one Gaussian point source.
#[derive(Debug, Clone, Copy)]
pub struct GroundTruthStar {
    pub pos: DVec2,
    pub amplitude: f32,
}

/// Image-level rendering parameters.
#[derive(Debug, Clone, Copy)]
pub struct FieldConfig {
    pub width: usize,
    pub height: usize,
    pub background: f32,
    pub noise_sigma: f32,
    pub psf_sigma: f64,
    pub seed: u64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            background: 10.0,
            noise_sigma: 1.0,
            psf_sigma: 1.5,
            seed: 7,
        }
    }
}

/// Standard normal sample (Box-Muller).
pub fn gaussian(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.random_range(f64::EPSILON..1.0);
    let u2: f64 = rng.random_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Uniformly scattered stars with distinct amplitudes, brightest first.
pub fn random_stars(
    count: usize,
    width: f64,
    height: f64,
    margin: f64,
    seed: u64,
) -> Vec<GroundTruthStar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut stars: Vec<GroundTruthStar> = (0..count)
        .map(|i| GroundTruthStar {
            pos: DVec2::new(
                rng.random_range(margin..width - margin),
                rng.random_range(margin..height - margin),
            ),
            amplitude: 3000.0 - 25.0 * i as f32,
        })
        .collect();
    stars.sort_by(|a, b| b.amplitude.total_cmp(&a.amplitude));
    stars
}

/// Stars on a jittered `side x side` lattice, brightest first.
///
/// Neighbours stay at least `spacing - 2 * max_jitter` apart, so centroid
/// windows never pick up another star's core.
pub fn lattice_stars(
    side: usize,
    origin: f64,
    spacing: f64,
    max_jitter: f64,
    seed: u64,
) -> Vec<GroundTruthStar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut stars: Vec<GroundTruthStar> = (0..side * side)
        .map(|i| {
            let (col, row) = ((i % side) as f64, (i / side) as f64);
            GroundTruthStar {
                pos: DVec2::new(
                    origin + col * spacing + rng.random_range(-max_jitter..max_jitter),
                    origin + row * spacing + rng.random_range(-max_jitter..max_jitter),
                ),
                amplitude: 3000.0 - 40.0 * i as f32,
            }
        })
        .collect();
    // Shuffle brightness over the lattice.
    let mut amplitudes: Vec<f32> = stars.iter().map(|s| s.amplitude).collect();
    amplitudes.shuffle(&mut rng);
    for (star, amplitude) in stars.iter_mut().zip(amplitudes) {
        star.amplitude = amplitude;
    }
    stars.sort_by(|a, b| b.amplitude.total_cmp(&a.amplitude));
    stars
}

/// Positions as seen by a frame whose registration transform is `transform`
/// (which maps that frame onto the reference).
pub fn into_target_frame(
    stars: &[GroundTruthStar],
    transform: &AffineTransform,
) -> Vec<GroundTruthStar> {
    stars
        .iter()
        .map(|s| GroundTruthStar {
            pos: transform.apply_inverse(s.pos),
            amplitude: s.amplitude,
        })
        .collect()
}

/// Detection-style star list straight from ground truth.
pub fn as_star_list(stars: &[GroundTruthStar]) -> Vec<Star> {
    stars
        .iter()
        .map(|s| Star::new(s.pos.x, s.pos.y, s.amplitude, s.amplitude))
        .collect()
}

/// Adds independent Gaussian noise of `sigma` to every star position.
pub fn jitter(stars: &[GroundTruthStar], sigma: f64, seed: u64) -> Vec<GroundTruthStar> {
    let mut rng = StdRng::seed_from_u64(seed);
    stars
        .iter()
        .map(|s| GroundTruthStar {
            pos: s.pos + DVec2::new(gaussian(&mut rng), gaussian(&mut rng)) * sigma,
            amplitude: s.amplitude,
        })
        .collect()
}

/// Renders Gaussian stars over a flat noisy background as a mono grid.
pub fn render(config: &FieldConfig, stars: &[GroundTruthStar]) -> PixelGrid {
    let (width, height) = (config.width, config.height);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut pixels: Vec<f32> = (0..width * height)
        .map(|_| config.background + (gaussian(&mut rng) as f32) * config.noise_sigma)
        .collect();

    let sigma = config.psf_sigma;
    let reach = (4.0 * sigma).ceil() as i64;
    for star in stars {
        let cx = star.pos.x.round() as i64;
        let cy = star.pos.y.round() as i64;
        for y in cy - reach..=cy + reach {
            for x in cx - reach..=cx + reach {
                if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                    continue;
                }
                let d = DVec2::new(x as f64, y as f64) - star.pos;
                let falloff = -d.length_squared() / (2.0 * sigma * sigma);
                let value = star.amplitude as f64 * falloff.exp();
                pixels[y as usize * width + x as usize] += value as f32;
            }
        }
    }

    PixelGrid::mono(width, height, pixels).unwrap()
}

/// Color version of a mono grid with per-channel gains.
pub fn to_rgb(grid: &PixelGrid, gains: [f32; 3]) -> PixelGrid {
    let mono = grid.mono_view();
    let planes = gains.map(|g| mono.iter().map(|v| v * g).collect::<Vec<f32>>());
    PixelGrid::rgb(grid.width(), grid.height(), planes).unwrap()
}
