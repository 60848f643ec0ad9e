//! Output canvas geometry and resampling of frames onto it.
//!
//! The canvas is the bounding box of every included frame's corners mapped
//! into reference coordinates, shifted by an integer offset so all of it lies
//! at non-negative pixel coordinates. Nothing is cropped.

#[cfg(test)]
mod tests;

use common::Buffer2;
use common::parallel::par_rows_mut;
use glam::DVec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::pixel_grid::{NO_DATA, PixelGrid};
use crate::registration::AffineTransform;

/// Corner coordinates closer than this to an integer are snapped to it.
const SNAP_EPSILON: f64 = 1e-6;

/// Size and placement of the output image in reference coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasInfo {
    pub width: usize,
    pub height: usize,
    /// Added to reference x to get canvas x.
    pub offset_x: i64,
    /// Added to reference y to get canvas y.
    pub offset_y: i64,
}

/// Dimensions of a frame and its transform into reference coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlacement {
    pub width: usize,
    pub height: usize,
    pub transform: AffineTransform,
}

impl FramePlacement {
    pub fn new(width: usize, height: usize, transform: AffineTransform) -> Self {
        Self {
            width,
            height,
            transform,
        }
    }

    /// Frame corners (pixel edges) in reference coordinates.
    pub fn corners(&self) -> [DVec2; 4] {
        let (w, h) = (self.width as f64, self.height as f64);
        [
            DVec2::new(0.0, 0.0),
            DVec2::new(w, 0.0),
            DVec2::new(w, h),
            DVec2::new(0.0, h),
        ]
        .map(|corner| self.transform.apply(corner))
    }
}

impl CanvasInfo {
    /// Smallest canvas holding every frame's corners.
    ///
    /// # Panics
    /// Panics if `frames` is empty.
    pub fn from_frames(frames: &[FramePlacement]) -> Self {
        assert!(!frames.is_empty(), "canvas needs at least one frame");

        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for corner in frames.iter().flat_map(|f| f.corners()) {
            min = min.min(corner);
            max = max.max(corner);
        }
        let min = DVec2::new(snap(min.x), snap(min.y));
        let max = DVec2::new(snap(max.x), snap(max.y));

        let offset_x = (-min.x).ceil() as i64;
        let offset_y = (-min.y).ceil() as i64;
        let width = (max.x + offset_x as f64).ceil().max(1.0) as usize;
        let height = (max.y + offset_y as f64).ceil().max(1.0) as usize;

        tracing::debug!(
            "Canvas {}x{} with offset ({}, {}) for {} frames",
            width,
            height,
            offset_x,
            offset_y,
            frames.len()
        );

        Self {
            width,
            height,
            offset_x,
            offset_y,
        }
    }

    /// Canvas position of a point in reference coordinates.
    #[inline]
    pub fn to_canvas(&self, p: DVec2) -> DVec2 {
        p + DVec2::new(self.offset_x as f64, self.offset_y as f64)
    }

    /// True if `p` (canvas coordinates) lies within the canvas, edges included.
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width as f64 && p.y <= self.height as f64
    }
}

#[inline]
fn snap(v: f64) -> f64 {
    let rounded = v.round();
    if (v - rounded).abs() < SNAP_EPSILON {
        rounded
    } else {
        v
    }
}

/// Resamples `grid` onto the canvas through the inverse of `transform`.
///
/// Canvas pixels whose source falls outside `[0, w-1) x [0, h-1)` get
/// [`NO_DATA`]. Each channel is interpolated independently.
pub fn resample(grid: &PixelGrid, transform: &AffineTransform, canvas: &CanvasInfo) -> PixelGrid {
    let planes = grid
        .planes()
        .iter()
        .map(|plane| resample_plane(plane, transform, canvas))
        .collect();
    PixelGrid::from_planes(grid.layout(), planes)
}

fn resample_plane(
    source: &Buffer2<f32>,
    transform: &AffineTransform,
    canvas: &CanvasInfo,
) -> Buffer2<f32> {
    let width = canvas.width;
    let mut output = Buffer2::new_filled(width, canvas.height, NO_DATA);
    let offset = DVec2::new(canvas.offset_x as f64, canvas.offset_y as f64);

    par_rows_mut(output.pixels_mut(), width).for_each(|(first_row, chunk)| {
        for (local_y, row) in chunk.chunks_mut(width).enumerate() {
            let y = (first_row + local_y) as f64;
            for (x, px) in row.iter_mut().enumerate() {
                let src = transform.apply_inverse(DVec2::new(x as f64, y) - offset);
                *px = sample_bilinear(source, src);
            }
        }
    });

    output
}

/// Bilinear sample at `p`, or [`NO_DATA`] outside `[0, w-1) x [0, h-1)`.
#[inline]
pub(crate) fn sample_bilinear(source: &Buffer2<f32>, p: DVec2) -> f32 {
    let max_x = (source.width() - 1) as f64;
    let max_y = (source.height() - 1) as f64;
    // Written so NaN coordinates fail the check too.
    if !(p.x >= 0.0 && p.y >= 0.0 && p.x < max_x && p.y < max_y) {
        return NO_DATA;
    }

    let x0 = p.x.floor() as usize;
    let y0 = p.y.floor() as usize;
    let fx = (p.x - x0 as f64) as f32;
    let fy = (p.y - y0 as f64) as f32;

    let v00 = source[(x0, y0)];
    let v10 = source[(x0 + 1, y0)];
    let v01 = source[(x0, y0 + 1)];
    let v11 = source[(x0 + 1, y0 + 1)];

    let top = v00 + (v10 - v00) * fx;
    let bottom = v01 + (v11 - v01) * fx;
    top + (bottom - top) * fy
}

/// Resamples every frame onto the canvas in parallel.
pub fn resample_all(
    frames: &[(&PixelGrid, AffineTransform)],
    canvas: &CanvasInfo,
) -> Vec<PixelGrid> {
    frames
        .par_iter()
        .map(|(grid, transform)| resample(grid, transform, canvas))
        .collect()
}
