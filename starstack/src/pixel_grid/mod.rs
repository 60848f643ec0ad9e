//! In-memory image model shared by detection, registration and stacking.
//!
//! A [`PixelGrid`] is one float plane (mono) or three planes (R, G, B), each
//! stored row-major. Detection and canvas math only ever look at the
//! [`PixelGrid::mono_view`]: the single plane of a mono grid, or the green
//! plane of a color grid.

pub mod error;
mod samples;


pub use error::GridError;
pub use samples::{SampleArray, SampleBuffer, SampleKind};

use common::Buffer2;
use serde::{Deserialize, Serialize};

/// Value marking a pixel with no data. Excluded from every statistic.
pub const NO_DATA: f32 = 0.0;

/// Plane index of the green channel in an RGB grid.
pub const GREEN_CHANNEL: usize = 1;

/// Plane arrangement of a [`PixelGrid`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum ChannelLayout {
    #[strum(serialize = "mono")]
    Mono,
    #[strum(serialize = "rgb")]
    Rgb,
}

impl ChannelLayout {
    pub fn channel_count(self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Rgb => 3,
        }
    }

    /// Index of the plane backing the mono view.
    pub fn mono_channel(self) -> usize {
        match self {
            ChannelLayout::Mono => 0,
            ChannelLayout::Rgb => GREEN_CHANNEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    layout: ChannelLayout,
    planes: Vec<Buffer2<f32>>,
}

impl PixelGrid {
    /// Single-plane grid from row-major samples.
    pub fn mono(width: usize, height: usize, pixels: Vec<f32>) -> Result<Self, GridError> {
        check_dimensions(width, height)?;
        check_plane(0, width, height, &pixels)?;
        Ok(Self {
            layout: ChannelLayout::Mono,
            planes: vec![Buffer2::new(width, height, pixels)],
        })
    }

    /// Three-plane grid from row-major R, G and B samples.
    pub fn rgb(width: usize, height: usize, planes: [Vec<f32>; 3]) -> Result<Self, GridError> {
        check_dimensions(width, height)?;
        for (plane, pixels) in planes.iter().enumerate() {
            check_plane(plane, width, height, pixels)?;
        }
        Ok(Self {
            layout: ChannelLayout::Rgb,
            planes: planes
                .into_iter()
                .map(|pixels| Buffer2::new(width, height, pixels))
                .collect(),
        })
    }

    /// Grid filled with [`NO_DATA`].
    ///
    /// # Panics
    /// Panics if either dimension is zero.
    pub fn blank(width: usize, height: usize, layout: ChannelLayout) -> Self {
        assert!(width > 0 && height > 0, "Grid dimensions must be positive");
        Self {
            layout,
            planes: (0..layout.channel_count())
                .map(|_| Buffer2::new_filled(width, height, NO_DATA))
                .collect(),
        }
    }

    /// Assembles a grid from planes that are already known to agree in size.
    pub(crate) fn from_planes(layout: ChannelLayout, planes: Vec<Buffer2<f32>>) -> Self {
        debug_assert_eq!(planes.len(), layout.channel_count());
        debug_assert!(
            planes
                .iter()
                .all(|p| p.width() == planes[0].width() && p.height() == planes[0].height())
        );
        Self { layout, planes }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.planes[0].width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.planes[0].height()
    }

    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.planes.len()
    }

    /// Sample at `(x, y)` of `channel`; anything out of range reads as [`NO_DATA`].
    #[inline]
    pub fn get(&self, channel: usize, x: i64, y: i64) -> f32 {
        self.planes
            .get(channel)
            .and_then(|plane| plane.checked(x, y))
            .copied()
            .unwrap_or(NO_DATA)
    }

    /// Writes a sample; out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, channel: usize, x: i64, y: i64, value: f32) {
        if let Some(px) = self
            .planes
            .get_mut(channel)
            .and_then(|plane| plane.checked_mut(x, y))
        {
            *px = value;
        }
    }

    /// Plane used for detection and geometry. For RGB grids this is the green
    /// plane itself, so it always reflects the latest writes.
    #[inline]
    pub fn mono_view(&self) -> &Buffer2<f32> {
        &self.planes[self.layout.mono_channel()]
    }

    #[inline]
    pub fn plane(&self, channel: usize) -> &Buffer2<f32> {
        &self.planes[channel]
    }

    #[inline]
    pub fn planes(&self) -> &[Buffer2<f32>] {
        &self.planes
    }

    /// Fraction of mono-view pixels that carry data.
    pub fn coverage(&self) -> f64 {
        let mono = self.mono_view();
        let covered = mono.iter().filter(|&&v| v != NO_DATA).count();
        covered as f64 / mono.len() as f64
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<(), GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::EmptyDimensions { width, height });
    }
    Ok(())
}

fn check_plane(plane: usize, width: usize, height: usize, pixels: &[f32]) -> Result<(), GridError> {
    let expected = width * height;
    if pixels.len() != expected {
        return Err(GridError::PlaneSizeMismatch {
            plane,
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
