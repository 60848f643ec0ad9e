//! Normalization between container sample arrays and [`PixelGrid`].
//!
//! Containers hand over a typed sample buffer plus its axes in FITS order
//! (`[width]`, `[width, height]` or `[width, height, planes]`, fastest axis
//! first). Everything is normalized to `f32`; non-finite samples (the FITS
//! blank convention) become [`NO_DATA`].

use std::ops::Range;

use super::{ChannelLayout, GridError, NO_DATA, PixelGrid};

/// Storage type of a sample buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum SampleKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

/// Typed samples in plane-major, row-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

macro_rules! to_f32_range {
    ($samples:expr, $range:expr) => {
        $samples[$range]
            .iter()
            .map(|&s| finite_or_no_data(s as f32))
            .collect()
    };
}

macro_rules! from_f32_iter {
    ($values:expr, $ty:ty) => {
        // Float-to-int `as` saturates at the type bounds.
        $values.map(|v| v.round() as $ty).collect()
    };
}

impl SampleBuffer {
    pub fn kind(&self) -> SampleKind {
        match self {
            SampleBuffer::I8(_) => SampleKind::I8,
            SampleBuffer::U8(_) => SampleKind::U8,
            SampleBuffer::I16(_) => SampleKind::I16,
            SampleBuffer::U16(_) => SampleKind::U16,
            SampleBuffer::I32(_) => SampleKind::I32,
            SampleBuffer::U32(_) => SampleKind::U32,
            SampleBuffer::I64(_) => SampleKind::I64,
            SampleBuffer::U64(_) => SampleKind::U64,
            SampleBuffer::F32(_) => SampleKind::F32,
            SampleBuffer::F64(_) => SampleKind::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SampleBuffer::I8(v) => v.len(),
            SampleBuffer::U8(v) => v.len(),
            SampleBuffer::I16(v) => v.len(),
            SampleBuffer::U16(v) => v.len(),
            SampleBuffer::I32(v) => v.len(),
            SampleBuffer::U32(v) => v.len(),
            SampleBuffer::I64(v) => v.len(),
            SampleBuffer::U64(v) => v.len(),
            SampleBuffer::F32(v) => v.len(),
            SampleBuffer::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn plane_to_f32(&self, range: Range<usize>) -> Vec<f32> {
        match self {
            SampleBuffer::I8(v) => to_f32_range!(v, range),
            SampleBuffer::U8(v) => to_f32_range!(v, range),
            SampleBuffer::I16(v) => to_f32_range!(v, range),
            SampleBuffer::U16(v) => to_f32_range!(v, range),
            SampleBuffer::I32(v) => to_f32_range!(v, range),
            SampleBuffer::U32(v) => to_f32_range!(v, range),
            SampleBuffer::I64(v) => to_f32_range!(v, range),
            SampleBuffer::U64(v) => to_f32_range!(v, range),
            SampleBuffer::F32(v) => to_f32_range!(v, range),
            SampleBuffer::F64(v) => to_f32_range!(v, range),
        }
    }

    fn from_f32<'a>(kind: SampleKind, values: impl Iterator<Item = &'a f32>) -> Self {
        let values = values.copied();
        match kind {
            SampleKind::I8 => SampleBuffer::I8(from_f32_iter!(values, i8)),
            SampleKind::U8 => SampleBuffer::U8(from_f32_iter!(values, u8)),
            SampleKind::I16 => SampleBuffer::I16(from_f32_iter!(values, i16)),
            SampleKind::U16 => SampleBuffer::U16(from_f32_iter!(values, u16)),
            SampleKind::I32 => SampleBuffer::I32(from_f32_iter!(values, i32)),
            SampleKind::U32 => SampleBuffer::U32(from_f32_iter!(values, u32)),
            SampleKind::I64 => SampleBuffer::I64(from_f32_iter!(values, i64)),
            SampleKind::U64 => SampleBuffer::U64(from_f32_iter!(values, u64)),
            SampleKind::F32 => SampleBuffer::F32(values.collect()),
            SampleKind::F64 => SampleBuffer::F64(values.map(f64::from).collect()),
        }
    }
}

/// Sample buffer together with its axes in FITS order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleArray {
    pub axes: Vec<usize>,
    pub data: SampleBuffer,
}

impl SampleArray {
    pub fn new(axes: Vec<usize>, data: SampleBuffer) -> Self {
        Self { axes, data }
    }
}

#[inline]
fn finite_or_no_data(v: f32) -> f32 {
    if v.is_finite() { v } else { NO_DATA }
}

impl PixelGrid {
    /// Normalizes a decoded sample array.
    ///
    /// One axis is a single row, two axes a mono image. A three-axis cube with
    /// three planes is RGB; any other plane count keeps only the first plane.
    pub fn from_samples(array: &SampleArray) -> Result<Self, GridError> {
        let (width, height, planes) = match array.axes.as_slice() {
            [w] => (*w, 1, 1),
            [w, h] => (*w, *h, 1),
            [w, h, p] => (*w, *h, *p),
            axes => return Err(GridError::UnsupportedLayout(axes.len())),
        };
        if width == 0 || height == 0 || planes == 0 {
            return Err(GridError::EmptyDimensions { width, height });
        }

        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(planes))
            .ok_or_else(|| GridError::TooLarge {
                axes: array.axes.clone(),
            })?;
        if array.data.len() != expected {
            return Err(GridError::SampleCountMismatch {
                axes: array.axes.clone(),
                expected,
                actual: array.data.len(),
            });
        }

        let plane_len = width * height;
        if planes == 3 {
            let r = array.data.plane_to_f32(0..plane_len);
            let g = array.data.plane_to_f32(plane_len..2 * plane_len);
            let b = array.data.plane_to_f32(2 * plane_len..3 * plane_len);
            PixelGrid::rgb(width, height, [r, g, b])
        } else {
            if planes > 1 {
                tracing::debug!("Sample cube has {} planes, keeping the first one", planes);
            }
            PixelGrid::mono(width, height, array.data.plane_to_f32(0..plane_len))
        }
    }

    /// Encodes the grid for a container writer.
    ///
    /// Integer kinds round to nearest and saturate at the type bounds.
    pub fn to_samples(&self, kind: SampleKind) -> SampleArray {
        let axes = match self.layout() {
            ChannelLayout::Mono => vec![self.width(), self.height()],
            ChannelLayout::Rgb => vec![self.width(), self.height(), 3],
        };
        let values = self.planes().iter().flat_map(|plane| plane.iter());
        SampleArray {
            axes,
            data: SampleBuffer::from_f32(kind, values),
        }
    }
}
