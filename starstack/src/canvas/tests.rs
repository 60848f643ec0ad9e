use glam::DVec2;
use rand::prelude::*;

use super::*;
use crate::pixel_grid::ChannelLayout;

fn ramp_grid(width: usize, height: usize) -> PixelGrid {
    let pixels = (0..width * height).map(|i| 1.0 + i as f32).collect();
    PixelGrid::mono(width, height, pixels).unwrap()
}

#[test]
fn test_identity_canvas_equals_frame() {
    let canvas = CanvasInfo::from_frames(&[FramePlacement::new(
        640,
        480,
        AffineTransform::IDENTITY,
    )]);
    assert_eq!(
        canvas,
        CanvasInfo {
            width: 640,
            height: 480,
            offset_x: 0,
            offset_y: 0
        }
    );
}

#[test]
fn test_translation_expands_canvas() {
    let canvas = CanvasInfo::from_frames(&[
        FramePlacement::new(100, 80, AffineTransform::IDENTITY),
        FramePlacement::new(100, 80, AffineTransform::translation(15.5, -8.0)),
    ]);
    assert_eq!(canvas.offset_x, 0);
    assert_eq!(canvas.offset_y, 8);
    assert_eq!(canvas.width, 116);
    assert_eq!(canvas.height, 88);
}

#[test]
fn test_rotation_expands_canvas() {
    let quarter_turn = AffineTransform::new(1.0, std::f64::consts::FRAC_PI_2, 0.0, 0.0);
    let canvas = CanvasInfo::from_frames(&[
        FramePlacement::new(100, 50, AffineTransform::IDENTITY),
        FramePlacement::new(100, 50, quarter_turn),
    ]);
    // The rotated frame spans x in [-50, 0] and y in [0, 100].
    assert_eq!(canvas.offset_x, 50);
    assert_eq!(canvas.offset_y, 0);
    assert_eq!(canvas.width, 150);
    assert_eq!(canvas.height, 100);
}

#[test]
fn test_every_corner_inside_canvas() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut frames = vec![FramePlacement::new(300, 200, AffineTransform::IDENTITY)];
    for _ in 0..6 {
        frames.push(FramePlacement::new(
            rng.random_range(150..400),
            rng.random_range(150..400),
            AffineTransform::new(
                rng.random_range(0.9..1.1),
                rng.random_range(-0.5..0.5),
                rng.random_range(-60.0..60.0),
                rng.random_range(-60.0..60.0),
            ),
        ));
    }

    let canvas = CanvasInfo::from_frames(&frames);

    for frame in &frames {
        for corner in frame.corners() {
            let p = canvas.to_canvas(corner);
            assert!(canvas.contains(p), "corner {p:?} outside {canvas:?}");
        }
    }
    assert!(canvas.width >= 300 && canvas.height >= 200);
}

#[test]
fn test_canvas_at_least_largest_frame() {
    let canvas = CanvasInfo::from_frames(&[
        FramePlacement::new(200, 100, AffineTransform::IDENTITY),
        FramePlacement::new(120, 260, AffineTransform::translation(3.0, 4.0)),
    ]);
    assert!(canvas.width >= 200);
    assert!(canvas.height >= 260);
}

#[test]
fn test_resample_identity_copies_interior() {
    let grid = ramp_grid(8, 6);
    let canvas = CanvasInfo::from_frames(&[FramePlacement::new(8, 6, AffineTransform::IDENTITY)]);

    let out = resample(&grid, &AffineTransform::IDENTITY, &canvas);

    for y in 0..5 {
        for x in 0..7 {
            assert_eq!(out.get(0, x, y), grid.get(0, x, y), "pixel ({x}, {y})");
        }
    }
    // The last row and column have no right/bottom neighbour to interpolate.
    assert_eq!(out.get(0, 7, 2), NO_DATA);
    assert_eq!(out.get(0, 3, 5), NO_DATA);
}

#[test]
fn test_resample_integer_shift_with_offset() {
    let grid = ramp_grid(10, 10);
    let shift = AffineTransform::translation(-3.0, 2.0);
    let canvas = CanvasInfo::from_frames(&[
        FramePlacement::new(10, 10, AffineTransform::IDENTITY),
        FramePlacement::new(10, 10, shift),
    ]);
    assert_eq!((canvas.offset_x, canvas.offset_y), (3, 0));
    assert_eq!((canvas.width, canvas.height), (13, 12));

    let out = resample(&grid, &shift, &canvas);

    // Source (4, 5) lands at reference (1, 7), canvas (4, 7).
    assert_eq!(out.get(0, 4, 7), grid.get(0, 4, 5));
    // Canvas pixels the frame never reaches stay empty.
    assert_eq!(out.get(0, 12, 0), NO_DATA);
    assert_eq!(out.get(0, 0, 0), NO_DATA);
}

#[test]
fn test_bilinear_midpoint_and_bounds() {
    let plane = Buffer2::new(2, 2, vec![0.0, 10.0, 20.0, 30.0]);
    assert!((sample_bilinear(&plane, DVec2::new(0.5, 0.5)) - 15.0).abs() < 1e-6);
    assert!((sample_bilinear(&plane, DVec2::new(0.25, 0.0)) - 2.5).abs() < 1e-6);
    assert_eq!(sample_bilinear(&plane, DVec2::new(-0.01, 0.5)), NO_DATA);
    assert_eq!(sample_bilinear(&plane, DVec2::new(1.0, 0.5)), NO_DATA);
    assert_eq!(sample_bilinear(&plane, DVec2::new(f64::NAN, 0.5)), NO_DATA);
}

#[test]
fn test_resample_rgb_channels_independent() {
    let grid = PixelGrid::rgb(4, 4, [vec![1.0; 16], vec![2.0; 16], vec![3.0; 16]]).unwrap();
    let canvas = CanvasInfo::from_frames(&[FramePlacement::new(4, 4, AffineTransform::IDENTITY)]);

    let out = resample(&grid, &AffineTransform::translation(0.5, 0.5), &canvas);

    assert_eq!(out.layout(), ChannelLayout::Rgb);
    assert_eq!(out.get(0, 2, 2), 1.0);
    assert_eq!(out.get(1, 2, 2), 2.0);
    assert_eq!(out.get(2, 2, 2), 3.0);
    assert_eq!(out.mono_view().pixels(), out.plane(1).pixels());
}

#[test]
fn test_resample_all_keeps_order() {
    let a = ramp_grid(5, 5);
    let b = PixelGrid::mono(5, 5, vec![7.0; 25]).unwrap();
    let canvas = CanvasInfo::from_frames(&[FramePlacement::new(5, 5, AffineTransform::IDENTITY)]);

    let identity = AffineTransform::IDENTITY;
    let out = resample_all(&[(&a, identity), (&b, identity)], &canvas);

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].get(0, 1, 1), a.get(0, 1, 1));
    assert_eq!(out[1].get(0, 1, 1), 7.0);
}
