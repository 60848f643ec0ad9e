use glam::DVec2;
use rand::prelude::*;

use super::*;

fn matches_from(points: &[DVec2], transform: &AffineTransform) -> Vec<PointMatch> {
    points
        .iter()
        .enumerate()
        .map(|(i, &reference)| PointMatch {
            ref_idx: i,
            target_idx: i,
            reference,
            target: transform.apply_inverse(reference),
        })
        .collect()
}

fn random_point(rng: &mut StdRng) -> DVec2 {
    let x = rng.random_range(0.0..1000.0);
    let y = rng.random_range(0.0..1000.0);
    DVec2::new(x, y)
}

fn scattered_points(count: usize, seed: u64) -> Vec<DVec2> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| random_point(&mut rng)).collect()
}

fn assert_transform_close(actual: &AffineTransform, expected: &AffineTransform) {
    assert!(
        (actual.scale - expected.scale).abs() < 1e-6,
        "scale {} vs {}",
        actual.scale,
        expected.scale
    );
    assert!(
        (actual.rotation - expected.rotation).abs() < 1e-6,
        "rotation {} vs {}",
        actual.rotation,
        expected.rotation
    );
    assert!((actual.tx - expected.tx).abs() < 1e-4, "tx {}", actual.tx);
    assert!((actual.ty - expected.ty).abs() < 1e-4, "ty {}", actual.ty);
}

#[test]
fn test_too_few_matches_gives_identity() {
    let matches = matches_from(
        &[DVec2::new(0.0, 0.0), DVec2::new(50.0, 10.0)],
        &AffineTransform::translation(5.0, 5.0),
    );
    let outcome = RansacEstimator::default().estimate(&matches);
    assert!(outcome.transform.is_identity());
    assert_eq!(outcome.inlier_count, 0);
    assert_eq!(outcome.total, 2);

    let empty = RansacEstimator::default().estimate(&[]);
    assert!(empty.transform.is_identity());
    assert_eq!(empty.inlier_count, 0);
}

#[test]
fn test_fit_minimal_exact() {
    let expected = AffineTransform::new(1.02, 3.0f64.to_radians(), 15.0, -8.0);
    let matches = matches_from(
        &[
            DVec2::new(100.0, 100.0),
            DVec2::new(600.0, 250.0),
            DVec2::new(300.0, 800.0),
        ],
        &expected,
    );
    let fitted = fit_minimal([&matches[0], &matches[1], &matches[2]]).unwrap();
    assert_transform_close(&fitted, &expected);
}

#[test]
fn test_fit_minimal_rejects_close_pairs() {
    let t = AffineTransform::IDENTITY;
    let matches = matches_from(
        &[
            DVec2::new(100.0, 100.0),
            DVec2::new(100.5, 100.0),
            DVec2::new(300.0, 800.0),
        ],
        &t,
    );
    assert!(fit_minimal([&matches[0], &matches[1], &matches[2]]).is_none());
}

#[test]
fn test_fit_least_squares_exact() {
    let expected = AffineTransform::new(0.98, -0.4, -120.0, 33.0);
    let matches = matches_from(&scattered_points(15, 1), &expected);
    let fitted = fit_least_squares(&matches).unwrap();
    assert_transform_close(&fitted, &expected);
}

#[test]
fn test_recovers_transform_with_outliers() {
    let expected = AffineTransform::new(1.02, 3.0f64.to_radians(), 15.0, -8.0);
    let mut matches = matches_from(&scattered_points(30, 2), &expected);

    // A third of the correspondences point at random places.
    let mut rng = StdRng::seed_from_u64(3);
    for m in matches.iter_mut().take(10) {
        m.target = random_point(&mut rng);
    }

    let outcome = RansacEstimator::default().estimate(&matches);

    assert_eq!(outcome.total, 30);
    assert_eq!(outcome.inlier_count, 20);
    assert_eq!(outcome.iterations, 500);
    assert_transform_close(&outcome.transform, &expected);
}

#[test]
fn test_deterministic_for_fixed_seed() {
    let expected = AffineTransform::new(1.1, 0.2, 3.0, 4.0);
    let mut matches = matches_from(&scattered_points(25, 4), &expected);
    for m in matches.iter_mut().step_by(3) {
        m.target += DVec2::new(40.0, -25.0);
    }
    let config = RansacConfig {
        refine: false,
        ..RansacConfig::default()
    };

    let a = RansacEstimator::new(config).estimate(&matches);
    let b = RansacEstimator::new(config).estimate(&matches);
    assert_eq!(a, b);
}

#[test]
fn test_all_degenerate_samples_give_identity() {
    // Every point coincides, so no pair is far enough apart to fit.
    let matches: Vec<PointMatch> = (0..5)
        .map(|i| PointMatch {
            ref_idx: i,
            target_idx: i,
            reference: DVec2::new(10.0, 10.0),
            target: DVec2::new(20.0, 20.0),
        })
        .collect();
    let outcome = RansacEstimator::default().estimate(&matches);
    assert!(outcome.transform.is_identity());
    assert_eq!(outcome.inlier_count, 0);
}

#[test]
fn test_count_inliers_threshold_is_strict() {
    let matches = vec![PointMatch {
        ref_idx: 0,
        target_idx: 0,
        reference: DVec2::new(3.0, 0.0),
        target: DVec2::ZERO,
    }];
    let identity = AffineTransform::IDENTITY;
    assert_eq!(count_inliers(&identity, &matches, 3.0), 0);
    assert_eq!(count_inliers(&identity, &matches, 3.01), 1);
}

#[test]
#[should_panic(expected = "streams must be positive")]
fn test_zero_streams_rejected() {
    RansacEstimator::new(RansacConfig {
        streams: 0,
        ..RansacConfig::default()
    });
}
