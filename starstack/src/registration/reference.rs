//! Automatic choice of the reference frame.

use crate::star_detection::Star;

/// Frames with fewer detections are never picked automatically.
pub const MIN_REFERENCE_STARS: usize = 10;

/// Upper bound on the bright stars used for the spread measure.
const SPREAD_STARS: usize = 30;

/// Mean pairwise distance among the first `min(30, n / 2)` stars.
///
/// A smaller spread means a larger image scale. None below
/// [`MIN_REFERENCE_STARS`].
pub fn mean_star_spread(stars: &[Star]) -> Option<f64> {
    if stars.len() < MIN_REFERENCE_STARS {
        return None;
    }
    let n = SPREAD_STARS.min(stars.len() / 2);
    let mut sum = 0.0;
    let mut pairs = 0usize;
    for i in 0..n {
        for j in i + 1..n {
            sum += stars[i].distance_to(&stars[j]);
            pairs += 1;
        }
    }
    (pairs > 0).then(|| sum / pairs as f64)
}

/// Index of the frame with the most detail: many stars, tightly packed.
///
/// Scores are `stars / (spread + 1)`. Falls back to frame 0 when no frame has
/// enough stars.
pub fn select_reference(star_lists: &[Vec<Star>]) -> usize {
    let mut best_index = 0;
    let mut best_score = 0.0;
    for (index, stars) in star_lists.iter().enumerate() {
        let Some(spread) = mean_star_spread(stars) else {
            continue;
        };
        let score = stars.len() as f64 / (spread + 1.0);
        if score > best_score {
            best_score = score;
            best_index = index;
        }
    }
    best_index
}
