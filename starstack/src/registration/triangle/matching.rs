use std::collections::HashMap;

use glam::DVec2;
use rayon::prelude::*;

use crate::registration::config::{MatchSelection, TriangleMatchConfig};
use crate::star_detection::Star;

use super::geometry::form_triangles;

/// A star in the reference frame paired with a star in the target frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMatch {
    pub ref_idx: usize,
    pub target_idx: usize,
    pub reference: DVec2,
    pub target: DVec2,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    ref_idx: usize,
    target_idx: usize,
    votes: usize,
}

/// Pairs stars of two frames through similar triangles.
///
/// Both lists are expected brightest first; only the first
/// `config.max_stars` of each take part.
pub fn match_stars(
    reference: &[Star],
    target: &[Star],
    config: &TriangleMatchConfig,
) -> Vec<PointMatch> {
    let ref_pos: Vec<DVec2> = reference
        .iter()
        .take(config.max_stars)
        .map(|s| s.pos)
        .collect();
    let target_pos: Vec<DVec2> = target
        .iter()
        .take(config.max_stars)
        .map(|s| s.pos)
        .collect();
    if ref_pos.len() < 3 || target_pos.len() < 3 {
        return Vec::new();
    }

    let ref_triangles = form_triangles(&ref_pos);
    let target_triangles = form_triangles(&target_pos);
    let tolerance = config.ratio_tolerance;

    let vertex_pairs: Vec<(usize, usize)> = ref_triangles
        .par_iter()
        .flat_map_iter(|rt| {
            target_triangles
                .iter()
                .filter(move |tt| rt.is_similar(tt, tolerance))
                .flat_map(move |tt| (0..3).map(move |v| (rt.vertices[v], tt.vertices[v])))
        })
        .collect();

    let candidates = dedup_with_votes(&vertex_pairs, &ref_pos, &target_pos, config.dedup_precision);

    let selected = match config.selection {
        MatchSelection::Unique => candidates,
        MatchSelection::OneToOne => resolve_one_to_one(candidates, ref_pos.len(), target_pos.len()),
    };

    tracing::debug!(
        "Triangle matching: {} x {} triangles, {} vertex pairs, {} correspondences",
        ref_triangles.len(),
        target_triangles.len(),
        vertex_pairs.len(),
        selected.len()
    );

    selected
        .into_iter()
        .map(|c| PointMatch {
            ref_idx: c.ref_idx,
            target_idx: c.target_idx,
            reference: ref_pos[c.ref_idx],
            target: target_pos[c.target_idx],
        })
        .collect()
}

/// Merges correspondences whose coordinates agree on a `precision` grid,
/// counting how often each was proposed. Keeps first-seen order.
fn dedup_with_votes(
    pairs: &[(usize, usize)],
    ref_pos: &[DVec2],
    target_pos: &[DVec2],
    precision: f64,
) -> Vec<Candidate> {
    let quantize = |v: f64| (v / precision).round() as i64;
    let mut index: HashMap<(i64, i64, i64, i64), usize> = HashMap::new();
    let mut candidates: Vec<Candidate> = Vec::new();

    for &(ref_idx, target_idx) in pairs {
        let r = ref_pos[ref_idx];
        let t = target_pos[target_idx];
        let key = (quantize(r.x), quantize(r.y), quantize(t.x), quantize(t.y));
        match index.get(&key) {
            Some(&i) => candidates[i].votes += 1,
            None => {
                index.insert(key, candidates.len());
                candidates.push(Candidate {
                    ref_idx,
                    target_idx,
                    votes: 1,
                });
            }
        }
    }
    candidates
}

/// Greedy assignment by descending votes; a star is never used twice.
fn resolve_one_to_one(
    mut candidates: Vec<Candidate>,
    n_ref: usize,
    n_target: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then(a.ref_idx.cmp(&b.ref_idx))
            .then(a.target_idx.cmp(&b.target_idx))
    });

    let mut used_ref = vec![false; n_ref];
    let mut used_target = vec![false; n_target];
    candidates
        .into_iter()
        .filter(|c| {
            if used_ref[c.ref_idx] || used_target[c.target_idx] {
                return false;
            }
            used_ref[c.ref_idx] = true;
            used_target[c.target_idx] = true;
            true
        })
        .collect()
}
