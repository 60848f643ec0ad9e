use glam::DVec2;

/// Shortest side below which a triangle is considered degenerate.
pub(crate) const MIN_TRIANGLE_SIDE: f64 = 1e-6;

/// A triangle of three stars with its scale-invariant shape signature.
#[derive(Debug, Clone)]
pub(crate) struct Triangle {
    /// Star indices ordered by the length of the opposite side, shortest first.
    /// Similar triangles pair their vertices by this position.
    pub vertices: [usize; 3],
    /// `(mid / min, max / min)` of the side lengths.
    pub ratios: (f64, f64),
}

impl Triangle {
    /// Returns None for degenerate triangles (coincident points).
    pub fn from_positions(indices: [usize; 3], positions: [DVec2; 3]) -> Option<Self> {
        let [p0, p1, p2] = positions;

        // Each side paired with the vertex opposite it.
        let mut sides = [
            ((p1 - p0).length(), indices[2]),
            ((p2 - p1).length(), indices[0]),
            ((p0 - p2).length(), indices[1]),
        ];
        sides.sort_by(|a, b| a.0.total_cmp(&b.0));

        let shortest = sides[0].0;
        if shortest < MIN_TRIANGLE_SIDE {
            return None;
        }

        Some(Self {
            vertices: [sides[0].1, sides[1].1, sides[2].1],
            ratios: (sides[1].0 / shortest, sides[2].0 / shortest),
        })
    }

    /// Both ratio differences below `tolerance`.
    #[inline]
    pub fn is_similar(&self, other: &Triangle, tolerance: f64) -> bool {
        (self.ratios.0 - other.ratios.0).abs() < tolerance
            && (self.ratios.1 - other.ratios.1).abs() < tolerance
    }
}

/// Every non-degenerate triangle over `positions`, in lexicographic index order.
pub(crate) fn form_triangles(positions: &[DVec2]) -> Vec<Triangle> {
    let n = positions.len();
    let mut triangles = Vec::with_capacity(n * n.saturating_sub(1) * n.saturating_sub(2) / 6);
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                if let Some(t) = Triangle::from_positions(
                    [i, j, k],
                    [positions[i], positions[j], positions[k]],
                ) {
                    triangles.push(t);
                }
            }
        }
    }
    triangles
}
