//! Star correspondences from scale- and rotation-invariant triangle shapes.
//!
//! Triangles are formed over the brightest stars of each frame and described
//! by their side-length ratios. Similar reference/target triangles propose
//! three vertex correspondences each; proposals are deduplicated and, by
//! default, resolved one-to-one by how many triangles support them.

mod geometry;
mod matching;


pub use matching::{PointMatch, match_stars};
