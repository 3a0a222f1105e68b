//! Four-corner helpers.
//!
//! Corner order throughout the workspace is top-left, top-right,
//! bottom-right, bottom-left.

use nalgebra::Point2;

/// Index of the first point extremizing `key`. Ties keep the lowest index.
fn arg_extreme(pts: &[Point2<f32>; 4], key: impl Fn(&Point2<f32>) -> f32, max: bool) -> usize {
    let mut best = 0;
    let mut best_v = key(&pts[0]);
    for (i, p) in pts.iter().enumerate().skip(1) {
        let v = key(p);
        let better = if max { v > best_v } else { v < best_v };
        if better {
            best = i;
            best_v = v;
        }
    }
    best
}

/// Order four unordered corners as top-left, top-right, bottom-right, bottom-left.
///
/// Top-left has the smallest `x + y` and bottom-right the largest. Top-right
/// has the smallest `y - x` and bottom-left the largest. The rule is only
/// reliable for roughly axis-aligned quads; near 45° two slots can pick the
/// same input point.
pub fn order_points(pts: [Point2<f32>; 4]) -> [Point2<f32>; 4] {
    let sum = |p: &Point2<f32>| p.x + p.y;
    let diff = |p: &Point2<f32>| p.y - p.x;
    [
        pts[arg_extreme(&pts, sum, false)],
        pts[arg_extreme(&pts, diff, false)],
        pts[arg_extreme(&pts, sum, true)],
        pts[arg_extreme(&pts, diff, true)],
    ]
}

/// Edge lengths of an ordered quad: top, right, bottom, left.
pub fn edge_lengths(q: &[Point2<f32>; 4]) -> [f32; 4] {
    [
        (q[1] - q[0]).norm(),
        (q[2] - q[1]).norm(),
        (q[3] - q[2]).norm(),
        (q[0] - q[3]).norm(),
    ]
}

/// Whether the four points are pairwise distinct after ordering, i.e. the
/// ordering heuristic did not assign one input point to two corners.
pub fn is_proper_ordering(q: &[Point2<f32>; 4]) -> bool {
    (0..4).all(|i| ((i + 1)..4).all(|j| q[i] != q[j]))
}
