//! Orientation predicates on 2D points.

use crate::math::{Point2D, Real};

/// The winding direction of a corner or a polygon.
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum Orientation {
    /// Counter-clockwise.
    Ccw,
    /// Clockwise.
    Cw,
    /// Neither: the points are aligned, or a coordinate is NaN.
    None,
}

/// The direction of the turn made at `p2` when walking from `p1` to `p3`.
///
/// ```text
///  p1 o                    o p2
///      .      o p3        .  .
///       .   .            .    .
///        o p2        p1 o      o p3
///      Ccw                Cw
/// ```
pub fn corner_direction(p1: &Point2D, p2: &Point2D, p3: &Point2D) -> Orientation {
    let cross = (p1 - p2).perp(&(p3 - p2));

    if cross < 0.0 {
        Orientation::Ccw
    } else if cross > 0.0 {
        Orientation::Cw
    } else {
        Orientation::None
    }
}

/// Is `p` inside the triangle `v1 v2 v3`, or on its boundary?
///
/// Returns `None` if the triangle is flat.
pub fn is_point_in_triangle(
    p: &Point2D,
    v1: &Point2D,
    v2: &Point2D,
    v3: &Point2D,
) -> Option<bool> {
    let dirs = [
        corner_direction(p, v1, v2),
        corner_direction(p, v2, v3),
        corner_direction(p, v3, v1),
    ];

    if dirs.iter().all(|d| *d == Orientation::None) {
        return None;
    }

    let has_cw = dirs.contains(&Orientation::Cw);
    let has_ccw = dirs.contains(&Orientation::Ccw);
    Some(!(has_cw && has_ccw))
}

/// Twice the signed area of a simple polygon: positive if it is wound counter-clockwise.
pub fn polygon_signed_area2(vertices: &[Point2D]) -> Real {
    let n = vertices.len();
    (0..n)
        .map(|i| vertices[i].coords.perp(&vertices[(i + 1) % n].coords))
        .sum()
}
