use crate::math::{Point, Real};
use crate::shape::Plane;

/// Cuts a convex polygon with the half-space lying behind `plane`.
///
/// A point `pt` is inside of the half-space if `plane.signed_distance(pt) <= tolerance`,
/// i.e., `plane.normal` is the outward normal of the half-space. The clipped polygon is
/// written into `result`, keeping the winding of `polygon`.
pub fn clip_halfspace_polygon(
    plane: &Plane,
    polygon: &[Point],
    tolerance: Real,
    result: &mut Vec<Point>,
) {
    result.clear();

    let Some(mut last_pt) = polygon.last() else {
        return;
    };
    let mut last_dist = plane.signed_distance(last_pt);

    for pt in polygon {
        let dist = plane.signed_distance(pt);
        let keep = dist <= tolerance;

        if keep != (last_dist <= tolerance) {
            // The edge crosses the plane: emit the crossing point.
            let t = last_dist / (last_dist - dist);
            if t.is_finite() {
                result.push(last_pt + (pt - last_pt) * t.clamp(0.0, 1.0));
            }
        }

        if keep {
            result.push(*pt);
        }

        last_pt = pt;
        last_dist = dist;
    }
}
