use super::SplitResult;
use crate::shape::{ConvexHull, Plane, PlaneSide};
use crate::transformation::{convex_hull_planes, hull_from_planes};

/// Cuts a convex collision hull with a plane.
///
/// Hulls whose bounding box lies on one side of the plane are reported as such. Otherwise the
/// hull face planes are recovered, completed with the cutting plane (flipped for the positive
/// part), and each part is rebuilt from its half-spaces. A part with less than four vertices
/// is degenerate and returned as `None`.
pub fn split_convex_hull(hull: &ConvexHull, plane: &Plane) -> SplitResult<Option<ConvexHull>> {
    match plane.aabb_side(hull.local_aabb()) {
        PlaneSide::Positive => SplitResult::Positive,
        PlaneSide::Negative => SplitResult::Negative,
        PlaneSide::Straddling => {
            let faces = convex_hull_planes(hull.points());
            if faces.is_empty() {
                log::debug!("Discarding a flat collision hull with {} points.", hull.points().len());
                return SplitResult::Pair(None, None);
            }

            let part = |cut: Plane| {
                let mut planes = faces.clone();
                planes.push(cut);
                let points = hull_from_planes(&planes, hull.local_aabb());
                if points.len() < 4 {
                    log::debug!("Discarding a degenerate hull part with {} vertices.", points.len());
                    None
                } else {
                    Some(ConvexHull::new(points))
                }
            };

            SplitResult::Pair(part(*plane), part(plane.flipped()))
        }
    }
}
