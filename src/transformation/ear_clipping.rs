//! Ear-clipping triangulation of simple polygons.

use crate::math::{Point2D, Real};
use crate::utils::{corner_direction, is_point_in_triangle, Orientation};
use ordered_float::OrderedFloat;

/// The state of a polygon vertex during ear clipping.
#[derive(Clone, Default)]
struct VertexInfo {
    /// Whether the vertex has not been clipped yet.
    is_active: bool,
    /// Whether the vertex is the tip of a clippable ear.
    is_ear: bool,
    /// Cosine of the angle at this vertex. Sharper ears are clipped first.
    pointiness: Real,
    prev: usize,
    next: usize,
}

/// Updates `pointiness` and `is_ear` of the vertex `idx`.
///
/// Returns `false` if the vertex is degenerate (it coincides with one of its neighbors).
fn update_vertex(idx: usize, infos: &mut [VertexInfo], points: &[Point2D]) -> bool {
    let VertexInfo { prev, next, .. } = infos[idx];
    let (p1, p, p3) = (&points[prev], &points[idx], &points[next]);

    let pointiness = (p1 - p).normalize().dot(&(p3 - p).normalize());
    if pointiness.is_nan() {
        return false;
    }

    // An ear is a convex corner whose triangle contains no other active vertex.
    let mut is_ear = corner_direction(p1, p, p3) == Orientation::Ccw;
    if is_ear {
        let mut curr = infos[next].next;
        while curr != prev {
            if is_point_in_triangle(&points[curr], p1, p, p3) != Some(false) {
                is_ear = false;
                break;
            }
            curr = infos[curr].next;
        }
    }

    infos[idx].pointiness = pointiness;
    infos[idx].is_ear = is_ear;
    true
}

/// Triangulates a simple polygon given by its counter-clockwise vertices.
///
/// Returns triangles indexing into `vertices`, wound counter-clockwise, or `None` if the
/// polygon has less than three vertices, has coincident consecutive vertices, or if no ear can
/// be found at some point (the polygon is clockwise or self-intersecting).
pub fn triangulate_ear_clipping(vertices: &[Point2D]) -> Option<Vec<[u32; 3]>> {
    let n = vertices.len();
    if n < 3 {
        return None;
    }

    // A triangle is its own ear, but must still be counter-clockwise.
    if n == 3 && corner_direction(&vertices[0], &vertices[1], &vertices[2]) != Orientation::Ccw {
        return None;
    }

    let mut infos = vec![VertexInfo::default(); n];
    for (i, info) in infos.iter_mut().enumerate() {
        info.is_active = true;
        info.prev = (i + n - 1) % n;
        info.next = (i + 1) % n;
    }

    for i in 0..n {
        if !update_vertex(i, &mut infos, vertices) {
            return None;
        }
    }

    let mut triangles = Vec::with_capacity(n - 2);
    let mut remaining = n;

    while remaining > 3 {
        let best_ear = infos
            .iter()
            .enumerate()
            .filter(|(_, info)| info.is_active && info.is_ear)
            .max_by_key(|(_, info)| OrderedFloat(info.pointiness))
            .map(|(i, _)| i);

        let ear = best_ear?;
        let VertexInfo { prev, next, .. } = infos[ear];
        triangles.push([prev as u32, ear as u32, next as u32]);

        infos[ear].is_active = false;
        infos[prev].next = next;
        infos[next].prev = prev;
        remaining -= 1;

        if remaining > 3
            && (!update_vertex(prev, &mut infos, vertices)
                || !update_vertex(next, &mut infos, vertices))
        {
            return None;
        }
    }

    let last = infos.iter().position(|info| info.is_active)?;
    let VertexInfo { prev, next, .. } = infos[last];
    triangles.push([prev as u32, last as u32, next as u32]);

    Some(triangles)
}
