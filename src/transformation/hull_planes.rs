//! Conversions between convex point clouds and their face planes.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector, DEFAULT_EPSILON};
use crate::query::clip::clip_halfspace_polygon;
use crate::shape::Plane;
use hashbrown::HashSet;
use ordered_float::OrderedFloat;

/// Relative tolerance, scaled by the size of the point cloud.
const RELATIVE_TOLERANCE: Real = 1.0e-5;

fn tolerance_for(aabb: &Aabb) -> Real {
    (aabb.extents().norm() * RELATIVE_TOLERANCE).max(DEFAULT_EPSILON)
}

/// A triangular face of the hull being built, wound counter-clockwise seen from outside.
struct HullFacet {
    pts: [usize; 3],
    plane: Plane,
    /// Points lying above this facet and not yet part of the hull.
    outside: Vec<usize>,
    valid: bool,
}

impl HullFacet {
    /// The facet `a b c`, reoriented so that `interior` lies below it.
    fn new(
        [a, b, c]: [usize; 3],
        points: &[Point],
        interior: &Point,
        min_cross: Real,
    ) -> Option<HullFacet> {
        let normal = (points[b] - points[a]).cross(&(points[c] - points[a]));
        if normal.norm() <= min_cross {
            return None;
        }
        let plane = Plane::from_point_normal(&points[a], &normal)?;

        let (pts, plane) = if plane.signed_distance(interior) > 0.0 {
            ([a, c, b], plane.flipped())
        } else {
            ([a, b, c], plane)
        };

        Some(HullFacet {
            pts,
            plane,
            outside: Vec::new(),
            valid: true,
        })
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.pts;
        [(a, b), (b, c), (c, a)]
    }
}

/// The index of the point furthest along `dir`.
fn support_point_id(dir: &Vector, points: &[Point]) -> Option<usize> {
    (0..points.len()).max_by_key(|i| OrderedFloat(dir.dot(&points[*i].coords)))
}

/// A tetrahedron spanned by four of the points, and a point strictly inside of it.
///
/// The first two vertices are the extreme points along the largest extent of the cloud, the
/// third maximizes the area of the base triangle and the fourth is the furthest from its plane.
fn initial_tetrahedron(
    points: &[Point],
    aabb: &Aabb,
    eps: Real,
    min_cross: Real,
) -> Option<([usize; 4], Vec<HullFacet>, Point)> {
    let axis = Vector::ith(aabb.extents().imax(), 1.0);
    let p1 = support_point_id(&axis, points)?;
    let p2 = support_point_id(&-axis, points)?;

    let dir = points[p2] - points[p1];
    let base_normal = |i: usize| dir.cross(&(points[i] - points[p1]));
    let p3 = (0..points.len()).max_by_key(|i| OrderedFloat(base_normal(*i).norm()))?;
    if base_normal(p3).norm() <= min_cross {
        return None;
    }

    let base = Plane::from_point_normal(&points[p1], &base_normal(p3))?;
    let p4 = (0..points.len()).max_by_key(|i| OrderedFloat(base.signed_distance(&points[*i]).abs()))?;
    if base.signed_distance(&points[p4]).abs() <= eps {
        return None;
    }

    let seeds = [p1, p2, p3, p4];
    let interior = Point::from(seeds.iter().map(|i| points[*i].coords).sum::<Vector>() / 4.0);
    let facets = [[p1, p2, p3], [p1, p2, p4], [p2, p3, p4], [p3, p1, p4]]
        .into_iter()
        .map(|tri| HullFacet::new(tri, points, &interior, 0.0))
        .collect::<Option<Vec<_>>>()?;

    Some((seeds, facets, interior))
}

/// Gives each point to the facet it lies the furthest above, if it lies above any.
fn assign_outside_points(
    candidates: impl IntoIterator<Item = usize>,
    facets: &mut [HullFacet],
    points: &[Point],
    eps: Real,
) {
    for pt in candidates {
        let mut furthest = None;
        let mut furthest_dist = eps;

        for (i, facet) in facets.iter().enumerate() {
            let dist = facet.plane.signed_distance(&points[pt]);
            if facet.valid && dist > furthest_dist {
                furthest = Some(i);
                furthest_dist = dist;
            }
        }

        if let Some(i) = furthest {
            facets[i].outside.push(pt);
        }
    }
}

/// The outward face planes of the convex hull of `points`.
///
/// The hull is built incrementally with quickhull: starting from a tetrahedron, the furthest
/// point above a facet is added, the facets it sees are replaced by a fan joining it to their
/// silhouette, and the remaining outside points are given to the new facets. Coplanar facets
/// yield a single plane. Returns an empty set if the points do not span a volume.
pub fn convex_hull_planes(points: &[Point]) -> Vec<Plane> {
    if points.len() < 4 {
        return Vec::new();
    }

    let aabb = Aabb::from_points(points.iter().copied());
    let eps = tolerance_for(&aabb);
    let min_cross = eps * aabb.extents().norm();

    let Some((seeds, mut facets, interior)) = initial_tetrahedron(points, &aabb, eps, min_cross)
    else {
        return Vec::new();
    };
    assign_outside_points(
        (0..points.len()).filter(|i| !seeds.contains(i)),
        &mut facets,
        points,
        eps,
    );

    let mut curr = 0;
    while curr < facets.len() {
        let facet = &facets[curr];
        let eye = facet
            .outside
            .iter()
            .copied()
            .max_by_key(|i| OrderedFloat(facet.plane.signed_distance(&points[*i])));
        let Some(eye) = eye.filter(|_| facet.valid) else {
            curr += 1;
            continue;
        };

        let visible: Vec<usize> = (0..facets.len())
            .filter(|i| facets[*i].valid && facets[*i].plane.signed_distance(&points[eye]) > eps)
            .collect();

        // The silhouette: edges of visible facets whose twin belongs to a hidden facet.
        let visible_edges: HashSet<(usize, usize)> =
            visible.iter().flat_map(|i| facets[*i].edges()).collect();
        let silhouette: Vec<(usize, usize)> = visible
            .iter()
            .flat_map(|i| facets[*i].edges())
            .filter(|(a, b)| !visible_edges.contains(&(*b, *a)))
            .collect();

        let mut orphans = Vec::new();
        for i in &visible {
            facets[*i].valid = false;
            orphans.append(&mut facets[*i].outside);
        }

        let first_new = facets.len();
        for (a, b) in silhouette {
            if let Some(facet) = HullFacet::new([a, b, eye], points, &interior, min_cross) {
                facets.push(facet);
            }
        }

        assign_outside_points(
            orphans.into_iter().filter(|i| *i != eye),
            &mut facets[first_new..],
            points,
            eps,
        );
        curr += 1;
    }

    let mut planes: Vec<Plane> = Vec::new();
    for facet in facets.iter().filter(|f| f.valid) {
        let duplicate = planes.iter().any(|p| {
            p.normal.dot(&facet.plane.normal) > 1.0 - RELATIVE_TOLERANCE
                && (p.bias - facet.plane.bias).abs() <= eps
        });
        if !duplicate {
            planes.push(facet.plane);
        }
    }

    planes
}

/// The vertices of the convex polytope `{ x | plane.signed_distance(x) <= 0 }` for all planes.
///
/// `bounds` must contain the polytope: each plane is seeded with a square covering the bounds
/// and clipped by all the other planes, and the resulting corners are merged.
pub fn hull_from_planes(planes: &[Plane], bounds: &Aabb) -> Vec<Point> {
    let eps = tolerance_for(bounds);
    let center = bounds.center();
    let half_size = bounds.half_extents().norm() * 2.0 + eps;

    let mut vertices: Vec<Point> = Vec::new();
    let mut polygon = Vec::with_capacity(8);
    let mut clipped = Vec::with_capacity(8);

    for (i, plane) in planes.iter().enumerate() {
        let origin = center - plane.normal.into_inner() * plane.signed_distance(&center);
        let (u, v) = plane.basis();
        let (u, v) = (u * half_size, v * half_size);

        polygon.clear();
        polygon.extend_from_slice(&[origin - u - v, origin + u - v, origin + u + v, origin - u + v]);

        for (j, other) in planes.iter().enumerate() {
            if i != j {
                clip_halfspace_polygon(other, &polygon, eps, &mut clipped);
                core::mem::swap(&mut polygon, &mut clipped);
                if polygon.is_empty() {
                    break;
                }
            }
        }

        for pt in &polygon {
            if vertices.iter().all(|v| na::distance(v, pt) > eps * 10.0) {
                vertices.push(*pt);
            }
        }
    }

    vertices
}
