//! Cap geometry sealing the boundary left open by a planar cut.

use crate::math::{Point, Real};
use crate::mesh::{Color, MeshVertex, Tangent};
use crate::shape::Plane;
use crate::transformation::{polygons_from_edges, triangulate_ear_clipping};

/// Triangulated cap polygons, facing the kept side of the cut.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Cap {
    pub vertices: Vec<MeshVertex>,
    pub triangles: Vec<[u32; 3]>,
    /// Number of closed polygons successfully triangulated.
    pub polygons: usize,
    /// Number of polygons or open edge chains that could not be triangulated.
    pub dropped: usize,
}

impl Cap {
    /// The same cap, seen from the other side of the cut: reversed winding, inverted normals
    /// and tangents.
    pub fn flipped(&self) -> (Vec<MeshVertex>, Vec<[u32; 3]>) {
        let vertices = self
            .vertices
            .iter()
            .map(|v| MeshVertex {
                normal: -v.normal,
                tangent: Tangent::new(-v.tangent.x, v.tangent.flip_y),
                ..*v
            })
            .collect();
        let triangles = self.triangles.iter().map(|[a, b, c]| [*a, *c, *b]).collect();
        (vertices, triangles)
    }
}

/// Builds the cap of a cut from its clip edges, in the local space of the cut mesh.
///
/// The edges are projected on the plane, chained into closed polygons, and each polygon is
/// triangulated. Texture coordinates tile the plane every `uv_scale` units.
pub(crate) fn build_cap(
    plane: &Plane,
    clip_edges: &[[Point; 2]],
    weld_tolerance: Real,
    uv_scale: Real,
) -> Cap {
    let basis = plane.basis();
    let edges: Vec<_> = clip_edges
        .iter()
        .map(|e| e.map(|pt| plane.project_to_2d(&pt, &basis)))
        .collect();
    let loops = polygons_from_edges(&edges, weld_tolerance);

    if loops.open_chains != 0 {
        log::warn!("{} clip edge chains could not be closed and are left uncapped.", loops.open_chains);
    }

    let mut cap = Cap {
        dropped: loops.open_chains,
        ..Cap::default()
    };
    // The cap of the kept side faces the negative half-space.
    let normal = -plane.normal.into_inner();
    let tangent = Tangent::new(basis.0, false);

    for polygon in &loops.polygons {
        let Some(triangles) = triangulate_ear_clipping(polygon) else {
            log::warn!("Failed to triangulate a cap polygon with {} vertices.", polygon.len());
            cap.dropped += 1;
            continue;
        };

        let base = cap.vertices.len() as u32;
        cap.vertices.extend(polygon.iter().map(|pt| MeshVertex {
            position: plane.lift_from_2d(pt, &basis),
            normal,
            tangent,
            uv: *pt / uv_scale,
            color: Color::WHITE,
        }));
        // The polygon is counter-clockwise around the plane normal: reverse it to face `normal`.
        cap.triangles.extend(
            triangles
                .iter()
                .map(|[a, b, c]| [base + a, base + c, base + b]),
        );
        cap.polygons += 1;
    }

    cap
}
