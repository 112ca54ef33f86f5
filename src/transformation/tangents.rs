use crate::math::{Vector, DEFAULT_EPSILON};
use crate::mesh::{MeshVertex, Tangent};

/// Recomputes smooth vertex normals and tangents from a triangle list.
///
/// Normals are the area-weighted average of the normals of the adjacent triangles. Tangents
/// follow the direction of increasing `u` texture coordinate, orthogonalized against the
/// normal, and the bitangent flip flag records the handedness of the UV mapping. Vertices
/// not referenced by any valid triangle keep their attributes. Triangles referencing vertices
/// out of bounds are ignored.
pub fn recompute_normals_and_tangents(vertices: &mut [MeshVertex], triangles: &[[u32; 3]]) {
    let mut normals = vec![Vector::zeros(); vertices.len()];
    let mut tangents = vec![Vector::zeros(); vertices.len()];
    let mut bitangents = vec![Vector::zeros(); vertices.len()];

    for tri in triangles {
        if tri.iter().any(|i| *i as usize >= vertices.len()) {
            continue;
        }
        let [a, b, c] = tri.map(|i| &vertices[i as usize]);

        let e1 = b.position - a.position;
        let e2 = c.position - a.position;
        // Not normalized: larger triangles weigh more.
        let face_normal = e1.cross(&e2);

        let duv1 = b.uv - a.uv;
        let duv2 = c.uv - a.uv;
        let det = duv1.perp(&duv2);
        let (face_tangent, face_bitangent) = if det.abs() > DEFAULT_EPSILON {
            let r = 1.0 / det;
            ((e1 * duv2.y - e2 * duv1.y) * r, (e2 * duv1.x - e1 * duv2.x) * r)
        } else {
            (Vector::zeros(), Vector::zeros())
        };

        for i in tri {
            let i = *i as usize;
            normals[i] += face_normal;
            tangents[i] += face_tangent;
            bitangents[i] += face_bitangent;
        }
    }

    for (i, vertex) in vertices.iter_mut().enumerate() {
        let Some(normal) = normals[i].try_normalize(DEFAULT_EPSILON) else {
            continue;
        };

        // Gram-Schmidt, falling back to any direction orthogonal to the normal.
        let tangent = (tangents[i] - normal * normal.dot(&tangents[i]))
            .try_normalize(DEFAULT_EPSILON)
            .unwrap_or_else(|| any_orthogonal(&normal));
        let flip_y = normal.cross(&tangent).dot(&bitangents[i]) < 0.0;

        vertex.normal = normal;
        vertex.tangent = Tangent::new(tangent, flip_y);
    }
}

fn any_orthogonal(normal: &Vector) -> Vector {
    let axis = Vector::ith(normal.iamin(), 1.0);
    normal.cross(&axis).normalize()
}
