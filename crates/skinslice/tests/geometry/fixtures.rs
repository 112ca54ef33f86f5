use skinslice::math::{Point, Point2D, Real, Transform, Vector};
use skinslice::mesh::{MeshSection, MeshVertex, ProceduralMesh};
use skinslice::skeleton::{
    Bone, BoneInfluence, RenderSection, Skeleton, SkinWeightBuffer, SkinnedMesh, SkinnedMeshLod,
};

pub const ROOT: usize = 0;
pub const LOWER: usize = 1;
pub const UPPER: usize = 2;

/// root -> lower -> upper, the upper bone starting at `y = 1`.
pub fn limb_skeleton() -> Skeleton {
    let bones = vec![
        Bone::new("root", None),
        Bone::new("lower", Some(ROOT)),
        Bone::new("upper", Some(LOWER)),
    ];
    let bind = vec![
        Transform::identity(),
        Transform::identity(),
        Transform::new_translation(&Vector::new(0.0, 1.0, 0.0)),
    ];
    Skeleton::new(bones, bind).unwrap()
}

const CORNERS: [(Real, Real); 4] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

/// A closed unit-square column of height 2 made of three rings of four vertices, at `y = 0`,
/// `y = 1` and `y = 2`. The bottom ring follows `lower`, the top ring follows `upper`, and the
/// middle ring is shared half and half.
pub fn limb() -> (SkinnedMesh, Skeleton) {
    let mut vertices = Vec::new();
    let mut influences = Vec::new();

    for ring in 0..3 {
        for (x, z) in CORNERS {
            vertices.push(MeshVertex {
                position: Point::new(x, ring as Real, z),
                normal: Vector::new(x - 0.5, 0.0, z - 0.5).normalize(),
                uv: Point2D::new(x + z, ring as Real),
                ..MeshVertex::default()
            });
            influences.push(match ring {
                0 => vec![BoneInfluence::new(1, 65535)],
                1 => vec![BoneInfluence::new(1, 32768), BoneInfluence::new(2, 32767)],
                _ => vec![BoneInfluence::new(2, 65535)],
            });
        }
    }

    let mut indices: Vec<u32> = Vec::new();
    for band in 0..2u32 {
        for i in 0..4u32 {
            let j = (i + 1) % 4;
            let (a, b) = (4 * band + i, 4 * band + j);
            let (c, d) = (4 * (band + 1) + j, 4 * (band + 1) + i);
            indices.extend_from_slice(&[a, c, b, a, d, c]);
        }
    }
    indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
    indices.extend_from_slice(&[8, 10, 9, 8, 11, 10]);

    let lod = SkinnedMeshLod {
        sections: vec![RenderSection {
            base_vertex_index: 0,
            num_vertices: 12,
            base_index: 0,
            num_triangles: indices.len() as u32 / 3,
            material_index: 3,
            bone_map: vec![0, 1, 2],
        }],
        vertices,
        indices,
        skin_weights: SkinWeightBuffer::from_vertices(2, influences),
    };

    (SkinnedMesh::new(vec![lod]), limb_skeleton())
}

/// A unit cube whose side faces are split by a diagonal crossing `y = 0.5`.
pub fn cube_section() -> MeshSection {
    let vertices = (0..8)
        .map(|i| MeshVertex {
            position: Point::new((i & 1) as Real, ((i >> 1) & 1) as Real, ((i >> 2) & 1) as Real),
            ..MeshVertex::default()
        })
        .collect();
    let indices = vec![
        [0, 5, 1],
        [0, 4, 5],
        [2, 3, 7],
        [2, 7, 6],
        [0, 2, 6],
        [0, 6, 4],
        [1, 7, 3],
        [1, 5, 7],
        [0, 3, 2],
        [0, 1, 3],
        [4, 6, 7],
        [4, 7, 5],
    ];
    MeshSection::new(vertices, indices)
}

pub fn cube_mesh() -> ProceduralMesh {
    let mut mesh = ProceduralMesh::new();
    let _ = mesh.push_section(cube_section(), None);
    mesh
}

pub fn triangle_area(a: &Point, b: &Point, c: &Point) -> Real {
    (b - a).cross(&(c - a)).norm() / 2.0
}

pub fn section_area(section: &MeshSection) -> Real {
    let v = section.vertices();
    section
        .indices()
        .iter()
        .map(|t| triangle_area(&v[t[0] as usize].position, &v[t[1] as usize].position, &v[t[2] as usize].position))
        .sum()
}

pub fn mesh_area(mesh: &ProceduralMesh) -> Real {
    mesh.sections().iter().map(section_area).sum()
}

pub fn assert_indices_valid(mesh: &ProceduralMesh) {
    for section in mesh.sections() {
        let n = section.vertices().len() as u32;
        for tri in section.indices() {
            assert!(tri.iter().all(|i| *i < n), "index out of bounds in {:?}", tri);
        }
    }
}
