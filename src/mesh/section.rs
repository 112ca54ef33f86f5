use super::MeshVertex;
use crate::bounding_volume::Aabb;

/// A single section of a [`ProceduralMesh`](super::ProceduralMesh): a vertex buffer plus a
/// triangle list indexing into it.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MeshSection {
    vertices: Vec<MeshVertex>,
    indices: Vec<[u32; 3]>,
    local_aabb: Aabb,
}

impl MeshSection {
    /// Builds a section and computes its local bounding box.
    ///
    /// Triangles referencing vertices out of bounds are kept as-is; callers are expected to
    /// provide a consistent index buffer.
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<[u32; 3]>) -> Self {
        let local_aabb = Aabb::from_points(vertices.iter().map(|v| v.position));
        MeshSection {
            vertices,
            indices,
            local_aabb,
        }
    }

    /// The vertex buffer.
    #[inline]
    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    /// Mutable access to the vertex buffer.
    ///
    /// Call [`Self::recompute_aabb`] after moving vertices.
    #[inline]
    pub fn vertices_mut(&mut self) -> &mut [MeshVertex] {
        &mut self.vertices
    }

    /// The triangle list.
    #[inline]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// The bounding box of the vertex buffer.
    #[inline]
    pub fn local_aabb(&self) -> &Aabb {
        &self.local_aabb
    }

    /// Does this section lack either vertices or triangles?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Appends a vertex and returns its index.
    pub fn push_vertex(&mut self, vertex: MeshVertex) -> u32 {
        self.local_aabb.take_point(vertex.position);
        self.vertices.push(vertex);
        self.vertices.len() as u32 - 1
    }

    /// Appends a triangle.
    #[inline]
    pub fn push_triangle(&mut self, triangle: [u32; 3]) {
        self.indices.push(triangle);
    }

    /// Appends vertices and triangles indexing into them, starting at zero.
    pub fn append(&mut self, vertices: &[MeshVertex], triangles: &[[u32; 3]]) {
        let base = self.vertices.len() as u32;
        for vertex in vertices {
            self.local_aabb.take_point(vertex.position);
        }
        self.vertices.extend_from_slice(vertices);
        self.indices
            .extend(triangles.iter().map(|tri| tri.map(|i| base + i)));
    }

    /// Removes every vertex and triangle.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.local_aabb = Aabb::new_invalid();
    }

    /// Recomputes the bounding box from the current vertex positions.
    pub fn recompute_aabb(&mut self) {
        self.local_aabb = Aabb::from_points(self.vertices.iter().map(|v| v.position));
    }
}
