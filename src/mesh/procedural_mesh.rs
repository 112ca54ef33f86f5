use super::MeshSection;
use crate::bounding_volume::Aabb;
use crate::math::Isometry;
use crate::shape::{CollisionSettings, ConvexHull};

/// Opaque handle to a material owned by the host application.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MaterialId(pub u32);

/// An editable, sectioned triangle mesh with convex collision.
///
/// Each section has its own vertex and index buffers and an optional material. Section
/// indices are stable: clearing a section keeps its slot so that materials and provenance
/// maps stay aligned.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ProceduralMesh {
    sections: Vec<MeshSection>,
    materials: Vec<Option<MaterialId>>,
    collision: Vec<ConvexHull>,
    /// Collision configuration, copied to the other half of a slice.
    pub collision_settings: CollisionSettings,
    /// Placement of this mesh in world-space.
    pub transform: Isometry,
}

impl Default for ProceduralMesh {
    fn default() -> Self {
        ProceduralMesh {
            sections: Vec::new(),
            materials: Vec::new(),
            collision: Vec::new(),
            collision_settings: CollisionSettings::default(),
            transform: Isometry::identity(),
        }
    }
}

impl ProceduralMesh {
    /// An empty mesh placed at the world origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of section slots, including cleared sections.
    #[inline]
    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    /// The section at `index`, if that slot exists.
    #[inline]
    pub fn section(&self, index: usize) -> Option<&MeshSection> {
        self.sections.get(index)
    }

    /// Mutable access to the section at `index`.
    #[inline]
    pub fn section_mut(&mut self, index: usize) -> Option<&mut MeshSection> {
        self.sections.get_mut(index)
    }

    /// All the section slots.
    #[inline]
    pub fn sections(&self) -> &[MeshSection] {
        &self.sections
    }

    /// Mutable access to all the section slots.
    #[inline]
    pub fn sections_mut(&mut self) -> &mut [MeshSection] {
        &mut self.sections
    }

    /// Stores `section` at `index`, appending empty slots if needed.
    pub fn set_section(&mut self, index: usize, section: MeshSection) {
        if index >= self.sections.len() {
            self.sections.resize_with(index + 1, MeshSection::default);
        }
        self.sections[index] = section;
    }

    /// Appends a section and returns its index.
    pub fn push_section(&mut self, section: MeshSection, material: Option<MaterialId>) -> usize {
        let index = self.sections.len();
        self.sections.push(section);
        self.set_material(index, material);
        index
    }

    /// Empties the section at `index`, keeping its slot and material.
    pub fn clear_section(&mut self, index: usize) {
        if let Some(section) = self.sections.get_mut(index) {
            section.clear();
        }
    }

    /// The material of the section at `index`.
    #[inline]
    pub fn material(&self, index: usize) -> Option<MaterialId> {
        self.materials.get(index).copied().flatten()
    }

    /// Assigns a material to the section at `index`.
    pub fn set_material(&mut self, index: usize, material: Option<MaterialId>) {
        if index >= self.materials.len() {
            self.materials.resize(index + 1, None);
        }
        self.materials[index] = material;
    }

    /// The convex collision elements of this mesh, in local-space.
    #[inline]
    pub fn collision(&self) -> &[ConvexHull] {
        &self.collision
    }

    /// Replaces the convex collision elements of this mesh.
    pub fn set_collision(&mut self, collision: Vec<ConvexHull>) {
        self.collision = collision;
    }

    /// Appends a convex collision element.
    pub fn add_collision_convex(&mut self, hull: ConvexHull) {
        self.collision.push(hull);
    }

    /// The total number of vertices over all sections.
    pub fn num_vertices(&self) -> usize {
        self.sections.iter().map(|s| s.vertices().len()).sum()
    }

    /// The total number of triangles over all sections.
    pub fn num_triangles(&self) -> usize {
        self.sections.iter().map(|s| s.indices().len()).sum()
    }

    /// The local-space bounding box of every section. Invalid if the mesh is empty.
    pub fn local_aabb(&self) -> Aabb {
        self.sections
            .iter()
            .filter(|s| !s.vertices().is_empty())
            .fold(Aabb::new_invalid(), |acc, s| acc.merged(s.local_aabb()))
    }
}
