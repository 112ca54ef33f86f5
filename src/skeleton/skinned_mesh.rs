use crate::mesh::MeshVertex;
use core::ops::Range;

/// The largest number of bone influences a single vertex may carry.
pub const MAX_TOTAL_INFLUENCES: usize = 12;

/// One bone influence of a skinned vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BoneInfluence {
    /// Index into the [`RenderSection::bone_map`] of the section owning the vertex.
    pub bone: u16,
    /// Weight, normalized to `[0, 65535]`. Zero means the slot is unused.
    pub weight: u16,
}

impl BoneInfluence {
    /// Builds an influence from a section-local bone index and a raw weight.
    #[inline]
    pub const fn new(bone: u16, weight: u16) -> Self {
        BoneInfluence { bone, weight }
    }
}

/// Per-vertex bone influences of a LOD, with a fixed number of slots per vertex.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SkinWeightBuffer {
    max_influences: usize,
    influences: Vec<BoneInfluence>,
}

impl SkinWeightBuffer {
    /// Builds a buffer from `max_influences` consecutive slots per vertex.
    ///
    /// `max_influences` is clamped to [`MAX_TOTAL_INFLUENCES`]; trailing slots that do not
    /// form a whole vertex are ignored.
    pub fn new(max_influences: usize, influences: Vec<BoneInfluence>) -> Self {
        SkinWeightBuffer {
            max_influences: max_influences.min(MAX_TOTAL_INFLUENCES),
            influences,
        }
    }

    /// Builds a buffer from per-vertex influence lists, padding each vertex with unused slots.
    pub fn from_vertices<I, J>(max_influences: usize, vertices: I) -> Self
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = BoneInfluence>,
    {
        let max_influences = max_influences.min(MAX_TOTAL_INFLUENCES);
        let mut influences = Vec::new();
        for vertex in vertices {
            let start = influences.len();
            influences.extend(vertex.into_iter().take(max_influences));
            influences.resize(start + max_influences, BoneInfluence::default());
        }
        SkinWeightBuffer {
            max_influences,
            influences,
        }
    }

    /// The number of influence slots per vertex.
    #[inline]
    pub fn max_influences(&self) -> usize {
        self.max_influences
    }

    /// The number of vertices this buffer has weights for.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        if self.max_influences == 0 {
            0
        } else {
            self.influences.len() / self.max_influences
        }
    }

    /// The influence slots of a vertex, or `None` if the vertex is out of range.
    pub fn vertex_influences(&self, vertex: u32) -> Option<&[BoneInfluence]> {
        if (vertex as usize) >= self.num_vertices() {
            return None;
        }
        let start = vertex as usize * self.max_influences;
        Some(&self.influences[start..start + self.max_influences])
    }
}

/// A contiguous range of vertices and triangles of a LOD, drawn with a single material.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RenderSection {
    /// Index of the first vertex of this section.
    pub base_vertex_index: u32,
    /// Number of vertices of this section.
    pub num_vertices: u32,
    /// Offset, in the LOD index buffer, of the first index of this section.
    pub base_index: u32,
    /// Number of triangles of this section.
    pub num_triangles: u32,
    /// Material slot of the source mesh used by this section.
    pub material_index: u32,
    /// Maps the section-local bone indices of [`BoneInfluence::bone`] to skeleton bones.
    pub bone_map: Vec<u16>,
}

impl RenderSection {
    /// Does this section own the given LOD vertex?
    #[inline]
    pub fn contains_vertex(&self, vertex: u32) -> bool {
        vertex >= self.base_vertex_index && vertex - self.base_vertex_index < self.num_vertices
    }

    /// The LOD vertices owned by this section, or `None` if the range overflows.
    #[inline]
    pub fn vertex_range(&self) -> Option<Range<u32>> {
        let end = self.base_vertex_index.checked_add(self.num_vertices)?;
        Some(self.base_vertex_index..end)
    }

    /// The part of the LOD index buffer holding the triangles of this section, or `None` if
    /// the range overflows.
    pub fn index_range(&self) -> Option<Range<usize>> {
        let start = self.base_index as usize;
        let len = (self.num_triangles as usize).checked_mul(3)?;
        Some(start..start.checked_add(len)?)
    }

    /// The skeleton bone a section-local bone index refers to.
    #[inline]
    pub fn skeleton_bone(&self, local_bone: u16) -> Option<u32> {
        self.bone_map.get(local_bone as usize).map(|b| *b as u32)
    }
}

/// One level of detail of a [`SkinnedMesh`].
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SkinnedMeshLod {
    /// Render sections, partitioning the vertex and index buffers.
    pub sections: Vec<RenderSection>,
    /// Bind-pose vertex attributes.
    pub vertices: Vec<MeshVertex>,
    /// Triangle list, indexing into `vertices`.
    pub indices: Vec<u32>,
    /// Bone influences, one entry per vertex.
    pub skin_weights: SkinWeightBuffer,
}

impl SkinnedMeshLod {
    /// The index of the render section owning `vertex`.
    pub fn find_section(&self, vertex: u32) -> Option<usize> {
        self.sections.iter().position(|s| s.contains_vertex(vertex))
    }

    /// The index of the first render section reaching past the vertex or index buffer.
    pub fn find_invalid_section(&self) -> Option<usize> {
        self.sections.iter().position(|s| {
            s.vertex_range()
                .map_or(true, |r| r.end as usize > self.vertices.len())
                || s.index_range().map_or(true, |r| r.end > self.indices.len())
        })
    }
}

/// A bone-weighted mesh with one or more levels of detail.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SkinnedMesh {
    /// Levels of detail, from the most detailed.
    pub lods: Vec<SkinnedMeshLod>,
}

impl SkinnedMesh {
    /// Builds a mesh from its levels of detail.
    pub fn new(lods: Vec<SkinnedMeshLod>) -> Self {
        SkinnedMesh { lods }
    }

    /// The LOD at `index`.
    #[inline]
    pub fn lod(&self, index: usize) -> Option<&SkinnedMeshLod> {
        self.lods.get(index)
    }
}

#[cfg(test)]
mod test {
    use super::{BoneInfluence, RenderSection, SkinWeightBuffer, SkinnedMeshLod};
    use crate::mesh::MeshVertex;

    #[test]
    fn weight_buffer_layout() {
        let buffer = SkinWeightBuffer::from_vertices(
            2,
            vec![
                vec![BoneInfluence::new(0, 65535)],
                vec![
                    BoneInfluence::new(1, 30000),
                    BoneInfluence::new(0, 35535),
                    BoneInfluence::new(2, 1),
                ],
            ],
        );

        assert_eq!(buffer.num_vertices(), 2);
        assert_eq!(
            buffer.vertex_influences(0),
            Some(&[BoneInfluence::new(0, 65535), BoneInfluence::new(0, 0)][..])
        );
        assert_eq!(buffer.vertex_influences(1).map(|s| s.len()), Some(2));
        assert_eq!(buffer.vertex_influences(2), None);
        assert_eq!(SkinWeightBuffer::new(0, vec![]).num_vertices(), 0);
    }

    #[test]
    fn section_ranges() {
        let section = RenderSection {
            base_vertex_index: 4,
            num_vertices: 3,
            bone_map: vec![7, 2],
            ..RenderSection::default()
        };
        assert!(!section.contains_vertex(3));
        assert!(section.contains_vertex(6));
        assert!(!section.contains_vertex(7));
        assert_eq!(section.skeleton_bone(1), Some(2));
        assert_eq!(section.skeleton_bone(2), None);
        assert_eq!(section.vertex_range(), Some(4..7));
    }

    #[test]
    fn overflowing_sections_are_invalid() {
        let section = RenderSection {
            base_vertex_index: u32::MAX - 1,
            num_vertices: 4,
            ..RenderSection::default()
        };
        assert_eq!(section.vertex_range(), None);
        assert!(!section.contains_vertex(3));

        let mut lod = SkinnedMeshLod {
            sections: vec![
                RenderSection {
                    num_vertices: 3,
                    num_triangles: 1,
                    ..RenderSection::default()
                },
                section,
            ],
            vertices: vec![MeshVertex::default(); 3],
            indices: vec![0, 1, 2],
            ..SkinnedMeshLod::default()
        };
        assert_eq!(lod.find_invalid_section(), Some(1));

        lod.sections[1] = RenderSection {
            base_index: 3,
            num_triangles: 1,
            ..RenderSection::default()
        };
        assert_eq!(lod.find_invalid_section(), Some(1));

        let _ = lod.sections.pop();
        assert_eq!(lod.find_invalid_section(), None);
    }
}
