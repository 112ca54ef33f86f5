//! Recovery of the bone weights of fragment vertices through provenance chains.

use super::{bone_weight, bone_weights, BoneWeightsInfo};
use crate::math::Real;
use crate::mesh::{MeshProvenance, VertexId};
use crate::skeleton::SkinnedMeshLod;

/// The bone weights of every vertex of a fragment, section by section.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FragmentWeights {
    sections: Vec<Vec<BoneWeightsInfo>>,
}

impl FragmentWeights {
    /// Builds a weight table from its per-section, per-vertex entries.
    pub fn from_sections(sections: Vec<Vec<BoneWeightsInfo>>) -> Self {
        FragmentWeights { sections }
    }

    /// The number of sections described.
    #[inline]
    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    /// The weights of every vertex of a section.
    #[inline]
    pub fn section(&self, section: u32) -> Option<&[BoneWeightsInfo]> {
        self.sections.get(section as usize).map(|s| &s[..])
    }

    /// The weights of a vertex, if it is part of this table.
    pub fn get(&self, vertex: VertexId) -> Option<&BoneWeightsInfo> {
        self.section(vertex.section)?.get(vertex.vertex as usize)
    }
}

/// Composes the provenance of a fragment (fragment → mesh before the cut) with the provenance
/// of the mesh before the cut (→ source LOD vertex index).
///
/// Vertices synthesized by the cut map to `None`.
pub fn resolve_original_vertices(
    fragment: &MeshProvenance<VertexId>,
    pre_slice: &MeshProvenance<u32>,
) -> MeshProvenance<u32> {
    fragment.compose(pre_slice)
}

/// Recovers, for every fragment vertex, the bone weights of the source vertex it derives from.
///
/// `original` maps every fragment vertex to its source LOD vertex (see
/// [`resolve_original_vertices`]). The source vertex is looked up in the render section owning
/// it, and its weights are read with [`bone_weights`]. Vertices without a source, or whose
/// source is outside of every render section, get an empty [`BoneWeightsInfo`].
pub fn remap_fragment_weights(lod: &SkinnedMeshLod, original: &MeshProvenance<u32>) -> FragmentWeights {
    let sections = original
        .sections()
        .iter()
        .map(|map| {
            map.iter()
                .map(|(_, source)| {
                    source
                        .and_then(|v| Some((v, lod.sections.get(lod.find_section(v)?)?)))
                        .map(|(v, section)| bone_weights(lod, section, v))
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    FragmentWeights { sections }
}

/// The weight of a single bone on every fragment vertex, section by section.
///
/// Entries are `None` for vertices without a source, or whose source is not influenced by
/// `bone`.
pub fn remap_single_bone_weights(
    lod: &SkinnedMeshLod,
    original: &MeshProvenance<u32>,
    bone: u32,
) -> Vec<Vec<Option<Real>>> {
    original
        .sections()
        .iter()
        .map(|map| {
            map.iter()
                .map(|(_, source)| {
                    let v = source?;
                    let section = lod.sections.get(lod.find_section(v)?)?;
                    bone_weight(lod, section, v, bone)
                })
                .collect()
        })
        .collect()
}
