//! Extraction of the part of a skinned mesh influenced by a bone.

use super::bone_weight;
use crate::math::Real;
use crate::mesh::{
    Color, MaterialId, MeshProvenance, MeshSection, MeshVertex, ProceduralMesh, ProvenanceMap,
};
use crate::skeleton::{Skeleton, SkinnedMesh};
use crate::transformation::recompute_normals_and_tangents;
use hashbrown::HashMap;

/// What to do when the filter bone does not exist on the skeleton.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum UnresolvedBonePolicy {
    /// Log a warning and keep every vertex.
    #[default]
    DisableFiltering,
    /// Fail with [`ExtractError::UnknownBone`].
    Fail,
}

/// Configuration of [`extract_filtered_mesh`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FilterOptions {
    /// Keep only the vertices influenced by this bone. `None` keeps every vertex.
    pub target_bone: Option<String>,
    /// A vertex is kept if the weight of the target bone is strictly greater than this.
    pub weight_threshold: Real,
    /// Behavior when `target_bone` is not part of the skeleton.
    pub unresolved_bone: UnresolvedBonePolicy,
    /// Recompute smooth normals and tangents from the filtered triangles.
    pub recalculate_normals: bool,
    /// Copy the source vertex colors instead of using opaque black.
    pub copy_vertex_colors: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        FilterOptions {
            target_bone: None,
            weight_threshold: 0.01,
            unresolved_bone: UnresolvedBonePolicy::DisableFiltering,
            recalculate_normals: false,
            copy_vertex_colors: false,
        }
    }
}

/// Errors raised while extracting a filtered mesh.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum ExtractError {
    /// The requested LOD does not exist.
    #[error("the skinned mesh has no LOD {0}")]
    InvalidLod(usize),
    /// The LOD has no skin weights.
    #[error("the skin weight buffer is empty")]
    EmptySkinWeights,
    /// The LOD has no vertices.
    #[error("the LOD has no vertices")]
    NoVertices,
    /// A render section reaches past the vertex or index buffer of the LOD.
    #[error("render section {0} is out of the LOD buffers")]
    InvalidRenderSection(usize),
    /// The filter bone is not part of the skeleton (with [`UnresolvedBonePolicy::Fail`]).
    #[error("bone `{0}` not found in the skeleton")]
    UnknownBone(String),
    /// No vertex is influenced enough by the filter bone.
    #[error("no vertex has a weight greater than {threshold} on bone `{bone}`")]
    NoVerticesPassedFilter {
        /// The filter bone.
        bone: String,
        /// The weight threshold.
        threshold: Real,
    },
    /// Some vertices passed the filter, but no triangle has all three of its vertices kept.
    #[error("{vertices} vertices passed the filter but no triangle survived")]
    NoTrianglesSurvived {
        /// The number of vertices that passed the filter.
        vertices: usize,
    },
}

/// The triangles of one render section, after filtering.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FilteredSection {
    /// The material slot of the source render section.
    pub material_index: u32,
    /// Triangles indexing into [`FilteredMesh::vertices`].
    pub indices: Vec<[u32; 3]>,
}

/// A compact copy of the part of a skinned mesh LOD that passed a bone filter.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FilteredMesh {
    /// Kept vertices, in the order of the source LOD.
    pub vertices: Vec<MeshVertex>,
    /// One entry per render section of the source LOD, possibly without triangles.
    pub sections: Vec<FilteredSection>,
    /// Maps each kept vertex to its index in the source LOD vertex buffer.
    pub provenance: ProvenanceMap<u32>,
}

impl FilteredMesh {
    /// The total number of triangles of all sections.
    pub fn num_triangles(&self) -> usize {
        self.sections.iter().map(|s| s.indices.len()).sum()
    }

    /// Recomputes smooth normals and tangents from the triangles of all sections.
    pub fn recalculate_normals_and_tangents(&mut self) {
        let triangles: Vec<[u32; 3]> = self
            .sections
            .iter()
            .flat_map(|s| s.indices.iter().copied())
            .collect();
        recompute_normals_and_tangents(&mut self.vertices, &triangles);
    }

    /// Builds an editable mesh with one section per filtered section.
    ///
    /// Each section only receives the vertices its own triangles reference, in increasing
    /// order of filtered index, and uses the material of its source render section. The
    /// returned provenance maps every vertex of the editable mesh to its index in the source
    /// LOD vertex buffer.
    pub fn to_procedural_mesh(&self) -> (ProceduralMesh, MeshProvenance<u32>) {
        let mut mesh = ProceduralMesh::new();
        let mut provenance = MeshProvenance::new();

        for section in &self.sections {
            let mut used: Vec<u32> = section.indices.iter().flatten().copied().collect();
            used.sort_unstable();
            used.dedup();

            let local_of: HashMap<u32, u32> = used
                .iter()
                .enumerate()
                .map(|(local, filtered)| (*filtered, local as u32))
                .collect();
            let vertices = used
                .iter()
                .map(|i| self.vertices[*i as usize])
                .collect();
            let indices = section
                .indices
                .iter()
                .map(|tri| tri.map(|i| local_of[&i]))
                .collect();

            let map = used.iter().map(|i| self.provenance.get(*i)).collect();
            provenance.push_section(ProvenanceMap::from_sources(map));
            let _ = mesh.push_section(
                MeshSection::new(vertices, indices),
                Some(MaterialId(section.material_index)),
            );
        }

        (mesh, provenance)
    }
}

/// Extracts the triangles of a skinned mesh LOD whose three vertices are influenced by the
/// filter bone with a weight greater than the threshold.
///
/// Vertices are visited render section by render section, following each section's vertex
/// range, and kept vertices are numbered in that order. Every render section yields a
/// [`FilteredSection`], even if none of its triangles survived, so that section ordinals stay
/// aligned with the source materials.
///
/// Succeeds only if at least one vertex and one triangle are kept.
pub fn extract_filtered_mesh(
    mesh: &SkinnedMesh,
    skeleton: &Skeleton,
    lod_index: usize,
    options: &FilterOptions,
) -> Result<FilteredMesh, ExtractError> {
    let Some(lod) = mesh.lod(lod_index) else {
        log::error!("Invalid LOD index {} for a mesh with {} LODs.", lod_index, mesh.lods.len());
        return Err(ExtractError::InvalidLod(lod_index));
    };

    if lod.vertices.is_empty() {
        log::error!("LOD {} has no vertices.", lod_index);
        return Err(ExtractError::NoVertices);
    }

    if lod.skin_weights.num_vertices() == 0 {
        log::error!("The skin weight buffer of LOD {} is empty.", lod_index);
        return Err(ExtractError::EmptySkinWeights);
    }

    if let Some(section) = lod.find_invalid_section() {
        log::error!("Render section {} of LOD {} is out of the LOD buffers.", section, lod_index);
        return Err(ExtractError::InvalidRenderSection(section));
    }

    let filter_bone = match &options.target_bone {
        None => None,
        Some(name) => match skeleton.find_bone(name) {
            Some(bone) => Some(bone as u32),
            None => match options.unresolved_bone {
                UnresolvedBonePolicy::Fail => return Err(ExtractError::UnknownBone(name.clone())),
                UnresolvedBonePolicy::DisableFiltering => {
                    log::warn!("Filter bone `{}` not found in the skeleton: keeping every vertex.", name);
                    None
                }
            },
        },
    };

    let mut result = FilteredMesh::default();
    let mut filtered_index: HashMap<u32, u32> = HashMap::new();

    for section in &lod.sections {
        for original in section.vertex_range().unwrap_or_default() {
            let Some(source) = lod.vertices.get(original as usize) else {
                break;
            };

            let passes = match filter_bone {
                None => true,
                Some(bone) => bone_weight(lod, section, original, bone)
                    .is_some_and(|w| w > options.weight_threshold),
            };

            if passes {
                let mut vertex = *source;
                if !options.copy_vertex_colors {
                    vertex.color = Color::BLACK;
                }

                let _ = filtered_index.insert(original, result.vertices.len() as u32);
                result.vertices.push(vertex);
                result.provenance.push(Some(original));
            }
        }
    }

    if result.vertices.is_empty() {
        return Err(ExtractError::NoVerticesPassedFilter {
            bone: options.target_bone.clone().unwrap_or_default(),
            threshold: options.weight_threshold,
        });
    }

    for section in &lod.sections {
        let mut filtered = FilteredSection {
            material_index: section.material_index,
            indices: Vec::new(),
        };

        let indices = section
            .index_range()
            .and_then(|range| lod.indices.get(range))
            .unwrap_or_default();

        for ids in indices.chunks_exact(3) {
            if let (Some(a), Some(b), Some(c)) = (
                filtered_index.get(&ids[0]),
                filtered_index.get(&ids[1]),
                filtered_index.get(&ids[2]),
            ) {
                filtered.indices.push([*a, *b, *c]);
            }
        }

        result.sections.push(filtered);
    }

    if result.num_triangles() == 0 {
        log::warn!(
            "{} vertices passed the filter but no triangle survived.",
            result.vertices.len()
        );
        return Err(ExtractError::NoTrianglesSurvived {
            vertices: result.vertices.len(),
        });
    }

    if options.recalculate_normals {
        result.recalculate_normals_and_tangents();
    }

    log::debug!(
        "Extracted {} vertices and {} triangles from LOD {}.",
        result.vertices.len(),
        result.num_triangles(),
        lod_index
    );

    Ok(result)
}

/// Per-vertex color override hiding the region of a LOD influenced by `bone`.
///
/// Vertices influenced by `bone` with a weight greater than `threshold` get a fully
/// transparent color. The others keep their source color if `keep_colors` is set, or opaque
/// white otherwise. Returns `None` if the LOD does not exist.
pub fn vertex_color_override(
    mesh: &SkinnedMesh,
    lod_index: usize,
    bone: u32,
    threshold: Real,
    keep_colors: bool,
) -> Option<Vec<Color>> {
    let lod = mesh.lod(lod_index)?;
    let mut colors: Vec<Color> = lod
        .vertices
        .iter()
        .map(|v| if keep_colors { v.color } else { Color::WHITE })
        .collect();

    for section in &lod.sections {
        for vertex in section.vertex_range().unwrap_or_default() {
            let hidden = bone_weight(lod, section, vertex, bone).is_some_and(|w| w > threshold);
            if let (true, Some(color)) = (hidden, colors.get_mut(vertex as usize)) {
                color.a = 0;
            }
        }
    }

    Some(colors)
}
