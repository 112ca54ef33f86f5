//! Cutting a skinned mesh in a single call.
//!
//! [`SkeletalMeshCutter::cut`] chains the stages of the crate: the part of the skinned mesh
//! influenced by a bone is extracted into a [`ProceduralMesh`], that mesh is sliced by a
//! plane, the bone weights of both fragments are recovered through their provenance, and a
//! [`FragmentSkinner`] is prepared for each fragment.

use crate::math::{Isometry, Point, Transform, Vector};
use crate::mesh::{MeshProvenance, ProceduralMesh, VertexId};
use crate::query::split::{slice_procedural_mesh, SliceError, SliceOptions};
use crate::shape::{CollisionSettings, ConvexHull};
use crate::skeleton::{Skeleton, SkinnedMesh, SkinnedMeshLod};
use crate::skinning::{
    extract_filtered_mesh, remap_fragment_weights, resolve_original_vertices, ExtractError,
    FilterOptions, FragmentSide, FragmentSkinner, FragmentWeights, SkinningError,
    SkinningOptions, SkinningReport,
};

/// Errors raised by [`SkeletalMeshCutter::cut`].
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum CutError {
    /// The cut bone is not part of the skeleton.
    #[error("cut bone `{0}` not found in the skeleton")]
    UnknownBone(String),
    /// The other half was requested but the cut bone has no parent to follow.
    #[error("cut bone `{0}` is a root bone")]
    RootBone(String),
    /// The filtered mesh could not be extracted.
    #[error(transparent)]
    Extract(#[from] ExtractError),
    /// The filtered mesh could not be sliced.
    #[error(transparent)]
    Slice(#[from] SliceError),
    /// A fragment skinner could not be built.
    #[error(transparent)]
    Skinning(#[from] SkinningError),
}

/// A request to cut a skinned mesh.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CutRequest {
    /// A point of the cutting plane, in world-space.
    pub plane_position: Point,
    /// The normal of the cutting plane, in world-space. Geometry on its side is kept.
    pub plane_normal: Vector,
    /// The bone the kept fragment is attached to.
    pub target_bone: String,
    /// The LOD of the skinned mesh to cut.
    pub lod_index: usize,
    /// Extraction of the region to cut.
    pub filter: FilterOptions,
    /// Slicing and capping.
    pub slice: SliceOptions,
    /// Skinning of both fragments.
    pub skinning: SkinningOptions,
}

impl CutRequest {
    /// A request cutting LOD 0 at `target_bone`, filtering vertices with the same bone and
    /// default options otherwise.
    pub fn new(plane_position: Point, plane_normal: Vector, target_bone: impl Into<String>) -> Self {
        let target_bone = target_bone.into();
        CutRequest {
            plane_position,
            plane_normal,
            filter: FilterOptions {
                target_bone: Some(target_bone.clone()),
                ..FilterOptions::default()
            },
            target_bone,
            lod_index: 0,
            slice: SliceOptions::default(),
            skinning: SkinningOptions::default(),
        }
    }
}

/// One fragment of a cut, ready to follow the skeleton.
#[derive(Clone, Debug, PartialEq)]
pub struct SkinnedFragment {
    /// The fragment geometry, in the bind pose right after the cut.
    pub mesh: ProceduralMesh,
    /// Maps every fragment vertex to the vertex of the filtered mesh it was copied from.
    pub provenance: MeshProvenance<VertexId>,
    /// Maps every fragment vertex to the vertex of the skinned mesh LOD it derives from.
    pub original_vertices: MeshProvenance<u32>,
    /// The bone weights of every fragment vertex.
    pub weights: FragmentWeights,
    /// Drives the fragment vertices from the skeleton pose.
    pub skinner: FragmentSkinner,
}

impl SkinnedFragment {
    /// Poses the fragment. See [`FragmentSkinner::skin`].
    pub fn update(&mut self, skeleton: &Skeleton, pose: &[Transform]) -> SkinningReport {
        self.skinner.skin(skeleton, pose, &mut self.mesh)
    }
}

/// The two fragments of a successful cut.
#[derive(Clone, Debug, PartialEq)]
pub struct CutResult {
    /// The fragment on the side of the plane normal, following the cut bone.
    pub kept: SkinnedFragment,
    /// The fragment on the other side, following the parent of the cut bone.
    pub other_half: Option<SkinnedFragment>,
    /// The cut bone.
    pub cut_bone: usize,
    /// The parent of the cut bone.
    pub parent_bone: Option<usize>,
    /// Number of clip edges produced by the plane.
    pub num_clip_edges: usize,
    /// Number of cap polygons left open because they could not be triangulated.
    pub dropped_cap_polygons: usize,
}

/// A skinned mesh with its skeleton and placement, ready to be cut.
#[derive(Clone, Debug, PartialEq)]
pub struct SkeletalMeshCutter {
    mesh: SkinnedMesh,
    skeleton: Skeleton,
    /// The world-space placement of the mesh.
    pub transform: Isometry,
    /// Convex collision hulls, in the local space of the mesh.
    pub collision: Vec<ConvexHull>,
    /// Collision settings given to both fragments.
    pub collision_settings: CollisionSettings,
}

impl SkeletalMeshCutter {
    /// A cutter placed at the origin, without collision hulls.
    pub fn new(mesh: SkinnedMesh, skeleton: Skeleton) -> Self {
        SkeletalMeshCutter {
            mesh,
            skeleton,
            transform: Isometry::identity(),
            collision: Vec::new(),
            collision_settings: CollisionSettings::default(),
        }
    }

    /// The skinned mesh being cut.
    #[inline]
    pub fn mesh(&self) -> &SkinnedMesh {
        &self.mesh
    }

    /// The skeleton driving the mesh.
    #[inline]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Cuts the mesh.
    ///
    /// The skinned mesh itself is never modified: both fragments are new meshes built from the
    /// region selected by `request.filter`, expressed in the bind pose. The kept fragment
    /// follows the cut bone and its descendants, the other half follows the rest of the
    /// skeleton.
    pub fn cut(&self, request: &CutRequest) -> Result<CutResult, CutError> {
        let cut_bone = self
            .skeleton
            .find_bone(&request.target_bone)
            .ok_or_else(|| CutError::UnknownBone(request.target_bone.clone()))?;
        let parent_bone = self.skeleton.parent(cut_bone);

        if request.slice.create_other_half && parent_bone.is_none() {
            return Err(CutError::RootBone(request.target_bone.clone()));
        }

        let filtered =
            extract_filtered_mesh(&self.mesh, &self.skeleton, request.lod_index, &request.filter)?;
        let lod = self
            .mesh
            .lod(request.lod_index)
            .ok_or(ExtractError::InvalidLod(request.lod_index))?;

        let (mut mesh, pre_slice) = filtered.to_procedural_mesh();
        mesh.transform = self.transform;
        mesh.set_collision(self.collision.clone());
        mesh.collision_settings = self.collision_settings.clone();

        let outcome = slice_procedural_mesh(
            &mut mesh,
            &request.plane_position,
            &request.plane_normal,
            &request.slice,
        )?;

        let kept = self.fragment(
            lod,
            mesh,
            outcome.kept_provenance,
            &pre_slice,
            FragmentSide::Distal,
            cut_bone,
            request.skinning,
        )?;

        let other_half = match outcome.other_half {
            Some(half) => Some(self.fragment(
                lod,
                half.mesh,
                half.provenance,
                &pre_slice,
                FragmentSide::Proximal,
                cut_bone,
                request.skinning,
            )?),
            None => None,
        };

        log::debug!(
            "Cut `{}`: kept {} vertices / {} triangles, other half {} vertices / {} triangles.",
            request.target_bone,
            kept.mesh.num_vertices(),
            kept.mesh.num_triangles(),
            other_half.as_ref().map_or(0, |f| f.mesh.num_vertices()),
            other_half.as_ref().map_or(0, |f| f.mesh.num_triangles()),
        );

        Ok(CutResult {
            kept,
            other_half,
            cut_bone,
            parent_bone,
            num_clip_edges: outcome.clip_edges.len(),
            dropped_cap_polygons: outcome.dropped_cap_polygons,
        })
    }

    fn fragment(
        &self,
        lod: &SkinnedMeshLod,
        mesh: ProceduralMesh,
        provenance: MeshProvenance<VertexId>,
        pre_slice: &MeshProvenance<u32>,
        side: FragmentSide,
        cut_bone: usize,
        options: SkinningOptions,
    ) -> Result<SkinnedFragment, CutError> {
        let original_vertices = resolve_original_vertices(&provenance, pre_slice);
        let weights = remap_fragment_weights(lod, &original_vertices);
        let skinner = FragmentSkinner::new(&mesh, &weights, &self.skeleton, side, cut_bone, options)?;

        Ok(SkinnedFragment {
            mesh,
            provenance,
            original_vertices,
            weights,
            skinner,
        })
    }
}
