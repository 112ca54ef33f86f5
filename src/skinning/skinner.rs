//! Per-frame skinning of the fragments of a cut.

use super::{BoneWeightsInfo, FragmentWeights};
use crate::math::{Point, Real, Transform, Vector, DEFAULT_EPSILON};
use crate::mesh::{ProceduralMesh, VertexId};
use crate::skeleton::Skeleton;

/// How fragment vertices follow the skeleton.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum SkinningMode {
    /// Every vertex follows the anchor bone of its fragment.
    Rigid,
    /// Vertices blend the bones of their own side of the cut, by weight.
    #[default]
    Blended,
}

/// How bones are assigned to a side of the cut.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum BoneSideTest {
    /// A bone is distal if the cut bone is one of its ancestors (or itself).
    #[default]
    Hierarchy,
    /// A bone is distal if its index is at least the cut bone index, and proximal if it is at
    /// most the parent bone index. Only valid for skeletons whose bones are ordered
    /// depth-first, each subtree being contiguous.
    IndexOrder,
}

/// Which fragment of a cut is skinned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum FragmentSide {
    /// The kept fragment, attached to the cut bone and its descendants.
    Distal,
    /// The other half, attached to the parent of the cut bone and the rest of the skeleton.
    Proximal,
}

/// Configuration of a [`FragmentSkinner`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SkinningOptions {
    /// Rigid or blended skinning.
    pub mode: SkinningMode,
    /// The side-of-cut test used in blended mode.
    pub side_test: BoneSideTest,
}

/// Errors raised while building a [`FragmentSkinner`].
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkinningError {
    /// The cut bone is not part of the skeleton.
    #[error("bone {0} is not part of the skeleton")]
    UnknownBone(usize),
    /// The proximal fragment of a cut at a root bone has no anchor bone.
    #[error("bone {0} is a root and has no parent to anchor the other half")]
    RootBone(usize),
}

/// Decides on which side of a cut each bone lies.
#[derive(Copy, Clone, Debug)]
pub struct SideFilter<'a> {
    skeleton: &'a Skeleton,
    side: FragmentSide,
    cut_bone: usize,
    parent_bone: Option<usize>,
    test: BoneSideTest,
}

impl<'a> SideFilter<'a> {
    /// A filter retaining the bones of `side` for a cut at `cut_bone`.
    pub fn new(skeleton: &'a Skeleton, side: FragmentSide, cut_bone: usize, test: BoneSideTest) -> Self {
        SideFilter {
            skeleton,
            side,
            cut_bone,
            parent_bone: skeleton.parent(cut_bone),
            test,
        }
    }

    /// Does `bone` drive vertices of this side of the cut?
    pub fn retains(&self, bone: u32) -> bool {
        let bone = bone as usize;
        match (self.test, self.side) {
            (BoneSideTest::Hierarchy, FragmentSide::Distal) => {
                self.skeleton.is_self_or_descendant(bone, self.cut_bone)
            }
            (BoneSideTest::Hierarchy, FragmentSide::Proximal) => {
                bone < self.skeleton.num_bones()
                    && !self.skeleton.is_self_or_descendant(bone, self.cut_bone)
            }
            (BoneSideTest::IndexOrder, FragmentSide::Distal) => bone >= self.cut_bone,
            (BoneSideTest::IndexOrder, FragmentSide::Proximal) => {
                self.parent_bone.is_some_and(|parent| bone <= parent)
            }
        }
    }
}

/// The weights of a vertex restricted to one side of a cut.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RetainedWeights {
    /// The retained influences, rescaled to sum to one. Empty if nothing is retained.
    pub weights: BoneWeightsInfo,
    /// The total weight of the excluded influences.
    pub correction: Real,
}

/// Restricts the influences of a vertex to the bones retained by `filter`, rescaling the
/// retained weights by `1 / (1 - correction)` where `correction` is the excluded weight.
///
/// If (almost) no weight is retained, the result has no influence at all.
pub fn retained_weights(info: &BoneWeightsInfo, filter: &SideFilter) -> RetainedWeights {
    let mut result = RetainedWeights::default();

    for (bone, weight) in info.iter() {
        if filter.retains(bone) {
            result.weights.push(bone, weight);
        } else {
            result.correction += weight;
        }
    }

    let remaining = 1.0 - result.correction;
    if remaining <= DEFAULT_EPSILON.sqrt() {
        result.weights = BoneWeightsInfo::new();
    } else {
        result.weights.weights.iter_mut().for_each(|w| *w /= remaining);
    }

    result
}

/// Statistics of one [`FragmentSkinner::skin`] pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct SkinningReport {
    /// Vertices updated.
    pub vertices: usize,
    /// Vertices blended from several bones.
    pub blended: usize,
    /// Vertices moved rigidly with the anchor bone, including degenerate ones.
    pub rigid: usize,
    /// Weighted vertices without any usable influence on their side of the cut.
    pub degenerate: usize,
    /// Vertices left untouched because the anchor bone has no transform.
    pub skipped: usize,
}

/// A vertex attribute set captured when the skinner is built.
#[derive(Copy, Clone, Debug, PartialEq)]
struct RestVertex {
    position: Point,
    normal: Vector,
    tangent: Vector,
}

/// Recomputes the vertices of a fragment from the current pose of the skeleton.
///
/// The vertices of the fragment are captured at construction time and must then be expressed
/// in the bind pose of the skeleton, which is the case right after a cut. Every
/// [`FragmentSkinner::skin`] call recomputes positions, normals and tangents from that
/// capture, so frames may be skipped or repeated freely.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentSkinner {
    side: FragmentSide,
    anchor_bone: usize,
    mode: SkinningMode,
    rest: Vec<Vec<RestVertex>>,
    weights: Vec<Vec<RetainedWeights>>,
}

impl FragmentSkinner {
    /// Prepares the skinning of `fragment` cut at `cut_bone`.
    ///
    /// The anchor bone, driving rigid, cap and seam vertices, is the cut bone for the distal
    /// fragment and its parent for the proximal one. `weights` gives the influences of every
    /// fragment vertex (see [`super::remap_fragment_weights`]); missing entries are treated
    /// as cap vertices.
    pub fn new(
        fragment: &ProceduralMesh,
        weights: &FragmentWeights,
        skeleton: &Skeleton,
        side: FragmentSide,
        cut_bone: usize,
        options: SkinningOptions,
    ) -> Result<Self, SkinningError> {
        if cut_bone >= skeleton.num_bones() {
            return Err(SkinningError::UnknownBone(cut_bone));
        }

        let anchor_bone = match side {
            FragmentSide::Distal => cut_bone,
            FragmentSide::Proximal => skeleton.parent(cut_bone).ok_or(SkinningError::RootBone(cut_bone))?,
        };

        let filter = SideFilter::new(skeleton, side, cut_bone, options.side_test);
        let mut rest = Vec::with_capacity(fragment.num_sections());
        let mut retained = Vec::with_capacity(fragment.num_sections());

        for (section_id, section) in fragment.sections().iter().enumerate() {
            rest.push(
                section
                    .vertices()
                    .iter()
                    .map(|v| RestVertex {
                        position: v.position,
                        normal: v.normal,
                        tangent: v.tangent.x,
                    })
                    .collect(),
            );

            let section_weights = (0..section.vertices().len() as u32)
                .map(|v| match (options.mode, weights.get(VertexId::new(section_id as u32, v))) {
                    (SkinningMode::Blended, Some(info)) => retained_weights(info, &filter),
                    _ => RetainedWeights::default(),
                })
                .collect();
            retained.push(section_weights);
        }

        Ok(FragmentSkinner {
            side,
            anchor_bone,
            mode: options.mode,
            rest,
            weights: retained,
        })
    }

    /// The side of the cut this skinner drives.
    #[inline]
    pub fn side(&self) -> FragmentSide {
        self.side
    }

    /// The bone driving rigid, cap and seam vertices.
    #[inline]
    pub fn anchor_bone(&self) -> usize {
        self.anchor_bone
    }

    /// The skinning mode.
    #[inline]
    pub fn mode(&self) -> SkinningMode {
        self.mode
    }

    /// The side-filtered weights of a vertex; empty for rigidly skinned vertices.
    pub fn vertex_weights(&self, vertex: VertexId) -> Option<&RetainedWeights> {
        self.weights
            .get(vertex.section as usize)?
            .get(vertex.vertex as usize)
    }

    /// Overwrites the positions, normals and tangents of `fragment` for the given pose.
    ///
    /// `pose` holds the current component-space transform of every bone. Influences whose
    /// bone has no transform are ignored and the others renormalized. Section bounding boxes
    /// are refreshed. Texture coordinates and colors are left untouched.
    pub fn skin(&self, skeleton: &Skeleton, pose: &[Transform], fragment: &mut ProceduralMesh) -> SkinningReport {
        let anchor = skeleton.skinning_matrix(pose, self.anchor_bone);
        let mut report = SkinningReport::default();

        for (section_id, section) in fragment.sections_mut().iter_mut().enumerate() {
            let (Some(rest), Some(weights)) = (self.rest.get(section_id), self.weights.get(section_id)) else {
                continue;
            };

            for ((vertex, rest), retained) in section.vertices_mut().iter_mut().zip(rest).zip(weights) {
                let mut blended_matrix = None;

                if !retained.weights.is_empty() {
                    let mut blended = Transform::zeros();
                    let mut used_weight = 0.0;
                    for (bone, weight) in retained.weights.iter() {
                        if let Some(m) = skeleton.skinning_matrix(pose, bone as usize) {
                            blended += m * weight;
                            used_weight += weight;
                        }
                    }

                    if used_weight > DEFAULT_EPSILON.sqrt() {
                        blended_matrix = Some(blended / used_weight);
                    } else {
                        report.degenerate += 1;
                    }
                } else if self.mode == SkinningMode::Blended && retained.correction > 0.0 {
                    report.degenerate += 1;
                }

                let m = match (blended_matrix, anchor) {
                    (Some(m), _) => {
                        report.blended += 1;
                        m
                    }
                    (None, Some(anchor)) => {
                        report.rigid += 1;
                        anchor
                    }
                    (None, None) => {
                        report.skipped += 1;
                        continue;
                    }
                };

                vertex.position = m.transform_point(&rest.position);
                vertex.normal = m
                    .transform_vector(&rest.normal)
                    .try_normalize(DEFAULT_EPSILON)
                    .unwrap_or(rest.normal);
                vertex.tangent.x = m
                    .transform_vector(&rest.tangent)
                    .try_normalize(DEFAULT_EPSILON)
                    .unwrap_or(rest.tangent);
                report.vertices += 1;
            }

            section.recompute_aabb();
        }

        log::trace!(
            "Skinned {} vertices: {} blended, {} rigid, {} degenerate, {} skipped.",
            report.vertices,
            report.blended,
            report.rigid,
            report.degenerate,
            report.skipped
        );

        report
    }
}
