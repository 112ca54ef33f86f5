//! Reading the bone influences of a skinned vertex as skeleton bones and normalized weights.

use crate::math::Real;
use crate::skeleton::{RenderSection, SkinnedMeshLod};
use smallvec::SmallVec;

/// Fixed-point scale of the raw 16-bit influence weights.
const WEIGHT_SCALE: Real = 65535.0;

/// Sums farther than this from one are rescaled by [`BoneWeightsInfo::normalize`].
pub const WEIGHT_SUM_EPSILON: Real = 1.0e-4;

/// The bone influences of a single vertex, as parallel arrays of skeleton bone indices and
/// weights in `[0, 1]`.
///
/// An empty set means the vertex is not driven by bone weights (for example a cap or seam
/// vertex created by a cut).
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BoneWeightsInfo {
    /// Skeleton bone indices.
    pub bones: SmallVec<[u32; 8]>,
    /// Weight of each bone of `self.bones`.
    pub weights: SmallVec<[Real; 8]>,
}

impl BoneWeightsInfo {
    /// An empty influence set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an influence.
    pub fn push(&mut self, bone: u32, weight: Real) {
        self.bones.push(bone);
        self.weights.push(weight);
    }

    /// The number of influences.
    #[inline]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Is this vertex free of any bone influence?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Iterates through `(bone, weight)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Real)> + '_ {
        self.bones.iter().copied().zip(self.weights.iter().copied())
    }

    /// The sum of all weights.
    pub fn total_weight(&self) -> Real {
        self.weights.iter().sum()
    }

    /// The weight of `bone`, if it influences this vertex.
    pub fn weight_of(&self, bone: u32) -> Option<Real> {
        self.iter().find(|(b, _)| *b == bone).map(|(_, w)| w)
    }

    /// Rescales the weights so they sum to one, unless they already do (within
    /// [`WEIGHT_SUM_EPSILON`]) or sum to zero.
    pub fn normalize(&mut self) {
        let total = self.total_weight();
        if total > Real::EPSILON && !relative_eq!(total, 1.0, epsilon = WEIGHT_SUM_EPSILON) {
            self.weights.iter_mut().for_each(|w| *w /= total);
        }
    }
}

/// The normalized weight of `target_bone` on a LOD vertex.
///
/// `section` must be the render section owning `vertex`: its bone map translates the
/// section-local influence indices to skeleton bones. Influence slots referencing a local
/// bone outside of the bone map are skipped.
///
/// Returns `None` ("not influenced") if the bone has no positive weight on this vertex, if the
/// vertex has no skin weights, or if the LOD skin weight buffer is empty.
pub fn bone_weight(
    lod: &SkinnedMeshLod,
    section: &RenderSection,
    vertex: u32,
    target_bone: u32,
) -> Option<Real> {
    let influences = lod.skin_weights.vertex_influences(vertex)?;

    for influence in influences {
        let Some(bone) = section.skeleton_bone(influence.bone) else {
            continue;
        };

        if bone == target_bone && influence.weight > 0 {
            return Some(influence.weight as Real / WEIGHT_SCALE);
        }
    }

    None
}

/// Every positive influence of a LOD vertex, with weights normalized to sum to one.
///
/// See [`bone_weight`] for the role of `section`. The result is empty if the vertex has no skin
/// weights. Several slots referencing the same bone yield several entries.
pub fn bone_weights(lod: &SkinnedMeshLod, section: &RenderSection, vertex: u32) -> BoneWeightsInfo {
    let mut result = BoneWeightsInfo::new();
    let Some(influences) = lod.skin_weights.vertex_influences(vertex) else {
        return result;
    };

    for influence in influences.iter().filter(|inf| inf.weight > 0) {
        if let Some(bone) = section.skeleton_bone(influence.bone) {
            result.push(bone, influence.weight as Real / WEIGHT_SCALE);
        }
    }

    result.normalize();
    result
}

#[cfg(test)]
mod test {
    use super::{bone_weight, bone_weights, BoneWeightsInfo};
    use crate::skeleton::{BoneInfluence, RenderSection, SkinWeightBuffer, SkinnedMeshLod};

    fn lod() -> (SkinnedMeshLod, RenderSection) {
        let section = RenderSection {
            base_vertex_index: 0,
            num_vertices: 3,
            bone_map: vec![5, 9],
            ..RenderSection::default()
        };
        let skin_weights = SkinWeightBuffer::from_vertices(
            4,
            vec![
                vec![BoneInfluence::new(0, 65535)],
                vec![BoneInfluence::new(1, 19661), BoneInfluence::new(0, 45874)],
                // Local bone 3 is outside of the bone map.
                vec![BoneInfluence::new(3, 30000), BoneInfluence::new(1, 10000)],
            ],
        );
        let lod = SkinnedMeshLod {
            sections: vec![section.clone()],
            skin_weights,
            ..SkinnedMeshLod::default()
        };
        (lod, section)
    }

    #[test]
    fn single_bone_weight() {
        let (lod, section) = lod();
        assert_eq!(bone_weight(&lod, &section, 0, 5), Some(1.0));
        assert_eq!(bone_weight(&lod, &section, 0, 9), None);
        assert_relative_eq!(bone_weight(&lod, &section, 1, 9).unwrap(), 0.3, epsilon = 1.0e-4);
        assert_eq!(bone_weight(&lod, &section, 2, 5), None);
        assert_eq!(bone_weight(&lod, &section, 17, 5), None);

        let empty = SkinnedMeshLod::default();
        assert_eq!(bone_weight(&empty, &section, 0, 5), None);
    }

    #[test]
    fn all_weights_are_normalized() {
        let (lod, section) = lod();

        let w1 = bone_weights(&lod, &section, 1);
        assert_eq!(&w1.bones[..], &[9, 5]);
        assert_relative_eq!(w1.total_weight(), 1.0, epsilon = 1.0e-4);

        // Only 10000/65535 survives the bone map, and gets rescaled to 1.
        let w2 = bone_weights(&lod, &section, 2);
        assert_eq!(&w2.bones[..], &[9]);
        assert_relative_eq!(w2.weights[0], 1.0);

        assert!(bone_weights(&lod, &section, 40).is_empty());
    }

    #[test]
    fn normalize_leaves_unit_sums_alone() {
        let mut info = BoneWeightsInfo::new();
        info.push(0, 0.25);
        info.push(1, 0.75);
        info.normalize();
        assert_eq!(info.weight_of(1), Some(0.75));

        let mut zero = BoneWeightsInfo::new();
        zero.push(0, 0.0);
        zero.normalize();
        assert_eq!(zero.weights[0], 0.0);
    }
}
