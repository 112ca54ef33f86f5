//! Bone weights, weight filtering and fragment re-skinning.

pub use self::bone_weights::{bone_weight, bone_weights, BoneWeightsInfo, WEIGHT_SUM_EPSILON};
pub use self::filter::{
    extract_filtered_mesh, vertex_color_override, ExtractError, FilterOptions, FilteredMesh,
    FilteredSection, UnresolvedBonePolicy,
};
pub use self::remap::{
    remap_fragment_weights, remap_single_bone_weights, resolve_original_vertices,
    FragmentWeights,
};
pub use self::skinner::{
    retained_weights, BoneSideTest, FragmentSide, FragmentSkinner, RetainedWeights, SideFilter,
    SkinningError, SkinningMode, SkinningOptions, SkinningReport,
};

mod bone_weights;
mod filter;
mod remap;
mod skinner;
