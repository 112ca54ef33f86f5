//! Skeletons and the bone-weighted meshes bound to them.

pub use self::skeleton::{Bone, Skeleton, SkeletonError};
pub use self::skinned_mesh::{
    BoneInfluence, RenderSection, SkinWeightBuffer, SkinnedMesh, SkinnedMeshLod,
    MAX_TOTAL_INFLUENCES,
};

mod skeleton;
mod skinned_mesh;
