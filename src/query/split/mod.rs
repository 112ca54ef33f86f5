//! Cutting meshes and convex hulls with a plane.

pub use self::split::SplitResult;
pub use self::split_convex_hull::split_convex_hull;
pub use self::split_procedural_mesh::{
    slice_procedural_mesh, slice_procedural_mesh_local, CapOption, OtherHalf, SliceError,
    SliceOptions, SliceOutcome,
};

mod cap;
mod split;
mod split_convex_hull;
mod split_procedural_mesh;
