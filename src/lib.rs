/*!
skinslice
=========

**skinslice** converts a posed, bone-weighted skeletal mesh into an editable
sectioned mesh, cuts it with a plane, and re-skins the resulting fragments so
that they keep following the skeleton's animation.

The pipeline is made of five stages:

1. [`skinning::bone_weight`] / [`skinning::bone_weights`] read the bone
   influences of a single skinned vertex.
2. [`skinning::extract_filtered_mesh`] keeps the part of a skinned mesh that is
   influenced by a given bone, and records where each kept vertex came from.
3. [`query::split::slice_procedural_mesh`] cuts a [`mesh::ProceduralMesh`] (and
   its convex collision hulls) with a plane, caps the cut, and records the
   provenance of every vertex of both fragments.
4. [`skinning::remap_fragment_weights`] recovers the bone weights of every
   fragment vertex through the provenance chain.
5. [`skinning::FragmentSkinner`] recomputes the fragment vertex buffers from the
   current bone transforms, once per frame.

[`pipeline::SkeletalMeshCutter`] runs stages 2 to 5 from a single [`pipeline::CutRequest`].
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::type_complexity)]

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;
#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod mesh;
pub mod pipeline;
pub mod query;
pub mod shape;
pub mod skeleton;
pub mod skinning;
pub mod transformation;
pub mod utils;

/// Aliases for the mathematical types used throughout this crate.
pub mod math {
    pub use na::{Isometry3, Matrix4, Point2, Point3, UnitVector3, Vector3};

    /// The scalar type used throughout this crate.
    pub type Real = f32;

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The point type.
    pub type Point = Point3<Real>;

    /// The vector type.
    pub type Vector = Vector3<Real>;

    /// The unit vector type.
    pub type UnitVector = UnitVector3<Real>;

    /// The rigid transformation type (placement of a mesh in the world).
    pub type Isometry = Isometry3<Real>;

    /// The affine bone transformation type (component space).
    pub type Transform = Matrix4<Real>;

    /// The 2D point type, used for texture coordinates and projected cap polygons.
    pub type Point2D = Point2<Real>;
}
