//! Triangulation, polygon reconstruction and other mesh transformations.

pub use self::ear_clipping::triangulate_ear_clipping;
pub use self::hull_planes::{convex_hull_planes, hull_from_planes};
pub use self::polygon_builder::{polygons_from_edges, remove_flat_corners, EdgeLoops};
pub use self::tangents::recompute_normals_and_tangents;

mod ear_clipping;
mod hull_planes;
mod polygon_builder;
mod tangents;
