//! Clipping of polygons by half-spaces.

pub use self::clip_halfspace_polygon::clip_halfspace_polygon;

mod clip_halfspace_polygon;
