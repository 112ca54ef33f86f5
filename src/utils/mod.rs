//! Various unsorted geometrical operators.

pub use self::ccw_face_normal::ccw_face_normal;
pub use self::point_in_triangle::{
    corner_direction, is_point_in_triangle, polygon_signed_area2, Orientation,
};

mod ccw_face_normal;
mod point_in_triangle;
