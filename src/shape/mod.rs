//! Shapes involved in a cut: the cutting plane and convex collision hulls.

pub use self::convex_hull::{CollisionEnabled, CollisionSettings, ConvexHull};
pub use self::plane::{Plane, PlaneSide};

mod convex_hull;
mod plane;
