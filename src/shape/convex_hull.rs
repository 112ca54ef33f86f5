use crate::bounding_volume::Aabb;
use crate::math::Point;

/// A convex collision element, described by the point cloud it is the convex hull of.
///
/// This mirrors how physics engines store simple convex collision: the hull faces are not
/// stored, they are recovered from the points whenever needed (see
/// [`crate::transformation::convex_hull_planes`]).
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ConvexHull {
    points: Vec<Point>,
    aabb: Aabb,
}

impl ConvexHull {
    /// Wraps a point cloud into a convex collision element.
    pub fn new(points: Vec<Point>) -> Self {
        let aabb = Aabb::from_points(points.iter().copied());
        Self { points, aabb }
    }

    /// The points this hull is built from.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The local-space bounding box of the hull points.
    #[inline]
    pub fn local_aabb(&self) -> &Aabb {
        &self.aabb
    }
}

/// Whether a mesh takes part in collision queries, physics, or both.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum CollisionEnabled {
    /// No collision at all.
    NoCollision,
    /// Spatial queries only (raycasts, overlaps).
    #[default]
    QueryOnly,
    /// Physics simulation only.
    PhysicsOnly,
    /// Both queries and physics.
    QueryAndPhysics,
}

/// Collision configuration of a mesh, copied verbatim to the other half of a slice.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CollisionSettings {
    /// Name of the host's collision profile.
    pub profile_name: String,
    /// Which collision features are enabled.
    pub enabled: CollisionEnabled,
    /// Use the render triangles themselves as simple collision.
    pub use_complex_as_simple: bool,
}
