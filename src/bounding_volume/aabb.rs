//! Axis Aligned Bounding Box.

use crate::math::{Point, Real, Vector};

/// An Axis-Aligned Bounding Box (AABB).
///
/// Every mesh section and every convex collision hull carries one, expressed in
/// the local space of the mesh that owns it. The plane slicer uses it to decide,
/// without looking at individual vertices, whether a whole section lies on one
/// side of the cutting plane.
///
/// An AABB built with [`Aabb::new_invalid`] has `mins > maxs`: it contains nothing
/// and becomes valid as soon as a point is added with [`Aabb::take_point`].
///
/// # Example
///
/// ```rust
/// use skinslice::bounding_volume::Aabb;
/// use skinslice::na::Point3;
///
/// let aabb = Aabb::from_points([
///     Point3::new(1.0, 2.0, 3.0),
///     Point3::new(-1.0, 4.0, 2.0),
///     Point3::new(0.0, 0.0, 5.0),
/// ]);
///
/// assert_eq!(aabb.mins, Point3::new(-1.0, 0.0, 2.0));
/// assert_eq!(aabb.maxs, Point3::new(1.0, 4.0, 5.0));
/// ```
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Copy, Clone)]
#[repr(C)]
pub struct Aabb {
    /// The point with minimum coordinates.
    pub mins: Point,
    /// The point with maximum coordinates.
    pub maxs: Point,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new_invalid()
    }
}

impl Aabb {
    /// Creates a new AABB from its two corners.
    #[inline]
    pub fn new(mins: Point, maxs: Point) -> Aabb {
        Aabb { mins, maxs }
    }

    /// Creates an invalid AABB with `mins` components set to `Real::MAX` and `maxs` components
    /// set to `-Real::MAX`.
    ///
    /// This is useful as an initial value when merging points into a bounding box.
    #[inline]
    pub fn new_invalid() -> Self {
        Self::new(
            Vector::repeat(Real::MAX).into(),
            Vector::repeat(-Real::MAX).into(),
        )
    }

    /// Creates a new AABB that tightly encloses a set of points.
    pub fn from_points<I>(pts: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let mut result = Self::new_invalid();
        for pt in pts {
            result.take_point(pt);
        }
        result
    }

    /// Does this AABB contain at least one point?
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.mins.x <= self.maxs.x && self.mins.y <= self.maxs.y && self.mins.z <= self.maxs.z
    }

    /// Returns the center point of this AABB.
    #[inline]
    pub fn center(&self) -> Point {
        na::center(&self.mins, &self.maxs)
    }

    /// Returns the half-extents of this AABB.
    #[inline]
    pub fn half_extents(&self) -> Vector {
        (self.maxs - self.mins) * 0.5
    }

    /// Returns the full extents of this AABB.
    #[inline]
    pub fn extents(&self) -> Vector {
        self.maxs - self.mins
    }

    /// Enlarges this AABB so it also contains the point `pt`.
    #[inline]
    pub fn take_point(&mut self, pt: Point) {
        self.mins = self.mins.coords.inf(&pt.coords).into();
        self.maxs = self.maxs.coords.sup(&pt.coords).into();
    }

    /// Returns the smallest AABB containing both `self` and `other`.
    #[inline]
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }

    /// Checks if this AABB contains a point expressed in the same space.
    #[inline]
    pub fn contains_local_point(&self, point: &Point) -> bool {
        (0..3).all(|i| point[i] >= self.mins[i] && point[i] <= self.maxs[i])
    }
}

#[cfg(test)]
mod test {
    use super::Aabb;
    use crate::math::{Point, Vector};

    #[test]
    fn invalid_aabb_becomes_valid_after_one_point() {
        let mut aabb = Aabb::new_invalid();
        assert!(!aabb.is_valid());
        aabb.take_point(Point::new(1.0, -2.0, 3.0));
        assert!(aabb.is_valid());
        assert_eq!(aabb.mins, aabb.maxs);
        assert_eq!(aabb.half_extents(), Vector::zeros());
    }

    #[test]
    fn merge_encloses_both() {
        let a = Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point::new(-1.0, 0.5, 0.5), Point::new(0.5, 2.0, 0.5));
        let m = a.merged(&b);
        assert_eq!(m.mins, Point::new(-1.0, 0.0, 0.0));
        assert_eq!(m.maxs, Point::new(1.0, 2.0, 1.0));
        assert!(m.contains_local_point(&Point::new(0.0, 1.5, 0.25)));
    }
}
