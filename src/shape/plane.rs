//! Oriented cutting plane.

use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Point, Point2D, Real, UnitVector, Vector, DEFAULT_EPSILON};
use na::Unit;

/// Where a bounding volume lies relative to a [`Plane`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum PlaneSide {
    /// Entirely inside the positive half-space (the kept side of a cut).
    Positive,
    /// Entirely inside the negative half-space (the other-half side of a cut).
    Negative,
    /// Crossed by the plane.
    Straddling,
}

/// An infinite oriented plane `{ x | normal · x = bias }`.
///
/// The positive half-space is the set of points with a positive
/// [`Plane::signed_distance`]. When slicing, geometry on the positive side is kept.
#[derive(PartialEq, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Plane {
    /// The plane's unit normal, pointing toward the positive half-space.
    pub normal: UnitVector,
    /// The signed distance from the origin to the plane, along `normal`.
    pub bias: Real,
}

impl Plane {
    /// Builds a new plane from its unit normal and bias.
    #[inline]
    pub fn new(normal: UnitVector, bias: Real) -> Plane {
        Plane { normal, bias }
    }

    /// Builds the plane passing through `point` with the given (not necessarily normalized) normal.
    ///
    /// Returns `None` if `normal` is zero or too small to be normalized.
    pub fn from_point_normal(point: &Point, normal: &Vector) -> Option<Plane> {
        let normal = Unit::try_new(*normal, DEFAULT_EPSILON)?;
        Some(Plane {
            normal,
            bias: normal.dot(&point.coords),
        })
    }

    /// The signed distance between `pt` and this plane, positive on the kept side.
    #[inline]
    pub fn signed_distance(&self, pt: &Point) -> Real {
        self.normal.dot(&pt.coords) - self.bias
    }

    /// The same plane with its normal (and thus its positive half-space) reversed.
    #[inline]
    pub fn flipped(&self) -> Plane {
        Plane {
            normal: -self.normal,
            bias: -self.bias,
        }
    }

    /// The point of this plane closest to the origin.
    #[inline]
    pub fn origin(&self) -> Point {
        Point::from(self.normal.into_inner() * self.bias)
    }

    /// Expresses a plane given in world-space into the local space of an object placed at `pos`.
    pub fn inverse_transform_by(&self, pos: &Isometry) -> Plane {
        let normal = pos.inverse_transform_unit_vector(&self.normal);
        let origin = pos.inverse_transform_point(&self.origin());
        Plane {
            normal,
            bias: normal.dot(&origin.coords),
        }
    }

    /// Classifies an AABB with respect to this plane.
    ///
    /// The box is projected onto the plane normal: if its center is farther from the plane than
    /// the box's push-out extent along the normal, the whole box lies on one side.
    pub fn aabb_side(&self, aabb: &Aabb) -> PlaneSide {
        let center_dist = self.signed_distance(&aabb.center());
        let push_out = aabb.half_extents().dot(&self.normal.abs());

        if center_dist > push_out {
            PlaneSide::Positive
        } else if center_dist < -push_out {
            PlaneSide::Negative
        } else {
            PlaneSide::Straddling
        }
    }

    /// An orthonormal basis `(u, v)` of the plane's direction such that `u × v = normal`.
    pub fn basis(&self) -> (Vector, Vector) {
        let n = self.normal.into_inner();
        let least_aligned = n.iamin();
        let u = n.cross(&Vector::ith(least_aligned, 1.0)).normalize();
        let v = n.cross(&u);
        (u, v)
    }

    /// Projects a point onto the plane's 2D parameterization given by [`Plane::basis`].
    #[inline]
    pub fn project_to_2d(&self, pt: &Point, basis: &(Vector, Vector)) -> Point2D {
        let rel = pt - self.origin();
        Point2D::new(rel.dot(&basis.0), rel.dot(&basis.1))
    }

    /// Lifts a point of the plane's 2D parameterization back to 3D.
    #[inline]
    pub fn lift_from_2d(&self, pt: &Point2D, basis: &(Vector, Vector)) -> Point {
        self.origin() + basis.0 * pt.x + basis.1 * pt.y
    }
}
