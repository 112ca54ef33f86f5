use crate::math::{Point, UnitVector, DEFAULT_EPSILON};

/// The unit normal of the counter-clockwise triangle `a b c`.
///
/// Returns `None` if the triangle is degenerate.
#[inline]
pub fn ccw_face_normal(a: &Point, b: &Point, c: &Point) -> Option<UnitVector> {
    let ab = b - a;
    let ac = c - a;
    UnitVector::try_new(ab.cross(&ac), DEFAULT_EPSILON)
}

#[cfg(test)]
mod test {
    use super::ccw_face_normal;
    use crate::math::{Point, Vector};

    #[test]
    fn face_normal() {
        let n = ccw_face_normal(
            &Point::origin(),
            &Point::new(1.0, 0.0, 0.0),
            &Point::new(0.0, 1.0, 0.0),
        );
        assert_eq!(n.map(|n| n.into_inner()), Some(Vector::z()));
        assert!(ccw_face_normal(&Point::origin(), &Point::origin(), &Point::origin()).is_none());
    }
}
