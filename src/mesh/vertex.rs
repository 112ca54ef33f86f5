use crate::math::{Point, Point2D, Real, Vector};

/// An 8-bit RGBA vertex color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Color = Color::new(0, 0, 0, 255);

    /// Builds a color from its four channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Interpolates each channel independently, rounding and clamping to `[0, 255]`.
    pub fn lerp(&self, other: &Color, alpha: Real) -> Color {
        let channel = |a: u8, b: u8| {
            let value = a as Real + (b as Real - a as Real) * alpha;
            value.round().clamp(0.0, 255.0) as u8
        };

        Color {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: channel(self.a, other.a),
        }
    }
}

/// The tangent frame of a vertex: the tangent direction plus the sign of the bitangent.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Tangent {
    /// The tangent direction (first axis of the tangent frame).
    pub x: Vector,
    /// If `true`, the bitangent is `tangent × normal` instead of `normal × tangent`.
    pub flip_y: bool,
}

impl Tangent {
    /// Builds a tangent from its direction and bitangent flip flag.
    #[inline]
    pub fn new(x: Vector, flip_y: bool) -> Self {
        Tangent { x, flip_y }
    }
}

impl Default for Tangent {
    fn default() -> Self {
        Tangent::new(Vector::x(), false)
    }
}

/// One vertex of an editable mesh section.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MeshVertex {
    /// Position, in the local space of the mesh.
    pub position: Point,
    /// Unit normal.
    pub normal: Vector,
    /// Tangent frame.
    pub tangent: Tangent,
    /// First texture coordinate channel.
    pub uv: Point2D,
    /// Vertex color.
    pub color: Color,
}

impl Default for MeshVertex {
    fn default() -> Self {
        MeshVertex {
            position: Point::origin(),
            normal: Vector::z(),
            tangent: Tangent::default(),
            uv: Point2D::origin(),
            color: Color::WHITE,
        }
    }
}

impl MeshVertex {
    /// Interpolates every attribute between `self` (at `alpha = 0`) and `other` (at `alpha = 1`).
    ///
    /// Normals and tangents are interpolated linearly and are not renormalized. The bitangent
    /// flip flag is taken from `self`. A non-finite `alpha` yields a copy of `other`.
    pub fn interpolate(&self, other: &MeshVertex, alpha: Real) -> MeshVertex {
        if !alpha.is_finite() {
            return *other;
        }

        MeshVertex {
            position: self.position.lerp(&other.position, alpha),
            normal: self.normal.lerp(&other.normal, alpha),
            tangent: Tangent::new(self.tangent.x.lerp(&other.tangent.x, alpha), self.tangent.flip_y),
            uv: self.uv.lerp(&other.uv, alpha),
            color: self.color.lerp(&other.color, alpha),
        }
    }
}
