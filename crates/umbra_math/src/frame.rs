use crate::Vec3;

/// Orthonormal frame whose local z axis is a surface normal.
///
/// BSDFs work in this space: `cos(theta)` of a local direction is its `z`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadingFrame {
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl ShadingFrame {
    /// Build a frame around a unit normal.
    pub fn from_normal(normal: Vec3) -> Self {
        let w = normal.normalize();
        let (u, v) = w.any_orthonormal_pair();
        Self { u, v, w }
    }

    /// Build a frame around `normal`, aligning `u` with a tangent when possible.
    pub fn from_normal_tangent(normal: Vec3, tangent: Vec3) -> Self {
        let w = normal.normalize();
        let u = (tangent - w * w.dot(tangent)).normalize_or_zero();
        if u == Vec3::ZERO {
            return Self::from_normal(w);
        }
        Self { u, v: w.cross(u), w }
    }

    #[inline]
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.u), v.dot(self.v), v.dot(self.w))
    }

    #[inline]
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        self.u * v.x + self.v * v.y + self.w * v.z
    }
}
