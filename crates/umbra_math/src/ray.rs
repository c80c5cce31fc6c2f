use crate::{Interval, Mat4, Vec3};

/// A ray with a unit direction and a valid parametric range.
///
/// Only hits with `near_limit < t < far_limit` count. Composite objects
/// narrow `far_limit` as they find closer hits, and the CSG node moves
/// `near_limit` forward to step past surfaces it rejected.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundedRay {
    support: Vec3,
    direction: Vec3,
    range: Interval,
}

impl BoundedRay {
    /// Create an unbounded ray. `direction` is normalized.
    pub fn new(support: Vec3, direction: Vec3) -> Self {
        Self::with_limits(support, direction, 0.0, f32::INFINITY)
    }

    /// Create a ray valid on `(near, far)`.
    pub fn with_limits(support: Vec3, direction: Vec3, near: f32, far: f32) -> Self {
        Self {
            support,
            direction: direction.normalize(),
            range: Interval::new(near, far),
        }
    }

    /// Ray from `from` to `to`, stopping `tolerance` short of both ends.
    ///
    /// Used for shadow rays: the far limit is `(1 - tolerance) * distance`.
    pub fn between(from: Vec3, to: Vec3, tolerance: f32) -> Self {
        let delta = to - from;
        let distance = delta.length();
        Self::with_limits(from, delta, tolerance, (1.0 - tolerance) * distance)
    }

    #[inline]
    pub fn support(&self) -> Vec3 {
        self.support
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn near_limit(&self) -> f32 {
        self.range.min
    }

    #[inline]
    pub fn far_limit(&self) -> f32 {
        self.range.max
    }

    #[inline]
    pub fn range(&self) -> Interval {
        self.range
    }

    pub fn set_near_limit(&mut self, near: f32) {
        self.range.min = near;
    }

    pub fn set_far_limit(&mut self, far: f32) {
        self.range.max = far;
    }

    /// Point at parameter `t`.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.support + self.direction * t
    }

    /// True if `t` lies strictly inside the valid range.
    #[inline]
    pub fn in_range(&self, t: f32) -> bool {
        self.range.surrounds(t)
    }

    /// Same ray with a different valid range.
    pub fn bounded(&self, near: f32, far: f32) -> Self {
        Self {
            range: Interval::new(near, far),
            ..*self
        }
    }

    /// Transform into another frame.
    ///
    /// The direction is renormalized afterwards, so the returned scale `s`
    /// relates the parameters of the same point as `t_new = t_old * s`.
    /// The limits are scaled accordingly.
    pub fn transform(&self, matrix: &Mat4) -> (Self, f32) {
        let direction = matrix.transform_vector3(self.direction);
        let scale = direction.length();
        let ray = Self {
            support: matrix.transform_point3(self.support),
            direction: direction / scale,
            range: Interval::new(self.range.min * scale, self.range.max * scale),
        };
        (ray, scale)
    }

    /// Translate the support point, leaving parameters unchanged.
    pub fn translate(&self, offset: Vec3) -> Self {
        Self {
            support: self.support + offset,
            ..*self
        }
    }
}
