use crate::{Aabb, Vec3};

/// A sphere enclosing an object, used for light power estimates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub const EMPTY: BoundingSphere = BoundingSphere {
        center: Vec3::ZERO,
        radius: -1.0,
    };

    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere circumscribing the box.
    pub fn from_aabb(aabb: &Aabb) -> Self {
        if aabb.is_empty() {
            return Self::EMPTY;
        }
        Self {
            center: aabb.centroid(),
            radius: 0.5 * aabb.size().length(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.radius < 0.0
    }

    pub fn contains(&self, p: Vec3) -> bool {
        (p - self.center).length_squared() <= self.radius * self.radius
    }
}
