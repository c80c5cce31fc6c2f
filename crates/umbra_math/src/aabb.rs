use crate::{BoundedRay, Interval, Vec3};

/// Axis-aligned bounding box stored as two corners.
///
/// An empty box has `min > max` on every axis so that joining it with any
/// other box yields the other box unchanged. Flat boxes (zero extent on an
/// axis) are valid and are hit by rays crossing their plane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// Box containing nothing.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Box containing everything.
    pub const INFINITE: Aabb = Aabb {
        min: Vec3::NEG_INFINITY,
        max: Vec3::INFINITY,
    };

    /// Create a box from its corners. The caller guarantees `min <= max`.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Degenerate box around a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Bounds of a point cloud, empty for no points.
    pub fn from_iter_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points
            .into_iter()
            .fold(Aabb::EMPTY, |acc, p| acc.include_point(p))
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    /// Grow the box to hold `p`.
    pub fn include_point(&self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Overlap of two boxes, [`Aabb::EMPTY`] when they are disjoint.
    pub fn intersection(a: &Aabb, b: &Aabb) -> Self {
        let result = Self {
            min: a.min.max(b.min),
            max: a.max.min(b.max),
        };
        if result.is_empty() {
            Aabb::EMPTY
        } else {
            result
        }
    }

    /// Inclusive point containment.
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        Interval::new(self.min[n], self.max[n])
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let size = self.size();
        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    pub fn surface_area(&self) -> f32 {
        let size = self.size();
        2.0 * (size.x * size.y + size.y * size.z + size.z * size.x)
    }

    /// The eight corners, x varying fastest.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Translate (move) the AABB by an offset vector.
    pub fn translate(&self, offset: Vec3) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        Aabb::new(self.min + offset, self.max + offset)
    }

    /// Slab test against the ray's valid range.
    ///
    /// Returns the sub-range of parameters spent inside the box, clipped to
    /// `[near_limit, far_limit]`, or `None` if the ray misses it.
    pub fn intersect_ray(&self, ray: &BoundedRay) -> Option<Interval> {
        if self.is_empty() {
            return None;
        }
        let inv_dir = ray.direction().recip();
        let t0 = (self.min - ray.support()) * inv_dir;
        let t1 = (self.max - ray.support()) * inv_dir;

        // f32::min/max drop NaN operands, which covers rays lying in a slab plane
        let near = t0.min(t1).max_element().max(ray.near_limit());
        let far = t0.max(t1).min_element().min(ray.far_limit());

        (near <= far).then(|| Interval::new(near, far))
    }
}
