//! Spatial acceleration trees over externally owned objects.
//!
//! A [`Tree`] indexes a slice of objects it does not own. How the objects are
//! bounded comes from an [`ObjectTraits`] adapter; how a single query talks to
//! one object comes from an [`ObjectQuery`]. The split strategy only decides
//! the shape of the tree, traversal is shared by all of them.

mod split;
mod tree;

pub use split::{BuildItem, MedianSplit, OctreeSplit, QuadSplit, SahSplit, SplitStrategy};
pub use tree::Tree;

use umbra_math::{Aabb, BoundedRay, Interval, Vec3};

/// Static knowledge about the indexed object type.
pub trait ObjectTraits {
    type Object;

    fn object_aabb(object: &Self::Object) -> Aabb;

    /// Range of `ray` inside `aabb`, `None` on a miss.
    fn aabb_ray(aabb: &Aabb, ray: &BoundedRay) -> Option<Interval> {
        aabb.intersect_ray(ray)
    }
}

/// Per-query access to objects borrowed for `'t`.
///
/// A query may keep state between calls, e.g. the best hit record so far.
pub trait ObjectQuery<'t, O> {
    /// Nearest hit on `object` inside the valid range of `ray`.
    fn object_intersect(&mut self, object: &'t O, ray: &BoundedRay) -> Option<f32>;

    /// Any hit on `object` inside the valid range of `ray`.
    fn object_intersects(&mut self, object: &'t O, ray: &BoundedRay) -> bool;

    fn object_contains(&mut self, object: &'t O, point: Vec3) -> bool;
}
