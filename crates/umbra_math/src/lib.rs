//! Math primitives shared by the umbra crates.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod bounding_sphere;
mod frame;
mod interval;
mod ray;
pub mod sampling;
mod transform;

pub use aabb::Aabb;
pub use bounding_sphere::BoundingSphere;
pub use frame::ShadingFrame;
pub use interval::Interval;
pub use ray::BoundedRay;
pub use transform::Mat4Ext;

/// Geometric tolerance used for self-intersection offsets and tie detection.
pub const TOLERANCE: f32 = 1e-4;

/// Relative comparison with an absolute floor of `tolerance`.
#[inline]
pub fn almost_equal(a: f32, b: f32, tolerance: f32) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= tolerance * scale
}
