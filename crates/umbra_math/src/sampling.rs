//! Warps from the unit square to common sampling domains.
//!
//! Every function takes a point of `[0, 1)^2` and is measure preserving up
//! to the documented pdf.

use crate::{Vec2, Vec3};
use std::f32::consts::{FRAC_1_PI, FRAC_PI_2, FRAC_PI_4, PI};

/// Concentric map onto the unit disk. `(0.5, 0.5)` lands on the centre.
pub fn uniform_disk(uv: Vec2) -> Vec2 {
    let a = 2.0 * uv.x - 1.0;
    let b = 2.0 * uv.y - 1.0;
    if a == 0.0 && b == 0.0 {
        return Vec2::ZERO;
    }
    let (radius, phi) = if a.abs() > b.abs() {
        (a, FRAC_PI_4 * (b / a))
    } else {
        (b, FRAC_PI_2 - FRAC_PI_4 * (a / b))
    };
    Vec2::new(radius * phi.cos(), radius * phi.sin())
}

/// Cosine weighted direction around +z, with its solid angle pdf.
pub fn cosine_hemisphere(uv: Vec2) -> (Vec3, f32) {
    let p = uniform_disk(uv);
    let z = (1.0 - p.length_squared()).max(0.0).sqrt();
    (Vec3::new(p.x, p.y, z), z * FRAC_1_PI)
}

/// Uniform direction on the unit sphere. The pdf is `1 / (4 pi)`.
pub fn uniform_sphere(uv: Vec2) -> Vec3 {
    let z = 1.0 - 2.0 * uv.x;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * uv.y;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}
