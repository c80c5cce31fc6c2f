//! Linear RGB stand-in for spectral quantities.

use umbra_math::Vec3;

/// Spectral radiance, reflectance or transmittance as linear RGB.
pub type Spectral = Vec3;

/// True if no channel carries energy.
#[inline]
pub fn is_black(s: Spectral) -> bool {
    s == Spectral::ZERO
}

/// Rec. 709 luminance.
#[inline]
pub fn luminance(s: Spectral) -> f32 {
    s.dot(Vec3::new(0.2126, 0.7152, 0.0722))
}
