//! Light source contract consumed by the direct-lighting estimator.

use crate::spectral::Spectral;
use crate::Sample;
use umbra_math::{BoundedRay, Vec2, Vec3};

/// Radiance arriving from a light along a shadow ray.
///
/// `pdf` is in solid angle measure as seen from the receiving point. For
/// singular lights it is the discrete probability of the sample (usually 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    pub radiance: Spectral,
    pub shadow_ray: BoundedRay,
    pub pdf: f32,
}

pub trait Light: Send + Sync {
    /// Singular lights (points, directions) cannot be hit by BSDF sampling.
    fn is_singular(&self) -> bool;

    /// Sample a point on the light as seen from `target`.
    ///
    /// With a `target_normal`, samples behind the receiving surface may be
    /// rejected early. Returns `None` if no light can reach `target`.
    fn sample_emission(
        &self,
        sample: &Sample,
        uv: Vec2,
        target: Vec3,
        target_normal: Option<Vec3>,
    ) -> Option<LightSample>;

    /// Radiance and pdf for a ray that was sampled by other means.
    fn emission(&self, sample: &Sample, ray: &BoundedRay) -> Option<LightSample>;

    /// Total emitted power, used to balance sampling between lights.
    fn total_power(&self) -> Spectral;

    /// How many samples this light asks for per estimate.
    fn number_of_emission_samples(&self) -> usize {
        1
    }
}
