//! Direct illumination with multiple importance sampling.
//!
//! Each light is estimated twice: once by sampling the light and once by
//! sampling the BSDF. Both estimates are combined with the power heuristic.

use crate::mis::squared_heuristic;
use crate::shader::{Bsdf, BsdfCaps};
use crate::spectral::{is_black, Spectral};
use crate::{Intersection, IntersectionContext, Light, Medium, Sample, SceneObject, Vacuum};
use rand::Rng;
use serde::{Deserialize, Serialize};
use umbra_math::{BoundedRay, Vec2, Vec3, TOLERANCE};

/// Sample counts per light, per shading point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectLightingSettings {
    /// Multiplied by the light's own number of emission samples.
    pub light_samples: usize,
    pub bsdf_samples: usize,
}

impl Default for DirectLightingSettings {
    fn default() -> Self {
        Self {
            light_samples: 1,
            bsdf_samples: 1,
        }
    }
}

/// Uniform samples for one light. `bsdf` and `component` have equal length.
#[derive(Debug, Clone, Copy)]
pub struct LightSamples<'s> {
    pub light: &'s [Vec2],
    pub bsdf: &'s [Vec2],
    pub component: &'s [f32],
}

/// The receiving point.
#[derive(Debug, Clone, Copy)]
pub struct ShadingPoint {
    pub point: Vec3,
    /// Geometric normal, on the side the light is gathered from.
    pub normal: Vec3,
    /// Direction toward the viewer, in BSDF space.
    pub omega_in: Vec3,
}

/// Degenerate lights (zero area, zero distance) give zero or infinite pdfs.
#[inline]
fn usable_pdf(pdf: f32) -> bool {
    pdf > 0.0 && pdf.is_finite()
}

pub struct DirectLighting<'s> {
    scene: &'s dyn SceneObject,
    medium: &'s dyn Medium,
}

impl<'s> DirectLighting<'s> {
    /// Estimator over `scene` in vacuum.
    pub fn new(scene: &'s dyn SceneObject) -> Self {
        Self {
            scene,
            medium: &Vacuum,
        }
    }

    /// Attenuate shadow rays by `medium`.
    pub fn with_medium(mut self, medium: &'s dyn Medium) -> Self {
        self.medium = medium;
        self
    }

    pub fn scene(&self) -> &'s dyn SceneObject {
        self.scene
    }

    /// Radiance reflected toward `point.omega_in` from `light`.
    ///
    /// Singular lights are only sampled through the light. Shadow-only BSDFs
    /// contribute negatively, and only where the light is blocked.
    pub fn estimate_light_contribution(
        &self,
        sample: &Sample,
        bsdf: &dyn Bsdf,
        light: &dyn Light,
        samples: &LightSamples<'_>,
        point: &ShadingPoint,
    ) -> Spectral {
        debug_assert_eq!(samples.bsdf.len(), samples.component.len());

        let shadow_only = bsdf.is_shadow_only();
        let sign = if shadow_only { -1.0 } else { 1.0 };

        let nl = samples.light.len() as f32;
        let nb = if light.is_singular() {
            0.0
        } else {
            samples.bsdf.len() as f32
        };

        let mut caps = BsdfCaps::ALL_DIFFUSE | BsdfCaps::GLOSSY;
        if !light.is_singular() {
            caps |= BsdfCaps::SPECULAR;
        }

        let start = point.point + 10.0 * TOLERANCE * point.normal;
        let mut result = Spectral::ZERO;

        if nl > 0.0 {
            for &uv in samples.light {
                let Some(emission) = light.sample_emission(sample, uv, start, Some(point.normal))
                else {
                    continue;
                };
                if !usable_pdf(emission.pdf) || is_black(emission.radiance) {
                    continue;
                }
                let omega_out = bsdf.world_to_bsdf(emission.shadow_ray.direction());
                let out = bsdf.evaluate(point.omega_in, omega_out, caps);
                if !out.is_valid()
                    || self.scene.is_intersecting(sample, &emission.shadow_ray) != shadow_only
                {
                    continue;
                }
                let trans = self.medium.transmittance(sample, &emission.shadow_ray);
                let weight = squared_heuristic(nl * emission.pdf, nb * out.pdf);
                let factor = sign * weight * omega_out.z.abs() / (nl * emission.pdf);
                result += out.value * trans * emission.radiance * factor;
            }
        }

        if nb > 0.0 {
            for (&uv, &component) in samples.bsdf.iter().zip(samples.component) {
                let out = bsdf.sample(point.omega_in, uv, component, caps);
                if !out.is_valid() || !usable_pdf(out.pdf) {
                    continue;
                }
                let ray = BoundedRay::new(start, bsdf.bsdf_to_world(out.omega_out));
                let Some(emission) = light.emission(sample, &ray) else {
                    continue;
                };
                if !usable_pdf(emission.pdf) || is_black(emission.radiance) {
                    continue;
                }
                if self.scene.is_intersecting(sample, &emission.shadow_ray) != shadow_only {
                    continue;
                }
                let trans = self.medium.transmittance(sample, &emission.shadow_ray);
                let weight = if out.used_caps.contains(BsdfCaps::SPECULAR) {
                    1.0
                } else {
                    squared_heuristic(nb * out.pdf, nl * emission.pdf)
                };
                let factor = sign * weight * out.omega_out.z.abs() / (nb * out.pdf);
                result += out.value * trans * emission.radiance * factor;
            }
        }

        result
    }

    /// Direct light leaving the first surface hit by `ray`.
    ///
    /// Misses and surfaces without a shader are black.
    pub fn cast_ray<R: Rng + ?Sized>(
        &self,
        sample: &Sample,
        ray: &BoundedRay,
        lights: &[&dyn Light],
        settings: &DirectLightingSettings,
        rng: &mut R,
    ) -> Spectral {
        let mut intersection = Intersection::empty();
        self.scene.intersect(sample, ray, &mut intersection);
        if intersection.is_empty() {
            return Spectral::ZERO;
        }

        let mut context = IntersectionContext::default();
        intersection
            .object()
            .local_context(sample, ray, &intersection, &mut context);
        if context.geometric_normal.dot(ray.direction()) > 0.0 {
            context.flip_normal();
        }
        let Some(bsdf) = context.bsdf(sample) else {
            return Spectral::ZERO;
        };

        let point = ShadingPoint {
            point: context.point,
            normal: context.geometric_normal,
            omega_in: bsdf.world_to_bsdf(-ray.direction()),
        };

        let mut light_uv = Vec::new();
        let mut bsdf_uv = Vec::new();
        let mut component = Vec::new();
        let mut result = Spectral::ZERO;
        for &light in lights {
            let light_count = settings.light_samples * light.number_of_emission_samples();
            light_uv.clear();
            light_uv.extend((0..light_count).map(|_| Vec2::new(rng.gen(), rng.gen())));
            bsdf_uv.clear();
            bsdf_uv.extend((0..settings.bsdf_samples).map(|_| Vec2::new(rng.gen(), rng.gen())));
            component.clear();
            component.extend((0..settings.bsdf_samples).map(|_| rng.gen::<f32>()));

            let samples = LightSamples {
                light: &light_uv,
                bsdf: &bsdf_uv,
                component: &component,
            };
            result += self.estimate_light_contribution(sample, bsdf.as_ref(), light, &samples, &point);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FlatShader, Floor, Marker, ShadowShader, TestPointLight};
    use crate::{Beer, IntersectionContext, Shader};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f32::consts::FRAC_1_PI;
    use std::sync::Arc;

    #[test]
    fn test_degenerate_pdfs_are_skipped() {
        assert!(usable_pdf(0.5));
        assert!(!usable_pdf(0.0));
        assert!(!usable_pdf(-1.0));
        assert!(!usable_pdf(f32::INFINITY));
        assert!(!usable_pdf(f32::NAN));
    }

    fn floor_point() -> IntersectionContext {
        let mut context = IntersectionContext {
            dpdu: Vec3::X,
            dpdv: Vec3::Y,
            ..Default::default()
        };
        context.set_normal(Vec3::Z);
        context
    }

    fn estimate(scene: &dyn SceneObject, shader: &dyn Shader, light: &TestPointLight) -> Spectral {
        let sample = Sample::default();
        let context = floor_point();
        let bsdf = shader.bsdf(&sample, &context);
        let point = ShadingPoint {
            point: Vec3::ZERO,
            normal: Vec3::Z,
            omega_in: bsdf.world_to_bsdf(Vec3::Z),
        };
        let light_uv = [Vec2::splat(0.5)];
        let bsdf_uv = [Vec2::splat(0.5)];
        let component = [0.5];
        let samples = LightSamples {
            light: &light_uv,
            bsdf: &bsdf_uv,
            component: &component,
        };
        DirectLighting::new(scene).estimate_light_contribution(
            &sample,
            bsdf.as_ref(),
            light,
            &samples,
            &point,
        )
    }

    #[test]
    fn test_point_light_is_exact() {
        let rho = Spectral::new(0.8, 0.5, 0.2);
        let light = TestPointLight::new(Vec3::new(0.0, 0.0, 2.0), Spectral::splat(4.0));
        let result = estimate(&Marker::default(), &FlatShader(rho), &light);
        let expected = rho * FRAC_1_PI;
        assert!((result - expected).abs().max_element() < 1e-3, "{result} vs {expected}");
    }

    #[test]
    fn test_point_light_cosine_falloff() {
        let rho = Spectral::ONE;
        let light = TestPointLight::new(Vec3::new(3.0, 0.0, 4.0), Spectral::splat(25.0));
        let result = estimate(&Marker::default(), &FlatShader(rho), &light);
        // I / d^2 * cos * rho / pi with d = 5, cos = 4/5
        let expected = 0.8 * FRAC_1_PI;
        assert!((result.x - expected).abs() < 1e-3, "{result}");
    }

    #[test]
    fn test_occluded_light_contributes_nothing() {
        let light = TestPointLight::new(Vec3::new(0.0, 0.0, 2.0), Spectral::splat(4.0));
        let result = estimate(&Marker::blocking(), &FlatShader(Spectral::ONE), &light);
        assert_eq!(result, Spectral::ZERO);
    }

    #[test]
    fn test_shadow_only_subtracts_where_blocked() {
        let light = TestPointLight::new(Vec3::new(0.0, 0.0, 2.0), Spectral::splat(4.0));
        let shader = ShadowShader(Spectral::ONE);

        let lit = estimate(&Marker::default(), &shader, &light);
        assert_eq!(lit, Spectral::ZERO);

        let blocked = estimate(&Marker::blocking(), &shader, &light);
        assert!((blocked + Spectral::splat(FRAC_1_PI)).abs().max_element() < 1e-3, "{blocked}");
    }

    #[test]
    fn test_light_behind_surface_is_black() {
        let light = TestPointLight::new(Vec3::new(0.0, 0.0, -2.0), Spectral::splat(4.0));
        let result = estimate(&Marker::default(), &FlatShader(Spectral::ONE), &light);
        assert_eq!(result, Spectral::ZERO);
    }

    #[test]
    fn test_cast_ray_on_floor() {
        let floor = Floor::default().with_shader(Arc::new(FlatShader(Spectral::ONE)));
        let light = TestPointLight::new(Vec3::new(0.0, 0.0, 2.0), Spectral::splat(4.0));
        let lights: [&dyn Light; 1] = [&light];
        let ray = BoundedRay::new(Vec3::new(0.0, 0.0, 1.0), -Vec3::Z);
        let mut rng = StdRng::seed_from_u64(7);

        let tracer = DirectLighting::new(&floor);
        let result = tracer.cast_ray(
            &Sample::default(),
            &ray,
            &lights,
            &DirectLightingSettings::default(),
            &mut rng,
        );
        assert!((result.x - FRAC_1_PI).abs() < 1e-3, "{result}");

        // seen from below, the floor faces the other way and the light is behind it
        let below = BoundedRay::new(Vec3::new(0.0, 0.0, -1.0), Vec3::Z);
        let result = tracer.cast_ray(
            &Sample::default(),
            &below,
            &lights,
            &DirectLightingSettings::default(),
            &mut rng,
        );
        assert_eq!(result, Spectral::ZERO);
    }

    #[test]
    fn test_cast_ray_without_shader_is_black() {
        let light = TestPointLight::new(Vec3::new(0.0, 0.0, 2.0), Spectral::splat(4.0));
        let lights: [&dyn Light; 1] = [&light];
        let ray = BoundedRay::new(Vec3::new(0.0, 0.0, 1.0), -Vec3::Z);
        let floor = Floor::default();
        let mut rng = StdRng::seed_from_u64(7);
        let result = DirectLighting::new(&floor).cast_ray(
            &Sample::default(),
            &ray,
            &lights,
            &DirectLightingSettings::default(),
            &mut rng,
        );
        assert_eq!(result, Spectral::ZERO);
    }

    #[test]
    fn test_medium_attenuates_shadow_rays() {
        let light = TestPointLight::new(Vec3::new(0.0, 0.0, 2.0), Spectral::splat(4.0));
        let shader = FlatShader(Spectral::ONE);
        let medium = Beer::new(Spectral::splat(0.5));
        let scene = Marker::default();
        let sample = Sample::default();
        let context = floor_point();
        let bsdf = shader.bsdf(&sample, &context);
        let point = ShadingPoint {
            point: Vec3::ZERO,
            normal: Vec3::Z,
            omega_in: Vec3::Z,
        };
        let light_uv = [Vec2::splat(0.5)];
        let samples = LightSamples {
            light: &light_uv,
            bsdf: &[],
            component: &[],
        };
        let result = DirectLighting::new(&scene)
            .with_medium(&medium)
            .estimate_light_contribution(&sample, bsdf.as_ref(), &light, &samples, &point);
        // shadow ray spans just under 2 units from the offset start
        assert!(result.x < FRAC_1_PI * 0.4 && result.x > FRAC_1_PI * 0.3, "{result}");
    }

    #[test]
    fn test_settings_from_json() {
        let settings: DirectLightingSettings =
            serde_json::from_str(r#"{ "light_samples": 4 }"#).unwrap();
        assert_eq!(settings.light_samples, 4);
        assert_eq!(settings.bsdf_samples, 1);
        let text = serde_json::to_string(&settings).unwrap();
        assert!(text.contains("\"bsdf_samples\":1"));
    }
}
