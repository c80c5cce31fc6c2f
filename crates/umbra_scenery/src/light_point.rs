//! Isotropic point light.

use std::f32::consts::PI;
use umbra_kernel::{
    Intersection, IntersectionContext, KernelResult, Light, LightSample, ObjectBase, Sample,
    SceneObject, Spectral,
};
use umbra_math::{Aabb, BoundedRay, Vec2, Vec3, TOLERANCE};

/// Light emitted from a single point with the same intensity in every
/// direction. It has no surface, so rays never hit it and it only takes
/// part in light sampling.
pub struct LightPoint {
    base: ObjectBase,
    position: Vec3,
    intensity: Spectral,
}

impl LightPoint {
    pub fn new(position: Vec3, intensity: Spectral) -> Self {
        Self {
            base: ObjectBase::new(),
            position,
            intensity,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}

impl SceneObject for LightPoint {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn intersect<'a>(&'a self, _sample: &Sample, _ray: &BoundedRay, result: &mut Intersection<'a>) {
        result.clear();
    }

    fn is_intersecting(&self, _sample: &Sample, _ray: &BoundedRay) -> bool {
        false
    }

    fn local_geometry(
        &self,
        _sample: &Sample,
        _ray: &BoundedRay,
        _intersection: &Intersection<'_>,
        _context: &mut IntersectionContext,
    ) {
        // intersect never reports a hit, so there is no geometry to resolve
    }

    fn contains(&self, _sample: &Sample, _point: Vec3) -> bool {
        false
    }

    /// Empty, so acceleration trees leave the light out.
    fn bounding_box(&self) -> Aabb {
        Aabb::EMPTY
    }

    fn area(&self) -> KernelResult<f32> {
        Ok(0.0)
    }

    fn projected_area(&self, _normal: Vec3) -> KernelResult<f32> {
        Ok(0.0)
    }

    fn as_light(&self) -> Option<&dyn Light> {
        Some(self)
    }
}

impl Light for LightPoint {
    fn is_singular(&self) -> bool {
        true
    }

    fn sample_emission(
        &self,
        _sample: &Sample,
        _uv: Vec2,
        target: Vec3,
        target_normal: Option<Vec3>,
    ) -> Option<LightSample> {
        let to_light = self.position - target;
        let squared_distance = to_light.length_squared();
        if squared_distance <= 0.0 {
            return None;
        }
        if target_normal.is_some_and(|normal| normal.dot(to_light) <= 0.0) {
            return None;
        }
        Some(LightSample {
            radiance: self.intensity / squared_distance,
            shadow_ray: BoundedRay::between(target, self.position, TOLERANCE),
            pdf: 1.0,
        })
    }

    fn emission(&self, _sample: &Sample, _ray: &BoundedRay) -> Option<LightSample> {
        None
    }

    fn total_power(&self) -> Spectral {
        4.0 * PI * self.intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AxisBox, Lambert, List};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;
    use umbra_kernel::{DirectLighting, DirectLightingSettings, SceneObjectRef};

    #[test]
    fn test_inverse_square_falloff() {
        let light = LightPoint::new(Vec3::new(0.0, 0.0, 2.0), Spectral::splat(8.0));
        let sample = Sample::default();
        let lit = light
            .sample_emission(&sample, Vec2::ZERO, Vec3::ZERO, Some(Vec3::Z))
            .unwrap();
        assert_eq!(lit.radiance, Spectral::splat(2.0));
        assert_eq!(lit.pdf, 1.0);
        assert!(lit.shadow_ray.far_limit() < 2.0);

        assert!(light
            .sample_emission(&sample, Vec2::ZERO, Vec3::ZERO, Some(-Vec3::Z))
            .is_none());
        assert!(light
            .emission(&sample, &BoundedRay::new(Vec3::ZERO, Vec3::Z))
            .is_none());
        assert!((light.total_power() - Spectral::splat(32.0 * PI)).length() < 1e-3);
    }

    #[test]
    fn test_point_light_has_no_geometry() {
        let light = LightPoint::new(Vec3::ZERO, Spectral::ONE);
        let sample = Sample::default();
        let ray = BoundedRay::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::X);
        let mut intersection = Intersection::empty();
        light.intersect(&sample, &ray, &mut intersection);
        assert!(intersection.is_empty());
        assert!(light.bounding_box().is_empty());
        assert!(light.as_light().is_some_and(|light| light.is_singular()));
    }

    #[test]
    fn test_cast_ray_onto_lit_floor() {
        // a Lambert floor straight under the light: rho / pi * I / d^2
        let floor: SceneObjectRef = Arc::new(
            AxisBox::new(Vec3::new(-10.0, -10.0, -1.0), Vec3::new(10.0, 10.0, 0.0))
                .with_shader(Arc::new(Lambert::new(Spectral::splat(0.5)))),
        );
        let light = Arc::new(LightPoint::new(Vec3::new(0.0, 0.0, 2.0), Spectral::splat(4.0)));
        let scene = List::from_children(vec![floor, light.clone() as SceneObjectRef]);

        let lights: Vec<&dyn Light> = vec![light.as_ref()];
        let direct = DirectLighting::new(&scene);
        let ray = BoundedRay::new(Vec3::new(0.0, 0.0, 1.0), -Vec3::Z);
        let mut rng = StdRng::seed_from_u64(3);
        let radiance = direct.cast_ray(
            &Sample::default(),
            &ray,
            &lights,
            &DirectLightingSettings::default(),
            &mut rng,
        );

        let expected = 0.5 / PI * 4.0 / 4.0;
        assert!((radiance.x - expected).abs() < 1e-3 * expected.max(1.0), "{radiance}");
    }
}
