//! Emitting surfaces.

use std::f32::consts::PI;
use umbra_kernel::{
    AngularPdf, Intersection, IntersectionContext, KernelError, KernelResult, Light, LightSample,
    ObjectBase, Sample, SceneObject, SceneObjectRef, Spectral, SurfaceSample, TimePeriod,
};
use umbra_math::{Aabb, BoundedRay, Vec2, Vec3, TOLERANCE};

/// A surface emitting uniform radiance.
///
/// The light is a scene object too: it can be hit, and it hands geometry
/// queries to its surface. Hits on it carry no shader of their own.
pub struct LightArea {
    base: ObjectBase,
    surface: SceneObjectRef,
    radiance: Spectral,
    single_sided: bool,
    number_of_emission_samples: usize,
}

impl LightArea {
    /// The surface must support surface sampling.
    pub fn new(surface: SceneObjectRef, radiance: Spectral) -> KernelResult<Self> {
        if !surface.has_surface_sampling() {
            return Err(KernelError::MissingSurfaceSampling(
                "the surface of an area light".to_string(),
            ));
        }
        let area = surface.area()?;
        if area <= 0.0 {
            log::warn!("Area light on a surface of area {area}, it will emit nothing");
        }
        Ok(Self {
            base: ObjectBase::new(),
            surface,
            radiance,
            single_sided: false,
            number_of_emission_samples: 1,
        })
    }

    /// Emit only on the side the surface normal points to.
    pub fn with_single_sided(mut self, single_sided: bool) -> Self {
        self.single_sided = single_sided;
        self
    }

    pub fn with_emission_samples(mut self, count: usize) -> Self {
        self.number_of_emission_samples = count.max(1);
        self
    }

    pub fn radiance(&self) -> Spectral {
        self.radiance
    }

    pub fn is_single_sided(&self) -> bool {
        self.single_sided
    }

    /// True if light leaving the surface along `direction` is emitted,
    /// `direction` pointing from the receiver toward the light.
    fn emits_toward(&self, light_normal: Vec3, direction: Vec3) -> bool {
        !(self.single_sided && light_normal.dot(direction) > 0.0)
    }
}

impl SceneObject for LightArea {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn children(&self) -> Vec<&SceneObjectRef> {
        vec![&self.surface]
    }

    fn pre_process(&self, period: &TimePeriod) {
        self.surface.pre_process(period);
    }

    fn intersect<'a>(&'a self, sample: &Sample, ray: &BoundedRay, result: &mut Intersection<'a>) {
        self.surface.intersect(sample, ray, result);
        if !result.is_empty() {
            let t = result.t();
            result.push(self, t);
        }
    }

    fn is_intersecting(&self, sample: &Sample, ray: &BoundedRay) -> bool {
        self.surface.is_intersecting(sample, ray)
    }

    fn local_geometry(
        &self,
        sample: &Sample,
        ray: &BoundedRay,
        intersection: &Intersection<'_>,
        context: &mut IntersectionContext,
    ) {
        let _descend = intersection.descend();
        self.surface
            .local_context(sample, ray, intersection, context);
    }

    fn contains(&self, sample: &Sample, point: Vec3) -> bool {
        self.surface.contains(sample, point)
    }

    fn bounding_box(&self) -> Aabb {
        self.surface.bounding_box()
    }

    fn has_motion(&self) -> bool {
        self.surface.has_motion()
    }

    fn area(&self) -> KernelResult<f32> {
        self.surface.area()
    }

    fn projected_area(&self, normal: Vec3) -> KernelResult<f32> {
        self.surface.projected_area(normal)
    }

    fn has_surface_sampling(&self) -> bool {
        true
    }

    fn sample_surface(&self, uv: Vec2) -> SurfaceSample {
        self.surface.sample_surface(uv)
    }

    fn sample_surface_toward(&self, uv: Vec2, target: Vec3) -> SurfaceSample {
        self.surface.sample_surface_toward(uv, target)
    }

    fn sample_surface_toward_oriented(
        &self,
        uv: Vec2,
        target: Vec3,
        target_normal: Vec3,
    ) -> SurfaceSample {
        self.surface
            .sample_surface_toward_oriented(uv, target, target_normal)
    }

    fn angular_pdf(&self, sample: &Sample, ray: &BoundedRay) -> Option<AngularPdf> {
        self.surface.angular_pdf(sample, ray)
    }

    fn as_light(&self) -> Option<&dyn Light> {
        Some(self)
    }
}

impl Light for LightArea {
    fn is_singular(&self) -> bool {
        false
    }

    fn sample_emission(
        &self,
        _sample: &Sample,
        uv: Vec2,
        target: Vec3,
        target_normal: Option<Vec3>,
    ) -> Option<LightSample> {
        let surface = match target_normal {
            Some(normal) => self
                .surface
                .sample_surface_toward_oriented(uv, target, normal),
            None => self.surface.sample_surface_toward(uv, target),
        };
        if !(surface.pdf > 0.0 && surface.pdf.is_finite()) {
            return None;
        }

        let to_light = surface.point - target;
        let distance = to_light.length();
        if distance <= 0.0 {
            return None;
        }
        let direction = to_light / distance;
        if target_normal.is_some_and(|normal| normal.dot(direction) <= 0.0) {
            return None;
        }
        if !self.emits_toward(surface.normal, direction) {
            return None;
        }

        Some(LightSample {
            radiance: self.radiance,
            shadow_ray: BoundedRay::between(target, surface.point, TOLERANCE),
            pdf: surface.pdf,
        })
    }

    fn emission(&self, sample: &Sample, ray: &BoundedRay) -> Option<LightSample> {
        let angular = self.surface.angular_pdf(sample, ray)?;
        if !self.emits_toward(angular.normal, angular.shadow_ray.direction()) {
            return None;
        }
        Some(LightSample {
            radiance: self.radiance,
            shadow_ray: angular.shadow_ray,
            pdf: angular.pdf,
        })
    }

    fn total_power(&self) -> Spectral {
        let area = self.surface.area().unwrap_or(0.0);
        let sides = if self.single_sided { 1.0 } else { 2.0 };
        self.radiance * (PI * area * sides)
    }

    fn number_of_emission_samples(&self) -> usize {
        self.number_of_emission_samples
    }
}
