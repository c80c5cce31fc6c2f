//! Small stand-ins for scene objects, shaders and lights used by unit tests.

use crate::error::{KernelError, KernelResult};
use crate::light::LightSample;
use crate::scene_object::{ObjectBase, SceneObjectRef};
use crate::shader::{Bsdf, BsdfCaps, BsdfFrame, BsdfOut, SampleBsdfOut};
use crate::{Intersection, IntersectionContext, Light, Sample, SceneObject, Shader, Spectral};
use std::f32::consts::{FRAC_1_PI, PI};
use umbra_math::sampling::cosine_hemisphere;
use umbra_math::{Aabb, BoundedRay, Vec2, Vec3, TOLERANCE};

/// An object nothing ever hits. A blocking marker claims every shadow ray.
#[derive(Default)]
pub(crate) struct Marker {
    base: ObjectBase,
    blocking: bool,
}

impl Marker {
    pub fn blocking() -> Self {
        Self {
            blocking: true,
            ..Default::default()
        }
    }
}

impl SceneObject for Marker {
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
        self.blocking
    }

    fn local_geometry(
        &self,
        _sample: &Sample,
        _ray: &BoundedRay,
        _intersection: &Intersection<'_>,
        _context: &mut IntersectionContext,
    ) {
    }

    fn contains(&self, _sample: &Sample, _point: Vec3) -> bool {
        false
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::EMPTY
    }

    fn area(&self) -> KernelResult<f32> {
        Err(KernelError::not_supported("Marker", "area"))
    }

    fn projected_area(&self, _normal: Vec3) -> KernelResult<f32> {
        Err(KernelError::not_supported("Marker", "projected_area"))
    }
}

/// Two children and no geometry of its own.
pub(crate) struct Pair {
    base: ObjectBase,
    a: SceneObjectRef,
    b: SceneObjectRef,
}

impl Pair {
    pub fn new(a: SceneObjectRef, b: SceneObjectRef) -> Self {
        Self {
            base: ObjectBase::new(),
            a,
            b,
        }
    }
}

impl SceneObject for Pair {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn children(&self) -> Vec<&SceneObjectRef> {
        vec![&self.a, &self.b]
    }

    fn intersect<'a>(&'a self, _sample: &Sample, _ray: &BoundedRay, result: &mut Intersection<'a>) {
        result.clear();
    }

    fn is_intersecting(&self, sample: &Sample, ray: &BoundedRay) -> bool {
        self.a.is_intersecting(sample, ray) || self.b.is_intersecting(sample, ray)
    }

    fn local_geometry(
        &self,
        _sample: &Sample,
        _ray: &BoundedRay,
        _intersection: &Intersection<'_>,
        _context: &mut IntersectionContext,
    ) {
    }

    fn contains(&self, sample: &Sample, point: Vec3) -> bool {
        self.a.contains(sample, point) || self.b.contains(sample, point)
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::surrounding(&self.a.bounding_box(), &self.b.bounding_box())
    }

    fn area(&self) -> KernelResult<f32> {
        Ok(self.a.area()? + self.b.area()?)
    }

    fn projected_area(&self, _normal: Vec3) -> KernelResult<f32> {
        Err(KernelError::not_supported("Pair", "projected_area"))
    }
}

/// The plane z = 0, normal +z.
#[derive(Default)]
pub(crate) struct Floor {
    base: ObjectBase,
}

impl SceneObject for Floor {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn intersect<'a>(&'a self, _sample: &Sample, ray: &BoundedRay, result: &mut Intersection<'a>) {
        result.clear();
        if ray.direction().z == 0.0 {
            return;
        }
        let t = -ray.support().z / ray.direction().z;
        if ray.in_range(t) {
            result.push(self, t);
        }
    }

    fn is_intersecting(&self, sample: &Sample, ray: &BoundedRay) -> bool {
        let mut intersection = Intersection::empty();
        self.intersect(sample, ray, &mut intersection);
        !intersection.is_empty()
    }

    fn local_geometry(
        &self,
        _sample: &Sample,
        ray: &BoundedRay,
        intersection: &Intersection<'_>,
        context: &mut IntersectionContext,
    ) {
        let t = intersection.t();
        context.t = t;
        context.point = ray.at(t);
        context.uv = Vec2::new(context.point.x, context.point.y);
        context.dpdu = Vec3::X;
        context.dpdv = Vec3::Y;
        context.set_normal(Vec3::Z);
    }

    fn contains(&self, _sample: &Sample, _point: Vec3) -> bool {
        false
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::INFINITE
    }

    fn area(&self) -> KernelResult<f32> {
        Ok(f32::INFINITY)
    }

    fn projected_area(&self, _normal: Vec3) -> KernelResult<f32> {
        Ok(f32::INFINITY)
    }
}

/// Lambertian reflector.
pub(crate) struct FlatShader(pub Spectral);

/// Lambertian reflector that only subtracts light where it is blocked.
pub(crate) struct ShadowShader(pub Spectral);

impl Shader for FlatShader {
    fn bsdf(&self, _sample: &Sample, context: &IntersectionContext) -> Box<dyn Bsdf> {
        Box::new(TestLambert {
            frame: BsdfFrame::new(context),
            reflectance: self.0,
            shadow_only: false,
        })
    }
}

impl Shader for ShadowShader {
    fn bsdf(&self, _sample: &Sample, context: &IntersectionContext) -> Box<dyn Bsdf> {
        Box::new(TestLambert {
            frame: BsdfFrame::new(context),
            reflectance: self.0,
            shadow_only: true,
        })
    }
}

struct TestLambert {
    frame: BsdfFrame,
    reflectance: Spectral,
    shadow_only: bool,
}

impl Bsdf for TestLambert {
    fn caps(&self) -> BsdfCaps {
        BsdfCaps::REFLECTION | BsdfCaps::DIFFUSE
    }

    fn frame(&self) -> &BsdfFrame {
        &self.frame
    }

    fn evaluate_lobes(&self, omega_in: Vec3, omega_out: Vec3, _allowed: BsdfCaps) -> BsdfOut {
        if omega_in.z * omega_out.z <= 0.0 {
            return BsdfOut::default();
        }
        BsdfOut::new(self.reflectance * FRAC_1_PI, omega_out.z.abs() * FRAC_1_PI)
    }

    fn sample_lobes(&self, omega_in: Vec3, uv: Vec2, _component: f32, _allowed: BsdfCaps) -> SampleBsdfOut {
        let (mut omega_out, pdf) = cosine_hemisphere(uv);
        if omega_in.z < 0.0 {
            omega_out.z = -omega_out.z;
        }
        SampleBsdfOut {
            omega_out,
            value: self.reflectance * FRAC_1_PI,
            pdf,
            used_caps: self.caps(),
        }
    }

    fn is_shadow_only(&self) -> bool {
        self.shadow_only
    }
}

/// Isotropic point light of the given intensity.
pub(crate) struct TestPointLight {
    position: Vec3,
    intensity: Spectral,
}

impl TestPointLight {
    pub fn new(position: Vec3, intensity: Spectral) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

impl Light for TestPointLight {
    fn is_singular(&self) -> bool {
        true
    }

    fn sample_emission(
        &self,
        _sample: &Sample,
        _uv: Vec2,
        target: Vec3,
        _target_normal: Option<Vec3>,
    ) -> Option<LightSample> {
        let squared_distance = self.position.distance_squared(target);
        if squared_distance <= 0.0 {
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
