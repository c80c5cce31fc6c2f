//! Sphere primitive.

use std::f32::consts::PI;
use umbra_kernel::{
    Intersection, IntersectionContext, KernelResult, ObjectBase, Sample, SceneObject, SolidEvent,
    SurfaceSample,
};
use umbra_math::sampling::uniform_sphere;
use umbra_math::{Aabb, BoundedRay, Vec2, Vec3};

/// A solid sphere.
pub struct Sphere {
    base: ObjectBase,
    center: Vec3,
    radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            base: ObjectBase::new(),
            center,
            radius: radius.max(0.0),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Both roots of the ray/sphere equation, nearest first.
    fn roots(&self, ray: &BoundedRay) -> Option<(f32, f32)> {
        let oc = ray.support() - self.center;
        let b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();
        Some((-b - sqrtd, -b + sqrtd))
    }

    /// Nearest crossing inside the valid range.
    fn nearest_hit(&self, ray: &BoundedRay) -> Option<(f32, SolidEvent)> {
        let (t_near, t_far) = self.roots(ray)?;
        if ray.in_range(t_near) {
            Some((t_near, SolidEvent::Entering))
        } else if ray.in_range(t_far) {
            Some((t_far, SolidEvent::Leaving))
        } else {
            None
        }
    }
}

impl SceneObject for Sphere {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn intersect<'a>(&'a self, _sample: &Sample, ray: &BoundedRay, result: &mut Intersection<'a>) {
        result.clear();
        if let Some((t, event)) = self.nearest_hit(ray) {
            result.push(self, t);
            result.set_solid_event(event);
        }
    }

    fn is_intersecting(&self, _sample: &Sample, ray: &BoundedRay) -> bool {
        self.nearest_hit(ray).is_some()
    }

    fn local_geometry(
        &self,
        _sample: &Sample,
        ray: &BoundedRay,
        intersection: &Intersection<'_>,
        context: &mut IntersectionContext,
    ) {
        let t = intersection.t();
        let point = ray.at(t);
        let normal = (point - self.center) / self.radius;

        // tangent along increasing longitude, degenerate at the poles
        let tangent = Vec3::new(-normal.y, normal.x, 0.0);
        let dpdu = if tangent.length_squared() > 0.0 {
            tangent.normalize()
        } else {
            Vec3::X
        };

        let theta = normal.z.clamp(-1.0, 1.0).acos();
        let phi = normal.x.atan2(normal.y);

        context.t = t;
        context.point = point;
        context.uv = Vec2::new(phi / (2.0 * PI), theta / PI);
        context.dpdu = dpdu;
        context.dpdv = normal.cross(dpdu);
        context.dndu = dpdu / self.radius;
        context.dndv = context.dpdv / self.radius;
        context.set_normal(normal);
        context.solid_event = intersection.solid_event();
    }

    fn contains(&self, _sample: &Sample, point: Vec3) -> bool {
        point.distance_squared(self.center) < self.radius * self.radius
    }

    fn bounding_box(&self) -> Aabb {
        let extent = Vec3::splat(self.radius);
        Aabb::new(self.center - extent, self.center + extent)
    }

    fn area(&self) -> KernelResult<f32> {
        Ok(4.0 * PI * self.radius * self.radius)
    }

    fn projected_area(&self, _normal: Vec3) -> KernelResult<f32> {
        Ok(PI * self.radius * self.radius)
    }

    fn has_surface_sampling(&self) -> bool {
        true
    }

    fn sample_surface(&self, uv: Vec2) -> SurfaceSample {
        let normal = uniform_sphere(uv);
        let area = 4.0 * PI * self.radius * self.radius;
        SurfaceSample {
            point: self.center + self.radius * normal,
            normal,
            pdf: if area > 0.0 { 1.0 / area } else { 0.0 },
        }
    }
}
