//! Flat circular disk, the usual shape for area lights.

use std::f32::consts::PI;
use umbra_kernel::{
    Intersection, IntersectionContext, KernelResult, ObjectBase, Sample, SceneObject,
    SurfaceSample,
};
use umbra_math::sampling::uniform_disk;
use umbra_math::{Aabb, BoundedRay, ShadingFrame, Vec2, Vec3};

/// A one-sided surface without volume: hits carry no solid event.
pub struct Disk {
    base: ObjectBase,
    center: Vec3,
    frame: ShadingFrame,
    radius: f32,
}

impl Disk {
    pub fn new(center: Vec3, normal: Vec3, radius: f32) -> Self {
        Self {
            base: ObjectBase::new(),
            center,
            frame: ShadingFrame::from_normal(normal),
            radius: radius.max(0.0),
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.frame.w
    }

    fn hit(&self, ray: &BoundedRay) -> Option<f32> {
        let normal = self.frame.w;
        let denominator = normal.dot(ray.direction());
        if denominator == 0.0 {
            return None;
        }
        let t = normal.dot(self.center - ray.support()) / denominator;
        if !ray.in_range(t) {
            return None;
        }
        let offset = ray.at(t) - self.center;
        (offset.length_squared() <= self.radius * self.radius).then_some(t)
    }
}

impl SceneObject for Disk {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn intersect<'a>(&'a self, _sample: &Sample, ray: &BoundedRay, result: &mut Intersection<'a>) {
        result.clear();
        if let Some(t) = self.hit(ray) {
            result.push(self, t);
        }
    }

    fn is_intersecting(&self, _sample: &Sample, ray: &BoundedRay) -> bool {
        self.hit(ray).is_some()
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
        let local = self.frame.to_local(point - self.center);

        context.t = t;
        context.point = point;
        context.uv = Vec2::new(local.x, local.y) / self.radius.max(f32::MIN_POSITIVE);
        context.dpdu = self.frame.u;
        context.dpdv = self.frame.v;
        context.dndu = Vec3::ZERO;
        context.dndv = Vec3::ZERO;
        context.set_normal(self.frame.w);
        context.solid_event = intersection.solid_event();
    }

    fn contains(&self, _sample: &Sample, _point: Vec3) -> bool {
        false
    }

    fn bounding_box(&self) -> Aabb {
        let normal = self.frame.w;
        let extent = Vec3::new(
            (1.0 - normal.x * normal.x).max(0.0).sqrt(),
            (1.0 - normal.y * normal.y).max(0.0).sqrt(),
            (1.0 - normal.z * normal.z).max(0.0).sqrt(),
        ) * self.radius;
        Aabb::new(self.center - extent, self.center + extent)
    }

    fn area(&self) -> KernelResult<f32> {
        Ok(PI * self.radius * self.radius)
    }

    fn projected_area(&self, normal: Vec3) -> KernelResult<f32> {
        Ok(PI * self.radius * self.radius * self.frame.w.dot(normal.normalize_or_zero()).abs())
    }

    fn has_surface_sampling(&self) -> bool {
        true
    }

    fn sample_surface(&self, uv: Vec2) -> SurfaceSample {
        let p = uniform_disk(uv) * self.radius;
        let area = PI * self.radius * self.radius;
        SurfaceSample {
            point: self.center + self.frame.to_world(Vec3::new(p.x, p.y, 0.0)),
            normal: self.frame.w,
            pdf: if area > 0.0 { 1.0 / area } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_kernel::SolidEvent;

    #[test]
    fn test_disk_hit_and_miss() {
        let disk = Disk::new(Vec3::ZERO, Vec3::Z, 1.0);
        let sample = Sample::default();
        let mut intersection = Intersection::empty();

        let ray = BoundedRay::new(Vec3::new(0.5, 0.0, 2.0), -Vec3::Z);
        disk.intersect(&sample, &ray, &mut intersection);
        assert!((intersection.t() - 2.0).abs() < 1e-6);
        assert_eq!(intersection.solid_event(), SolidEvent::NoEvent);

        let outside = BoundedRay::new(Vec3::new(1.5, 0.0, 2.0), -Vec3::Z);
        disk.intersect(&sample, &outside, &mut intersection);
        assert!(intersection.is_empty());

        let parallel = BoundedRay::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X);
        assert!(!disk.is_intersecting(&sample, &parallel));
    }

    #[test]
    fn test_disk_bounds_are_flat() {
        let disk = Disk::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Z, 2.0);
        let bounds = disk.bounding_box();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 3.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 4.0, 3.0));
        assert!(!disk.contains(&Sample::default(), Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_disk_surface_samples_stay_inside() {
        let disk = Disk::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0), 2.0);
        for uv in [Vec2::new(0.0, 0.0), Vec2::new(0.99, 0.01), Vec2::new(0.3, 0.8)] {
            let s = disk.sample_surface(uv);
            assert!(s.point.length() <= 2.0 + 1e-5);
            assert!(s.point.dot(disk.normal()).abs() < 1e-5);
        }
        assert_eq!(disk.sample_surface(Vec2::splat(0.5)).point, Vec3::ZERO);
    }

    #[test]
    fn test_zero_radius_disk_has_no_sampling_density() {
        let disk = Disk::new(Vec3::ZERO, Vec3::Z, 0.0);
        let surface = disk.sample_surface(Vec2::splat(0.5));
        assert_eq!(surface.pdf, 0.0);
        let toward = disk.sample_surface_toward(Vec2::splat(0.5), Vec3::Z);
        assert_eq!(toward.pdf, 0.0);
    }

    #[test]
    fn test_disk_solid_angle_pdf() {
        // (radius, distance, cos theta) -> d^2 / (A |cos theta|)
        for (radius, distance, cos_theta) in [(1.0f32, 2.0f32, 1.0f32), (0.5, 3.0, 0.5), (2.0, 10.0, 0.25)] {
            let disk = Disk::new(Vec3::ZERO, Vec3::Z, radius);
            let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
            let target = Vec3::new(sin_theta, 0.0, cos_theta) * distance;
            let expected = distance * distance / (PI * radius * radius * cos_theta);

            let toward = disk.sample_surface_toward(Vec2::splat(0.5), target);
            assert!(
                (toward.pdf - expected).abs() < 1e-4 * expected,
                "sampled pdf {} vs {expected}",
                toward.pdf
            );

            let ray = BoundedRay::new(target, -target);
            let angular = disk.angular_pdf(&Sample::default(), &ray).unwrap();
            assert!(
                (angular.pdf - expected).abs() < 1e-3 * expected,
                "angular pdf {} vs {expected}",
                angular.pdf
            );
            assert!(angular.shadow_ray.far_limit() < distance);
        }
    }
}
