//! Pure offset of a child object.

use umbra_kernel::{
    AngularPdf, Intersection, IntersectionContext, KernelResult, ObjectBase, Sample, SceneObject,
    SceneObjectRef, SurfaceSample, TimePeriod,
};
use umbra_math::{Aabb, BoundedRay, Mat4, Vec2, Vec3};

/// Moves a child by a fixed offset.
///
/// Cheaper than a [`crate::Transformation`] and, unlike it, keeps surface
/// sampling of the child available, which makes it the way to place area
/// lights.
pub struct Translation {
    base: ObjectBase,
    child: SceneObjectRef,
    offset: Vec3,
}

impl Translation {
    pub fn new(child: SceneObjectRef, offset: Vec3) -> Self {
        Self {
            base: ObjectBase::new(),
            child,
            offset,
        }
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    fn shifted(&self, mut surface: SurfaceSample) -> SurfaceSample {
        surface.point += self.offset;
        surface
    }
}

impl SceneObject for Translation {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn children(&self) -> Vec<&SceneObjectRef> {
        vec![&self.child]
    }

    fn pre_process(&self, period: &TimePeriod) {
        self.child.pre_process(period);
    }

    fn intersect<'a>(&'a self, sample: &Sample, ray: &BoundedRay, result: &mut Intersection<'a>) {
        self.child
            .intersect(sample, &ray.translate(-self.offset), result);
        if !result.is_empty() {
            let t = result.t();
            result.push(self, t);
        }
    }

    fn is_intersecting(&self, sample: &Sample, ray: &BoundedRay) -> bool {
        self.child
            .is_intersecting(sample, &ray.translate(-self.offset))
    }

    fn local_geometry(
        &self,
        sample: &Sample,
        ray: &BoundedRay,
        intersection: &Intersection<'_>,
        context: &mut IntersectionContext,
    ) {
        {
            let _descend = intersection.descend();
            self.child
                .local_context(sample, &ray.translate(-self.offset), intersection, context);
        }
        context.translate_by(self.offset);
    }

    fn contains(&self, sample: &Sample, point: Vec3) -> bool {
        self.child.contains(sample, point - self.offset)
    }

    fn bounding_box(&self) -> Aabb {
        self.child.bounding_box().translate(self.offset)
    }

    fn has_motion(&self) -> bool {
        self.child.has_motion()
    }

    fn local_space(&self, _time: f32) -> Mat4 {
        Mat4::from_translation(self.offset)
    }

    fn area(&self) -> KernelResult<f32> {
        self.child.area()
    }

    fn projected_area(&self, normal: Vec3) -> KernelResult<f32> {
        self.child.projected_area(normal)
    }

    fn has_surface_sampling(&self) -> bool {
        self.child.has_surface_sampling()
    }

    fn sample_surface(&self, uv: Vec2) -> SurfaceSample {
        self.shifted(self.child.sample_surface(uv))
    }

    fn sample_surface_toward(&self, uv: Vec2, target: Vec3) -> SurfaceSample {
        self.shifted(self.child.sample_surface_toward(uv, target - self.offset))
    }

    fn sample_surface_toward_oriented(
        &self,
        uv: Vec2,
        target: Vec3,
        target_normal: Vec3,
    ) -> SurfaceSample {
        self.shifted(
            self.child
                .sample_surface_toward_oriented(uv, target - self.offset, target_normal),
        )
    }

    fn sample_surface_view(&self, uv: Vec2, view_direction: Vec3) -> SurfaceSample {
        self.shifted(self.child.sample_surface_view(uv, view_direction))
    }

    fn angular_pdf(&self, sample: &Sample, ray: &BoundedRay) -> Option<AngularPdf> {
        let mut angular = self
            .child
            .angular_pdf(sample, &ray.translate(-self.offset))?;
        angular.shadow_ray = angular.shadow_ray.translate(self.offset);
        Some(angular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Disk, Sphere};
    use std::sync::Arc;

    #[test]
    fn test_translated_sphere() {
        let child: SceneObjectRef = Arc::new(Sphere::new(Vec3::ZERO, 1.0));
        let moved = Translation::new(child, Vec3::new(0.0, 0.0, -5.0));
        let sample = Sample::default();

        let ray = BoundedRay::new(Vec3::ZERO, -Vec3::Z);
        let mut intersection = Intersection::empty();
        moved.intersect(&sample, &ray, &mut intersection);
        assert!((intersection.t() - 4.0).abs() < 1e-5);

        let mut context = IntersectionContext::default();
        moved.local_context(&sample, &ray, &intersection, &mut context);
        assert!((context.point - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
        assert!((context.normal - Vec3::Z).length() < 1e-5);
        assert!((context.t - 4.0).abs() < 1e-5);

        assert!(moved.contains(&sample, Vec3::new(0.0, 0.0, -5.5)));
        assert_eq!(moved.bounding_box().min, Vec3::new(-1.0, -1.0, -6.0));
    }

    #[test]
    fn test_translated_disk_sampling() {
        let child: SceneObjectRef = Arc::new(Disk::new(Vec3::ZERO, -Vec3::Z, 1.0));
        let moved = Translation::new(child.clone(), Vec3::new(0.0, 0.0, 3.0));
        assert!(moved.has_surface_sampling());

        let uv = Vec2::new(0.3, 0.6);
        let surface = moved.sample_surface_toward(uv, Vec3::ZERO);
        let local = child.sample_surface_toward(uv, Vec3::new(0.0, 0.0, -3.0));
        assert!((surface.point - (local.point + Vec3::Z * 3.0)).length() < 1e-6);
        assert!((surface.pdf - local.pdf).abs() < 1e-6);

        let ray = BoundedRay::new(Vec3::ZERO, Vec3::Z);
        let angular = moved.angular_pdf(&Sample::default(), &ray).unwrap();
        // straight on at distance 3: 9 / pi
        assert!((angular.pdf - 9.0 / std::f32::consts::PI).abs() < 1e-3);
        assert_eq!(angular.shadow_ray.support(), Vec3::ZERO);
        assert!(angular.shadow_ray.far_limit() < 3.0);
    }
}
