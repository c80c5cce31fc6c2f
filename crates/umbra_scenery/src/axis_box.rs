//! Axis-aligned solid box.

use umbra_kernel::{
    Intersection, IntersectionContext, KernelResult, ObjectBase, Sample, SceneObject, SolidEvent,
};
use umbra_math::{Aabb, BoundedRay, Vec2, Vec3};

pub struct AxisBox {
    base: ObjectBase,
    bounds: Aabb,
}

impl AxisBox {
    /// Box spanned by two opposite corners, in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            base: ObjectBase::new(),
            bounds: Aabb::from_points(a, b),
        }
    }

    fn nearest_hit(&self, ray: &BoundedRay) -> Option<(f32, SolidEvent)> {
        let slab = self
            .bounds
            .intersect_ray(&ray.bounded(f32::NEG_INFINITY, f32::INFINITY))?;
        if ray.in_range(slab.min) {
            Some((slab.min, SolidEvent::Entering))
        } else if ray.in_range(slab.max) {
            Some((slab.max, SolidEvent::Leaving))
        } else {
            None
        }
    }
}

impl SceneObject for AxisBox {
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
        let half = (self.bounds.size() * 0.5).max(Vec3::splat(f32::MIN_POSITIVE));
        let relative = (point - self.bounds.centroid()) / half;

        // the face is the axis where the point sits furthest out
        let distance = relative.abs();
        let axis = if distance.x >= distance.y && distance.x >= distance.z {
            0
        } else if distance.y >= distance.z {
            1
        } else {
            2
        };
        let mut normal = Vec3::ZERO;
        normal[axis] = relative[axis].signum();
        let dpdu = Vec3::new(normal.y.abs() + normal.z.abs(), normal.x.abs(), 0.0);
        let uv_axes = [(axis + 1) % 3, (axis + 2) % 3];

        context.t = t;
        context.point = point;
        context.uv = Vec2::new(relative[uv_axes[0]], relative[uv_axes[1]]) * 0.5 + 0.5;
        context.dpdu = dpdu;
        context.dpdv = normal.cross(dpdu);
        context.dndu = Vec3::ZERO;
        context.dndv = Vec3::ZERO;
        context.set_normal(normal);
        context.solid_event = intersection.solid_event();
    }

    fn contains(&self, _sample: &Sample, point: Vec3) -> bool {
        point.cmpgt(self.bounds.min).all() && point.cmplt(self.bounds.max).all()
    }

    fn bounding_box(&self) -> Aabb {
        self.bounds
    }

    fn area(&self) -> KernelResult<f32> {
        Ok(self.bounds.surface_area())
    }

    fn projected_area(&self, normal: Vec3) -> KernelResult<f32> {
        let size = self.bounds.size();
        let faces = Vec3::new(size.y * size.z, size.z * size.x, size.x * size.y);
        Ok(faces.dot(normal.normalize_or_zero().abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> AxisBox {
        AxisBox::new(Vec3::splat(1.0), Vec3::splat(-1.0))
    }

    #[test]
    fn test_box_entering_and_leaving() {
        let cube = cube();
        let sample = Sample::default();
        let mut intersection = Intersection::empty();

        let ray = BoundedRay::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        cube.intersect(&sample, &ray, &mut intersection);
        assert!((intersection.t() - 4.0).abs() < 1e-5);
        assert_eq!(intersection.solid_event(), SolidEvent::Entering);

        let inside = BoundedRay::new(Vec3::ZERO, Vec3::X);
        cube.intersect(&sample, &inside, &mut intersection);
        assert!((intersection.t() - 1.0).abs() < 1e-5);
        assert_eq!(intersection.solid_event(), SolidEvent::Leaving);

        let miss = BoundedRay::new(Vec3::new(0.0, 3.0, 5.0), -Vec3::Z);
        assert!(!cube.is_intersecting(&sample, &miss));
    }

    #[test]
    fn test_box_face_normals() {
        let cube = cube();
        let sample = Sample::default();
        for direction in [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z] {
            let ray = BoundedRay::new(direction * 3.0, -direction);
            let mut intersection = Intersection::empty();
            cube.intersect(&sample, &ray, &mut intersection);
            let mut context = IntersectionContext::default();
            cube.local_context(&sample, &ray, &intersection, &mut context);
            assert_eq!(context.normal, direction);
            assert!(context.dpdu.dot(direction).abs() < 1e-6);
            assert!((context.dpdv.length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_box_measures() {
        let slab = AxisBox::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(slab.area().unwrap(), 22.0);
        assert_eq!(slab.projected_area(Vec3::Z).unwrap(), 2.0);
        assert!(slab.contains(&Sample::default(), Vec3::new(0.5, 1.0, 1.5)));
        assert!(!slab.contains(&Sample::default(), Vec3::new(0.5, 1.0, 3.5)));
    }
}
