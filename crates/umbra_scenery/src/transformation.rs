//! Static affine placement of a child object.

use umbra_kernel::{
    Intersection, IntersectionContext, KernelError, KernelResult, ObjectBase, Sample, SceneObject,
    SceneObjectRef, TimePeriod,
};
use umbra_math::{Aabb, BoundedRay, Mat4, Mat4Ext, Vec3};

/// Places a child with an invertible affine matrix.
///
/// Rays are carried into the child's space and parameters scaled back, so
/// hits on the child keep their world distances.
pub struct Transformation {
    base: ObjectBase,
    child: SceneObjectRef,
    local_to_world: Mat4,
    world_to_local: Mat4,
}

impl Transformation {
    pub fn new(child: SceneObjectRef, local_to_world: Mat4) -> KernelResult<Self> {
        if !local_to_world.is_invertible() {
            return Err(KernelError::InvalidParameter(format!(
                "transformation matrix is not invertible: {local_to_world}"
            )));
        }
        Ok(Self {
            base: ObjectBase::new(),
            child,
            local_to_world,
            world_to_local: local_to_world.inverse(),
        })
    }

    pub fn local_to_world(&self) -> Mat4 {
        self.local_to_world
    }

    pub fn world_to_local(&self) -> Mat4 {
        self.world_to_local
    }
}

impl SceneObject for Transformation {
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
        let (local, scale) = ray.transform(&self.world_to_local);
        self.child.intersect(sample, &local, result);
        if !result.is_empty() {
            let t = result.t() / scale;
            result.push(self, t);
        }
    }

    fn is_intersecting(&self, sample: &Sample, ray: &BoundedRay) -> bool {
        let (local, _) = ray.transform(&self.world_to_local);
        self.child.is_intersecting(sample, &local)
    }

    fn local_geometry(
        &self,
        sample: &Sample,
        ray: &BoundedRay,
        intersection: &Intersection<'_>,
        context: &mut IntersectionContext,
    ) {
        let t = intersection.t();
        let (local, _) = ray.transform(&self.world_to_local);
        {
            let _descend = intersection.descend();
            self.child.local_context(sample, &local, intersection, context);
        }
        context.transform_by(&self.local_to_world);
        context.t = t;
    }

    fn contains(&self, sample: &Sample, point: Vec3) -> bool {
        self.child
            .contains(sample, self.world_to_local.transform_point3(point))
    }

    fn bounding_box(&self) -> Aabb {
        self.local_to_world
            .transform_aabb(&self.child.bounding_box())
    }

    fn has_motion(&self) -> bool {
        self.child.has_motion()
    }

    fn local_space(&self, _time: f32) -> Mat4 {
        self.local_to_world
    }

    /// Area of the child, exact for rigid motions only.
    fn area(&self) -> KernelResult<f32> {
        self.child.area()
    }

    fn projected_area(&self, normal: Vec3) -> KernelResult<f32> {
        self.child
            .projected_area(self.world_to_local.transform_normal(normal))
    }
}
