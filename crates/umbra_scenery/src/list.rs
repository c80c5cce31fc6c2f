//! Flat group of objects, tested one after the other.

use umbra_kernel::{
    Intersection, IntersectionContext, KernelError, KernelResult, ObjectBase, Sample,
    SceneObject, SceneObjectRef, TimePeriod,
};
use umbra_math::{Aabb, BoundedRay, Vec3};

/// Linear composite. Fine for a handful of children, use an
/// [`crate::ObjectTree`] for anything larger.
#[derive(Default)]
pub struct List {
    base: ObjectBase,
    children: Vec<SceneObjectRef>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_children(children: Vec<SceneObjectRef>) -> Self {
        Self {
            base: ObjectBase::new(),
            children,
        }
    }

    pub fn add(&mut self, child: SceneObjectRef) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl SceneObject for List {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn children(&self) -> Vec<&SceneObjectRef> {
        self.children.iter().collect()
    }

    fn pre_process(&self, period: &TimePeriod) {
        for child in &self.children {
            child.pre_process(period);
        }
    }

    fn intersect<'a>(&'a self, sample: &Sample, ray: &BoundedRay, result: &mut Intersection<'a>) {
        let mut ray = *ray;
        let mut best = Intersection::empty();
        let mut candidate = Intersection::empty();

        for child in &self.children {
            child.intersect(sample, &ray, &mut candidate);
            if !candidate.is_empty() && candidate.t() < ray.far_limit() {
                ray.set_far_limit(candidate.t());
                best.swap(&mut candidate);
            }
        }

        if best.is_empty() {
            result.clear();
            return;
        }
        best.push(self, best.t());
        result.swap(&mut best);
    }

    fn is_intersecting(&self, sample: &Sample, ray: &BoundedRay) -> bool {
        self.children
            .iter()
            .any(|child| child.is_intersecting(sample, ray))
    }

    fn local_geometry(
        &self,
        sample: &Sample,
        ray: &BoundedRay,
        intersection: &Intersection<'_>,
        context: &mut IntersectionContext,
    ) {
        let _descend = intersection.descend();
        intersection
            .object()
            .local_context(sample, ray, intersection, context);
    }

    fn contains(&self, sample: &Sample, point: Vec3) -> bool {
        self.children
            .iter()
            .any(|child| child.contains(sample, point))
    }

    fn bounding_box(&self) -> Aabb {
        self.children.iter().fold(Aabb::EMPTY, |acc, child| {
            Aabb::surrounding(&acc, &child.bounding_box())
        })
    }

    fn has_motion(&self) -> bool {
        self.children.iter().any(|child| child.has_motion())
    }

    fn area(&self) -> KernelResult<f32> {
        self.children.iter().map(|child| child.area()).sum()
    }

    fn projected_area(&self, _normal: Vec3) -> KernelResult<f32> {
        Err(KernelError::not_supported("List", "projected_area"))
    }
}
