//! Composite that indexes its children with an acceleration tree.

use std::sync::OnceLock;
use umbra_kernel::accel::{
    MedianSplit, ObjectQuery, ObjectTraits, OctreeSplit, QuadSplit, SahSplit, SplitStrategy, Tree,
};
use umbra_kernel::{
    Intersection, IntersectionContext, KernelError, KernelResult, ObjectBase, Sample, SceneObject,
    SceneObjectRef, TimePeriod,
};
use umbra_math::{Aabb, BoundedRay, Vec3};

/// Scene objects bounded by their own bounding boxes.
pub struct SceneObjectTraits;

impl ObjectTraits for SceneObjectTraits {
    type Object = SceneObjectRef;

    fn object_aabb(object: &SceneObjectRef) -> Aabb {
        object.bounding_box()
    }
}

/// One query against the children: keeps the best full hit record so far.
struct ChildQuery<'a> {
    sample: Sample,
    best: Intersection<'a>,
    scratch: Intersection<'a>,
}

impl<'a> ChildQuery<'a> {
    fn new(sample: &Sample) -> Self {
        Self {
            sample: *sample,
            best: Intersection::empty(),
            scratch: Intersection::empty(),
        }
    }
}

impl<'a> ObjectQuery<'a, SceneObjectRef> for ChildQuery<'a> {
    fn object_intersect(&mut self, object: &'a SceneObjectRef, ray: &BoundedRay) -> Option<f32> {
        object.intersect(&self.sample, ray, &mut self.scratch);
        if self.scratch.is_empty() {
            return None;
        }
        let t = self.scratch.t();
        // the tree accepts exactly the hits that shorten the ray
        if t < ray.far_limit() {
            self.best.swap(&mut self.scratch);
        }
        Some(t)
    }

    fn object_intersects(&mut self, object: &'a SceneObjectRef, ray: &BoundedRay) -> bool {
        object.is_intersecting(&self.sample, ray)
    }

    fn object_contains(&mut self, object: &'a SceneObjectRef, point: Vec3) -> bool {
        object.contains(&self.sample, point)
    }
}

/// Group of objects behind a bounding volume hierarchy.
///
/// The hierarchy is built on [`SceneObject::pre_process`], after the children
/// have been pre-processed, or lazily by the first query. Adding children
/// afterwards drops it.
pub struct ObjectTree<S> {
    base: ObjectBase,
    children: Vec<SceneObjectRef>,
    tree: OnceLock<Tree<SceneObjectTraits, S>>,
}

/// Median split on the longest axis.
pub type AabbTree = ObjectTree<MedianSplit>;
/// Binned surface area heuristic.
pub type AabpTree = ObjectTree<SahSplit>;
pub type OctTree = ObjectTree<OctreeSplit>;
/// Four-wide tree, two SAH splits per level.
pub type Qbvh = ObjectTree<QuadSplit>;

impl<S: SplitStrategy> Default for ObjectTree<S> {
    fn default() -> Self {
        Self::from_children(Vec::new())
    }
}

impl<S: SplitStrategy> ObjectTree<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_children(children: Vec<SceneObjectRef>) -> Self {
        Self {
            base: ObjectBase::new(),
            children,
            tree: OnceLock::new(),
        }
    }

    pub fn add(&mut self, child: SceneObjectRef) {
        self.children.push(child);
        self.tree = OnceLock::new();
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Name of the split strategy, for logs and settings.
    pub fn strategy_name(&self) -> &'static str {
        S::NAME
    }

    fn tree(&self) -> &Tree<SceneObjectTraits, S> {
        self.tree.get_or_init(|| {
            if self.children.is_empty() {
                log::warn!("Building an empty {}", S::NAME);
            }
            Tree::build(&self.children)
        })
    }
}

impl<S: SplitStrategy> SceneObject for ObjectTree<S> {
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
        let tree = self.tree();
        log::debug!(
            "{} ready: {} children, {} nodes",
            S::NAME,
            tree.len(),
            tree.node_count()
        );
    }

    fn intersect<'a>(&'a self, sample: &Sample, ray: &BoundedRay, result: &mut Intersection<'a>) {
        let mut query = ChildQuery::new(sample);
        match self.tree().intersect(&self.children, ray, &mut query) {
            Some((_, t)) => {
                query.best.push(self, t);
                result.swap(&mut query.best);
            }
            None => result.clear(),
        }
    }

    fn is_intersecting(&self, sample: &Sample, ray: &BoundedRay) -> bool {
        let mut query = ChildQuery::new(sample);
        self.tree().intersects(&self.children, ray, &mut query)
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
        let mut query = ChildQuery::new(sample);
        self.tree().contains(&self.children, point, &mut query)
    }

    fn bounding_box(&self) -> Aabb {
        self.tree().aabb()
    }

    fn has_motion(&self) -> bool {
        self.children.iter().any(|child| child.has_motion())
    }

    fn area(&self) -> KernelResult<f32> {
        self.children.iter().map(|child| child.area()).sum()
    }

    fn projected_area(&self, _normal: Vec3) -> KernelResult<f32> {
        Err(KernelError::not_supported("ObjectTree", "projected_area"))
    }
}
