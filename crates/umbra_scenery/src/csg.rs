//! Constructive solid geometry on two child solids.
//!
//! The node walks the hits of both children along the ray and keeps the
//! first one where the combined solid changes from outside to inside or back.
//! Whether a child hit enters or leaves its own solid comes from the solid
//! event it reports, so no point-in-solid test is needed while both children
//! still have hits ahead.

use std::fmt;
use std::str::FromStr;
use umbra_kernel::{
    Intersection, IntersectionContext, KernelError, KernelResult, ObjectBase, Sample, SceneObject,
    SceneObjectRef, SolidEvent, TimePeriod,
};
use umbra_math::{almost_equal, Aabb, BoundedRay, Vec3, TOLERANCE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsgOperation {
    Union,
    Intersection,
    /// `a` minus `b`.
    Difference,
}

impl CsgOperation {
    fn index(self) -> usize {
        self as usize
    }

    /// Inside the result, given whether the point is inside `a` and `b`.
    pub fn combine(self, inside_a: bool, inside_b: bool) -> bool {
        match self {
            CsgOperation::Union => inside_a || inside_b,
            CsgOperation::Intersection => inside_a && inside_b,
            CsgOperation::Difference => inside_a && !inside_b,
        }
    }

    /// A hit on `a` counts if the point's side of `b` equals this.
    fn keeps_a_when_inside_b(self) -> bool {
        self == CsgOperation::Intersection
    }

    /// A hit on `b` counts if the point's side of `a` equals this.
    fn keeps_b_when_inside_a(self) -> bool {
        self != CsgOperation::Union
    }
}

impl FromStr for CsgOperation {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "union" => Ok(CsgOperation::Union),
            "intersection" => Ok(CsgOperation::Intersection),
            "difference" => Ok(CsgOperation::Difference),
            _ => Err(KernelError::UnknownOperation(s.to_string())),
        }
    }
}

impl fmt::Display for CsgOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CsgOperation::Union => "union",
            CsgOperation::Intersection => "intersection",
            CsgOperation::Difference => "difference",
        };
        f.write_str(name)
    }
}

/// What to do when both children report a hit at the same distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    KeepA,
    KeepB,
    /// Neither surface changes the result, look further.
    Advance,
}

use Action::{Advance, KeepA, KeepB};

/// Coincident hits, indexed by operation, then the events of `a` and `b`
/// in `SolidEvent::index` order (none, entering, leaving).
const COINCIDENT: [[[Action; 3]; 3]; 3] = [
    // union
    [
        [KeepA, KeepB, KeepB],
        [KeepA, KeepA, Advance],
        [KeepA, Advance, KeepA],
    ],
    // intersection
    [
        [Advance, Advance, KeepA],
        [Advance, KeepA, Advance],
        [KeepB, Advance, KeepA],
    ],
    // difference
    [
        [KeepA, KeepA, Advance],
        [KeepA, Advance, KeepA],
        [KeepA, KeepA, Advance],
    ],
];

/// Start of the range that lies safely past a surface at `t`.
///
/// The step is relative like the tie test, capped at `MAX_STEP` so thin
/// features far along the ray are not skipped. It stays at least two ulps,
/// so the next query always starts beyond `t`.
fn step_past(t: f32) -> f32 {
    let step = (TOLERANCE * t.max(1.0)).min(MAX_STEP);
    t + step.max(2.0 * f32::EPSILON * t.abs())
}

/// Largest forward step past a rejected or coincident surface. Features
/// thinner than this along the ray can still be missed, and surfaces of A
/// and B closer than `TOLERANCE * t` are resolved as one coincident hit.
const MAX_STEP: f32 = 1e-2;

/// Boolean combination of two solids.
///
/// The children should be closed solids that report solid events. Surfaces
/// without volume are tolerated and behave as infinitely thin sheets.
pub struct Csg {
    base: ObjectBase,
    operation: CsgOperation,
    a: SceneObjectRef,
    b: SceneObjectRef,
}

impl Csg {
    pub fn new(operation: CsgOperation, a: SceneObjectRef, b: SceneObjectRef) -> Self {
        Self {
            base: ObjectBase::new(),
            operation,
            a,
            b,
        }
    }

    pub fn union(a: SceneObjectRef, b: SceneObjectRef) -> Self {
        Self::new(CsgOperation::Union, a, b)
    }

    pub fn intersection(a: SceneObjectRef, b: SceneObjectRef) -> Self {
        Self::new(CsgOperation::Intersection, a, b)
    }

    pub fn difference(a: SceneObjectRef, b: SceneObjectRef) -> Self {
        Self::new(CsgOperation::Difference, a, b)
    }

    pub fn operation(&self) -> CsgOperation {
        self.operation
    }

    /// Walk both children until one hit bounds the combined solid.
    ///
    /// Leaves the winning child's record in `hit_a` or `hit_b` and says which.
    fn resolve<'a>(
        &'a self,
        sample: &Sample,
        ray: &BoundedRay,
        hit_a: &mut Intersection<'a>,
        hit_b: &mut Intersection<'a>,
    ) -> Option<Action> {
        let operation = self.operation;
        self.a.intersect(sample, ray, hit_a);
        self.b.intersect(sample, ray, hit_b);

        loop {
            match (hit_a.is_empty(), hit_b.is_empty()) {
                (true, true) => return None,
                (false, true) => {
                    // b has nothing left ahead, its side is settled for good
                    let point = ray.at(hit_a.t());
                    let inside_b = self.b.contains(sample, point);
                    return (inside_b == operation.keeps_a_when_inside_b()).then_some(KeepA);
                }
                (true, false) => {
                    let point = ray.at(hit_b.t());
                    let inside_a = self.a.contains(sample, point);
                    return (inside_a == operation.keeps_b_when_inside_a()).then_some(KeepB);
                }
                (false, false) => {}
            }

            let (t_a, t_b) = (hit_a.t(), hit_b.t());
            let inside_a = hit_a.solid_event() == SolidEvent::Leaving;
            let inside_b = hit_b.solid_event() == SolidEvent::Leaving;

            if almost_equal(t_a, t_b, TOLERANCE) {
                let action = COINCIDENT[operation.index()][hit_a.solid_event().index()]
                    [hit_b.solid_event().index()];
                if action != Advance {
                    return Some(action);
                }
                let beyond = ray.bounded(step_past(t_a.max(t_b)), ray.far_limit());
                self.a.intersect(sample, &beyond, hit_a);
                self.b.intersect(sample, &beyond, hit_b);
            } else if t_a < t_b {
                if inside_b == operation.keeps_a_when_inside_b() {
                    return Some(KeepA);
                }
                let beyond = ray.bounded(step_past(t_a), ray.far_limit());
                self.a.intersect(sample, &beyond, hit_a);
            } else {
                if inside_a == operation.keeps_b_when_inside_a() {
                    return Some(KeepB);
                }
                let beyond = ray.bounded(step_past(t_b), ray.far_limit());
                self.b.intersect(sample, &beyond, hit_b);
            }
        }
    }
}

impl SceneObject for Csg {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn children(&self) -> Vec<&SceneObjectRef> {
        vec![&self.a, &self.b]
    }

    fn pre_process(&self, period: &TimePeriod) {
        self.a.pre_process(period);
        self.b.pre_process(period);
    }

    fn intersect<'a>(&'a self, sample: &Sample, ray: &BoundedRay, result: &mut Intersection<'a>) {
        let mut hit_a = Intersection::empty();
        let mut hit_b = Intersection::empty();
        let mut winner = match self.resolve(sample, ray, &mut hit_a, &mut hit_b) {
            Some(KeepA) => hit_a,
            Some(KeepB) => {
                // the surface of b bounds a difference from the inside
                if self.operation == CsgOperation::Difference {
                    hit_b.flip_solid_event();
                }
                hit_b
            }
            Some(Advance) | None => {
                result.clear();
                return;
            }
        };
        winner.push(self, winner.t());
        result.swap(&mut winner);
    }

    fn is_intersecting(&self, sample: &Sample, ray: &BoundedRay) -> bool {
        let mut hit_a = Intersection::empty();
        let mut hit_b = Intersection::empty();
        self.resolve(sample, ray, &mut hit_a, &mut hit_b).is_some()
    }

    fn local_geometry(
        &self,
        sample: &Sample,
        ray: &BoundedRay,
        intersection: &Intersection<'_>,
        context: &mut IntersectionContext,
    ) {
        let _descend = intersection.descend();
        if intersection.is_object(self.a.as_ref()) {
            self.a.local_context(sample, ray, intersection, context);
        } else {
            self.b.local_context(sample, ray, intersection, context);
            if self.operation == CsgOperation::Difference {
                context.flip_normal();
            }
        }
    }

    fn contains(&self, sample: &Sample, point: Vec3) -> bool {
        self.operation
            .combine(self.a.contains(sample, point), self.b.contains(sample, point))
    }

    fn bounding_box(&self) -> Aabb {
        let a = self.a.bounding_box();
        match self.operation {
            CsgOperation::Union => Aabb::surrounding(&a, &self.b.bounding_box()),
            CsgOperation::Intersection => Aabb::intersection(&a, &self.b.bounding_box()),
            CsgOperation::Difference => a,
        }
    }

    fn has_motion(&self) -> bool {
        self.a.has_motion() || self.b.has_motion()
    }

    fn area(&self) -> KernelResult<f32> {
        Err(KernelError::not_supported("Csg", "area"))
    }

    fn projected_area(&self, _normal: Vec3) -> KernelResult<f32> {
        Err(KernelError::not_supported("Csg", "projected_area"))
    }
}
