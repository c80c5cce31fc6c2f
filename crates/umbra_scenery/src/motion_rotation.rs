//! Child spinning around an axis through the origin during the shutter.

use std::cell::Cell;
use std::f32::consts::{PI, TAU};
use std::sync::RwLock;
use thread_local::ThreadLocal;
use umbra_kernel::{
    Intersection, IntersectionContext, KernelError, KernelResult, ObjectBase, Sample, SceneObject,
    SceneObjectRef, TimePeriod,
};
use umbra_math::{Aabb, BoundedRay, Mat4, Vec3};

/// Rotation of a child by `start + time * speed` radians around `axis`.
///
/// Bounds cover the sweep over the pre-processed time period. Each thread
/// keeps the matrix of the last time it asked for, since the rays of one
/// camera sample share their time.
pub struct MotionRotation {
    base: ObjectBase,
    child: SceneObjectRef,
    axis: Vec3,
    start: f32,
    speed: f32,
    bounds: RwLock<Option<Aabb>>,
    last_world_to_local: ThreadLocal<Cell<Option<(f32, Mat4)>>>,
}

impl MotionRotation {
    pub fn new(child: SceneObjectRef, axis: Vec3, start: f32, speed: f32) -> KernelResult<Self> {
        let axis = axis.try_normalize().ok_or_else(|| {
            KernelError::InvalidParameter(format!("rotation axis {axis} has no direction"))
        })?;
        Ok(Self {
            base: ObjectBase::new(),
            child,
            axis,
            start,
            speed,
            bounds: RwLock::new(None),
            last_world_to_local: ThreadLocal::new(),
        })
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Rotation angle at `time`, in radians.
    pub fn angle(&self, time: f32) -> f32 {
        self.start + time * self.speed
    }

    fn world_to_local(&self, time: f32) -> Mat4 {
        let last = self.last_world_to_local.get_or(|| Cell::new(None));
        if let Some((last_time, matrix)) = last.get() {
            if last_time == time {
                return matrix;
            }
        }
        let matrix = Mat4::from_axis_angle(self.axis, -self.angle(time));
        last.set(Some((time, matrix)));
        matrix
    }

    /// Bounds of the child swept from angle `lo` to `hi`.
    fn swept_bounds(&self, lo: f32, hi: f32) -> Aabb {
        let child = self.child.bounding_box();
        if child.is_empty() {
            return Aabb::EMPTY;
        }
        child.corners().into_iter().fold(Aabb::EMPTY, |acc, corner| {
            Aabb::surrounding(&acc, &arc_bounds(self.axis, corner, lo, hi))
        })
    }
}

/// True if some `theta + 2 pi k` lies in `[lo, hi]`.
fn angle_in_range(theta: f32, lo: f32, hi: f32) -> bool {
    if hi - lo >= TAU {
        return true;
    }
    let k = ((lo - theta) / TAU).ceil();
    theta + k * TAU <= hi
}

/// Exact bounds of the arc traced by `point` rotating around `axis` from
/// angle `lo` to `hi`.
fn arc_bounds(axis: Vec3, point: Vec3, lo: f32, hi: f32) -> Aabb {
    // p(theta) = center + e1 cos(theta) + e2 sin(theta)
    let center = axis * axis.dot(point);
    let e1 = point - center;
    let e2 = axis.cross(e1);

    let at = |theta: f32| center + e1 * theta.cos() + e2 * theta.sin();
    let mut bounds = Aabb::from_points(at(lo), at(hi));
    for i in 0..3 {
        let radius = e1[i].hypot(e2[i]);
        if radius == 0.0 {
            continue;
        }
        let phase = e2[i].atan2(e1[i]);
        if angle_in_range(phase, lo, hi) {
            bounds.max[i] = bounds.max[i].max(center[i] + radius);
        }
        if angle_in_range(phase + PI, lo, hi) {
            bounds.min[i] = bounds.min[i].min(center[i] - radius);
        }
    }
    bounds
}

impl SceneObject for MotionRotation {
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
        let (begin, end) = (self.angle(period.begin), self.angle(period.end));
        let swept = self.swept_bounds(begin.min(end), begin.max(end));
        match self.bounds.write() {
            Ok(mut bounds) => *bounds = Some(swept),
            Err(_) => log::error!("Motion rotation bounds lock poisoned, keeping full sweep"),
        }
    }

    fn intersect<'a>(&'a self, sample: &Sample, ray: &BoundedRay, result: &mut Intersection<'a>) {
        let (local, scale) = ray.transform(&self.world_to_local(sample.time));
        self.child.intersect(sample, &local, result);
        if !result.is_empty() {
            let t = result.t() / scale;
            result.push(self, t);
        }
    }

    fn is_intersecting(&self, sample: &Sample, ray: &BoundedRay) -> bool {
        let (local, _) = ray.transform(&self.world_to_local(sample.time));
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
        let (local, _) = ray.transform(&self.world_to_local(sample.time));
        {
            let _descend = intersection.descend();
            self.child.local_context(sample, &local, intersection, context);
        }
        context.transform_by(&self.local_space(sample.time));
        context.t = t;
    }

    fn contains(&self, sample: &Sample, point: Vec3) -> bool {
        let local = self.world_to_local(sample.time).transform_point3(point);
        self.child.contains(sample, local)
    }

    fn bounding_box(&self) -> Aabb {
        let cached = self.bounds.read().ok().and_then(|bounds| *bounds);
        cached.unwrap_or_else(|| self.swept_bounds(0.0, TAU))
    }

    fn has_motion(&self) -> bool {
        true
    }

    fn local_space(&self, time: f32) -> Mat4 {
        Mat4::from_axis_angle(self.axis, self.angle(time))
    }

    fn area(&self) -> KernelResult<f32> {
        self.child.area()
    }

    fn projected_area(&self, _normal: Vec3) -> KernelResult<f32> {
        Err(KernelError::not_supported("MotionRotation", "projected_area"))
    }
}
