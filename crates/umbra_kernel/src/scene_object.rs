//! The contract every node of the scene graph implements.
//!
//! Nodes form a DAG: the same object may be shared by several parents
//! through [`SceneObjectRef`]. A scene is built, pre-processed once with
//! [`SceneObject::pre_process`], and from then on only queried, from any
//! number of threads at once.

use crate::error::KernelResult;
use crate::{Intersection, IntersectionContext, Light, Medium, Sample, Shader, TimePeriod};
use std::any::type_name;
use std::collections::HashSet;
use std::sync::Arc;
use umbra_math::{Aabb, BoundedRay, BoundingSphere, Mat4, Vec2, Vec3, TOLERANCE};

/// Shared handle to a scene graph node.
pub type SceneObjectRef = Arc<dyn SceneObject>;

/// A point drawn on a surface.
///
/// `pdf` is per unit area for [`SceneObject::sample_surface`] and per unit
/// solid angle for the overloads that know a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub point: Vec3,
    pub normal: Vec3,
    pub pdf: f32,
}

/// Density of reaching a surface along a given ray, in solid angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularPdf {
    pub pdf: f32,
    /// The ray clipped to stop just short of the surface.
    pub shadow_ray: BoundedRay,
    pub normal: Vec3,
}

/// Convert an area density at `point` to a solid angle density seen from `target`.
///
/// Returns zero when the conversion is degenerate (target on the surface or
/// grazing it).
pub fn area_to_solid_angle(pdf_area: f32, point: Vec3, normal: Vec3, target: Vec3) -> f32 {
    let to_target = target - point;
    let squared_distance = to_target.length_squared();
    if squared_distance <= 0.0 {
        return 0.0;
    }
    let cos_theta = normal.dot(to_target).abs() / squared_distance.sqrt();
    if cos_theta <= 0.0 {
        return 0.0;
    }
    pdf_area * squared_distance / cos_theta
}

/// Shader and interior medium assignment shared by all nodes.
#[derive(Clone, Default)]
pub struct ObjectBase {
    shader: Option<Arc<dyn Shader>>,
    interior: Option<Arc<dyn Medium>>,
    overriding_shader: bool,
    overriding_interior: bool,
}

impl ObjectBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shader(&self) -> Option<&Arc<dyn Shader>> {
        self.shader.as_ref()
    }

    pub fn set_shader(&mut self, shader: Option<Arc<dyn Shader>>) {
        self.shader = shader;
    }

    /// An overriding shader replaces whatever the children assigned.
    pub fn is_overriding_shader(&self) -> bool {
        self.overriding_shader
    }

    pub fn set_overriding_shader(&mut self, enabled: bool) {
        self.overriding_shader = enabled;
    }

    pub fn interior(&self) -> Option<&Arc<dyn Medium>> {
        self.interior.as_ref()
    }

    pub fn set_interior(&mut self, interior: Option<Arc<dyn Medium>>) {
        self.interior = interior;
    }

    pub fn is_overriding_interior(&self) -> bool {
        self.overriding_interior
    }

    pub fn set_overriding_interior(&mut self, enabled: bool) {
        self.overriding_interior = enabled;
    }

    /// Assign shader and interior to a context resolved by this node or its children.
    pub fn apply_to(&self, context: &mut IntersectionContext) {
        if let Some(shader) = &self.shader {
            if self.overriding_shader || context.shader.is_none() {
                context.shader = Some(Arc::clone(shader));
            }
        }
        if let Some(interior) = &self.interior {
            if self.overriding_interior || context.interior.is_none() {
                context.interior = Some(Arc::clone(interior));
            }
        }
    }
}

/// A node of the scene graph: primitive, composite, wrapper or light.
pub trait SceneObject: Send + Sync {
    fn base(&self) -> &ObjectBase;

    fn base_mut(&mut self) -> &mut ObjectBase;

    /// Direct children, for graph traversal.
    fn children(&self) -> Vec<&SceneObjectRef> {
        Vec::new()
    }

    /// Prepare for rendering `period`. Composites forward to their children
    /// first. Calling it again is harmless.
    fn pre_process(&self, _period: &TimePeriod) {}

    /// Find the nearest hit inside the valid range of `ray`.
    ///
    /// Whatever `result` held before is replaced. On a miss it is left
    /// empty. On a hit it holds the levels pushed by the children followed
    /// by this object's own level.
    fn intersect<'a>(&'a self, sample: &Sample, ray: &BoundedRay, result: &mut Intersection<'a>);

    /// Any-hit test inside the valid range of `ray`.
    fn is_intersecting(&self, sample: &Sample, ray: &BoundedRay) -> bool;

    /// Resolve the geometry of the hit at the current level of `intersection`,
    /// in the frame of this object's parent. Called through
    /// [`SceneObject::local_context`].
    fn local_geometry(
        &self,
        sample: &Sample,
        ray: &BoundedRay,
        intersection: &Intersection<'_>,
        context: &mut IntersectionContext,
    );

    /// Resolve the full context of a hit on this object.
    ///
    /// The current level of `intersection` must refer to `self`.
    fn local_context(
        &self,
        sample: &Sample,
        ray: &BoundedRay,
        intersection: &Intersection<'_>,
        context: &mut IntersectionContext,
    ) {
        debug_assert!(
            intersection.is_object(self),
            "local_context on {} with an intersection that refers to another object",
            type_name::<Self>()
        );
        self.local_geometry(sample, ray, intersection, context);
        self.base().apply_to(context);
    }

    /// Point-in-solid test. Surfaces without volume return false.
    fn contains(&self, sample: &Sample, point: Vec3) -> bool;

    /// Bounds over the whole pre-processed time period.
    fn bounding_box(&self) -> Aabb;

    fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::from_aabb(&self.bounding_box())
    }

    fn has_motion(&self) -> bool {
        false
    }

    /// Local to parent transformation at `time`.
    fn local_space(&self, _time: f32) -> Mat4 {
        Mat4::IDENTITY
    }

    /// Surface area. Objects that cannot tell report
    /// [`crate::KernelError::NotSupported`].
    fn area(&self) -> KernelResult<f32>;

    /// Area of the silhouette as seen along `normal`.
    fn projected_area(&self, normal: Vec3) -> KernelResult<f32>;

    fn has_surface_sampling(&self) -> bool {
        false
    }

    /// Uniform point on the surface, pdf per unit area.
    ///
    /// Only valid if [`SceneObject::has_surface_sampling`] is true.
    fn sample_surface(&self, _uv: Vec2) -> SurfaceSample {
        panic!(
            "surface sampling is not supported by {}",
            type_name::<Self>()
        );
    }

    /// Point on the surface as seen from `target`, pdf per unit solid angle.
    fn sample_surface_toward(&self, uv: Vec2, target: Vec3) -> SurfaceSample {
        let mut surface = self.sample_surface(uv);
        surface.pdf = area_to_solid_angle(surface.pdf, surface.point, surface.normal, target);
        surface
    }

    /// As [`SceneObject::sample_surface_toward`], knowing the receiver's normal.
    fn sample_surface_toward_oriented(
        &self,
        uv: Vec2,
        target: Vec3,
        _target_normal: Vec3,
    ) -> SurfaceSample {
        self.sample_surface_toward(uv, target)
    }

    /// Point on the surface seen along `view_direction`, pdf per unit area.
    fn sample_surface_view(&self, uv: Vec2, _view_direction: Vec3) -> SurfaceSample {
        self.sample_surface(uv)
    }

    /// Solid angle density with which [`SceneObject::sample_surface_toward`]
    /// would produce the hit along `ray`. `None` if `ray` misses.
    fn angular_pdf(&self, sample: &Sample, ray: &BoundedRay) -> Option<AngularPdf> {
        let area = match self.area() {
            Ok(area) if area > 0.0 => area,
            _ => return None,
        };
        let mut intersection = Intersection::empty();
        self.intersect(sample, ray, &mut intersection);
        if intersection.is_empty() {
            return None;
        }
        let t = intersection.t();
        let mut context = IntersectionContext::default();
        self.local_context(sample, ray, &intersection, &mut context);

        let cos_theta = context.geometric_normal.dot(ray.direction()).abs();
        if cos_theta <= 0.0 {
            return None;
        }
        Some(AngularPdf {
            pdf: t * t / (area * cos_theta),
            shadow_ray: ray.bounded(ray.near_limit(), (1.0 - TOLERANCE) * t),
            normal: context.geometric_normal,
        })
    }

    fn as_light(&self) -> Option<&dyn Light> {
        None
    }

    /// Builder helper: assign a shader.
    fn with_shader(mut self, shader: Arc<dyn Shader>) -> Self
    where
        Self: Sized,
    {
        self.base_mut().set_shader(Some(shader));
        self
    }

    /// Builder helper: assign an interior medium.
    fn with_interior(mut self, interior: Arc<dyn Medium>) -> Self
    where
        Self: Sized,
    {
        self.base_mut().set_interior(Some(interior));
        self
    }
}

/// Visit every node below `root` in pre-order, shared nodes once per parent.
pub fn for_all_objects<F>(root: &SceneObjectRef, mut visit: F)
where
    F: FnMut(&SceneObjectRef),
{
    fn walk<F: FnMut(&SceneObjectRef)>(object: &SceneObjectRef, visit: &mut F) {
        visit(object);
        for child in object.children() {
            walk(child, visit);
        }
    }
    walk(root, &mut visit);
}

/// Visit each distinct node below `root` once, in pre-order.
pub fn for_unique_objects<F>(root: &SceneObjectRef, mut visit: F)
where
    F: FnMut(&SceneObjectRef),
{
    fn walk<F: FnMut(&SceneObjectRef)>(
        object: &SceneObjectRef,
        seen: &mut HashSet<usize>,
        visit: &mut F,
    ) {
        let address = Arc::as_ptr(object).cast::<()>() as usize;
        if !seen.insert(address) {
            return;
        }
        visit(object);
        for child in object.children() {
            walk(child, seen, visit);
        }
    }
    walk(root, &mut HashSet::new(), &mut visit);
}

/// All distinct nodes below `root` that are lights.
pub fn collect_lights(root: &SceneObjectRef) -> Vec<SceneObjectRef> {
    let mut lights = Vec::new();
    for_unique_objects(root, |object| {
        if object.as_light().is_some() {
            lights.push(Arc::clone(object));
        }
    });
    log::info!("Collected {} light(s) from the scene", lights.len());
    lights
}
