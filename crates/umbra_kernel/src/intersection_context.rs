//! Differential geometry at a resolved hit point.

use crate::{Medium, Sample, Shader, SolidEvent};
use std::fmt;
use std::sync::Arc;
use umbra_math::{Mat4, Mat4Ext, ShadingFrame, Vec2, Vec3};

/// Local geometry filled in by [`crate::SceneObject::local_context`].
///
/// Leaves write it in their own frame; each wrapper on the way out carries
/// it into its parent's frame.
#[derive(Clone, Default)]
pub struct IntersectionContext {
    pub point: Vec3,
    pub t: f32,
    pub uv: Vec2,
    pub dpdu: Vec3,
    pub dpdv: Vec3,
    pub geometric_normal: Vec3,
    /// Shading normal, equal to the geometric normal unless a shader bends it.
    pub normal: Vec3,
    pub dndu: Vec3,
    pub dndv: Vec3,
    pub shader: Option<Arc<dyn Shader>>,
    pub interior: Option<Arc<dyn Medium>>,
    pub solid_event: SolidEvent,
}

impl IntersectionContext {
    /// Set both normals at once.
    pub fn set_normal(&mut self, normal: Vec3) {
        self.geometric_normal = normal;
        self.normal = normal;
    }

    /// Carry the context from local into world space.
    pub fn transform_by(&mut self, local_to_world: &Mat4) {
        let normal_matrix = local_to_world.normal_matrix();
        self.point = local_to_world.transform_point3(self.point);
        self.dpdu = local_to_world.transform_vector3(self.dpdu);
        self.dpdv = local_to_world.transform_vector3(self.dpdv);
        self.geometric_normal = normal_matrix
            .transform_vector3(self.geometric_normal)
            .normalize_or_zero();
        self.normal = normal_matrix.transform_vector3(self.normal).normalize_or_zero();
        self.dndu = normal_matrix.transform_vector3(self.dndu);
        self.dndv = normal_matrix.transform_vector3(self.dndv);
    }

    pub fn translate_by(&mut self, offset: Vec3) {
        self.point += offset;
    }

    /// Turn the surface inside out.
    pub fn flip_normal(&mut self) {
        self.geometric_normal = -self.geometric_normal;
        self.normal = -self.normal;
        self.dndu = -self.dndu;
        self.dndv = -self.dndv;
    }

    /// Frame used by BSDFs, aligned with the shading normal and `dpdu`.
    pub fn shading_frame(&self) -> ShadingFrame {
        ShadingFrame::from_normal_tangent(self.normal, self.dpdu)
    }

    /// Ask the assigned shader for a BSDF, if there is a shader.
    pub fn bsdf(&self, sample: &Sample) -> Option<Box<dyn crate::Bsdf>> {
        self.shader.as_ref().map(|shader| shader.bsdf(sample, self))
    }
}

impl fmt::Debug for IntersectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntersectionContext")
            .field("point", &self.point)
            .field("t", &self.t)
            .field("uv", &self.uv)
            .field("normal", &self.normal)
            .field("geometric_normal", &self.geometric_normal)
            .field("has_shader", &self.shader.is_some())
            .field("has_interior", &self.interior.is_some())
            .field("solid_event", &self.solid_event)
            .finish()
    }
}
