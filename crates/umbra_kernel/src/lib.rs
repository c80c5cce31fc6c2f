//! Umbra kernel - intersection model and direct lighting
//!
//! The pieces every scene node and tracer agrees on: the intersection
//! stack, the `SceneObject` contract, shader/light/medium interfaces, the
//! generic acceleration tree and the MIS direct-lighting estimator.
//! Concrete objects live in `umbra_scenery`.

pub mod accel;
mod direct_lighting;
mod error;
mod intersection;
mod intersection_context;
mod light;
mod medium;
pub mod mis;
mod sample;
mod scene_object;
mod shader;
pub mod spectral;

#[cfg(test)]
mod testing;

pub use direct_lighting::{DirectLighting, DirectLightingSettings, LightSamples, ShadingPoint};
pub use error::{KernelError, KernelResult};
pub use intersection::{Intersection, IntersectionDescendor, SolidEvent};
pub use intersection_context::IntersectionContext;
pub use light::{Light, LightSample};
pub use medium::{Beer, Medium, Vacuum};
pub use sample::{Sample, TimePeriod};
pub use scene_object::{
    area_to_solid_angle, collect_lights, for_all_objects, for_unique_objects, AngularPdf,
    ObjectBase, SceneObject, SceneObjectRef, SurfaceSample,
};
pub use shader::{Bsdf, BsdfCaps, BsdfFrame, BsdfOut, SampleBsdfOut, Shader};
pub use spectral::Spectral;
