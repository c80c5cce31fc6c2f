//! Shader and BSDF contracts.
//!
//! BSDFs work in a local frame whose z axis is the shading normal. The
//! estimator only relies on the sampling contract spelled out here.

use crate::spectral::{is_black, Spectral};
use crate::{IntersectionContext, Sample};
use bitflags::bitflags;
use umbra_math::{ShadingFrame, Vec2, Vec3};

bitflags! {
    /// Scattering lobes a BSDF has, or that a caller allows.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BsdfCaps: u32 {
        const EMISSION     = 0b0000_0001;
        const REFLECTION   = 0b0000_0010;
        const TRANSMISSION = 0b0000_0100;

        const DIFFUSE      = 0b0001_0000;
        const SPECULAR     = 0b0010_0000;
        const GLOSSY       = 0b0100_0000;

        const NON_DIFFUSE  = Self::GLOSSY.bits() | Self::SPECULAR.bits();
        const ALL_DIFFUSE  = Self::REFLECTION.bits() | Self::TRANSMISSION.bits() | Self::DIFFUSE.bits();
        const ALL_SPECULAR = Self::REFLECTION.bits() | Self::TRANSMISSION.bits() | Self::SPECULAR.bits();
        const ALL_GLOSSY   = Self::REFLECTION.bits() | Self::TRANSMISSION.bits() | Self::GLOSSY.bits();
    }
}

impl BsdfCaps {
    /// True if `self` and `allowed` share both a direction (reflection or
    /// transmission) and a lobe kind (diffuse, glossy or specular).
    pub fn compatible(self, allowed: BsdfCaps) -> bool {
        let overlap = (self & allowed).bits();
        (overlap & 0x0f) != 0 && (overlap & 0xf0) != 0
    }
}

/// Value and pdf of a BSDF for a pair of directions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BsdfOut {
    pub value: Spectral,
    pub pdf: f32,
}

impl BsdfOut {
    pub fn new(value: Spectral, pdf: f32) -> Self {
        Self { value, pdf }
    }

    /// Usable only with a positive pdf and a nonzero value.
    pub fn is_valid(&self) -> bool {
        self.pdf > 0.0 && !is_black(self.value)
    }
}

/// A direction drawn from a BSDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleBsdfOut {
    pub omega_out: Vec3,
    pub value: Spectral,
    pub pdf: f32,
    pub used_caps: BsdfCaps,
}

impl Default for SampleBsdfOut {
    fn default() -> Self {
        Self {
            omega_out: Vec3::ZERO,
            value: Spectral::ZERO,
            pdf: 0.0,
            used_caps: BsdfCaps::empty(),
        }
    }
}

impl SampleBsdfOut {
    pub fn is_valid(&self) -> bool {
        self.pdf > 0.0 && !is_black(self.value)
    }
}

/// Frame shared by every BSDF: the shading frame plus the geometric normal
/// expressed in it.
#[derive(Debug, Clone, Copy)]
pub struct BsdfFrame {
    shading: ShadingFrame,
    geometric_normal: Vec3,
}

impl BsdfFrame {
    pub fn new(context: &IntersectionContext) -> Self {
        let shading = context.shading_frame();
        let geometric_normal = shading.to_local(context.geometric_normal);
        Self {
            shading,
            geometric_normal,
        }
    }

    pub fn to_local(&self, v: Vec3) -> Vec3 {
        self.shading.to_local(v)
    }

    pub fn to_world(&self, v: Vec3) -> Vec3 {
        self.shading.to_world(v)
    }

    /// True if both local directions lie on the same side of the geometric surface.
    pub fn is_reflection(&self, omega_in: Vec3, omega_out: Vec3) -> bool {
        (omega_in.dot(self.geometric_normal) > 0.0) == (omega_out.dot(self.geometric_normal) > 0.0)
    }
}

/// Scattering function bound to one shading point.
///
/// Implementors provide the lobes; the provided [`Bsdf::evaluate`] and
/// [`Bsdf::sample`] filter requests against the BSDF's caps first.
pub trait Bsdf {
    fn caps(&self) -> BsdfCaps;

    fn frame(&self) -> &BsdfFrame;

    /// Evaluate lobes in `allowed`. Directions are local and normalized.
    fn evaluate_lobes(&self, omega_in: Vec3, omega_out: Vec3, allowed: BsdfCaps) -> BsdfOut;

    /// Draw a direction from lobes in `allowed`, picking a lobe with `component`.
    fn sample_lobes(
        &self,
        omega_in: Vec3,
        uv: Vec2,
        component: f32,
        allowed: BsdfCaps,
    ) -> SampleBsdfOut;

    /// Shadow-only BSDFs subtract light where the point is occluded.
    fn is_shadow_only(&self) -> bool {
        false
    }

    fn evaluate(&self, omega_in: Vec3, omega_out: Vec3, allowed: BsdfCaps) -> BsdfOut {
        let mut allowed = allowed;
        if self.frame().is_reflection(omega_in, omega_out) {
            allowed.remove(BsdfCaps::TRANSMISSION);
        } else {
            allowed.remove(BsdfCaps::REFLECTION);
        }
        if !self.caps().compatible(allowed) {
            return BsdfOut::default();
        }
        self.evaluate_lobes(omega_in, omega_out, allowed)
    }

    fn sample(&self, omega_in: Vec3, uv: Vec2, component: f32, allowed: BsdfCaps) -> SampleBsdfOut {
        if !self.caps().compatible(allowed) {
            return SampleBsdfOut::default();
        }
        self.sample_lobes(omega_in, uv, component, allowed)
    }

    fn world_to_bsdf(&self, v: Vec3) -> Vec3 {
        self.frame().to_local(v)
    }

    fn bsdf_to_world(&self, v: Vec3) -> Vec3 {
        self.frame().to_world(v)
    }
}

/// Assigns a BSDF to surfaces.
pub trait Shader: Send + Sync {
    fn bsdf(&self, sample: &Sample, context: &IntersectionContext) -> Box<dyn Bsdf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_compatible_needs_direction_and_lobe() {
        let lambert = BsdfCaps::REFLECTION | BsdfCaps::DIFFUSE;
        assert!(lambert.compatible(BsdfCaps::ALL_DIFFUSE));
        assert!(lambert.compatible(BsdfCaps::ALL_DIFFUSE | BsdfCaps::GLOSSY));
        assert!(!lambert.compatible(BsdfCaps::ALL_SPECULAR));
        assert!(!lambert.compatible(BsdfCaps::DIFFUSE));
        assert!(!lambert.compatible(BsdfCaps::TRANSMISSION | BsdfCaps::DIFFUSE));
    }

    #[test]
    fn test_bsdf_out_validity() {
        assert!(BsdfOut::new(Spectral::ONE, 0.5).is_valid());
        assert!(!BsdfOut::new(Spectral::ONE, 0.0).is_valid());
        assert!(!BsdfOut::new(Spectral::ZERO, 1.0).is_valid());
        assert!(!SampleBsdfOut::default().is_valid());
    }

    #[test]
    fn test_bsdf_frame_reflection_side() {
        let context = IntersectionContext {
            dpdu: Vec3::X,
            geometric_normal: Vec3::Y,
            normal: Vec3::Y,
            ..Default::default()
        };
        let frame = BsdfFrame::new(&context);
        let up = frame.to_local(Vec3::new(0.3, 1.0, 0.0).normalize());
        let down = frame.to_local(Vec3::new(0.3, -1.0, 0.0).normalize());
        assert!(frame.is_reflection(up, up));
        assert!(!frame.is_reflection(up, down));
    }
}
