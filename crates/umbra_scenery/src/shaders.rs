//! Basic surface shaders.

use std::f32::consts::FRAC_1_PI;
use umbra_kernel::{
    Bsdf, BsdfCaps, BsdfFrame, BsdfOut, IntersectionContext, Sample, SampleBsdfOut, Shader,
    Spectral,
};
use umbra_math::sampling::cosine_hemisphere;
use umbra_math::{Vec2, Vec3};

/// Ideal diffuse reflector.
#[derive(Debug, Clone, Copy)]
pub struct Lambert {
    pub reflectance: Spectral,
}

impl Lambert {
    pub fn new(reflectance: Spectral) -> Self {
        Self { reflectance }
    }
}

impl Shader for Lambert {
    fn bsdf(&self, _sample: &Sample, context: &IntersectionContext) -> Box<dyn Bsdf> {
        Box::new(LambertBsdf {
            frame: BsdfFrame::new(context),
            reflectance: self.reflectance,
        })
    }
}

struct LambertBsdf {
    frame: BsdfFrame,
    reflectance: Spectral,
}

impl Bsdf for LambertBsdf {
    fn caps(&self) -> BsdfCaps {
        BsdfCaps::REFLECTION | BsdfCaps::DIFFUSE
    }

    fn frame(&self) -> &BsdfFrame {
        &self.frame
    }

    fn evaluate_lobes(&self, omega_in: Vec3, omega_out: Vec3, _allowed: BsdfCaps) -> BsdfOut {
        if omega_in.z * omega_out.z <= 0.0 {
            return BsdfOut::default();
        }
        BsdfOut::new(
            self.reflectance * FRAC_1_PI,
            omega_out.z.abs() * FRAC_1_PI,
        )
    }

    fn sample_lobes(
        &self,
        omega_in: Vec3,
        uv: Vec2,
        _component: f32,
        _allowed: BsdfCaps,
    ) -> SampleBsdfOut {
        let (mut omega_out, pdf) = cosine_hemisphere(uv);
        // stay on the viewer's side
        if omega_in.z < 0.0 {
            omega_out.z = -omega_out.z;
        }
        SampleBsdfOut {
            omega_out,
            value: self.reflectance * FRAC_1_PI,
            pdf,
            used_caps: self.caps(),
        }
    }
}

/// Perfect specular reflector.
#[derive(Debug, Clone, Copy)]
pub struct Mirror {
    pub reflectance: Spectral,
}

impl Mirror {
    pub fn new(reflectance: Spectral) -> Self {
        Self { reflectance }
    }
}

impl Shader for Mirror {
    fn bsdf(&self, _sample: &Sample, context: &IntersectionContext) -> Box<dyn Bsdf> {
        Box::new(MirrorBsdf {
            frame: BsdfFrame::new(context),
            reflectance: self.reflectance,
        })
    }
}

struct MirrorBsdf {
    frame: BsdfFrame,
    reflectance: Spectral,
}

impl Bsdf for MirrorBsdf {
    fn caps(&self) -> BsdfCaps {
        BsdfCaps::REFLECTION | BsdfCaps::SPECULAR
    }

    fn frame(&self) -> &BsdfFrame {
        &self.frame
    }

    /// A delta lobe has no value for any given pair of directions.
    fn evaluate_lobes(&self, _omega_in: Vec3, _omega_out: Vec3, _allowed: BsdfCaps) -> BsdfOut {
        BsdfOut::default()
    }

    fn sample_lobes(
        &self,
        omega_in: Vec3,
        _uv: Vec2,
        _component: f32,
        _allowed: BsdfCaps,
    ) -> SampleBsdfOut {
        let cos_theta = omega_in.z.abs();
        if cos_theta <= 0.0 {
            return SampleBsdfOut::default();
        }
        SampleBsdfOut {
            omega_out: Vec3::new(-omega_in.x, -omega_in.y, omega_in.z),
            value: self.reflectance / cos_theta,
            pdf: 1.0,
            used_caps: self.caps(),
        }
    }
}
