//! Participating media along shadow rays.

use crate::spectral::Spectral;
use crate::Sample;
use umbra_math::BoundedRay;

pub trait Medium: Send + Sync {
    /// Fraction of radiance surviving the valid range of `ray`.
    fn transmittance(&self, sample: &Sample, ray: &BoundedRay) -> Spectral;
}

/// Empty space.
#[derive(Debug, Default, Clone, Copy)]
pub struct Vacuum;

impl Medium for Vacuum {
    fn transmittance(&self, _sample: &Sample, _ray: &BoundedRay) -> Spectral {
        Spectral::ONE
    }
}

/// Homogeneous absorbing medium following Beer's law.
#[derive(Debug, Clone, Copy)]
pub struct Beer {
    absorption: Spectral,
}

impl Beer {
    pub fn new(absorption: Spectral) -> Self {
        Self {
            absorption: absorption.max(Spectral::ZERO),
        }
    }
}

impl Medium for Beer {
    fn transmittance(&self, _sample: &Sample, ray: &BoundedRay) -> Spectral {
        let distance = (ray.far_limit() - ray.near_limit()).max(0.0);
        // zero absorption stays transparent even over infinite distances
        let channel = |sigma: f32| {
            if sigma == 0.0 {
                1.0
            } else {
                (-sigma * distance).exp()
            }
        };
        Spectral::new(
            channel(self.absorption.x),
            channel(self.absorption.y),
            channel(self.absorption.z),
        )
    }
}
