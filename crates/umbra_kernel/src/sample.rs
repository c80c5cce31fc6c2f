//! Per-ray sample state and frame time windows.

use serde::{Deserialize, Serialize};

/// What a single camera sample carries down into scene queries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    /// Shutter time of the ray, used by moving objects.
    pub time: f32,
}

impl Sample {
    pub fn at_time(time: f32) -> Self {
        Self { time }
    }
}

/// Shutter interval of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimePeriod {
    pub begin: f32,
    pub end: f32,
}

impl TimePeriod {
    pub fn new(begin: f32, end: f32) -> Self {
        Self { begin, end }
    }

    /// A zero length period, for still frames.
    pub fn instant(time: f32) -> Self {
        Self::new(time, time)
    }

    pub fn duration(&self) -> f32 {
        self.end - self.begin
    }

    /// Time at fraction `u` of the period.
    pub fn interpolate(&self, u: f32) -> f32 {
        self.begin + u * self.duration()
    }
}
