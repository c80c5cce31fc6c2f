/// A closed range of ray parameters or coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Negative for empty intervals.
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// True if nothing lies inside (min > max).
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Inclusive.
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Exclusive of both ends.
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    pub fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.min, self.max)
    }

    /// Smallest interval holding both.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }

    /// Overlap of both, empty when they are disjoint.
    pub fn overlap(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.max(b.min), a.max.min(b.max))
    }

    /// Identity of `surrounding`.
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    /// Every parameter a ray can take.
    pub const POSITIVE: Interval = Interval {
        min: 0.0,
        max: f32::INFINITY,
    };
}
