//! The stack of hit records produced by a ray query.
//!
//! A leaf object that is hit pushes one level. Every composite or wrapper on
//! the way back up pushes itself on top, so bottom to top reads leaf to root.
//! Resolving local geometry walks the other way: the root sees the top level,
//! and each wrapper lowers the cursor with an [`IntersectionDescendor`] before
//! handing the same intersection to its child.

use crate::SceneObject;
use std::cell::Cell;
use std::fmt;

/// Whether a ray enters or leaves a solid at a surface crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SolidEvent {
    #[default]
    NoEvent,
    Entering,
    Leaving,
}

impl SolidEvent {
    /// Swap entering and leaving, used when a wrapper inverts orientation.
    pub fn flip(self) -> Self {
        match self {
            SolidEvent::NoEvent => SolidEvent::NoEvent,
            SolidEvent::Entering => SolidEvent::Leaving,
            SolidEvent::Leaving => SolidEvent::Entering,
        }
    }

    /// Dense index, for lookup tables.
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy)]
struct Level<'a> {
    object: &'a dyn SceneObject,
    t: f32,
    aux: u32,
}

/// Result of [`SceneObject::intersect`].
///
/// Objects are borrowed from the scene graph for `'a`; an intersection never
/// keeps them alive.
pub struct Intersection<'a> {
    levels: Vec<Level<'a>>,
    current: Cell<usize>,
    solid_event: SolidEvent,
}

impl<'a> Intersection<'a> {
    /// No hit. Does not allocate.
    pub const fn empty() -> Self {
        Self {
            levels: Vec::new(),
            current: Cell::new(0),
            solid_event: SolidEvent::NoEvent,
        }
    }

    /// Push a level with a zero auxiliary field.
    pub fn push(&mut self, object: &'a dyn SceneObject, t: f32) {
        self.push_aux(object, t, 0);
    }

    /// Push a level and make it current.
    ///
    /// `aux` is free for the object's own use, e.g. which sub-primitive was hit.
    pub fn push_aux(&mut self, object: &'a dyn SceneObject, t: f32, aux: u32) {
        debug_assert!(
            t > 0.0 && t.is_finite(),
            "intersection parameter must be positive and finite, got {t}"
        );
        self.levels.push(Level { object, t, aux });
        self.current.set(self.levels.len() - 1);
    }

    fn current_level(&self) -> &Level<'a> {
        debug_assert!(!self.is_empty(), "reading an empty intersection");
        &self.levels[self.current.get()]
    }

    /// Object at the current level.
    pub fn object(&self) -> &'a dyn SceneObject {
        self.current_level().object
    }

    /// Hit parameter at the current level, `+inf` when there is no hit.
    pub fn t(&self) -> f32 {
        if self.is_empty() {
            return f32::INFINITY;
        }
        self.current_level().t
    }

    pub fn aux(&self) -> u32 {
        self.current_level().aux
    }

    /// Index of the current level.
    pub fn level(&self) -> usize {
        self.current.get()
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// True if the current level refers to `object`, compared by address.
    pub fn is_object<T: ?Sized>(&self, object: &T) -> bool {
        !self.is_empty()
            && std::ptr::from_ref(self.object()).cast::<()>()
                == std::ptr::from_ref(object).cast::<()>()
    }

    pub fn solid_event(&self) -> SolidEvent {
        self.solid_event
    }

    pub fn set_solid_event(&mut self, event: SolidEvent) {
        self.solid_event = event;
    }

    pub fn flip_solid_event(&mut self) {
        self.solid_event = self.solid_event.flip();
    }

    /// Forget all levels and the solid event, keeping the allocation.
    pub fn clear(&mut self) {
        self.levels.clear();
        self.current.set(0);
        self.solid_event = SolidEvent::NoEvent;
    }

    /// Exchange the complete state with `other` without copying levels.
    pub fn swap(&mut self, other: &mut Intersection<'a>) {
        std::mem::swap(self, other);
    }

    /// Shorthand for [`IntersectionDescendor::new`].
    pub fn descend(&self) -> IntersectionDescendor<'_, 'a> {
        IntersectionDescendor::new(self)
    }
}

impl Default for Intersection<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Intersection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts: Vec<f32> = self.levels.iter().map(|level| level.t).collect();
        f.debug_struct("Intersection")
            .field("t", &ts)
            .field("level", &self.current.get())
            .field("solid_event", &self.solid_event)
            .finish()
    }
}

/// Scope guard that lowers the current level of an intersection by one.
///
/// The level is restored when the guard drops. Guards must be dropped in
/// reverse order of creation, which lexical scoping gives for free.
#[must_use = "the level is restored as soon as the descendor is dropped"]
pub struct IntersectionDescendor<'i, 'a> {
    intersection: &'i Intersection<'a>,
}

impl<'i, 'a> IntersectionDescendor<'i, 'a> {
    pub fn new(intersection: &'i Intersection<'a>) -> Self {
        let level = intersection.current.get();
        assert!(level > 0, "cannot descend below the bottom level of an intersection");
        intersection.current.set(level - 1);
        Self { intersection }
    }
}

impl Drop for IntersectionDescendor<'_, '_> {
    fn drop(&mut self) {
        let cursor = &self.intersection.current;
        cursor.set(cursor.get() + 1);
    }
}
