//! Transform observer bridge: typed before/after mutation notifications.
//!
//! Every [`crate::geometry::Rect`] mutation fires, in order: `before`
//! (observers may snapshot prior state), the mutation itself, `after`, and a
//! catch-all `changed` used to mark the owning node's vertex polygon stale.
//! Observers are typed registrants dispatched through one enum-keyed
//! channel — there is no string lookup and no ambient registry. Reactions
//! that must outlive the borrow (dirty flags, size bookkeeping) share state
//! with their node through `Rc<Cell<_>>` slots.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use std::cell::Cell;
use std::rc::Rc;

use crate::geometry::{Rect, Size};

/// Which mutation a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Position,
    AddPosition,
    Angle,
    Size,
    Scale,
    Drag,
}

/// Where in the mutation bracket a notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformPhase {
    /// Prior state still readable; the mutation has not been applied.
    Before,
    /// The mutation has been applied.
    After,
    /// Catch-all after `After`, regardless of kind.
    Changed,
}

/// A registered reaction to rect mutations.
pub trait RectObserver {
    fn on_transform(&mut self, phase: TransformPhase, kind: TransformKind, rect: &Rect);
}

/// Per-rect observer registry. Notification order is registration order.
#[derive(Default)]
pub struct Observers {
    entries: Vec<Box<dyn RectObserver>>,
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("len", &self.entries.len()).finish()
    }
}

impl Observers {
    pub fn register(&mut self, observer: Box<dyn RectObserver>) {
        self.entries.push(observer);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn notify_before(&mut self, kind: TransformKind, rect: &Rect) {
        self.notify(TransformPhase::Before, kind, rect);
    }

    pub fn notify_after(&mut self, kind: TransformKind, rect: &Rect) {
        self.notify(TransformPhase::After, kind, rect);
    }

    pub fn notify_changed(&mut self, kind: TransformKind, rect: &Rect) {
        self.notify(TransformPhase::Changed, kind, rect);
    }

    fn notify(&mut self, phase: TransformPhase, kind: TransformKind, rect: &Rect) {
        for entry in &mut self.entries {
            entry.on_transform(phase, kind, rect);
        }
    }
}

/// Marks a shared flag on every `changed` notification. The owning node
/// clears the flag when it re-vertexes before the next render or hit-test.
pub struct DirtyFlag {
    slot: Rc<Cell<bool>>,
}

impl DirtyFlag {
    #[must_use]
    pub fn new(slot: Rc<Cell<bool>>) -> Self {
        Self { slot }
    }
}

impl RectObserver for DirtyFlag {
    fn on_transform(&mut self, phase: TransformPhase, _kind: TransformKind, _rect: &Rect) {
        if phase == TransformPhase::Changed {
            self.slot.set(true);
        }
    }
}

/// Tracks the base (pre-scale) size across `Size` mutations, so the node's
/// fixed-size snapshot stays current without the node observing directly.
pub struct FixedSizeTracker {
    slot: Rc<Cell<Size>>,
}

impl FixedSizeTracker {
    #[must_use]
    pub fn new(slot: Rc<Cell<Size>>) -> Self {
        Self { slot }
    }
}

impl RectObserver for FixedSizeTracker {
    fn on_transform(&mut self, phase: TransformPhase, kind: TransformKind, rect: &Rect) {
        if phase == TransformPhase::After && kind == TransformKind::Size {
            self.slot.set(rect.size());
        }
    }
}

/// Flags the owning node's render cache stale on base-size mutations. The
/// cache stores pre-transform content, so position, angle, and scale leave
/// it valid; only a `Size` change makes the stored pixels wrong.
pub struct CacheInvalidator {
    slot: Rc<Cell<bool>>,
}

impl CacheInvalidator {
    #[must_use]
    pub fn new(slot: Rc<Cell<bool>>) -> Self {
        Self { slot }
    }
}

impl RectObserver for CacheInvalidator {
    fn on_transform(&mut self, phase: TransformPhase, kind: TransformKind, _rect: &Rect) {
        if phase == TransformPhase::Changed && kind == TransformKind::Size {
            self.slot.set(true);
        }
    }
}
