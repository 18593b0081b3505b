//! Geometry core: vectors, sizes, and the oriented rectangle every scene
//! node manipulates.
//!
//! `Rect` is the single mutable geometry record behind a node: center
//! position, base size, rotation angle, and a committed/transient scale
//! pair. Every mutation runs through the transform-observer bridge (see
//! [`crate::transform`]) so dependents — dirty flags, size bookkeeping —
//! react without `Rect` knowing about them. The derived vertex polygon is
//! cached and only valid after an explicit [`Rect::update_vertices`] call;
//! the controller refreshes it before any hit-test.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::consts::{SCALE_MAX, SCALE_MIN};
use crate::transform::{Observers, RectObserver, TransformKind};

/// A point or displacement in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise scale by a scalar factor.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self { x: self.x * factor, y: self.y * factor }
    }

    /// Euclidean length of this vector.
    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).magnitude()
    }

    /// Direction of this vector in radians, via `atan2(y, x)`.
    #[must_use]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// This vector rotated by `radians` about the origin.
    #[must_use]
    pub fn rotated(self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

/// Width/height pair in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions multiplied by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self { width: self.width * factor, height: self.height * factor }
    }
}

/// Inclusive bounds for a node's cumulative scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self { min: SCALE_MIN, max: SCALE_MAX }
    }
}

/// Oriented rectangle: the geometry record behind every scene node.
///
/// `position` is the center. `scale` is the committed factor; `delta_scale`
/// is the transient factor accumulated during an in-progress gesture and
/// folded in by [`Rect::commit_scale`]. The cached vertex polygon is stale
/// after any mutation until [`Rect::update_vertices`] runs.
pub struct Rect {
    position: Vector,
    size: Size,
    angle: f64,
    scale: f64,
    delta_scale: f64,
    vertices: [Vector; 4],
    observers: Observers,
}

impl std::fmt::Debug for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rect")
            .field("position", &self.position)
            .field("size", &self.size)
            .field("angle", &self.angle)
            .field("scale", &self.scale)
            .field("delta_scale", &self.delta_scale)
            .finish_non_exhaustive()
    }
}

impl Clone for Rect {
    /// Independent geometry clone. Observers are not carried over; the
    /// clone starts with an empty registry.
    fn clone(&self) -> Self {
        Self {
            position: self.position,
            size: self.size,
            angle: self.angle,
            scale: self.scale,
            delta_scale: self.delta_scale,
            vertices: self.vertices,
            observers: Observers::default(),
        }
    }
}

impl Rect {
    #[must_use]
    pub fn new(position: Vector, size: Size) -> Self {
        Self {
            position,
            size,
            angle: 0.0,
            scale: 1.0,
            delta_scale: 1.0,
            vertices: [Vector::ZERO; 4],
            observers: Observers::default(),
        }
    }

    // --- Accessors ---

    #[must_use]
    pub fn position(&self) -> Vector {
        self.position
    }

    /// Base (pre-scale) size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Rotation in radians about the center.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Committed scale factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Transient scale factor of the in-progress gesture.
    #[must_use]
    pub fn delta_scale(&self) -> f64 {
        self.delta_scale
    }

    /// Committed × transient scale.
    #[must_use]
    pub fn total_scale(&self) -> f64 {
        self.scale * self.delta_scale
    }

    /// Size with the full scale applied.
    #[must_use]
    pub fn scaled_size(&self) -> Size {
        self.size.scaled(self.total_scale())
    }

    /// Half-extents of the scaled size, as a vector.
    #[must_use]
    pub fn half_extents(&self) -> Vector {
        let scaled = self.scaled_size();
        Vector::new(scaled.width / 2.0, scaled.height / 2.0)
    }

    /// The cached corner polygon, ordered `[nw, ne, se, sw]` in the local
    /// frame. Only valid after [`Rect::update_vertices`].
    #[must_use]
    pub fn vertices(&self) -> &[Vector; 4] {
        &self.vertices
    }

    // --- Observation ---

    /// Register a mutation observer. Observers fire on every subsequent
    /// mutation, in registration order.
    pub fn observe(&mut self, observer: Box<dyn RectObserver>) {
        self.observers.register(observer);
    }

    // --- Mutators ---

    pub fn set_position(&mut self, position: Vector) {
        self.with_events(TransformKind::Position, |rect| rect.position = position);
    }

    pub fn add_position(&mut self, delta: Vector) {
        self.with_events(TransformKind::AddPosition, |rect| {
            rect.position = rect.position + delta;
        });
    }

    /// Translate as part of a drag gesture. Same effect as
    /// [`Rect::add_position`] but tagged `Drag` for observers.
    pub fn drag_by(&mut self, delta: Vector) {
        self.with_events(TransformKind::Drag, |rect| {
            rect.position = rect.position + delta;
        });
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.with_events(TransformKind::Angle, |rect| rect.angle = angle);
    }

    pub fn set_size(&mut self, size: Size) {
        self.with_events(TransformKind::Size, |rect| rect.size = size);
    }

    /// Multiply the transient scale by `delta`, clamping the cumulative
    /// (committed × transient) factor into `limits`. Out-of-range requests
    /// clamp; they never error.
    pub fn set_delta_scale(&mut self, delta: f64, limits: ScaleLimits) {
        self.with_events(TransformKind::Scale, |rect| {
            let requested = rect.scale * rect.delta_scale * delta;
            let clamped = requested.clamp(limits.min, limits.max);
            rect.delta_scale = clamped / rect.scale;
        });
    }

    /// Fold the transient scale into the committed scale at gesture end.
    pub fn commit_scale(&mut self) {
        if (self.delta_scale - 1.0).abs() < f64::EPSILON {
            return;
        }
        self.with_events(TransformKind::Scale, |rect| {
            rect.scale *= rect.delta_scale;
            rect.delta_scale = 1.0;
        });
    }

    /// Recompute the corner polygon from center, scaled half-extents, and
    /// angle. Must run after any mutation and before any hit-test.
    pub fn update_vertices(&mut self) {
        let half = self.half_extents();
        let corners = [
            Vector::new(-half.x, -half.y),
            Vector::new(half.x, -half.y),
            Vector::new(half.x, half.y),
            Vector::new(-half.x, half.y),
        ];
        for (slot, corner) in self.vertices.iter_mut().zip(corners) {
            *slot = self.position + corner.rotated(self.angle);
        }
    }

    /// Run a mutation inside its before/after/changed notification bracket.
    fn with_events(&mut self, kind: TransformKind, apply: impl FnOnce(&mut Self)) {
        let mut observers = std::mem::take(&mut self.observers);
        observers.notify_before(kind, self);
        apply(self);
        observers.notify_after(kind, self);
        observers.notify_changed(kind, self);
        self.observers = observers;
    }
}
