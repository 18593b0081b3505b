//! Manipulation handles: satellite controls anchored to a node's rect.
//!
//! A handle binds to its owner by alignment: at anchor time it resolves the
//! alignment into a relative offset against the owner's half-extents and
//! records the offset's magnitude and angle once, so attachment stays rigid
//! under rotation. Handles are plain data behind a kind tag — the effect a
//! drag has on the owner (move-scale, directional resize, rotate, lock) is
//! selected by [`HandleKind`], not by a dispatch chain.

#[cfg(test)]
#[path = "handle_test.rs"]
mod handle_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{
    HANDLE_RADIUS, MIN_GESTURE_MAGNITUDE, ROTATE_HANDLE_OFFSET, ROTATION_SNAP_STEP,
    ROTATION_SNAP_TOLERANCE, SELECTION_COLOR,
};
use crate::geometry::{Rect, ScaleLimits, Vector};

/// Unique identifier for a handle.
pub type HandleId = Uuid;

/// Anchor position relative to the owner's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
    Center,
}

impl Alignment {
    /// Unit direction from the owner's center toward this anchor. Each
    /// component is −1, 0, or 1; this doubles as the per-anchor sign/zero
    /// mask for directional resize (top-left negates both axes,
    /// right-center zeroes the vertical component).
    #[must_use]
    pub fn unit(self) -> Vector {
        match self {
            Self::N => Vector::new(0.0, -1.0),
            Self::Ne => Vector::new(1.0, -1.0),
            Self::E => Vector::new(1.0, 0.0),
            Self::Se => Vector::new(1.0, 1.0),
            Self::S => Vector::new(0.0, 1.0),
            Self::Sw => Vector::new(-1.0, 1.0),
            Self::W => Vector::new(-1.0, 0.0),
            Self::Nw => Vector::new(-1.0, -1.0),
            Self::Center => Vector::ZERO,
        }
    }
}

/// How a handle fires its effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Fires once on pointer-down.
    Click,
    /// Fires on every drag update.
    Drag,
}

/// What dragging (or clicking) this handle does to the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
    /// Uniform scale from the pointer-to-center magnitude ratio, optionally
    /// rotating the owner to follow the pointer.
    Move { rotates: bool },
    /// Same magnitude-ratio scale, with a position offset so the anchor's
    /// opposite edge stays fixed.
    Resize(Alignment),
    /// Writes `atan2(offset) − initial_angle` to the owner's rotation,
    /// snapped near 45° increments.
    Rotate,
    /// Click toggle of the owner's lock flag.
    Lock,
}

/// Fill/stroke colors for drawing a handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleStyle {
    pub fill: String,
    pub stroke: String,
}

impl Default for HandleStyle {
    fn default() -> Self {
        Self { fill: "#fff".to_owned(), stroke: SELECTION_COLOR.to_owned() }
    }
}

/// A satellite control anchored to one owner rect.
#[derive(Debug, Clone)]
pub struct Handle {
    pub id: HandleId,
    pub kind: HandleKind,
    pub alignment: Alignment,
    pub radius: f64,
    pub trigger: Trigger,
    /// Shown while the owner is locked (lock handles use this to stay
    /// reachable on a locked node).
    pub free: bool,
    pub enabled: bool,
    pub style: HandleStyle,
    offset: Vector,
    initial_angle: f64,
    initial_magnitude: f64,
    prev_magnitude: f64,
    world: Vector,
}

impl Handle {
    #[must_use]
    pub fn new(kind: HandleKind, alignment: Alignment) -> Self {
        let trigger = match kind {
            HandleKind::Lock => Trigger::Click,
            _ => Trigger::Drag,
        };
        Self {
            id: Uuid::new_v4(),
            kind,
            alignment,
            radius: HANDLE_RADIUS,
            trigger,
            free: matches!(kind, HandleKind::Lock),
            enabled: true,
            style: HandleStyle::default(),
            offset: Vector::ZERO,
            initial_angle: 0.0,
            initial_magnitude: 0.0,
            prev_magnitude: 0.0,
            world: Vector::ZERO,
        }
    }

    /// Resolve the alignment against the owner's half-extents and record
    /// the offset's magnitude and angle once. Runs at node mount.
    pub fn anchor(&mut self, owner: &Rect) {
        self.offset = self.base_offset(owner);
        self.initial_magnitude = self.offset.magnitude();
        self.initial_angle = self.offset.angle();
        self.prev_magnitude = self.initial_magnitude.max(MIN_GESTURE_MAGNITUDE);
        self.update_position(owner);
    }

    /// Recompute the relative offset from the owner's current size, then
    /// derive world position as `owner.position + Rotate(owner.angle) ·
    /// offset`.
    pub fn update_position(&mut self, owner: &Rect) {
        self.offset = self.base_offset(owner);
        self.world = owner.position() + self.offset.rotated(owner.angle());
    }

    /// Current world position, valid after the last `update_position`.
    #[must_use]
    pub fn world(&self) -> Vector {
        self.world
    }

    /// Offset angle recorded at anchor time.
    #[must_use]
    pub fn initial_angle(&self) -> f64 {
        self.initial_angle
    }

    /// Whether this handle is drawn and hit-testable given the owner's
    /// lock state. Free handles show while the owner is locked and hide
    /// otherwise; non-free lock handles invert that pairing; everything
    /// else hides while the owner is locked.
    #[must_use]
    pub fn visible(&self, owner_locked: bool) -> bool {
        if !self.enabled {
            return false;
        }
        match self.kind {
            HandleKind::Lock => owner_locked == self.free,
            _ => !owner_locked,
        }
    }

    /// Reset gesture bookkeeping at pointer-down so the first drag step
    /// measures against the press position, not the anchor.
    pub fn begin_gesture(&mut self, owner: &Rect, pointer: Vector) {
        self.prev_magnitude = (pointer - owner.position())
            .magnitude()
            .max(MIN_GESTURE_MAGNITUDE);
    }

    /// Apply one drag step to the owner. `Click`-triggered kinds are
    /// no-ops here; the controller fires those on pointer-down.
    pub fn drag_effect(&mut self, owner: &mut Rect, pointer: Vector, limits: ScaleLimits) {
        match self.kind {
            HandleKind::Move { rotates } => self.scale_effect(owner, pointer, rotates, limits),
            HandleKind::Resize(anchor) => self.resize_effect(owner, pointer, anchor, limits),
            HandleKind::Rotate => self.rotate_effect(owner, pointer),
            HandleKind::Lock => {}
        }
    }

    /// Magnitude-ratio scale, optionally rotating the owner so the handle
    /// tracks the pointer.
    fn scale_effect(&mut self, owner: &mut Rect, pointer: Vector, rotates: bool, limits: ScaleLimits) {
        let offset = pointer - owner.position();
        let magnitude = offset.magnitude();
        if magnitude < MIN_GESTURE_MAGNITUDE {
            return;
        }
        let ratio = magnitude / self.prev_magnitude;
        owner.set_delta_scale(ratio, limits);
        if rotates {
            owner.set_angle(offset.angle() - self.initial_angle);
        }
        self.prev_magnitude = magnitude;
    }

    /// Magnitude-ratio scale with a compensating position offset: the size
    /// delta is masked per anchor, rotated into the owner's frame, and
    /// added to the position so the opposite edge stays fixed.
    fn resize_effect(&mut self, owner: &mut Rect, pointer: Vector, anchor: Alignment, limits: ScaleLimits) {
        let magnitude = (pointer - owner.position()).magnitude();
        if magnitude < MIN_GESTURE_MAGNITUDE {
            return;
        }
        let ratio = magnitude / self.prev_magnitude;

        let before = owner.scaled_size();
        owner.set_delta_scale(ratio, limits);
        let after = owner.scaled_size();

        let mask = anchor.unit();
        let delta_local = Vector::new(
            (after.width - before.width) / 2.0 * mask.x,
            (after.height - before.height) / 2.0 * mask.y,
        );
        owner.add_position(delta_local.rotated(owner.angle()));
        self.prev_magnitude = magnitude;
    }

    /// Alignment offset against the owner's current half-extents, in the
    /// owner's local (unrotated) frame. Rotate handles sit a fixed extra
    /// distance beyond their edge so they stay reachable on small nodes.
    fn base_offset(&self, owner: &Rect) -> Vector {
        let half = owner.half_extents();
        let unit = self.alignment.unit();
        let offset = Vector::new(unit.x * half.x, unit.y * half.y);
        if matches!(self.kind, HandleKind::Rotate) {
            let magnitude = unit.magnitude();
            if magnitude > 0.0 {
                return offset + unit.scaled(ROTATE_HANDLE_OFFSET / magnitude);
            }
        }
        offset
    }

    fn rotate_effect(&self, owner: &mut Rect, pointer: Vector) {
        let offset = pointer - owner.position();
        if offset.magnitude() < MIN_GESTURE_MAGNITUDE {
            return;
        }
        owner.set_angle(snap_angle(offset.angle() - self.initial_angle));
    }
}

/// Snap `angle` to the nearest 45° increment when within the snap window.
#[must_use]
pub fn snap_angle(angle: f64) -> f64 {
    let nearest = (angle / ROTATION_SNAP_STEP).round() * ROTATION_SNAP_STEP;
    if (angle - nearest).abs() < ROTATION_SNAP_TOLERANCE {
        nearest
    } else {
        angle
    }
}
