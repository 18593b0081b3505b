//! Shared numeric constants for the engine.

use std::f64::consts::{FRAC_PI_4, PI};

// ── Scale limits ────────────────────────────────────────────────

/// Smallest allowed cumulative scale factor for a node.
pub const SCALE_MIN: f64 = 0.2;

/// Largest allowed cumulative scale factor for a node.
pub const SCALE_MAX: f64 = 5.0;

/// Multiplicative scale step applied per wheel notch.
pub const WHEEL_SCALE_STEP: f64 = 1.05;

// ── Rotation snapping ───────────────────────────────────────────

/// Angular increment the rotate handle snaps to (45°).
pub const ROTATION_SNAP_STEP: f64 = FRAC_PI_4;

/// Snap window around each increment, in radians (0.1°).
pub const ROTATION_SNAP_TOLERANCE: f64 = 0.1 * PI / 180.0;

// ── Handles ─────────────────────────────────────────────────────

/// Default hit radius for round handles, in surface units.
pub const HANDLE_RADIUS: f64 = 8.0;

/// Extra distance between the owner's edge and the rotate handle.
pub const ROTATE_HANDLE_OFFSET: f64 = 24.0;

/// Pointer-to-center distances below this are ignored when deriving
/// magnitude ratios, so a degenerate gesture cannot divide by zero.
pub const MIN_GESTURE_MAGNITUDE: f64 = 1e-6;

// ── Shape math ──────────────────────────────────────────────────

/// π / 5 (36°) — angular step for a 10-vertex star polygon.
pub const FRAC_PI_5: f64 = PI / 5.0;

/// Inner-to-outer radius ratio for the 5-point star.
pub const STAR_INNER_RATIO: f64 = 0.5;

// ── Selection rendering ─────────────────────────────────────────

/// Dash segment length for the selection outline.
pub const SELECTION_DASH: f64 = 4.0;

/// Stroke color for the selection outline and handle borders.
pub const SELECTION_COLOR: &str = "#1E90FF";
