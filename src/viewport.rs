//! Viewport correction: maps raw host pointer coordinates onto the
//! surface before any hit-test.
//!
//! Correction happens exactly once, at the controller boundary. The engine
//! works in CSS-pixel surface coordinates; the device pixel ratio is
//! applied by the render pass, not by input correction.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::geometry::Vector;

/// Host viewport state: surface placement and device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left corner of the surface within the host window, in CSS pixels.
    pub origin: Vector,
    /// Surface width in CSS pixels.
    pub width: f64,
    /// Surface height in CSS pixels.
    pub height: f64,
    /// Device pixel ratio of the backing store.
    pub dpr: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { origin: Vector::ZERO, width: 0.0, height: 0.0, dpr: 1.0 }
    }
}

impl Viewport {
    /// Convert a raw host pointer position to surface coordinates.
    #[must_use]
    pub fn correct(&self, raw: Vector) -> Vector {
        raw - self.origin
    }

    /// The primary pointer of a multi-touch batch: the first contact.
    /// Returns `None` for an empty batch.
    #[must_use]
    pub fn primary(points: &[Vector]) -> Option<Vector> {
        points.first().copied()
    }
}
