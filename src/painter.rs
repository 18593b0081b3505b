//! Drawing seam: the primitive surface the engine draws through.
//!
//! The concrete surface is an external collaborator — a browser 2D canvas
//! on wasm (see [`crate::canvas2d`]), a recording double in tests. The
//! trait covers exactly what the render pass needs: transform stack, path
//! fill/stroke, clipping, image blits, text, and offscreen cache surfaces.
//! Every call is fallible; backends map their native failures into
//! [`PaintError`] and the render pass propagates them.

use thiserror::Error;

use crate::geometry::{Size, Vector};
use crate::node::ImageRef;

/// A drawing primitive failed in the backend surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("paint failure: {0}")]
pub struct PaintError(pub String);

/// Backend identifier for an offscreen cache surface.
pub type SurfaceId = u32;

/// Primitive drawing surface.
///
/// Transform calls compose with the current state; `save`/`restore`
/// bracket any local transform or style changes, mirroring the 2D canvas
/// model the engine was built against.
pub trait Painter {
    /// # Errors
    /// Fails when the backend cannot push its state stack.
    fn save(&mut self) -> Result<(), PaintError>;
    /// # Errors
    /// Fails when the backend cannot pop its state stack.
    fn restore(&mut self) -> Result<(), PaintError>;

    /// # Errors
    /// Fails when the backend rejects the transform.
    fn translate(&mut self, offset: Vector) -> Result<(), PaintError>;
    /// # Errors
    /// Fails when the backend rejects the transform.
    fn rotate(&mut self, radians: f64) -> Result<(), PaintError>;
    /// # Errors
    /// Fails when the backend rejects the transform.
    fn scale(&mut self, sx: f64, sy: f64) -> Result<(), PaintError>;

    /// Clear the whole surface.
    ///
    /// # Errors
    /// Fails when the backend cannot clear.
    fn clear(&mut self, size: Size) -> Result<(), PaintError>;

    /// # Errors
    /// Fails when the backend rejects the path command.
    fn begin_path(&mut self) -> Result<(), PaintError>;
    /// # Errors
    /// Fails when the backend rejects the path command.
    fn move_to(&mut self, point: Vector) -> Result<(), PaintError>;
    /// # Errors
    /// Fails when the backend rejects the path command.
    fn line_to(&mut self, point: Vector) -> Result<(), PaintError>;
    /// # Errors
    /// Fails when the backend rejects the path command.
    fn close_path(&mut self) -> Result<(), PaintError>;
    /// Full-circle arc centered at `center`.
    ///
    /// # Errors
    /// Fails when the backend rejects the path command.
    fn circle(&mut self, center: Vector, radius: f64) -> Result<(), PaintError>;
    /// Axis-aligned ellipse centered at `center`.
    ///
    /// # Errors
    /// Fails when the backend rejects the path command.
    fn ellipse(&mut self, center: Vector, rx: f64, ry: f64) -> Result<(), PaintError>;

    /// # Errors
    /// Fails when the backend rejects the style change.
    fn set_fill(&mut self, color: &str) -> Result<(), PaintError>;
    /// # Errors
    /// Fails when the backend rejects the style change.
    fn set_stroke(&mut self, color: &str, width: f64) -> Result<(), PaintError>;
    /// Dash the stroke with equal on/off segments; `0.0` restores solid.
    ///
    /// # Errors
    /// Fails when the backend rejects the style change.
    fn set_line_dash(&mut self, segment: f64) -> Result<(), PaintError>;
    /// # Errors
    /// Fails when the backend rejects the style change.
    fn set_alpha(&mut self, alpha: f64) -> Result<(), PaintError>;

    /// Fill the current path.
    ///
    /// # Errors
    /// Fails when the backend cannot rasterize.
    fn fill(&mut self) -> Result<(), PaintError>;
    /// Stroke the current path.
    ///
    /// # Errors
    /// Fails when the backend cannot rasterize.
    fn stroke(&mut self) -> Result<(), PaintError>;
    /// Clip subsequent drawing to the current path, until `restore`.
    ///
    /// # Errors
    /// Fails when the backend cannot clip.
    fn clip(&mut self) -> Result<(), PaintError>;

    /// # Errors
    /// Fails when the backend cannot rasterize.
    fn fill_rect(&mut self, at: Vector, size: Size) -> Result<(), PaintError>;
    /// # Errors
    /// Fails when the backend cannot rasterize.
    fn stroke_rect(&mut self, at: Vector, size: Size) -> Result<(), PaintError>;

    /// Blit a host-owned image into the given box.
    ///
    /// # Errors
    /// Fails when the image is unknown to the backend or the blit fails.
    fn draw_image(&mut self, image: &ImageRef, at: Vector, size: Size) -> Result<(), PaintError>;

    /// Fill a single text run centered at `at`.
    ///
    /// # Errors
    /// Fails when the backend cannot rasterize text.
    fn fill_text(&mut self, text: &str, at: Vector, font_px: f64) -> Result<(), PaintError>;
    /// Advance width of `text` at `font_px`.
    ///
    /// # Errors
    /// Fails when the backend cannot measure text.
    fn measure_text(&mut self, text: &str, font_px: f64) -> Result<f64, PaintError>;

    /// Acquire an offscreen cache surface of the given size.
    ///
    /// # Errors
    /// Fails when the backend cannot allocate a surface; the caller treats
    /// this as "caching unavailable", never as a render failure.
    fn create_surface(&mut self, size: Size) -> Result<SurfaceId, PaintError>;
    /// Redirect subsequent drawing into a cache surface.
    ///
    /// # Errors
    /// Fails when the surface is unknown.
    fn begin_surface(&mut self, id: SurfaceId) -> Result<(), PaintError>;
    /// Return drawing to the main surface.
    ///
    /// # Errors
    /// Fails when no surface redirection is active.
    fn end_surface(&mut self) -> Result<(), PaintError>;
    /// Blit a cache surface with its top-left corner at `at`.
    ///
    /// # Errors
    /// Fails when the surface is unknown.
    fn draw_surface(&mut self, id: SurfaceId, at: Vector) -> Result<(), PaintError>;
    /// Release a cache surface. Unknown ids are ignored.
    fn release_surface(&mut self, id: SurfaceId);
}
