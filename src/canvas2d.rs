//! Browser painter: adapts [`web_sys::CanvasRenderingContext2d`] to the
//! [`Painter`] seam.
//!
//! This module is the only place that touches the DOM. Offscreen cache
//! surfaces are plain `<canvas>` elements that are never inserted into the
//! document; images are host-registered [`HtmlImageElement`]s looked up by
//! source key. All `JsValue` failures are flattened into [`PaintError`]
//! strings so the rest of the crate stays wasm-agnostic.

use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::geometry::{Size, Vector};
use crate::node::ImageRef;
use crate::painter::{PaintError, Painter, SurfaceId};

fn js_err(what: &str, err: &JsValue) -> PaintError {
    PaintError(format!("{what}: {err:?}"))
}

/// 2D-canvas painter over a main context plus offscreen cache surfaces.
pub struct Canvas2dPainter {
    main: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
    surfaces: HashMap<SurfaceId, (HtmlCanvasElement, CanvasRenderingContext2d)>,
    /// Surface all drawing is currently redirected into, if any.
    active: Option<SurfaceId>,
    next_surface: SurfaceId,
}

impl Canvas2dPainter {
    #[must_use]
    pub fn new(main: CanvasRenderingContext2d) -> Self {
        Self {
            main,
            images: HashMap::new(),
            surfaces: HashMap::new(),
            active: None,
            next_surface: 0,
        }
    }

    /// Register a decoded image under its source key. Image nodes whose
    /// source has no registered element fail to draw.
    pub fn register_image(&mut self, source: &str, element: HtmlImageElement) {
        self.images.insert(source.to_owned(), element);
    }

    pub fn unregister_image(&mut self, source: &str) {
        self.images.remove(source);
    }

    /// Context drawing currently lands on.
    fn ctx(&self) -> Result<&CanvasRenderingContext2d, PaintError> {
        match self.active {
            None => Ok(&self.main),
            Some(id) => self
                .surfaces
                .get(&id)
                .map(|(_, ctx)| ctx)
                .ok_or_else(|| PaintError(format!("unknown surface {id}"))),
        }
    }
}

impl Painter for Canvas2dPainter {
    fn save(&mut self) -> Result<(), PaintError> {
        self.ctx()?.save();
        Ok(())
    }

    fn restore(&mut self) -> Result<(), PaintError> {
        self.ctx()?.restore();
        Ok(())
    }

    fn translate(&mut self, offset: Vector) -> Result<(), PaintError> {
        self.ctx()?.translate(offset.x, offset.y).map_err(|err| js_err("translate", &err))
    }

    fn rotate(&mut self, radians: f64) -> Result<(), PaintError> {
        self.ctx()?.rotate(radians).map_err(|err| js_err("rotate", &err))
    }

    fn scale(&mut self, sx: f64, sy: f64) -> Result<(), PaintError> {
        self.ctx()?.scale(sx, sy).map_err(|err| js_err("scale", &err))
    }

    fn clear(&mut self, size: Size) -> Result<(), PaintError> {
        self.ctx()?.clear_rect(0.0, 0.0, size.width, size.height);
        Ok(())
    }

    fn begin_path(&mut self) -> Result<(), PaintError> {
        self.ctx()?.begin_path();
        Ok(())
    }

    fn move_to(&mut self, point: Vector) -> Result<(), PaintError> {
        self.ctx()?.move_to(point.x, point.y);
        Ok(())
    }

    fn line_to(&mut self, point: Vector) -> Result<(), PaintError> {
        self.ctx()?.line_to(point.x, point.y);
        Ok(())
    }

    fn close_path(&mut self) -> Result<(), PaintError> {
        self.ctx()?.close_path();
        Ok(())
    }

    fn circle(&mut self, center: Vector, radius: f64) -> Result<(), PaintError> {
        self.ctx()?
            .arc(center.x, center.y, radius, 0.0, 2.0 * PI)
            .map_err(|err| js_err("arc", &err))
    }

    fn ellipse(&mut self, center: Vector, rx: f64, ry: f64) -> Result<(), PaintError> {
        self.ctx()?
            .ellipse(center.x, center.y, rx, ry, 0.0, 0.0, 2.0 * PI)
            .map_err(|err| js_err("ellipse", &err))
    }

    fn set_fill(&mut self, color: &str) -> Result<(), PaintError> {
        self.ctx()?.set_fill_style_str(color);
        Ok(())
    }

    fn set_stroke(&mut self, color: &str, width: f64) -> Result<(), PaintError> {
        let ctx = self.ctx()?;
        ctx.set_stroke_style_str(color);
        ctx.set_line_width(width);
        Ok(())
    }

    fn set_line_dash(&mut self, segment: f64) -> Result<(), PaintError> {
        let pattern = js_sys::Array::new();
        if segment > 0.0 {
            pattern.push(&JsValue::from_f64(segment));
            pattern.push(&JsValue::from_f64(segment));
        }
        self.ctx()?.set_line_dash(&pattern).map_err(|err| js_err("set_line_dash", &err))
    }

    fn set_alpha(&mut self, alpha: f64) -> Result<(), PaintError> {
        self.ctx()?.set_global_alpha(alpha);
        Ok(())
    }

    fn fill(&mut self) -> Result<(), PaintError> {
        self.ctx()?.fill();
        Ok(())
    }

    fn stroke(&mut self) -> Result<(), PaintError> {
        self.ctx()?.stroke();
        Ok(())
    }

    fn clip(&mut self) -> Result<(), PaintError> {
        self.ctx()?.clip();
        Ok(())
    }

    fn fill_rect(&mut self, at: Vector, size: Size) -> Result<(), PaintError> {
        self.ctx()?.fill_rect(at.x, at.y, size.width, size.height);
        Ok(())
    }

    fn stroke_rect(&mut self, at: Vector, size: Size) -> Result<(), PaintError> {
        self.ctx()?.stroke_rect(at.x, at.y, size.width, size.height);
        Ok(())
    }

    fn draw_image(&mut self, image: &ImageRef, at: Vector, size: Size) -> Result<(), PaintError> {
        let element = self
            .images
            .get(&image.0)
            .ok_or_else(|| PaintError(format!("unregistered image {:?}", image.0)))?;
        self.ctx()?
            .draw_image_with_html_image_element_and_dw_and_dh(
                element,
                at.x,
                at.y,
                size.width,
                size.height,
            )
            .map_err(|err| js_err("draw_image", &err))
    }

    fn fill_text(&mut self, text: &str, at: Vector, font_px: f64) -> Result<(), PaintError> {
        let ctx = self.ctx()?;
        ctx.set_font(&format!("{font_px:.0}px sans-serif"));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.fill_text(text, at.x, at.y).map_err(|err| js_err("fill_text", &err))
    }

    fn measure_text(&mut self, text: &str, font_px: f64) -> Result<f64, PaintError> {
        let ctx = self.ctx()?;
        ctx.set_font(&format!("{font_px:.0}px sans-serif"));
        let metrics = ctx.measure_text(text).map_err(|err| js_err("measure_text", &err))?;
        Ok(metrics.width())
    }

    fn create_surface(&mut self, size: Size) -> Result<SurfaceId, PaintError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| PaintError("no document".to_owned()))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|err| js_err("create_element", &err))?
            .dyn_into()
            .map_err(|_| PaintError("created element is not a canvas".to_owned()))?;
        // Zero-sized backing stores are rejected by some browsers.
        canvas.set_width(size.width.max(1.0).ceil() as u32);
        canvas.set_height(size.height.max(1.0).ceil() as u32);
        let ctx = canvas
            .get_context("2d")
            .map_err(|err| js_err("get_context", &err))?
            .ok_or_else(|| PaintError("no 2d context on cache surface".to_owned()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| PaintError("context is not 2d".to_owned()))?;
        self.next_surface += 1;
        self.surfaces.insert(self.next_surface, (canvas, ctx));
        Ok(self.next_surface)
    }

    fn begin_surface(&mut self, id: SurfaceId) -> Result<(), PaintError> {
        if !self.surfaces.contains_key(&id) {
            return Err(PaintError(format!("unknown surface {id}")));
        }
        self.active = Some(id);
        Ok(())
    }

    fn end_surface(&mut self) -> Result<(), PaintError> {
        if self.active.take().is_none() {
            return Err(PaintError("no active surface".to_owned()));
        }
        Ok(())
    }

    fn draw_surface(&mut self, id: SurfaceId, at: Vector) -> Result<(), PaintError> {
        let (canvas, _) = self
            .surfaces
            .get(&id)
            .ok_or_else(|| PaintError(format!("unknown surface {id}")))?;
        self.ctx()?
            .draw_image_with_html_canvas_element(canvas, at.x, at.y)
            .map_err(|err| js_err("draw_surface", &err))
    }

    fn release_surface(&mut self, id: SurfaceId) {
        if self.active == Some(id) {
            self.active = None;
        }
        self.surfaces.remove(&id);
    }
}
