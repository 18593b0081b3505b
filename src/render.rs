//! Rendering: draws the scene through the [`Painter`] seam.
//!
//! This module receives node state and produces draw calls — it mutates
//! nothing except per-node render bookkeeping (vertex refresh, cache
//! acquisition, handle layout). Content is always drawn in the node's
//! local frame: the transform chain (translate → rotate → mirror → scale)
//! is applied first, so shape code works in base-size coordinates around
//! the center. The one exception is drawing *into* a cache surface, which
//! stores pre-transform content; the blit then goes through the same
//! transform chain.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use tracing::warn;

use crate::consts::{FRAC_PI_5, SELECTION_COLOR, SELECTION_DASH, STAR_INNER_RATIO};
use crate::geometry::{Size, Vector};
use crate::node::{CacheSlot, DecorationKind, NodeKind, SceneNode, ShapeKind};
use crate::painter::{PaintError, Painter};

/// Pointer offset of the drop shadow decoration, in local units.
const SHADOW_OFFSET: f64 = 4.0;

/// Veil color drawn over mask nodes so their region stays visible.
const MASK_VEIL: &str = "rgba(31, 26, 23, 0.35)";

// =============================================================
// Node drawing
// =============================================================

/// Draw one node: transforms, decoration, content (cached or live).
///
/// # Errors
///
/// Propagates any painter failure. A failed cache-surface acquisition is
/// not a failure: caching turns off for the node and it draws live.
pub fn draw_node(painter: &mut impl Painter, node: &mut SceneNode) -> Result<(), PaintError> {
    node.refresh_vertices();
    populate_cache(painter, node)?;

    painter.save()?;
    let drawn = draw_transformed(painter, node);
    // Restore even when drawing failed, or the state stack drifts.
    drawn.and(painter.restore())
}

fn draw_transformed(painter: &mut impl Painter, node: &SceneNode) -> Result<(), PaintError> {
    painter.set_alpha(node.opacity)?;
    painter.translate(node.rect.position())?;
    painter.rotate(node.rect.angle())?;
    if node.mirrored {
        painter.scale(-1.0, 1.0)?;
    }
    let total = node.rect.total_scale();
    painter.scale(total, total)?;

    if matches!(node.decoration.as_ref().map(|d| d.kind), Some(DecorationKind::Shadow)) {
        draw_shadow(painter, node)?;
    }

    match node.cache {
        CacheSlot::Ready(id) => {
            let half = half_of(node.rect.size());
            painter.draw_surface(id, Vector::new(-half.x, -half.y))?;
        }
        CacheSlot::Empty | CacheSlot::Stale(_) | CacheSlot::Off => draw_content(painter, node)?,
    }

    if matches!(node.decoration.as_ref().map(|d| d.kind), Some(DecorationKind::Frame)) {
        draw_frame(painter, node)?;
    }

    Ok(())
}

/// Acquire and fill the cache surface on first use, releasing a stale one
/// first so an invalidated node repopulates instead of blitting outdated
/// content. Acquisition failure disables caching for this node — degrade,
/// don't fail.
fn populate_cache(painter: &mut impl Painter, node: &mut SceneNode) -> Result<(), PaintError> {
    node.sync_cache();
    if let CacheSlot::Stale(id) = node.cache {
        painter.release_surface(id);
        node.cache = CacheSlot::Empty;
    }
    if !node.cache_enabled || node.cache != CacheSlot::Empty {
        return Ok(());
    }
    match painter.create_surface(node.fixed_size()) {
        Ok(id) => {
            node.cache = CacheSlot::Ready(id);
            painter.begin_surface(id)?;
            let drawn = draw_content(painter, node);
            // End the redirection even on failure so the main surface is
            // never left hijacked.
            drawn.and(painter.end_surface())?;
        }
        Err(err) => {
            warn!(node = %node.id, %err, "cache surface unavailable, drawing live");
            node.cache = CacheSlot::Off;
        }
    }
    Ok(())
}

/// Draw the node's content in local base-size coordinates around the
/// center. No transforms are applied here.
fn draw_content(painter: &mut impl Painter, node: &SceneNode) -> Result<(), PaintError> {
    let size = node.rect.size();
    let half = half_of(size);

    match &node.kind {
        NodeKind::Shape { shape } => draw_shape(painter, node, *shape, size),
        NodeKind::Text { content } => draw_text(painter, node, content, size),
        NodeKind::Image { source } => {
            painter.draw_image(source, Vector::new(-half.x, -half.y), size)
        }
        NodeKind::Mask => draw_mask(painter, size),
        NodeKind::Freehand { points } => draw_freehand(painter, node, points),
    }
}

// =============================================================
// Content renderers
// =============================================================

fn draw_shape(
    painter: &mut impl Painter,
    node: &SceneNode,
    shape: ShapeKind,
    size: Size,
) -> Result<(), PaintError> {
    let half = half_of(size);
    let corner = Vector::new(-half.x, -half.y);

    match shape {
        ShapeKind::Rect => {
            painter.set_fill(&node.style.fill)?;
            painter.fill_rect(corner, size)?;
            painter.set_stroke(&node.style.stroke, node.style.stroke_width)?;
            painter.stroke_rect(corner, size)?;
            return Ok(());
        }
        ShapeKind::Ellipse => {
            if size.width <= 0.0 || size.height <= 0.0 {
                return Ok(());
            }
            painter.begin_path()?;
            painter.ellipse(Vector::ZERO, half.x, half.y)?;
        }
        ShapeKind::Diamond => {
            painter.begin_path()?;
            painter.move_to(Vector::new(0.0, -half.y))?;
            painter.line_to(Vector::new(half.x, 0.0))?;
            painter.line_to(Vector::new(0.0, half.y))?;
            painter.line_to(Vector::new(-half.x, 0.0))?;
            painter.close_path()?;
        }
        ShapeKind::Star => {
            if size.width <= 0.0 || size.height <= 0.0 {
                return Ok(());
            }
            star_path(painter, half)?;
        }
    }

    painter.set_fill(&node.style.fill)?;
    painter.fill()?;
    painter.set_stroke(&node.style.stroke, node.style.stroke_width)?;
    painter.stroke()?;
    Ok(())
}

fn star_path(painter: &mut impl Painter, half: Vector) -> Result<(), PaintError> {
    let inner = Vector::new(half.x * STAR_INNER_RATIO, half.y * STAR_INNER_RATIO);
    let offset = std::f64::consts::FRAC_PI_2;

    painter.begin_path()?;
    for i in 0..10 {
        let angle = FRAC_PI_5.mul_add(f64::from(i), -offset);
        let (rx, ry) = if i % 2 == 0 { (half.x, half.y) } else { (inner.x, inner.y) };
        let point = Vector::new(rx * angle.cos(), ry * angle.sin());
        if i == 0 {
            painter.move_to(point)?;
        } else {
            painter.line_to(point)?;
        }
    }
    painter.close_path()?;
    Ok(())
}

fn draw_text(
    painter: &mut impl Painter,
    node: &SceneNode,
    content: &str,
    size: Size,
) -> Result<(), PaintError> {
    if content.is_empty() {
        return Ok(());
    }
    // Explicit font size wins; otherwise derive from the node height.
    let font_px = node
        .style
        .font_size
        .unwrap_or_else(|| (size.height / 6.0).clamp(12.0, 24.0))
        .clamp(8.0, 96.0);
    painter.set_fill(&node.style.stroke)?;
    painter.fill_text(content, Vector::ZERO, font_px)?;
    Ok(())
}

fn draw_mask(painter: &mut impl Painter, size: Size) -> Result<(), PaintError> {
    let half = half_of(size);
    let corner = Vector::new(-half.x, -half.y);
    painter.begin_path()?;
    painter.move_to(corner)?;
    painter.line_to(Vector::new(half.x, -half.y))?;
    painter.line_to(Vector::new(half.x, half.y))?;
    painter.line_to(Vector::new(-half.x, half.y))?;
    painter.close_path()?;
    painter.clip()?;
    painter.set_fill(MASK_VEIL)?;
    painter.fill_rect(corner, size)?;
    Ok(())
}

fn draw_freehand(
    painter: &mut impl Painter,
    node: &SceneNode,
    points: &[Vector],
) -> Result<(), PaintError> {
    let Some(first) = points.first() else {
        return Ok(());
    };
    painter.begin_path()?;
    painter.move_to(*first)?;
    for point in &points[1..] {
        painter.line_to(*point)?;
    }
    painter.set_stroke(&node.style.stroke, node.style.stroke_width)?;
    painter.stroke()?;
    Ok(())
}

// =============================================================
// Decorations
// =============================================================

fn draw_shadow(painter: &mut impl Painter, node: &SceneNode) -> Result<(), PaintError> {
    let Some(decoration) = &node.decoration else {
        return Ok(());
    };
    let size = node.rect.size();
    let half = half_of(size);
    painter.set_fill(&decoration.color)?;
    painter.fill_rect(Vector::new(-half.x + SHADOW_OFFSET, -half.y + SHADOW_OFFSET), size)?;
    Ok(())
}

fn draw_frame(painter: &mut impl Painter, node: &SceneNode) -> Result<(), PaintError> {
    let Some(decoration) = &node.decoration else {
        return Ok(());
    };
    let size = node.rect.size();
    let half = half_of(size);
    painter.set_stroke(&decoration.color, decoration.width)?;
    painter.stroke_rect(Vector::new(-half.x, -half.y), size)?;
    Ok(())
}

// =============================================================
// Selection UI
// =============================================================

/// Draw the focused node's dashed outline and every visible handle.
/// Handle positions are re-derived from the current rect first, so this
/// doubles as the per-frame handle layout pass.
///
/// # Errors
///
/// Propagates any painter failure.
pub fn draw_selection(painter: &mut impl Painter, node: &mut SceneNode) -> Result<(), PaintError> {
    node.refresh_vertices();
    node.layout_handles();

    painter.save()?;
    let drawn = draw_selection_inner(painter, node);
    drawn.and(painter.restore())
}

fn draw_selection_inner(painter: &mut impl Painter, node: &SceneNode) -> Result<(), PaintError> {
    let vertices = *node.rect.vertices();

    painter.set_stroke(SELECTION_COLOR, 1.0)?;
    painter.set_line_dash(SELECTION_DASH)?;
    painter.begin_path()?;
    painter.move_to(vertices[0])?;
    for vertex in &vertices[1..] {
        painter.line_to(*vertex)?;
    }
    painter.close_path()?;
    painter.stroke()?;
    painter.set_line_dash(0.0)?;

    for handle in &node.handles {
        if !handle.visible(node.locked) {
            continue;
        }
        if matches!(handle.kind, crate::handle::HandleKind::Rotate) {
            // Connector from the top edge midpoint out to the handle.
            let edge_mid = Vector::new(
                (vertices[0].x + vertices[1].x) / 2.0,
                (vertices[0].y + vertices[1].y) / 2.0,
            );
            painter.begin_path()?;
            painter.move_to(edge_mid)?;
            painter.line_to(handle.world())?;
            painter.stroke()?;
        }
        painter.begin_path()?;
        painter.circle(handle.world(), handle.radius)?;
        painter.set_fill(&handle.style.fill)?;
        painter.fill()?;
        painter.set_stroke(&handle.style.stroke, 1.0)?;
        painter.stroke()?;
    }

    Ok(())
}

// =============================================================
// Helpers
// =============================================================

fn half_of(size: Size) -> Vector {
    Vector::new(size.width / 2.0, size.height / 2.0)
}
