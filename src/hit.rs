//! Hit-testing against oriented rectangles and round handle zones.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::geometry::{Rect, Vector};
use crate::node::{NodeId, SceneStore};

/// Whether `point` lies inside `rect`'s current vertex polygon, by the
/// crossing-number test.
///
/// The polygon must be current: callers run [`Rect::update_vertices`] after
/// any mutation and before testing.
#[must_use]
pub fn in_area(rect: &Rect, point: Vector) -> bool {
    let vertices = rect.vertices();
    let mut crossings = 0;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        if (a.y > point.y) != (b.y > point.y) {
            let t = (point.y - a.y) / (b.y - a.y);
            if point.x < a.x + t * (b.x - a.x) {
                crossings += 1;
            }
        }
    }
    crossings % 2 == 1
}

/// Whether `p2` lies within `radius` of `p1`. Used for round handle hit
/// zones.
#[must_use]
pub fn in_circle(p1: Vector, p2: Vector, radius: f64) -> bool {
    p1.distance(p2) <= radius
}

/// The topmost node under `point`, skipping disabled and background nodes.
///
/// Scans from the highest layer key down; the first match wins, so
/// overlapping nodes resolve to the one drawn on top. Vertex polygons must
/// be current (see [`SceneStore::refresh_vertices`]).
#[must_use]
pub fn catch_node(store: &SceneStore, point: Vector) -> Option<NodeId> {
    store
        .iter_top_down()
        .find(|node| !node.disabled && !node.background && in_area(&node.rect, point))
        .map(|node| node.id)
}
